//! Prop bags and the diff that turns prop changes into dirty flags.

use serde_json::{Map, Value};

use crate::foundation::error::SkeneResult;
use crate::render::backend::GraphicsBackend;
use crate::scene::node::{Node, NodeKind};

/// Prop bag of one element, keyed by prop name.
pub type Props = Map<String, Value>;

/// Keys owned by the reconciler; never assigned onto nodes.
pub const RESERVED_PROPS: [&str; 3] = ["children", "key", "ref"];

/// Decode every non-reserved key of `props` for a node of `kind`.
///
/// Returns the keys the kind knows. Unknown keys are logged and skipped.
/// Nothing is assigned, so a failure leaves the node untouched.
pub fn check_props<'a, G: GraphicsBackend>(
    kind: NodeKind,
    props: &'a Props,
) -> SkeneResult<Vec<(&'a str, &'a Value)>> {
    let mut known = Vec::with_capacity(props.len());
    for (key, value) in props {
        if RESERVED_PROPS.contains(&key.as_str()) {
            continue;
        }
        if Node::<G>::check_prop(kind, key, value)? {
            known.push((key.as_str(), value));
        } else {
            tracing::warn!(%kind, prop = %key, "ignoring unknown prop");
        }
    }
    Ok(known)
}

/// Assign `new` onto `node` and invalidate what changed relative to `old`.
///
/// Deep-equal bags only clear `dirty`. Otherwise every value is decoded first, and a bad
/// value fails the whole update before anything is assigned. Then the known keys are
/// assigned and `dirty` is set unless no key was known. `layout` and `paint` are set only
/// for layout/style keys whose value differs from `old`.
pub fn apply_props<G: GraphicsBackend>(
    node: &mut Node<G>,
    new: &Props,
    old: &Props,
) -> SkeneResult<()> {
    if new == old {
        node.flags_mut().dirty = false;
        return Ok(());
    }

    let known = check_props::<G>(node.kind(), new)?;
    if known.is_empty() {
        return Ok(());
    }
    let layout_keys = node.layout_properties();
    let style_keys = node.style_properties();
    let (mut layout, mut paint) = (false, false);
    for (key, value) in known {
        node.set_prop(key, value)?;
        let changed = old.get(key) != Some(value);
        layout |= changed && layout_keys.contains(&key);
        paint |= changed && style_keys.contains(&key);
    }
    let flags = node.flags_mut();
    flags.dirty = true;
    flags.layout |= layout;
    flags.paint |= paint;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/host/props.rs"]
mod tests;
