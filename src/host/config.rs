//! Reconciler-facing host contract.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::foundation::error::SkeneResult;
use crate::host::props::{Props, apply_props, check_props};
use crate::render::backend::GraphicsBackend;
use crate::runtime::root::RootState;
use crate::scene::graph::{NodeId, misuse};
use crate::scene::node::{Node, NodeKind};

/// Calls a tree reconciler makes into the renderer during a commit.
///
/// Instances are [`NodeId`]s; the container is the root child list.
pub trait HostConfig {
    /// Instantiate a node for `ty` and apply its initial props.
    fn create_instance(&mut self, ty: &str, props: &Props) -> SkeneResult<NodeId>;
    /// Raw text is never a valid child.
    fn create_text_instance(&mut self, text: &str) -> SkeneResult<NodeId>;

    /// Attach a child to a freshly created, not yet mounted parent.
    fn append_initial_child(&mut self, parent: NodeId, child: NodeId) -> SkeneResult<()>;
    /// Append `child` to a mounted parent, moving it if already attached.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> SkeneResult<()>;
    /// Append `child` to the root child list.
    fn append_child_to_container(&mut self, child: NodeId) -> SkeneResult<()>;
    /// Insert `child` before the sibling `before`.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId)
    -> SkeneResult<()>;
    /// Insert `child` in the root child list before `before`.
    fn insert_in_container_before(&mut self, child: NodeId, before: NodeId) -> SkeneResult<()>;
    /// Unlink and delete `child` with its subtree.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SkeneResult<()>;
    /// Remove a root child and delete its subtree.
    fn remove_child_from_container(&mut self, child: NodeId) -> SkeneResult<()>;
    /// Delete every node the container owns, attached or not.
    fn clear_container(&mut self) -> SkeneResult<()>;

    /// Reject `ty` or `props` without creating anything.
    fn check_instance(&self, _ty: &str, _props: &Props) -> SkeneResult<()> {
        Ok(())
    }
    /// Reject raw text without creating anything.
    fn check_text_instance(&self, _text: &str) -> SkeneResult<()> {
        Ok(())
    }

    /// Diff `old` against `new` onto `node`.
    fn commit_update(&mut self, node: NodeId, old: &Props, new: &Props) -> SkeneResult<()>;

    /// Nodes never take text content from their children.
    fn should_set_text_content(&self, _ty: &str, _props: &Props) -> bool {
        false
    }
    /// Runs before the reconciler applies mutations.
    fn prepare_for_commit(&mut self) {}
    /// Runs once the reconciler has applied every mutation of a pass.
    fn reset_after_commit(&mut self) -> SkeneResult<()>;
    /// What a ref on `node` resolves to.
    fn get_public_instance(&self, node: NodeId) -> NodeId {
        node
    }
    /// Wall-clock milliseconds.
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or_default()
    }
}

fn parse_kind(ty: &str) -> SkeneResult<NodeKind> {
    ty.parse()
        .map_err(|_| misuse(format!("invalid element type \"{ty}\"")))
}

fn text_child(text: &str) -> crate::SkeneError {
    misuse(format!(
        "text \"{text}\" must be passed as a text prop, not as a child"
    ))
}

impl<G: GraphicsBackend> HostConfig for RootState<G> {
    fn create_instance(&mut self, ty: &str, props: &Props) -> SkeneResult<NodeId> {
        let kind = parse_kind(ty)?;
        let mut node = Node::create(kind, &mut self.gfx);
        if let Err(e) = apply_props(&mut node, props, &Props::new()) {
            node.delete(&mut self.gfx);
            return Err(e);
        }
        Ok(self.graph.insert(node))
    }

    fn create_text_instance(&mut self, text: &str) -> SkeneResult<NodeId> {
        Err(text_child(text))
    }

    fn check_instance(&self, ty: &str, props: &Props) -> SkeneResult<()> {
        let kind = parse_kind(ty)?;
        check_props::<G>(kind, props).map(drop)
    }

    fn check_text_instance(&self, text: &str) -> SkeneResult<()> {
        Err(text_child(text))
    }

    fn append_initial_child(&mut self, parent: NodeId, child: NodeId) -> SkeneResult<()> {
        self.graph.append_child(parent, child)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> SkeneResult<()> {
        self.graph.append_child(parent, child)
    }

    fn append_child_to_container(&mut self, child: NodeId) -> SkeneResult<()> {
        self.graph.append_to_root(child)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> SkeneResult<()> {
        self.graph.insert_before(parent, child, before)
    }

    fn insert_in_container_before(&mut self, child: NodeId, before: NodeId) -> SkeneResult<()> {
        self.graph.insert_in_root_before(child, before)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SkeneResult<()> {
        self.graph.remove_child(parent, child, &mut self.gfx)
    }

    fn remove_child_from_container(&mut self, child: NodeId) -> SkeneResult<()> {
        self.graph.remove_from_root(child, &mut self.gfx)
    }

    fn clear_container(&mut self) -> SkeneResult<()> {
        self.graph.clear(&mut self.gfx)
    }

    fn commit_update(&mut self, node: NodeId, old: &Props, new: &Props) -> SkeneResult<()> {
        let n = self
            .graph
            .get_mut(node)
            .ok_or_else(|| misuse(format!("update for stale node {node:?}")))?;
        apply_props(n, new, old)
    }

    fn reset_after_commit(&mut self) -> SkeneResult<()> {
        self.last_commit = Some(self.now());
        tracing::debug!(nodes = self.graph.len(), "commit");
        self.render()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/config.rs"]
mod tests;
