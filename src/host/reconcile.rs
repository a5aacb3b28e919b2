//! Minimal keyed reconciler.
//!
//! Keeps the last committed element tree as fibers and turns a new element tree into
//! [`HostConfig`] calls. Siblings match on `(type, key)`; unkeyed siblings of the same
//! type match in order.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use crate::foundation::error::SkeneResult;
use crate::host::config::HostConfig;
use crate::host::element::Element;
use crate::host::props::{Props, RESERVED_PROPS};
use crate::scene::graph::NodeId;

/// Committed counterpart of one host element.
#[derive(Clone, Debug, PartialEq)]
pub struct Fiber {
    /// Element tag.
    pub ty: String,
    /// Reconciliation key.
    pub key: Option<String>,
    /// Props committed onto the node, without reserved keys.
    pub props: Props,
    /// Live node.
    pub node: NodeId,
    /// Committed children.
    pub children: Vec<Fiber>,
}

/// Committed state of one container.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    roots: Vec<Fiber>,
}

impl Reconciler {
    /// Empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fibers of the container, in paint order.
    pub fn roots(&self) -> &[Fiber] {
        &self.roots
    }

    /// Public instances of the container children, in paint order.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.roots.iter().map(|f| f.node).collect()
    }

    /// Find the node committed for the element at `path` (child indices from the roots).
    pub fn node_at(&self, path: &[usize]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let mut fiber = self.roots.get(*first)?;
        for i in rest {
            fiber = fiber.children.get(*i)?;
        }
        Some(fiber.node)
    }

    /// Bring the container in line with `elements`, then commit.
    #[tracing::instrument(level = "debug", skip_all, fields(roots = elements.len()))]
    pub fn update_container<H: HostConfig + ?Sized>(
        &mut self,
        host: &mut H,
        elements: &[Element],
    ) -> SkeneResult<()> {
        host.prepare_for_commit();
        check_elements(host, elements)?;
        let old = std::mem::take(&mut self.roots);
        match reconcile_children(host, None, old, elements) {
            Ok(next) => self.roots = next,
            Err(e) => {
                // The committed fibers were consumed part way; drop the whole container
                // so no node outlives its fiber.
                tracing::warn!(error = %e, "commit failed, clearing container");
                host.clear_container()?;
                return Err(e);
            }
        }
        host.reset_after_commit()
    }
}

/// Reject a tree the host cannot instantiate before anything is mutated.
fn check_elements<H: HostConfig + ?Sized>(host: &H, elements: &[Element]) -> SkeneResult<()> {
    for e in elements {
        match e {
            Element::Text(text) => host.check_text_instance(text)?,
            Element::Host {
                ty,
                props,
                children,
                ..
            } => {
                host.check_instance(ty, props)?;
                check_elements(host, children)?;
            }
        }
    }
    Ok(())
}

const TEXT_TYPE: &str = "#text";

struct Wanted<'a> {
    ty: &'a str,
    key: Option<&'a str>,
    props: Props,
    children: &'a [Element],
}

fn wanted(e: &Element) -> Wanted<'_> {
    match e {
        Element::Text(text) => {
            let mut props = Props::new();
            props.insert("text".to_owned(), Value::String(text.clone()));
            Wanted {
                ty: TEXT_TYPE,
                key: None,
                props,
                children: &[],
            }
        }
        Element::Host {
            ty,
            key,
            props,
            children,
        } => Wanted {
            ty,
            key: key.as_deref(),
            props: props
                .iter()
                .filter(|(k, _)| !RESERVED_PROPS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            children,
        },
    }
}

/// Create a detached subtree for `w`; children are attached with `append_initial_child`.
fn mount<H: HostConfig + ?Sized>(host: &mut H, w: Wanted<'_>) -> SkeneResult<Fiber> {
    let node = if w.ty == TEXT_TYPE {
        let text = w.props.get("text").and_then(Value::as_str).unwrap_or_default();
        host.create_text_instance(text)?
    } else {
        host.create_instance(w.ty, &w.props)?
    };
    let mut children = Vec::with_capacity(w.children.len());
    for c in w.children {
        let child = mount(host, wanted(c))?;
        host.append_initial_child(node, child.node)?;
        children.push(child);
    }
    Ok(Fiber {
        ty: w.ty.to_owned(),
        key: w.key.map(str::to_owned),
        props: w.props,
        node,
        children,
    })
}

fn reconcile_children<H: HostConfig + ?Sized>(
    host: &mut H,
    parent: Option<NodeId>,
    old: Vec<Fiber>,
    elements: &[Element],
) -> SkeneResult<Vec<Fiber>> {
    let mut keyed: HashMap<(String, String), usize> = HashMap::new();
    let mut unkeyed: HashMap<String, VecDeque<usize>> = HashMap::new();
    for (i, f) in old.iter().enumerate() {
        match &f.key {
            Some(k) => {
                keyed.insert((f.ty.clone(), k.clone()), i);
            }
            None => unkeyed.entry(f.ty.clone()).or_default().push_back(i),
        }
    }
    let mut old: Vec<Option<Fiber>> = old.into_iter().map(Some).collect();

    // `true` marks fibers that must be (re)placed: new ones and ones that moved left.
    let mut next: Vec<(Fiber, bool)> = Vec::with_capacity(elements.len());
    let mut last_placed = 0;
    for e in elements {
        let w = wanted(e);
        let slot = match w.key {
            Some(k) => keyed.remove(&(w.ty.to_owned(), k.to_owned())),
            None => unkeyed.get_mut(w.ty).and_then(VecDeque::pop_front),
        };
        match slot.and_then(|i| old[i].take().map(|f| (i, f))) {
            Some((i, mut fiber)) => {
                host.commit_update(fiber.node, &fiber.props, &w.props)?;
                let kids = std::mem::take(&mut fiber.children);
                fiber.children = reconcile_children(host, Some(fiber.node), kids, w.children)?;
                fiber.props = w.props;
                let moved = i < last_placed;
                last_placed = last_placed.max(i);
                next.push((fiber, moved));
            }
            None => next.push((mount(host, w)?, true)),
        }
    }

    for gone in old.into_iter().flatten() {
        match parent {
            Some(p) => host.remove_child(p, gone.node)?,
            None => host.remove_child_from_container(gone.node)?,
        }
    }

    let mut after: Option<NodeId> = None;
    for (fiber, place) in next.iter().rev() {
        if *place {
            match (parent, after) {
                (Some(p), Some(b)) => host.insert_before(p, fiber.node, b)?,
                (Some(p), None) => host.append_child(p, fiber.node)?,
                (None, Some(b)) => host.insert_in_container_before(fiber.node, b)?,
                (None, None) => host.append_child_to_container(fiber.node)?,
            }
        }
        after = Some(fiber.node);
    }
    Ok(next.into_iter().map(|(f, _)| f).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/host/reconcile.rs"]
mod tests;
