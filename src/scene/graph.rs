//! Arena-backed scene tree.
//!
//! Nodes live in slots addressed by generational [`NodeId`] handles. Freed slots are
//! recycled through a free list; bumping the generation on free makes old handles fail
//! lookup instead of aliasing a new node.

use std::fmt;

use crate::foundation::error::{SkeneError, SkeneResult};
use crate::render::backend::GraphicsBackend;
use crate::scene::node::{Node, NodeKind};

/// Handle to a node in a [`SceneGraph`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    idx: u32,
    generation: u32,
}

impl NodeId {
    /// Raw slot index (diagnostics only).
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Generation counter of the slot when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

struct Slot<G: GraphicsBackend> {
    node: Node<G>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Retained scene tree: node arena, parent/child links, and the root child list.
pub struct SceneGraph<G: GraphicsBackend> {
    slots: Vec<Option<Slot<G>>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    root: Vec<NodeId>,
}

impl<G: GraphicsBackend> Default for SceneGraph<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GraphicsBackend> fmt::Debug for SceneGraph<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("live", &self.len())
            .field("root", &self.root)
            .finish()
    }
}

/// Log a misuse and turn it into a [`SkeneError::Structural`].
pub(crate) fn misuse(msg: String) -> SkeneError {
    tracing::error!(error = %msg, "scene misuse");
    SkeneError::structural(msg)
}

impl<G: GraphicsBackend> SceneGraph<G> {
    /// Empty graph.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            root: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Return `true` when no node is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take ownership of a detached node.
    pub fn insert(&mut self, node: Node<G>) -> NodeId {
        let slot = Slot {
            node,
            parent: None,
            children: Vec::new(),
        };
        let idx = match self.free_list.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.generation.push(0);
                (self.slots.len() - 1) as u32
            }
        };
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Construct a node of `kind` and insert it detached.
    pub fn create(&mut self, kind: NodeKind, gfx: &mut G) -> NodeId {
        self.insert(Node::create(kind, gfx))
    }

    /// Return `true` when `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slot(id).is_ok()
    }

    fn slot(&self, id: NodeId) -> SkeneResult<&Slot<G>> {
        self.generation
            .get(id.idx as usize)
            .filter(|g| **g == id.generation)
            .and_then(|_| self.slots[id.idx as usize].as_ref())
            .ok_or_else(|| misuse(format!("stale node id {id:?}")))
    }

    fn slot_mut(&mut self, id: NodeId) -> SkeneResult<&mut Slot<G>> {
        let live = self
            .generation
            .get(id.idx as usize)
            .is_some_and(|g| *g == id.generation);
        match self.slots.get_mut(id.idx as usize) {
            Some(Some(slot)) if live => Ok(slot),
            _ => Err(misuse(format!("stale node id {id:?}"))),
        }
    }

    /// Borrow a node.
    pub fn get(&self, id: NodeId) -> Option<&Node<G>> {
        self.slot(id).ok().map(|s| &s.node)
    }

    /// Mutably borrow a node.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<G>> {
        self.slot_mut(id).ok().map(|s| &mut s.node)
    }

    /// Parent node, or `None` for root children and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).ok().and_then(|s| s.parent)
    }

    /// Children of `id` in paint order.
    pub fn children(&self, id: NodeId) -> SkeneResult<&[NodeId]> {
        Ok(&self.slot(id)?.children)
    }

    /// Root children in paint order.
    pub fn root_children(&self) -> &[NodeId] {
        &self.root
    }

    fn detach(&mut self, child: NodeId) -> SkeneResult<()> {
        match self.slot(child)?.parent {
            Some(p) => self.slot_mut(p)?.children.retain(|c| *c != child),
            None => self.root.retain(|c| *c != child),
        }
        self.slot_mut(child)?.parent = None;
        Ok(())
    }

    fn check_container(&self, parent: NodeId, child: NodeId) -> SkeneResult<()> {
        let kind = self.slot(parent)?.node.kind();
        self.slot(child)?;
        if !kind.is_container() {
            return Err(misuse(format!("{kind} cannot have children")));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(misuse(format!("{child:?} cannot be placed under itself")));
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(p) = self.parent(id) {
            if p == ancestor {
                return true;
            }
            id = p;
        }
        false
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SkeneResult<()> {
        self.check_container(parent, child)?;
        self.detach(child)?;
        self.slot_mut(parent)?.children.push(child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Insert `child` into `parent` right before `before`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> SkeneResult<()> {
        self.check_container(parent, child)?;
        if !self.slot(parent)?.children.contains(&before) {
            return Err(misuse(format!("{before:?} is not a child of {parent:?}")));
        }
        self.detach(child)?;
        let siblings = &mut self.slot_mut(parent)?.children;
        let at = siblings.iter().position(|c| *c == before).unwrap_or(siblings.len());
        siblings.insert(at, child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Append `child` to the root list.
    pub fn append_to_root(&mut self, child: NodeId) -> SkeneResult<()> {
        self.detach(child)?;
        self.root.push(child);
        Ok(())
    }

    /// Insert `child` into the root list right before `before`.
    pub fn insert_in_root_before(&mut self, child: NodeId, before: NodeId) -> SkeneResult<()> {
        self.slot(child)?;
        if !self.root.contains(&before) {
            return Err(misuse(format!("{before:?} is not a root child")));
        }
        self.detach(child)?;
        let at = self.root.iter().position(|c| *c == before).unwrap_or(self.root.len());
        self.root.insert(at, child);
        Ok(())
    }

    /// Unlink `child` from `parent` and delete its whole subtree.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId, gfx: &mut G) -> SkeneResult<()> {
        if !self.slot(parent)?.children.contains(&child) {
            return Err(misuse(format!("{child:?} is not a child of {parent:?}")));
        }
        self.destroy(child, gfx)
    }

    /// Unlink a root child and delete its whole subtree.
    pub fn remove_from_root(&mut self, child: NodeId, gfx: &mut G) -> SkeneResult<()> {
        if !self.root.contains(&child) {
            return Err(misuse(format!("{child:?} is not a root child")));
        }
        self.destroy(child, gfx)
    }

    /// Delete every root subtree.
    pub fn clear_root(&mut self, gfx: &mut G) -> SkeneResult<()> {
        for id in std::mem::take(&mut self.root) {
            self.destroy(id, gfx)?;
        }
        Ok(())
    }

    /// Delete every node, detached ones included.
    pub fn clear(&mut self, gfx: &mut G) -> SkeneResult<()> {
        self.clear_root(gfx)?;
        for idx in 0..self.slots.len() {
            if let Some(mut slot) = self.slots[idx].take() {
                slot.node.delete(gfx);
                self.generation[idx] += 1;
                self.free_list.push(idx as u32);
            }
        }
        Ok(())
    }

    /// Delete a node and its descendants, children first, and free their slots.
    pub fn destroy(&mut self, id: NodeId, gfx: &mut G) -> SkeneResult<()> {
        self.detach(id)?;
        let mut order = Vec::new();
        self.post_order(id, &mut order)?;
        for n in order {
            let slot = self.slots[n.idx as usize].take();
            if let Some(mut slot) = slot {
                slot.node.delete(gfx);
            }
            self.generation[n.idx as usize] += 1;
            self.free_list.push(n.idx);
        }
        Ok(())
    }

    fn post_order(&self, id: NodeId, out: &mut Vec<NodeId>) -> SkeneResult<()> {
        for &c in &self.slot(id)?.children {
            self.post_order(c, out)?;
        }
        out.push(id);
        Ok(())
    }

    /// Render every root child into `target`, then flush it.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn render_root(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        let root = self.root.clone();
        for id in root {
            self.render_node(id, None, gfx, target)?;
        }
        gfx.flush(target);
        Ok(())
    }

    /// Render the subtree at `id` as if it sat under a `parent` node (`None` = root).
    pub fn render_node(
        &mut self,
        id: NodeId,
        parent: Option<NodeKind>,
        gfx: &mut G,
        target: &mut G::Surface,
    ) -> SkeneResult<()> {
        let slot = self.slot(id)?;
        let kind = slot.node.kind();
        if slot.node.is_deleted() {
            return Err(misuse(format!("{kind} {id:?} rendered after delete")));
        }
        let allowed = match kind {
            NodeKind::Canvas => matches!(parent, None | Some(NodeKind::Surface)),
            _ => parent == Some(NodeKind::Canvas),
        };
        if !allowed {
            let under = parent.map_or("the root".to_owned(), |p| p.to_string());
            return Err(misuse(format!("{kind} cannot render under {under}")));
        }
        let children = slot.children.clone();
        tracing::trace!(?id, %kind, "render node");

        match kind {
            NodeKind::Canvas => {
                self.canvas_mut(id)?.begin(gfx, target)?;
                let result = self.render_children(&children, kind, gfx, target);
                self.canvas_mut(id)?.end(gfx, target);
                result?;
            }
            NodeKind::Surface => {
                let mut surface = self.surface_mut(id)?.take_target(gfx)?;
                let result = self.render_children(&children, kind, gfx, &mut surface);
                let node = self.surface_mut(id)?;
                node.put_target(surface);
                result?;
                node.composite(gfx, target)?;
            }
            _ => self.slot_mut(id)?.node.render_leaf(gfx, target)?,
        }
        self.slot_mut(id)?.node.flags_mut().dirty = false;
        Ok(())
    }

    fn render_children(
        &mut self,
        children: &[NodeId],
        parent: NodeKind,
        gfx: &mut G,
        target: &mut G::Surface,
    ) -> SkeneResult<()> {
        for &c in children {
            self.render_node(c, Some(parent), gfx, target)?;
        }
        Ok(())
    }

    fn canvas_mut(
        &mut self,
        id: NodeId,
    ) -> SkeneResult<&mut crate::scene::container::canvas::CanvasNode> {
        self.slot_mut(id)?
            .node
            .as_canvas_mut()
            .ok_or_else(|| misuse(format!("{id:?} is not a canvas")))
    }

    fn surface_mut(
        &mut self,
        id: NodeId,
    ) -> SkeneResult<&mut crate::scene::container::surface::SurfaceNode<G>> {
        self.slot_mut(id)?
            .node
            .as_surface_mut()
            .ok_or_else(|| misuse(format!("{id:?} is not a surface")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
