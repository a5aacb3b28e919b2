use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::config::{FrameloopMode, MountOpts};
use crate::foundation::error::SkeneResult;
use crate::render::backend::GraphicsBackend;
use crate::runtime::clock::Clock;
use crate::runtime::subscription::{CallbackCell, FrameOpts, Subscribers, Unsubscribe};
use crate::scene::graph::{NodeId, SceneGraph, misuse};
use crate::scene::node::Node;

/// Invalidations are capped so a burst of requests cannot queue unbounded frames.
pub const MAX_PENDING_FRAMES: u32 = 60;

/// Everything one mounted target owns: the backend, the retained tree, the on-screen
/// surface, and the frame-loop state.
pub struct RootState<G: GraphicsBackend> {
    pub(crate) gfx: G,
    pub(crate) graph: SceneGraph<G>,
    pub(crate) surface: Option<G::Surface>,
    pub(crate) frameloop: FrameloopMode,
    pub(crate) dpr: f64,
    pub(crate) active: bool,
    pub(crate) frames: u32,
    pub(crate) subscribers: Rc<RefCell<Subscribers<G>>>,
    pub(crate) clock: Clock,
    pub(crate) last_commit: Option<f64>,
}

impl<G: GraphicsBackend> fmt::Debug for RootState<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootState")
            .field("graph", &self.graph)
            .field("frameloop", &self.frameloop)
            .field("active", &self.active)
            .field("frames", &self.frames)
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<G: GraphicsBackend> RootState<G> {
    /// Fresh, active root drawing into `surface`.
    pub fn new(gfx: G, surface: G::Surface, opts: &MountOpts) -> Self {
        Self {
            gfx,
            graph: SceneGraph::new(),
            surface: Some(surface),
            frameloop: opts.frameloop,
            dpr: opts.dpr,
            active: true,
            frames: 0,
            subscribers: Rc::new(RefCell::new(Subscribers::default())),
            clock: Clock::default(),
            last_commit: None,
        }
    }

    /// Register a per-frame callback and request a frame.
    pub fn subscribe(&mut self, cell: CallbackCell<G>, opts: FrameOpts) -> Unsubscribe<G> {
        let id = self.subscribers.borrow_mut().add(cell, opts);
        self.invalidate();
        Unsubscribe::new(&self.subscribers, id)
    }

    /// Ask for one more frame. Ignored for inactive and `never` roots.
    ///
    /// Returns `true` when a frame was queued.
    pub fn invalidate(&mut self) -> bool {
        if !self.active || self.frameloop == FrameloopMode::Never {
            return false;
        }
        self.frames = (self.frames + 1).min(MAX_PENDING_FRAMES);
        true
    }

    /// Render the retained tree into the root surface and flush it.
    ///
    /// Subscribers holding a non-zero priority call this themselves.
    pub fn render(&mut self) -> SkeneResult<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(misuse("root surface already released".to_owned()));
        };
        self.graph.render_root(&mut self.gfx, surface)
    }

    /// Retained tree.
    pub fn graph(&self) -> &SceneGraph<G> {
        &self.graph
    }

    /// Mutable retained tree.
    pub fn graph_mut(&mut self) -> &mut SceneGraph<G> {
        &mut self.graph
    }

    /// Backend.
    pub fn gfx(&self) -> &G {
        &self.gfx
    }

    /// Mutable backend.
    pub fn gfx_mut(&mut self) -> &mut G {
        &mut self.gfx
    }

    /// On-screen surface; `None` after teardown.
    pub fn surface(&self) -> Option<&G::Surface> {
        self.surface.as_ref()
    }

    /// Live node behind a public instance.
    pub fn node(&self, id: NodeId) -> Option<&Node<G>> {
        self.graph.get(id)
    }

    /// Mutable live node, for imperative updates between commits.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<G>> {
        self.graph.get_mut(id)
    }

    /// Frame-loop policy.
    pub fn frameloop(&self) -> FrameloopMode {
        self.frameloop
    }

    /// Switch the frame-loop policy.
    pub fn set_frameloop(&mut self, mode: FrameloopMode) {
        self.frameloop = mode;
    }

    /// Device pixel ratio from the mount options.
    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    /// Return `false` once unmounted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pending invalidations.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Frame clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Number of registered frame callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Number of subscribers that took over rendering.
    pub fn manual_count(&self) -> u32 {
        self.subscribers.borrow().manual()
    }

    /// Time of the last commit, in host milliseconds.
    pub fn last_commit(&self) -> Option<f64> {
        self.last_commit
    }

    /// Release the root surface. Nodes must already be gone.
    pub(crate) fn release(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.gfx.delete_surface(surface);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/root.rs"]
mod tests;
