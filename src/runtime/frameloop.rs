//! Process-wide frame driver.
//!
//! [`Runtime`] is an explicit registry of mounted roots keyed by [`TargetId`]. The host
//! drives it: whenever [`Runtime::frame_requested`] is set it calls [`Runtime::frame`]
//! with the next animation-frame timestamp.

use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::config::{FrameloopMode, MountOpts};
use crate::foundation::core::TargetId;
use crate::foundation::error::SkeneResult;
use crate::host::element::Element;
use crate::host::reconcile::Reconciler;
use crate::render::backend::GraphicsBackend;
use crate::runtime::root::RootState;
use crate::runtime::subscription::{CallbackCell, FrameOpts, Sequence, Unsubscribe};
use crate::scene::graph::misuse;

/// Called once a root has been torn down.
pub type UnmountCallback = Box<dyn FnOnce()>;

struct Teardown {
    deadline_ms: f64,
    callback: Option<UnmountCallback>,
}

/// A mounted target: root state plus the committed element tree.
pub struct Root<G: GraphicsBackend> {
    state: RootState<G>,
    fibers: Reconciler,
    grace_ms: u64,
    teardown: Option<Teardown>,
}

impl<G: GraphicsBackend> Root<G> {
    /// Root state.
    pub fn state(&self) -> &RootState<G> {
        &self.state
    }

    /// Mutable root state.
    pub fn state_mut(&mut self) -> &mut RootState<G> {
        &mut self.state
    }

    /// Committed element tree.
    pub fn fibers(&self) -> &Reconciler {
        &self.fibers
    }

    /// Return `true` while an unmount is waiting out its grace delay.
    pub fn is_tearing_down(&self) -> bool {
        self.teardown.is_some()
    }
}

/// What one call to [`Runtime::frame`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// A frame had been requested, so the tick ran.
    pub ran: bool,
    /// Roots whose tree was rendered by the loop.
    pub rendered: Vec<TargetId>,
    /// Frame callbacks invoked.
    pub callbacks: usize,
    /// Roots released this frame.
    pub torn_down: Vec<TargetId>,
    /// Another frame was requested.
    pub next_frame: bool,
}

/// Registry of mounted roots and the shared frame loop.
pub struct Runtime<G: GraphicsBackend> {
    roots: BTreeMap<TargetId, Root<G>>,
    running: bool,
    frame_requested: bool,
}

impl<G: GraphicsBackend> Default for Runtime<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GraphicsBackend> fmt::Debug for Runtime<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("roots", &self.roots.keys().collect::<Vec<_>>())
            .field("running", &self.running)
            .field("frame_requested", &self.frame_requested)
            .finish()
    }
}

impl<G: GraphicsBackend> Runtime<G> {
    /// Empty registry with an idle loop.
    pub fn new() -> Self {
        Self {
            roots: BTreeMap::new(),
            running: false,
            frame_requested: false,
        }
    }

    /// Return `true` when the host should call [`Runtime::frame`].
    ///
    /// Also covers roots invalidated directly through [`RootState::invalidate`].
    pub fn frame_requested(&self) -> bool {
        self.frame_requested || self.has_pending_roots()
    }

    fn has_pending_roots(&self) -> bool {
        self.roots
            .values()
            .any(|r| r.state.active && r.state.frames > 0)
    }

    /// Return `true` while the loop has work scheduled.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Mounted root for `target`.
    pub fn root(&self, target: TargetId) -> Option<&Root<G>> {
        self.roots.get(&target)
    }

    /// Mutable mounted root for `target`.
    pub fn root_mut(&mut self, target: TargetId) -> Option<&mut Root<G>> {
        self.roots.get_mut(&target)
    }

    /// Mounted targets, in key order.
    pub fn targets(&self) -> Vec<TargetId> {
        self.roots.keys().copied().collect()
    }

    /// Render `elements` into `target`.
    ///
    /// The first mount of a target calls `create` for its backend and on-screen surface;
    /// later mounts reuse the root and only reconcile. A pending unmount is cancelled.
    #[tracing::instrument(level = "debug", skip_all, fields(target = target.0))]
    pub fn mount<F>(
        &mut self,
        target: TargetId,
        elements: &[Element],
        opts: &MountOpts,
        create: F,
    ) -> SkeneResult<TargetId>
    where
        F: FnOnce() -> SkeneResult<(G, G::Surface)>,
    {
        if !self.roots.contains_key(&target) {
            let (gfx, surface) = create()?;
            tracing::debug!(frameloop = ?opts.frameloop, "root created");
            self.roots.insert(
                target,
                Root {
                    state: RootState::new(gfx, surface, opts),
                    fibers: Reconciler::new(),
                    grace_ms: opts.unmount_grace_ms,
                    teardown: None,
                },
            );
        }
        let root = self
            .roots
            .get_mut(&target)
            .ok_or_else(|| misuse(format!("no root for {target:?}")))?;
        if root.teardown.take().is_some() {
            root.state.active = true;
        }
        root.fibers.update_container(&mut root.state, elements)?;
        self.invalidate(Some(target));
        Ok(target)
    }

    /// Delete the tree of `target` and release the root once the grace delay from its
    /// mount options has passed.
    ///
    /// `callback` runs when the root is finally released, during a later
    /// [`Runtime::frame`].
    #[tracing::instrument(level = "debug", skip_all, fields(target = target.0))]
    pub fn unmount(
        &mut self,
        target: TargetId,
        now_ms: f64,
        callback: Option<UnmountCallback>,
    ) -> SkeneResult<()> {
        let root = self
            .roots
            .get_mut(&target)
            .ok_or_else(|| misuse(format!("unmount of unknown target {target:?}")))?;
        root.fibers.update_container(&mut root.state, &[])?;
        root.state.active = false;
        root.teardown = Some(Teardown {
            deadline_ms: now_ms + root.grace_ms as f64,
            callback,
        });
        self.request_frame();
        Ok(())
    }

    /// Ask for one more frame on `target`, or on every root when `None`.
    ///
    /// Inactive roots and roots in `never` mode ignore the request.
    pub fn invalidate(&mut self, target: Option<TargetId>) {
        let mut queued = false;
        match target {
            Some(t) => {
                if let Some(root) = self.roots.get_mut(&t) {
                    queued = root.state.invalidate();
                }
            }
            None => {
                for root in self.roots.values_mut() {
                    queued |= root.state.invalidate();
                }
            }
        }
        if queued {
            self.request_frame();
        }
    }

    fn request_frame(&mut self) {
        if !self.running {
            self.running = true;
            self.frame_requested = true;
        }
    }

    /// Register a per-frame callback on `target`.
    pub fn register_frame(
        &mut self,
        target: TargetId,
        callback: impl FnMut(&mut RootState<G>, f64) -> SkeneResult<()> + 'static,
        opts: FrameOpts,
    ) -> SkeneResult<Unsubscribe<G>> {
        let root = self
            .roots
            .get_mut(&target)
            .ok_or_else(|| misuse(format!("no root for {target:?}")))?;
        let unsubscribe = root.state.subscribe(CallbackCell::new(callback), opts);
        self.invalidate(Some(target));
        Ok(unsubscribe)
    }

    /// Run one animation frame at `timestamp_ms`.
    ///
    /// Does nothing unless a frame was requested. Expired unmounts are finalized either way.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn frame(&mut self, timestamp_ms: f64) -> SkeneResult<FrameReport> {
        let mut report = FrameReport::default();
        if self.frame_requested() {
            self.frame_requested = false;
            report.ran = true;

            let mut repeat = 0;
            for (target, root) in &mut self.roots {
                let state = &mut root.state;
                if !state.active || !(state.frameloop == FrameloopMode::Always || state.frames > 0)
                {
                    continue;
                }
                let (rendered, callbacks) = tick(state, timestamp_ms)?;
                if rendered {
                    report.rendered.push(*target);
                }
                report.callbacks += callbacks;
                repeat += if state.frameloop == FrameloopMode::Always {
                    1
                } else {
                    state.frames
                };
            }
            tracing::debug!(
                rendered = report.rendered.len(),
                callbacks = report.callbacks,
                "frame"
            );
            if repeat > 0 {
                self.frame_requested = true;
            }
        }

        report.torn_down = self.finalize_teardowns(timestamp_ms);
        if self.roots.values().any(Root::is_tearing_down) {
            self.frame_requested = true;
        }
        report.next_frame = self.frame_requested;
        self.running = self.frame_requested;
        Ok(report)
    }

    fn finalize_teardowns(&mut self, now_ms: f64) -> Vec<TargetId> {
        let expired: Vec<TargetId> = self
            .roots
            .iter()
            .filter(|(_, r)| r.teardown.as_ref().is_some_and(|t| t.deadline_ms <= now_ms))
            .map(|(t, _)| *t)
            .collect();
        for target in &expired {
            if let Some(mut root) = self.roots.remove(target) {
                root.state.release();
                tracing::debug!(target = target.0, "root released");
                if let Some(cb) = root.teardown.and_then(|t| t.callback) {
                    cb();
                }
            }
        }
        expired
    }
}

/// Advance one root by a frame. Returns whether it rendered and how many callbacks ran.
fn tick<G: GraphicsBackend>(state: &mut RootState<G>, timestamp_ms: f64) -> SkeneResult<(bool, usize)> {
    let delta = state.clock.get_delta(timestamp_ms);
    let mut callbacks = 0;

    let before = state.subscribers.borrow().snapshot(Sequence::Before);
    callbacks += run(state, &before, delta)?;

    let rendered = state.subscribers.borrow().manual() == 0;
    if rendered {
        state.render()?;
    }

    let after = state.subscribers.borrow().snapshot(Sequence::After);
    callbacks += run(state, &after, delta)?;

    state.frames = state.frames.saturating_sub(1);
    Ok((rendered, callbacks))
}

fn run<G: GraphicsBackend>(
    state: &mut RootState<G>,
    cells: &[(u64, CallbackCell<G>)],
    delta: f64,
) -> SkeneResult<usize> {
    let mut n = 0;
    for (id, cell) in cells {
        // Skip callbacks unsubscribed earlier in this frame.
        if !state.subscribers.borrow().contains(*id) {
            continue;
        }
        cell.invoke(state, delta)?;
        n += 1;
    }
    Ok(n)
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/frameloop.rs"]
mod tests;
