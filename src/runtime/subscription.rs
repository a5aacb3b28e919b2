//! Per-frame callback registry.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::foundation::error::SkeneResult;
use crate::render::backend::GraphicsBackend;
use crate::runtime::root::RootState;

/// Per-frame callback: receives the root and the clock delta in seconds.
pub type FrameCallback<G> = Box<dyn FnMut(&mut RootState<G>, f64) -> SkeneResult<()>>;

/// Whether a subscriber runs before or after the automatic render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sequence {
    /// Run before the render walk.
    #[default]
    Before,
    /// Run after the render walk.
    After,
}

/// Registration options for a frame callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameOpts {
    /// Ordering weight; any non-zero value also takes over rendering for the root.
    pub priority: i32,
    /// Position relative to the automatic render.
    pub sequence: Sequence,
}

/// Shared cell holding the current callback of a subscriber.
///
/// Replacing the callback keeps the subscription (and its position) intact.
pub struct CallbackCell<G: GraphicsBackend>(Rc<RefCell<FrameCallback<G>>>);

impl<G: GraphicsBackend> Clone for CallbackCell<G> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<G: GraphicsBackend> fmt::Debug for CallbackCell<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackCell(..)")
    }
}

impl<G: GraphicsBackend> CallbackCell<G> {
    /// Wrap a callback.
    pub fn new(callback: impl FnMut(&mut RootState<G>, f64) -> SkeneResult<()> + 'static) -> Self {
        Self(Rc::new(RefCell::new(Box::new(callback))))
    }

    /// Swap in a new callback.
    pub fn set(&self, callback: impl FnMut(&mut RootState<G>, f64) -> SkeneResult<()> + 'static) {
        match self.0.try_borrow_mut() {
            Ok(mut cur) => *cur = Box::new(callback),
            Err(_) => tracing::warn!("frame callback replaced while running; keeping the old one"),
        }
    }

    pub(crate) fn invoke(&self, root: &mut RootState<G>, delta: f64) -> SkeneResult<()> {
        match self.0.try_borrow_mut() {
            Ok(mut cb) => (*cb)(root, delta),
            Err(_) => {
                tracing::warn!("frame callback re-entered; skipping");
                Ok(())
            }
        }
    }
}

/// One registered per-frame callback.
#[derive(Debug)]
pub struct Subscription<G: GraphicsBackend> {
    /// Registration id.
    pub id: u64,
    /// Current callback.
    pub cell: CallbackCell<G>,
    /// Ordering weight.
    pub priority: i32,
    /// Before or after the render.
    pub sequence: Sequence,
}

/// Subscribers of one root, sorted ascending by priority (ties in insertion order).
#[derive(Debug)]
pub struct Subscribers<G: GraphicsBackend> {
    entries: Vec<Subscription<G>>,
    next_id: u64,
    manual: u32,
}

impl<G: GraphicsBackend> Default for Subscribers<G> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            manual: 0,
        }
    }
}

impl<G: GraphicsBackend> Subscribers<G> {
    /// Register `cell`; returns its id.
    pub fn add(&mut self, cell: CallbackCell<G>, opts: FrameOpts) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        if opts.priority != 0 {
            self.manual += 1;
        }
        let at = self
            .entries
            .partition_point(|s| s.priority <= opts.priority);
        self.entries.insert(
            at,
            Subscription {
                id,
                cell,
                priority: opts.priority,
                sequence: opts.sequence,
            },
        );
        id
    }

    /// Drop subscription `id`. Returns `false` when it was already gone.
    pub fn remove(&mut self, id: u64) -> bool {
        let Some(at) = self.entries.iter().position(|s| s.id == id) else {
            return false;
        };
        let gone = self.entries.remove(at);
        if gone.priority != 0 {
            self.manual = self.manual.saturating_sub(1);
        }
        true
    }

    /// Callbacks of one sequence, in run order.
    pub fn snapshot(&self, sequence: Sequence) -> Vec<(u64, CallbackCell<G>)> {
        self.entries
            .iter()
            .filter(|s| s.sequence == sequence)
            .map(|s| (s.id, s.cell.clone()))
            .collect()
    }

    /// Return `true` while `id` is registered.
    pub fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|s| s.id == id)
    }

    /// Number of subscribers with a non-zero priority.
    pub fn manual(&self) -> u32 {
        self.manual
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` with no subscribers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Priorities in run order.
    pub fn priorities(&self) -> Vec<i32> {
        self.entries.iter().map(|s| s.priority).collect()
    }
}

/// Handle that removes a subscription. Does nothing once the root is gone.
pub struct Unsubscribe<G: GraphicsBackend> {
    list: Weak<RefCell<Subscribers<G>>>,
    id: u64,
}

impl<G: GraphicsBackend> fmt::Debug for Unsubscribe<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

impl<G: GraphicsBackend> Unsubscribe<G> {
    pub(crate) fn new(list: &Rc<RefCell<Subscribers<G>>>, id: u64) -> Self {
        Self {
            list: Rc::downgrade(list),
            id,
        }
    }

    /// Remove the subscription. Returns `true` if it was still registered.
    pub fn unsubscribe(&self) -> bool {
        let Some(list) = self.list.upgrade() else {
            return false;
        };
        let Ok(mut list) = list.try_borrow_mut() else {
            return false;
        };
        list.remove(self.id)
    }

    /// Registration id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/subscription.rs"]
mod tests;
