//! Per-frame tick distribution with scoped subscriptions.
//!
//! The hosting editor owns one [`FrameLoop`] and ticks it from its update
//! callback. Listeners hold a [`FrameSubscription`] guard; dropping the
//! guard unregisters the listener, so a disposed compositor can never be
//! called back into after its resources are gone.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// A frame-tick callback.
pub type TickCallback = Rc<RefCell<dyn FnMut()>>;

struct Listener {
    id: u64,
    callback: Weak<RefCell<dyn FnMut()>>,
}

#[derive(Default)]
struct FrameLoopInner {
    listeners: RefCell<Vec<Listener>>,
    next_id: Cell<u64>,
}

/// Distributes the editor's per-frame update to subscribed listeners.
#[derive(Clone, Default)]
pub struct FrameLoop {
    inner: Rc<FrameLoopInner>,
}

impl FrameLoop {
    /// Create an empty frame loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a callback. The subscription lasts until the returned
    /// guard is dropped or the callback itself is dropped.
    pub fn subscribe(&self, callback: &TickCallback) -> FrameSubscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            callback: Rc::downgrade(callback),
        });
        FrameSubscription {
            owner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver one tick to every live listener.
    ///
    /// Dead entries (dropped callbacks) are pruned. Callbacks are invoked
    /// after the listener list borrow is released, so a listener may
    /// subscribe or unsubscribe during its own tick.
    pub fn tick(&self) {
        let callbacks: Vec<TickCallback> = {
            let mut listeners = self.inner.listeners.borrow_mut();
            listeners.retain(|listener| listener.callback.strong_count() > 0);
            listeners
                .iter()
                .filter_map(|listener| listener.callback.upgrade())
                .collect()
        };
        for callback in callbacks {
            (callback.borrow_mut())();
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.callback.strong_count() > 0)
            .count()
    }
}

/// Scoped handle for one frame-loop subscription.
///
/// Unregisters the listener on drop.
#[derive(Debug)]
pub struct FrameSubscription {
    owner: Weak<FrameLoopInner>,
    id: u64,
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.owner.upgrade() {
            inner
                .listeners
                .borrow_mut()
                .retain(|listener| listener.id != self.id);
        }
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl std::fmt::Debug for FrameLoopInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoopInner").finish_non_exhaustive()
    }
}
