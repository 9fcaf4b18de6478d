use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Listener<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A small broadcast primitive backing one of the registry's `added`,
/// `changed`, or `removed` channels. Subscribers are called in
/// registration order; a subscriber's own errors (panics aside) never
/// propagate back to the `add`/`remove` caller.
pub(crate) struct EventChannel<T> {
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone> EventChannel<T> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(T) + Send + Sync + 'static,
    ) -> Subscription<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("event channel lock poisoned")
            .push((id, Arc::new(listener)));
        Subscription {
            channel: Arc::downgrade(self),
            id,
        }
    }

    /// Calls every subscriber in registration order. Takes a snapshot of
    /// the listener list before calling out, so a subscriber that
    /// subscribes or revokes from within its own callback doesn't observe
    /// a torn list or deadlock on `listeners`.
    pub(crate) fn emit(&self, value: T) {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .lock()
            .expect("event channel lock poisoned")
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(value.clone());
        }
    }
}

/// A revocable handle to a channel subscription. Dropping it unregisters
/// the listener, same as calling `revoke()` explicitly (see
/// `util.rs::DropJoinHandle` for the same cancel-on-drop idiom applied to
/// a timer task instead of a listener). Dropping the `Registry` drops the
/// channel along with it, so an outstanding `Subscription` simply becomes
/// inert (`revoke` is then a no-op).
pub struct Subscription<T> {
    channel: Weak<EventChannel<T>>,
    id: u64,
}

impl<T> Subscription<T> {
    /// Unregisters the subscriber. Idempotent: calling this more than
    /// once, or after the owning registry has been dropped, is harmless.
    pub fn revoke(&self) {
        if let Some(channel) = self.channel.upgrade() {
            channel
                .listeners
                .lock()
                .expect("event channel lock poisoned")
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.revoke();
    }
}
