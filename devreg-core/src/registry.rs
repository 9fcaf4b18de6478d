use std::sync::{Arc, RwLock};

use crate::device::{Device, DeviceFlags};
use crate::errors::LookupError;
use crate::events::{EventChannel, Subscription};
use crate::index;
use crate::item::{Item, PendingRemoval};

/// The mutable ordered sequence of items a [`Registry`] owns. Kept
/// separate from `Registry` itself so a `Weak` reference to it (and not to
/// the registry's event channels) can be handed to a pending-removal
/// timer task.
pub(crate) struct ItemStore<D: Device> {
    items: Vec<Item<D>>,
    generation_counter: u64,
}

impl<D: Device> ItemStore<D> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            generation_counter: 0,
        }
    }

    fn find_mut(&mut self, device: &Arc<D>) -> Option<&mut Item<D>> {
        self.items
            .iter_mut()
            .find(|item| Arc::ptr_eq(&item.device, device))
    }

    fn remove_item(&mut self, device: &Arc<D>) {
        self.items.retain(|item| !Arc::ptr_eq(&item.device, device));
    }

    fn next_generation(&mut self) -> u64 {
        self.generation_counter += 1;
        self.generation_counter
    }

    /// Called from the timer task when it wakes up. Removes the item and
    /// reports success only if `generation` is still the current pending
    /// removal for it — i.e. it hasn't been cancelled by an `add` or
    /// superseded by a later `remove` in the meantime.
    fn fire_if_current(&mut self, device: &Arc<D>, generation: u64) -> bool {
        let Some(index) = self
            .items
            .iter()
            .position(|item| Arc::ptr_eq(&item.device, device))
        else {
            return false;
        };

        let is_current = matches!(
            &self.items[index].pending_removal,
            Some(pending) if pending.generation == generation
        );
        if is_current {
            self.items.remove(index);
        }
        is_current
    }
}

/// The device registry: owns the item collection, drives the remove-delay
/// / replug debounce state machine, and emits `added` / `changed` /
/// `removed` events. Cheap to clone — all state lives behind `Arc`s, so
/// clones refer to the same underlying registry.
pub struct Registry<D: Device> {
    items: Arc<RwLock<ItemStore<D>>>,
    added: Arc<EventChannel<Arc<D>>>,
    changed: Arc<EventChannel<Arc<D>>>,
    removed: Arc<EventChannel<Arc<D>>>,
}

impl<D: Device> Registry<D> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(ItemStore::new())),
            added: Arc::new(EventChannel::new()),
            changed: Arc::new(EventChannel::new()),
            removed: Arc::new(EventChannel::new()),
        }
    }

    /// Registers `device`, or — if this exact handle is already
    /// registered — treats it as a replug and emits `changed` instead.
    /// Identity is by address (`Arc::ptr_eq`), never by `id()`: a new
    /// handle whose `id()` collides with an existing item's is a distinct
    /// registration.
    pub fn add(&self, device: Arc<D>) {
        let mut store = self.items.write().expect("registry lock poisoned");

        if let Some(item) = store.find_mut(&device) {
            // Cancels any pending-removal timer (dropping it aborts the task).
            item.pending_removal = None;
            drop(store);
            log::debug!("device {} re-added, emitting changed", device.id());
            self.changed.emit(device);
            return;
        }

        store.items.push(Item {
            device: device.clone(),
            registry: Arc::downgrade(&self.items),
            pending_removal: None,
        });
        drop(store);
        log::debug!("device {} added", device.id());
        self.added.emit(device);
    }

    /// Removes `device` if it is currently registered; a no-op otherwise
    /// (removals may race with other removals, so this is not an error).
    /// If the device's `remove_delay()` is zero, `removed` is emitted
    /// immediately. Otherwise the removal is debounced: the device is
    /// marked disconnected and a timer is started, with no emission yet.
    /// A matching `add()` for the same handle within the delay cancels the
    /// timer and emits `changed` instead.
    pub fn remove(&self, device: Arc<D>) {
        let mut store = self.items.write().expect("registry lock poisoned");

        let Some(item) = store.find_mut(&device) else {
            log::debug!("remove on untracked device {}, ignoring", device.id());
            return;
        };
        // Cancel any removal already in flight; it's about to be replaced
        // (or the immediate path below will drop the item outright).
        item.pending_removal = None;
        let registry_weak = item.registry.clone();

        let delay = device.remove_delay();
        if delay.is_zero() {
            store.remove_item(&device);
            drop(store);
            log::debug!("device {} removed", device.id());
            self.removed.emit(device);
            return;
        }

        device.set_flags(DeviceFlags::DISCONNECTED);
        let generation = store.next_generation();
        let removed_channel = self.removed.clone();
        let task_device = device.clone();

        log::debug!(
            "device {} removal debounced for {:?}",
            device.id(),
            delay
        );
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(items) = registry_weak.upgrade() else {
                return;
            };
            let fired = {
                let mut store = items.write().expect("registry lock poisoned");
                store.fire_if_current(&task_device, generation)
            };
            if fired {
                log::debug!("debounced removal of {} fired", task_device.id());
                removed_channel.emit(task_device);
            }
        });

        match store.find_mut(&device) {
            Some(item) => {
                item.pending_removal = Some(PendingRemoval {
                    generation,
                    handle: handle.into(),
                });
            }
            None => handle.abort(),
        }
    }

    /// An independent snapshot of every currently-tracked device, in
    /// insertion order. Later mutations are not observable through an
    /// already-taken snapshot.
    pub fn all(&self) -> Vec<Arc<D>> {
        self.items
            .read()
            .expect("registry lock poisoned")
            .items
            .iter()
            .map(|item| item.device.clone())
            .collect()
    }

    pub fn find_by_guid(&self, guid: &str) -> Result<Arc<D>, LookupError> {
        let store = self.items.read().expect("registry lock poisoned");
        index::find_by_guid(&store.items, guid)
    }

    pub fn find_by_id(&self, id_or_prefix: &str) -> Result<Arc<D>, LookupError> {
        let store = self.items.read().expect("registry lock poisoned");
        index::find_by_id(&store.items, id_or_prefix)
    }

    pub fn on_added(&self, subscriber: impl Fn(Arc<D>) + Send + Sync + 'static) -> Subscription<Arc<D>> {
        self.added.subscribe(subscriber)
    }

    pub fn on_changed(&self, subscriber: impl Fn(Arc<D>) + Send + Sync + 'static) -> Subscription<Arc<D>> {
        self.changed.subscribe(subscriber)
    }

    pub fn on_removed(&self, subscriber: impl Fn(Arc<D>) + Send + Sync + 'static) -> Subscription<Arc<D>> {
        self.removed.subscribe(subscriber)
    }
}

impl<D: Device> Default for Registry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Device> Clone for Registry<D> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            added: self.added.clone(),
            changed: self.changed.clone(),
            removed: self.removed.clone(),
        }
    }
}
