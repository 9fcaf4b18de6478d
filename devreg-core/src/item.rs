use std::sync::{Arc, RwLock, Weak};

use crate::device::Device;
use crate::util::DropJoinHandle;

/// One per live device registration. Exactly one `Item` owns a given
/// `Device`; dropping the `Item` releases that ownership and, if a
/// removal was pending, cancels its timer.
pub(crate) struct Item<D: Device> {
    pub(crate) device: Arc<D>,
    /// Back-reference to the owning registry's item store. A relation,
    /// never ownership: it must not keep the registry alive, and is
    /// cloned into the pending-removal timer task so the timer can
    /// re-enter the registry when it fires, failing silently if the
    /// registry has already been dropped.
    pub(crate) registry: Weak<RwLock<super::registry::ItemStore<D>>>,
    pub(crate) pending_removal: Option<PendingRemoval>,
}

/// Marks that a removal has been requested on this item and not yet
/// superseded by a cancelling `add` or a newer `remove`. `generation`
/// lets the timer task tell, when it wakes up, whether it is still the
/// removal that is current for this item (see `ItemStore::fire_if_current`).
pub(crate) struct PendingRemoval {
    pub(crate) generation: u64,
    // Held only to cancel the timer on drop; never read directly.
    #[allow(dead_code)]
    pub(crate) handle: DropJoinHandle<()>,
}
