use std::time::Duration;

bitflags::bitflags! {
    /// Flags the registry sets on a [`Device`] as it drives the replug
    /// state machine. The device is free to carry additional flags of its
    /// own; the registry only ever sets [`DeviceFlags::DISCONNECTED`] and
    /// never clears it (see the re-add open question in the design notes).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DeviceFlags: u32 {
        const NONE = 0;
        const DISCONNECTED = 1 << 0;
        const UPDATABLE = 1 << 1;
        const NEEDS_REBOOT = 1 << 2;
    }
}

/// The capability surface the registry requires from a device handle.
///
/// The registry never constructs, parses, or otherwise interprets a
/// device; it only calls these methods and compares handles by address
/// (`Arc::ptr_eq`). Implementations are free to hold whatever firmware
/// state, attribute schema, or transport handle they need behind this
/// trait.
pub trait Device: Send + Sync + 'static {
    /// The primary identifier, conventionally a hex content hash. Must be
    /// non-empty.
    fn id(&self) -> &str;

    /// An alternate identifier for the same device, used when a device is
    /// re-exposed under a renamed id. Absent for most devices.
    fn equivalent_id(&self) -> Option<&str> {
        None
    }

    /// Whether this device carries the given GUID. A device may carry
    /// zero or more GUIDs; uniqueness across devices is not enforced here.
    fn has_guid(&self, guid: &str) -> bool;

    /// The debounce window: how long the registry waits after a `remove`
    /// before treating the device as truly gone. Read at removal time, not
    /// at add time, so mutating this between `add` and `remove` is
    /// observed.
    fn remove_delay(&self) -> Duration;

    /// Effectful: invoked by the registry when a removal is debounced, to
    /// mark the device as present-but-disconnected. The registry does not
    /// clear this flag on a subsequent re-add; see the design notes.
    fn set_flags(&self, flags: DeviceFlags);
}
