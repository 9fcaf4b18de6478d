//! In-memory device registry with a remove-delay / replug debounce state
//! machine, GUID and device-id lookup, and an added/changed/removed event
//! contract.
//!
//! The registry treats the devices it tracks as opaque handles (see
//! [`Device`]); discovery, update orchestration, wire protocols and
//! persistence all live outside this crate.

mod device;
mod errors;
mod events;
mod index;
mod item;
mod registry;
mod util;

pub use device::{Device, DeviceFlags};
pub use errors::LookupError;
pub use events::Subscription;
pub use registry::Registry;
