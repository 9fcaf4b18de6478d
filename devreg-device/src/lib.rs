//! A simulated device handle: the thing a discovery plugin actually
//! builds and feeds to the registry's `add`/`remove` in this repo, since
//! there is no real USB/network enumeration here.
//!
//! [`SimDevice`] carries interior-mutable flags (set by the registry as it
//! drives the replug state machine) plus a fixed remove delay, and exposes
//! a serializable [`DeviceSnapshot`] for the HTTP query surface.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use devreg_core::{Device, DeviceFlags};
use serde::Serialize;

pub struct SimDevice {
    id: String,
    equivalent_id: Option<String>,
    guids: Vec<String>,
    name: String,
    remove_delay: Duration,
    flags: Mutex<DeviceFlags>,
}

impl SimDevice {
    pub fn builder(id: impl Into<String>) -> SimDeviceBuilder {
        SimDeviceBuilder {
            id: id.into(),
            equivalent_id: None,
            guids: Vec::new(),
            name: None,
            remove_delay: Duration::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            id: self.id.clone(),
            equivalent_id: self.equivalent_id.clone(),
            guids: self.guids.clone(),
            name: self.name.clone(),
            flags: self
                .flags
                .lock()
                .expect("device lock poisoned")
                .iter_names()
                .map(|(name, _)| name)
                .collect(),
        }
    }
}

impl Device for SimDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn equivalent_id(&self) -> Option<&str> {
        self.equivalent_id.as_deref()
    }

    fn has_guid(&self, guid: &str) -> bool {
        self.guids.iter().any(|g| g == guid)
    }

    fn remove_delay(&self) -> Duration {
        self.remove_delay
    }

    fn set_flags(&self, flags: DeviceFlags) {
        *self.flags.lock().expect("device lock poisoned") = flags;
    }
}

/// Builds a [`SimDevice`] behind the `Arc` the registry requires.
pub struct SimDeviceBuilder {
    id: String,
    equivalent_id: Option<String>,
    guids: Vec<String>,
    name: Option<String>,
    remove_delay: Duration,
}

impl SimDeviceBuilder {
    pub fn equivalent_id(mut self, id: impl Into<String>) -> Self {
        self.equivalent_id = Some(id.into());
        self
    }

    pub fn guid(mut self, guid: impl Into<String>) -> Self {
        self.guids.push(guid.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn remove_delay(mut self, delay: Duration) -> Self {
        self.remove_delay = delay;
        self
    }

    pub fn build(self) -> Arc<SimDevice> {
        let id = self.id;
        Arc::new(SimDevice {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            equivalent_id: self.equivalent_id,
            guids: self.guids,
            remove_delay: self.remove_delay,
            flags: Mutex::new(DeviceFlags::NONE),
        })
    }
}

/// A point-in-time view of a [`SimDevice`], suitable for JSON serialization
/// over the daemon's HTTP query surface.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSnapshot {
    pub id: String,
    pub equivalent_id: Option<String>,
    pub guids: Vec<String>,
    pub name: String,
    pub flags: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_name_to_id() {
        let device = SimDevice::builder("abc123").build();
        assert_eq!(device.name(), "abc123");
        assert_eq!(device.id(), "abc123");
        assert_eq!(device.remove_delay(), Duration::ZERO);
    }

    #[test]
    fn snapshot_reports_flags_set_by_the_registry() {
        let device = SimDevice::builder("abc123")
            .guid("11111111-1111-1111-1111-111111111111")
            .build();
        device.set_flags(DeviceFlags::DISCONNECTED);

        let snapshot = device.snapshot();
        assert_eq!(snapshot.id, "abc123");
        assert_eq!(
            snapshot.guids,
            vec!["11111111-1111-1111-1111-111111111111".to_string()]
        );
        assert_eq!(snapshot.flags, vec!["DISCONNECTED"]);
    }
}
