use std::sync::{Arc, Mutex};
use std::time::Duration;

use devreg_core::{Device, DeviceFlags, Registry};

#[derive(Debug)]
struct TestDevice {
    id: String,
    equivalent_id: Option<String>,
    guids: Vec<String>,
    remove_delay: Duration,
    flags: Mutex<DeviceFlags>,
}

impl TestDevice {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            equivalent_id: None,
            guids: Vec::new(),
            remove_delay: Duration::ZERO,
            flags: Mutex::new(DeviceFlags::NONE),
        })
    }

    fn with_delay(id: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            equivalent_id: None,
            guids: Vec::new(),
            remove_delay: delay,
            flags: Mutex::new(DeviceFlags::NONE),
        })
    }

    fn with_equivalent_id(id: &str, equivalent_id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            equivalent_id: Some(equivalent_id.to_string()),
            guids: Vec::new(),
            remove_delay: Duration::ZERO,
            flags: Mutex::new(DeviceFlags::NONE),
        })
    }

    fn with_guid(id: &str, guid: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            equivalent_id: None,
            guids: vec![guid.to_string()],
            remove_delay: Duration::ZERO,
            flags: Mutex::new(DeviceFlags::NONE),
        })
    }

    fn flags(&self) -> DeviceFlags {
        *self.flags.lock().unwrap()
    }
}

impl Device for TestDevice {
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
        *self.flags.lock().unwrap() = flags;
    }
}

fn ids(devices: &[Arc<TestDevice>]) -> Vec<&str> {
    devices.iter().map(|d| d.id()).collect()
}

#[tokio::test]
async fn add_emits_added_and_populates_all() {
    let registry: Registry<TestDevice> = Registry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let _sub = registry.on_added(move |d| seen_clone.lock().unwrap().push(d.id().to_string()));

    let device = TestDevice::new("abc123");
    registry.add(device.clone());

    assert_eq!(*seen.lock().unwrap(), vec!["abc123"]);
    assert_eq!(ids(&registry.all()), vec!["abc123"]);
}

#[tokio::test]
async fn re_adding_same_handle_emits_changed_not_added() {
    let registry: Registry<TestDevice> = Registry::new();
    let added = Arc::new(Mutex::new(0));
    let changed = Arc::new(Mutex::new(0));
    let added_clone = added.clone();
    let changed_clone = changed.clone();
    let _sub_added = registry.on_added(move |_| *added_clone.lock().unwrap() += 1);
    let _sub_changed = registry.on_changed(move |_| *changed_clone.lock().unwrap() += 1);

    let device = TestDevice::new("abc123");
    registry.add(device.clone());
    registry.add(device.clone());

    assert_eq!(*added.lock().unwrap(), 1);
    assert_eq!(*changed.lock().unwrap(), 1);
    assert_eq!(ids(&registry.all()), vec!["abc123"]);
}

#[tokio::test]
async fn two_devices_sharing_an_id_are_distinct_registrations() {
    let registry: Registry<TestDevice> = Registry::new();
    let added = Arc::new(Mutex::new(0));
    let added_clone = added.clone();
    let _sub = registry.on_added(move |_| *added_clone.lock().unwrap() += 1);

    registry.add(TestDevice::new("abc123"));
    registry.add(TestDevice::new("abc123"));

    assert_eq!(*added.lock().unwrap(), 2);
    assert_eq!(registry.all().len(), 2);
}

#[tokio::test]
async fn zero_delay_remove_emits_immediately() {
    let registry: Registry<TestDevice> = Registry::new();
    let removed = Arc::new(Mutex::new(Vec::new()));
    let removed_clone = removed.clone();
    let _sub = registry.on_removed(move |d| removed_clone.lock().unwrap().push(d.id().to_string()));

    let device = TestDevice::new("abc123");
    registry.add(device.clone());
    registry.remove(device);

    assert_eq!(*removed.lock().unwrap(), vec!["abc123"]);
    assert!(registry.all().is_empty());
}

#[tokio::test]
async fn remove_on_untracked_device_is_a_silent_no_op() {
    let registry: Registry<TestDevice> = Registry::new();
    let removed = Arc::new(Mutex::new(0));
    let removed_clone = removed.clone();
    let _sub = registry.on_removed(move |_| *removed_clone.lock().unwrap() += 1);

    registry.remove(TestDevice::new("never-added"));

    assert_eq!(*removed.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn debounced_remove_waits_for_the_delay_then_fires() {
    let registry: Registry<TestDevice> = Registry::new();
    let removed = Arc::new(Mutex::new(Vec::new()));
    let removed_clone = removed.clone();
    let _sub = registry.on_removed(move |d| removed_clone.lock().unwrap().push(d.id().to_string()));

    let device = TestDevice::with_delay("abc123", Duration::from_secs(5));
    registry.add(device.clone());
    registry.remove(device.clone());

    // Still present and merely flagged disconnected until the delay elapses.
    assert_eq!(ids(&registry.all()), vec!["abc123"]);
    assert_eq!(device.flags(), DeviceFlags::DISCONNECTED);
    assert!(removed.lock().unwrap().is_empty());

    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;

    assert_eq!(*removed.lock().unwrap(), vec!["abc123"]);
    assert!(registry.all().is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_second_remove_supersedes_the_first_pending_timer() {
    let registry: Registry<TestDevice> = Registry::new();
    let removed = Arc::new(Mutex::new(Vec::new()));
    let removed_clone = removed.clone();
    let _sub = registry.on_removed(move |d| removed_clone.lock().unwrap().push(d.id().to_string()));

    let device = TestDevice::with_delay("abc123", Duration::from_millis(200));
    registry.add(device.clone());
    registry.remove(device.clone());
    registry.remove(device.clone());

    tokio::time::advance(Duration::from_millis(250)).await;
    tokio::task::yield_now().await;

    // Only one removal ever fires, even though remove() was called twice
    // on the same pending item.
    assert_eq!(*removed.lock().unwrap(), vec!["abc123"]);
    assert!(registry.all().is_empty());
}

#[tokio::test]
async fn zero_delay_add_remove_cycle_emits_in_order() {
    let registry: Registry<TestDevice> = Registry::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let added_events = events.clone();
    let removed_events = events.clone();
    let _sub_added = registry.on_added(move |_| added_events.lock().unwrap().push("added"));
    let _sub_removed = registry.on_removed(move |_| removed_events.lock().unwrap().push("removed"));

    let device = TestDevice::new("abc123");
    registry.add(device.clone());
    registry.remove(device.clone());
    registry.add(device.clone());
    registry.remove(device.clone());

    assert_eq!(
        *events.lock().unwrap(),
        vec!["added", "removed", "added", "removed"]
    );
}

#[tokio::test(start_paused = true)]
async fn replug_within_the_delay_cancels_the_removal() {
    let registry: Registry<TestDevice> = Registry::new();
    let removed = Arc::new(Mutex::new(0));
    let changed = Arc::new(Mutex::new(0));
    let removed_clone = removed.clone();
    let changed_clone = changed.clone();
    let _sub_removed = registry.on_removed(move |_| *removed_clone.lock().unwrap() += 1);
    let _sub_changed = registry.on_changed(move |_| *changed_clone.lock().unwrap() += 1);

    let device = TestDevice::with_delay("abc123", Duration::from_secs(5));
    registry.add(device.clone());
    registry.remove(device.clone());

    tokio::time::advance(Duration::from_secs(2)).await;
    registry.add(device.clone());

    tokio::time::advance(Duration::from_secs(10)).await;
    tokio::task::yield_now().await;

    assert_eq!(*removed.lock().unwrap(), 0);
    assert_eq!(*changed.lock().unwrap(), 1);
    assert_eq!(ids(&registry.all()), vec!["abc123"]);
    // A re-add cancels the pending removal but does not clear the
    // disconnected flag the registry set while the removal was debounced.
    assert_eq!(device.flags(), DeviceFlags::DISCONNECTED);
}

#[tokio::test]
async fn find_by_guid_matches_and_reports_not_found() {
    let registry: Registry<TestDevice> = Registry::new();
    registry.add(TestDevice::with_guid("abc123", "11111111-1111-1111-1111-111111111111"));

    let found = registry
        .find_by_guid("11111111-1111-1111-1111-111111111111")
        .unwrap();
    assert_eq!(found.id(), "abc123");

    let err = registry.find_by_guid("missing").unwrap_err();
    assert_eq!(err.to_string(), "GUID missing was not found");
}

#[tokio::test]
async fn find_by_id_resolves_a_unique_prefix() {
    let registry: Registry<TestDevice> = Registry::new();
    registry.add(TestDevice::new("abc123"));
    registry.add(TestDevice::new("def456"));

    assert_eq!(registry.find_by_id("abc").unwrap().id(), "abc123");
    assert_eq!(registry.find_by_id("abc123").unwrap().id(), "abc123");

    let err = registry.find_by_id("zzz").unwrap_err();
    assert_eq!(err.to_string(), "device ID zzz was not found");
}

#[tokio::test]
async fn find_by_id_reports_ambiguity_across_distinct_items() {
    let registry: Registry<TestDevice> = Registry::new();
    registry.add(TestDevice::new("abc111"));
    registry.add(TestDevice::new("abc222"));

    let err = registry.find_by_id("abc").unwrap_err();
    assert_eq!(err.to_string(), "device ID abc was not unique");
}

#[tokio::test]
async fn find_by_id_is_not_ambiguous_when_both_candidates_are_the_same_item() {
    let registry: Registry<TestDevice> = Registry::new();
    registry.add(TestDevice::with_equivalent_id("abc123", "abcxyz"));

    // "abc" prefix-matches both id() and equivalent_id() of the *same* item.
    assert_eq!(registry.find_by_id("abc").unwrap().id(), "abc123");
}

#[tokio::test]
async fn revoked_subscription_stops_receiving_events() {
    let registry: Registry<TestDevice> = Registry::new();
    let seen = Arc::new(Mutex::new(0));
    let seen_clone = seen.clone();
    let sub = registry.on_added(move |_| *seen_clone.lock().unwrap() += 1);

    registry.add(TestDevice::new("abc123"));
    sub.revoke();
    registry.add(TestDevice::new("def456"));

    assert_eq!(*seen.lock().unwrap(), 1);
}
