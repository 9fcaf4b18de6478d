use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use devreg_core::{Device, Registry, Subscription};
use devreg_device::SimDevice;
use serde::Serialize;

const CAPACITY: usize = 256;

/// One entry in the bounded in-memory event log backing `GET /events`.
#[derive(Clone, Debug, Serialize)]
pub struct EventRecord {
    pub kind: &'static str,
    pub device_id: String,
    pub unix_time_secs: u64,
}

/// A bounded ring buffer of the most recent registry lifecycle events,
/// fed by subscribing to `Registry::on_added`/`on_changed`/`on_removed`.
/// Exists purely for the HTTP diagnostic surface; the registry itself has
/// no notion of history.
pub struct EventLog {
    records: Mutex<VecDeque<EventRecord>>,
}

impl EventLog {
    fn push(&self, kind: &'static str, device_id: String) {
        let record = EventRecord {
            kind,
            device_id,
            unix_time_secs: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        let mut records = self.records.lock().expect("event log lock poisoned");
        if records.len() == CAPACITY {
            records.pop_front();
        }
        records.push_back(record);
    }

    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.records
            .lock()
            .expect("event log lock poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

/// Subscribes a fresh [`EventLog`] to `registry`'s three channels. The
/// returned subscriptions must be kept alive for as long as the log
/// should keep recording; dropping them (or the registry) stops delivery.
pub fn attach(registry: &Registry<SimDevice>) -> (Arc<EventLog>, Vec<Subscription<Arc<SimDevice>>>) {
    let log = Arc::new(EventLog {
        records: Mutex::new(VecDeque::with_capacity(CAPACITY)),
    });

    let added_log = log.clone();
    let added = registry.on_added(move |d| added_log.push("added", d.id().to_string()));

    let changed_log = log.clone();
    let changed = registry.on_changed(move |d| changed_log.push("changed", d.id().to_string()));

    let removed_log = log.clone();
    let removed = registry.on_removed(move |d| removed_log.push("removed", d.id().to_string()));

    (log, vec![added, changed, removed])
}
