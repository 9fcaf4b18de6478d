use std::sync::Arc;
use std::time::Duration;

use devreg_core::{Device, Registry};
use devreg_device::SimDevice;

/// Stands in for a real USB/PCI/DMI prober: registers its fixed set of
/// devices once, then idles, periodically re-announcing them so a restart
/// of this task (or a future real plugin) can rely on `Registry::add`
/// being safe to call again for an already-present device.
pub async fn simulated_discovery_task(registry: Registry<SimDevice>, devices: Vec<Arc<SimDevice>>) {
    loop {
        for device in &devices {
            log::trace!("discovered {}", device.id());
            registry.add(device.clone());
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
}
