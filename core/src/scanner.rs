//! Discovery orchestration.
//!
//! A scan runs two listeners concurrently: a link-layer sniffer capturing
//! address-resolution frames and a service browser listening for DNS-SD
//! advertisements. Both write into the shared [`AddressRegistry`]; neither
//! is allowed to fail the scan. The coordinator owns their lifetime:
//! clear, spawn, sleep out the window, signal stop, join, snapshot.

pub mod browser;
pub mod sniffer;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use sharescout_common::device::DeviceRecord;
use tracing::{debug, warn};

use crate::registry::AddressRegistry;

/// Upper bound on how long a blocking read may lag behind the stop flag.
/// On a quiet link the sniffer only notices cancellation when its capture
/// read times out, so a scan can overrun its window by up to this much.
pub const CAPTURE_READ_TIMEOUT: Duration = Duration::from_millis(250);

pub struct DiscoveryCoordinator {
    registry: Arc<AddressRegistry>,
    interface: Option<String>,
}

impl DiscoveryCoordinator {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(AddressRegistry::new()),
            interface: None,
        }
    }

    /// Pins the sniffer to a named capture interface instead of picking one.
    pub fn with_interface(name: impl Into<String>) -> Self {
        Self {
            registry: Arc::new(AddressRegistry::new()),
            interface: Some(name.into()),
        }
    }

    /// Runs one full discovery cycle and returns the merged registry
    /// snapshot. A sub-scanner that cannot start contributes zero records;
    /// the scan itself always completes.
    pub fn scan(&self, window: Duration) -> Vec<DeviceRecord> {
        self.registry.clear();
        let stop = Arc::new(AtomicBool::new(false));
        debug!(window_ms = window.as_millis() as u64, "starting scan");

        let sniffer_handle = {
            let registry = Arc::clone(&self.registry);
            let stop = Arc::clone(&stop);
            let interface = self.interface.clone();
            thread::spawn(move || sniffer::run(registry, stop, interface))
        };
        let browser_handle = {
            let registry = Arc::clone(&self.registry);
            let stop = Arc::clone(&stop);
            thread::spawn(move || browser::run(registry, stop))
        };

        thread::sleep(window);
        stop.store(true, Ordering::Relaxed);

        if sniffer_handle.join().is_err() {
            warn!("link-layer sniffer panicked");
        }
        if browser_handle.join().is_err() {
            warn!("service browser panicked");
        }

        let devices = self.registry.snapshot();
        debug!(count = devices.len(), "scan complete");
        devices
    }
}

impl Default for DiscoveryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
