use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use sharescout_common::device::DeviceRecord;

/// Registry key. The two discovery paths observe different identities, so
/// they key into independent namespaces: an IP-keyed record and a name-keyed
/// record never collide, even for the same physical device. No correlation
/// step merges them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryKey {
    Ip(String),
    Name(String),
}

/// Shared device store written by both discovery threads.
///
/// The lock is held only for the duration of a map operation, never across
/// I/O. Entries are overwritten on repeat observation and only removed by
/// `clear` at the start of the next scan.
#[derive(Default)]
pub struct AddressRegistry {
    devices: Mutex<HashMap<RegistryKey, DeviceRecord>>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: RegistryKey, record: DeviceRecord) {
        let mut devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        devices.insert(key, record);
    }

    /// Point-in-time copy. Iteration order is unspecified and may differ
    /// between calls.
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        let devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        devices.values().cloned().collect()
    }

    pub fn clear(&self) {
        let mut devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        devices.clear();
    }

    pub fn len(&self) -> usize {
        let devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn repeat_observation_overwrites() {
        let registry = AddressRegistry::new();
        let key = RegistryKey::Ip("192.168.1.10".into());
        registry.put(
            key.clone(),
            DeviceRecord::from_link_layer("192.168.1.10", "aa:aa:aa:aa:aa:aa"),
        );
        registry.put(
            key,
            DeviceRecord::from_link_layer("192.168.1.10", "bb:bb:bb:bb:bb:bb"),
        );

        let snap = registry.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].mac, "bb:bb:bb:bb:bb:bb");
    }

    #[test]
    fn ip_and_name_keyspaces_are_independent() {
        let registry = AddressRegistry::new();
        registry.put(
            RegistryKey::Ip("fileserver".into()),
            DeviceRecord::from_link_layer("fileserver", "aa:aa:aa:aa:aa:aa"),
        );
        registry.put(
            RegistryKey::Name("fileserver".into()),
            DeviceRecord::from_service("fileserver", "_smb._tcp.local"),
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn snapshot_is_point_in_time() {
        let registry = AddressRegistry::new();
        registry.put(
            RegistryKey::Ip("10.0.0.1".into()),
            DeviceRecord::from_link_layer("10.0.0.1", ""),
        );
        let snap = registry.snapshot();
        registry.put(
            RegistryKey::Ip("10.0.0.2".into()),
            DeviceRecord::from_link_layer("10.0.0.2", ""),
        );
        assert_eq!(snap.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn clear_empties_the_registry() {
        let registry = AddressRegistry::new();
        registry.put(
            RegistryKey::Name("svc".into()),
            DeviceRecord::from_service("svc", "_ipp._tcp.local"),
        );
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_writers_are_serialized() {
        let registry = Arc::new(AddressRegistry::new());
        let mut handles = Vec::new();
        for t in 0..4u8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for i in 0..100u8 {
                    let ip = format!("10.0.{t}.{i}");
                    registry.put(
                        RegistryKey::Ip(ip.clone()),
                        DeviceRecord::from_link_layer(ip, "aa:aa:aa:aa:aa:aa"),
                    );
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 400);
    }
}
