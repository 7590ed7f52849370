//! Passive link-layer sniffer.
//!
//! Opens a datalink channel on one interface and records the sender of
//! every address-resolution frame seen. Requires raw-socket privileges;
//! when those are missing the sniffer logs once and contributes nothing.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use pnet::datalink::{self, Channel, Config, NetworkInterface};
use sharescout_common::device::DeviceRecord;
use sharescout_protocols::arp;
use tracing::{debug, trace, warn};

use super::CAPTURE_READ_TIMEOUT;
use crate::registry::{AddressRegistry, RegistryKey};

pub fn run(registry: Arc<AddressRegistry>, stop: Arc<AtomicBool>, interface: Option<String>) {
    if let Err(e) = capture_loop(&registry, &stop, interface) {
        warn!("link-layer capture unavailable: {e:#}");
    }
}

fn capture_loop(
    registry: &AddressRegistry,
    stop: &AtomicBool,
    interface: Option<String>,
) -> anyhow::Result<()> {
    let intf = select_interface(interface)?;
    let config = Config {
        read_timeout: Some(CAPTURE_READ_TIMEOUT),
        ..Config::default()
    };
    let mut rx = match datalink::channel(&intf, config)
        .with_context(|| format!("opening capture on {}", intf.name))?
    {
        Channel::Ethernet(_tx, rx) => rx,
        _ => anyhow::bail!("unsupported channel type on {}", intf.name),
    };
    debug!("capturing address-resolution frames on {}", intf.name);

    loop {
        // Cooperative cancellation, checked once per read. A quiet link
        // delays this by at most one capture read timeout.
        if stop.load(Ordering::Relaxed) {
            break;
        }
        match rx.next() {
            Ok(frame) => record_frame(registry, frame),
            Err(ref e)
                if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) =>
            {
                continue;
            }
            Err(e) => return Err(e).context("capture read failed"),
        }
    }
    Ok(())
}

/// Non-ARP, malformed and truncated frames are dropped without error.
fn record_frame(registry: &AddressRegistry, frame: &[u8]) {
    let Ok(sender) = arp::extract_sender(frame) else {
        return;
    };
    let ip = sender.ip.to_string();
    trace!(ip, mac = %sender.mac, "observed address-resolution sender");
    registry.put(
        RegistryKey::Ip(ip.clone()),
        DeviceRecord::from_link_layer(ip, sender.mac.to_string()),
    );
}

fn select_interface(name: Option<String>) -> anyhow::Result<NetworkInterface> {
    let interfaces = datalink::interfaces();
    match name {
        Some(name) => interfaces
            .into_iter()
            .find(|i| i.name == name)
            .with_context(|| format!("no such interface: {name}")),
        None => interfaces
            .into_iter()
            .find(|i| i.is_up() && !i.is_loopback() && i.mac.is_some() && !i.ips.is_empty())
            .context("no viable capture interface"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::util::MacAddr;
    use std::net::Ipv4Addr;

    #[test]
    fn records_sender_of_address_resolution_frame() {
        let registry = AddressRegistry::new();
        let frame = arp::build_request(
            MacAddr::new(0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF),
            Ipv4Addr::new(192, 168, 1, 10),
            Ipv4Addr::new(192, 168, 1, 1),
        )
        .unwrap();

        record_frame(&registry, &frame);

        let snap = registry.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].ip, "192.168.1.10");
        assert_eq!(snap[0].mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(snap[0].source_hint(), "link-layer");
    }

    #[test]
    fn truncated_frames_are_dropped() {
        let registry = AddressRegistry::new();
        let frame = arp::build_request(
            MacAddr::zero(),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        )
        .unwrap();

        record_frame(&registry, &frame[..20]);
        assert!(registry.is_empty());
    }

    #[test]
    fn repeated_frames_overwrite_in_place() {
        let registry = AddressRegistry::new();
        let frame = arp::build_request(
            MacAddr::new(2, 2, 2, 2, 2, 2),
            Ipv4Addr::new(10, 0, 0, 7),
            Ipv4Addr::new(10, 0, 0, 1),
        )
        .unwrap();

        record_frame(&registry, &frame);
        record_frame(&registry, &frame);
        assert_eq!(registry.len(), 1);
    }
}
