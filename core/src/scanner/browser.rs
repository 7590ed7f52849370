//! DNS-SD service browser.
//!
//! Sends one meta-query ("which service types exist?") to the mDNS group
//! and then listens for the scan window. The socket loop runs on its own
//! thread and feeds announcements through a channel; the merge loop below
//! is the only writer into the registry from this path, so no mutable
//! state is shared with the socket callback.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use sharescout_common::device::DeviceRecord;
use sharescout_protocols::dnssd::{self, ServiceAnnouncement};
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, warn};

use crate::registry::{AddressRegistry, RegistryKey};

const RECV_TIMEOUT: Duration = Duration::from_millis(250);
const MAX_DATAGRAM: usize = 4096;

pub fn run(registry: Arc<AddressRegistry>, stop: Arc<AtomicBool>) {
    if let Err(e) = browse_loop(&registry, stop) {
        warn!("service browser unavailable: {e:#}");
    }
}

fn browse_loop(registry: &AddressRegistry, stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    let socket = open_multicast_socket().context("opening mDNS socket")?;
    let group = SocketAddr::V4(SocketAddrV4::new(dnssd::MDNS_GROUP, dnssd::MDNS_PORT));
    socket
        .send_to(&dnssd::build_meta_query(rand::random()), group)
        .context("sending meta-query")?;
    debug!("browsing for service advertisements");

    let (event_tx, event_rx) = mpsc::channel::<ServiceAnnouncement>();
    let reader = thread::spawn(move || {
        let mut buf = [0u8; MAX_DATAGRAM];
        while !stop.load(Ordering::Relaxed) {
            match socket.recv_from(&mut buf) {
                Ok((len, _peer)) => {
                    let Ok(found) = dnssd::parse_announcements(&buf[..len]) else {
                        continue;
                    };
                    for announcement in found {
                        if event_tx.send(announcement).is_err() {
                            return;
                        }
                    }
                }
                Err(ref e)
                    if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) =>
                {
                    continue;
                }
                Err(e) => {
                    debug!("mDNS receive failed: {e}");
                    return;
                }
            }
        }
    });

    // Ends when the reader thread exits and drops its sender.
    for announcement in event_rx {
        merge(registry, announcement);
    }
    let _ = reader.join();
    Ok(())
}

fn merge(registry: &AddressRegistry, announcement: ServiceAnnouncement) {
    registry.put(
        RegistryKey::Name(announcement.name.clone()),
        DeviceRecord::from_service(announcement.name, announcement.service_type),
    );
}

fn open_multicast_socket() -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, dnssd::MDNS_PORT)).into())?;
    socket.join_multicast_v4(&dnssd::MDNS_GROUP, &Ipv4Addr::UNSPECIFIED)?;
    socket.set_read_timeout(Some(RECV_TIMEOUT))?;
    Ok(socket.into())
}
