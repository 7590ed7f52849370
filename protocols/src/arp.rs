use std::net::Ipv4Addr;

use anyhow::{Context, Result, ensure};
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;
pub const MIN_ETH_FRAME_NO_FCS: usize = 60;

/// Sender addresses extracted from one address-resolution frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpSender {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

/// Pulls the sender protocol and hardware addresses out of a captured frame.
///
/// Errors on non-ARP ethertypes and on truncated payloads; callers on the
/// capture path drop those frames without logging.
pub fn extract_sender(frame: &[u8]) -> Result<ArpSender> {
    let eth = EthernetPacket::new(frame).context("frame shorter than an ethernet header")?;
    ensure!(
        eth.get_ethertype() == EtherTypes::Arp,
        "not an address-resolution frame"
    );
    let arp = ArpPacket::new(eth.payload()).with_context(|| {
        format!(
            "truncated or invalid ARP payload (len {})",
            eth.payload().len()
        )
    })?;
    Ok(ArpSender {
        ip: arp.get_sender_proto_addr(),
        mac: arp.get_sender_hw_addr(),
    })
}

/// Builds a broadcast ARP request frame, padded to the minimum frame size.
pub fn build_request(src_mac: MacAddr, src_ip: Ipv4Addr, dst_ip: Ipv4Addr) -> Result<Vec<u8>> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    {
        let mut eth = MutableEthernetPacket::new(&mut buffer)
            .context("failed to create mutable ethernet frame")?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }
    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .context("failed to create mutable ARP packet")?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_sender_proto_addr(src_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(dst_ip);
    Ok(Vec::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_sender_from_built_frame() {
        let mac = MacAddr::new(0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF);
        let ip = Ipv4Addr::new(192, 168, 1, 10);
        let frame = build_request(mac, ip, Ipv4Addr::new(192, 168, 1, 1)).unwrap();

        let sender = extract_sender(&frame).unwrap();
        assert_eq!(sender.ip, ip);
        assert_eq!(sender.mac, mac);
    }

    #[test]
    fn rejects_truncated_payload() {
        let frame = build_request(
            MacAddr::zero(),
            Ipv4Addr::UNSPECIFIED,
            Ipv4Addr::UNSPECIFIED,
        )
        .unwrap();
        let result = extract_sender(&frame[..ETH_HDR_LEN + 10]);
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("truncated or invalid ARP payload"));
    }

    #[test]
    fn rejects_non_arp_ethertype() {
        let mut frame = build_request(
            MacAddr::zero(),
            Ipv4Addr::UNSPECIFIED,
            Ipv4Addr::UNSPECIFIED,
        )
        .unwrap();
        {
            let mut eth = MutableEthernetPacket::new(&mut frame).unwrap();
            eth.set_ethertype(EtherTypes::Ipv4);
        }
        assert!(extract_sender(&frame).is_err());
    }

    #[test]
    fn rejects_short_frame() {
        assert!(extract_sender(&[0u8; 4]).is_err());
    }
}
