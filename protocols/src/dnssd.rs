use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use dns_parser::{Packet, RData};

/// Meta-query name: asks every responder which service types exist.
pub const META_QUERY: &str = "_services._dns-sd._udp.local";

pub const MDNS_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);
pub const MDNS_PORT: u16 = 5353;

const TYPE_PTR: u16 = 12;
const CLASS_IN: u16 = 1;

/// One advertised service observed on the wire.
///
/// Meta-query answers advertise service *types*; instance PTR records
/// advertise named instances of a type. Both become announcements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAnnouncement {
    pub name: String,
    pub service_type: String,
}

/// Builds the DNS-SD meta-query datagram (a single PTR question).
pub fn build_meta_query(txn_id: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12 + META_QUERY.len() + 6);
    buf.extend_from_slice(&txn_id.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00]); // standard query
    buf.extend_from_slice(&[0x00, 0x01]); // one question
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    encode_name(&mut buf, META_QUERY);
    buf.extend_from_slice(&TYPE_PTR.to_be_bytes());
    buf.extend_from_slice(&CLASS_IN.to_be_bytes());
    buf
}

/// Extracts service announcements from one mDNS response datagram.
pub fn parse_announcements(data: &[u8]) -> Result<Vec<ServiceAnnouncement>> {
    let packet = Packet::parse(data).context("failed to parse mDNS packet")?;
    let mut found = Vec::new();

    for record in packet.answers.iter().chain(packet.additional.iter()) {
        let RData::PTR(ptr) = &record.data else {
            continue;
        };
        let target = ptr.0.to_string();
        if target.ends_with(".arpa") {
            continue;
        }
        let owner = record.name.to_string();
        let service_type = if owner.starts_with("_services._dns-sd._udp") {
            // meta answer: the target itself is the service type
            target.clone()
        } else {
            owner
        };
        found.push(ServiceAnnouncement {
            name: target,
            service_type,
        });
    }

    Ok(found)
}

fn encode_name(buf: &mut Vec<u8>, name: &str) {
    for label in name.split('.') {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_ptr_response(owner: &str, target: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&[0x84, 0x00]); // authoritative response
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        encode_name(&mut buf, owner);
        buf.extend_from_slice(&TYPE_PTR.to_be_bytes());
        buf.extend_from_slice(&CLASS_IN.to_be_bytes());
        buf.extend_from_slice(&120u32.to_be_bytes());
        let mut rdata = Vec::new();
        encode_name(&mut rdata, target);
        buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        buf.extend_from_slice(&rdata);
        buf
    }

    #[test]
    fn meta_query_parses_back() {
        let query = build_meta_query(0x1234);
        let packet = Packet::parse(&query).unwrap();
        assert_eq!(packet.header.id, 0x1234);
        assert_eq!(packet.questions.len(), 1);
        assert_eq!(packet.questions[0].qname.to_string(), META_QUERY);
    }

    #[test]
    fn meta_answer_yields_service_type() {
        let data = build_ptr_response(META_QUERY, "_smb._tcp.local");
        let found = parse_announcements(&data).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "_smb._tcp.local");
        assert_eq!(found[0].service_type, "_smb._tcp.local");
    }

    #[test]
    fn instance_answer_keeps_owner_as_type() {
        let data = build_ptr_response("_smb._tcp.local", "office-nas._smb._tcp.local");
        let found = parse_announcements(&data).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "office-nas._smb._tcp.local");
        assert_eq!(found[0].service_type, "_smb._tcp.local");
    }

    #[test]
    fn reverse_lookup_answers_are_ignored() {
        let data = build_ptr_response("10.1.168.192.in-addr.arpa", "gateway.in-addr.arpa");
        let found = parse_announcements(&data).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        assert!(parse_announcements(&[0xFF; 7]).is_err());
    }
}
