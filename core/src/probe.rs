//! Candidate-port probing.
//!
//! Walks a host's candidate port set looking for share endpoints. Ports are
//! probed sequentially and independently: a closed port, a failed listing
//! or an empty share list skips that port and never aborts the rest, and
//! every candidate is tried so a host can expose several endpoints.

use std::ops::RangeInclusive;

use sharescout_common::error::TransferError;
use sharescout_protocols::wire::DirEntry;
use tracing::{debug, trace};

use crate::transfer::{ShareChannel, ShareContext};

pub const WELL_KNOWN_PORTS: [u16; 2] = [445, 139];
pub const EXTENDED_PORT_RANGE: RangeInclusive<u16> = 4455..=4464;

/// Candidate ports in probing order: well-known first, then the extended
/// range in ascending order.
pub fn default_candidate_ports() -> Vec<u16> {
    WELL_KNOWN_PORTS
        .iter()
        .copied()
        .chain(EXTENDED_PORT_RANGE)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareDescriptor {
    pub name: String,
    /// Fully qualified endpoint URL for this share.
    pub path: String,
}

/// A `(host, port)` pair found to expose at least one share. Immutable once
/// built; scoped to a single probe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
    pub shares: Vec<ShareDescriptor>,
}

pub fn probe(ctx: &ShareContext, host: &str, ports: &[u16]) -> Vec<ServiceEndpoint> {
    let mut endpoints = Vec::new();
    for &port in ports {
        match probe_port(ctx, host, port) {
            Ok(Some(endpoint)) => {
                debug!(host, port, shares = endpoint.shares.len(), "live endpoint");
                endpoints.push(endpoint);
            }
            Ok(None) => trace!(host, port, "endpoint exposes no shares"),
            Err(e) => trace!(host, port, "port skipped: {e}"),
        }
    }
    endpoints
}

fn probe_port(
    ctx: &ShareContext,
    host: &str,
    port: u16,
) -> Result<Option<ServiceEndpoint>, TransferError> {
    let mut channel = ShareChannel::open(ctx, host, port)?;
    let shares = shares_from_entries(host, port, channel.list_root()?);
    if shares.is_empty() {
        // live but empty endpoints are not reported
        return Ok(None);
    }
    Ok(Some(ServiceEndpoint {
        host: host.to_string(),
        port,
        shares,
    }))
}

/// Root entries become share descriptors; hidden entries never do.
pub(crate) fn shares_from_entries(
    host: &str,
    port: u16,
    entries: Vec<DirEntry>,
) -> Vec<ShareDescriptor> {
    entries
        .into_iter()
        .filter(|entry| !entry.name.starts_with('.'))
        .map(|entry| ShareDescriptor {
            path: share_url(host, port, &entry.name),
            name: entry.name,
        })
        .collect()
}

pub fn share_url(host: &str, port: u16, share: &str) -> String {
    format!("shsc://{host}:{port}/{share}")
}
