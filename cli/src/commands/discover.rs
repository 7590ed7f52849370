use std::time::{Duration, Instant};

use sharescout_core::probe::{self, default_candidate_ports};
use sharescout_core::scanner::DiscoveryCoordinator;
use sharescout_core::transfer::ShareContext;
use tracing::info;

use crate::terminal::print;

pub fn discover(
    ctx: &ShareContext,
    timeout_ms: u64,
    interface: Option<String>,
    seeds: Vec<String>,
) -> anyhow::Result<()> {
    if !seeds.is_empty() {
        return probe_seeds(ctx, &seeds);
    }

    let coordinator = match interface {
        Some(name) => DiscoveryCoordinator::with_interface(name),
        None => DiscoveryCoordinator::new(),
    };

    let window = Duration::from_millis(timeout_ms);
    info!("listening for {} ms", timeout_ms);

    let start = Instant::now();
    let mut records = coordinator.scan(window);
    records.sort_by_key(|r| r.source_hint());

    print::devices(&records);
    info!(
        "{} devices seen in {:.2}s",
        records.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Configured-node path: the hosts are already known, so the scan window
/// is skipped and each seed goes straight to the port probe.
fn probe_seeds(ctx: &ShareContext, seeds: &[String]) -> anyhow::Result<()> {
    let ports = default_candidate_ports();
    let mut endpoints = Vec::new();
    for seed in seeds {
        info!("probing configured host {seed}");
        endpoints.extend(probe::probe(ctx, seed, &ports));
    }
    print::endpoints(&endpoints);
    Ok(())
}
