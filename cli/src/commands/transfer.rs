use std::path::Path;

use anyhow::bail;
use sharescout_core::probe::{self, default_candidate_ports};
use sharescout_core::session::ShareSession;
use sharescout_core::transfer::ShareContext;
use tracing::info;

use crate::terminal::print;

pub fn probe(ctx: &ShareContext, host: &str, ports: Vec<u16>) -> anyhow::Result<()> {
    let ports = if ports.is_empty() {
        default_candidate_ports()
    } else {
        ports
    };
    info!("probing {} across {} ports", host, ports.len());
    let endpoints = probe::probe(ctx, host, &ports);
    print::endpoints(&endpoints);
    Ok(())
}

pub fn shares(ctx: &ShareContext, host: &str, port: u16) -> anyhow::Result<()> {
    let mut session = ShareSession::new(ctx, host, port);
    if !session.connect() {
        bail!("{host}:{port} is not answering");
    }
    print::shares(&session.list_shares());
    Ok(())
}

pub fn ls(ctx: &ShareContext, host: &str, port: u16, share: &str) -> anyhow::Result<()> {
    let mut session = ShareSession::new(ctx, host, port);
    print::files(&session.list_files(share));
    Ok(())
}

pub fn get(
    ctx: &ShareContext,
    host: &str,
    port: u16,
    share: &str,
    remote: &str,
    local: &Path,
) -> anyhow::Result<()> {
    let mut session = ShareSession::new(ctx, host, port);
    if !session.download(share, remote, local) {
        bail!("download of {share}/{remote} failed");
    }
    info!("saved {}", local.display());
    Ok(())
}

pub fn put(
    ctx: &ShareContext,
    host: &str,
    port: u16,
    share: &str,
    local: &Path,
    remote: &str,
) -> anyhow::Result<()> {
    let mut session = ShareSession::new(ctx, host, port);
    if !session.upload(share, local, remote) {
        bail!("upload of {} failed", local.display());
    }
    info!("stored {share}/{remote}");
    Ok(())
}
