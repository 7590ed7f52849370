//! Share session: listings and chunked transfers against one host.
//!
//! Every operation degrades to `false` or an empty listing instead of
//! raising; callers check return values. A failed transfer leaves any
//! partially written target in place — the caller decides what to do
//! with it. One transfer runs at a time per session.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use sharescout_common::error::TransferError;
use sharescout_protocols::wire::EntryKind;
use tracing::{debug, warn};

use crate::probe::{ShareDescriptor, share_url};
use crate::transfer::{CHUNK_SIZE, ShareChannel, ShareContext};

/// One file inside a share's top-level listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: i64,
}

pub struct ShareSession<'a> {
    ctx: &'a ShareContext,
    host: String,
    port: u16,
    current_share: Option<String>,
}

impl<'a> ShareSession<'a> {
    pub fn new(ctx: &'a ShareContext, host: impl Into<String>, port: u16) -> Self {
        Self {
            ctx,
            host: host.into(),
            port,
            current_share: None,
        }
    }

    /// The share named by the most recent operation, if any. A session is
    /// not share-scoped until a transfer or listing names one.
    pub fn current_share(&self) -> Option<&str> {
        self.current_share.as_deref()
    }

    fn channel(&self) -> Result<ShareChannel, TransferError> {
        ShareChannel::open(self.ctx, &self.host, self.port)
    }

    /// Whether the host answers a root listing at all.
    pub fn connect(&mut self) -> bool {
        match self.channel().and_then(|mut ch| ch.list_root()) {
            Ok(_) => true,
            Err(e) => {
                debug!(host = %self.host, "connect failed: {e}");
                false
            }
        }
    }

    /// Root entries, restricted to directory-kind entries with hidden names
    /// dropped.
    pub fn list_shares(&mut self) -> Vec<ShareDescriptor> {
        let entries = match self.channel().and_then(|mut ch| ch.list_root()) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(host = %self.host, "share listing failed: {e}");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter(|e| !e.name.starts_with('.'))
            .filter(|e| matches!(e.kind, EntryKind::Directory))
            .map(|e| ShareDescriptor {
                path: share_url(&self.host, self.port, &e.name),
                name: e.name,
            })
            .collect()
    }

    /// Top-level entries of a share. Entries whose size could not be
    /// determined are skipped, not failed.
    pub fn list_files(&mut self, share: &str) -> Vec<FileDescriptor> {
        self.current_share = Some(share.to_string());
        let entries = match self.channel().and_then(|mut ch| ch.list_share(share)) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(host = %self.host, share, "file listing failed: {e}");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter(|e| e.size >= 0)
            .map(|e| FileDescriptor {
                name: e.name,
                size: e.size,
            })
            .collect()
    }

    /// Copies a remote file to `local` in fixed-size chunks. Returns true
    /// only if the remote stream reached end-of-stream with no write error.
    /// The local file is created only after the remote open succeeds, so a
    /// missing remote path leaves no file behind.
    pub fn download(&mut self, share: &str, remote: &str, local: impl AsRef<Path>) -> bool {
        self.current_share = Some(share.to_string());
        let reader = match self.channel().and_then(|ch| ch.get(share, remote)) {
            Ok(reader) => reader,
            Err(e) => {
                debug!(share, remote, "download open failed: {e}");
                return false;
            }
        };
        let local = local.as_ref();
        let file = match File::create(local) {
            Ok(file) => file,
            Err(e) => {
                debug!(local = %local.display(), "local create failed: {e}");
                return false;
            }
        };
        match copy_chunks(reader, file) {
            Ok(bytes) => {
                debug!(share, remote, bytes, "download complete");
                true
            }
            Err(e) => {
                // the partial local file is intentionally left in place
                warn!(share, remote, "download aborted: {e}");
                false
            }
        }
    }

    /// Symmetric to `download`: copies a local file into the share.
    pub fn upload(&mut self, share: &str, local: impl AsRef<Path>, remote: &str) -> bool {
        self.current_share = Some(share.to_string());
        let local = local.as_ref();
        let file = match File::open(local) {
            Ok(file) => file,
            Err(e) => {
                debug!(local = %local.display(), "local open failed: {e}");
                return false;
            }
        };
        let mut writer = match self.channel().and_then(|ch| ch.put(share, remote)) {
            Ok(writer) => writer,
            Err(e) => {
                debug!(share, remote, "upload open failed: {e}");
                return false;
            }
        };
        if let Err(e) = copy_chunks(file, &mut writer) {
            warn!(share, remote, "upload aborted: {e}");
            return false;
        }
        match writer.finish() {
            Ok(()) => {
                debug!(share, remote, "upload complete");
                true
            }
            Err(e) => {
                warn!(share, remote, "upload not confirmed: {e}");
                false
            }
        }
    }
}

fn copy_chunks(mut src: impl Read, mut dst: impl Write) -> std::io::Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            break;
        }
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
    dst.flush()?;
    Ok(total)
}
