//! Share server: exposes the subdirectories of a root directory as shares.
//!
//! One thread per connection; each connection runs the hello handshake,
//! optionally authenticates against a [`CredentialResolver`], and then
//! services listing and transfer frames until the peer hangs up. Hidden
//! entries never leave the server, so clients cannot list or guess them
//! into a descriptor.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use sharescout_common::config::CredentialResolver;
use sharescout_common::error::TransferError;
use sharescout_protocols::wire::{self, DirEntry, EntryKind, FrameType};
use tracing::{debug, info, warn};

use crate::transfer::CHUNK_SIZE;

pub struct ShareServer {
    root: PathBuf,
    resolver: Option<Arc<dyn CredentialResolver>>,
    listener: TcpListener,
}

impl ShareServer {
    /// Binds the listener. `resolver` of `None` allows anonymous access;
    /// otherwise clients must present the resolver's credentials.
    pub fn bind(
        addr: impl ToSocketAddrs,
        root: impl Into<PathBuf>,
        resolver: Option<Arc<dyn CredentialResolver>>,
    ) -> anyhow::Result<Self> {
        let root = root.into();
        anyhow::ensure!(root.is_dir(), "share root {} is not a directory", root.display());
        let listener = TcpListener::bind(addr).context("binding share listener")?;
        Ok(Self {
            root,
            resolver,
            listener,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop; blocks for the life of the process.
    pub fn run(self) {
        info!(root = %self.root.display(), "share server listening");
        let root = Arc::new(self.root);
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let root = Arc::clone(&root);
                    let resolver = self.resolver.clone();
                    thread::spawn(move || {
                        let peer = stream.peer_addr().ok();
                        if let Err(e) = handle_connection(stream, &root, resolver.as_deref()) {
                            debug!(?peer, "connection ended: {e}");
                        }
                    });
                }
                Err(e) => warn!("accept failed: {e}"),
            }
        }
    }
}

fn handle_connection(
    stream: TcpStream,
    root: &Path,
    resolver: Option<&dyn CredentialResolver>,
) -> Result<(), TransferError> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    match wire::read_frame(&mut reader)? {
        (FrameType::Hello, _) => {}
        (other, _) => {
            return Err(TransferError::Protocol(format!(
                "expected hello, got {other:?}"
            )));
        }
    }
    match resolver {
        None => wire::write_frame(&mut writer, FrameType::Ok, &[])?,
        Some(resolver) => {
            wire::write_frame(&mut writer, FrameType::Auth, &[])?;
            let offered = match wire::read_frame(&mut reader)? {
                (FrameType::Auth, payload) => wire::decode_auth(&payload)?,
                (other, _) => {
                    return Err(TransferError::Protocol(format!(
                        "expected auth, got {other:?}"
                    )));
                }
            };
            let expected = resolver.resolve();
            if offered.username != expected.username || offered.password != expected.password {
                wire::write_frame(
                    &mut writer,
                    FrameType::Err,
                    &wire::encode_error(&TransferError::PermissionDenied),
                )?;
                return Ok(());
            }
            wire::write_frame(&mut writer, FrameType::Ok, &[])?;
        }
    }

    loop {
        let (frame_type, payload) = match wire::read_frame(&mut reader) {
            Ok(frame) => frame,
            // peer closed the connection between requests
            Err(TransferError::IoFailure(ref e))
                if e.kind() == io::ErrorKind::UnexpectedEof =>
            {
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        match frame_type {
            FrameType::ListRoot => send_listing(&mut writer, root, None)?,
            FrameType::ListShare => {
                let share = String::from_utf8(payload)
                    .map_err(|_| TransferError::Protocol("share name is not utf-8".into()))?;
                send_listing(&mut writer, root, Some(&share))?;
            }
            FrameType::Get => {
                let (share, path) = wire::decode_path(&payload)?;
                send_file(&mut writer, root, &share, &path)?;
            }
            FrameType::Put => {
                let (share, path) = wire::decode_path(&payload)?;
                receive_file(&mut reader, &mut writer, root, &share, &path)?;
            }
            other => {
                return Err(TransferError::Protocol(format!(
                    "unexpected {other:?} frame"
                )));
            }
        }
    }
}

fn send_listing(
    w: &mut impl Write,
    root: &Path,
    share: Option<&str>,
) -> Result<(), TransferError> {
    let dir = match share {
        None => root.to_path_buf(),
        Some(share) => match resolve_share(root, share) {
            Ok(dir) => dir,
            Err(e) => return send_error(w, &e),
        },
    };
    let listing = match fs::read_dir(&dir) {
        Ok(listing) => listing,
        Err(e) => return send_error(w, &TransferError::from_open(e, &dir.to_string_lossy())),
    };
    for entry in listing.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let (kind, size) = match entry.metadata() {
            Ok(meta) if meta.is_dir() => (EntryKind::Directory, 0),
            Ok(meta) if meta.is_file() => (EntryKind::File, meta.len() as i64),
            Ok(_) => (EntryKind::Other, -1),
            // stat failed; clients skip size -1 entries
            Err(_) => (EntryKind::Other, -1),
        };
        wire::write_frame(
            w,
            FrameType::Entry,
            &wire::encode_entry(&DirEntry { name, kind, size }),
        )?;
    }
    wire::write_frame(w, FrameType::End, &[])
}

fn send_file(w: &mut impl Write, root: &Path, share: &str, path: &str) -> Result<(), TransferError> {
    let full = match resolve_remote(root, share, path) {
        Ok(full) => full,
        Err(e) => return send_error(w, &e),
    };
    let mut file = match File::open(&full) {
        Ok(file) => file,
        Err(e) => return send_error(w, &TransferError::from_open(e, path)),
    };
    wire::write_frame(w, FrameType::Ok, &[])?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        wire::write_frame(w, FrameType::Data, &buf[..n])?;
    }
    wire::write_frame(w, FrameType::End, &[])
}

fn receive_file(
    r: &mut impl Read,
    w: &mut impl Write,
    root: &Path,
    share: &str,
    path: &str,
) -> Result<(), TransferError> {
    let full = match resolve_remote(root, share, path) {
        Ok(full) => full,
        Err(e) => return send_error(w, &e),
    };
    let mut file = match File::create(&full) {
        Ok(file) => file,
        Err(e) => return send_error(w, &TransferError::from_open(e, path)),
    };
    loop {
        match wire::read_frame(r)? {
            // a write failure tears the connection down and leaves the
            // partial remote file in place
            (FrameType::Data, payload) => file.write_all(&payload)?,
            (FrameType::End, _) => break,
            (other, _) => {
                return Err(TransferError::Protocol(format!(
                    "unexpected {other:?} frame during upload"
                )));
            }
        }
    }
    wire::write_frame(w, FrameType::Ok, &[])
}

fn send_error(w: &mut impl Write, err: &TransferError) -> Result<(), TransferError> {
    wire::write_frame(w, FrameType::Err, &wire::encode_error(err))
}

/// Shares are immediate subdirectories of the root; anything else is
/// reported as absent.
fn resolve_share(root: &Path, share: &str) -> Result<PathBuf, TransferError> {
    if share.is_empty() || share.contains(['/', '\\']) || share == "." || share == ".." {
        return Err(TransferError::NotFound(share.to_string()));
    }
    let dir = root.join(share);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(TransferError::NotFound(share.to_string()))
    }
}

/// Joins a client-supplied path underneath a share, component by
/// component, refusing traversal outside it.
fn resolve_remote(root: &Path, share: &str, path: &str) -> Result<PathBuf, TransferError> {
    let mut full = resolve_share(root, share)?;
    for component in path.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(TransferError::NotFound(path.to_string()));
        }
        full.push(component);
    }
    Ok(full)
}
