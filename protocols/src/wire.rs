//! Framing for the share-transfer protocol.
//!
//! Every message is `magic | version | type | u32 length | payload`. The
//! same codec serves both ends; client and server differ only in which
//! frames they send. Payload encodings are tiny and hand-rolled: the
//! protocol never leaves a LAN and has no versioned schema to manage.

use std::io::{Read, Write};

use sharescout_common::config::Credentials;
use sharescout_common::error::TransferError;

pub const MAGIC: &[u8; 4] = b"SHSC";
pub const VERSION: u16 = 1;

/// Largest payload a peer accepts in one frame.
pub const MAX_FRAME_LEN: usize = 1 << 20;

const HDR_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Hello = 1,
    Auth = 2,
    Ok = 3,
    Err = 4,
    ListRoot = 5,
    ListShare = 6,
    Entry = 7,
    End = 8,
    Get = 9,
    Put = 10,
    Data = 11,
}

impl FrameType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Hello),
            2 => Some(Self::Auth),
            3 => Some(Self::Ok),
            4 => Some(Self::Err),
            5 => Some(Self::ListRoot),
            6 => Some(Self::ListShare),
            7 => Some(Self::Entry),
            8 => Some(Self::End),
            9 => Some(Self::Get),
            10 => Some(Self::Put),
            11 => Some(Self::Data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryKind {
    Directory = 1,
    File = 2,
    Other = 3,
}

impl EntryKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Directory),
            2 => Some(Self::File),
            3 => Some(Self::Other),
            _ => None,
        }
    }
}

/// One listing entry. `size` is -1 when the server could not stat the entry;
/// clients skip those rather than failing the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: i64,
}

pub fn write_frame(
    w: &mut impl Write,
    frame_type: FrameType,
    payload: &[u8],
) -> Result<(), TransferError> {
    let mut hdr = [0u8; HDR_LEN];
    hdr[0..4].copy_from_slice(MAGIC);
    hdr[4..6].copy_from_slice(&VERSION.to_be_bytes());
    hdr[6] = frame_type as u8;
    hdr[7..11].copy_from_slice(&(payload.len() as u32).to_be_bytes());
    w.write_all(&hdr)?;
    w.write_all(payload)?;
    w.flush()?;
    Ok(())
}

pub fn read_frame(r: &mut impl Read) -> Result<(FrameType, Vec<u8>), TransferError> {
    let mut hdr = [0u8; HDR_LEN];
    r.read_exact(&mut hdr)?;
    if &hdr[0..4] != MAGIC {
        return Err(TransferError::Protocol("bad magic".into()));
    }
    let version = u16::from_be_bytes([hdr[4], hdr[5]]);
    if version != VERSION {
        return Err(TransferError::Protocol(format!(
            "unsupported protocol version {version}"
        )));
    }
    let frame_type = FrameType::from_u8(hdr[6])
        .ok_or_else(|| TransferError::Protocol(format!("unknown frame type {}", hdr[6])))?;
    let len = u32::from_be_bytes([hdr[7], hdr[8], hdr[9], hdr[10]]) as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransferError::Protocol(format!(
            "oversized frame ({len} bytes)"
        )));
    }
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    Ok((frame_type, payload))
}

pub fn encode_entry(entry: &DirEntry) -> Vec<u8> {
    let mut buf = Vec::with_capacity(9 + entry.name.len());
    buf.push(entry.kind as u8);
    buf.extend_from_slice(&entry.size.to_be_bytes());
    buf.extend_from_slice(entry.name.as_bytes());
    buf
}

pub fn decode_entry(payload: &[u8]) -> Result<DirEntry, TransferError> {
    if payload.len() < 9 {
        return Err(TransferError::Protocol("short entry frame".into()));
    }
    let kind = EntryKind::from_u8(payload[0])
        .ok_or_else(|| TransferError::Protocol(format!("unknown entry kind {}", payload[0])))?;
    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&payload[1..9]);
    let name = String::from_utf8(payload[9..].to_vec())
        .map_err(|_| TransferError::Protocol("entry name is not utf-8".into()))?;
    Ok(DirEntry {
        name,
        kind,
        size: i64::from_be_bytes(size_bytes),
    })
}

pub fn encode_auth(creds: &Credentials) -> Vec<u8> {
    let mut buf = Vec::new();
    put_str(&mut buf, &creds.username);
    put_str(&mut buf, &creds.password);
    put_str(&mut buf, &creds.workgroup);
    buf
}

pub fn decode_auth(payload: &[u8]) -> Result<Credentials, TransferError> {
    let mut rest = payload;
    let username = take_str(&mut rest)?;
    let password = take_str(&mut rest)?;
    let workgroup = take_str(&mut rest)?;
    Ok(Credentials {
        username,
        password,
        workgroup,
    })
}

/// Share plus remote path, as carried by Get and Put frames.
pub fn encode_path(share: &str, path: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    put_str(&mut buf, share);
    put_str(&mut buf, path);
    buf
}

pub fn decode_path(payload: &[u8]) -> Result<(String, String), TransferError> {
    let mut rest = payload;
    let share = take_str(&mut rest)?;
    let path = take_str(&mut rest)?;
    Ok((share, path))
}

const ERR_NOT_FOUND: u8 = 1;
const ERR_PERMISSION: u8 = 2;
const ERR_IO: u8 = 3;

pub fn encode_error(err: &TransferError) -> Vec<u8> {
    let (code, msg) = match err {
        TransferError::NotFound(path) => (ERR_NOT_FOUND, path.clone()),
        TransferError::PermissionDenied => (ERR_PERMISSION, String::new()),
        other => (ERR_IO, other.to_string()),
    };
    let mut buf = vec![code];
    buf.extend_from_slice(msg.as_bytes());
    buf
}

pub fn decode_error(payload: &[u8]) -> TransferError {
    let msg = String::from_utf8_lossy(payload.get(1..).unwrap_or(&[])).into_owned();
    match payload.first() {
        Some(&ERR_NOT_FOUND) => TransferError::NotFound(msg),
        Some(&ERR_PERMISSION) => TransferError::PermissionDenied,
        Some(&ERR_IO) => TransferError::IoFailure(std::io::Error::other(msg)),
        _ => TransferError::Protocol("malformed error frame".into()),
    }
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u16).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn take_str(rest: &mut &[u8]) -> Result<String, TransferError> {
    if rest.len() < 2 {
        return Err(TransferError::Protocol("truncated string field".into()));
    }
    let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
    if rest.len() < 2 + len {
        return Err(TransferError::Protocol("truncated string field".into()));
    }
    let s = String::from_utf8(rest[2..2 + len].to_vec())
        .map_err(|_| TransferError::Protocol("string field is not utf-8".into()))?;
    *rest = &rest[2 + len..];
    Ok(s)
}
