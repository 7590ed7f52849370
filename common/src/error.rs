use std::io;

use thiserror::Error;

/// Failure taxonomy of the share-transfer layer.
///
/// Sessions and the probe translate these into boolean results or empty
/// listings; the variants exist so logs and the server wire format can
/// distinguish "no such file" from "auth rejected" from "link died".
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("remote path not found: {0}")]
    NotFound(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("i/o failure: {0}")]
    IoFailure(#[from] io::Error),

    #[error("stream closed before completion")]
    PartialTransfer,

    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl TransferError {
    /// Maps a local open/create failure onto the taxonomy.
    pub fn from_open(err: io::Error, what: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(what.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::IoFailure(err),
        }
    }

    /// A peer that hangs up mid-stream surfaces as an unexpected EOF on the
    /// socket; report that as a partial transfer rather than a plain i/o error.
    pub fn eof_as_partial(self) -> Self {
        match self {
            Self::IoFailure(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Self::PartialTransfer
            }
            other => other,
        }
    }
}
