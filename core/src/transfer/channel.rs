use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;

use sharescout_common::error::TransferError;
use sharescout_protocols::wire::{self, DirEntry, FrameType};
use tracing::trace;

use super::context::ShareContext;

/// One connection to a share endpoint.
///
/// Connections are cheap and single-purpose: the probe and the session
/// open a fresh channel per operation, so no multiplexing state exists.
pub struct ShareChannel {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl ShareChannel {
    /// Dials `host:port` and runs the hello handshake. Credentials are
    /// resolved only if the server asks for them.
    pub fn open(ctx: &ShareContext, host: &str, port: u16) -> Result<Self, TransferError> {
        let stream = TcpStream::connect((host, port))
            .map_err(|e| TransferError::Unreachable(format!("{host}:{port}: {e}")))?;
        let read_half = stream.try_clone()?;
        let mut channel = Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(stream),
        };
        channel.handshake(ctx, host)?;
        Ok(channel)
    }

    fn handshake(&mut self, ctx: &ShareContext, host: &str) -> Result<(), TransferError> {
        wire::write_frame(&mut self.writer, FrameType::Hello, &[])?;
        match wire::read_frame(&mut self.reader)? {
            (FrameType::Ok, _) => Ok(()),
            (FrameType::Auth, _) => {
                let creds = ctx.resolve_credentials();
                trace!(host, user = %creds.username, "server requested authentication");
                wire::write_frame(&mut self.writer, FrameType::Auth, &wire::encode_auth(&creds))?;
                match wire::read_frame(&mut self.reader)? {
                    (FrameType::Ok, _) => Ok(()),
                    (FrameType::Err, payload) => Err(wire::decode_error(&payload)),
                    (other, _) => Err(unexpected(other, "handshake")),
                }
            }
            (FrameType::Err, payload) => Err(wire::decode_error(&payload)),
            (other, _) => Err(unexpected(other, "handshake")),
        }
    }

    /// Lists the root of the endpoint, i.e. the shares it exposes.
    pub fn list_root(&mut self) -> Result<Vec<DirEntry>, TransferError> {
        wire::write_frame(&mut self.writer, FrameType::ListRoot, &[])?;
        self.read_listing()
    }

    /// Lists the top-level entries of one share.
    pub fn list_share(&mut self, share: &str) -> Result<Vec<DirEntry>, TransferError> {
        wire::write_frame(&mut self.writer, FrameType::ListShare, share.as_bytes())?;
        self.read_listing()
    }

    fn read_listing(&mut self) -> Result<Vec<DirEntry>, TransferError> {
        let mut entries = Vec::new();
        loop {
            match wire::read_frame(&mut self.reader)? {
                (FrameType::Entry, payload) => entries.push(wire::decode_entry(&payload)?),
                (FrameType::End, _) => return Ok(entries),
                (FrameType::Err, payload) => return Err(wire::decode_error(&payload)),
                (other, _) => return Err(unexpected(other, "listing")),
            }
        }
    }

    /// Opens a remote file for reading. Consumes the channel: the returned
    /// reader yields the data stream until end-of-stream.
    pub fn get(mut self, share: &str, path: &str) -> Result<ChunkReader, TransferError> {
        wire::write_frame(
            &mut self.writer,
            FrameType::Get,
            &wire::encode_path(share, path),
        )?;
        match wire::read_frame(&mut self.reader)? {
            (FrameType::Ok, _) => Ok(ChunkReader {
                channel: self,
                buffer: Vec::new(),
                pos: 0,
                done: false,
            }),
            (FrameType::Err, payload) => Err(wire::decode_error(&payload)),
            (other, _) => Err(unexpected(other, "get")),
        }
    }

    /// Opens a remote file for writing, creating it. Consumes the channel.
    pub fn put(mut self, share: &str, path: &str) -> Result<ChunkWriter, TransferError> {
        wire::write_frame(
            &mut self.writer,
            FrameType::Put,
            &wire::encode_path(share, path),
        )?;
        match wire::read_frame(&mut self.reader)? {
            (FrameType::Ok, _) => Ok(ChunkWriter { channel: self }),
            (FrameType::Err, payload) => Err(wire::decode_error(&payload)),
            (other, _) => Err(unexpected(other, "put")),
        }
    }
}

fn unexpected(frame_type: FrameType, during: &str) -> TransferError {
    TransferError::Protocol(format!("unexpected {frame_type:?} frame during {during}"))
}

/// Reads a download as a byte stream, refilling from data frames.
pub struct ChunkReader {
    channel: ShareChannel,
    buffer: Vec<u8>,
    pos: usize,
    done: bool,
}

impl Read for ChunkReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.done {
            return Ok(0);
        }
        while self.pos >= self.buffer.len() {
            match wire::read_frame(&mut self.channel.reader) {
                Ok((FrameType::Data, payload)) => {
                    self.buffer = payload;
                    self.pos = 0;
                }
                Ok((FrameType::End, _)) => {
                    self.done = true;
                    return Ok(0);
                }
                Ok((FrameType::Err, payload)) => {
                    return Err(io::Error::other(wire::decode_error(&payload)));
                }
                Ok((other, _)) => return Err(io::Error::other(unexpected(other, "download"))),
                Err(e) => return Err(io::Error::other(e.eof_as_partial())),
            }
        }
        let n = (self.buffer.len() - self.pos).min(out.len());
        out[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Writes an upload as data frames; `finish` seals the stream and waits
/// for the server to confirm the write.
pub struct ChunkWriter {
    channel: ShareChannel,
}

impl Write for ChunkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        wire::write_frame(&mut self.channel.writer, FrameType::Data, buf)
            .map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.channel.writer.flush()
    }
}

impl ChunkWriter {
    pub fn finish(mut self) -> Result<(), TransferError> {
        wire::write_frame(&mut self.channel.writer, FrameType::End, &[])?;
        match wire::read_frame(&mut self.channel.reader).map_err(TransferError::eof_as_partial)? {
            (FrameType::Ok, _) => Ok(()),
            (FrameType::Err, payload) => Err(wire::decode_error(&payload)),
            (other, _) => Err(unexpected(other, "upload")),
        }
    }
}
