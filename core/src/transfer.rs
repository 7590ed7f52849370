//! Client side of the share-transfer protocol.

pub mod channel;
pub mod context;

pub use channel::{ChunkReader, ChunkWriter, ShareChannel};
pub use context::ShareContext;

/// Chunk size used by both transfer directions.
pub const CHUNK_SIZE: usize = 8 * 1024;
