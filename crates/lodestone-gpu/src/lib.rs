//! Device-facing buffer management for chunk meshes.
//!
//! Buffers are pooled handles with a fixed element capacity. Uploading a
//! mesh reuses the existing buffer in place when it fits and otherwise
//! allocates a replacement, retiring the old handle into a deferred
//! disposal list. Retired buffers stay alive until [`BufferPool::reclaim`]
//! runs for a frame the renderer has finished with, so in-flight draws
//! never lose their backing storage.
#![forbid(unsafe_code)]

mod chunk_data;
mod pool;

pub use chunk_data::ChunkData;
pub use pool::{BufferId, BufferPool, IndexBuffer, PoolStats, VertexBuffer};
