//! Lodestone: an incremental chunk-mesh pipeline for voxel worlds.
//!
//! The crates compose bottom-up: `lodestone-geom` (vectors, bounds),
//! `lodestone-blocks` (block metadata registry and multi-part rules),
//! `lodestone-chunk` (section/column storage with rebuild tracking),
//! `lodestone-mesh` (the incremental section builder and its reuse
//! cache), `lodestone-gpu` (pooled buffers with deferred disposal), and
//! `lodestone-runtime` (scheduling queues, driver loop, worker pool).
//! This facade re-exports the public surface.
#![forbid(unsafe_code)]

pub use lodestone_blocks::{
    Block, BlockId, BlockRegistry, BlockStateBits, BlockType, Direction, ModelFragmentId,
    MultiPartCase, MultiPartDef, MultiPartRule, NeighborQuery, NeighborTest,
};
pub use lodestone_chunk::{
    BitGrid, BlockAccess, BlockCoordinates, CHUNK_HEIGHT, CHUNK_WIDTH, ChunkColumn,
    ChunkCoordinates, ChunkSection, NibbleArray, SECTION_DIM, SECTION_VOLUME,
    SECTIONS_PER_COLUMN, ScheduleType, SetOutcome, StorageError, coordinate_index,
    coordinate_xyz,
};
pub use lodestone_geom::{Aabb, Vec3};
pub use lodestone_gpu::{BufferId, BufferPool, ChunkData, IndexBuffer, PoolStats, VertexBuffer};
pub use lodestone_mesh::{
    BlockModelProvider, ChunkMesh, EntryPosition, MeshIndexCache, ModelData, SectionCache,
    Vertex, build_section_mesh, has_scheduled_neighbors,
};
pub use lodestone_runtime::{
    CameraView, CancelToken, ChunkManager, ColumnHandle, ColumnState, ConfigError, ManagerStats,
    OmniCamera, VideoOptions,
};
