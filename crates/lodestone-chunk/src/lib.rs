//! Chunk storage: sections, columns, and the per-voxel tracking bitsets.
#![forbid(unsafe_code)]

pub mod access;
pub mod bits;
pub mod column;
pub mod coords;
pub mod schedule;
pub mod section;

pub use access::BlockAccess;
pub use bits::{BitGrid, NibbleArray};
pub use column::{CHUNK_HEIGHT, CHUNK_WIDTH, ChunkColumn, SECTIONS_PER_COLUMN};
pub use coords::{
    BlockCoordinates, ChunkCoordinates, SECTION_DIM, SECTION_VOLUME, coordinate_index,
    coordinate_xyz,
};
pub use schedule::ScheduleType;
pub use section::{ChunkSection, SetOutcome, StorageError};
