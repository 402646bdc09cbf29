use core::fmt;
use core::ops::{Add, Sub};

/// Voxels per section edge.
pub const SECTION_DIM: usize = 16;
/// Voxels per section.
pub const SECTION_VOLUME: usize = SECTION_DIM * SECTION_DIM * SECTION_DIM;

/// Flat index into all per-section voxel arrays. Bijective over [0, 4096).
#[inline]
pub const fn coordinate_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < SECTION_DIM && y < SECTION_DIM && z < SECTION_DIM);
    (y << 8) | (z << 4) | x
}

/// Inverse of [`coordinate_index`].
#[inline]
pub const fn coordinate_xyz(idx: usize) -> (usize, usize, usize) {
    (idx & 0xf, idx >> 8, (idx >> 4) & 0xf)
}

/// Chunk-space coordinate of one column.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinates {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoordinates {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Column containing the given world-space block position.
    #[inline]
    pub fn from_block(x: i32, z: i32) -> Self {
        Self {
            x: x >> 4,
            z: z >> 4,
        }
    }

    /// Chebyshev distance in chunk space; square render-distance shells.
    #[inline]
    pub fn distance_to(self, other: ChunkCoordinates) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl Add for ChunkCoordinates {
    type Output = ChunkCoordinates;
    #[inline]
    fn add(self, rhs: ChunkCoordinates) -> ChunkCoordinates {
        ChunkCoordinates::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Sub for ChunkCoordinates {
    type Output = ChunkCoordinates;
    #[inline]
    fn sub(self, rhs: ChunkCoordinates) -> ChunkCoordinates {
        ChunkCoordinates::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl fmt::Display for ChunkCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// World-space block position.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlockCoordinates {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockCoordinates {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn chunk(self) -> ChunkCoordinates {
        ChunkCoordinates::from_block(self.x, self.z)
    }

    /// Column-local (x, z), both in [0, 16).
    #[inline]
    pub fn local_xz(self) -> (usize, usize) {
        ((self.x & 0xf) as usize, (self.z & 0xf) as usize)
    }
}

impl Add<(i32, i32, i32)> for BlockCoordinates {
    type Output = BlockCoordinates;
    #[inline]
    fn add(self, (dx, dy, dz): (i32, i32, i32)) -> BlockCoordinates {
        BlockCoordinates::new(self.x + dx, self.y + dy, self.z + dz)
    }
}
