use std::sync::Arc;

use hashbrown::HashMap;
use lodestone_blocks::Block;
use lodestone_chunk::{
    BlockAccess, CHUNK_HEIGHT, ChunkCoordinates, ChunkSection,
};

use crate::handle::ColumnHandle;

pub(crate) type ColumnMap = HashMap<ChunkCoordinates, Arc<ColumnHandle>>;

/// World accessor handed to the mesh builder for one section build.
///
/// The column being rebuilt is reachable without touching its lock: the
/// sections around the one under construction are borrowed directly, and
/// the section under construction is answered from a pre-build snapshot.
/// Other columns are consulted with a non-blocking read; a column whose
/// lock is held (its own rebuild is running) answers conservative
/// defaults, which can only cause extra rebuilds, never missed ones.
pub(crate) struct WorldView<'a> {
    coords: ChunkCoordinates,
    below: &'a [ChunkSection],
    snapshot: &'a ChunkSection,
    above: &'a [ChunkSection],
    columns: &'a ColumnMap,
}

impl<'a> WorldView<'a> {
    pub(crate) fn new(
        coords: ChunkCoordinates,
        below: &'a [ChunkSection],
        snapshot: &'a ChunkSection,
        above: &'a [ChunkSection],
        columns: &'a ColumnMap,
    ) -> Self {
        Self {
            coords,
            below,
            snapshot,
            above,
            columns,
        }
    }

    fn own_section(&self, si: usize) -> Option<&ChunkSection> {
        let current = self.below.len();
        if si < current {
            self.below.get(si)
        } else if si == current {
            Some(self.snapshot)
        } else {
            self.above.get(si - current - 1)
        }
    }

    fn with_section<T>(
        &self,
        x: i32,
        y: i32,
        z: i32,
        default: T,
        f: impl FnOnce(&ChunkSection, usize, usize, usize) -> T,
    ) -> T {
        if y < 0 || y >= CHUNK_HEIGHT as i32 {
            return default;
        }
        let (lx, ly, lz) = ((x & 0xf) as usize, (y & 0xf) as usize, (z & 0xf) as usize);
        let si = (y >> 4) as usize;
        let cc = ChunkCoordinates::from_block(x, z);
        if cc == self.coords {
            match self.own_section(si) {
                Some(s) => f(s, lx, ly, lz),
                None => default,
            }
        } else {
            match self.columns.get(&cc).and_then(|h| h.try_read()) {
                Some(state) => match state.column.section(si) {
                    Some(s) => f(s, lx, ly, lz),
                    None => default,
                },
                None => default,
            }
        }
    }
}

impl BlockAccess for WorldView<'_> {
    fn get_block_state(&self, x: i32, y: i32, z: i32) -> Block {
        self.with_section(x, y, z, Block::AIR, |s, lx, ly, lz| s.get(lx, ly, lz))
    }

    fn get_block_states(&self, x: i32, y: i32, z: i32) -> Vec<(Block, usize)> {
        self.with_section(x, y, z, vec![(Block::AIR, 0)], |s, lx, ly, lz| {
            s.get_all(lx, ly, lz).collect()
        })
    }

    fn is_transparent(&self, x: i32, y: i32, z: i32) -> bool {
        self.with_section(x, y, z, false, |s, lx, ly, lz| s.is_transparent(lx, ly, lz))
    }

    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.with_section(x, y, z, false, |s, lx, ly, lz| s.is_solid(lx, ly, lz))
    }

    fn is_scheduled(&self, x: i32, y: i32, z: i32) -> bool {
        self.with_section(x, y, z, false, |s, lx, ly, lz| s.is_scheduled(lx, ly, lz))
    }

    fn get_skylight(&self, x: i32, y: i32, z: i32) -> u8 {
        self.with_section(x, y, z, 15, |s, lx, ly, lz| s.get_skylight(lx, ly, lz))
    }

    fn get_blocklight(&self, x: i32, y: i32, z: i32) -> u8 {
        self.with_section(x, y, z, 0, |s, lx, ly, lz| s.get_blocklight(lx, ly, lz))
    }
}
