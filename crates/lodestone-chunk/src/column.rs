//! A vertical stack of sections forming one chunk, plus the column-level
//! dirty flags that sections report into.

use lodestone_blocks::{Block, BlockRegistry};

use crate::coords::{ChunkCoordinates, SECTION_DIM};
use crate::section::{ChunkSection, SetOutcome, StorageError};

/// Chunk width/depth in voxels.
pub const CHUNK_WIDTH: usize = SECTION_DIM;
/// Sections per column.
pub const SECTIONS_PER_COLUMN: usize = 16;
/// Column height in voxels.
pub const CHUNK_HEIGHT: usize = SECTIONS_PER_COLUMN * SECTION_DIM;

#[derive(Clone, Debug)]
pub struct ChunkColumn {
    coordinates: ChunkCoordinates,
    sections: Vec<ChunkSection>,
    pub sky_light_dirty: bool,
    pub block_light_dirty: bool,
}

impl ChunkColumn {
    /// `storages` is the number of parallel block-state layers per section.
    pub fn new(coordinates: ChunkCoordinates, storages: usize) -> Self {
        Self {
            coordinates,
            sections: (0..SECTIONS_PER_COLUMN)
                .map(|i| ChunkSection::new((i * SECTION_DIM) as i32, storages))
                .collect(),
            sky_light_dirty: false,
            block_light_dirty: false,
        }
    }

    #[inline]
    pub fn coordinates(&self) -> ChunkCoordinates {
        self.coordinates
    }

    #[inline]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn section(&self, i: usize) -> Option<&ChunkSection> {
        self.sections.get(i)
    }

    #[inline]
    pub fn section_mut(&mut self, i: usize) -> Option<&mut ChunkSection> {
        self.sections.get_mut(i)
    }

    pub fn sections(&self) -> &[ChunkSection] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut [ChunkSection] {
        &mut self.sections
    }

    /// Index of the highest section containing any block.
    pub fn highest_nonempty_section(&self) -> Option<usize> {
        self.sections.iter().rposition(|s| !s.is_empty())
    }

    pub fn has_dirty_sections(&self) -> bool {
        self.sections.iter().any(|s| s.is_dirty())
    }

    #[inline]
    fn split_y(y: usize) -> (usize, usize) {
        (y >> 4, y & 0xf)
    }

    /// Column-local block write; `x`, `z` in [0,16), `y` in [0,256).
    /// Raises the column light-dirty flag when the section reports a
    /// block-light change.
    pub fn set_block_state(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        state: Block,
        storage: usize,
        reg: &BlockRegistry,
    ) -> Result<SetOutcome, StorageError> {
        let (si, ly) = Self::split_y(y);
        let section = &mut self.sections[si];
        let outcome = section.set(storage, x, ly, z, state, reg)?;
        if outcome.block_light_changed {
            self.block_light_dirty = true;
        }
        Ok(outcome)
    }

    pub fn get_block_state(&self, x: usize, y: usize, z: usize) -> Block {
        let (si, ly) = Self::split_y(y);
        self.sections[si].get(x, ly, z)
    }

    pub fn get_block_state_layer(
        &self,
        x: usize,
        y: usize,
        z: usize,
        storage: usize,
    ) -> Result<Block, StorageError> {
        let (si, ly) = Self::split_y(y);
        self.sections[si].get_layer(x, ly, z, storage)
    }

    pub fn get_block_states(&self, x: usize, y: usize, z: usize) -> Vec<(Block, usize)> {
        let (si, ly) = Self::split_y(y);
        self.sections[si].get_all(x, ly, z).collect()
    }

    pub fn is_transparent(&self, x: usize, y: usize, z: usize) -> bool {
        let (si, ly) = Self::split_y(y);
        self.sections[si].is_transparent(x, ly, z)
    }

    pub fn is_solid(&self, x: usize, y: usize, z: usize) -> bool {
        let (si, ly) = Self::split_y(y);
        self.sections[si].is_solid(x, ly, z)
    }

    pub fn is_scheduled(&self, x: usize, y: usize, z: usize) -> bool {
        let (si, ly) = Self::split_y(y);
        self.sections[si].is_scheduled(x, ly, z)
    }

    pub fn get_skylight(&self, x: usize, y: usize, z: usize) -> u8 {
        let (si, ly) = Self::split_y(y);
        self.sections[si].get_skylight(x, ly, z)
    }

    pub fn set_skylight(&mut self, x: usize, y: usize, z: usize, value: u8) -> bool {
        let (si, ly) = Self::split_y(y);
        let changed = self.sections[si].set_skylight(x, ly, z, value);
        if changed {
            self.sky_light_dirty = true;
        }
        changed
    }

    pub fn get_blocklight(&self, x: usize, y: usize, z: usize) -> u8 {
        let (si, ly) = Self::split_y(y);
        self.sections[si].get_blocklight(x, ly, z)
    }

    pub fn set_blocklight(&mut self, x: usize, y: usize, z: usize, value: u8) -> bool {
        let (si, ly) = Self::split_y(y);
        let changed = self.sections[si].set_blocklight(x, ly, z, value);
        if changed {
            self.block_light_dirty = true;
        }
        changed
    }

    pub fn reset_skylight(&mut self, initial: u8) {
        for s in &mut self.sections {
            s.reset_skylight(initial);
        }
        self.sky_light_dirty = true;
    }

    /// Revalidate every section after bulk population.
    pub fn remove_invalid_blocks(&mut self, reg: &BlockRegistry) {
        for s in &mut self.sections {
            s.remove_invalid_blocks(reg);
        }
    }
}
