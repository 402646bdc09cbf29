//! One 16x16x16 voxel slab: block storage layers, light nibbles, and the
//! derived tracking bitsets driving incremental mesh rebuilds.

use lodestone_blocks::{Block, BlockRegistry};
use thiserror::Error;

use crate::bits::{BitGrid, NibbleArray};
use crate::coords::{SECTION_DIM, SECTION_VOLUME, coordinate_index};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage layer {storage} does not exist (section has {layers})")]
    InvalidStorage { storage: usize, layers: usize },
}

/// What a `set` changed besides the voxel itself; the owning column uses
/// this to raise its own dirty flags (no back-pointer from section to
/// column).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SetOutcome {
    pub block_light_changed: bool,
}

/// One parallel 16^3 grid of block states.
#[derive(Clone, Debug)]
struct BlockStorage {
    blocks: Vec<Block>,
}

impl BlockStorage {
    fn new() -> Self {
        Self {
            blocks: vec![Block::AIR; SECTION_VOLUME],
        }
    }

    #[inline]
    fn get(&self, idx: usize) -> Block {
        self.blocks[idx]
    }

    #[inline]
    fn set(&mut self, idx: usize, b: Block) {
        self.blocks[idx] = b;
    }
}

#[derive(Clone, Debug)]
pub struct ChunkSection {
    y_base: i32,
    storages: Vec<BlockStorage>,
    block_light: NibbleArray,
    sky_light: NibbleArray,

    transparent: BitGrid,
    solid: BitGrid,
    rendered: BitGrid,
    scheduled: BitGrid,
    scheduled_skylight: BitGrid,
    scheduled_blocklight: BitGrid,

    block_ref_count: u32,
    tick_ref_count: u32,
    /// Coordinate indices of voxels whose block emits light.
    light_sources: Vec<u16>,

    solid_border: bool,
    face_solidity: [bool; 6],
    has_air_pockets: bool,

    is_new: bool,
    dirty: bool,
}

impl ChunkSection {
    /// `y_base` is the section's world-space Y origin. Unknown voxels start
    /// transparent and non-solid, skylight starts at full brightness.
    pub fn new(y_base: i32, storages: usize) -> Self {
        let storages = storages.max(1);
        Self {
            y_base,
            storages: (0..storages).map(|_| BlockStorage::new()).collect(),
            block_light: NibbleArray::new(0),
            sky_light: NibbleArray::new(0xf),
            transparent: BitGrid::new(true),
            solid: BitGrid::new(false),
            rendered: BitGrid::new(false),
            scheduled: BitGrid::new(false),
            scheduled_skylight: BitGrid::new(false),
            scheduled_blocklight: BitGrid::new(false),
            block_ref_count: 0,
            tick_ref_count: 0,
            light_sources: Vec::new(),
            solid_border: false,
            face_solidity: [false; 6],
            has_air_pockets: true,
            is_new: true,
            dirty: false,
        }
    }

    #[inline]
    pub fn y_base(&self) -> i32 {
        self.y_base
    }

    #[inline]
    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block_ref_count == 0
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        self.is_empty()
    }

    #[inline]
    pub fn needs_random_tick(&self) -> bool {
        self.tick_ref_count > 0
    }

    #[inline]
    pub fn block_ref_count(&self) -> u32 {
        self.block_ref_count
    }

    #[inline]
    pub fn tick_ref_count(&self) -> u32 {
        self.tick_ref_count
    }

    #[inline]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Cleared by the mesh builder after the first full build.
    pub fn clear_new(&mut self) {
        self.is_new = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.is_new
            || self.scheduled.count_ones() > 0
            || self.scheduled_skylight.count_ones() > 0
            || self.scheduled_blocklight.count_ones() > 0
            || self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn scheduled_updates_count(&self) -> usize {
        self.scheduled.count_ones()
    }

    pub fn scheduled_skylight_count(&self) -> usize {
        self.scheduled_skylight.count_ones()
    }

    pub fn scheduled_blocklight_count(&self) -> usize {
        self.scheduled_blocklight.count_ones()
    }

    pub fn light_sources(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.light_sources
            .iter()
            .map(|&idx| crate::coords::coordinate_xyz(idx as usize))
    }

    #[inline]
    pub fn solid_border(&self) -> bool {
        self.solid_border
    }

    #[inline]
    pub fn has_air_pockets(&self) -> bool {
        self.has_air_pockets
    }

    /// Whether the whole 16x16 face in the given direction is solid.
    /// Face order matches `Direction::index()`.
    #[inline]
    pub fn is_face_solid(&self, face: usize) -> bool {
        face < 6 && self.face_solidity[face]
    }

    // ---- block state access ----

    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        self.storages[0].get(coordinate_index(x, y, z))
    }

    pub fn get_layer(
        &self,
        x: usize,
        y: usize,
        z: usize,
        storage: usize,
    ) -> Result<Block, StorageError> {
        let layer = self
            .storages
            .get(storage)
            .ok_or(StorageError::InvalidStorage {
                storage,
                layers: self.storages.len(),
            })?;
        Ok(layer.get(coordinate_index(x, y, z)))
    }

    /// All layers at one voxel, innermost first. The mesh builder iterates
    /// this to support overlay blocks.
    pub fn get_all(&self, x: usize, y: usize, z: usize) -> impl Iterator<Item = (Block, usize)> {
        let idx = coordinate_index(x, y, z);
        self.storages
            .iter()
            .enumerate()
            .map(move |(i, s)| (s.get(idx), i))
    }

    /// Write one voxel. See the module docs for the bookkeeping this keeps
    /// consistent: ref counts, transparency/solidity bits, light sources,
    /// scheduling bits, and the air-pocket over-approximation.
    pub fn set(
        &mut self,
        storage: usize,
        x: usize,
        y: usize,
        z: usize,
        state: Block,
        reg: &BlockRegistry,
    ) -> Result<SetOutcome, StorageError> {
        if storage >= self.storages.len() {
            return Err(StorageError::InvalidStorage {
                storage,
                layers: self.storages.len(),
            });
        }

        // Unregistered ids would corrupt the ref-count invariants; discard
        // the write and keep prior state intact.
        let Some(new_ty) = reg.get_block(state) else {
            log::warn!("discarding write of unregistered block id {}", state.id);
            return Ok(SetOutcome::default());
        };

        let idx = coordinate_index(x, y, z);
        let mut outcome = SetOutcome::default();

        if storage == 0 {
            let outgoing = self.storages[0].get(idx);
            if let Some(old_ty) = reg.get_block(outgoing) {
                if !outgoing.is_air() {
                    self.block_ref_count -= 1;
                    if old_ty.random_ticked {
                        self.tick_ref_count -= 1;
                    }
                    self.transparent.set(idx, true);
                    self.solid.set(idx, false);
                }
                if old_ty.light_value > 0 {
                    self.light_sources.retain(|&i| i as usize != idx);
                }
            }
        }

        self.storages[storage].set(idx, state);

        if storage == 0 && !state.is_air() {
            self.block_ref_count += 1;
            if new_ty.random_ticked {
                self.tick_ref_count += 1;
            }
            self.transparent.set(idx, new_ty.transparent);
            self.solid.set(idx, new_ty.solid);

            if new_ty.light_value > 0 {
                if !self.light_sources.contains(&(idx as u16)) {
                    self.light_sources.push(idx as u16);
                }
                outcome.block_light_changed = self.set_blocklight(x, y, z, new_ty.light_value);
                self.scheduled_blocklight.set(idx, true);
            }
        }

        self.scheduled.set(idx, true);
        self.dirty = true;

        if storage == 0 && !new_ty.solid {
            // Over-approximation: only the full border rescan clears this.
            self.has_air_pockets = true;
        }

        Ok(outcome)
    }

    // ---- derived per-voxel flags ----

    #[inline]
    pub fn is_transparent(&self, x: usize, y: usize, z: usize) -> bool {
        self.transparent.get(coordinate_index(x, y, z))
    }

    #[inline]
    pub fn is_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.solid.get(coordinate_index(x, y, z))
    }

    #[inline]
    pub fn is_rendered(&self, x: usize, y: usize, z: usize) -> bool {
        self.rendered.get(coordinate_index(x, y, z))
    }

    pub fn set_rendered(&mut self, x: usize, y: usize, z: usize, value: bool) {
        self.rendered.set(coordinate_index(x, y, z), value);
    }

    #[inline]
    pub fn is_scheduled(&self, x: usize, y: usize, z: usize) -> bool {
        self.scheduled.get(coordinate_index(x, y, z))
    }

    pub fn set_scheduled(&mut self, x: usize, y: usize, z: usize, value: bool) {
        self.scheduled.set(coordinate_index(x, y, z), value);
    }

    #[inline]
    pub fn is_skylight_scheduled(&self, x: usize, y: usize, z: usize) -> bool {
        self.scheduled_skylight.get(coordinate_index(x, y, z))
    }

    pub fn set_skylight_scheduled(&mut self, x: usize, y: usize, z: usize, value: bool) {
        self.scheduled_skylight.set(coordinate_index(x, y, z), value);
    }

    #[inline]
    pub fn is_blocklight_scheduled(&self, x: usize, y: usize, z: usize) -> bool {
        self.scheduled_blocklight.get(coordinate_index(x, y, z))
    }

    pub fn set_blocklight_scheduled(&mut self, x: usize, y: usize, z: usize, value: bool) {
        self.scheduled_blocklight
            .set(coordinate_index(x, y, z), value);
    }

    // ---- light ----

    #[inline]
    pub fn get_skylight(&self, x: usize, y: usize, z: usize) -> u8 {
        self.sky_light.get(coordinate_index(x, y, z))
    }

    /// Stores the new value and marks the voxel skylight-scheduled.
    /// Returns false (and does nothing) when the value is unchanged; a true
    /// return is the sole trigger for light-driven rebuilds downstream.
    pub fn set_skylight(&mut self, x: usize, y: usize, z: usize, value: u8) -> bool {
        let idx = coordinate_index(x, y, z);
        if self.sky_light.get(idx) == value & 0xf {
            return false;
        }
        self.sky_light.set(idx, value);
        self.scheduled_skylight.set(idx, true);
        true
    }

    #[inline]
    pub fn get_blocklight(&self, x: usize, y: usize, z: usize) -> u8 {
        self.block_light.get(coordinate_index(x, y, z))
    }

    /// Block-light counterpart of [`ChunkSection::set_skylight`].
    pub fn set_blocklight(&mut self, x: usize, y: usize, z: usize, value: u8) -> bool {
        let idx = coordinate_index(x, y, z);
        if self.block_light.get(idx) == value & 0xf {
            return false;
        }
        self.block_light.set(idx, value);
        self.scheduled_blocklight.set(idx, true);
        true
    }

    /// Refill the skylight array, e.g. when the column's sky exposure is
    /// recomputed after decode.
    pub fn reset_skylight(&mut self, initial: u8) {
        self.sky_light.fill(initial);
    }

    // ---- bulk revalidation ----

    /// Full rescan after bulk population (network decode): rebuilds ref
    /// counts and the transparency/solidity bits from storage 0, then runs
    /// the border/air-pocket scan.
    pub fn remove_invalid_blocks(&mut self, reg: &BlockRegistry) {
        self.block_ref_count = 0;
        self.tick_ref_count = 0;

        for x in 0..SECTION_DIM {
            for y in 0..SECTION_DIM {
                for z in 0..SECTION_DIM {
                    let idx = coordinate_index(x, y, z);
                    let block = self.storages[0].get(idx);
                    match reg.get_block(block) {
                        Some(ty) => {
                            self.transparent.set(idx, ty.transparent);
                            self.solid.set(idx, ty.solid);
                            if !block.is_air() {
                                self.block_ref_count += 1;
                                if ty.random_ticked {
                                    self.tick_ref_count += 1;
                                }
                            }
                        }
                        None => {
                            self.transparent.set(idx, true);
                            self.solid.set(idx, false);
                        }
                    }
                }
            }
        }

        self.check_for_solid_border();
    }

    /// Face solidity, whole-border solidity, and the exact air-pocket scan
    /// over the strict interior. This is the only place `has_air_pockets`
    /// can go back to false.
    pub fn check_for_solid_border(&mut self) {
        let mut solidity = [true; 6];
        for a in 0..SECTION_DIM {
            for b in 0..SECTION_DIM {
                // Direction::index() order: up, down, north (z=0),
                // south (z=15), west (x=0), east (x=15).
                if !self.solid.get(coordinate_index(a, 15, b)) {
                    solidity[0] = false;
                }
                if !self.solid.get(coordinate_index(a, 0, b)) {
                    solidity[1] = false;
                }
                if !self.solid.get(coordinate_index(a, b, 0)) {
                    solidity[2] = false;
                }
                if !self.solid.get(coordinate_index(a, b, 15)) {
                    solidity[3] = false;
                }
                if !self.solid.get(coordinate_index(0, b, a)) {
                    solidity[4] = false;
                }
                if !self.solid.get(coordinate_index(15, b, a)) {
                    solidity[5] = false;
                }
            }
        }

        let mut air_pockets = false;
        'scan: for x in 1..15 {
            for y in 1..15 {
                for z in 1..15 {
                    if !self.solid.get(coordinate_index(x, y, z)) {
                        air_pockets = true;
                        break 'scan;
                    }
                }
            }
        }

        self.face_solidity = solidity;
        self.solid_border = solidity.iter().all(|&s| s);
        self.has_air_pockets = air_pockets;
    }
}
