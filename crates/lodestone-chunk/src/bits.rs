//! Fixed-size per-voxel arrays: one bit or one nibble per voxel.

use crate::coords::SECTION_VOLUME;

const WORDS: usize = SECTION_VOLUME / 64;

/// 4096-bit flag grid with a maintained population count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitGrid {
    words: [u64; WORDS],
    ones: u32,
}

impl BitGrid {
    pub fn new(fill: bool) -> Self {
        if fill {
            Self {
                words: [u64::MAX; WORDS],
                ones: SECTION_VOLUME as u32,
            }
        } else {
            Self {
                words: [0; WORDS],
                ones: 0,
            }
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        (self.words[idx >> 6] >> (idx & 63)) & 1 != 0
    }

    /// Returns true when the bit actually changed.
    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) -> bool {
        let old = self.get(idx);
        if old == value {
            return false;
        }
        let mask = 1u64 << (idx & 63);
        if value {
            self.words[idx >> 6] |= mask;
            self.ones += 1;
        } else {
            self.words[idx >> 6] &= !mask;
            self.ones -= 1;
        }
        true
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones as usize
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.ones == 0
    }

    pub fn fill(&mut self, value: bool) {
        *self = Self::new(value);
    }
}

impl Default for BitGrid {
    fn default() -> Self {
        Self::new(false)
    }
}

/// 4096 packed 4-bit values (light levels 0..=15).
#[derive(Clone, PartialEq, Eq)]
pub struct NibbleArray {
    data: [u8; SECTION_VOLUME / 2],
}

impl NibbleArray {
    pub fn new(fill: u8) -> Self {
        let v = (fill & 0xf) | ((fill & 0xf) << 4);
        Self {
            data: [v; SECTION_VOLUME / 2],
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> u8 {
        let byte = self.data[idx >> 1];
        if idx & 1 == 0 {
            byte & 0xf
        } else {
            byte >> 4
        }
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: u8) {
        let value = value & 0xf;
        let byte = &mut self.data[idx >> 1];
        if idx & 1 == 0 {
            *byte = (*byte & 0xf0) | value;
        } else {
            *byte = (*byte & 0x0f) | (value << 4);
        }
    }

    pub fn fill(&mut self, value: u8) {
        *self = Self::new(value);
    }
}

impl core::fmt::Debug for NibbleArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NibbleArray").finish_non_exhaustive()
    }
}
