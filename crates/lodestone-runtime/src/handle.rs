use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use lodestone_chunk::{ChunkColumn, ChunkCoordinates, ScheduleType};
use lodestone_mesh::SectionCache;

/// Column voxel data plus the per-section build artifacts. Kept together
/// under one lock so a rebuild sees storage and caches in lockstep.
#[derive(Debug)]
pub struct ColumnState {
    pub column: ChunkColumn,
    pub caches: Vec<SectionCache>,
}

/// Shared handle to one loaded column.
///
/// `data` guards voxel storage and mesh caches; `update_lock` is the
/// separate rebuild mutex taken with try-lock semantics so at most one
/// worker rebuilds a column while contenders abandon instead of queueing.
/// The pending rebuild reason lives in an atomic so schedulers never need
/// the data lock.
pub struct ColumnHandle {
    coordinates: ChunkCoordinates,
    data: RwLock<ColumnState>,
    update_lock: Mutex<()>,
    scheduled: AtomicU8,
}

impl ColumnHandle {
    pub fn new(column: ChunkColumn) -> Self {
        let coordinates = column.coordinates();
        let caches = (0..column.section_count())
            .map(|_| SectionCache::default())
            .collect();
        Self {
            coordinates,
            data: RwLock::new(ColumnState { column, caches }),
            update_lock: Mutex::new(()),
            scheduled: AtomicU8::new(ScheduleType::empty().bits()),
        }
    }

    #[inline]
    pub fn coordinates(&self) -> ChunkCoordinates {
        self.coordinates
    }

    pub fn scheduled(&self) -> ScheduleType {
        ScheduleType::from_bits_truncate(self.scheduled.load(Ordering::Acquire))
    }

    pub fn set_scheduled(&self, reason: ScheduleType) {
        self.scheduled.store(reason.bits(), Ordering::Release);
    }

    pub fn merge_scheduled(&self, reason: ScheduleType) {
        self.scheduled.fetch_or(reason.bits(), Ordering::AcqRel);
    }

    pub fn clear_scheduled(&self) {
        self.set_scheduled(ScheduleType::empty());
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ColumnState> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ColumnState> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Non-blocking read for cross-column neighbor queries during builds;
    /// `None` when a writer holds the column.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, ColumnState>> {
        match self.data.try_read() {
            Ok(g) => Some(g),
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Claim the column for rebuilding. `None` means another worker is
    /// already in; the caller abandons rather than waits.
    pub fn try_begin_update(&self) -> Option<MutexGuard<'_, ()>> {
        match self.update_lock.try_lock() {
            Ok(g) => Some(g),
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_lock_admits_exactly_one() {
        let handle = ColumnHandle::new(ChunkColumn::new(ChunkCoordinates::new(0, 0), 1));
        let first = handle.try_begin_update();
        assert!(first.is_some());
        assert!(handle.try_begin_update().is_none());
        drop(first);
        assert!(handle.try_begin_update().is_some());
    }

    #[test]
    fn scheduled_flag_round_trips() {
        let handle = ColumnHandle::new(ChunkColumn::new(ChunkCoordinates::new(1, 1), 1));
        assert!(handle.scheduled().is_unscheduled());
        handle.set_scheduled(ScheduleType::FULL);
        handle.merge_scheduled(ScheduleType::LIGHTING);
        assert_eq!(
            handle.scheduled(),
            ScheduleType::FULL | ScheduleType::LIGHTING
        );
        handle.clear_scheduled();
        assert!(handle.scheduled().is_unscheduled());
    }
}
