//! The chunk pipeline driver: scheduling queues, the dispatch loop, and
//! the per-column rebuild executed on the worker pool.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::{HashMap, HashSet};
use lodestone_blocks::{Block, BlockRegistry, Direction};
use lodestone_chunk::{
    BlockAccess, CHUNK_HEIGHT, CHUNK_WIDTH, ChunkColumn, ChunkCoordinates, ScheduleType,
    StorageError,
};
use lodestone_geom::Aabb;
use lodestone_gpu::{BufferPool, ChunkData};
use lodestone_mesh::{BlockModelProvider, ChunkMesh, build_section_mesh};

use crate::camera::CameraView;
use crate::cancel::CancelToken;
use crate::config::VideoOptions;
use crate::handle::ColumnHandle;
use crate::view::{ColumnMap, WorldView};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Point-in-time counters for diagnostics and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ManagerStats {
    pub enqueued: usize,
    pub high_priority: usize,
    pub in_flight: usize,
    pub running: usize,
    pub built_columns: u64,
    pub lock_contended: u64,
    pub cancelled_builds: u64,
}

#[derive(Default)]
struct Counters {
    built: AtomicU64,
    contended: AtomicU64,
    cancelled: AtomicU64,
}

struct ManagerInner {
    registry: Arc<BlockRegistry>,
    models: Arc<dyn BlockModelProvider + Send + Sync>,
    camera: Arc<dyn CameraView>,
    options: VideoOptions,

    columns: RwLock<ColumnMap>,
    /// Coordinates awaiting dispatch; membership dedups repeat requests.
    enqueued: Mutex<HashSet<ChunkCoordinates>>,
    /// Urgent lane, drained ahead of the distance-ordered backlog.
    high_tx: Sender<ChunkCoordinates>,
    high_rx: Receiver<ChunkCoordinates>,
    /// One in-flight work item per coordinate, holding its cancel token.
    work_items: Mutex<HashMap<ChunkCoordinates, CancelToken>>,
    running: AtomicUsize,

    gpu: RwLock<HashMap<ChunkCoordinates, Arc<RwLock<ChunkData>>>>,
    render_visible: RwLock<Vec<ChunkCoordinates>>,
    pool: BufferPool,
    frame: AtomicU64,

    workers: rayon::ThreadPool,
    master: CancelToken,
    counters: Counters,
}

/// Owns the loaded column set, decides what to rebuild and in what order,
/// and publishes GPU-ready meshes for the renderer.
pub struct ChunkManager {
    inner: Arc<ManagerInner>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl ChunkManager {
    pub fn new(
        registry: Arc<BlockRegistry>,
        models: Arc<dyn BlockModelProvider + Send + Sync>,
        camera: Arc<dyn CameraView>,
        options: VideoOptions,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(options.chunk_threads.max(1))
            .thread_name(|i| format!("chunk-worker-{i}"))
            .build()?;
        let (high_tx, high_rx) = unbounded();
        Ok(Self {
            inner: Arc::new(ManagerInner {
                registry,
                models,
                camera,
                options,
                columns: RwLock::new(HashMap::new()),
                enqueued: Mutex::new(HashSet::new()),
                high_tx,
                high_rx,
                work_items: Mutex::new(HashMap::new()),
                running: AtomicUsize::new(0),
                gpu: RwLock::new(HashMap::new()),
                render_visible: RwLock::new(Vec::new()),
                pool: BufferPool::new(),
                frame: AtomicU64::new(0),
                workers,
                master: CancelToken::new(),
                counters: Counters::default(),
            }),
            driver: Mutex::new(None),
        })
    }

    /// Spawn the driver thread. Ticks run until [`ChunkManager::dispose`]
    /// (or drop) cancels the master token.
    pub fn start(&self) {
        let mut driver = lock(&self.driver);
        if driver.is_some() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        let handle = thread::Builder::new()
            .name("chunk-update".to_string())
            .spawn(move || {
                log::info!(
                    "chunk update loop started (render distance {}, {} workers)",
                    inner.options.render_distance,
                    inner.options.chunk_threads
                );
                while !inner.master.is_cancelled() {
                    if !ManagerInner::tick(&inner) {
                        thread::sleep(Duration::from_millis(1));
                    }
                }
                log::info!("chunk update loop stopped");
            });
        match handle {
            Ok(h) => *driver = Some(h),
            Err(e) => log::error!("failed to spawn chunk update thread: {e}"),
        }
    }

    /// Cancel everything and join the driver. Idempotent.
    pub fn dispose(&self) {
        self.inner.master.cancel();
        for (_, token) in lock(&self.inner.work_items).drain() {
            token.cancel();
        }
        if let Some(h) = lock(&self.driver).take() {
            if h.join().is_err() {
                log::error!("chunk update thread panicked");
            }
        }
    }

    // ---- world surface ----

    /// Insert (or replace) a loaded column and schedule its first build.
    /// Lateral neighbors get a border pass so seam faces stay correct.
    pub fn add_chunk(&self, column: ChunkColumn) {
        let coords = column.coordinates();
        let handle = Arc::new(ColumnHandle::new(column));
        let replaced = self
            .inner
            .columns
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(coords, handle);
        if replaced.is_some() {
            log::warn!("chunk {coords} was already loaded, replacing");
            if let Some(token) = lock(&self.inner.work_items).get(&coords) {
                token.cancel();
            }
            self.inner.release_gpu(coords);
        }
        self.schedule_chunk_update(coords, ScheduleType::FULL, true);
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let n = ChunkCoordinates::new(coords.x + dx, coords.z + dz);
            if self.try_get_chunk(n).is_some() {
                self.schedule_chunk_update(n, ScheduleType::BORDER, false);
            }
        }
    }

    /// Drop a column: cancels in-flight work and releases its buffers.
    /// Voxel data goes with the handle once readers finish.
    pub fn remove_chunk(&self, coords: ChunkCoordinates) {
        if let Some(token) = lock(&self.inner.work_items).get(&coords) {
            token.cancel();
        }
        self.inner
            .columns
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&coords);
        lock(&self.inner.enqueued).remove(&coords);
        self.inner.release_gpu(coords);
    }

    pub fn clear_chunks(&self) {
        let all: Vec<ChunkCoordinates> = self
            .inner
            .columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect();
        for coords in all {
            self.remove_chunk(coords);
        }
    }

    /// Queue a full rebuild of every loaded column (resource reload).
    pub fn rebuild_all(&self) {
        let all: Vec<ChunkCoordinates> = self
            .inner
            .columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect();
        for coords in all {
            self.schedule_chunk_update(coords, ScheduleType::FULL | ScheduleType::LIGHTING, true);
        }
    }

    pub fn try_get_chunk(&self, coords: ChunkCoordinates) -> Option<Arc<ColumnHandle>> {
        self.inner
            .columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&coords)
            .cloned()
    }

    pub fn chunk_count(&self) -> usize {
        self.inner
            .columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Apply a single block edit and route the rebuild: the edited column
    /// urgently, plus a border pass on the lateral neighbor when the edit
    /// sits on a chunk seam. Returns false when the column is not loaded.
    pub fn set_block_state(
        &self,
        x: i32,
        y: i32,
        z: i32,
        state: Block,
        storage: usize,
    ) -> Result<bool, StorageError> {
        if y < 0 || y >= CHUNK_HEIGHT as i32 {
            return Ok(false);
        }
        let coords = ChunkCoordinates::from_block(x, z);
        let Some(handle) = self.try_get_chunk(coords) else {
            return Ok(false);
        };
        {
            let mut st = handle.write();
            st.column.set_block_state(
                (x & 0xf) as usize,
                y as usize,
                (z & 0xf) as usize,
                state,
                storage,
                &self.inner.registry,
            )?;
        }
        self.schedule_chunk_update(
            coords,
            ScheduleType::SCHEDULED | ScheduleType::LIGHTING,
            true,
        );

        let (lx, lz) = ((x & 0xf) as i32, (z & 0xf) as i32);
        let mut laterals = Vec::new();
        if lx == 0 {
            laterals.push((-1, 0));
        } else if lx == (CHUNK_WIDTH as i32) - 1 {
            laterals.push((1, 0));
        }
        if lz == 0 {
            laterals.push((0, -1));
        } else if lz == (CHUNK_WIDTH as i32) - 1 {
            laterals.push((0, 1));
        }
        for (dx, dz) in laterals {
            let n = ChunkCoordinates::new(coords.x + dx, coords.z + dz);
            if self.try_get_chunk(n).is_some() {
                self.schedule_chunk_update(
                    n,
                    ScheduleType::BORDER | ScheduleType::LIGHTING,
                    true,
                );
            }
        }
        Ok(true)
    }

    // ---- scheduling ----

    /// Request a rebuild for one coordinate.
    ///
    /// Prioritized requests overwrite the pending reason and jump to the
    /// urgent lane, but a coordinate already queued keeps its single
    /// entry. Ordinary requests coalesce: a column with any pending
    /// reason, an in-flight work item, or an existing queue entry absorbs
    /// the request.
    pub fn schedule_chunk_update(
        &self,
        coords: ChunkCoordinates,
        reason: ScheduleType,
        prioritize: bool,
    ) {
        let Some(handle) = self.try_get_chunk(coords) else {
            return;
        };

        if prioritize {
            handle.set_scheduled(reason);
            if lock(&self.inner.enqueued).insert(coords) {
                let _ = self.inner.high_tx.send(coords);
            }
            return;
        }

        if !handle.scheduled().is_unscheduled() {
            return;
        }
        if lock(&self.inner.work_items).contains_key(&coords) {
            return;
        }
        if lock(&self.inner.enqueued).insert(coords) {
            handle.set_scheduled(reason);
        }
    }

    /// Run one driver iteration: evict far data, refresh visibility,
    /// schedule unbuilt visible columns, and dispatch at most one work
    /// item. Returns whether anything was dispatched. Normally called
    /// from the driver thread; exposed for headless stepping.
    pub fn driver_tick(&self) -> bool {
        ManagerInner::tick(&self.inner)
    }

    /// Rebuild one column synchronously on the calling thread. Returns
    /// false when the column is missing or another rebuild holds it.
    pub fn update_chunk_now(&self, coords: ChunkCoordinates) -> bool {
        let token = self.inner.master.child();
        self.inner.update_chunk(coords, &token)
    }

    // ---- renderer surface ----

    /// Snapshot of drawable chunks for this frame. Buffers stay valid
    /// until a later [`ChunkManager::end_frame`] reclaims them.
    pub fn visible_chunks(&self) -> Vec<(ChunkCoordinates, Arc<RwLock<ChunkData>>)> {
        let visible = self
            .inner
            .render_visible
            .read()
            .unwrap_or_else(|e| e.into_inner());
        let gpu = self.inner.gpu.read().unwrap_or_else(|e| e.into_inner());
        visible
            .iter()
            .filter_map(|c| gpu.get(c).map(|d| (*c, Arc::clone(d))))
            .collect()
    }

    /// Advance the frame counter and free buffers retired during frames
    /// the renderer has finished presenting.
    pub fn end_frame(&self) {
        let completed = self.inner.frame.fetch_add(1, Ordering::AcqRel);
        self.inner.pool.reclaim(completed);
    }

    pub fn buffer_pool(&self) -> &BufferPool {
        &self.inner.pool
    }

    pub fn options(&self) -> VideoOptions {
        self.inner.options
    }

    pub fn stats(&self) -> ManagerStats {
        let inner = &self.inner;
        ManagerStats {
            enqueued: lock(&inner.enqueued).len(),
            high_priority: inner.high_rx.len(),
            in_flight: lock(&inner.work_items).len(),
            running: inner.running.load(Ordering::Acquire),
            built_columns: inner.counters.built.load(Ordering::Relaxed),
            lock_contended: inner.counters.contended.load(Ordering::Relaxed),
            cancelled_builds: inner.counters.cancelled.load(Ordering::Relaxed),
        }
    }
}

impl Drop for ChunkManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

// Cross-chunk accessors for the edit/decode path. Rebuild workers use
// their own view; calling these from a model provider during a build of
// the same column would deadlock on the column lock.
impl BlockAccess for ChunkManager {
    fn get_block_state(&self, x: i32, y: i32, z: i32) -> Block {
        self.inner
            .column_query(x, y, z, Block::AIR, |c, lx, ly, lz| {
                c.get_block_state(lx, ly, lz)
            })
    }

    fn get_block_states(&self, x: i32, y: i32, z: i32) -> Vec<(Block, usize)> {
        self.inner
            .column_query(x, y, z, vec![(Block::AIR, 0)], |c, lx, ly, lz| {
                c.get_block_states(lx, ly, lz)
            })
    }

    fn is_transparent(&self, x: i32, y: i32, z: i32) -> bool {
        self.inner
            .column_query(x, y, z, false, |c, lx, ly, lz| c.is_transparent(lx, ly, lz))
    }

    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.inner
            .column_query(x, y, z, false, |c, lx, ly, lz| c.is_solid(lx, ly, lz))
    }

    fn is_scheduled(&self, x: i32, y: i32, z: i32) -> bool {
        self.inner
            .column_query(x, y, z, false, |c, lx, ly, lz| c.is_scheduled(lx, ly, lz))
    }

    fn get_skylight(&self, x: i32, y: i32, z: i32) -> u8 {
        self.inner
            .column_query(x, y, z, 15, |c, lx, ly, lz| c.get_skylight(lx, ly, lz))
    }

    fn get_blocklight(&self, x: i32, y: i32, z: i32) -> u8 {
        self.inner
            .column_query(x, y, z, 0, |c, lx, ly, lz| c.get_blocklight(lx, ly, lz))
    }
}

impl ManagerInner {
    fn column_query<T>(
        &self,
        x: i32,
        y: i32,
        z: i32,
        default: T,
        f: impl FnOnce(&ChunkColumn, usize, usize, usize) -> T,
    ) -> T {
        if y < 0 || y >= CHUNK_HEIGHT as i32 {
            return default;
        }
        let coords = ChunkCoordinates::from_block(x, z);
        let handle = {
            let columns = self.columns.read().unwrap_or_else(|e| e.into_inner());
            columns.get(&coords).cloned()
        };
        match handle {
            Some(h) => {
                let state = h.read();
                f(
                    &state.column,
                    (x & 0xf) as usize,
                    y as usize,
                    (z & 0xf) as usize,
                )
            }
            None => default,
        }
    }

    fn chunk_bounds(coords: ChunkCoordinates) -> Aabb {
        Aabb::chunk_box(
            (coords.x * CHUNK_WIDTH as i32) as f32,
            (coords.z * CHUNK_WIDTH as i32) as f32,
            CHUNK_WIDTH as f32,
            CHUNK_HEIGHT as f32,
            CHUNK_WIDTH as f32,
        )
    }

    fn release_gpu(&self, coords: ChunkCoordinates) {
        let entry = self
            .gpu
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&coords);
        if let Some(entry) = entry {
            let frame = self.frame.load(Ordering::Acquire);
            entry
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .release(&self.pool, frame);
        }
    }

    /// One driver iteration. At most one work item is dispatched per
    /// tick so tests can step the scheduler deterministically.
    fn tick(this: &Arc<Self>) -> bool {
        let camera_pos = this.camera.position();
        let camera_chunk = ChunkCoordinates::from_block(camera_pos.x as i32, camera_pos.z as i32);
        let distance = this.options.render_distance;

        // Far eviction frees buffers only; voxel storage stays loaded.
        let far: Vec<ChunkCoordinates> = {
            let gpu = this.gpu.read().unwrap_or_else(|e| e.into_inner());
            gpu.keys()
                .filter(|c| c.distance_to(camera_chunk) > distance)
                .copied()
                .collect()
        };
        for coords in far {
            this.release_gpu(coords);
        }

        let handles: Vec<(ChunkCoordinates, Arc<ColumnHandle>)> = {
            let columns = this.columns.read().unwrap_or_else(|e| e.into_inner());
            columns.iter().map(|(c, h)| (*c, Arc::clone(h))).collect()
        };
        let mut rendered = Vec::new();
        for (coords, handle) in handles {
            if coords.distance_to(camera_chunk) > distance {
                continue;
            }
            if !this.camera.in_frustum(Self::chunk_bounds(coords)) {
                continue;
            }
            let has_data = {
                let gpu = this.gpu.read().unwrap_or_else(|e| e.into_inner());
                gpu.contains_key(&coords)
            };
            if has_data {
                rendered.push(coords);
            } else if handle.scheduled().is_unscheduled() {
                this.schedule_unscheduled(coords, &handle);
            }
        }
        *this
            .render_visible
            .write()
            .unwrap_or_else(|e| e.into_inner()) = rendered;

        if this.running.load(Ordering::Acquire) >= this.options.chunk_threads.max(1) {
            return false;
        }
        Self::dispatch_one(this, camera_chunk)
    }

    /// Driver-side scheduling of a visible but unbuilt column; same rules
    /// as the ordinary (non-prioritized) path.
    fn schedule_unscheduled(&self, coords: ChunkCoordinates, handle: &ColumnHandle) {
        if lock(&self.work_items).contains_key(&coords) {
            return;
        }
        if lock(&self.enqueued).insert(coords) {
            handle.set_scheduled(ScheduleType::FULL);
        }
    }

    /// Pick and dispatch one coordinate: urgent lane first (out-of-range
    /// entries fall back to the ordinary queue), then nearest in-frustum,
    /// then nearest overall. A coordinate with a live work item is never
    /// dispatched again; it stays queued until that work item retires.
    fn dispatch_one(this: &Arc<Self>, camera_chunk: ChunkCoordinates) -> bool {
        if let Ok(coords) = this.high_rx.try_recv() {
            if lock(&this.work_items).contains_key(&coords) {
                lock(&this.enqueued).insert(coords);
            } else if coords.distance_to(camera_chunk) <= this.options.render_distance {
                Self::spawn_update(this, coords);
                return true;
            } else {
                lock(&this.enqueued).insert(coords);
            }
        }

        let candidate = {
            let enqueued = lock(&this.enqueued);
            let mut best: Option<(i32, ChunkCoordinates)> = None;
            let mut best_visible: Option<(i32, ChunkCoordinates)> = None;
            for &coords in enqueued.iter() {
                let d = coords.distance_to(camera_chunk);
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, coords));
                }
                if this.camera.in_frustum(Self::chunk_bounds(coords))
                    && best_visible.is_none_or(|(bd, _)| d < bd)
                {
                    best_visible = Some((d, coords));
                }
            }
            best_visible.or(best).map(|(_, c)| c)
        };

        let Some(coords) = candidate else {
            return false;
        };
        if lock(&this.work_items).contains_key(&coords) {
            return false;
        }
        Self::spawn_update(this, coords);
        true
    }

    /// Register the work item and hand the rebuild to the worker pool.
    fn spawn_update(this: &Arc<Self>, coords: ChunkCoordinates) {
        let token = this.master.child();
        lock(&this.work_items).insert(coords, token.clone());
        lock(&this.enqueued).remove(&coords);
        this.running.fetch_add(1, Ordering::AcqRel);

        let inner = Arc::clone(this);
        this.workers.spawn(move || {
            let mut updated = false;
            if !token.is_cancelled() {
                updated = inner.update_chunk(coords, &token);
            }
            if !updated && !token.is_cancelled() {
                // Lock contention; retry on a later tick through the
                // ordinary queue, unless the column was removed.
                let loaded = inner
                    .columns
                    .read()
                    .unwrap_or_else(|e| e.into_inner())
                    .contains_key(&coords);
                if loaded {
                    lock(&inner.enqueued).insert(coords);
                }
            }
            inner.running.fetch_sub(1, Ordering::AcqRel);
            lock(&inner.work_items).remove(&coords);
        });
    }

    /// Rebuild every section of one column that needs it, aggregate the
    /// section meshes, and publish the result to the GPU map.
    ///
    /// Returns false without touching mesh state when the column is gone,
    /// another worker holds its update lock, or the token cancels
    /// mid-build (scheduling state is left pending so the column retries).
    fn update_chunk(&self, coords: ChunkCoordinates, token: &CancelToken) -> bool {
        let handle = {
            let columns = self.columns.read().unwrap_or_else(|e| e.into_inner());
            columns.get(&coords).cloned()
        };
        let Some(handle) = handle else {
            return false;
        };
        let Some(_update) = handle.try_begin_update() else {
            self.counters.contended.fetch_add(1, Ordering::Relaxed);
            return false;
        };

        let columns_snapshot: ColumnMap = self
            .columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let schedule = handle.scheduled();
        let camera_section = (self.camera.position().y as i32) >> 4;

        let mut state = handle.write();
        let state = &mut *state;
        let highest = state
            .column
            .highest_nonempty_section()
            .map_or(0, |h| h as i32);
        let current = camera_section.min(highest - 2).max(0) as usize;

        let mut aggregate = ChunkMesh::default();
        for i in 0..state.column.section_count() {
            if token.is_cancelled() {
                self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
                log::debug!("rebuild of chunk {coords} cancelled at section {i}");
                return false;
            }

            let Some(section) = state.column.section(i) else {
                continue;
            };
            if section.is_empty() {
                continue;
            }

            // Occlusion skips for sections that cannot contribute faces;
            // the camera's section and the ground section always build.
            if i != current && i != 0 {
                let solid_neighbors =
                    self.solid_neighbor_count(coords, &state.column, &columns_snapshot, i);
                if !section.has_air_pockets() && solid_neighbors == 6 {
                    continue;
                }
                if i < current && solid_neighbors >= 6 {
                    continue;
                }
            }

            let needs_build = state.caches[i].mesh.is_none()
                || !schedule.is_unscheduled()
                || section.is_dirty();
            if needs_build {
                let snapshot = section.clone();
                let (below, rest) = state.column.sections_mut().split_at_mut(i);
                let Some((section, above)) = rest.split_first_mut() else {
                    continue;
                };
                let view = WorldView::new(coords, below, &snapshot, above, &columns_snapshot);
                build_section_mesh(
                    &view,
                    &self.registry,
                    self.models.as_ref(),
                    section,
                    &mut state.caches[i],
                    schedule,
                    coords,
                    i,
                );
            }
            if let Some(m) = state.caches[i].mesh.as_ref() {
                aggregate.append(m);
            }
        }

        let frame = self.frame.load(Ordering::Acquire);
        // An empty aggregate keeps its map entry (holding no buffers) so
        // the driver sees the column as built and does not reschedule it;
        // removal and far eviction drop the entry.
        let entry = {
            let mut gpu = self.gpu.write().unwrap_or_else(|e| e.into_inner());
            Arc::clone(
                gpu.entry(coords)
                    .or_insert_with(|| Arc::new(RwLock::new(ChunkData::new(coords)))),
            )
        };
        entry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .apply_mesh(&self.pool, &aggregate, frame);

        handle.clear_scheduled();
        self.counters.built.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// How many of a section's six face-adjacent sections present a fully
    /// solid face toward it. Unloaded or busy neighbors count as open.
    fn solid_neighbor_count(
        &self,
        coords: ChunkCoordinates,
        column: &ChunkColumn,
        columns: &ColumnMap,
        i: usize,
    ) -> usize {
        let mut count = 0;
        if let Some(s) = column.section(i + 1) {
            if s.is_face_solid(Direction::Down.index()) {
                count += 1;
            }
        }
        if i > 0 {
            if let Some(s) = column.section(i - 1) {
                if s.is_face_solid(Direction::Up.index()) {
                    count += 1;
                }
            }
        }
        for (dx, dz, face) in [
            (1, 0, Direction::West),
            (-1, 0, Direction::East),
            (0, 1, Direction::North),
            (0, -1, Direction::South),
        ] {
            let n = ChunkCoordinates::new(coords.x + dx, coords.z + dz);
            let solid = columns
                .get(&n)
                .and_then(|h| h.try_read())
                .and_then(|state| {
                    state
                        .column
                        .section(i)
                        .map(|s| s.is_face_solid(face.index()))
                })
                .unwrap_or(false);
            if solid {
                count += 1;
            }
        }
        count
    }
}
