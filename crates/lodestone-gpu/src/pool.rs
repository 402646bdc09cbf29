use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use lodestone_mesh::Vertex;

/// Opaque handle identity, unique for the lifetime of the pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BufferId(u64);

/// Pooled vertex buffer. `capacity` is fixed at allocation; uploads that
/// fit go through `set_data` in place.
#[derive(Debug)]
pub struct VertexBuffer {
    id: BufferId,
    capacity: usize,
    data: Vec<Vertex>,
}

impl VertexBuffer {
    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contents(&self) -> &[Vertex] {
        &self.data
    }

    fn set_data(&mut self, data: &[Vertex]) {
        debug_assert!(data.len() <= self.capacity);
        self.data.clear();
        self.data.extend_from_slice(data);
    }
}

/// Pooled index buffer, same reuse discipline as [`VertexBuffer`].
#[derive(Debug)]
pub struct IndexBuffer {
    id: BufferId,
    capacity: usize,
    data: Vec<u32>,
}

impl IndexBuffer {
    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contents(&self) -> &[u32] {
        &self.data
    }

    fn set_data(&mut self, data: &[u32]) {
        debug_assert!(data.len() <= self.capacity);
        self.data.clear();
        self.data.extend_from_slice(data);
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub live_buffers: usize,
    pub pending_disposal: usize,
    pub allocations: usize,
    pub reclaimed: usize,
}

struct Retired {
    id: BufferId,
    frame: u64,
}

/// Allocator plus deferred-disposal list. Shared between the update
/// workers (uploads) and the render loop (reclaim at frame boundaries).
pub struct BufferPool {
    next_id: AtomicU64,
    live: AtomicUsize,
    allocations: AtomicUsize,
    reclaimed: AtomicUsize,
    retired: Mutex<Vec<Retired>>,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            live: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
            reclaimed: AtomicUsize::new(0),
            retired: Mutex::new(Vec::new()),
        }
    }

    fn allocate_id(&self) -> BufferId {
        self.live.fetch_add(1, Ordering::Relaxed);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        BufferId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Upload vertex data, reusing `existing` when the data fits strictly
    /// under its capacity. A full (or missing) buffer is replaced and the
    /// old one retired against `frame`.
    pub fn upload_vertices(
        &self,
        existing: Option<VertexBuffer>,
        data: &[Vertex],
        frame: u64,
    ) -> VertexBuffer {
        match existing {
            Some(mut buf) if data.len() < buf.capacity => {
                buf.set_data(data);
                buf
            }
            other => {
                if let Some(old) = other {
                    self.retire_vertices(old, frame);
                }
                let mut buf = VertexBuffer {
                    id: self.allocate_id(),
                    capacity: data.len().max(1),
                    data: Vec::with_capacity(data.len()),
                };
                buf.set_data(data);
                buf
            }
        }
    }

    /// Index counterpart of [`BufferPool::upload_vertices`]; indices reuse
    /// up to and including the capacity.
    pub fn upload_indices(
        &self,
        existing: Option<IndexBuffer>,
        data: &[u32],
        frame: u64,
    ) -> IndexBuffer {
        match existing {
            Some(mut buf) if data.len() <= buf.capacity => {
                buf.set_data(data);
                buf
            }
            other => {
                if let Some(old) = other {
                    self.retire_indices(old, frame);
                }
                let mut buf = IndexBuffer {
                    id: self.allocate_id(),
                    capacity: data.len().max(1),
                    data: Vec::with_capacity(data.len()),
                };
                buf.set_data(data);
                buf
            }
        }
    }

    /// Queue a buffer for destruction once `frame` has been presented.
    pub fn retire_vertices(&self, buf: VertexBuffer, frame: u64) {
        self.push_retired(buf.id, frame);
    }

    pub fn retire_indices(&self, buf: IndexBuffer, frame: u64) {
        self.push_retired(buf.id, frame);
    }

    fn push_retired(&self, id: BufferId, frame: u64) {
        let mut retired = self.retired.lock().unwrap_or_else(|e| e.into_inner());
        retired.push(Retired { id, frame });
    }

    /// Destroy every buffer retired at or before `completed_frame`.
    /// Returns how many were freed.
    pub fn reclaim(&self, completed_frame: u64) -> usize {
        let mut retired = self.retired.lock().unwrap_or_else(|e| e.into_inner());
        let mut freed_ids = Vec::new();
        retired.retain(|r| {
            if r.frame > completed_frame {
                true
            } else {
                freed_ids.push(r.id);
                false
            }
        });
        let freed = freed_ids.len();
        if freed > 0 {
            self.live.fetch_sub(freed, Ordering::Relaxed);
            self.reclaimed.fetch_add(freed, Ordering::Relaxed);
            log::trace!("reclaimed {freed_ids:?} through frame {completed_frame}");
        }
        freed
    }

    pub fn stats(&self) -> PoolStats {
        let pending = self
            .retired
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len();
        PoolStats {
            live_buffers: self.live.load(Ordering::Relaxed),
            pending_disposal: pending,
            allocations: self.allocations.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
        }
    }
}
