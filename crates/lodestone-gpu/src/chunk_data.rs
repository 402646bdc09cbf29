use lodestone_chunk::ChunkCoordinates;
use lodestone_mesh::ChunkMesh;

use crate::pool::{BufferPool, IndexBuffer, VertexBuffer};

/// Device-side state for one chunk column: the shared vertex buffer and
/// one index buffer per render pass. Swapped wholesale by the update
/// worker; the renderer only ever reads.
#[derive(Debug)]
pub struct ChunkData {
    coordinates: ChunkCoordinates,
    vertices: Option<VertexBuffer>,
    solid: Option<IndexBuffer>,
    transparent: Option<IndexBuffer>,
    animated: Option<IndexBuffer>,
}

impl ChunkData {
    pub fn new(coordinates: ChunkCoordinates) -> Self {
        Self {
            coordinates,
            vertices: None,
            solid: None,
            transparent: None,
            animated: None,
        }
    }

    #[inline]
    pub fn coordinates(&self) -> ChunkCoordinates {
        self.coordinates
    }

    /// Nothing to draw in any pass.
    pub fn is_empty(&self) -> bool {
        let count = |b: &Option<IndexBuffer>| b.as_ref().map_or(0, IndexBuffer::len);
        count(&self.solid) + count(&self.transparent) + count(&self.animated) == 0
    }

    pub fn vertex_buffer(&self) -> Option<&VertexBuffer> {
        self.vertices.as_ref()
    }

    pub fn solid_indices(&self) -> Option<&IndexBuffer> {
        self.solid.as_ref()
    }

    pub fn transparent_indices(&self) -> Option<&IndexBuffer> {
        self.transparent.as_ref()
    }

    pub fn animated_indices(&self) -> Option<&IndexBuffer> {
        self.animated.as_ref()
    }

    /// Upload an aggregated column mesh. Buffers are reused in place when
    /// the new data fits; replaced buffers are retired against `frame`.
    /// An empty mesh releases everything.
    pub fn apply_mesh(&mut self, pool: &BufferPool, mesh: &ChunkMesh, frame: u64) {
        if mesh.is_empty() {
            self.release(pool, frame);
            return;
        }

        self.vertices = Some(pool.upload_vertices(self.vertices.take(), &mesh.vertices, frame));
        self.solid = Self::apply_indices(pool, self.solid.take(), &mesh.solid_indices, frame);
        self.transparent =
            Self::apply_indices(pool, self.transparent.take(), &mesh.transparent_indices, frame);
        self.animated =
            Self::apply_indices(pool, self.animated.take(), &mesh.animated_indices, frame);
    }

    fn apply_indices(
        pool: &BufferPool,
        existing: Option<IndexBuffer>,
        data: &[u32],
        frame: u64,
    ) -> Option<IndexBuffer> {
        if data.is_empty() {
            if let Some(old) = existing {
                pool.retire_indices(old, frame);
            }
            return None;
        }
        Some(pool.upload_indices(existing, data, frame))
    }

    /// Retire every buffer this column owns.
    pub fn release(&mut self, pool: &BufferPool, frame: u64) {
        if let Some(v) = self.vertices.take() {
            pool.retire_vertices(v, frame);
        }
        for buf in [
            self.solid.take(),
            self.transparent.take(),
            self.animated.take(),
        ]
        .into_iter()
        .flatten()
        {
            pool.retire_indices(buf, frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_mesh::Vertex;

    fn mesh(verts: usize, solid: usize, transparent: usize) -> ChunkMesh {
        ChunkMesh {
            vertices: vec![Vertex::default(); verts],
            solid_indices: (0..solid as u32).collect(),
            transparent_indices: (0..transparent as u32).collect(),
            animated_indices: Vec::new(),
        }
    }

    #[test]
    fn apply_then_shrink_keeps_buffers() {
        let pool = BufferPool::new();
        let mut data = ChunkData::new(ChunkCoordinates::new(1, 2));
        data.apply_mesh(&pool, &mesh(16, 12, 6), 0);
        assert!(!data.is_empty());
        let vid = data.vertex_buffer().unwrap().id();

        data.apply_mesh(&pool, &mesh(8, 6, 6), 1);
        assert_eq!(data.vertex_buffer().unwrap().id(), vid);
        assert_eq!(data.solid_indices().unwrap().len(), 6);
    }

    #[test]
    fn empty_mesh_releases_everything() {
        let pool = BufferPool::new();
        let mut data = ChunkData::new(ChunkCoordinates::new(0, 0));
        data.apply_mesh(&pool, &mesh(16, 12, 0), 0);
        assert_eq!(pool.stats().live_buffers, 2);

        data.apply_mesh(&pool, &ChunkMesh::default(), 1);
        assert!(data.is_empty());
        assert!(data.vertex_buffer().is_none());
        assert_eq!(pool.stats().pending_disposal, 2);
        pool.reclaim(1);
        assert_eq!(pool.stats().live_buffers, 0);
    }

    #[test]
    fn pass_dropping_to_zero_retires_its_buffer() {
        let pool = BufferPool::new();
        let mut data = ChunkData::new(ChunkCoordinates::new(0, 0));
        data.apply_mesh(&pool, &mesh(16, 12, 6), 0);
        assert!(data.transparent_indices().is_some());

        data.apply_mesh(&pool, &mesh(16, 12, 0), 1);
        assert!(data.transparent_indices().is_none());
        assert_eq!(pool.stats().pending_disposal, 1);
    }
}
