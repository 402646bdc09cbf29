use lodestone_chunk::SECTION_VOLUME;
use lodestone_geom::Vec3;

/// One mesh vertex. All blocks in a section share a single vertex buffer;
/// the three index streams select out of it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: [f32; 2],
    pub color: [u8; 4],
}

/// CPU mesh for one section: one vertex buffer, three index streams split
/// by render pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<Vertex>,
    pub solid_indices: Vec<u32>,
    pub transparent_indices: Vec<u32>,
    pub animated_indices: Vec<u32>,
}

impl ChunkMesh {
    #[inline]
    pub fn indices(&self, transparent: bool, animated: bool) -> &[u32] {
        if animated {
            &self.animated_indices
        } else if transparent {
            &self.transparent_indices
        } else {
            &self.solid_indices
        }
    }

    #[inline]
    pub fn indices_mut(&mut self, transparent: bool, animated: bool) -> &mut Vec<u32> {
        if animated {
            &mut self.animated_indices
        } else if transparent {
            &mut self.transparent_indices
        } else {
            &mut self.solid_indices
        }
    }

    pub fn index_count(&self) -> usize {
        self.solid_indices.len() + self.transparent_indices.len() + self.animated_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.index_count() == 0
    }

    /// Concatenate another mesh, rebasing its indices onto this mesh's
    /// vertex buffer. Used to aggregate section meshes into one column
    /// upload.
    pub fn append(&mut self, other: &ChunkMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.solid_indices
            .extend(other.solid_indices.iter().map(|&i| base + i));
        self.transparent_indices
            .extend(other.transparent_indices.iter().map(|&i| base + i));
        self.animated_indices
            .extend(other.animated_indices.iter().map(|&i| base + i));
    }
}

/// Where one (voxel, storage layer)'s geometry lives inside the mesh:
/// which index stream, and the contiguous index run within it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EntryPosition {
    pub transparent: bool,
    pub animated: bool,
    /// Start offset into the selected index stream.
    pub index: u32,
    /// Number of indices in the run.
    pub length: u32,
    pub storage: u16,
}

impl EntryPosition {
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.length
    }
}

/// Flat (voxel, storage layer) -> index-run table for one section.
#[derive(Clone, Debug)]
pub struct MeshIndexCache {
    layers: usize,
    entries: Vec<Option<EntryPosition>>,
}

impl MeshIndexCache {
    pub fn new(layers: usize) -> Self {
        let layers = layers.max(1);
        Self {
            layers,
            entries: vec![None; SECTION_VOLUME * layers],
        }
    }

    #[inline]
    pub fn layers(&self) -> usize {
        self.layers
    }

    #[inline]
    pub fn get(&self, voxel: usize, storage: usize) -> Option<EntryPosition> {
        if storage >= self.layers {
            return None;
        }
        self.entries[voxel * self.layers + storage]
    }

    #[inline]
    pub fn set(&mut self, voxel: usize, storage: usize, entry: EntryPosition) {
        if storage < self.layers {
            self.entries[voxel * self.layers + storage] = Some(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.is_none())
    }
}

/// Per-section build artifacts kept between rebuilds. Both are `None`
/// before the first build, which forces the full generator path.
#[derive(Clone, Debug, Default)]
pub struct SectionCache {
    pub mesh: Option<ChunkMesh>,
    pub positions: Option<MeshIndexCache>,
}

impl SectionCache {
    /// Drop cached artifacts so the next build regenerates every voxel.
    pub fn invalidate(&mut self) {
        self.mesh = None;
        self.positions = None;
    }
}
