//! CPU-side section meshing: vertex/index stream types, the per-voxel
//! index-run cache that lets unchanged voxels skip the block-model
//! generator, and the incremental section builder.
#![forbid(unsafe_code)]

mod builder;
mod types;

pub use builder::{build_section_mesh, has_scheduled_neighbors};
pub use types::{ChunkMesh, EntryPosition, MeshIndexCache, SectionCache, Vertex};

use lodestone_blocks::Block;
use lodestone_chunk::{BlockAccess, BlockCoordinates};

/// Geometry emitted by a block model for a single voxel layer. Indices are
/// local to `vertices`; the builder rebases them into the shared streams.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ModelData {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

/// Source of per-block geometry. Implementations hold the resource-pack
/// model tables; the builder only ever asks for one voxel at a time.
pub trait BlockModelProvider {
    /// World-space geometry for `block` at `pos`. Empty output means the
    /// block contributes nothing (fully occluded, air, unknown model).
    fn vertices(&self, world: &dyn BlockAccess, pos: BlockCoordinates, block: Block) -> ModelData;

    /// Geometry restricted to the multi-part fragments selected by the
    /// rule evaluation. Defaults to the full model.
    fn multipart_vertices(
        &self,
        world: &dyn BlockAccess,
        pos: BlockCoordinates,
        block: Block,
        fragments: &[lodestone_blocks::ModelFragmentId],
    ) -> ModelData {
        let _ = fragments;
        self.vertices(world, pos, block)
    }

    /// Re-resolve a context-sensitive block against its surroundings
    /// (fences, walls). The returned state is persisted back into the
    /// section when it differs.
    fn block_placed(
        &self,
        world: &dyn BlockAccess,
        pos: BlockCoordinates,
        block: Block,
    ) -> Block {
        let _ = (world, pos);
        block
    }
}
