//! Incremental section mesh builder.
//!
//! Every build walks all 4096 voxels, but a voxel whose geometry cannot
//! have changed is served from the previous mesh via its cached index run
//! instead of re-invoking the block-model generator. Rebuild triggers per
//! voxel, in order: whole-section force (new section or missing cache),
//! the voxel's own scheduled bit, a scheduled or transparent axis
//! neighbor, or the border pass touching perimeter columns.

use std::collections::HashMap;

use lodestone_blocks::{Block, BlockRegistry, Direction, NeighborQuery};
use lodestone_chunk::{
    BlockAccess, BlockCoordinates, ChunkCoordinates, ChunkSection, SECTION_DIM, ScheduleType,
    coordinate_index,
};

use crate::types::{ChunkMesh, EntryPosition, MeshIndexCache, SectionCache};
use crate::BlockModelProvider;

/// Neighbor context for multi-part rule evaluation at one position.
struct PositionQuery<'a> {
    world: &'a dyn BlockAccess,
    pos: BlockCoordinates,
}

impl NeighborQuery for PositionQuery<'_> {
    fn neighbor_block(&self, dir: Direction) -> Block {
        let p = self.pos + dir.offset();
        self.world.get_block_state(p.x, p.y, p.z)
    }

    fn neighbor_solid(&self, dir: Direction) -> bool {
        let p = self.pos + dir.offset();
        self.world.is_solid(p.x, p.y, p.z)
    }

    fn neighbor_transparent(&self, dir: Direction) -> bool {
        let p = self.pos + dir.offset();
        self.world.is_transparent(p.x, p.y, p.z)
    }
}

/// True when any of the six axis neighbors is scheduled or transparent.
/// A neighbor change can alter this voxel's visible faces even when the
/// voxel itself did not change.
pub fn has_scheduled_neighbors(world: &dyn BlockAccess, pos: BlockCoordinates) -> bool {
    Direction::ALL.iter().any(|d| {
        let p = pos + d.offset();
        world.is_scheduled(p.x, p.y, p.z) || world.is_transparent(p.x, p.y, p.z)
    })
}

/// Rebuild the mesh for one section, reusing cached index runs for voxels
/// the rebuild reason does not touch. The new mesh and index-run table
/// replace the ones in `cache`; the returned reference points at the
/// stored mesh.
///
/// `coords`/`section_index` place the section in world space; vertex
/// positions come back from the model provider already in world space.
pub fn build_section_mesh<'c>(
    world: &dyn BlockAccess,
    reg: &BlockRegistry,
    models: &dyn BlockModelProvider,
    section: &mut ChunkSection,
    cache: &'c mut SectionCache,
    schedule: ScheduleType,
    coords: ChunkCoordinates,
    section_index: usize,
) -> &'c ChunkMesh {
    let force = section.is_new() || cache.mesh.is_none() || cache.positions.is_none();
    let border_pass = schedule.is_border_only();

    let prev_mesh = cache.mesh.take();
    let prev_positions = cache.positions.take();

    let mut mesh = ChunkMesh::default();
    let mut positions = MeshIndexCache::new(section.storage_count());
    // Old vertex index -> new vertex index, shared across all reused runs
    // so a vertex referenced by several runs is copied once.
    let mut processed: HashMap<u32, u32> = HashMap::new();

    let base_x = coords.x * SECTION_DIM as i32;
    let base_y = (section_index * SECTION_DIM) as i32;
    let base_z = coords.z * SECTION_DIM as i32;

    for y in 0..SECTION_DIM {
        for x in 0..SECTION_DIM {
            for z in 0..SECTION_DIM {
                let idx = coordinate_index(x, y, z);
                let pos = BlockCoordinates::new(
                    base_x + x as i32,
                    base_y + y as i32,
                    base_z + z as i32,
                );

                let is_scheduled = section.is_scheduled(x, y, z);
                let is_border_block =
                    border_pass && (x == 0 || x == 15 || z == 0 || z == 15);
                let is_rebuild = force
                    || is_scheduled
                    || has_scheduled_neighbors(world, pos)
                    || is_border_block;

                let mut rendered = 0u32;
                let layers: Vec<(Block, usize)> = section.get_all(x, y, z).collect();

                for (state, storage) in layers {
                    let mut state = state;
                    let Some(mut ty) = reg.get_block(state) else {
                        continue;
                    };
                    if !ty.renderable && !force && !is_border_block {
                        continue;
                    }

                    if !is_rebuild {
                        if let (Some(pm), Some(pp)) =
                            (prev_mesh.as_ref(), prev_positions.as_ref())
                        {
                            if let Some(entry) = pp.get(idx, storage) {
                                let dst_start =
                                    mesh.indices(entry.transparent, entry.animated).len() as u32;
                                let src = pm.indices(entry.transparent, entry.animated);
                                for &old_v in &src[entry.index as usize..entry.end() as usize] {
                                    let new_v = match processed.get(&old_v) {
                                        Some(&v) => v,
                                        None => {
                                            let nv = mesh.vertices.len() as u32;
                                            mesh.vertices.push(pm.vertices[old_v as usize]);
                                            processed.insert(old_v, nv);
                                            nv
                                        }
                                    };
                                    mesh.indices_mut(entry.transparent, entry.animated)
                                        .push(new_v);
                                }
                                positions.set(
                                    idx,
                                    storage,
                                    EntryPosition {
                                        index: dst_start,
                                        ..entry
                                    },
                                );
                                rendered += 1;
                                continue;
                            }
                        }
                    }

                    // Generator path. Context-sensitive blocks first get
                    // re-resolved against their surroundings, and the
                    // resolved state is persisted.
                    if is_rebuild && ty.requires_update {
                        let placed = models.block_placed(world, pos, state);
                        if placed != state {
                            match section.set(storage, x, y, z, placed, reg) {
                                Ok(_) => {
                                    state = placed;
                                    let Some(placed_ty) = reg.get_block(state) else {
                                        continue;
                                    };
                                    ty = placed_ty;
                                }
                                Err(e) => {
                                    log::warn!(
                                        "failed to persist resolved block at {pos:?}: {e}"
                                    );
                                }
                            }
                        }
                    }

                    let data = match &ty.multipart {
                        Some(def) => {
                            let q = PositionQuery { world, pos };
                            let fragments = def.applicable_fragments(state, &q);
                            models.multipart_vertices(world, pos, state, &fragments)
                        }
                        None => models.vertices(world, pos, state),
                    };
                    if data.is_empty() {
                        continue;
                    }

                    let transparent = ty.transparent;
                    let animated = ty.animated;
                    let base_vertex = mesh.vertices.len() as u32;
                    mesh.vertices.extend_from_slice(&data.vertices);
                    let stream = mesh.indices_mut(transparent, animated);
                    let start = stream.len() as u32;
                    stream.extend(data.indices.iter().map(|&i| base_vertex + i));
                    positions.set(
                        idx,
                        storage,
                        EntryPosition {
                            transparent,
                            animated,
                            index: start,
                            length: data.indices.len() as u32,
                            storage: storage as u16,
                        },
                    );
                    rendered += 1;
                }

                section.set_rendered(x, y, z, rendered > 0);
                if is_scheduled {
                    section.set_scheduled(x, y, z, false);
                }
            }
        }
    }

    section.set_dirty(false);
    section.clear_new();
    cache.positions = Some(positions);
    cache.mesh.insert(mesh)
}
