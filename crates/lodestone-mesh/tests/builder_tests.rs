use std::cell::{Cell, RefCell};

use lodestone_blocks::{
    Block, BlockRegistry, BlockType, Direction, ModelFragmentId, MultiPartCase, MultiPartDef,
    MultiPartRule, NeighborTest,
};
use lodestone_chunk::{
    BlockAccess, BlockCoordinates, ChunkCoordinates, ChunkSection, ScheduleType,
};
use lodestone_geom::Vec3;
use lodestone_mesh::{
    BlockModelProvider, ModelData, SectionCache, Vertex, build_section_mesh,
};

/// World stub: every position reads as buried solid rock so neighbor
/// probes never force a rebuild on their own.
struct SolidWorld;

impl BlockAccess for SolidWorld {
    fn get_block_state(&self, _x: i32, _y: i32, _z: i32) -> Block {
        Block { id: 1, state: 0 }
    }
    fn is_transparent(&self, _x: i32, _y: i32, _z: i32) -> bool {
        false
    }
    fn is_solid(&self, _x: i32, _y: i32, _z: i32) -> bool {
        true
    }
    fn is_scheduled(&self, _x: i32, _y: i32, _z: i32) -> bool {
        false
    }
    fn get_skylight(&self, _x: i32, _y: i32, _z: i32) -> u8 {
        15
    }
    fn get_blocklight(&self, _x: i32, _y: i32, _z: i32) -> u8 {
        0
    }
}

/// World stub that is solid only below z = 0, for neighbor-rule tests.
struct NorthSolidWorld;

impl BlockAccess for NorthSolidWorld {
    fn get_block_state(&self, _x: i32, _y: i32, z: i32) -> Block {
        if z < 0 { Block { id: 1, state: 0 } } else { Block::AIR }
    }
    fn is_transparent(&self, _x: i32, _y: i32, _z: i32) -> bool {
        false
    }
    fn is_solid(&self, _x: i32, _y: i32, z: i32) -> bool {
        z < 0
    }
    fn is_scheduled(&self, _x: i32, _y: i32, _z: i32) -> bool {
        false
    }
    fn get_skylight(&self, _x: i32, _y: i32, _z: i32) -> u8 {
        15
    }
    fn get_blocklight(&self, _x: i32, _y: i32, _z: i32) -> u8 {
        0
    }
}

/// Emits one quad per non-air block and counts generator invocations.
#[derive(Default)]
struct CountingProvider {
    calls: Cell<usize>,
    last_fragments: RefCell<Vec<ModelFragmentId>>,
    /// Ids whose model produces no geometry.
    empty_ids: Vec<u16>,
    /// (from, to) rewrites applied by block_placed.
    placements: Vec<(Block, Block)>,
}

impl BlockModelProvider for CountingProvider {
    fn vertices(&self, _world: &dyn BlockAccess, pos: BlockCoordinates, block: Block) -> ModelData {
        if block.is_air() {
            return ModelData::default();
        }
        self.calls.set(self.calls.get() + 1);
        if self.empty_ids.contains(&block.id) {
            return ModelData::default();
        }
        let p = Vec3::new(pos.x as f32, pos.y as f32, pos.z as f32);
        let v = |dx: f32, dz: f32| Vertex {
            position: p + Vec3::new(dx, 1.0, dz),
            normal: Vec3::UP,
            texcoord: [dx, dz],
            color: [255, 255, 255, 255],
        };
        ModelData {
            vertices: vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    fn multipart_vertices(
        &self,
        world: &dyn BlockAccess,
        pos: BlockCoordinates,
        block: Block,
        fragments: &[ModelFragmentId],
    ) -> ModelData {
        *self.last_fragments.borrow_mut() = fragments.to_vec();
        self.vertices(world, pos, block)
    }

    fn block_placed(
        &self,
        _world: &dyn BlockAccess,
        _pos: BlockCoordinates,
        block: Block,
    ) -> Block {
        for &(from, to) in &self.placements {
            if from == block {
                return to;
            }
        }
        block
    }
}

fn base_type(name: &str) -> BlockType {
    BlockType {
        id: 0,
        name: name.to_string(),
        transparent: false,
        solid: true,
        renderable: true,
        animated: false,
        light_value: 0,
        random_ticked: false,
        requires_update: false,
        multipart: None,
    }
}

fn registry() -> BlockRegistry {
    let mut reg = BlockRegistry::new();
    reg.register(base_type("stone"));
    reg.register(BlockType {
        transparent: true,
        solid: false,
        ..base_type("glass")
    });
    reg.register(BlockType {
        animated: true,
        ..base_type("lava")
    });
    reg
}

fn stone() -> Block {
    Block { id: 1, state: 0 }
}

#[test]
fn first_build_generates_everything_and_clears_state() {
    let reg = registry();
    let mut section = ChunkSection::new(0, 1);
    section.set(0, 2, 3, 4, stone(), &reg).unwrap();
    section.set(0, 9, 9, 9, stone(), &reg).unwrap();

    let provider = CountingProvider::default();
    let mut cache = SectionCache::default();
    let mesh = build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::FULL,
        ChunkCoordinates::new(0, 0),
        0,
    );

    assert_eq!(provider.calls.get(), 2);
    assert_eq!(mesh.vertices.len(), 8);
    assert_eq!(mesh.solid_indices.len(), 12);
    assert!(mesh.transparent_indices.is_empty());

    assert!(!section.is_new());
    assert!(!section.is_scheduled(2, 3, 4));
    assert!(!section.is_scheduled(9, 9, 9));
    assert!(section.is_rendered(2, 3, 4));
    assert!(!section.is_rendered(0, 0, 0));
    assert_eq!(cache.positions.as_ref().unwrap().len(), 2);
}

#[test]
fn second_build_reuses_cached_runs_byte_for_byte() {
    let reg = registry();
    let mut section = ChunkSection::new(0, 1);
    section.set(0, 2, 3, 4, stone(), &reg).unwrap();
    section.set(0, 9, 9, 9, stone(), &reg).unwrap();

    let provider = CountingProvider::default();
    let mut cache = SectionCache::default();
    let first = build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::FULL,
        ChunkCoordinates::new(0, 0),
        0,
    )
    .clone();
    assert_eq!(provider.calls.get(), 2);

    // Nothing scheduled, nothing forced: every voxel takes the reuse path.
    let second = build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::empty(),
        ChunkCoordinates::new(0, 0),
        0,
    );
    assert_eq!(provider.calls.get(), 2, "generator must not run again");
    assert_eq!(*second, first);
}

#[test]
fn scheduled_voxel_regenerates_and_unscheduled_reuse() {
    let reg = registry();
    let mut section = ChunkSection::new(0, 1);
    section.set(0, 2, 3, 4, stone(), &reg).unwrap();
    section.set(0, 9, 9, 9, stone(), &reg).unwrap();

    let provider = CountingProvider::default();
    let mut cache = SectionCache::default();
    build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::FULL,
        ChunkCoordinates::new(0, 0),
        0,
    );

    // Edit one voxel; only that voxel should hit the generator.
    section.set(0, 9, 9, 9, Block { id: 3, state: 0 }, &reg).unwrap();
    provider.calls.set(0);
    let mesh = build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::SCHEDULED,
        ChunkCoordinates::new(0, 0),
        0,
    );
    assert_eq!(provider.calls.get(), 1);
    assert_eq!(mesh.animated_indices.len(), 6);
    assert_eq!(mesh.solid_indices.len(), 6);
    assert!(!section.is_scheduled(9, 9, 9));
}

#[test]
fn border_pass_regenerates_perimeter_only() {
    let reg = registry();
    let mut section = ChunkSection::new(0, 1);
    section.set(0, 0, 5, 3, stone(), &reg).unwrap(); // x = 0 perimeter
    section.set(0, 8, 5, 8, stone(), &reg).unwrap(); // interior

    let provider = CountingProvider::default();
    let mut cache = SectionCache::default();
    build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::FULL,
        ChunkCoordinates::new(0, 0),
        0,
    );

    provider.calls.set(0);
    build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::BORDER | ScheduleType::LIGHTING,
        ChunkCoordinates::new(0, 0),
        0,
    );
    assert_eq!(provider.calls.get(), 1);
}

#[test]
fn empty_model_still_clears_scheduled_bit() {
    let reg = registry();
    let mut section = ChunkSection::new(0, 1);
    section.set(0, 4, 4, 4, stone(), &reg).unwrap();

    let provider = CountingProvider {
        empty_ids: vec![1],
        ..CountingProvider::default()
    };
    let mut cache = SectionCache::default();
    let mesh = build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::FULL,
        ChunkCoordinates::new(0, 0),
        0,
    );
    assert!(mesh.is_empty());
    assert!(!section.is_scheduled(4, 4, 4));
    assert!(!section.is_rendered(4, 4, 4));
}

#[test]
fn context_sensitive_block_is_resolved_and_persisted() {
    let mut reg = registry();
    let fence = reg.register(BlockType {
        requires_update: true,
        ..base_type("fence")
    });
    let from = Block { id: fence, state: 0 };
    let to = Block { id: fence, state: 5 };

    let mut section = ChunkSection::new(0, 1);
    section.set(0, 6, 0, 6, from, &reg).unwrap();

    let provider = CountingProvider {
        placements: vec![(from, to)],
        ..CountingProvider::default()
    };
    let mut cache = SectionCache::default();
    build_section_mesh(
        &SolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::FULL,
        ChunkCoordinates::new(0, 0),
        0,
    );
    assert_eq!(section.get(6, 0, 6), to);
}

#[test]
fn multipart_rules_select_fragments_from_world_context() {
    let mut reg = registry();
    let wall = reg.register(BlockType {
        multipart: Some(MultiPartDef {
            cases: vec![
                MultiPartCase {
                    when: None,
                    apply: vec![0],
                },
                MultiPartCase {
                    when: Some(MultiPartRule::Neighbor {
                        dir: Direction::North,
                        test: NeighborTest::Solid,
                    }),
                    apply: vec![1],
                },
                MultiPartCase {
                    when: Some(MultiPartRule::Neighbor {
                        dir: Direction::South,
                        test: NeighborTest::Solid,
                    }),
                    apply: vec![2],
                },
            ],
        }),
        ..base_type("wall")
    });

    let mut section = ChunkSection::new(0, 1);
    section
        .set(0, 3, 0, 0, Block { id: wall, state: 0 }, &reg)
        .unwrap();

    // The wall sits at z = 0, so only its north neighbor (z = -1) is solid.
    let provider = CountingProvider::default();
    let mut cache = SectionCache::default();
    build_section_mesh(
        &NorthSolidWorld,
        &reg,
        &provider,
        &mut section,
        &mut cache,
        ScheduleType::FULL,
        ChunkCoordinates::new(0, 0),
        0,
    );
    assert_eq!(*provider.last_fragments.borrow(), vec![0, 1]);
}
