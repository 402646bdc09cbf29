use lodestone_blocks::{Block, BlockRegistry, BlockType};
use lodestone_chunk::{ChunkColumn, ChunkCoordinates, ChunkSection, SECTION_DIM, StorageError};

fn ty(name: &str, solid: bool, transparent: bool) -> BlockType {
    BlockType {
        id: 0,
        name: name.to_string(),
        transparent,
        solid,
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
    reg.register(ty("stone", true, false));
    reg.register(ty("leaves", false, true));
    reg.register(BlockType {
        light_value: 14,
        ..ty("torch", false, true)
    });
    reg
}

fn stone() -> Block {
    Block { id: 1, state: 0 }
}

#[test]
fn set_updates_flags_and_counts() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 1);

    // Non-transparent, non-solid custom block at the origin of an all-air
    // section: the end-to-end contract for a single edit.
    let mut reg2 = reg.clone();
    let custom = reg2.register(ty("custom", false, false));
    let custom = Block {
        id: custom,
        state: 0,
    };
    s.set(0, 0, 0, 0, custom, &reg2).unwrap();

    assert_eq!(s.block_ref_count(), 1);
    assert!(!s.is_transparent(0, 0, 0));
    assert!(!s.is_solid(0, 0, 0));
    assert!(s.is_scheduled(0, 0, 0));
    assert_eq!(s.scheduled_updates_count(), 1);
    assert!(s.is_dirty());
    assert!(s.has_air_pockets());
}

#[test]
fn set_air_over_block_restores_counts() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 1);
    s.set(0, 3, 4, 5, stone(), &reg).unwrap();
    assert_eq!(s.block_ref_count(), 1);
    assert!(s.is_solid(3, 4, 5));

    s.set(0, 3, 4, 5, Block::AIR, &reg).unwrap();
    assert_eq!(s.block_ref_count(), 0);
    assert!(s.is_empty());
    assert!(s.is_transparent(3, 4, 5));
    assert!(!s.is_solid(3, 4, 5));
}

#[test]
fn light_emitting_block_tracks_sources_and_schedules() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 1);
    let torch = Block { id: 3, state: 0 };

    let outcome = s.set(0, 1, 2, 3, torch, &reg).unwrap();
    assert!(outcome.block_light_changed);
    assert_eq!(s.get_blocklight(1, 2, 3), 14);
    assert!(s.is_blocklight_scheduled(1, 2, 3));
    assert_eq!(s.light_sources().collect::<Vec<_>>(), vec![(1, 2, 3)]);

    // Replacing with stone removes the source.
    s.set(0, 1, 2, 3, stone(), &reg).unwrap();
    assert_eq!(s.light_sources().count(), 0);
}

#[test]
fn unregistered_id_is_discarded() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 1);
    s.set(0, 0, 0, 0, stone(), &reg).unwrap();
    s.set(0, 0, 0, 0, Block { id: 999, state: 0 }, &reg).unwrap();
    // Prior state intact, counters unharmed.
    assert_eq!(s.get(0, 0, 0), stone());
    assert_eq!(s.block_ref_count(), 1);
}

#[test]
fn invalid_storage_layer_errors() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 2);
    assert!(s.set(1, 0, 0, 0, stone(), &reg).is_ok());
    assert_eq!(
        s.set(2, 0, 0, 0, stone(), &reg),
        Err(StorageError::InvalidStorage {
            storage: 2,
            layers: 2
        })
    );
    assert!(matches!(
        s.get_layer(0, 0, 0, 5),
        Err(StorageError::InvalidStorage { .. })
    ));
}

#[test]
fn overlay_layer_does_not_touch_primary_bookkeeping() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 2);
    s.set(1, 2, 2, 2, stone(), &reg).unwrap();
    assert_eq!(s.block_ref_count(), 0);
    assert!(s.is_scheduled(2, 2, 2));
    let layers: Vec<_> = s.get_all(2, 2, 2).collect();
    assert_eq!(layers, vec![(Block::AIR, 0), (stone(), 1)]);
}

#[test]
fn light_setters_noop_on_unchanged_value() {
    let mut s = ChunkSection::new(0, 1);
    assert!(!s.set_skylight(0, 0, 0, 15)); // starts at full sky
    assert!(s.set_skylight(0, 0, 0, 3));
    assert!(s.is_skylight_scheduled(0, 0, 0));
    assert!(!s.set_blocklight(0, 0, 0, 0));
    assert!(s.set_blocklight(0, 0, 0, 9));
}

#[test]
fn border_scan_full_solid_section() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 1);
    for x in 0..SECTION_DIM {
        for y in 0..SECTION_DIM {
            for z in 0..SECTION_DIM {
                s.set(0, x, y, z, stone(), &reg).unwrap();
            }
        }
    }
    // Writes pessimistically keep air pockets set until the rescan.
    s.check_for_solid_border();
    assert!(s.solid_border());
    assert!(!s.has_air_pockets());
    for face in 0..6 {
        assert!(s.is_face_solid(face));
    }

    // One non-solid interior voxel flips air pockets, not the border.
    s.set(0, 7, 7, 7, Block { id: 2, state: 0 }, &reg).unwrap();
    assert!(s.has_air_pockets());
    s.check_for_solid_border();
    assert!(s.solid_border());
    assert!(s.has_air_pockets());
}

#[test]
fn border_scan_face_solidity_is_per_face() {
    let reg = registry();
    let mut s = ChunkSection::new(0, 1);
    for x in 0..SECTION_DIM {
        for y in 0..SECTION_DIM {
            for z in 0..SECTION_DIM {
                s.set(0, x, y, z, stone(), &reg).unwrap();
            }
        }
    }
    // Hole in the z=0 (north) face.
    s.set(0, 8, 8, 0, Block::AIR, &reg).unwrap();
    s.check_for_solid_border();
    assert!(!s.solid_border());
    assert!(!s.is_face_solid(2)); // north
    assert!(s.is_face_solid(3)); // south
    assert!(s.is_face_solid(0) && s.is_face_solid(1));
}

#[test]
fn remove_invalid_blocks_recounts() {
    let reg = registry();
    let mut col = ChunkColumn::new(ChunkCoordinates::new(0, 0), 1);
    col.set_block_state(0, 0, 0, stone(), 0, &reg).unwrap();
    col.set_block_state(1, 17, 1, stone(), 0, &reg).unwrap();

    col.remove_invalid_blocks(&reg);
    assert_eq!(col.section(0).unwrap().block_ref_count(), 1);
    assert_eq!(col.section(1).unwrap().block_ref_count(), 1);
    assert_eq!(col.highest_nonempty_section(), Some(1));
}

#[test]
fn column_light_dirty_flags() {
    let reg = registry();
    let mut col = ChunkColumn::new(ChunkCoordinates::new(2, -3), 1);
    assert!(!col.sky_light_dirty);
    assert!(col.set_skylight(0, 40, 0, 1));
    assert!(col.sky_light_dirty);

    assert!(!col.block_light_dirty);
    let torch = Block { id: 3, state: 0 };
    col.set_block_state(5, 100, 5, torch, 0, &reg).unwrap();
    assert!(col.block_light_dirty);
}

#[test]
fn new_section_is_dirty_until_built() {
    let s = ChunkSection::new(0, 1);
    assert!(s.is_new());
    assert!(s.is_dirty());
    let mut s = s;
    s.clear_new();
    assert!(!s.is_dirty());
}
