//! End-to-end pipeline scenario: a block edit flows through section
//! bookkeeping, scheduling, the mesh builder, and GPU publication.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lodestone::{
    Block, BlockAccess, BlockCoordinates, BlockModelProvider, BlockRegistry, BlockType,
    CameraView, ChunkColumn, ChunkCoordinates, ChunkManager, ModelData, OmniCamera,
    ScheduleType, Vec3, Vertex, VideoOptions,
};

struct CubeProvider {
    calls: AtomicUsize,
}

impl BlockModelProvider for CubeProvider {
    fn vertices(
        &self,
        _world: &dyn BlockAccess,
        pos: BlockCoordinates,
        block: Block,
    ) -> ModelData {
        if block.is_air() {
            return ModelData::default();
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let p = Vec3::new(pos.x as f32, pos.y as f32, pos.z as f32);
        ModelData {
            vertices: vec![
                Vertex {
                    position: p,
                    ..Vertex::default()
                },
                Vertex {
                    position: p + Vec3::new(1.0, 0.0, 0.0),
                    ..Vertex::default()
                },
                Vertex {
                    position: p + Vec3::new(1.0, 0.0, 1.0),
                    ..Vertex::default()
                },
            ],
            indices: vec![0, 1, 2],
        }
    }
}

#[test]
fn block_edit_reaches_the_renderer() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut reg = BlockRegistry::new();
    let custom = reg.register(BlockType {
        id: 0,
        name: "custom".to_string(),
        transparent: false,
        solid: false,
        renderable: true,
        animated: false,
        light_value: 0,
        random_ticked: false,
        requires_update: false,
        multipart: None,
    });
    let state = Block {
        id: custom,
        state: 0,
    };

    let provider = Arc::new(CubeProvider {
        calls: AtomicUsize::new(0),
    });
    let camera: Arc<dyn CameraView> = Arc::new(OmniCamera::default());
    let mgr = ChunkManager::new(
        Arc::new(reg),
        provider.clone(),
        camera,
        VideoOptions {
            render_distance: 4,
            chunk_threads: 1,
        },
    )
    .expect("worker pool");

    let coords = ChunkCoordinates::new(0, 0);
    mgr.add_chunk(ChunkColumn::new(coords, 1));
    assert!(mgr.set_block_state(0, 0, 0, state, 0).unwrap());

    // Section bookkeeping after the edit.
    {
        let handle = mgr.try_get_chunk(coords).unwrap();
        let st = handle.read();
        let section = st.column.section(0).unwrap();
        assert_eq!(section.block_ref_count(), 1);
        assert!(!section.is_transparent(0, 0, 0));
        assert!(!section.is_solid(0, 0, 0));
        assert!(section.is_scheduled(0, 0, 0));
        assert_eq!(section.scheduled_updates_count(), 1);
        assert!(section.is_dirty());
        assert_eq!(
            handle.scheduled(),
            ScheduleType::SCHEDULED | ScheduleType::LIGHTING
        );
    }

    // Build: the generator runs exactly once, for the edited voxel.
    assert!(mgr.update_chunk_now(coords));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    {
        let handle = mgr.try_get_chunk(coords).unwrap();
        assert!(handle.scheduled().is_unscheduled());
        let st = handle.read();
        assert!(!st.column.section(0).unwrap().is_scheduled(0, 0, 0));
        assert!(st.column.section(0).unwrap().is_rendered(0, 0, 0));
    }

    // Publish: one visible chunk with the triangle uploaded.
    mgr.driver_tick();
    let visible = mgr.visible_chunks();
    assert_eq!(visible.len(), 1);
    let data = visible[0].1.read().unwrap();
    assert_eq!(data.vertex_buffer().unwrap().len(), 3);
    assert_eq!(data.solid_indices().unwrap().len(), 3);
}
