use lodestone_blocks::Block;

/// World accessor consumed by the mesh builder and occlusion culling for
/// cross-chunk neighbor queries. Implementations answer air/defaults for
/// unloaded positions.
pub trait BlockAccess {
    /// Primary-layer state at a world position.
    fn get_block_state(&self, x: i32, y: i32, z: i32) -> Block;

    /// All storage layers at a world position, innermost first.
    fn get_block_states(&self, x: i32, y: i32, z: i32) -> Vec<(Block, usize)> {
        vec![(self.get_block_state(x, y, z), 0)]
    }

    fn is_transparent(&self, x: i32, y: i32, z: i32) -> bool;

    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool;

    /// Whether the voxel is flagged for geometry recomputation.
    fn is_scheduled(&self, x: i32, y: i32, z: i32) -> bool;

    fn get_skylight(&self, x: i32, y: i32, z: i32) -> u8;

    fn get_blocklight(&self, x: i32, y: i32, z: i32) -> u8;
}
