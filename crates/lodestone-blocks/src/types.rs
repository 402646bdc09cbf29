use crate::multipart::MultiPartDef;

pub type BlockId = u16;
/// Property-variant bits carried alongside the block id.
pub type BlockStateBits = u16;

/// Compact block-state value stored per voxel. Flags live in the registry.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Block {
    pub id: BlockId,
    pub state: BlockStateBits,
}

impl Block {
    pub const AIR: Block = Block { id: 0, state: 0 };

    #[inline]
    pub fn is_air(self) -> bool {
        self.id == Block::AIR.id
    }
}

/// Axis direction used by neighbor predicates and face tables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Up = 0,
    Down = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset in world coordinates (x, y, z).
    #[inline]
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }
}

/// Registry entry describing one block type's render-facing flags.
#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub transparent: bool,
    pub solid: bool,
    pub renderable: bool,
    pub animated: bool,
    /// Emitted light level, 0..=15. Non-zero makes the voxel a light source.
    pub light_value: u8,
    pub random_ticked: bool,
    /// True when placement must be re-resolved against world context at
    /// mesh-build time (fences, walls, ...).
    pub requires_update: bool,
    pub multipart: Option<MultiPartDef>,
}

impl BlockType {
    #[inline]
    pub fn is_multipart(&self) -> bool {
        self.multipart.is_some()
    }
}
