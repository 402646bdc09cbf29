//! Block value types, the injected block registry, and multi-part rules.
#![forbid(unsafe_code)]

pub mod config;
pub mod multipart;
pub mod registry;
pub mod types;

pub use multipart::{
    ModelFragmentId, MultiPartCase, MultiPartDef, MultiPartRule, NeighborQuery, NeighborTest,
};
pub use registry::BlockRegistry;
pub use types::{Block, BlockId, BlockStateBits, BlockType, Direction};
