//! Chunk pipeline runtime: the scheduling queues, driver loop, worker
//! pool, and the column handles that tie voxel storage to mesh caches
//! and GPU uploads.
#![forbid(unsafe_code)]

mod camera;
mod cancel;
mod config;
mod handle;
mod manager;
mod view;

pub use camera::{CameraView, OmniCamera};
pub use cancel::CancelToken;
pub use config::{ConfigError, VideoOptions};
pub use handle::{ColumnHandle, ColumnState};
pub use manager::{ChunkManager, ManagerStats};
