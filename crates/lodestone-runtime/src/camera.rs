use lodestone_geom::{Aabb, Vec3};

/// Camera state the driver loop samples every tick: world position for
/// distance ordering and the frustum test for visibility culling. The
/// render layer owns the projection math; the pipeline only asks
/// questions.
pub trait CameraView: Send + Sync {
    fn position(&self) -> Vec3;

    /// Whether any part of `bounds` is inside the view frustum.
    fn in_frustum(&self, bounds: Aabb) -> bool;
}

/// Camera with no frustum culling. Useful for headless operation and as
/// a starting point before the renderer wires in real planes.
#[derive(Debug, Default)]
pub struct OmniCamera {
    pub position: Vec3,
}

impl CameraView for OmniCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn in_frustum(&self, _bounds: Aabb) -> bool {
        true
    }
}
