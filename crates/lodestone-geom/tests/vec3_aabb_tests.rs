use lodestone_geom::{Aabb, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_add_sub_roundtrip() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c - b, a, 1e-6));
}

#[test]
fn vec3_dot_length_normalized() {
    let v = Vec3::new(3.0, 4.0, 0.0);
    assert!(approx_eq(v.dot(v), 25.0, 1e-6));
    assert!(approx_eq(v.length(), 5.0, 1e-6));
    assert!(approx_eq(v.normalized().length(), 1.0, 1e-6));
    // Zero vector normalization stays zero, never NaN.
    assert!(vec3_approx_eq(Vec3::ZERO.normalized(), Vec3::ZERO, 1e-6));
}

#[test]
fn chunk_box_spans_footprint() {
    let bb = Aabb::chunk_box(32.0, -16.0, 16.0, 256.0, 16.0);
    assert!(vec3_approx_eq(bb.min, Vec3::new(32.0, 0.0, -16.0), 1e-6));
    assert!(vec3_approx_eq(bb.max, Vec3::new(48.0, 256.0, 0.0), 1e-6));
    assert!(bb.contains_point(Vec3::new(40.0, 128.0, -8.0)));
    assert!(!bb.contains_point(Vec3::new(40.0, 300.0, -8.0)));
}
