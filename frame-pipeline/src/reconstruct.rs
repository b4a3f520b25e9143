/// Camera-space reconstruction: pinhole unprojection and normal re-basing.
use crate::buffer::{DepthBuffer, VectorBuffer};
use crate::camera::{Camera, Intrinsics};
use constants::render_settings::ROTATION_EPSILON;
use glam::{DMat3, DVec3, Mat3, Vec3};

/// Unproject pixel column `u`, row `v` at depth `z` into camera space.
/// `x = (u - cx) * z / fx`, `y = (v - cy) * z / fy`.
pub fn unproject_pixel(u: usize, v: usize, z: f32, intrinsics: &Intrinsics) -> [f32; 3] {
    let depth = z as f64;
    let x = (u as f64 - intrinsics.cx) * depth / intrinsics.fx;
    let y = (v as f64 - intrinsics.cy) * depth / intrinsics.fy;
    [x as f32, y as f32, z]
}

/// Unproject every pixel of a depth buffer.
/// Non-finite or non-positive depths are unprojected as-is; callers decide
/// which points are valid.
pub fn unproject(depth: &DepthBuffer, intrinsics: &Intrinsics) -> VectorBuffer {
    depth.map_pixels(|u, v, z| unproject_pixel(u, v, z, intrinsics))
}

/// Skew-symmetric cross-product matrix of `axis`.
fn cross_product_matrix(axis: DVec3) -> DMat3 {
    // Column-major: [[0, -z, y], [z, 0, -x], [-y, x, 0]] as rows.
    DMat3::from_cols(
        DVec3::new(0.0, axis.z, -axis.y),
        DVec3::new(-axis.z, 0.0, axis.x),
        DVec3::new(axis.y, -axis.x, 0.0),
    )
}

/// Rotation matrix of an axis-angle vector via Rodrigues' formula,
/// `R = I + sin θ·K + (1 − cos θ)·K²`.
/// Angles below `ROTATION_EPSILON` give the identity.
pub fn rotation_matrix(axis_angle: [f64; 3]) -> DMat3 {
    let rotation = DVec3::from_array(axis_angle);
    let angle = rotation.length();
    if angle < ROTATION_EPSILON {
        return DMat3::IDENTITY;
    }

    let k = cross_product_matrix(rotation / angle);
    DMat3::IDENTITY + k * angle.sin() + (k * k) * (1.0 - angle.cos())
}

/// Rotate world-space normals into the camera frame of `camera`.
/// Applies `Rᵀ · n` to the flattened (N, 3) buffer; the transpose is the
/// inverse of an orthogonal rotation.
pub fn world_to_camera_normals(normals: &VectorBuffer, camera: &Camera) -> VectorBuffer {
    let rotation = rotation_matrix(camera.rotation());
    if rotation == DMat3::IDENTITY {
        return normals.clone();
    }

    let inverse: Mat3 = rotation.transpose().as_mat3();
    normals.map(|normal| (inverse * Vec3::from_array(normal)).to_array())
}
