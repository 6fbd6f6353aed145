//! Fixed perspective camera
//!
//! The camera never moves during a session — only particles and the
//! background animate. Stereo rendering derives two offset copies per
//! frame instead of mutating the original.

use kotodama_core::Vec3;

/// A fixed-position perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 15.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get camera position as an array for GPU upload
    pub fn position_array(&self) -> [f32; 3] {
        self.position.to_array()
    }

    /// A copy of this camera shifted horizontally by `offset` world units,
    /// viewing direction unchanged (parallel stereo eyes).
    pub fn offset_eye(&self, offset: f32) -> Camera {
        let mut eye = self.clone();
        eye.position.x += offset;
        eye.target.x += offset;
        eye
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> [[f32; 4]; 4] {
        let f = (self.target - self.position).normalized();
        let s = f.cross(&self.up).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the projection matrix (4x4, column-major)
    pub fn projection_matrix(&self) -> [[f32; 4]; 4] {
        let fov_rad = self.fov.to_radians();
        let f = 1.0 / (fov_rad / 2.0).tan();
        let depth = self.far - self.near;

        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, -(self.far + self.near) / depth, -1.0],
            [0.0, 0.0, -(2.0 * self.far * self.near) / depth, 0.0],
        ]
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> [[f32; 4]; 4] {
        mat4_mul(&self.projection_matrix(), &self.view_matrix())
    }
}

pub(crate) fn mat4_mul(a: &[[f32; 4]; 4], b: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::new();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 15.0));
        let view = camera.view_matrix();
        // Forward maps -z: the basis is orthonormal, translation row carries
        // the eye distance
        assert!((view[3][2] - (-15.0)).abs() < 1e-4);
    }

    #[test]
    fn view_projection_is_deterministic() {
        // Two renders of a static scene must agree: same camera, same matrix
        let camera = Camera::new();
        assert_eq!(
            camera.view_projection_matrix(),
            camera.view_projection_matrix()
        );
    }

    #[test]
    fn eye_offset_shifts_only_x() {
        let camera = Camera::new();
        let left = camera.offset_eye(-0.032);
        let right = camera.offset_eye(0.032);
        assert!((right.position.x - left.position.x - 0.064).abs() < 1e-6);
        assert_eq!(left.position.y, camera.position.y);
        assert_eq!(left.position.z, camera.position.z);
        // Viewing direction stays parallel
        assert_eq!(left.target.x - left.position.x, camera.target.x - camera.position.x);
    }

    #[test]
    fn identity_multiplication() {
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = Camera::new().view_matrix();
        assert_eq!(mat4_mul(&identity, &m), m);
    }
}
