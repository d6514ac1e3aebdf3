use nalgebra::{Matrix3, Rotation3};

use crate::foundation::math::{Mat4, Vec3};
use crate::scene::model::Projection;

/// Axis-aligned rectangle on the camera's reference plane.
///
/// For perspective cameras the reference plane sits at distance 1 in front of the eye, so the
/// window spans tangents of the half angles. Orthographic windows are in scene units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Window {
    /// Lower-left corner.
    pub min: [f64; 2],
    /// Upper-right corner.
    pub max: [f64; 2],
}

impl Window {
    /// Rectangle from corners.
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// `[width, height]`.
    pub fn size(&self) -> [f64; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    /// Center point.
    pub fn center(&self) -> [f64; 2] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        ]
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        let [w, h] = self.size();
        if h != 0.0 { w / h } else { 1.0 }
    }
}

/// Viewing volume of a camera at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Frustum {
    position: Vec3,
    rotation: Rotation3<f64>,
    window: Window,
    near_far: [f64; 2],
    projection: Projection,
}

impl Frustum {
    /// Build a frustum from a camera-to-world transform.
    ///
    /// Scale and shear in `camera_to_world` are discarded; only the position and the nearest
    /// rotation are kept.
    pub fn new(
        camera_to_world: &Mat4,
        window: Window,
        near_far: [f64; 2],
        projection: Projection,
    ) -> Self {
        let position = camera_to_world.fixed_view::<3, 1>(0, 3).into_owned();
        let linear: Matrix3<f64> = camera_to_world.fixed_view::<3, 3>(0, 0).into_owned();
        Self {
            position,
            rotation: Rotation3::from_matrix(&linear),
            window,
            near_far,
            projection,
        }
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Window on the reference plane.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Near and far distances.
    pub fn near_far(&self) -> [f64; 2] {
        self.near_far
    }

    /// Projection type.
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Window aspect ratio.
    pub fn aspect(&self) -> f64 {
        self.window.aspect()
    }

    /// Rigid camera-to-world transform.
    pub fn camera_to_world(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * self.rotation.to_homogeneous()
    }

    /// World-to-eye transform.
    pub fn view_matrix(&self) -> Mat4 {
        let inv = self.rotation.inverse();
        inv.to_homogeneous() * Mat4::new_translation(&-self.position)
    }

    /// Eye-to-clip transform (OpenGL clip conventions, depth in `[-1, 1]`).
    pub fn projection_matrix(&self) -> Mat4 {
        let [n, f] = self.near_far;
        match self.projection {
            Projection::Perspective => {
                let l = self.window.min[0] * n;
                let r = self.window.max[0] * n;
                let b = self.window.min[1] * n;
                let t = self.window.max[1] * n;
                Mat4::new(
                    2.0 * n / (r - l),
                    0.0,
                    (r + l) / (r - l),
                    0.0,
                    0.0,
                    2.0 * n / (t - b),
                    (t + b) / (t - b),
                    0.0,
                    0.0,
                    0.0,
                    -(f + n) / (f - n),
                    -2.0 * f * n / (f - n),
                    0.0,
                    0.0,
                    -1.0,
                    0.0,
                )
            }
            Projection::Orthographic => {
                let [l, b] = self.window.min;
                let [r, t] = self.window.max;
                Mat4::new(
                    2.0 / (r - l),
                    0.0,
                    0.0,
                    -(r + l) / (r - l),
                    0.0,
                    2.0 / (t - b),
                    0.0,
                    -(t + b) / (t - b),
                    0.0,
                    0.0,
                    -2.0 / (f - n),
                    -(f + n) / (f - n),
                    0.0,
                    0.0,
                    0.0,
                    1.0,
                )
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/frustum.rs"]
mod tests;
