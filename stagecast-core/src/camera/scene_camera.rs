use crate::camera::conform::{ConformPolicy, conform_window};
use crate::camera::frustum::{Frustum, Window};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::math::Mat4;
use crate::scene::model::{PrimKind, Projection};
use crate::scene::stage::{PrimId, Stage};

/// Film-back units to scene units.
const APERTURE_UNIT: f64 = 0.1;

/// A camera prim evaluated at one time.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneCamera {
    /// Camera-to-world transform.
    pub camera_to_world: Mat4,
    /// Projection type.
    pub projection: Projection,
    /// Focal length.
    pub focal_length: f64,
    /// Horizontal film aperture.
    pub horizontal_aperture: f64,
    /// Vertical film aperture.
    pub vertical_aperture: f64,
    /// Horizontal film offset.
    pub horizontal_aperture_offset: f64,
    /// Vertical film offset.
    pub vertical_aperture_offset: f64,
    /// Near and far clipping distances.
    pub clipping_range: [f64; 2],
    /// Eye-space clip planes.
    pub clipping_planes: Vec<[f64; 4]>,
}

impl SceneCamera {
    /// Evaluate the camera prim `id` at `time`.
    ///
    /// Fails with a configuration error when the prim is not a camera, and with a scene error
    /// when the evaluated attributes cannot describe a frustum.
    pub fn at(stage: &Stage, id: PrimId, time: f64) -> StagecastResult<Self> {
        let prim = stage.prim(id);
        let PrimKind::Camera(def) = &prim.kind else {
            return Err(StagecastError::config(format!(
                "prim '{}' is a {}, not a camera",
                prim.path,
                prim.kind.type_name()
            )));
        };
        let cam = Self {
            camera_to_world: stage.world_transform(id, time)?,
            projection: def.projection,
            focal_length: def.focal_length.sample(time)?,
            horizontal_aperture: def.horizontal_aperture.sample(time)?,
            vertical_aperture: def.vertical_aperture.sample(time)?,
            horizontal_aperture_offset: def.horizontal_aperture_offset.sample(time)?,
            vertical_aperture_offset: def.vertical_aperture_offset.sample(time)?,
            clipping_range: def.clipping_range.sample(time)?,
            clipping_planes: def.clipping_planes.clone(),
        };
        cam.check().map_err(|msg| {
            StagecastError::scene(format!("camera '{}' at time {time}: {msg}", prim.path))
        })?;
        Ok(cam)
    }

    fn check(&self) -> Result<(), String> {
        if !(self.horizontal_aperture > 0.0 && self.vertical_aperture > 0.0) {
            return Err("apertures must be positive".to_string());
        }
        let [near, far] = self.clipping_range;
        if !(near < far) {
            return Err(format!("clipping range [{near}, {far}] is empty"));
        }
        if self.projection == Projection::Perspective {
            if !(self.focal_length > 0.0) {
                return Err("focal length must be positive".to_string());
            }
            if !(near > 0.0) {
                return Err(format!("near clipping distance {near} must be positive"));
            }
        }
        Ok(())
    }

    /// Aperture aspect ratio.
    pub fn aspect(&self) -> f64 {
        self.horizontal_aperture / self.vertical_aperture
    }

    /// Adjust the apertures to `target_aspect`, keeping the window center.
    pub fn conform(&mut self, policy: ConformPolicy, target_aspect: f64) {
        let window = conform_window(self.film_window(), policy, target_aspect);
        let [w, h] = window.size();
        let [cx, cy] = window.center();
        self.horizontal_aperture = w;
        self.vertical_aperture = h;
        self.horizontal_aperture_offset = cx;
        self.vertical_aperture_offset = cy;
    }

    fn film_window(&self) -> Window {
        let hx = 0.5 * self.horizontal_aperture;
        let hy = 0.5 * self.vertical_aperture;
        Window::new(
            [
                self.horizontal_aperture_offset - hx,
                self.vertical_aperture_offset - hy,
            ],
            [
                self.horizontal_aperture_offset + hx,
                self.vertical_aperture_offset + hy,
            ],
        )
    }

    /// Reference-plane window.
    pub fn window(&self) -> Window {
        let film = self.film_window();
        let k = match self.projection {
            Projection::Perspective => 1.0 / self.focal_length,
            Projection::Orthographic => APERTURE_UNIT,
        };
        Window::new(
            [film.min[0] * k, film.min[1] * k],
            [film.max[0] * k, film.max[1] * k],
        )
    }

    /// Viewing frustum.
    pub fn frustum(&self) -> Frustum {
        Frustum::new(
            &self.camera_to_world,
            self.window(),
            self.clipping_range,
            self.projection,
        )
    }

    /// Eye-space clip planes.
    pub fn clip_planes(&self) -> &[[f64; 4]] {
        &self.clipping_planes
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/scene_camera.rs"]
mod tests;
