use crate::foundation::core::{FrameIndex, Rgb};
use crate::foundation::math::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How geometry is drawn.
pub enum DrawMode {
    /// Lit surfaces with interpolated vertex normals.
    #[default]
    ShadedSmooth,
    /// Lit surfaces with one normal per triangle.
    ShadedFlat,
    /// Polygon edges only.
    Wireframe,
    /// Smooth-shaded surfaces with polygon edges on top.
    WireframeOnSurface,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which faces are discarded.
pub enum CullStyle {
    /// Draw every face.
    Nothing,
    /// Discard back faces.
    Back,
    /// Discard front faces.
    Front,
    /// Discard back faces of single-sided geometry.
    #[default]
    BackUnlessDoubleSided,
}

impl CullStyle {
    /// Whether a face with the given facing should be discarded.
    pub fn culls(self, front_facing: bool, double_sided: bool) -> bool {
        match self {
            Self::Nothing => false,
            Self::Back => !front_facing,
            Self::Front => front_facing,
            Self::BackUnlessDoubleSided => !front_facing && !double_sided,
        }
    }
}

/// Per-frame renderer parameters.
///
/// Everything except `frame`, `force_refresh` and `clip_planes` stays constant across a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParams {
    /// Frame being drawn; scene attributes are sampled at this time.
    pub frame: FrameIndex,
    /// Tessellation complexity in `[1.0, 2.0]`.
    pub complexity: f64,
    /// Draw mode.
    pub draw_mode: DrawMode,
    /// Cull style.
    pub cull_style: CullStyle,
    /// Draw prims with `guide` purpose.
    pub show_guides: bool,
    /// Draw prims with `proxy` purpose.
    pub show_proxy: bool,
    /// Draw prims with `render` purpose.
    pub show_render: bool,
    /// Apply lighting; unlit geometry shows its display color.
    pub enable_lighting: bool,
    /// Drop cached geometry before drawing.
    pub force_refresh: bool,
    /// Eye-space clip planes; fragments with `dot(plane, p_eye) < 0` are discarded.
    pub clip_planes: Vec<[f64; 4]>,
    /// Color used to clear the surface.
    pub clear_color: Rgb,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            frame: FrameIndex(1),
            complexity: 1.0,
            draw_mode: DrawMode::default(),
            cull_style: CullStyle::default(),
            show_guides: true,
            show_proxy: true,
            show_render: false,
            enable_lighting: true,
            force_refresh: false,
            clip_planes: Vec::new(),
            clear_color: Rgb::BLACK,
        }
    }
}

/// View, projection and viewport pushed to a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    /// World-to-eye.
    pub view: Mat4,
    /// Eye-to-clip.
    pub projection: Mat4,
    /// `(x, y, width, height)` in pixels, origin at the bottom-left.
    pub viewport: [u32; 4],
}

/// Point light placed at the eye.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadLight {
    /// World-space position.
    pub position: Vec3,
    /// Ambient material term.
    pub ambient: f32,
    /// Specular material term.
    pub specular: f32,
    /// Specular exponent.
    pub shininess: f32,
}

impl HeadLight {
    /// Head-light at `position` with the default material terms.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: 0.2,
            specular: 0.5,
            shininess: 32.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/params.rs"]
mod tests;
