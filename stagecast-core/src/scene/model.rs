use crate::foundation::core::Rgb;
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::math::{Lerp, Mat4, Vec3, mat4_from_rows};
use crate::scene::path::validate_prim_name;
use crate::scene::samples::Sampled;

/// Layer format version understood by this crate.
pub const LAYER_VERSION: &str = "1";

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// One scene-description file.
///
/// A layer is a list of root prims. Prims may reference other layers; the referenced layer's
/// root prims are grafted beneath the referencing prim when the stage is opened.
pub struct Layer {
    /// Format version; must equal [`LAYER_VERSION`].
    pub version: String,
    /// Root prims of this layer.
    #[serde(default)]
    pub prims: Vec<PrimDef>,
}

impl Layer {
    /// Parse a layer from JSON text.
    pub fn from_json(text: &str) -> StagecastResult<Self> {
        let layer: Layer =
            serde_json::from_str(text).map_err(|e| StagecastError::serde(e.to_string()))?;
        layer.validate()?;
        Ok(layer)
    }

    /// Validate static invariants for the whole layer.
    pub fn validate(&self) -> StagecastResult<()> {
        if self.version != LAYER_VERSION {
            return Err(StagecastError::scene(format!(
                "unsupported layer version '{}' (expected '{LAYER_VERSION}')",
                self.version
            )));
        }
        validate_siblings(&self.prims)?;
        for prim in &self.prims {
            prim.validate()?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Authored prim.
pub struct PrimDef {
    /// Prim name (path element).
    pub name: String,
    /// Schema type and its attributes.
    #[serde(default)]
    pub kind: PrimKind,
    /// Local transform relative to the parent prim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Sampled<XformOps>>,
    /// Visibility; `invisible` hides the whole subtree.
    #[serde(default)]
    pub visibility: Visibility,
    /// Imaging purpose.
    #[serde(default)]
    pub purpose: Purpose,
    /// Asset paths of layers grafted beneath this prim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Authored children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PrimDef>,
}

impl PrimDef {
    /// Build a prim with default attributes.
    pub fn new(name: impl Into<String>, kind: PrimKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: None,
            visibility: Visibility::Inherited,
            purpose: Purpose::Default,
            references: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Validate this prim and its authored descendants.
    pub fn validate(&self) -> StagecastResult<()> {
        validate_prim_name(&self.name).map_err(|e| StagecastError::scene(e.to_string()))?;
        if let Some(t) = &self.transform {
            t.validate(&format!("prim '{}' transform", self.name))?;
        }
        self.kind.validate(&self.name)?;
        for r in &self.references {
            if r.trim().is_empty() {
                return Err(StagecastError::scene(format!(
                    "prim '{}' has an empty reference",
                    self.name
                )));
            }
        }
        validate_siblings(&self.children)?;
        for c in &self.children {
            c.validate()?;
        }
        Ok(())
    }
}

fn validate_siblings(prims: &[PrimDef]) -> StagecastResult<()> {
    let mut seen = std::collections::BTreeSet::new();
    for p in prims {
        if !seen.insert(p.name.as_str()) {
            return Err(StagecastError::scene(format!(
                "duplicate sibling prim name '{}'",
                p.name
            )));
        }
    }
    Ok(())
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Prim schema type.
pub enum PrimKind {
    /// Transformable grouping prim.
    #[default]
    Xform,
    /// Non-transformable grouping prim (authored transforms are ignored).
    Scope,
    /// Polygonal mesh.
    Mesh(MeshDef),
    /// Implicit sphere centered at the origin.
    Sphere(SphereDef),
    /// Implicit axis-aligned cube centered at the origin.
    Cube(CubeDef),
    /// Camera looking down local `-Z` with `+Y` up.
    Camera(CameraDef),
}

impl PrimKind {
    /// Schema type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Xform => "Xform",
            Self::Scope => "Scope",
            Self::Mesh(_) => "Mesh",
            Self::Sphere(_) => "Sphere",
            Self::Cube(_) => "Cube",
            Self::Camera(_) => "Camera",
        }
    }

    /// Whether the prim draws geometry.
    pub fn is_gprim(&self) -> bool {
        matches!(self, Self::Mesh(_) | Self::Sphere(_) | Self::Cube(_))
    }

    fn validate(&self, name: &str) -> StagecastResult<()> {
        match self {
            Self::Xform | Self::Scope => Ok(()),
            Self::Mesh(m) => m.validate(name),
            Self::Sphere(s) => {
                if !s.radius.is_finite() || s.radius <= 0.0 {
                    return Err(StagecastError::scene(format!(
                        "sphere '{name}' radius must be finite and > 0"
                    )));
                }
                Ok(())
            }
            Self::Cube(c) => {
                if !c.size.is_finite() || c.size <= 0.0 {
                    return Err(StagecastError::scene(format!(
                        "cube '{name}' size must be finite and > 0"
                    )));
                }
                Ok(())
            }
            Self::Camera(c) => c.validate(name),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Prim visibility.
pub enum Visibility {
    /// Visible unless an ancestor is invisible.
    #[default]
    Inherited,
    /// Hidden along with all descendants.
    Invisible,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Imaging purpose; non-default purposes are drawn only when enabled in render params.
pub enum Purpose {
    /// Always drawn.
    #[default]
    Default,
    /// Final-quality geometry.
    Render,
    /// Lightweight stand-in geometry.
    Proxy,
    /// Visual aids (rigs, locators).
    Guide,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Winding order of front faces.
pub enum Orientation {
    /// Counter-clockwise faces are front-facing.
    #[default]
    RightHanded,
    /// Clockwise faces are front-facing.
    LeftHanded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Mesh subdivision scheme.
pub enum SubdivisionScheme {
    /// Drawn as authored regardless of complexity.
    #[default]
    None,
    /// Refined with complexity.
    CatmullClark,
    /// Refined with complexity.
    Loop,
    /// Refined with complexity.
    Bilinear,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Polygon mesh attributes.
pub struct MeshDef {
    /// Vertex positions.
    pub points: Vec<[f64; 3]>,
    /// Vertex count per face (each >= 3).
    pub face_vertex_counts: Vec<u32>,
    /// Flattened per-face vertex indices.
    pub face_vertex_indices: Vec<u32>,
    /// Constant display color.
    #[serde(default)]
    pub display_color: Option<[f32; 3]>,
    /// Disable back-face culling and light both sides.
    #[serde(default)]
    pub double_sided: bool,
    /// Front-face winding.
    #[serde(default)]
    pub orientation: Orientation,
    /// Subdivision scheme; anything but `none` is refined with complexity.
    #[serde(default)]
    pub subdivision_scheme: SubdivisionScheme,
}

impl MeshDef {
    fn validate(&self, name: &str) -> StagecastResult<()> {
        if self.points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(StagecastError::scene(format!(
                "mesh '{name}' points must be finite"
            )));
        }
        if let Some(c) = self.face_vertex_counts.iter().find(|&&c| c < 3) {
            return Err(StagecastError::scene(format!(
                "mesh '{name}' has a face with {c} vertices (need >= 3)"
            )));
        }
        let total: u64 = self.face_vertex_counts.iter().map(|&c| u64::from(c)).sum();
        if total != self.face_vertex_indices.len() as u64 {
            return Err(StagecastError::scene(format!(
                "mesh '{name}' face_vertex_counts sum ({total}) != face_vertex_indices length ({})",
                self.face_vertex_indices.len()
            )));
        }
        if let Some(i) = self
            .face_vertex_indices
            .iter()
            .find(|&&i| i as usize >= self.points.len())
        {
            return Err(StagecastError::scene(format!(
                "mesh '{name}' face index {i} out of range ({} points)",
                self.points.len()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Implicit sphere attributes.
pub struct SphereDef {
    /// Radius in scene units.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Constant display color.
    #[serde(default)]
    pub display_color: Option<[f32; 3]>,
    /// Disable back-face culling and light both sides.
    #[serde(default)]
    pub double_sided: bool,
}

fn default_radius() -> f64 {
    1.0
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Implicit cube attributes.
pub struct CubeDef {
    /// Edge length in scene units.
    #[serde(default = "default_size")]
    pub size: f64,
    /// Constant display color.
    #[serde(default)]
    pub display_color: Option<[f32; 3]>,
    /// Disable back-face culling and light both sides.
    #[serde(default)]
    pub double_sided: bool,
}

fn default_size() -> f64 {
    2.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Camera projection.
pub enum Projection {
    /// Pinhole perspective.
    #[default]
    Perspective,
    /// Parallel projection.
    Orthographic,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Camera attributes.
///
/// Apertures and focal length are in tenths of a scene unit (millimeters for centimeter
/// scenes), matching the usual film-back conventions.
pub struct CameraDef {
    /// Projection type.
    pub projection: Projection,
    /// Focal length.
    pub focal_length: Sampled<f64>,
    /// Horizontal film aperture.
    pub horizontal_aperture: Sampled<f64>,
    /// Vertical film aperture.
    pub vertical_aperture: Sampled<f64>,
    /// Horizontal film offset.
    pub horizontal_aperture_offset: Sampled<f64>,
    /// Vertical film offset.
    pub vertical_aperture_offset: Sampled<f64>,
    /// Near and far clipping distances.
    pub clipping_range: Sampled<[f64; 2]>,
    /// Additional clipping planes `(a, b, c, d)` in camera space; points with
    /// `a*x + b*y + c*z + d >= 0` are kept.
    pub clipping_planes: Vec<[f64; 4]>,
}

impl Default for CameraDef {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            focal_length: Sampled::constant(50.0),
            horizontal_aperture: Sampled::constant(20.955),
            vertical_aperture: Sampled::constant(15.2908),
            horizontal_aperture_offset: Sampled::constant(0.0),
            vertical_aperture_offset: Sampled::constant(0.0),
            clipping_range: Sampled::constant([1.0, 1_000_000.0]),
            clipping_planes: Vec::new(),
        }
    }
}

impl CameraDef {
    fn validate(&self, name: &str) -> StagecastResult<()> {
        let what = |attr: &str| format!("camera '{name}' {attr}");
        self.focal_length.validate(&what("focal_length"))?;
        self.horizontal_aperture
            .validate(&what("horizontal_aperture"))?;
        self.vertical_aperture.validate(&what("vertical_aperture"))?;
        self.horizontal_aperture_offset
            .validate(&what("horizontal_aperture_offset"))?;
        self.vertical_aperture_offset
            .validate(&what("vertical_aperture_offset"))?;
        self.clipping_range.validate(&what("clipping_range"))?;
        if self.clipping_planes.iter().flatten().any(|v| !v.is_finite()) {
            return Err(StagecastError::scene(what("clipping_planes must be finite")));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Local transform operations.
///
/// Applied as `translate * rotateZ * rotateY * rotateX * scale` (points are column vectors),
/// unless `matrix` is set, which replaces the other operations. `matrix` rows are authored
/// with the translation in the fourth column.
pub struct XformOps {
    /// Translation.
    pub translate: [f64; 3],
    /// Euler rotation in degrees, applied X then Y then Z.
    pub rotate_xyz: [f64; 3],
    /// Per-axis scale.
    pub scale: [f64; 3],
    /// Full matrix override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[[f64; 4]; 4]>,
}

impl Default for XformOps {
    fn default() -> Self {
        Self {
            translate: [0.0; 3],
            rotate_xyz: [0.0; 3],
            scale: [1.0; 3],
            matrix: None,
        }
    }
}

impl XformOps {
    /// Pure translation.
    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        Self {
            translate: [x, y, z],
            ..Self::default()
        }
    }

    /// Local-to-parent matrix.
    pub fn to_matrix(&self) -> Mat4 {
        if let Some(rows) = &self.matrix {
            return mat4_from_rows(rows);
        }
        let [rx, ry, rz] = self.rotate_xyz.map(f64::to_radians);
        let t = Mat4::new_translation(&Vec3::from(self.translate));
        let r = Mat4::from_axis_angle(&Vec3::z_axis(), rz)
            * Mat4::from_axis_angle(&Vec3::y_axis(), ry)
            * Mat4::from_axis_angle(&Vec3::x_axis(), rx);
        let s = Mat4::new_nonuniform_scaling(&Vec3::from(self.scale));
        t * r * s
    }
}

impl Lerp for XformOps {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let matrix = match (&a.matrix, &b.matrix) {
            (Some(ma), Some(mb)) => Some(<[[f64; 4]; 4]>::lerp(ma, mb, t)),
            _ => a.matrix,
        };
        Self {
            translate: <[f64; 3]>::lerp(&a.translate, &b.translate, t),
            rotate_xyz: <[f64; 3]>::lerp(&a.rotate_xyz, &b.rotate_xyz, t),
            scale: <[f64; 3]>::lerp(&a.scale, &b.scale, t),
            matrix,
        }
    }
}

/// Display color for a gprim, falling back to mid gray.
pub(crate) fn display_color(c: Option<[f32; 3]>) -> Rgb {
    c.map(Rgb::from).unwrap_or(Rgb::FALLBACK_GRAY)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
