use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// Double-precision 3-vector.
pub type Vec3 = Vector3<f64>;
/// Double-precision homogeneous 4-vector.
pub type Vec4 = Vector4<f64>;
/// Double-precision 4x4 matrix (column-vector convention: `p' = M * p`).
pub type Mat4 = Matrix4<f64>;

/// Interpolation contract for time-sampled value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for [f64; 2] {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        [f64::lerp(&a[0], &b[0], t), f64::lerp(&a[1], &b[1], t)]
    }
}

impl Lerp for [f64; 3] {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        [
            f64::lerp(&a[0], &b[0], t),
            f64::lerp(&a[1], &b[1], t),
            f64::lerp(&a[2], &b[2], t),
        ]
    }
}

impl Lerp for [[f64; 4]; 4] {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let mut out = *a;
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = f64::lerp(&a[r][c], &b[r][c], t);
            }
        }
        out
    }
}

/// Transform a point by an affine or projective matrix (with homogeneous divide).
pub(crate) fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    let h = m * Vec4::new(p.x, p.y, p.z, 1.0);
    if h.w.abs() > f64::EPSILON {
        Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w)
    } else {
        Vec3::new(h.x, h.y, h.z)
    }
}

/// Inverse transpose of `m`'s upper 3x3; `None` when it is singular.
pub(crate) fn normal_matrix(m: &Mat4) -> Option<Matrix3<f64>> {
    let upper: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).into_owned();
    upper.try_inverse().map(|inv| inv.transpose())
}

/// Row-major nested array into a matrix (rows as authored in scene files).
pub(crate) fn mat4_from_rows(rows: &[[f64; 4]; 4]) -> Mat4 {
    Mat4::from_fn(|r, c| rows[r][c])
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
