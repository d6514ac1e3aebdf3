use std::ops::RangeInclusive;

use smallvec::SmallVec;

use crate::foundation::core::Rgb;
use crate::foundation::math::{Mat4, Vec3, Vec4, normal_matrix, transform_point};
use crate::render::params::{CameraState, CullStyle, DrawMode, HeadLight};
use crate::scene::geometry::PreparedMesh;

/// Color of edges drawn over shaded surfaces.
const WIRE_ON_SURFACE_COLOR: Rgb = Rgb::new(0.0, 0.0, 0.0);
/// Window-space depth pulled toward the viewer for lines so edges win over their own faces.
const LINE_DEPTH_BIAS: f64 = 1e-4;

/// Per-run state shared by every mesh pushed into a [`DrawList`].
#[derive(Clone, Debug)]
pub(crate) struct DrawContext {
    pub(crate) camera: CameraState,
    pub(crate) draw_mode: DrawMode,
    pub(crate) cull_style: CullStyle,
    /// Head-light in eye space; `None` disables lighting.
    pub(crate) light: Option<HeadLight>,
}

#[derive(Clone, Copy, Debug)]
struct ClipVert {
    clip: Vec4,
    eye: Vec3,
    normal: Vec3,
}

impl ClipVert {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            clip: a.clip + (b.clip - a.clip) * t,
            eye: a.eye + (b.eye - a.eye) * t,
            normal: a.normal + (b.normal - a.normal) * t,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenVert {
    x: f64,
    y: f64,
    /// Window depth in `[0, 1]`.
    z: f64,
    inv_w: f64,
    eye_w: Vec3,
    color_w: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
enum Item {
    Tri([ScreenVert; 3]),
    Line([ScreenVert; 2]),
}

impl Item {
    fn y_range(&self) -> (f64, f64) {
        let vs: &[ScreenVert] = match self {
            Item::Tri(v) => v,
            Item::Line(v) => v,
        };
        vs.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v.y), hi.max(v.y))
        })
    }
}

/// Screen-space triangles and lines in submission order.
#[derive(Clone, Debug, Default)]
pub(crate) struct DrawList {
    items: Vec<Item>,
    y_ranges: Vec<(f64, f64)>,
}

impl DrawList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn triangle_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, Item::Tri(_)))
            .count()
    }

    pub(crate) fn line_count(&self) -> usize {
        self.items.len() - self.triangle_count()
    }

    fn push(&mut self, item: Item) {
        self.y_ranges.push(item.y_range());
        self.items.push(item);
    }

    /// Transform, clip, cull and light `mesh`, appending its screen primitives.
    pub(crate) fn push_mesh(&mut self, mesh: &PreparedMesh, model: &Mat4, ctx: &DrawContext) {
        let mv = ctx.camera.view * model;
        let Some(normal_m) = normal_matrix(&mv) else {
            tracing::trace!("skipping mesh with singular transform");
            return;
        };
        let mirrored = model.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
        let mvp = ctx.camera.projection * mv;

        let verts: Vec<ClipVert> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .map(|(p, n)| ClipVert {
                clip: mvp * p.push(1.0),
                eye: transform_point(&mv, p),
                normal: (normal_m * n).try_normalize(f64::EPSILON).unwrap_or_else(Vec3::z),
            })
            .collect();

        let draw_surface = ctx.draw_mode != DrawMode::Wireframe;
        let draw_edges = matches!(
            ctx.draw_mode,
            DrawMode::Wireframe | DrawMode::WireframeOnSurface
        );

        for tri in &mesh.triangles {
            let [a, b, c] = tri.idx.map(|i| verts[i as usize]);
            let poly = clip_polygon(&[a, b, c]);
            if poly.len() < 3 {
                continue;
            }
            let area = ndc_area(&poly);
            if area == 0.0 || !area.is_finite() {
                continue;
            }
            let front = (area > 0.0) != mirrored;
            if ctx.cull_style.culls(front, mesh.double_sided) {
                continue;
            }
            let flip = !front && mesh.double_sided;

            if draw_surface {
                let flat = (ctx.draw_mode == DrawMode::ShadedFlat).then(|| {
                    let n = (b.eye - a.eye).cross(&(c.eye - a.eye));
                    let n = n.try_normalize(f64::EPSILON).unwrap_or_else(Vec3::z);
                    if mirrored { -n } else { n }
                });
                let screen: SmallVec<[ScreenVert; 9]> = poly
                    .iter()
                    .map(|v| {
                        let n = flat.unwrap_or(v.normal);
                        let n = n.try_normalize(f64::EPSILON).unwrap_or_else(Vec3::z);
                        let n = if flip { -n } else { n };
                        let color = shade(mesh.color, &n, &v.eye, ctx.light.as_ref());
                        to_screen(v, color, &ctx.camera.viewport)
                    })
                    .collect();
                for i in 1..screen.len() - 1 {
                    self.push(Item::Tri([screen[0], screen[i], screen[i + 1]]));
                }
            }

            if draw_edges {
                let color = rgb_vec(if ctx.draw_mode == DrawMode::Wireframe {
                    mesh.color.clamped()
                } else {
                    WIRE_ON_SURFACE_COLOR
                });
                let corners = [a, b, c];
                for e in 0..3 {
                    if tri.edges & (1 << e) == 0 {
                        continue;
                    }
                    let Some([p, q]) = clip_segment(corners[e], corners[(e + 1) % 3]) else {
                        continue;
                    };
                    let mut sp = to_screen(&p, color, &ctx.camera.viewport);
                    let mut sq = to_screen(&q, color, &ctx.camera.viewport);
                    sp.z = (sp.z - LINE_DEPTH_BIAS).max(0.0);
                    sq.z = (sq.z - LINE_DEPTH_BIAS).max(0.0);
                    self.push(Item::Line([sp, sq]));
                }
            }
        }
    }
}

/// Fixed-function style lighting: ambient, diffuse and a white specular highlight with a
/// non-local viewer.
fn shade(base: Rgb, n: &Vec3, p_eye: &Vec3, light: Option<&HeadLight>) -> Vec3 {
    let c = rgb_vec(base);
    let Some(light) = light else {
        return c.map(|v| v.clamp(0.0, 1.0));
    };
    let l = (light.position - p_eye)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vec3::z);
    let ndl = n.dot(&l).max(0.0);
    let spec = if ndl > 0.0 {
        let h = (l + Vec3::z()).try_normalize(f64::EPSILON).unwrap_or(l);
        n.dot(&h).max(0.0).powf(f64::from(light.shininess)) * f64::from(light.specular)
    } else {
        0.0
    };
    let k = f64::from(light.ambient) + ndl;
    c.map(|v| (v * k + spec).clamp(0.0, 1.0))
}

fn rgb_vec(c: Rgb) -> Vec3 {
    Vec3::new(f64::from(c.r), f64::from(c.g), f64::from(c.b))
}

/// Clip against the near (`z >= -w`) and far (`z <= w`) planes.
fn clip_polygon(input: &[ClipVert]) -> SmallVec<[ClipVert; 9]> {
    let mut poly: SmallVec<[ClipVert; 9]> = input.iter().copied().collect();
    for dist in [near_dist as fn(&Vec4) -> f64, far_dist] {
        if poly.is_empty() {
            break;
        }
        let mut out: SmallVec<[ClipVert; 9]> = SmallVec::new();
        for i in 0..poly.len() {
            let cur = poly[i];
            let next = poly[(i + 1) % poly.len()];
            let dc = dist(&cur.clip);
            let dn = dist(&next.clip);
            if dc >= 0.0 {
                out.push(cur);
            }
            if (dc >= 0.0) != (dn >= 0.0) {
                out.push(ClipVert::lerp(&cur, &next, dc / (dc - dn)));
            }
        }
        poly = out;
    }
    poly
}

fn clip_segment(mut a: ClipVert, mut b: ClipVert) -> Option<[ClipVert; 2]> {
    for dist in [near_dist as fn(&Vec4) -> f64, far_dist] {
        let da = dist(&a.clip);
        let db = dist(&b.clip);
        if da < 0.0 && db < 0.0 {
            return None;
        }
        if da < 0.0 {
            a = ClipVert::lerp(&a, &b, da / (da - db));
        } else if db < 0.0 {
            b = ClipVert::lerp(&a, &b, da / (da - db));
        }
    }
    Some([a, b])
}

fn near_dist(c: &Vec4) -> f64 {
    c.z + c.w
}

fn far_dist(c: &Vec4) -> f64 {
    c.w - c.z
}

/// Twice the signed NDC area; positive for counter-clockwise polygons.
fn ndc_area(poly: &[ClipVert]) -> f64 {
    let mut sum = 0.0;
    for i in 0..poly.len() {
        let p = &poly[i].clip;
        let q = &poly[(i + 1) % poly.len()].clip;
        sum += (p.x / p.w) * (q.y / q.w) - (q.x / q.w) * (p.y / p.w);
    }
    sum
}

fn to_screen(v: &ClipVert, color: Vec3, viewport: &[u32; 4]) -> ScreenVert {
    let inv_w = 1.0 / v.clip.w;
    let [vx, vy, vw, vh] = viewport.map(f64::from);
    ScreenVert {
        x: vx + (v.clip.x * inv_w + 1.0) * 0.5 * vw,
        y: vy + (v.clip.y * inv_w + 1.0) * 0.5 * vh,
        z: ((v.clip.z * inv_w + 1.0) * 0.5).clamp(0.0, 1.0),
        inv_w,
        eye_w: v.eye * inv_w,
        color_w: color * inv_w,
    }
}

/// Horizontal slice of a framebuffer: rows `y0..y0 + rows`, bottom-up.
pub(crate) struct Band<'a> {
    pub(crate) y0: u32,
    pub(crate) rows: u32,
    pub(crate) width: u32,
    pub(crate) color: &'a mut [f32],
    pub(crate) depth: &'a mut [f32],
}

impl Band<'_> {
    fn write(&mut self, x: u32, y: u32, z: f64, color: &Vec3) {
        let i = ((y - self.y0) * self.width + x) as usize;
        let z = z as f32;
        if z < self.depth[i] {
            self.depth[i] = z;
            self.color[i * 3] = color.x as f32;
            self.color[i * 3 + 1] = color.y as f32;
            self.color[i * 3 + 2] = color.z as f32;
        }
    }
}

/// Rasterize every item of `list` that touches `band`.
///
/// Each pixel's result depends only on the items covering it, so splitting a framebuffer into
/// bands of any size gives the same image.
pub(crate) fn rasterize_band(list: &DrawList, band: &mut Band<'_>, clip_planes: &[[f64; 4]]) {
    let lo = f64::from(band.y0);
    let hi = f64::from(band.y0 + band.rows);
    for (item, &(ymin, ymax)) in list.items.iter().zip(&list.y_ranges) {
        if ymax < lo - 1.0 || ymin > hi + 1.0 {
            continue;
        }
        match item {
            Item::Tri(v) => raster_triangle(v, band, clip_planes),
            Item::Line(v) => raster_line(v, band, clip_planes),
        }
    }
}

fn edge(a: &ScreenVert, b: &ScreenVert, px: f64, py: f64) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Top-left fill rule for a counter-clockwise triangle in y-up window space.
fn is_top_left(a: &ScreenVert, b: &ScreenVert) -> bool {
    b.y < a.y || (a.y == b.y && b.x < a.x)
}

fn clipped_by(planes: &[[f64; 4]], eye: &Vec3) -> bool {
    planes
        .iter()
        .any(|p| p[0] * eye.x + p[1] * eye.y + p[2] * eye.z + p[3] < 0.0)
}

fn raster_triangle(v: &[ScreenVert; 3], band: &mut Band<'_>, clip_planes: &[[f64; 4]]) {
    let [a, mut b, mut c] = *v;
    let mut area = edge(&a, &b, c.x, c.y);
    if area == 0.0 || !area.is_finite() {
        return;
    }
    if area < 0.0 {
        std::mem::swap(&mut b, &mut c);
        area = -area;
    }

    let width = f64::from(band.width);
    let x0 = a.x.min(b.x).min(c.x).floor().max(0.0);
    let x1 = a.x.max(b.x).max(c.x).ceil().min(width);
    let y0 = a.y.min(b.y).min(c.y).floor().max(f64::from(band.y0));
    let y1 = a.y.max(b.y).max(c.y).ceil().min(f64::from(band.y0 + band.rows));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let tl = [is_top_left(&b, &c), is_top_left(&c, &a), is_top_left(&a, &b)];
    for y in y0 as u32..y1 as u32 {
        let py = f64::from(y) + 0.5;
        for x in x0 as u32..x1 as u32 {
            let px = f64::from(x) + 0.5;
            let w = [edge(&b, &c, px, py), edge(&c, &a, px, py), edge(&a, &b, px, py)];
            if w.iter().zip(&tl).any(|(w, tl)| *w < 0.0 || (*w == 0.0 && !tl)) {
                continue;
            }
            let [l0, l1, l2] = w.map(|w| w / area);
            let z = l0 * a.z + l1 * b.z + l2 * c.z;
            let inv_w = l0 * a.inv_w + l1 * b.inv_w + l2 * c.inv_w;
            if !clip_planes.is_empty() {
                let eye = (a.eye_w * l0 + b.eye_w * l1 + c.eye_w * l2) / inv_w;
                if clipped_by(clip_planes, &eye) {
                    continue;
                }
            }
            let color = (a.color_w * l0 + b.color_w * l1 + c.color_w * l2) / inv_w;
            band.write(x, y, z, &color);
        }
    }
}

/// Parameter interval `[t0, t1]` of `a + (b - a) * t`, `t` in `[0, 1]`, inside the rectangle
/// `x` by `y` (Liang-Barsky).
fn segment_window(
    a: &ScreenVert,
    b: &ScreenVert,
    x: [f64; 2],
    y: [f64; 2],
) -> Option<(f64, f64)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, a.x - x[0]),
        (dx, x[1] - a.x),
        (-dy, a.y - y[0]),
        (dy, y[1] - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// DDA sample indices of the segment that can land inside `band`.
///
/// Samples are spaced along the whole segment, so the pixels a line lights do not depend on
/// the band it is drawn into; only the visited index range shrinks to the band.
fn line_samples(
    a: &ScreenVert,
    b: &ScreenVert,
    band: &Band<'_>,
) -> Option<(f64, RangeInclusive<u64>)> {
    let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0);
    if !steps.is_finite() {
        return None;
    }
    let (t0, t1) = segment_window(
        a,
        b,
        [0.0, f64::from(band.width)],
        [f64::from(band.y0), f64::from(band.y0 + band.rows)],
    )?;
    let n = steps as u64;
    let first = ((t0 * steps).floor() as u64).saturating_sub(1);
    let last = ((t1 * steps).ceil() as u64).saturating_add(1).min(n);
    Some((steps, first..=last))
}

fn raster_line(v: &[ScreenVert; 2], band: &mut Band<'_>, clip_planes: &[[f64; 4]]) {
    let [a, b] = v;
    let Some((steps, samples)) = line_samples(a, b, band) else {
        return;
    };
    for s in samples {
        let t = s as f64 / steps;
        let x = a.x + (b.x - a.x) * t;
        let y = a.y + (b.y - a.y) * t;
        if x < 0.0 || y < f64::from(band.y0) || x >= f64::from(band.width) {
            continue;
        }
        let (px, py) = (x as u32, y as u32);
        if py >= band.y0 + band.rows {
            continue;
        }
        let inv_w = a.inv_w + (b.inv_w - a.inv_w) * t;
        if !clip_planes.is_empty() {
            let eye = (a.eye_w + (b.eye_w - a.eye_w) * t) / inv_w;
            if clipped_by(clip_planes, &eye) {
                continue;
            }
        }
        let z = a.z + (b.z - a.z) * t;
        let color = (a.color_w + (b.color_w - a.color_w) * t) / inv_w;
        band.write(px, py, z, &color);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
