use std::collections::HashMap;

use crate::foundation::core::Rgb;
use crate::foundation::math::Vec3;
use crate::scene::model::{
    CubeDef, MeshDef, Orientation, PrimKind, SphereDef, SubdivisionScheme, display_color,
};

/// Highest refinement level derived from complexity.
pub(crate) const MAX_REFINE_LEVEL: u32 = 8;
/// Mesh midpoint refinement stops here (each level quadruples the triangle count).
const MAX_MESH_REFINE_LEVEL: u32 = 3;

/// Triangle with counter-clockwise front-face winding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Tri {
    pub(crate) idx: [u32; 3],
    /// Bit `i` set when edge `idx[i] -> idx[(i + 1) % 3]` lies on an authored polygon boundary.
    pub(crate) edges: u8,
}

/// Object-space triangle soup ready for rasterization.
#[derive(Clone, Debug)]
pub(crate) struct PreparedMesh {
    pub(crate) positions: Vec<Vec3>,
    /// Smooth per-vertex normals, outward for the front-face winding.
    pub(crate) normals: Vec<Vec3>,
    pub(crate) triangles: Vec<Tri>,
    pub(crate) color: Rgb,
    pub(crate) double_sided: bool,
}

/// Map a complexity in `[1.0, 2.0]` to a refinement level in `0..=8`.
pub(crate) fn refine_level(complexity: f64) -> u32 {
    let level = ((complexity - 1.0) * 10.0).round();
    if level.is_nan() || level <= 0.0 {
        0
    } else {
        (level as u32).min(MAX_REFINE_LEVEL)
    }
}

/// Tessellate a gprim; non-geometric prims yield `None`.
pub(crate) fn prepare_prim(kind: &PrimKind, refine: u32) -> Option<PreparedMesh> {
    match kind {
        PrimKind::Mesh(m) => Some(prepare_mesh(m, refine)),
        PrimKind::Sphere(s) => Some(tessellate_sphere(s, refine)),
        PrimKind::Cube(c) => Some(tessellate_cube(c)),
        PrimKind::Xform | PrimKind::Scope | PrimKind::Camera(_) => None,
    }
}

fn prepare_mesh(def: &MeshDef, refine: u32) -> PreparedMesh {
    let positions: Vec<Vec3> = def.points.iter().map(|p| Vec3::from(*p)).collect();
    let mut triangles = Vec::new();
    let mut cursor = 0usize;
    for &count in &def.face_vertex_counts {
        let n = count as usize;
        let face = &def.face_vertex_indices[cursor..cursor + n];
        cursor += n;
        for i in 1..n - 1 {
            let mut edges = 0b010;
            if i == 1 {
                edges |= 0b001;
            }
            if i + 1 == n - 1 {
                edges |= 0b100;
            }
            triangles.push(Tri {
                idx: [face[0], face[i], face[i + 1]],
                edges,
            });
        }
    }

    if def.orientation == Orientation::LeftHanded {
        for t in &mut triangles {
            *t = reverse_winding(*t);
        }
    }

    let mut mesh = PreparedMesh {
        normals: Vec::new(),
        positions,
        triangles,
        color: display_color(def.display_color),
        double_sided: def.double_sided,
    };
    if def.subdivision_scheme != SubdivisionScheme::None {
        for _ in 0..refine.min(MAX_MESH_REFINE_LEVEL) {
            midpoint_refine(&mut mesh);
        }
    }
    mesh.normals = smooth_normals(&mesh.positions, &mesh.triangles);
    mesh
}

/// Swap the second and third vertex; edge bits follow their edges.
fn reverse_winding(t: Tri) -> Tri {
    let [a, b, c] = t.idx;
    // old edges: e0 = a->b, e1 = b->c, e2 = c->a
    // new order a, c, b: e0' = a->c (old e2), e1' = c->b (old e1), e2' = b->a (old e0)
    let e0 = t.edges & 1;
    let e1 = (t.edges >> 1) & 1;
    let e2 = (t.edges >> 2) & 1;
    Tri {
        idx: [a, c, b],
        edges: e2 | (e1 << 1) | (e0 << 2),
    }
}

fn midpoint_refine(mesh: &mut PreparedMesh) {
    let mut mids: HashMap<(u32, u32), u32> = HashMap::new();
    let mut out = Vec::with_capacity(mesh.triangles.len() * 4);
    for t in &mesh.triangles {
        let [a, b, c] = t.idx;
        let ab = midpoint(&mut mesh.positions, &mut mids, a, b);
        let bc = midpoint(&mut mesh.positions, &mut mids, b, c);
        let ca = midpoint(&mut mesh.positions, &mut mids, c, a);
        let e0 = t.edges & 1;
        let e1 = (t.edges >> 1) & 1;
        let e2 = (t.edges >> 2) & 1;
        out.push(Tri {
            idx: [a, ab, ca],
            edges: e0 | (e2 << 2),
        });
        out.push(Tri {
            idx: [ab, b, bc],
            edges: e0 | (e1 << 1),
        });
        out.push(Tri {
            idx: [ca, bc, c],
            edges: (e1 << 1) | (e2 << 2),
        });
        out.push(Tri {
            idx: [ab, bc, ca],
            edges: 0,
        });
    }
    mesh.triangles = out;
}

fn midpoint(
    positions: &mut Vec<Vec3>,
    mids: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = (a.min(b), a.max(b));
    if let Some(&m) = mids.get(&key) {
        return m;
    }
    let p = (positions[a as usize] + positions[b as usize]) * 0.5;
    let idx = positions.len() as u32;
    positions.push(p);
    mids.insert(key, idx);
    idx
}

/// Area-weighted vertex normals.
fn smooth_normals(positions: &[Vec3], triangles: &[Tri]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::zeros(); positions.len()];
    for t in triangles {
        let [a, b, c] = t.idx.map(|i| i as usize);
        let n = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize(f64::EPSILON).unwrap_or_else(Vec3::z))
        .collect()
}

fn tessellate_sphere(def: &SphereDef, refine: u32) -> PreparedMesh {
    let slices = 12 + 6 * refine;
    let stacks = 6 + 3 * refine;
    let r = def.radius;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for j in 0..=stacks {
        let theta = std::f64::consts::PI * f64::from(j) / f64::from(stacks);
        let (st, ct) = theta.sin_cos();
        for i in 0..=slices {
            let phi = std::f64::consts::TAU * f64::from(i) / f64::from(slices);
            let (sp, cp) = phi.sin_cos();
            let n = Vec3::new(st * cp, ct, -st * sp);
            positions.push(n * r);
            normals.push(n);
        }
    }

    let row = slices + 1;
    let mut triangles = Vec::new();
    for j in 0..stacks {
        for i in 0..slices {
            let a = j * row + i;
            let b = a + row;
            let c = b + 1;
            let d = a + 1;
            if j != 0 {
                triangles.push(Tri {
                    idx: [a, b, d],
                    edges: 0b101,
                });
            }
            if j != stacks - 1 {
                triangles.push(Tri {
                    idx: [d, b, c],
                    edges: 0b110,
                });
            }
        }
    }

    PreparedMesh {
        positions,
        normals,
        triangles,
        color: display_color(def.display_color),
        double_sided: def.double_sided,
    }
}

fn tessellate_cube(def: &CubeDef) -> PreparedMesh {
    let h = def.size * 0.5;
    // (normal, u axis, v axis) with u x v == normal so corners run counter-clockwise.
    let faces = [
        (Vec3::x(), Vec3::y(), Vec3::z()),
        (-Vec3::x(), Vec3::z(), Vec3::y()),
        (Vec3::y(), Vec3::z(), Vec3::x()),
        (-Vec3::y(), Vec3::x(), Vec3::z()),
        (Vec3::z(), Vec3::x(), Vec3::y()),
        (-Vec3::z(), Vec3::y(), Vec3::x()),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut triangles = Vec::with_capacity(12);
    for (n, u, v) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            positions.push((n + u * su + v * sv) * h);
            normals.push(n);
        }
        triangles.push(Tri {
            idx: [base, base + 1, base + 2],
            edges: 0b011,
        });
        triangles.push(Tri {
            idx: [base, base + 2, base + 3],
            edges: 0b110,
        });
    }

    PreparedMesh {
        positions,
        normals,
        triangles,
        color: display_color(def.display_color),
        double_sided: def.double_sided,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/geometry.rs"]
mod tests;
