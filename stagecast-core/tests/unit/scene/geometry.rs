use super::*;
use crate::scene::model::MeshDef;

fn quad(orientation: Orientation, scheme: SubdivisionScheme) -> MeshDef {
    MeshDef {
        points: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        face_vertex_counts: vec![4],
        face_vertex_indices: vec![0, 1, 2, 3],
        display_color: Some([1.0, 0.0, 0.0]),
        double_sided: false,
        orientation,
        subdivision_scheme: scheme,
    }
}

fn face_normal(m: &PreparedMesh, t: &Tri) -> Vec3 {
    let [a, b, c] = t.idx.map(|i| m.positions[i as usize]);
    (b - a).cross(&(c - a))
}

#[test]
fn refine_level_tracks_complexity() {
    assert_eq!(refine_level(1.0), 0);
    assert_eq!(refine_level(0.2), 0);
    assert_eq!(refine_level(1.1), 1);
    assert_eq!(refine_level(1.34), 3);
    assert_eq!(refine_level(2.0), 8);
    assert_eq!(refine_level(f64::NAN), 0);
}

#[test]
fn quad_fans_into_two_triangles_with_outer_edges() {
    let m = prepare_mesh(&quad(Orientation::RightHanded, SubdivisionScheme::None), 4);
    assert_eq!(m.triangles.len(), 2);
    assert_eq!(m.triangles[0].idx, [0, 1, 2]);
    assert_eq!(m.triangles[0].edges, 0b011);
    assert_eq!(m.triangles[1].idx, [0, 2, 3]);
    assert_eq!(m.triangles[1].edges, 0b110);
    for n in &m.normals {
        assert!((n - Vec3::z()).norm() < 1e-12);
    }
    assert_eq!(m.color, Rgb::new(1.0, 0.0, 0.0));
}

#[test]
fn left_handed_mesh_flips_winding_and_keeps_boundary_edges() {
    let m = prepare_mesh(&quad(Orientation::LeftHanded, SubdivisionScheme::None), 0);
    for t in &m.triangles {
        assert!(face_normal(&m, t).z < 0.0);
        assert_eq!(t.edges.count_ones(), 2);
    }
    assert!(m.normals[0].z < 0.0);
}

#[test]
fn subdivided_mesh_refines_by_midpoints() {
    let m = prepare_mesh(&quad(Orientation::RightHanded, SubdivisionScheme::CatmullClark), 1);
    assert_eq!(m.triangles.len(), 8);
    // 4 corners + 4 boundary midpoints + 1 shared diagonal midpoint.
    assert_eq!(m.positions.len(), 9);
    let boundary_edges: u32 = m.triangles.iter().map(|t| t.edges.count_ones()).sum();
    assert_eq!(boundary_edges, 8);

    let capped = prepare_mesh(&quad(Orientation::RightHanded, SubdivisionScheme::Loop), 8);
    assert_eq!(capped.triangles.len(), 2 * 4usize.pow(MAX_MESH_REFINE_LEVEL));
}

#[test]
fn sphere_triangles_face_outward_and_grow_with_refinement() {
    let def = SphereDef {
        radius: 2.0,
        display_color: None,
        double_sided: false,
    };
    let coarse = tessellate_sphere(&def, 0);
    let fine = tessellate_sphere(&def, 2);
    assert!(fine.triangles.len() > coarse.triangles.len());
    assert_eq!(coarse.color, Rgb::FALLBACK_GRAY);

    for t in &coarse.triangles {
        let [a, b, c] = t.idx.map(|i| coarse.positions[i as usize]);
        let centroid = (a + b + c) / 3.0;
        assert!(face_normal(&coarse, t).dot(&centroid) > 0.0);
    }
    for p in &coarse.positions {
        assert!((p.norm() - 2.0).abs() < 1e-9);
    }
}

#[test]
fn cube_faces_point_away_from_center() {
    let m = tessellate_cube(&CubeDef {
        size: 4.0,
        display_color: None,
        double_sided: true,
    });
    assert_eq!(m.triangles.len(), 12);
    assert!(m.double_sided);
    for t in &m.triangles {
        let [a, b, c] = t.idx.map(|i| m.positions[i as usize]);
        let centroid = (a + b + c) / 3.0;
        assert!(face_normal(&m, t).dot(&centroid) > 0.0);
    }
    for p in &m.positions {
        assert_eq!(p.amax(), 2.0);
    }
}

#[test]
fn non_geometric_prims_prepare_nothing() {
    assert!(prepare_prim(&PrimKind::Xform, 0).is_none());
    assert!(prepare_prim(&PrimKind::Scope, 0).is_none());
}
