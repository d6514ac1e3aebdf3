use super::*;
use crate::camera::frustum::{Frustum, Window};
use crate::scene::geometry::prepare_prim;
use crate::scene::model::{MeshDef, Orientation, PrimKind, Projection, SubdivisionScheme};

const W: u32 = 8;
const H: u32 = 8;

fn camera(projection: Projection) -> CameraState {
    let near_far = match projection {
        Projection::Orthographic => [0.0, 10.0],
        Projection::Perspective => [0.1, 10.0],
    };
    let f = Frustum::new(
        &Mat4::identity(),
        Window::new([-1.0, -1.0], [1.0, 1.0]),
        near_far,
        projection,
    );
    CameraState {
        view: f.view_matrix(),
        projection: f.projection_matrix(),
        viewport: [0, 0, W, H],
    }
}

fn ctx(draw_mode: DrawMode, cull_style: CullStyle) -> DrawContext {
    DrawContext {
        camera: camera(Projection::Orthographic),
        draw_mode,
        cull_style,
        light: None,
    }
}

fn quad(half: f64, z: f64, color: [f32; 3], orientation: Orientation) -> PreparedMesh {
    let def = MeshDef {
        points: vec![
            [-half, -half, z],
            [half, -half, z],
            [half, half, z],
            [-half, half, z],
        ],
        face_vertex_counts: vec![4],
        face_vertex_indices: vec![0, 1, 2, 3],
        display_color: Some(color),
        double_sided: false,
        orientation,
        subdivision_scheme: SubdivisionScheme::None,
    };
    prepare_prim(&PrimKind::Mesh(def), 0).unwrap()
}

fn render(list: &DrawList, rows_per_band: u32, planes: &[[f64; 4]]) -> (Vec<f32>, Vec<f32>) {
    let mut color = vec![0.0; (W * H * 3) as usize];
    let mut depth = vec![1.0; (W * H) as usize];
    let rows = rows_per_band as usize;
    for (i, (c, d)) in color
        .chunks_mut(W as usize * 3 * rows)
        .zip(depth.chunks_mut(W as usize * rows))
        .enumerate()
    {
        let mut band = Band {
            y0: i as u32 * rows_per_band,
            rows: (d.len() / W as usize) as u32,
            width: W,
            color: c,
            depth: d,
        };
        rasterize_band(list, &mut band, planes);
    }
    (color, depth)
}

fn px(color: &[f32], x: u32, y: u32) -> [f32; 3] {
    let i = ((y * W + x) * 3) as usize;
    [color[i], color[i + 1], color[i + 2]]
}

fn covered(color: &[f32]) -> usize {
    color.chunks_exact(3).filter(|c| c.iter().any(|v| *v > 0.0)).count()
}

#[test]
fn quad_covers_each_inner_pixel_once() {
    let mut list = DrawList::new();
    let c = ctx(DrawMode::ShadedSmooth, CullStyle::BackUnlessDoubleSided);
    list.push_mesh(&quad(0.5, -5.0, [1.0, 0.0, 0.0], Orientation::RightHanded), &Mat4::identity(), &c);
    assert_eq!(list.triangle_count(), 2);
    assert_eq!(list.line_count(), 0);

    let (color, depth) = render(&list, H, &[]);
    assert_eq!(covered(&color), 16);
    assert_eq!(px(&color, 3, 3), [1.0, 0.0, 0.0]);
    assert_eq!(px(&color, 0, 0), [0.0; 3]);
    assert!((depth[(3 * W + 3) as usize] - 0.5).abs() < 1e-6);
}

#[test]
fn band_split_does_not_change_pixels() {
    let mut list = DrawList::new();
    let c = ctx(DrawMode::WireframeOnSurface, CullStyle::Nothing);
    let model = Mat4::from_axis_angle(&Vec3::z_axis(), 0.4);
    list.push_mesh(&quad(0.7, -5.0, [0.2, 0.9, 0.4], Orientation::RightHanded), &model, &c);
    list.push_mesh(&quad(0.3, -3.0, [0.9, 0.1, 0.1], Orientation::LeftHanded), &Mat4::identity(), &c);

    let whole = render(&list, H, &[]);
    for rows in [1, 3, 5] {
        assert_eq!(render(&list, rows, &[]), whole, "rows per band: {rows}");
    }
}

#[test]
fn nearer_surface_wins_regardless_of_order() {
    let c = ctx(DrawMode::ShadedSmooth, CullStyle::Back);
    let near = quad(0.5, -2.0, [0.0, 0.0, 1.0], Orientation::RightHanded);
    let far = quad(0.9, -6.0, [0.0, 1.0, 0.0], Orientation::RightHanded);

    let mut list = DrawList::new();
    list.push_mesh(&near, &Mat4::identity(), &c);
    list.push_mesh(&far, &Mat4::identity(), &c);
    let (a, _) = render(&list, H, &[]);

    let mut list = DrawList::new();
    list.push_mesh(&far, &Mat4::identity(), &c);
    list.push_mesh(&near, &Mat4::identity(), &c);
    let (b, _) = render(&list, H, &[]);

    assert_eq!(a, b);
    assert_eq!(px(&a, 4, 4), [0.0, 0.0, 1.0]);
    assert_eq!(px(&a, 0, 4), [0.0, 1.0, 0.0]);
}

#[test]
fn back_faces_follow_cull_style() {
    let back = quad(0.5, -5.0, [1.0, 1.0, 1.0], Orientation::LeftHanded);
    let mut list = DrawList::new();
    list.push_mesh(&back, &Mat4::identity(), &ctx(DrawMode::ShadedSmooth, CullStyle::Back));
    list.push_mesh(
        &back,
        &Mat4::identity(),
        &ctx(DrawMode::ShadedSmooth, CullStyle::BackUnlessDoubleSided),
    );
    assert_eq!(list.triangle_count(), 0);

    list.push_mesh(&back, &Mat4::identity(), &ctx(DrawMode::ShadedSmooth, CullStyle::Nothing));
    assert_eq!(list.triangle_count(), 2);

    // A mirroring transform turns the same faces toward the camera.
    let mut mirrored = DrawList::new();
    let flip = Mat4::new_nonuniform_scaling(&Vec3::new(-1.0, 1.0, 1.0));
    mirrored.push_mesh(&back, &flip, &ctx(DrawMode::ShadedSmooth, CullStyle::Back));
    assert_eq!(mirrored.triangle_count(), 0);
    let front = quad(0.5, -5.0, [1.0, 1.0, 1.0], Orientation::RightHanded);
    mirrored.push_mesh(&front, &flip, &ctx(DrawMode::ShadedSmooth, CullStyle::Back));
    assert_eq!(mirrored.triangle_count(), 2);
}

#[test]
fn clip_planes_discard_fragments_in_eye_space() {
    let mut list = DrawList::new();
    let c = ctx(DrawMode::ShadedSmooth, CullStyle::Nothing);
    list.push_mesh(&quad(1.0, -5.0, [1.0, 1.0, 0.0], Orientation::RightHanded), &Mat4::identity(), &c);

    let (color, _) = render(&list, H, &[[1.0, 0.0, 0.0, 0.0]]);
    assert_eq!(covered(&color), 32);
    assert_eq!(px(&color, 1, 4), [0.0; 3]);
    assert_eq!(px(&color, 6, 4), [1.0, 1.0, 0.0]);
}

#[test]
fn geometry_crossing_the_near_plane_is_clipped() {
    let mut list = DrawList::new();
    let c = DrawContext {
        camera: camera(Projection::Perspective),
        draw_mode: DrawMode::ShadedSmooth,
        cull_style: CullStyle::Nothing,
        light: None,
    };
    // Floor running from behind the eye to far in front of it.
    let def = MeshDef {
        points: vec![
            [-1.0, -0.5, 5.0],
            [1.0, -0.5, 5.0],
            [1.0, -0.5, -8.0],
            [-1.0, -0.5, -8.0],
        ],
        face_vertex_counts: vec![4],
        face_vertex_indices: vec![0, 1, 2, 3],
        display_color: Some([0.5, 0.5, 0.5]),
        double_sided: true,
        orientation: Orientation::RightHanded,
        subdivision_scheme: SubdivisionScheme::None,
    };
    let mesh = prepare_prim(&PrimKind::Mesh(def), 0).unwrap();
    list.push_mesh(&mesh, &Mat4::identity(), &c);
    assert!(list.triangle_count() >= 2);

    let (color, depth) = render(&list, 2, &[]);
    assert!(covered(&color) > 0);
    assert!(depth.iter().all(|d| (0.0..=1.0).contains(d)));
    // Nothing above the horizon.
    assert_eq!(px(&color, 4, 7), [0.0; 3]);
}

#[test]
fn wireframe_draws_only_polygon_edges() {
    let mut list = DrawList::new();
    let c = ctx(DrawMode::Wireframe, CullStyle::BackUnlessDoubleSided);
    list.push_mesh(&quad(0.5, -5.0, [0.0, 1.0, 1.0], Orientation::RightHanded), &Mat4::identity(), &c);
    assert_eq!(list.triangle_count(), 0);
    assert_eq!(list.line_count(), 4);

    let (color, _) = render(&list, H, &[]);
    assert_eq!(px(&color, 4, 2), [0.0, 1.0, 1.0]);
    assert_eq!(px(&color, 4, 3), [0.0; 3]);
}

#[test]
fn head_light_brightens_facing_surfaces() {
    let mesh = quad(0.5, -5.0, [0.5, 0.5, 0.5], Orientation::RightHanded);
    let mut lit = ctx(DrawMode::ShadedSmooth, CullStyle::Back);
    lit.light = Some(HeadLight::at(Vec3::zeros()));
    let mut list = DrawList::new();
    list.push_mesh(&mesh, &Mat4::identity(), &lit);
    let (color, _) = render(&list, H, &[]);
    let c = px(&color, 4, 4);
    assert!(c[0] > 0.5);
    assert!(c.iter().all(|v| *v <= 1.0));
}

fn screen_vert(x: f64, y: f64) -> ScreenVert {
    ScreenVert {
        x,
        y,
        z: 0.5,
        inv_w: 1.0,
        eye_w: Vec3::zeros(),
        color_w: Vec3::new(1.0, 1.0, 1.0),
    }
}

#[test]
fn long_lines_only_walk_samples_inside_the_band() {
    let a = screen_vert(-1.0e9 + 0.5, 4.5);
    let b = screen_vert(1.0e9 + 0.5, 4.5);
    let mut color = vec![0.0; (W * H * 3) as usize];
    let mut depth = vec![1.0; (W * H) as usize];
    let band = Band {
        y0: 0,
        rows: H,
        width: W,
        color: &mut color,
        depth: &mut depth,
    };
    let (_, samples) = line_samples(&a, &b, &band).unwrap();
    assert!(samples.end() - samples.start() <= u64::from(W) + 3);

    let above = Band { y0: 5, rows: 3, ..band };
    assert!(line_samples(&a, &b, &above).is_none());

    let mut list = DrawList::new();
    list.push(Item::Line([a, b]));
    let (color, _) = render(&list, 3, &[]);
    assert_eq!(covered(&color), W as usize);
    assert_eq!(px(&color, 0, 4), [1.0; 3]);
    assert_eq!(px(&color, 7, 4), [1.0; 3]);
}

#[test]
fn wireframe_edges_grazing_the_near_plane_stay_cheap() {
    let mut c = ctx(DrawMode::Wireframe, CullStyle::Nothing);
    c.camera = camera(Projection::Perspective);
    let def = MeshDef {
        points: vec![[-1.0e6, 0.0, -0.11], [1.0e6, 0.0, -0.11], [0.0, 1.0, -5.0]],
        face_vertex_counts: vec![3],
        face_vertex_indices: vec![0, 1, 2],
        display_color: Some([1.0, 1.0, 1.0]),
        double_sided: false,
        orientation: Orientation::RightHanded,
        subdivision_scheme: SubdivisionScheme::None,
    };
    let mut list = DrawList::new();
    list.push_mesh(&prepare_prim(&PrimKind::Mesh(def), 0).unwrap(), &Mat4::identity(), &c);
    assert_eq!(list.line_count(), 3);

    let (color, _) = render(&list, 1, &[]);
    assert!(covered(&color) > 0);
    assert!(covered(&color) <= (W * H) as usize);
}
