use super::*;
use crate::foundation::math::{Vec4, transform_point};
use approx::assert_relative_eq;

fn ndc(m: &Mat4, p: [f64; 3]) -> Vec3 {
    let c = m * Vec4::new(p[0], p[1], p[2], 1.0);
    Vec3::new(c.x / c.w, c.y / c.w, c.z / c.w)
}

#[test]
fn perspective_maps_window_corners_and_depth_range() {
    let f = Frustum::new(
        &Mat4::identity(),
        Window::new([-1.0, -0.5], [1.0, 0.5]),
        [1.0, 100.0],
        Projection::Perspective,
    );
    let p = f.projection_matrix();
    assert_relative_eq!(ndc(&p, [0.0, 0.0, -1.0]).z, -1.0, epsilon = 1e-12);
    assert_relative_eq!(ndc(&p, [0.0, 0.0, -100.0]).z, 1.0, epsilon = 1e-12);
    let corner = ndc(&p, [2.0, 1.0, -2.0]);
    assert_relative_eq!(corner.x, 1.0, epsilon = 1e-12);
    assert_relative_eq!(corner.y, 1.0, epsilon = 1e-12);
    assert_relative_eq!(f.aspect(), 2.0);
}

#[test]
fn orthographic_maps_window_linearly() {
    let f = Frustum::new(
        &Mat4::identity(),
        Window::new([-2.0, -1.0], [2.0, 1.0]),
        [0.0, 10.0],
        Projection::Orthographic,
    );
    let p = f.projection_matrix();
    let a = ndc(&p, [2.0, -1.0, 0.0]);
    assert_relative_eq!(a.x, 1.0, epsilon = 1e-12);
    assert_relative_eq!(a.y, -1.0, epsilon = 1e-12);
    assert_relative_eq!(a.z, -1.0, epsilon = 1e-12);
    assert_relative_eq!(ndc(&p, [0.0, 0.0, -10.0]).z, 1.0, epsilon = 1e-12);
    assert_relative_eq!(ndc(&p, [1.0, 0.0, -3.0]).x, 0.5, epsilon = 1e-12);
}

#[test]
fn view_matrix_inverts_rigid_camera_transform() {
    let xf = Mat4::new_translation(&Vec3::new(3.0, -2.0, 5.0))
        * Mat4::from_axis_angle(&Vec3::y_axis(), 0.7)
        * Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 3.0, 0.5));
    let f = Frustum::new(
        &xf,
        Window::new([-1.0, -1.0], [1.0, 1.0]),
        [0.1, 10.0],
        Projection::Perspective,
    );
    assert_relative_eq!(f.position(), Vec3::new(3.0, -2.0, 5.0), epsilon = 1e-12);
    let round = f.view_matrix() * f.camera_to_world();
    assert_relative_eq!(round, Mat4::identity(), epsilon = 1e-9);

    let eye = transform_point(&f.view_matrix(), &f.position());
    assert_relative_eq!(eye, Vec3::zeros(), epsilon = 1e-12);

    // Scale is dropped: a point one unit down the view axis stays one unit away.
    let ahead = transform_point(&f.camera_to_world(), &Vec3::new(0.0, 0.0, -1.0));
    assert_relative_eq!((ahead - f.position()).norm(), 1.0, epsilon = 1e-9);
}
