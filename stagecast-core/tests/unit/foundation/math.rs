use super::*;
use approx::assert_relative_eq;

#[test]
fn lerp_arrays_componentwise() {
    let a = [0.0, 10.0, -4.0];
    let b = [2.0, 20.0, 4.0];
    assert_eq!(<[f64; 3] as Lerp>::lerp(&a, &b, 0.5), [1.0, 15.0, 0.0]);
    assert_eq!(<[f64; 3] as Lerp>::lerp(&a, &b, 0.0), a);
    assert_eq!(<[f64; 3] as Lerp>::lerp(&a, &b, 1.0), b);
}

#[test]
fn transform_point_applies_translation_and_divides() {
    let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
    let p = transform_point(&m, &Vec3::new(1.0, 1.0, 1.0));
    assert_relative_eq!(p, Vec3::new(2.0, 3.0, 4.0));

    let mut proj = Mat4::identity();
    proj[(3, 3)] = 2.0;
    assert_relative_eq!(
        transform_point(&proj, &Vec3::new(2.0, 4.0, 6.0)),
        Vec3::new(1.0, 2.0, 3.0)
    );
}

#[test]
fn normals_follow_inverse_transpose() {
    let m = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 1.0));
    let nm = normal_matrix(&m).unwrap();
    let n = (nm * Vec3::new(1.0, 1.0, 0.0)).normalize();
    assert_relative_eq!(n, Vec3::new(0.5, 1.0, 0.0).normalize(), epsilon = 1e-12);

    let flat = Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 0.0, 1.0));
    assert!(normal_matrix(&flat).is_none());
}

#[test]
fn rows_map_to_matrix_rows() {
    let rows = [
        [1.0, 0.0, 0.0, 5.0],
        [0.0, 1.0, 0.0, 6.0],
        [0.0, 0.0, 1.0, 7.0],
        [0.0, 0.0, 0.0, 1.0],
    ];
    let m = mat4_from_rows(&rows);
    assert_relative_eq!(m[(0, 3)], 5.0);
    assert_relative_eq!(m[(2, 3)], 7.0);
}
