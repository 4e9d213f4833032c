//! # Vector / Matrix Kernel
//!
//! Thin layer over [`cgmath`] shared by the geometry and shadow modules.
//! cgmath already provides the named operations (`dot`, `cross`,
//! `normalize`, matrix multiply, `invert`, `transpose`); this module adds
//! the few helpers the rest of the crate needs on top:
//!
//! - NaN-propagating variants for degenerate input, so a near-singular
//!   matrix or a zero-length normal shows up as an obviously invalid result
//!   instead of a panic
//! - homogeneous point transforms with the `w` divide
//! - conversion to the nested arrays uploaded into uniform buffers

use cgmath::{InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3, Vector4};

pub use cgmath::{Deg, Point3, Rad, Vector2};

/// Smallest `|w|` accepted by [`transform_point`] before the divide.
pub const W_EPSILON: f32 = 1e-7;

/// Builds a [`Vector3`] from a packed position.
#[inline]
pub fn vec3(p: [f32; 3]) -> Vector3<f32> {
    Vector3::new(p[0], p[1], p[2])
}

/// Normalizes `v`; a zero-length input yields NaN components.
#[inline]
pub fn normalize_or_nan(v: Vector3<f32>) -> Vector3<f32> {
    v / v.magnitude()
}

/// Midpoint of two positions pushed back onto the unit sphere.
#[inline]
pub fn unit_midpoint(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    normalize_or_nan((vec3(a) + vec3(b)) * 0.5).into()
}

/// A matrix with every element set to NaN.
pub fn nan_matrix() -> Matrix4<f32> {
    Matrix4::from([[f32::NAN; 4]; 4])
}

/// Inverse of `m`, or an all-NaN matrix when `m` is singular.
pub fn invert_or_nan(m: Matrix4<f32>) -> Matrix4<f32> {
    m.invert().unwrap_or_else(nan_matrix)
}

/// Inverse-transpose of a model matrix, used to carry normals.
pub fn normal_matrix(model: Matrix4<f32>) -> Matrix4<f32> {
    invert_or_nan(model).transpose()
}

/// True when no element of `m` is NaN or infinite.
pub fn is_finite_matrix(m: &Matrix4<f32>) -> bool {
    let elements: &[f32; 16] = m.as_ref();
    elements.iter().all(|e| e.is_finite())
}

/// Applies `m` to the homogeneous point `(p, 1)` without dividing by `w`.
#[inline]
pub fn transform_homogeneous(m: &Matrix4<f32>, p: Vector3<f32>) -> Vector4<f32> {
    *m * p.extend(1.0)
}

/// Applies `m` to `p` and performs the perspective divide.
///
/// Returns `None` when the resulting `w` is (almost) zero, e.g. for the light
/// position under a planar shadow matrix.
pub fn transform_point(m: &Matrix4<f32>, p: Vector3<f32>) -> Option<Vector3<f32>> {
    let h = transform_homogeneous(m, p);
    if h.w.abs() < W_EPSILON {
        return None;
    }
    Some(h.truncate() / h.w)
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_midpoint_lies_on_sphere() {
        let m = unit_midpoint([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let len = vec3(m).magnitude();
        assert!((len - 1.0).abs() < 1e-6);
        assert!((m[0] - m[1]).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_input_propagates_nan() {
        let n = normalize_or_nan(Vector3::new(0.0, 0.0, 0.0));
        assert!(n.x.is_nan());

        let singular = Matrix4::from_nonuniform_scale(1.0, 0.0, 1.0);
        let inv = invert_or_nan(singular);
        assert!(!is_finite_matrix(&inv));
        assert!(is_finite_matrix(&Matrix4::identity()));
    }

    #[test]
    fn test_normal_matrix_of_uniform_scale() {
        let model = Matrix4::from_scale(2.0);
        let n = normal_matrix(model);
        assert!((n[0][0] - 0.5).abs() < 1e-6);
        assert!((n[3][3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_point_divides_by_w() {
        let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let p = transform_point(&m, Vector3::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(p, Vector3::new(2.0, 3.0, 4.0));

        let mut collapse = Matrix4::identity();
        collapse[3][3] = 0.0;
        assert!(transform_point(&collapse, Vector3::new(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_matrix_array_conversion_is_column_major() {
        let m = Matrix4::from_translation(Vector3::new(5.0, 6.0, 7.0));
        let a = convert_matrix4_to_array(m);
        assert_eq!(a[3], [5.0, 6.0, 7.0, 1.0]);
    }
}
