//! Planar projected shadows.
//!
//! A point light flattens every caster vertex onto a receiving plane through
//! one projective matrix. The matrix is an extra model transform: the
//! caster is drawn a second time with `camera_view_proj * shadow * model`
//! in a dark color.

use cgmath::{InnerSpace, Matrix, Matrix4, Vector3, Vector4};

use crate::error::{Error, Result};

/// Minimum light distance from the receiving plane accepted by
/// [`PlanarShadow::new`]
pub const PLANE_EPSILON: f32 = 1e-4;

/// Default lift of the shadow plane above the ground against z-fighting
pub const DEFAULT_SHADOW_LIFT: f32 = 1e-3;

/// A plane `normal . x + offset = 0` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub normal: Vector3<f32>,
    pub offset: f32,
}

impl GroundPlane {
    /// Normalizes `(normal, offset)` so `normal` has unit length.
    ///
    /// A zero-length normal yields NaN fields; see [`GroundPlane::try_new`].
    pub fn new(normal: Vector3<f32>, offset: f32) -> Self {
        let len = normal.magnitude();
        Self {
            normal: normal / len,
            offset: offset / len,
        }
    }

    pub fn try_new(normal: Vector3<f32>, offset: f32) -> Result<Self> {
        if normal.magnitude2() < PLANE_EPSILON * PLANE_EPSILON {
            return Err(Error::DegeneratePlane);
        }
        Ok(Self::new(normal, offset))
    }

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: Vector3<f32>, normal: Vector3<f32>) -> Self {
        let n = normal.normalize();
        Self {
            normal: n,
            offset: -n.dot(point),
        }
    }

    /// Horizontal plane `y = height`, facing up.
    pub fn y(height: f32) -> Self {
        Self {
            normal: Vector3::unit_y(),
            offset: -height,
        }
    }

    /// Signed distance of `point`, positive on the side the normal faces.
    pub fn signed_distance(&self, point: Vector3<f32>) -> f32 {
        self.normal.dot(point) + self.offset
    }

    /// The plane moved `epsilon` along its normal.
    ///
    /// This is the only offset convention used for shadow planes: a positive
    /// `epsilon` lifts the shadow toward the light, off the receiver.
    pub fn lifted(&self, epsilon: f32) -> Self {
        Self {
            normal: self.normal,
            offset: self.offset - epsilon,
        }
    }
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self::y(-1.0)
    }
}

/// Projection of points from `light` onto `plane`.
///
/// With `a = offset + normal . light`, rows 0..3 are
/// `(a * e_i - light_i * normal, -light_i * offset)` and row 3 is
/// `(-normal, a - offset)`. Points on the plane map to themselves.
///
/// Degenerate inputs are not corrected: with the light on the plane the
/// matrix collapses, and the light position itself maps to the zero vector
/// (`w = 0`). Validate with [`PlanarShadow::new`] first.
pub fn planar_shadow_matrix(light: Vector3<f32>, plane: &GroundPlane) -> Matrix4<f32> {
    let n = plane.normal;
    let d = plane.offset;
    let a = d + n.dot(light);

    let row = |i: usize, e: Vector3<f32>| {
        let r = e * a - n * light[i];
        Vector4::new(r.x, r.y, r.z, -light[i] * d)
    };

    // from_cols + transpose builds the matrix row by row.
    Matrix4::from_cols(
        row(0, Vector3::unit_x()),
        row(1, Vector3::unit_y()),
        row(2, Vector3::unit_z()),
        Vector4::new(-n.x, -n.y, -n.z, a - d),
    )
    .transpose()
}

/// Validated planar shadow for one light/plane pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarShadow {
    light: Vector3<f32>,
    plane: GroundPlane,
    matrix: Matrix4<f32>,
}

impl PlanarShadow {
    /// Checks the light is strictly on the normal side of `plane` and
    /// builds the shadow matrix.
    pub fn new(light: Vector3<f32>, plane: GroundPlane) -> Result<Self> {
        if !plane.normal.magnitude2().is_finite() || plane.normal.magnitude2() < 0.5 {
            return Err(Error::DegeneratePlane);
        }

        let distance = plane.signed_distance(light);
        if distance.abs() < PLANE_EPSILON {
            return Err(Error::LightOnPlane { distance });
        }
        if distance < 0.0 {
            return Err(Error::LightBelowPlane { distance });
        }

        Ok(Self {
            light,
            plane,
            matrix: planar_shadow_matrix(light, &plane),
        })
    }

    /// Shadow onto `ground` lifted by [`DEFAULT_SHADOW_LIFT`].
    pub fn on_ground(light: Vector3<f32>, ground: GroundPlane) -> Result<Self> {
        Self::new(light, ground.lifted(DEFAULT_SHADOW_LIFT))
    }

    pub fn light(&self) -> Vector3<f32> {
        self.light
    }

    pub fn plane(&self) -> &GroundPlane {
        &self.plane
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    /// Model matrix for drawing the caster's shadow.
    pub fn caster_model(&self, model: Matrix4<f32>) -> Matrix4<f32> {
        self.matrix * model
    }

    /// Full clip transform for the shadow draw.
    pub fn caster_view_projection(
        &self,
        camera_view_proj: Matrix4<f32>,
        model: Matrix4<f32>,
    ) -> Matrix4<f32> {
        camera_view_proj * self.caster_model(model)
    }
}
