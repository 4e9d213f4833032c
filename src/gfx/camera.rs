//! View and projection construction.
//!
//! Orbit controls live in the host application; this module only builds the
//! matrices. Both the viewer camera and the shadow-casting light use the same
//! look-at + perspective construction through the [`Camera`] trait.

use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait Camera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

/// Right-handed look-at view matrix.
pub fn look_at(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::look_at_rh(Point3::from_vec(eye), Point3::from_vec(target), up)
}

/// Perspective projection producing depth in `[0, 1]` after the `w` divide.
pub fn perspective_projection(fovy: Rad<f32>, aspect: f32, znear: f32, zfar: f32) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX * perspective(fovy, aspect, znear, zfar)
}

/// A fixed viewer camera.
#[derive(Debug, Clone, Copy)]
pub struct LookAtCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl LookAtCamera {
    pub fn new(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        Self {
            eye,
            target,
            up: Vector3::unit_y(),
            aspect,
            fovy: cgmath::Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}

impl Camera for LookAtCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = look_at(self.eye, self.target, self.up);
        let proj = perspective_projection(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}
