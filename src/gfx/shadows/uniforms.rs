//! Shadow uniform block shared with the shaders.
//!
//! One `#[repr(C)]` block per frame carrying the light, both shadow matrices
//! and the depth-test parameters. The layout MUST match the uniform struct
//! declared in the shaders; offsets are exported as constants for backends
//! that write the matrices individually.

use cgmath::Matrix4;

use super::depth_map::ShadowMapConfig;
use super::ShadowTechnique;
use crate::gfx::math::convert_matrix4_to_array;

/// Byte offset of the planar shadow matrix
pub const SHADOW_MATRIX_OFFSET: usize = 32;
/// Byte offset of the light view-projection matrix
pub const LIGHT_VIEW_PROJ_OFFSET: usize = 96;
/// Byte offset of the depth-test parameters
pub const PARAMS_OFFSET: usize = 160;
/// Total size of [`ShadowUniform`] in bytes
pub const SHADOW_UNIFORM_SIZE: usize = 176;

/// Light description driving both shadow techniques
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 4.0, 2.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

/// Uniform buffer content
///
/// Matrices are column-major.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    pub light_position: [f32; 4], // w = 1
    pub light_color: [f32; 3],
    pub light_intensity: f32,
    pub shadow_matrix: [[f32; 4]; 4], // planar projection onto the ground
    pub light_view_proj: [[f32; 4]; 4], // depth-map pass transform
    pub bias: f32,
    pub shadowed_visibility: f32,
    pub shadow_map_size: f32,
    pub technique: u32,
}
// Total: 16 + 12 + 4 + 64 + 64 + 4 * 4 = 176 bytes

impl ShadowUniform {
    pub fn new(
        light: &LightConfig,
        shadow_matrix: Matrix4<f32>,
        light_view_proj: Matrix4<f32>,
        config: &ShadowMapConfig,
        technique: ShadowTechnique,
    ) -> Self {
        let [x, y, z] = light.position;
        Self {
            light_position: [x, y, z, 1.0],
            light_color: light.color,
            light_intensity: light.intensity,
            shadow_matrix: convert_matrix4_to_array(shadow_matrix),
            light_view_proj: convert_matrix4_to_array(light_view_proj),
            bias: config.bias,
            shadowed_visibility: config.shadowed_visibility,
            shadow_map_size: config.resolution as f32,
            technique: technique as u32,
        }
    }

    /// Bytes to write into the uniform buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
