//! # Shadow Projection
//!
//! Two techniques for shadows cast by a point light:
//!
//! - **Planar** ([`planar`]) - a projective matrix flattens the caster onto a
//!   ground plane; the caster is drawn again with it as an extra model term.
//! - **Depth map** ([`depth_map`]) - the caster is rendered from the light
//!   into a depth map, and every main-pass fragment compares its light-space
//!   depth against it.
//!
//! Supporting pieces: a CPU reference depth map ([`depth_buffer`]), the
//! shadow cache ([`cache`]) and the uniform block layout ([`uniforms`]).

pub mod cache;
pub mod depth_buffer;
pub mod depth_map;
pub mod planar;
pub mod uniforms;

pub use cache::{CasterState, LightState, ShadowCache};
pub use depth_buffer::DepthMap;
pub use depth_map::{
    light_view_projection, shade, shadow_visibility, world_visibility, DepthSampler, LightView,
    ShadowCoord, ShadowMapConfig,
};
pub use planar::{planar_shadow_matrix, GroundPlane, PlanarShadow};
pub use uniforms::{LightConfig, ShadowUniform};

/// Which shadow technique a frame renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ShadowTechnique {
    None = 0,
    #[default]
    Planar = 1,
    DepthMap = 2,
}
