//! # Geoshade Prelude
//!
//! Commonly used types and traits in one import:
//!
//! ```rust
//! use geoshade::gfx::math::is_finite_matrix;
//! use geoshade::prelude::*;
//!
//! let sphere = GeodesicSphere::with_level(2, SubdivisionMode::SharedEdges);
//! let shadow = PlanarShadow::on_ground(Vector3::new(0.0, 4.0, 2.0), GroundPlane::y(-1.0))?;
//! assert_eq!(sphere.mesh().triangle_count(), 64);
//! assert!(is_finite_matrix(&shadow.matrix()));
//! # Ok::<(), Error>(())
//! ```

// Re-export errors
pub use crate::error::{Error, Result};

// Re-export geometry types
pub use crate::gfx::geometry::{
    build, build_with_mode, BufferCapacity, GeodesicSphere, Mesh, SubdivisionMode, Vertex3D,
};

// Re-export camera and frame types
pub use crate::gfx::camera::{Camera, LookAtCamera};
pub use crate::gfx::frame::{FrameConfig, FrameOutput, FrameState};

// Re-export shadow types
pub use crate::gfx::shadows::{
    DepthMap, DepthSampler, GroundPlane, LightConfig, LightView, PlanarShadow, ShadowCache,
    ShadowCoord, ShadowMapConfig, ShadowTechnique, ShadowUniform,
};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};
