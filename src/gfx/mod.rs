//! # Graphics Module
//!
//! Geometry, camera and shadow math for the geodesic shadow renderer.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - Tetrahedron subdivision into geodesic spheres
//! - **Camera** ([`camera`]) - Look-at view and perspective projection
//! - **Shadows** ([`shadows`]) - Planar and depth-map shadow projection
//! - **Frame** ([`frame`]) - Per-frame configuration, animation and caching
//! - **Math** ([`math`]) - Small vector and matrix helpers shared by the above
//!
//! ## Usage
//!
//! ```rust
//! use geoshade::gfx::{FrameConfig, FrameState};
//!
//! let config = FrameConfig::default();
//! let mut state = FrameState::new(&config);
//!
//! let output = state.update(&config, 1.0 / 60.0).unwrap();
//! assert!(output.shadows_changed);
//! assert_eq!(output.uniform.as_bytes().len(), 176);
//! ```

pub mod camera;
pub mod frame;
pub mod geometry;
pub mod math;
pub mod shadows;

// Re-export commonly used types
pub use camera::{Camera, LookAtCamera};
pub use frame::{FrameConfig, FrameOutput, FrameState};
pub use geometry::{GeodesicSphere, Mesh, SubdivisionMode};
pub use shadows::{PlanarShadow, ShadowTechnique, ShadowUniform};
