// src/lib.rs
//! Geoshade
//!
//! Geodesic spheres built by recursive tetrahedron subdivision, plus the
//! shadow math a real-time renderer needs to ground them: a planar
//! projection matrix and a light-space depth map. Backend agnostic; every
//! GPU-facing value is exposed as `bytemuck` plain data.

pub mod error;
pub mod gfx;
pub mod prelude;

pub use error::{Error, Result};
