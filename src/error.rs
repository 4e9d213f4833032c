//! Error types for precondition checks.
//!
//! The mesh builder and the shadow math are pure functions and never fail on
//! their own. Callers run the checks in this crate *before* invoking them
//! (plane/light validation, buffer capacity, index validation) and get one of
//! these errors back instead of a silently broken matrix or buffer.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Light lies on the shadow-receiving plane (signed distance {distance})")]
    LightOnPlane { distance: f32 },

    #[error("Light is below the shadow-receiving plane (signed distance {distance})")]
    LightBelowPlane { distance: f32 },

    #[error("Plane normal has zero length")]
    DegeneratePlane,

    #[error(
        "Subdivision level {level} needs {required_vertices} vertices / \
         {required_indices} indices, buffers hold {vertex_capacity} / {index_capacity}"
    )]
    CapacityExceeded {
        level: u32,
        required_vertices: usize,
        required_indices: usize,
        vertex_capacity: usize,
        index_capacity: usize,
    },

    #[error("Index {index} out of range for {vertex_count} vertices")]
    InvalidIndex { index: u32, vertex_count: usize },
}
