//! # Procedural Geometry Generation
//!
//! Geodesic sphere generation by recursive tetrahedron subdivision.
//!
//! ## Modes
//!
//! - **Shared edges** ([`SubdivisionMode::SharedEdges`]): each edge midpoint is
//!   created once through an [`EdgeMidpointCache`], the mesh stays watertight
//!   and holds no duplicate vertices.
//! - **Append-only** ([`SubdivisionMode::AppendOnly`]): three fresh vertices per
//!   triangle per level. Larger, but the vertex count is a fixed closed form,
//!   which is what callers pre-allocating GPU buffers size against.
//!
//! ## Usage
//!
//! ```rust
//! use geoshade::gfx::geometry::{build, build_with_mode, SubdivisionMode};
//!
//! // Watertight sphere, 64 triangles
//! let sphere = build(2);
//! assert_eq!(sphere.triangle_count(), 64);
//!
//! // Same triangle count, duplicated edge vertices
//! let sphere = build_with_mode(2, SubdivisionMode::AppendOnly);
//! assert_eq!(sphere.vertex_count(), 64);
//! ```

pub mod geodesic;
pub mod sphere;
pub mod vertex;

pub use geodesic::*;
pub use sphere::GeodesicSphere;
pub use vertex::Vertex3D;

use crate::error::{Error, Result};
use crate::gfx::math::{normalize_or_nan, vec3};

/// Highest subdivision level the interactive controls may request
pub const MAX_SUBDIVISION_LEVEL: u32 = 8;

/// Clamps a requested level into `[0, MAX_SUBDIVISION_LEVEL]`.
pub fn clamp_level(level: u32) -> u32 {
    if level > MAX_SUBDIVISION_LEVEL {
        log::warn!(
            "Subdivision level {} clamped to {}",
            level,
            MAX_SUBDIVISION_LEVEL
        );
    }
    level.min(MAX_SUBDIVISION_LEVEL)
}

/// Unwraps a checked count, saturating at `usize::MAX`.
const fn saturate(count: Option<usize>) -> usize {
    match count {
        Some(count) => count,
        None => usize::MAX,
    }
}

/// Triangles produced at `level`: `4 * 4^level`, `None` on overflow
pub const fn checked_triangle_count(level: u32) -> Option<usize> {
    match level.checked_add(1) {
        Some(exponent) => 4usize.checked_pow(exponent),
        None => None,
    }
}

/// Indices produced at `level`: `12 * 4^level`, `None` on overflow
pub const fn checked_index_count(level: u32) -> Option<usize> {
    match checked_triangle_count(level) {
        Some(triangles) => triangles.checked_mul(3),
        None => None,
    }
}

/// Vertices produced by append-only subdivision at `level`, `None` on
/// overflow.
///
/// `V(0) = 4`, `V(L) = V(L-1) + 3 * T(L-1)`. Shared-edge meshes never exceed
/// this, so it is also the vertex bound used to size buffers.
pub const fn checked_append_only_vertex_count(level: u32) -> Option<usize> {
    let mut vertices: usize = 4;
    let mut l = 0;
    while l < level {
        let added = match checked_index_count(l) {
            Some(added) => added,
            None => return None,
        };
        vertices = match vertices.checked_add(added) {
            Some(vertices) => vertices,
            None => return None,
        };
        l += 1;
    }
    Some(vertices)
}

/// Vertices produced by shared-edge subdivision at `level`:
/// `2 + 2 * 4^level`, `None` on overflow
pub const fn checked_shared_vertex_count(level: u32) -> Option<usize> {
    match checked_triangle_count(level) {
        // 2 * 4^level is half the triangle count
        Some(triangles) => (triangles / 2).checked_add(2),
        None => None,
    }
}

/// Vertices produced at `level` in the given mode, `None` on overflow.
pub const fn checked_vertex_count(level: u32, mode: SubdivisionMode) -> Option<usize> {
    match mode {
        SubdivisionMode::SharedEdges => checked_shared_vertex_count(level),
        SubdivisionMode::AppendOnly => checked_append_only_vertex_count(level),
    }
}

/// Triangles produced at `level`, saturating at `usize::MAX`
pub const fn triangle_count(level: u32) -> usize {
    saturate(checked_triangle_count(level))
}

/// Indices produced at `level`, saturating at `usize::MAX`
pub const fn index_count(level: u32) -> usize {
    saturate(checked_index_count(level))
}

/// See [`checked_append_only_vertex_count`]; saturates at `usize::MAX`.
pub const fn append_only_vertex_count(level: u32) -> usize {
    saturate(checked_append_only_vertex_count(level))
}

/// See [`checked_shared_vertex_count`]; saturates at `usize::MAX`.
pub const fn shared_vertex_count(level: u32) -> usize {
    saturate(checked_shared_vertex_count(level))
}

pub const fn vertex_count(level: u32, mode: SubdivisionMode) -> usize {
    saturate(checked_vertex_count(level, mode))
}

/// Fixed vertex/index storage reserved by a caller.
///
/// Size it for the *maximum* level that will ever be requested, not the
/// current one: the level can be raised interactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity {
    pub vertices: usize,
    pub indices: usize,
}

impl BufferCapacity {
    /// Capacity that holds any mesh up to `max_level` in either mode.
    pub const fn for_level(max_level: u32) -> Self {
        Self {
            vertices: append_only_vertex_count(max_level),
            indices: index_count(max_level),
        }
    }

    /// Errors when a mesh at `level` in `mode` would not fit.
    ///
    /// Counts too large for `usize` are reported as `usize::MAX`.
    pub fn check(&self, level: u32, mode: SubdivisionMode) -> Result<()> {
        let required_vertices = checked_vertex_count(level, mode);
        let required_indices = checked_index_count(level);

        let fits = matches!(required_vertices, Some(v) if v <= self.vertices)
            && matches!(required_indices, Some(i) if i <= self.indices);
        if !fits {
            let required_vertices = saturate(required_vertices);
            let required_indices = saturate(required_indices);
            return Err(Error::CapacityExceeded {
                level,
                required_vertices,
                required_indices,
                vertex_capacity: self.vertices,
                index_capacity: self.indices,
            });
        }
        Ok(())
    }

    /// Position buffer size in bytes (`3 * f32` per vertex)
    pub const fn position_bytes(&self) -> usize {
        self.vertices.saturating_mul(std::mem::size_of::<[f32; 3]>())
    }

    /// Index buffer size in bytes (`u32` indices)
    pub const fn index_bytes(&self) -> usize {
        self.indices.saturating_mul(std::mem::size_of::<u32>())
    }
}

/// Generated geometry ready for upload: positions plus triangle indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding, 3 per triangle)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as corner triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Flat position buffer, 3 floats per vertex.
    pub fn position_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw index bytes for upload.
    pub fn index_data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Checks that every index references an existing vertex.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.positions.len();
        match self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            Some(&index) => Err(Error::InvalidIndex {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Interleaved vertices for the renderer.
    ///
    /// Positions on the unit sphere are their own normals; other meshes get
    /// their position direction as a smooth approximation.
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.positions
            .iter()
            .map(|&position| Vertex3D {
                position,
                normal: normalize_or_nan(vec3(position)).into(),
            })
            .collect()
    }
}
