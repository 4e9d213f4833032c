//! # Geodesic Sphere Subdivision
//!
//! A regular tetrahedron inscribed in the unit sphere is refined level by
//! level. Every triangle `(i0, i1, i2)` is split into four through its edge
//! midpoints `m01`, `m12`, `m20`, which are pushed back onto the sphere:
//!
//! ```text
//!              i0
//!              /\
//!             /  \
//!        m01 /____\ m20
//!           /\    /\
//!          /  \  /  \
//!         /____\/____\
//!       i1     m12     i2
//! ```
//!
//! Each parent triangle emits one fixed 12-index block:
//!
//! ```text
//! offset   0    1    2    3    4    5    6    7    8    9   10   11
//!         i0  m01  m20  m01  m12  m20  m12  m01   i1  m20  m12   i2
//! ```
//!
//! All four children keep the parent's counter-clockwise winding. The layout
//! puts the parent corners at offsets 0, 8 and 11, which is what lets
//! [`coarsen_indices`] recover the previous level from the index buffer
//! alone.

use std::collections::HashMap;
use std::f32::consts::SQRT_2;

use super::Mesh;
use crate::gfx::math::unit_midpoint;

const SQRT_6: f32 = 2.449_489_7;

/// Corners of the base tetrahedron, all at unit distance from the origin.
#[rustfmt::skip]
pub const TETRAHEDRON_VERTICES: [[f32; 3]; 4] = [
    [ 0.0,                 0.0,                1.0       ],
    [ 0.0,                 2.0 * SQRT_2 / 3.0, -1.0 / 3.0],
    [-SQRT_6 / 3.0,       -SQRT_2 / 3.0,       -1.0 / 3.0],
    [ SQRT_6 / 3.0,       -SQRT_2 / 3.0,       -1.0 / 3.0],
];

/// Faces of the base tetrahedron, counter-clockwise seen from outside.
#[rustfmt::skip]
pub const TETRAHEDRON_INDICES: [u32; 12] = [
    0, 1, 2,
    3, 2, 1,
    0, 3, 1,
    0, 2, 3,
];

/// Indices emitted per parent triangle
pub const BLOCK_LEN: usize = 12;

/// Offsets of the parent corners `i0`, `i1`, `i2` inside a block
pub const CORNER_OFFSETS: [usize; 3] = [0, 8, 11];

/// How edge midpoints are created during a subdivision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubdivisionMode {
    /// Midpoints are shared between the two triangles of an edge
    #[default]
    SharedEdges,
    /// Every triangle creates its own three midpoints
    AppendOnly,
}

/// The base tetrahedron as a mesh.
pub fn tetrahedron() -> Mesh {
    Mesh {
        positions: TETRAHEDRON_VERTICES.to_vec(),
        indices: TETRAHEDRON_INDICES.to_vec(),
    }
}

/// Maps an unordered edge to the midpoint vertex already created for it.
///
/// Lives for one subdivision pass. Looking up `(a, b)` and `(b, a)` returns
/// the same vertex, which keeps the refined mesh watertight.
#[derive(Debug, Default)]
pub struct EdgeMidpointCache {
    midpoints: HashMap<(u32, u32), u32>,
}

impl EdgeMidpointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache sized for a pass over `triangles` triangles of a closed mesh.
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            midpoints: HashMap::with_capacity(triangles * 3 / 2),
        }
    }

    /// Returns the midpoint vertex of edge `(a, b)`, appending it to
    /// `positions` the first time the edge is seen.
    pub fn midpoint(&mut self, a: u32, b: u32, positions: &mut Vec<[f32; 3]>) -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *self
            .midpoints
            .entry(key)
            .or_insert_with(|| push_midpoint(positions, a, b))
    }

    /// Number of distinct edges seen so far.
    pub fn len(&self) -> usize {
        self.midpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.midpoints.is_empty()
    }
}

fn push_midpoint(positions: &mut Vec<[f32; 3]>, a: u32, b: u32) -> u32 {
    let mid = unit_midpoint(positions[a as usize], positions[b as usize]);
    let index = positions.len() as u32;
    positions.push(mid);
    index
}

/// Where one parent triangle went during a subdivision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleSplit {
    /// Parent corners `[i0, i1, i2]`
    pub corners: [u32; 3],
    /// Midpoint vertices `[m01, m12, m20]`
    pub midpoints: [u32; 3],
}

impl TriangleSplit {
    /// The 12-index block this split emits.
    pub fn indices(&self) -> [u32; BLOCK_LEN] {
        let [i0, i1, i2] = self.corners;
        let [m01, m12, m20] = self.midpoints;
        #[rustfmt::skip]
        let block = [
            i0,  m01, m20,
            m01, m12, m20,
            m12, m01, i1,
            m20, m12, i2,
        ];
        block
    }
}

/// Output of one subdivision pass over an index buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subdivision {
    /// Refined index buffer, one 12-index block per parent triangle
    pub indices: Vec<u32>,
    /// One record per parent triangle, in parent order
    pub splits: Vec<TriangleSplit>,
}

/// Splits every triangle of `indices` into four, appending the new
/// midpoint vertices to `positions`.
///
/// `indices` must reference valid entries of `positions`; a trailing partial
/// triangle is ignored.
pub fn subdivide_indices(
    positions: &mut Vec<[f32; 3]>,
    indices: &[u32],
    mode: SubdivisionMode,
) -> Subdivision {
    let triangles = indices.len() / 3;
    let mut refined = Vec::with_capacity(triangles * BLOCK_LEN);
    let mut splits = Vec::with_capacity(triangles);

    let mut cache = match mode {
        SubdivisionMode::SharedEdges => Some(EdgeMidpointCache::with_capacity(triangles)),
        SubdivisionMode::AppendOnly => None,
    };

    for triangle in indices.chunks_exact(3) {
        let (i0, i1, i2) = (triangle[0], triangle[1], triangle[2]);

        let midpoints = match cache.as_mut() {
            Some(cache) => [
                cache.midpoint(i0, i1, positions),
                cache.midpoint(i1, i2, positions),
                cache.midpoint(i2, i0, positions),
            ],
            None => [
                push_midpoint(positions, i0, i1),
                push_midpoint(positions, i1, i2),
                push_midpoint(positions, i2, i0),
            ],
        };

        let split = TriangleSplit {
            corners: [i0, i1, i2],
            midpoints,
        };
        refined.extend_from_slice(&split.indices());
        splits.push(split);
    }

    Subdivision {
        indices: refined,
        splits,
    }
}

/// Recovers the previous level's triangles from a subdivided index buffer.
///
/// Reads the corners at offsets 0, 8 and 11 of every 12-index block. The
/// midpoint vertices are left in place, unreferenced; a trailing partial
/// block is ignored.
pub fn coarsen_indices(indices: &[u32]) -> Vec<u32> {
    indices
        .chunks_exact(BLOCK_LEN)
        .flat_map(|block| CORNER_OFFSETS.map(|offset| block[offset]))
        .collect()
}

/// One subdivision level applied to `mesh`, returned as a new mesh.
pub fn subdivide(mesh: &Mesh, mode: SubdivisionMode) -> Mesh {
    let mut positions = mesh.positions.clone();
    let Subdivision { indices, .. } = subdivide_indices(&mut positions, &mesh.indices, mode);
    Mesh { positions, indices }
}

/// Unit geodesic sphere at `level` with shared edge midpoints.
pub fn build(level: u32) -> Mesh {
    build_with_mode(level, SubdivisionMode::SharedEdges)
}

/// Unit geodesic sphere at `level`.
///
/// Pure: the same `level` and `mode` always give the same mesh. Levels are
/// not clamped here, see [`super::clamp_level`].
pub fn build_with_mode(level: u32, mode: SubdivisionMode) -> Mesh {
    let mut mesh = tetrahedron();
    for l in 0..level {
        mesh = subdivide(&mesh, mode);
        log::trace!(
            "Subdivision level {} ({:?}): {} vertices, {} triangles",
            l + 1,
            mode,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }
    mesh
}
