//! Interactive geodesic sphere whose level is driven by UI controls.

use super::{
    append_only_vertex_count, build_with_mode, clamp_level, coarsen_indices, subdivide_indices,
    BufferCapacity, Mesh, SubdivisionMode,
};

/// A sphere mesh plus the level bookkeeping a renderer needs.
///
/// Every level change swaps in a complete mesh; the old one is dropped only
/// after the new one is built. The highest level ever reached is tracked so
/// GPU buffers can be sized once for it.
///
/// In [`SubdivisionMode::AppendOnly`] level changes are incremental: going up
/// subdivides the current index buffer, going down coarsens it. Coarsening
/// leaves the midpoint vertices orphaned at the end of the position buffer;
/// they are reclaimed by the next subdivision.
#[derive(Debug, Clone)]
pub struct GeodesicSphere {
    mode: SubdivisionMode,
    level: u32,
    max_level_reached: u32,
    mesh: Mesh,
}

impl GeodesicSphere {
    /// Creates the level-0 sphere (the base tetrahedron).
    pub fn new(mode: SubdivisionMode) -> Self {
        Self::with_level(0, mode)
    }

    pub fn with_level(level: u32, mode: SubdivisionMode) -> Self {
        let level = clamp_level(level);
        Self {
            mode,
            level,
            max_level_reached: level,
            mesh: build_with_mode(level, mode),
        }
    }

    pub fn mode(&self) -> SubdivisionMode {
        self.mode
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level_reached(&self) -> u32 {
        self.max_level_reached
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    /// Buffer capacity covering every level reached so far.
    pub fn capacity(&self) -> BufferCapacity {
        BufferCapacity::for_level(self.max_level_reached)
    }

    /// Vertices referenced by the current index buffer.
    ///
    /// Equal to `mesh().vertex_count()` except after an append-only coarsen.
    pub fn live_vertex_count(&self) -> usize {
        match self.mode {
            SubdivisionMode::SharedEdges => self.mesh.vertex_count(),
            SubdivisionMode::AppendOnly => append_only_vertex_count(self.level),
        }
    }

    pub fn increase_level(&mut self) -> bool {
        self.set_level(self.level + 1)
    }

    pub fn decrease_level(&mut self) -> bool {
        match self.level.checked_sub(1) {
            Some(level) => self.set_level(level),
            None => false,
        }
    }

    /// Moves to `level` (clamped). Returns whether the mesh changed.
    pub fn set_level(&mut self, level: u32) -> bool {
        let level = clamp_level(level);
        if level == self.level {
            return false;
        }

        let mesh = match self.mode {
            SubdivisionMode::SharedEdges => build_with_mode(level, self.mode),
            SubdivisionMode::AppendOnly => self.step_append_only(level),
        };

        log::debug!(
            "Geodesic sphere level {} -> {}: {} vertices, {} triangles",
            self.level,
            level,
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        self.mesh = mesh;
        self.level = level;
        self.max_level_reached = self.max_level_reached.max(level);
        true
    }

    fn step_append_only(&self, target: u32) -> Mesh {
        let mut positions = self.mesh.positions.clone();
        let mut indices = self.mesh.indices.clone();
        let mut level = self.level;

        while level > target {
            indices = coarsen_indices(&indices);
            level -= 1;
        }

        if level < target {
            // Drop vertices orphaned by earlier coarsening before appending.
            positions.truncate(append_only_vertex_count(level));
            while level < target {
                indices = subdivide_indices(&mut positions, &indices, self.mode).indices;
                level += 1;
            }
        }

        Mesh { positions, indices }
    }
}

impl Default for GeodesicSphere {
    fn default() -> Self {
        Self::new(SubdivisionMode::default())
    }
}
