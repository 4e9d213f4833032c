//! # Vertex Data Structures
//!
//! GPU-compatible interleaved vertex format handed to the rendering backend.

/// A 3D vertex with position and normal data.
///
/// # Memory Layout
///
/// `#[repr(C)]` keeps the C-compatible layout the backend's vertex buffer
/// description relies on:
///
/// - offset 0: position, 3 x `f32` (shader location 0)
/// - offset 12: normal, 3 x `f32` (shader location 1)
///
/// # Examples
///
/// ```
/// use geoshade::gfx::geometry::{build, Vertex3D};
///
/// let vertices = build(1).to_vertices();
/// let bytes: &[u8] = bytemuck::cast_slice(&vertices);
/// assert_eq!(bytes.len(), vertices.len() * Vertex3D::STRIDE);
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
}

impl Vertex3D {
    /// Bytes between consecutive vertices
    pub const STRIDE: usize = std::mem::size_of::<Vertex3D>();
    /// Byte offset of `position`
    pub const POSITION_OFFSET: usize = 0;
    /// Byte offset of `normal`
    pub const NORMAL_OFFSET: usize = std::mem::size_of::<[f32; 3]>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(Vertex3D::STRIDE, 24);
        assert_eq!(std::mem::offset_of!(Vertex3D, position), Vertex3D::POSITION_OFFSET);
        assert_eq!(std::mem::offset_of!(Vertex3D, normal), Vertex3D::NORMAL_OFFSET);
    }

    #[test]
    fn test_sphere_normals_match_positions() {
        let vertices = crate::gfx::geometry::build(2).to_vertices();
        for v in &vertices {
            for axis in 0..3 {
                assert!((v.position[axis] - v.normal[axis]).abs() < 1e-5);
            }
        }
    }
}
