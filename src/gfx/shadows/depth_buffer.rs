//! CPU depth map.
//!
//! Reference implementation of the shadow depth pass: caster triangles are
//! rasterized from the light with a less-than depth test and no culling, and
//! the result is sampled with nearest-texel lookups. Useful for tests and for
//! tools that need shadow queries without a GPU.

use cgmath::{Matrix4, Vector2};

use super::depth_map::{DepthSampler, ShadowCoord, ShadowMapConfig};
use crate::gfx::geometry::Mesh;
use crate::gfx::math::vec3;

/// Depth a cleared texel holds
pub const FAR_DEPTH: f32 = 1.0;

/// Square single-channel depth buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    size: u32,
    texels: Vec<f32>,
}

impl DepthMap {
    pub fn new(size: u32) -> Self {
        let size = size.max(1);
        Self {
            size,
            texels: vec![FAR_DEPTH; size as usize * size as usize],
        }
    }

    pub fn from_config(config: &ShadowMapConfig) -> Self {
        Self::new(config.resolution)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn texels(&self) -> &[f32] {
        &self.texels
    }

    pub fn clear(&mut self) {
        self.texels.fill(FAR_DEPTH);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.size as usize + x as usize
    }

    pub fn texel(&self, x: u32, y: u32) -> f32 {
        self.texels[self.offset(x, y)]
    }

    /// Writes `depth` at `(x, y)` if it is nearer than what is stored.
    pub fn write(&mut self, x: u32, y: u32, depth: f32) -> bool {
        let offset = self.offset(x, y);
        let slot = &mut self.texels[offset];
        if depth < *slot {
            *slot = depth;
            true
        } else {
            false
        }
    }

    fn texel_of(&self, uv: Vector2<f32>) -> (u32, u32) {
        let max = (self.size - 1) as f32;
        let x = (uv.x * self.size as f32).floor().clamp(0.0, max);
        let y = (uv.y * self.size as f32).floor().clamp(0.0, max);
        (x as u32, y as u32)
    }

    /// Renders `mesh` transformed by `model` into the map.
    ///
    /// Triangles with a vertex behind the light are skipped rather than
    /// clipped. Returns the number of texels that were updated.
    pub fn render_mesh(
        &mut self,
        light_view_proj: &Matrix4<f32>,
        model: &Matrix4<f32>,
        mesh: &Mesh,
    ) -> usize {
        let transform = *light_view_proj * *model;
        let mut written = 0;

        for [a, b, c] in mesh.triangles() {
            let corners = [a, b, c]
                .map(|i| ShadowCoord::project(&transform, vec3(mesh.positions[i as usize])));
            if let [Some(a), Some(b), Some(c)] = corners {
                written += self.rasterize(a, b, c);
            }
        }

        log::trace!(
            "Depth pass: {} triangles, {} texels written",
            mesh.triangle_count(),
            written
        );
        written
    }

    fn rasterize(&mut self, a: ShadowCoord, b: ShadowCoord, c: ShadowCoord) -> usize {
        let size = self.size as f32;
        let (pa, pb, pc) = (a.uv * size, b.uv * size, c.uv * size);

        let area = edge(pa, pb, pc);
        if area.abs() < f32::EPSILON {
            return 0;
        }

        let min_x = pa.x.min(pb.x).min(pc.x).floor().max(0.0);
        let min_y = pa.y.min(pb.y).min(pc.y).floor().max(0.0);
        let max_x = pa.x.max(pb.x).max(pc.x).ceil().min(size);
        let max_y = pa.y.max(pb.y).max(pc.y).ceil().min(size);
        if min_x >= max_x || min_y >= max_y {
            return 0;
        }

        let mut written = 0;
        for y in min_y as u32..max_y as u32 {
            for x in min_x as u32..max_x as u32 {
                let p = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(pb, pc, p) / area;
                let w1 = edge(pc, pa, p) / area;
                let w2 = edge(pa, pb, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // NDC depth is affine in screen space.
                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                if (0.0..=1.0).contains(&depth) && self.write(x, y, depth) {
                    written += 1;
                }
            }
        }
        written
    }
}

fn edge(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl DepthSampler for DepthMap {
    fn sample_depth(&self, uv: Vector2<f32>) -> f32 {
        let (x, y) = self.texel_of(uv);
        self.texel(x, y)
    }
}
