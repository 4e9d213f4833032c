//! Depth-map shadows.
//!
//! The caster is rendered once from the light with [`light_view_projection`]
//! as its only transform, writing light-space depth into a square map. The
//! main pass then projects each fragment with the same matrix, looks up the
//! stored depth and darkens the direct lighting when something nearer to the
//! light was recorded there. The depth pass must be encoded before the main
//! pass that samples it.

use cgmath::{InnerSpace, Matrix4, Rad, Vector2, Vector3};

use crate::gfx::camera::{look_at, perspective_projection, Camera};
use crate::gfx::math::transform_homogeneous;

/// Shadow-map resolution in texels per side
pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 2048;

/// Depth bias against shadow acne
pub const DEFAULT_DEPTH_BIAS: f32 = 0.005;

/// Fraction of direct light that survives in shadow
pub const DEFAULT_SHADOWED_VISIBILITY: f32 = 0.4;

/// Tunables of the depth-map test.
///
/// `bias` trades acne (too small) against shadows detaching from their
/// casters (too large).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowMapConfig {
    pub resolution: u32,
    pub bias: f32,
    pub shadowed_visibility: f32,
}

impl Default for ShadowMapConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_SHADOW_MAP_SIZE,
            bias: DEFAULT_DEPTH_BIAS,
            shadowed_visibility: DEFAULT_SHADOWED_VISIBILITY,
        }
    }
}

/// Look-at + perspective from the light, depth in `[0, 1]`.
///
/// The map is square, so the aspect ratio is fixed to 1.
pub fn light_view_projection(
    light: Vector3<f32>,
    target: Vector3<f32>,
    up: Vector3<f32>,
    fovy: Rad<f32>,
    near: f32,
    far: f32,
) -> Matrix4<f32> {
    perspective_projection(fovy, 1.0, near, far) * look_at(light, target, up)
}

/// The light's view volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightView {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub near: f32,
    pub far: f32,
}

/// Above this `|cos|` between the view direction and +Y, `up` switches to +Z
const VERTICAL_VIEW_COS: f32 = 0.999;

/// Up vector for a view along `direction`: +Y, or +Z when looking
/// (nearly) straight up or down.
pub fn view_up(direction: Vector3<f32>) -> Vector3<f32> {
    let len = direction.magnitude();
    if len > 0.0 && (direction.y / len).abs() > VERTICAL_VIEW_COS {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    }
}

impl LightView {
    /// 90 degree light frustum from `position` toward `target`.
    pub fn new(position: Vector3<f32>, target: Vector3<f32>) -> Self {
        Self {
            position,
            target,
            up: view_up(target - position),
            fovy: Rad(std::f32::consts::FRAC_PI_2),
            near: 0.1,
            far: 50.0,
        }
    }
}

impl Camera for LightView {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        light_view_projection(
            self.position,
            self.target,
            self.up,
            self.fovy,
            self.near,
            self.far,
        )
    }
}

/// A world position expressed in shadow-map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCoord {
    /// Texture coordinates, `v` pointing down
    pub uv: Vector2<f32>,
    /// Light-space depth, `[0, 1]` inside the view volume
    pub depth: f32,
}

impl ShadowCoord {
    /// Projects `world` with the light's view-projection.
    ///
    /// `None` for points at or behind the light plane (`w <= 0`).
    pub fn project(light_view_proj: &Matrix4<f32>, world: Vector3<f32>) -> Option<Self> {
        let clip = transform_homogeneous(light_view_proj, world);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Self {
            uv: Vector2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5),
            depth: ndc.z,
        })
    }

    /// True when the coordinate falls inside the map and the depth range.
    pub fn in_frustum(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.uv.x) && unit.contains(&self.uv.y) && unit.contains(&self.depth)
    }
}

/// Read access to a rendered depth map.
pub trait DepthSampler {
    /// Stored depth at `uv`, with `uv` inside `[0, 1]`.
    fn sample_depth(&self, uv: Vector2<f32>) -> f32;
}

/// Visibility of a point with the given shadow coordinate.
///
/// Shadowed when its depth exceeds the stored depth plus the bias. Points
/// outside the light's view volume are treated as lit.
pub fn shadow_visibility<S: DepthSampler + ?Sized>(
    coord: Option<ShadowCoord>,
    sampler: &S,
    config: &ShadowMapConfig,
) -> f32 {
    match coord {
        Some(coord) if coord.in_frustum() => {
            let stored = sampler.sample_depth(coord.uv);
            if coord.depth > stored + config.bias {
                config.shadowed_visibility
            } else {
                1.0
            }
        }
        _ => 1.0,
    }
}

/// Projects `world` and runs [`shadow_visibility`].
pub fn world_visibility<S: DepthSampler + ?Sized>(
    light_view_proj: &Matrix4<f32>,
    world: Vector3<f32>,
    sampler: &S,
    config: &ShadowMapConfig,
) -> f32 {
    shadow_visibility(ShadowCoord::project(light_view_proj, world), sampler, config)
}

/// Outgoing radiance: ambient is untouched, direct light is attenuated.
pub fn shade(ambient: Vector3<f32>, direct: Vector3<f32>, visibility: f32) -> Vector3<f32> {
    ambient + direct * visibility
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    struct ConstantDepth(f32);

    impl DepthSampler for ConstantDepth {
        fn sample_depth(&self, _uv: Vector2<f32>) -> f32 {
            self.0
        }
    }

    fn overhead_light() -> LightView {
        let mut light = LightView::new(Vector3::new(0.0, 10.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        light.up = Vector3::unit_z();
        light.fovy = Deg(60.0).into();
        light.near = 1.0;
        light.far = 20.0;
        light
    }

    #[test]
    fn test_target_maps_to_map_center() {
        let vp = overhead_light().build_view_projection_matrix();
        let coord = ShadowCoord::project(&vp, Vector3::new(0.0, 0.0, 0.0)).unwrap();
        assert!((coord.uv.x - 0.5).abs() < 1e-5);
        assert!((coord.uv.y - 0.5).abs() < 1e-5);
        assert!(coord.depth > 0.0 && coord.depth < 1.0);
        assert!(coord.in_frustum());
    }

    #[test]
    fn test_depth_grows_away_from_light() {
        let vp = overhead_light().build_view_projection_matrix();
        let high = ShadowCoord::project(&vp, Vector3::new(0.0, 5.0, 0.0)).unwrap();
        let low = ShadowCoord::project(&vp, Vector3::new(0.0, -5.0, 0.0)).unwrap();
        assert!(high.depth < low.depth);
    }

    #[test]
    fn test_v_axis_is_flipped() {
        // Looking down -y with up = +z, world +z is "up" on the map.
        let vp = overhead_light().build_view_projection_matrix();
        let coord = ShadowCoord::project(&vp, Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert!(coord.uv.y < 0.5);
    }

    #[test]
    fn test_points_behind_light_have_no_coord() {
        let vp = overhead_light().build_view_projection_matrix();
        assert!(ShadowCoord::project(&vp, Vector3::new(0.0, 15.0, 0.0)).is_none());
    }

    #[test]
    fn test_light_straight_above_target_stays_finite() {
        let light = LightView::new(Vector3::new(0.0, 4.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(light.up, Vector3::unit_z());
        let vp = light.build_view_projection_matrix();
        assert!(crate::gfx::math::is_finite_matrix(&vp));

        let coord = ShadowCoord::project(&vp, Vector3::new(0.0, 0.0, 0.0)).unwrap();
        assert!((coord.uv.x - 0.5).abs() < 1e-5);

        let slanted = LightView::new(Vector3::new(2.0, 4.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(slanted.up, Vector3::unit_y());
    }

    #[test]
    fn test_visibility_rule() {
        let config = ShadowMapConfig::default();
        let sampler = ConstantDepth(0.5);
        let at = |depth| {
            Some(ShadowCoord {
                uv: Vector2::new(0.5, 0.5),
                depth,
            })
        };

        // In front of the recorded surface.
        assert_eq!(shadow_visibility(at(0.3), &sampler, &config), 1.0);
        // The surface itself, within the bias.
        assert_eq!(shadow_visibility(at(0.5 + config.bias * 0.5), &sampler, &config), 1.0);
        // Behind it by more than the bias.
        assert_eq!(shadow_visibility(at(0.6), &sampler, &config), 0.4);
    }

    #[test]
    fn test_outside_light_volume_is_lit() {
        let config = ShadowMapConfig::default();
        let sampler = ConstantDepth(0.0);
        let outside = ShadowCoord {
            uv: Vector2::new(1.2, 0.5),
            depth: 0.9,
        };
        assert_eq!(shadow_visibility(Some(outside), &sampler, &config), 1.0);
        assert_eq!(shadow_visibility(None, &sampler, &config), 1.0);

        let vp = overhead_light().build_view_projection_matrix();
        let far_away = world_visibility(&vp, Vector3::new(100.0, 0.0, 0.0), &sampler, &config);
        assert_eq!(far_away, 1.0);
    }

    #[test]
    fn test_shade_keeps_ambient() {
        let ambient = Vector3::new(0.1, 0.1, 0.1);
        let direct = Vector3::new(0.5, 0.5, 0.5);
        let lit = shade(ambient, direct, 1.0);
        let dark = shade(ambient, direct, DEFAULT_SHADOWED_VISIBILITY);
        assert!((lit.x - 0.6).abs() < 1e-6);
        assert!((dark.x - 0.3).abs() < 1e-6);
        assert_eq!(shade(ambient, direct, 0.0), ambient);
    }

    #[test]
    fn test_free_function_matches_light_view() {
        let light = overhead_light();
        let vp = light_view_projection(
            light.position,
            light.target,
            light.up,
            light.fovy,
            light.near,
            light.far,
        );
        assert_eq!(vp, light.build_view_projection_matrix());
    }
}
