//! Per-frame configuration and state.
//!
//! Everything the controls can change (subdivision level, technique, light
//! animation) lives in a [`FrameConfig`] the host fills in and passes to
//! [`FrameState::update`] once per frame. The state keeps what has to survive
//! between frames: the current sphere, the animation clock and the shadow
//! cache.

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

use crate::error::Result;
use crate::gfx::camera::Camera;
use crate::gfx::geometry::{GeodesicSphere, Mesh, SubdivisionMode};
use crate::gfx::shadows::{
    CasterState, GroundPlane, LightConfig, LightState, LightView, PlanarShadow, ShadowCache,
    ShadowMapConfig, ShadowTechnique, ShadowUniform,
};

/// Name the sphere is tracked under in the shadow cache
const CASTER_NAME: &str = "geodesic_sphere";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameConfig {
    pub subdivision_level: u32,
    pub subdivision_mode: SubdivisionMode,
    pub technique: ShadowTechnique,
    /// Orbit the light around the vertical axis
    pub animate_light: bool,
    /// Orbit speed while animating
    pub light_speed: Rad<f32>,
    /// Orbit phase added to the animation angle
    pub light_angle: Rad<f32>,
    pub light_orbit_radius: f32,
    pub light_height: f32,
    /// Color and intensity; the position is derived from the orbit
    pub light: LightConfig,
    /// Point the depth-map light looks at
    pub light_target: Vector3<f32>,
    pub ground: GroundPlane,
    pub caster_model: Matrix4<f32>,
    pub camera_view_proj: Matrix4<f32>,
    pub shadow_map: ShadowMapConfig,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            subdivision_level: 3,
            subdivision_mode: SubdivisionMode::SharedEdges,
            technique: ShadowTechnique::Planar,
            animate_light: true,
            light_speed: Rad(0.5),
            light_angle: Rad(0.0),
            light_orbit_radius: 2.0,
            light_height: 4.0,
            light: LightConfig::default(),
            light_target: Vector3::new(0.0, 0.0, 0.0),
            ground: GroundPlane::y(-1.0),
            caster_model: Matrix4::identity(),
            camera_view_proj: Matrix4::identity(),
            shadow_map: ShadowMapConfig::default(),
        }
    }
}

impl FrameConfig {
    /// Light position on its orbit after `animation` extra radians.
    pub fn light_position(&self, animation: Rad<f32>) -> Vector3<f32> {
        let theta = self.light_angle.0 + animation.0;
        Vector3::new(
            self.light_orbit_radius * theta.cos(),
            self.light_height,
            self.light_orbit_radius * theta.sin(),
        )
    }
}

/// What the backend has to do for this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Sphere buffers must be re-uploaded
    pub mesh_changed: bool,
    /// Uniforms changed; with the depth-map technique the depth pass must be
    /// re-encoded before the main pass
    pub shadows_changed: bool,
    pub uniform: ShadowUniform,
    /// Clip transform for the planar shadow draw of the caster
    pub shadow_caster_view_proj: Option<Matrix4<f32>>,
    pub light_view_proj: Matrix4<f32>,
}

/// Frame inputs that feed the shadow outputs but not the shadow cache.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShadowInputs {
    ground: GroundPlane,
    light_target: Vector3<f32>,
    shadow_map: ShadowMapConfig,
}

impl ShadowInputs {
    fn new(config: &FrameConfig) -> Self {
        Self {
            ground: config.ground,
            light_target: config.light_target,
            shadow_map: config.shadow_map,
        }
    }
}

#[derive(Debug)]
pub struct FrameState {
    sphere: GeodesicSphere,
    animation_angle: Rad<f32>,
    cache: ShadowCache,
    last_output: Option<FrameOutput>,
    last_inputs: Option<ShadowInputs>,
    last_camera_view_proj: Option<Matrix4<f32>>,
    /// Set on rebuild, cleared once an output carrying it was returned
    pending_mesh_upload: bool,
}

impl FrameState {
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            sphere: GeodesicSphere::with_level(config.subdivision_level, config.subdivision_mode),
            animation_angle: Rad(0.0),
            cache: ShadowCache::new(),
            last_output: None,
            last_inputs: None,
            last_camera_view_proj: None,
            pending_mesh_upload: false,
        }
    }

    pub fn sphere(&self) -> &GeodesicSphere {
        &self.sphere
    }

    pub fn mesh(&self) -> &Mesh {
        self.sphere.mesh()
    }

    pub fn cache(&self) -> &ShadowCache {
        &self.cache
    }

    /// Advances the frame by `dt` seconds.
    ///
    /// Fails when the planar technique is selected and the light sits on or
    /// below the ground plane. A mesh rebuilt during a failed frame is still
    /// reported as changed by the next successful one.
    pub fn update(&mut self, config: &FrameConfig, dt: f32) -> Result<FrameOutput> {
        let mut rebuilt = false;
        if config.subdivision_mode != self.sphere.mode() {
            self.sphere =
                GeodesicSphere::with_level(config.subdivision_level, config.subdivision_mode);
            rebuilt = true;
        } else if self.sphere.set_level(config.subdivision_level) {
            rebuilt = true;
        }
        if rebuilt {
            self.pending_mesh_upload = true;
            self.cache.invalidate();
        }
        let mesh_changed = self.pending_mesh_upload;

        if config.animate_light {
            let angle = self.animation_angle.0 + config.light_speed.0 * dt;
            self.animation_angle = Rad(angle % std::f32::consts::TAU);
        }

        let light_position = config.light_position(self.animation_angle);
        let light = LightConfig {
            position: light_position.into(),
            ..config.light
        };

        let light_state = LightState::new(&light, config.technique);
        let casters = [CasterState::new(CASTER_NAME, config.caster_model, true)];

        let inputs = ShadowInputs::new(config);
        let stale_inputs = self.last_inputs != Some(inputs);
        // The camera only enters the planar caster transform.
        let stale_camera = config.technique == ShadowTechnique::Planar
            && self.last_camera_view_proj != Some(config.camera_view_proj);
        let shadows_changed = self.cache.needs_update(&light_state, &casters) || stale_inputs;

        if !shadows_changed && !stale_camera {
            if let Some(last) = &self.last_output {
                self.pending_mesh_upload = false;
                return Ok(FrameOutput {
                    mesh_changed,
                    shadows_changed: false,
                    ..last.clone()
                });
            }
        }

        let light_view_proj = LightView::new(light_position, config.light_target)
            .build_view_projection_matrix();

        let (shadow_matrix, shadow_caster_view_proj) = match config.technique {
            ShadowTechnique::Planar => {
                let planar = PlanarShadow::on_ground(light_position, config.ground)?;
                (
                    planar.matrix(),
                    Some(
                        planar.caster_view_projection(
                            config.camera_view_proj,
                            config.caster_model,
                        ),
                    ),
                )
            }
            ShadowTechnique::DepthMap | ShadowTechnique::None => (Matrix4::identity(), None),
        };

        let uniform = ShadowUniform::new(
            &light,
            shadow_matrix,
            light_view_proj,
            &config.shadow_map,
            config.technique,
        );

        if shadows_changed {
            log::debug!(
                "Shadows regenerated ({:?}), light at {:?}",
                config.technique,
                light.position
            );
            self.cache.mark_valid(&light_state, &casters);
        }

        let output = FrameOutput {
            mesh_changed,
            shadows_changed,
            uniform,
            shadow_caster_view_proj,
            light_view_proj,
        };
        self.last_output = Some(output.clone());
        self.last_inputs = Some(inputs);
        self.last_camera_view_proj = Some(config.camera_view_proj);
        self.pending_mesh_upload = false;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gfx::geometry::shared_vertex_count;
    use crate::gfx::math::convert_matrix4_to_array;

    fn still() -> FrameConfig {
        FrameConfig {
            animate_light: false,
            ..FrameConfig::default()
        }
    }

    #[test]
    fn test_static_frames_hit_the_cache() {
        let config = still();
        let mut state = FrameState::new(&config);

        let first = state.update(&config, 0.016).unwrap();
        assert!(first.shadows_changed);
        assert!(!first.mesh_changed);
        assert!(state.cache().is_valid());

        let second = state.update(&config, 0.016).unwrap();
        assert!(!second.shadows_changed);
        assert_eq!(second.uniform, first.uniform);
    }

    #[test]
    fn test_animation_moves_the_light() {
        let config = FrameConfig::default();
        let mut state = FrameState::new(&config);

        let first = state.update(&config, 0.1).unwrap();
        let second = state.update(&config, 0.1).unwrap();
        assert!(second.shadows_changed);
        assert_ne!(first.uniform.light_position, second.uniform.light_position);
        assert_eq!(second.uniform.light_position[1], config.light_height);
    }

    #[test]
    fn test_level_change_rebuilds_mesh() {
        let mut config = still();
        let mut state = FrameState::new(&config);
        state.update(&config, 0.0).unwrap();

        config.subdivision_level = 4;
        let output = state.update(&config, 0.0).unwrap();
        assert!(output.mesh_changed);
        assert!(output.shadows_changed);
        assert_eq!(state.sphere().level(), 4);
        assert_eq!(state.mesh().vertex_count(), shared_vertex_count(4));

        config.subdivision_mode = SubdivisionMode::AppendOnly;
        let output = state.update(&config, 0.0).unwrap();
        assert!(output.mesh_changed);
        assert_eq!(state.sphere().mode(), SubdivisionMode::AppendOnly);
    }

    #[test]
    fn test_camera_change_refreshes_planar_transform() {
        let mut config = still();
        let mut state = FrameState::new(&config);
        state.update(&config, 0.0).unwrap();

        config.camera_view_proj = Matrix4::from_scale(2.0);
        let output = state.update(&config, 0.0).unwrap();
        assert!(!output.shadows_changed);

        let light = config.light_position(Rad(0.0));
        let planar = PlanarShadow::on_ground(light, config.ground).unwrap();
        assert_eq!(
            output.shadow_caster_view_proj,
            Some(planar.caster_view_projection(config.camera_view_proj, config.caster_model))
        );
    }

    #[test]
    fn test_depth_map_has_no_caster_transform() {
        let config = FrameConfig {
            technique: ShadowTechnique::DepthMap,
            ..still()
        };
        let mut state = FrameState::new(&config);
        let output = state.update(&config, 0.0).unwrap();
        assert_eq!(output.shadow_caster_view_proj, None);
        assert_eq!(output.uniform.technique, ShadowTechnique::DepthMap as u32);
    }

    #[test]
    fn test_planar_rejects_light_below_ground() {
        let config = FrameConfig {
            light_height: -2.0,
            ..still()
        };
        let mut state = FrameState::new(&config);
        assert!(matches!(
            state.update(&config, 0.0),
            Err(Error::LightBelowPlane { .. })
        ));
        assert!(!state.cache().is_valid());

        // Other techniques do not care where the light is.
        let depth = FrameConfig {
            technique: ShadowTechnique::DepthMap,
            ..config
        };
        assert!(state.update(&depth, 0.0).is_ok());
    }

    #[test]
    fn test_ground_change_regenerates_planar_matrix() {
        let mut config = still();
        let mut state = FrameState::new(&config);
        state.update(&config, 0.0).unwrap();

        config.ground = GroundPlane::y(-3.0);
        let output = state.update(&config, 0.0).unwrap();
        assert!(output.shadows_changed);

        let light = config.light_position(Rad(0.0));
        let planar = PlanarShadow::on_ground(light, config.ground).unwrap();
        assert_eq!(
            output.uniform.shadow_matrix,
            convert_matrix4_to_array(planar.matrix())
        );
    }

    #[test]
    fn test_shadow_map_change_refreshes_uniform() {
        let mut config = FrameConfig {
            technique: ShadowTechnique::DepthMap,
            ..still()
        };
        let mut state = FrameState::new(&config);
        state.update(&config, 0.0).unwrap();

        config.shadow_map.bias = 0.05;
        config.shadow_map.resolution = 1024;
        let output = state.update(&config, 0.0).unwrap();
        assert!(output.shadows_changed);
        assert_eq!(output.uniform.bias, 0.05);
        assert_eq!(output.uniform.shadow_map_size, 1024.0);

        let again = state.update(&config, 0.0).unwrap();
        assert!(!again.shadows_changed);
    }

    #[test]
    fn test_light_target_change_moves_light_view() {
        let mut config = FrameConfig {
            technique: ShadowTechnique::DepthMap,
            ..still()
        };
        let mut state = FrameState::new(&config);
        let first = state.update(&config, 0.0).unwrap();

        config.light_target = Vector3::new(1.0, 0.0, 0.0);
        let output = state.update(&config, 0.0).unwrap();
        assert!(output.shadows_changed);
        assert_ne!(output.light_view_proj, first.light_view_proj);
        assert_eq!(
            output.uniform.light_view_proj,
            convert_matrix4_to_array(output.light_view_proj)
        );
    }

    #[test]
    fn test_mesh_change_survives_failed_frame() {
        let mut config = still();
        let mut state = FrameState::new(&config);
        state.update(&config, 0.0).unwrap();

        config.subdivision_level = 5;
        config.light_height = -2.0;
        assert!(state.update(&config, 0.0).is_err());
        assert_eq!(state.sphere().level(), 5);

        config.light_height = 4.0;
        let output = state.update(&config, 0.0).unwrap();
        assert!(output.mesh_changed);
        assert!(output.shadows_changed);

        let next = state.update(&config, 0.0).unwrap();
        assert!(!next.mesh_changed);
    }
}
