//! Shadow caching
//!
//! Shadow matrices and the depth map only need regenerating when:
//! - the light position, color or intensity changes
//! - a caster moves, appears, disappears or toggles visibility
//! - the technique changes
//! - manual cache invalidation is requested
//!
//! Static frames skip the depth pass entirely.

use cgmath::Matrix4;
use std::collections::{HashMap, HashSet};

use super::uniforms::LightConfig;
use super::ShadowTechnique;

/// Changes below this are treated as noise
const EPSILON: f32 = 0.001;

fn differs(a: &[f32], b: &[f32]) -> bool {
    a.iter().zip(b).any(|(x, y)| (x - y).abs() > EPSILON)
}

/// Tracks the state of the light for shadow caching
#[derive(Debug, Clone, PartialEq)]
pub struct LightState {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    pub technique: ShadowTechnique,
}

impl LightState {
    pub fn new(config: &LightConfig, technique: ShadowTechnique) -> Self {
        Self {
            position: config.position,
            color: config.color,
            intensity: config.intensity,
            technique,
        }
    }

    /// Checks if this light state differs significantly from another
    pub fn differs_from(&self, other: &LightState) -> bool {
        self.technique != other.technique
            || differs(&self.position, &other.position)
            || differs(&self.color, &other.color)
            || differs(&[self.intensity], &[other.intensity])
    }
}

/// Transform state of one shadow caster
#[derive(Debug, Clone, PartialEq)]
pub struct CasterState {
    pub name: String,
    pub transform: Matrix4<f32>,
    pub visible: bool,
}

impl CasterState {
    pub fn new(name: impl Into<String>, transform: Matrix4<f32>, visible: bool) -> Self {
        Self {
            name: name.into(),
            transform,
            visible,
        }
    }

    /// Checks if this caster differs from another in a way that moves its shadow
    pub fn differs_from(&self, other: &CasterState) -> bool {
        if self.visible != other.visible {
            return true;
        }

        if !self.visible {
            // If both are invisible, they don't affect shadows
            return false;
        }

        let self_mat: &[f32; 16] = self.transform.as_ref();
        let other_mat: &[f32; 16] = other.transform.as_ref();
        differs(self_mat, other_mat)
    }
}

/// Shadow cache manager
#[derive(Debug, Default)]
pub struct ShadowCache {
    is_valid: bool,
    last_light_state: Option<LightState>,
    last_caster_states: HashMap<String, CasterState>,
    force_invalidate: bool,
}

impl ShadowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the shadow data needs to be regenerated
    pub fn needs_update(&mut self, light: &LightState, casters: &[CasterState]) -> bool {
        if self.force_invalidate {
            log::debug!("Shadow cache: manual invalidation requested");
            self.force_invalidate = false;
            self.is_valid = false;
            return true;
        }

        if !self.is_valid {
            log::debug!("Shadow cache: invalid, first render");
            return true;
        }

        match &self.last_light_state {
            Some(last) if !light.differs_from(last) => {}
            _ => {
                log::debug!("Shadow cache: light changed");
                self.is_valid = false;
                return true;
            }
        }

        for caster in casters {
            match self.last_caster_states.get(&caster.name) {
                Some(last) if !caster.differs_from(last) => {}
                Some(_) => {
                    log::debug!("Shadow cache: caster '{}' moved/changed", caster.name);
                    self.is_valid = false;
                    return true;
                }
                None => {
                    log::debug!("Shadow cache: new caster '{}'", caster.name);
                    self.is_valid = false;
                    return true;
                }
            }
        }

        let current: HashSet<&str> = casters.iter().map(|c| c.name.as_str()).collect();
        if self
            .last_caster_states
            .keys()
            .any(|name| !current.contains(name.as_str()))
        {
            log::debug!("Shadow cache: caster removed");
            self.is_valid = false;
            return true;
        }

        false
    }

    /// Marks the shadow data as valid and remembers the state it was built from
    pub fn mark_valid(&mut self, light: &LightState, casters: &[CasterState]) {
        self.is_valid = true;
        self.last_light_state = Some(light.clone());

        self.last_caster_states.clear();
        for caster in casters {
            self.last_caster_states
                .insert(caster.name.clone(), caster.clone());
        }
    }

    /// Forces the cache to be invalidated on the next check
    pub fn invalidate(&mut self) {
        self.force_invalidate = true;
        self.is_valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid && !self.force_invalidate
    }

    /// Clears all cached state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn get_stats(&self) -> ShadowCacheStats {
        ShadowCacheStats {
            is_valid: self.is_valid,
            tracked_casters: self.last_caster_states.len(),
            has_light_state: self.last_light_state.is_some(),
        }
    }
}

/// Statistics about the shadow cache for debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowCacheStats {
    pub is_valid: bool,
    pub tracked_casters: usize,
    pub has_light_state: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector3};

    fn light_at(x: f32) -> LightState {
        let config = LightConfig {
            position: [x, 4.0, 0.0],
            ..LightConfig::default()
        };
        LightState::new(&config, ShadowTechnique::DepthMap)
    }

    fn sphere_at(y: f32) -> CasterState {
        CasterState::new(
            "sphere",
            Matrix4::from_translation(Vector3::new(0.0, y, 0.0)),
            true,
        )
    }

    fn primed(light: &LightState, casters: &[CasterState]) -> ShadowCache {
        let mut cache = ShadowCache::new();
        assert!(cache.needs_update(light, casters));
        cache.mark_valid(light, casters);
        cache
    }

    #[test]
    fn test_static_scene_hits_cache() {
        let casters = [sphere_at(0.0)];
        let mut cache = primed(&light_at(0.0), &casters);
        assert!(cache.is_valid());
        assert!(!cache.needs_update(&light_at(0.0), &casters));
        assert!(!cache.needs_update(&light_at(0.0005), &casters));
    }

    #[test]
    fn test_light_or_technique_change_misses() {
        let casters = [sphere_at(0.0)];
        let mut cache = primed(&light_at(0.0), &casters);
        assert!(cache.needs_update(&light_at(1.0), &casters));

        let mut cache = primed(&light_at(0.0), &casters);
        let mut planar = light_at(0.0);
        planar.technique = ShadowTechnique::Planar;
        assert!(cache.needs_update(&planar, &casters));
    }

    #[test]
    fn test_caster_changes_miss() {
        let light = light_at(0.0);
        let mut cache = primed(&light, &[sphere_at(0.0)]);
        assert!(cache.needs_update(&light, &[sphere_at(0.5)]));

        let mut cache = primed(&light, &[sphere_at(0.0)]);
        assert!(cache.needs_update(&light, &[]));

        let mut cache = primed(&light, &[sphere_at(0.0)]);
        let extra = CasterState::new("cube", Matrix4::identity(), true);
        assert!(cache.needs_update(&light, &[sphere_at(0.0), extra]));
    }

    #[test]
    fn test_hidden_casters_do_not_invalidate() {
        let light = light_at(0.0);
        let mut hidden = sphere_at(0.0);
        hidden.visible = false;
        let mut cache = primed(&light, &[hidden.clone()]);

        let mut moved = sphere_at(3.0);
        moved.visible = false;
        assert!(!cache.needs_update(&light, &[moved]));
        assert!(cache.needs_update(&light, &[sphere_at(0.0)]));
    }

    #[test]
    fn test_manual_invalidation_and_clear() {
        let light = light_at(0.0);
        let casters = [sphere_at(0.0)];
        let mut cache = primed(&light, &casters);

        cache.invalidate();
        assert!(!cache.is_valid());
        assert!(cache.needs_update(&light, &casters));

        cache.mark_valid(&light, &casters);
        assert_eq!(
            cache.get_stats(),
            ShadowCacheStats {
                is_valid: true,
                tracked_casters: 1,
                has_light_state: true,
            }
        );

        cache.clear();
        assert_eq!(
            cache.get_stats(),
            ShadowCacheStats {
                is_valid: false,
                tracked_casters: 0,
                has_light_state: false,
            }
        );
    }
}
