//! # Geodesic Shadows Demo
//!
//! Drives the frame loop of a geodesic-sphere shadow renderer without a GPU:
//! - grows the sphere level by level in both subdivision modes
//! - orbits the light and reports when shadows regenerate
//! - renders a CPU depth map and probes a few ground points
//!
//! Run with `RUST_LOG=debug` to also see shadow cache decisions.

use anyhow::Context;
use cgmath::Vector3;
use geoshade::gfx::geometry::{
    append_only_vertex_count, shared_vertex_count, MAX_SUBDIVISION_LEVEL,
};
use geoshade::gfx::math::transform_point;
use geoshade::gfx::shadows::{shade, world_visibility};
use geoshade::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut camera =
        LookAtCamera::new(Vector3::new(0.0, 2.0, 6.0), Vector3::new(0.0, 0.0, 0.0), 1.0);
    camera.resize_projection(1280, 720);

    log::info!("Subdivision levels:");
    for mode in [SubdivisionMode::SharedEdges, SubdivisionMode::AppendOnly] {
        let mut sphere = GeodesicSphere::new(mode);
        while sphere.level() < 5 {
            sphere.increase_level();
            sphere.mesh().validate().context("invalid sphere mesh")?;
            log::info!(
                "  {:?} level {}: {} triangles, {} vertices",
                mode,
                sphere.level(),
                sphere.mesh().triangle_count(),
                sphere.live_vertex_count()
            );
        }
    }
    log::info!(
        "Level {} needs {} shared or {} append-only vertices",
        MAX_SUBDIVISION_LEVEL,
        shared_vertex_count(MAX_SUBDIVISION_LEVEL),
        append_only_vertex_count(MAX_SUBDIVISION_LEVEL)
    );

    let mut config = FrameConfig {
        camera_view_proj: camera.build_view_projection_matrix(),
        ..FrameConfig::default()
    };
    let mut state = FrameState::new(&config);

    log::info!("Planar shadows, animated light:");
    for frame in 0..5 {
        let output = state.update(&config, 1.0 / 60.0)?;
        log::info!(
            "  frame {}: light at {:?}, regenerated: {}",
            frame,
            &output.uniform.light_position[..3],
            output.shadows_changed
        );
    }

    config.animate_light = false;
    config.subdivision_level = 4;
    let output = state.update(&config, 1.0 / 60.0)?;
    log::info!(
        "Level 4: mesh re-upload {}, {} index bytes",
        output.mesh_changed,
        state.mesh().index_data().len()
    );
    let output = state.update(&config, 1.0 / 60.0)?;
    log::info!("Static frame regenerated shadows: {}", output.shadows_changed);

    config.technique = ShadowTechnique::DepthMap;
    config.shadow_map.resolution = 512;
    let output = state.update(&config, 0.0)?;

    let mut depth_map = DepthMap::from_config(&config.shadow_map);
    let written =
        depth_map.render_mesh(&output.light_view_proj, &config.caster_model, state.mesh());
    log::info!("Depth pass wrote {} texels", written);

    let direct = Vector3::new(0.8, 0.8, 0.8);
    let ambient = Vector3::new(0.1, 0.1, 0.1);
    let [lx, ly, lz, _] = output.uniform.light_position;
    let light = Vector3::new(lx, ly, lz);
    for x in [-3.0, -1.0, 0.0, 1.0, 3.0] {
        let ground = Vector3::new(x, -1.0, 0.0);
        let visibility =
            world_visibility(&output.light_view_proj, ground, &depth_map, &config.shadow_map);
        log::info!(
            "  ground ({:>4.1}, -1, 0): visibility {:.1}, color {:?}",
            x,
            visibility,
            shade(ambient, direct, visibility)
        );
    }

    let planar = PlanarShadow::on_ground(light, config.ground)?;
    let center = Vector3::new(0.0, 0.0, 0.0);
    let footprint = transform_point(&planar.caster_model(config.caster_model), center);
    log::info!("Planar shadow of the sphere center: {:?}", footprint);

    config.light_height = -2.0;
    config.technique = ShadowTechnique::Planar;
    match state.update(&config, 0.0) {
        Ok(_) => log::warn!("Light below ground unexpectedly accepted"),
        Err(err) => log::info!("Light below ground rejected: {}", err),
    }

    Ok(())
}
