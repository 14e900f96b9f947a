//demo.rs

use glam::{Vec2, Vec3};
use tracing::info;
use crate::config::{GraphConfig, StrategyKind, SurfaceKind, ViewerConfig};
use crate::error::MeshError;
use crate::graph::{Graph, Shading};
use crate::noise::LayeredNoise;
use crate::primitives::MeshGen;
use crate::scene::{Material, Scene};
use crate::transform::Transform;
use crate::upload::MeshUpload;

// --- SURFACES ---

fn ripple(v: Vec2) -> f32 {
    ((1.0 / (1.0 + v.length_squared() / 2.0)) * 25.0 + 10.0 * v.y / 2.0).sin()
}

// red rises and blue falls with height, green grows away from the centre
fn height_colouring(p: Vec3) -> Vec3 {
    Vec3::new(0.5 + p.y * 0.5, Vec2::new(p.x, p.z).length(), 1.0 - p.y * 0.5)
}

pub fn surface_graph(config: &ViewerConfig) -> Graph {
    let graph = match config.graph.surface {
        SurfaceKind::Ripple => Graph::new(ripple),
        SurfaceKind::Noise => {
            let noise = LayeredNoise::new(config.noise);
            Graph::new(move |p| noise.height(p))
        }
    };

    let GraphConfig { bounds_min, bounds_max, .. } = config.graph;
    graph
        .with_bounds(Vec2::from(bounds_min), Vec2::from(bounds_max))
        .with_colouring(height_colouring)
}

/// Strategy/shading pairs to show and where each graph goes.
pub fn graph_layout(config: &GraphConfig) -> Vec<(StrategyKind, Shading, Vec3)> {
    if !config.compare {
        return vec![(config.strategy, config.shading, Vec3::ZERO)];
    }

    let offset = config.scale[0] + 1.0;
    vec![
        (StrategyKind::UniformGrid, Shading::Faceted, Vec3::new(offset, 0.0, offset)),
        (StrategyKind::GradientPull, Shading::Faceted, Vec3::new(offset, 0.0, -offset)),
        (StrategyKind::UniformGrid, Shading::Smooth, Vec3::new(-offset, 0.0, offset)),
        (StrategyKind::GradientPull, Shading::Smooth, Vec3::new(-offset, 0.0, -offset)),
    ]
}

// --- SCENE ---

/// Generates and uploads the demo scene. Nothing is leaked if any step fails.
pub fn build_scene<U: MeshUpload>(uploader: &mut U, config: &ViewerConfig) -> Result<Scene<U::Handle>, MeshError> {
    let mut scene = Scene::new();
    match populate(&mut scene, uploader, config) {
        Ok(()) => {
            info!(models = scene.len(), triangles = scene.triangle_count(), "scene ready");
            Ok(scene)
        }
        Err(e) => {
            scene.destroy();
            Err(e)
        }
    }
}

fn populate<U: MeshUpload>(scene: &mut Scene<U::Handle>, uploader: &mut U, config: &ViewerConfig) -> Result<(), MeshError> {
    let graph = surface_graph(config);
    let scale = Vec3::from(config.graph.scale);

    for (kind, shading, position) in graph_layout(&config.graph) {
        let strategy = kind.build(config.graph.resolution)?;
        let mesh = graph.mesh(strategy.as_ref(), shading)?;
        let transform = Transform::default().translate_to(position).scale_to(scale);
        scene.upload(uploader, &mesh, transform, Material::default().with_specular(0.3, 16.0))?;
    }

    let p = &config.primitives;
    let row = |x: f32| Transform::default().translate_to(Vec3::new(x, 3.0, 0.0));
    let shapes = [
        (MeshGen::cone(p.detail)?, Vec3::new(1.0, 0.5, 0.2)),
        (MeshGen::cylinder(p.detail)?, Vec3::new(0.3, 0.8, 0.3)),
        (MeshGen::pyramid(4)?, Vec3::new(0.9, 0.8, 0.2)),
        (MeshGen::box_mesh(), Vec3::new(0.6, 0.6, 0.9)),
        (MeshGen::uv_sphere(p.uv_columns, p.uv_rows)?, Vec3::new(0.9, 0.3, 0.3)),
    ];
    let count = shapes.len() as f32;
    for (i, (mesh, colour)) in shapes.into_iter().enumerate() {
        let x = (i as f32 - count) * 1.5;
        scene.upload(uploader, &mesh, row(x), Material::default().with_colour(colour).with_specular(0.5, 32.0))?;
    }

    for resolution in 1..=p.sphere_resolution {
        let mesh = MeshGen::icosphere(resolution)?;
        let x = resolution as f32 * 1.5;
        scene.upload(uploader, &mesh, row(x), Material::default().with_colour(Vec3::new(0.0, 1.0, 1.0)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::recording::RecordingUpload;

    fn small_config() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        config.graph.resolution = 6;
        config.primitives.detail = 5;
        config.primitives.sphere_resolution = 2;
        config.primitives.uv_columns = 6;
        config.primitives.uv_rows = 3;
        config
    }

    #[test]
    fn compare_layout_covers_every_pair() {
        let layout = graph_layout(&GraphConfig::default());
        assert_eq!(layout.len(), 4);
        for kind in [StrategyKind::UniformGrid, StrategyKind::GradientPull] {
            for shading in [Shading::Faceted, Shading::Smooth] {
                assert!(layout.iter().any(|&(k, s, _)| k == kind && s == shading));
            }
        }
    }

    #[test]
    fn single_layout_uses_configured_pair() {
        let config = GraphConfig {
            compare: false,
            strategy: StrategyKind::GradientPull,
            shading: Shading::Smooth,
            ..GraphConfig::default()
        };
        assert_eq!(graph_layout(&config), vec![(StrategyKind::GradientPull, Shading::Smooth, Vec3::ZERO)]);
    }

    #[test]
    fn demo_scene_uploads_graphs_and_primitives() {
        let mut upload = RecordingUpload::default();
        let scene = build_scene(&mut upload, &small_config()).unwrap();
        assert_eq!(scene.len(), 4 + 5 + 2);
        scene.destroy();

        let log = upload.log.borrow();
        assert_eq!(log.destroyed.len(), log.uploaded.len());
    }

    #[test]
    fn failed_build_releases_uploaded_meshes() {
        let mut upload = RecordingUpload::default();
        let mut config = small_config();
        config.primitives.detail = 2;

        let err = build_scene(&mut upload, &config).map(|_| ()).unwrap_err();
        assert!(err.is_invalid_argument());

        let log = upload.log.borrow();
        assert_eq!(log.uploaded.len(), 4);
        assert_eq!(log.destroyed.len(), 4);
    }

    #[test]
    fn noise_surface_is_bounded_by_amplitude() {
        let mut config = small_config();
        config.graph.surface = SurfaceKind::Noise;
        let graph = surface_graph(&config);
        let mesh = graph.smooth_mesh(&crate::strategy::UniformGrid::new(8).unwrap()).unwrap();
        let limit = config.noise.amplitude / 2.0 + 1e-5;
        assert!(mesh.positions.iter().all(|p| p.y.abs() <= limit));
    }
}
