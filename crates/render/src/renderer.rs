use crate::camera::PerspectiveCamera;
use orbitscene_scene::{NodeKind, Scene};

/// Renderer-agnostic interface for one-shot scene output.
///
/// The renderer reads the scene and a camera, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and camera.
    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Produces a human-readable dump of the scene graph.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (nodes={}, root_children={}, lights={}) ===\n",
            scene.node_count(),
            scene.root_children().len(),
            scene.lights().len()
        ));
        out.push_str(&format!(
            "Camera: pos=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}\n",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees,
            camera.aspect
        ));

        for (id, world) in scene.traverse() {
            let Some(node) = scene.node(id) else {
                continue;
            };
            let kind = match node.kind {
                NodeKind::Empty => "pivot",
                NodeKind::Mesh { geometry, .. } | NodeKind::Lines { geometry, .. } => scene
                    .geometry(geometry)
                    .map(|g| g.kind_name())
                    .unwrap_or("?"),
            };
            let depth = ancestors(scene, id);
            let p = world.transform_point3(glam::Vec3::ZERO);
            out.push_str(&format!(
                "{:indent$}- {} [{}] pos=({:.2}, {:.2}, {:.2})\n",
                "",
                node.name.as_deref().unwrap_or("<unnamed>"),
                kind,
                p.x,
                p.y,
                p.z,
                indent = depth * 2
            ));
        }

        out
    }
}

fn ancestors(scene: &Scene, id: orbitscene_scene::NodeId) -> usize {
    let mut depth = 0;
    let mut current = scene.node(id).and_then(|n| n.parent());
    while let Some(parent) = current {
        depth += 1;
        current = scene.node(parent).and_then(|n| n.parent());
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscene_scene::{Geometry, Material};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &PerspectiveCamera::default());

        assert!(output.contains("nodes=0"));
        assert!(output.contains("root_children=0"));
        assert!(output.starts_with("=== Scene"));
        assert_eq!(output.lines().count(), 2);
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn debug_renderer_indents_children() {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry::plane(1.0, 1.0));
        let m = scene.add_material(Material::phong());
        let pivot = scene.create_pivot();
        let mesh = scene.create_mesh(g, m).unwrap();
        scene.set_name(mesh, "tile").unwrap();
        scene.transform_mut(mesh).unwrap().translate_x(2.0);
        scene.attach(pivot, mesh).unwrap();
        scene.add(pivot).unwrap();

        let output = DebugTextRenderer::new().render(&scene, &PerspectiveCamera::default());
        assert!(output.contains("- <unnamed> [pivot]"));
        assert!(output.contains("  - tile [plane] pos=(2.00, 0.00, 0.00)"));
    }
}
