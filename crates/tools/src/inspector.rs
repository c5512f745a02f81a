use orbitscene_scene::{NodeId, NodeKind, Scene};
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the scene graph for debugging and the
/// command-line tool.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let drawables = scene.drawables();
        SceneSummary {
            node_count: scene.node_count(),
            root_children: scene.root_children().len(),
            pivots: (0..scene.node_count())
                .filter(|i| scene.node(NodeId(*i)).is_some_and(|n| n.is_pivot()))
                .count(),
            drawables: drawables.len(),
            geometries: scene.geometries().len(),
            materials: scene.materials().len(),
            lights: scene.lights().len(),
        }
    }

    /// Details of a single node, resolved to world space.
    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        let node = scene.node(id)?;
        let world = scene.world_matrix(id).ok()?;
        let (_, rotation, position) = world.to_scale_rotation_translation();
        let kind = match node.kind {
            NodeKind::Empty => "pivot",
            NodeKind::Mesh { geometry, .. } | NodeKind::Lines { geometry, .. } => scene
                .geometry(geometry)
                .map(|g| g.kind_name())
                .unwrap_or("unknown"),
        };
        Some(NodeInfo {
            id: id.0,
            name: node.name.clone(),
            kind,
            parent: node.parent().map(|p| p.0),
            children: node.children().len(),
            world_position: position.to_array(),
            world_rotation: rotation.to_array(),
        })
    }

    /// Look up a node by name and inspect it.
    pub fn inspect_named(scene: &Scene, name: &str) -> Option<NodeInfo> {
        scene
            .find_by_name(name)
            .and_then(|id| Self::inspect_node(scene, id))
    }

    /// Inspect every node reachable from the root, parents first.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeInfo> {
        scene
            .traverse()
            .into_iter()
            .filter_map(|(id, _)| Self::inspect_node(scene, id))
            .collect()
    }
}

/// Summary of scene contents.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub node_count: usize,
    pub root_children: usize,
    pub pivots: usize,
    pub drawables: usize,
    pub geometries: usize,
    pub materials: usize,
    pub lights: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} root_children={} pivots={} drawables={} geometries={} materials={} lights={}",
            self.node_count,
            self.root_children,
            self.pivots,
            self.drawables,
            self.geometries,
            self.materials,
            self.lights
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub id: usize,
    pub name: Option<String>,
    pub kind: &'static str,
    pub parent: Option<usize>,
    pub children: usize,
    pub world_position: [f32; 3],
    pub world_rotation: [f32; 4],
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.world_position;
        write!(
            f,
            "#{:<3} {:<10} {:<7} pos=({:.2}, {:.2}, {:.2})",
            self.id,
            self.name.as_deref().unwrap_or("-"),
            self.kind,
            p[0],
            p[1],
            p[2],
        )
    }
}
