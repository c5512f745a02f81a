use crate::geometry::Geometry;
use crate::light::DirectionalLight;
use crate::material::Material;
use glam::{Mat4, Vec3};
use orbitscene_common::Transform;
use serde::{Deserialize, Serialize};

/// Index of a node in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// A handle referencing an entry in the scene's geometry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeometryHandle(pub u32);

/// A handle referencing an entry in the scene's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub u32);

/// What a node contributes besides its transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Pure transform node (pivot). Draws nothing.
    Empty,
    /// Triangle geometry shaded with a material.
    Mesh {
        geometry: GeometryHandle,
        material: MaterialHandle,
    },
    /// Line geometry (helpers such as the axes).
    Lines {
        geometry: GeometryHandle,
        material: MaterialHandle,
    },
}

/// Per-node data stored in the scene.
#[derive(Debug, Clone)]
pub struct Node {
    /// Identification only; has no effect on rendering.
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    attached_to_root: bool,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_pivot(&self) -> bool {
        self.kind == NodeKind::Empty
    }
}

/// A node resolved for drawing: its resources and world matrix.
#[derive(Debug, Clone, Copy)]
pub struct Drawable {
    pub node: NodeId,
    pub kind: NodeKind,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub world: Mat4,
}

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    UnknownNode(NodeId),
    #[error("geometry {0:?} not found")]
    UnknownGeometry(GeometryHandle),
    #[error("material {0:?} not found")]
    UnknownMaterial(MaterialHandle),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// The scene graph.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. The root is
/// implicit: [`Scene::add`] makes a node a direct child of it. Nodes that were
/// created but never attached are kept but not drawn.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    root_children: Vec<NodeId>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    lights: Vec<DirectionalLight>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Resources ---
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.push(geometry);
        GeometryHandle(self.geometries.len() as u32 - 1)
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle.0 as usize)
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0 as usize)
    }

    /// Mutable access to a shared material. Changes show on every mesh using it.
    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle.0 as usize)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn add_light(&mut self, light: DirectionalLight) {
        tracing::debug!(position = ?light.position, intensity = light.intensity, "light added");
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    // --- Nodes ---
    /// Create a detached node. Attach it with [`Scene::add`] or [`Scene::attach`].
    pub fn create_node(&mut self, kind: NodeKind) -> Result<NodeId, SceneError> {
        match kind {
            NodeKind::Empty => {}
            NodeKind::Mesh { geometry, material } | NodeKind::Lines { geometry, material } => {
                if self.geometry(geometry).is_none() {
                    return Err(SceneError::UnknownGeometry(geometry));
                }
                if self.material(material).is_none() {
                    return Err(SceneError::UnknownMaterial(material));
                }
            }
        }
        Ok(self.push_node(kind))
    }

    pub fn create_mesh(
        &mut self,
        geometry: GeometryHandle,
        material: MaterialHandle,
    ) -> Result<NodeId, SceneError> {
        self.create_node(NodeKind::Mesh { geometry, material })
    }

    pub fn create_pivot(&mut self) -> NodeId {
        self.push_node(NodeKind::Empty)
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: None,
            transform: Transform::default(),
            kind,
            parent: None,
            attached_to_root: false,
            children: Vec::new(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        self.nodes
            .get_mut(id.0)
            .map(|n| &mut n.transform)
            .ok_or(SceneError::UnknownNode(id))
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))?;
        node.name = Some(name.into());
        Ok(())
    }

    /// First node carrying `name`, in creation order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
            .map(NodeId)
    }

    /// All assigned names in creation order.
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().filter_map(|n| n.name.as_deref()).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Direct children of the implicit root, in insertion order.
    pub fn root_children(&self) -> &[NodeId] {
        &self.root_children
    }

    /// Attach `id` directly under the root, detaching it from any previous parent.
    pub fn add(&mut self, id: NodeId) -> Result<(), SceneError> {
        if id.0 >= self.nodes.len() {
            return Err(SceneError::UnknownNode(id));
        }
        self.detach(id);
        self.nodes[id.0].attached_to_root = true;
        self.root_children.push(id);
        Ok(())
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if parent.0 >= self.nodes.len() {
            return Err(SceneError::UnknownNode(parent));
        }
        if child.0 >= self.nodes.len() {
            return Err(SceneError::UnknownNode(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(old) = self.nodes[id.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != id);
        }
        if std::mem::take(&mut self.nodes[id.0].attached_to_root) {
            self.root_children.retain(|c| *c != id);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes[id.0].parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    /// True when the node hangs, directly or through pivots, off the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            let Some(node) = self.nodes.get(current.0) else {
                return false;
            };
            if node.attached_to_root {
                return true;
            }
            match node.parent {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// Parent world matrix times local matrix, up to the root.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let node = self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id))?;
        let local = node.transform.local_matrix();
        match node.parent {
            Some(parent) => Ok(self.world_matrix(parent)? * local),
            None => Ok(local),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.transform_point3(Vec3::ZERO))
    }

    /// Depth-first walk from the root yielding every attached node with its
    /// world matrix. Parents are visited before their children.
    pub fn traverse(&self) -> Vec<(NodeId, Mat4)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, Mat4)> = self
            .root_children
            .iter()
            .rev()
            .map(|id| (*id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world * node.transform.local_matrix();
            out.push((id, world));
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
        out
    }

    /// Every attached mesh or line node, resolved for drawing.
    pub fn drawables(&self) -> Vec<Drawable> {
        self.traverse()
            .into_iter()
            .filter_map(|(id, world)| {
                let kind = self.nodes[id.0].kind;
                match kind {
                    NodeKind::Empty => None,
                    NodeKind::Mesh { geometry, material }
                    | NodeKind::Lines { geometry, material } => Some(Drawable {
                        node: id,
                        kind,
                        geometry,
                        material,
                        world,
                    }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SphereGeometry;

    const EPS: f32 = 1e-5;

    fn scene_with_resources() -> (Scene, GeometryHandle, MaterialHandle) {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry::Sphere(SphereGeometry::new(1.0)));
        let m = scene.add_material(Material::phong());
        (scene, g, m)
    }

    #[test]
    fn scene_starts_empty() {
        let s = Scene::new();
        assert_eq!(s.node_count(), 0);
        assert!(s.root_children().is_empty());
        assert!(s.lights().is_empty());
    }

    #[test]
    fn add_attaches_to_root() {
        let (mut s, g, m) = scene_with_resources();
        let id = s.create_mesh(g, m).unwrap();
        assert!(!s.is_attached(id));
        s.add(id).unwrap();
        assert_eq!(s.root_children(), &[id]);
        assert!(s.is_attached(id));
    }

    #[test]
    fn create_mesh_rejects_unknown_resources() {
        let (mut s, g, _) = scene_with_resources();
        let err = s.create_mesh(g, MaterialHandle(9)).unwrap_err();
        assert_eq!(err, SceneError::UnknownMaterial(MaterialHandle(9)));
        let err = s.create_mesh(GeometryHandle(4), MaterialHandle(0)).unwrap_err();
        assert_eq!(err, SceneError::UnknownGeometry(GeometryHandle(4)));
    }

    #[test]
    fn child_world_matrix_composes_parent() {
        let (mut s, g, m) = scene_with_resources();
        let pivot = s.create_pivot();
        let child = s.create_mesh(g, m).unwrap();
        s.transform_mut(child).unwrap().translate_x(2.0);
        s.transform_mut(pivot)
            .unwrap()
            .rotate_y(90.0_f32.to_radians());
        s.attach(pivot, child).unwrap();
        s.add(pivot).unwrap();

        let pos = s.world_position(child).unwrap();
        assert!(pos.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), EPS));
        assert_eq!(s.root_children().len(), 1);
        assert_eq!(s.node(pivot).unwrap().children(), &[child]);
    }

    #[test]
    fn reattach_moves_node() {
        let mut s = Scene::new();
        let a = s.create_pivot();
        let b = s.create_pivot();
        let c = s.create_pivot();
        s.add(a).unwrap();
        s.add(c).unwrap();
        s.attach(a, c).unwrap();
        assert_eq!(s.root_children(), &[a]);
        s.attach(b, c).unwrap();
        assert!(s.node(a).unwrap().children().is_empty());
        assert_eq!(s.node(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut s = Scene::new();
        let a = s.create_pivot();
        let b = s.create_pivot();
        s.attach(a, b).unwrap();
        assert_eq!(
            s.attach(b, a).unwrap_err(),
            SceneError::Cycle { parent: b, child: a }
        );
        assert!(matches!(s.attach(a, a), Err(SceneError::Cycle { .. })));
    }

    #[test]
    fn unknown_node_errors() {
        let mut s = Scene::new();
        assert_eq!(s.add(NodeId(3)).unwrap_err(), SceneError::UnknownNode(NodeId(3)));
        assert!(s.world_matrix(NodeId(0)).is_err());
        assert!(s.set_name(NodeId(1), "x").is_err());
    }

    #[test]
    fn find_by_name_and_names() {
        let (mut s, g, m) = scene_with_resources();
        let a = s.create_mesh(g, m).unwrap();
        let b = s.create_mesh(g, m).unwrap();
        s.set_name(a, "first").unwrap();
        s.set_name(b, "second").unwrap();
        assert_eq!(s.find_by_name("second"), Some(b));
        assert_eq!(s.find_by_name("third"), None);
        assert_eq!(s.names(), vec!["first", "second"]);
    }

    #[test]
    fn drawables_skip_pivots_and_detached_nodes() {
        let (mut s, g, m) = scene_with_resources();
        let pivot = s.create_pivot();
        let attached = s.create_mesh(g, m).unwrap();
        let _detached = s.create_mesh(g, m).unwrap();
        s.attach(pivot, attached).unwrap();
        s.add(pivot).unwrap();

        let drawables = s.drawables();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].node, attached);
    }

    #[test]
    fn traverse_visits_parents_first() {
        let mut s = Scene::new();
        let p = s.create_pivot();
        let c = s.create_pivot();
        s.attach(p, c).unwrap();
        s.add(p).unwrap();
        let order: Vec<NodeId> = s.traverse().into_iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![p, c]);
    }

    #[test]
    fn shared_material_change_is_visible_to_all_users() {
        let (mut s, g, m) = scene_with_resources();
        let a = s.create_mesh(g, m).unwrap();
        let b = s.create_mesh(g, m).unwrap();
        s.material_mut(m)
            .unwrap()
            .set_color(orbitscene_common::Color::RED);
        for id in [a, b] {
            let NodeKind::Mesh { material, .. } = s.node(id).unwrap().kind else {
                panic!("expected mesh");
            };
            assert_eq!(s.material(material).unwrap().color(), orbitscene_common::Color::RED);
        }
    }
}
