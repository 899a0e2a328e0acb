use crate::geometry::Geometry;
use crate::light::Light;
use crate::material::StandardMaterial;
use glam::{Mat4, Vec3};
use haunted_common::{Color, ColorError, NodeId, Transform};
use std::collections::BTreeMap;

/// Errors from scene operations and scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("color error: {0}")]
    Color(#[from] ColorError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unknown node: {0:?}")]
    UnknownNode(NodeId),
    #[error("cannot attach {child:?} below its own descendant {parent:?}")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Index into the scene's geometry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub usize);

/// Index into the scene's material arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Distance fog ramping from `near` to `far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Fog blend weight at view distance `d`: 0 before `near`, 1 past `far`,
    /// smoothstepped in between.
    pub fn factor(&self, d: f32) -> f32 {
        if self.far <= self.near {
            return if d >= self.far { 1.0 } else { 0.0 };
        }
        let t = ((d - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// What a node contributes to the rendered image.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
    Light(Light),
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A mesh resolved to world space, ready to draw.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance {
    pub id: NodeId,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub world: Mat4,
}

/// A light resolved to world space.
#[derive(Debug, Clone, Copy)]
pub struct LightInstance {
    pub id: NodeId,
    pub light: Light,
    pub position: Vec3,
}

/// The retained scene graph.
///
/// Nodes are stored in a BTreeMap keyed by id; draw and light order comes
/// from the parent/child structure, which preserves insertion order.
/// Geometries and materials live in arenas so meshes can share them.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    geometries: Vec<Geometry>,
    materials: Vec<StandardMaterial>,
    pub fog: Option<Fog>,
    pub background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            geometries: Vec::new(),
            materials: Vec::new(),
            fog: None,
            background: Color::BLACK,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn add_material(&mut self, material: StandardMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&StandardMaterial> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut StandardMaterial> {
        self.materials.get_mut(id.0)
    }

    pub fn materials(&self) -> &[StandardMaterial] {
        &self.materials
    }

    /// Insert a node below `parent`, or as a root when `parent` is `None`.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        kind: NodeKind,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        let id = NodeId::new();
        match parent {
            Some(p) => self
                .nodes
                .get_mut(&p)
                .ok_or(SceneError::UnknownNode(p))?
                .children
                .push(id),
            None => self.roots.push(id),
        }
        self.nodes.insert(
            id,
            Node {
                name: name.into(),
                transform,
                kind,
                visible: true,
                parent,
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        self.add_node(name, Transform::default(), NodeKind::Group, parent)
    }

    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        geometry: GeometryId,
        material: MaterialId,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        self.add_node(
            name,
            transform,
            NodeKind::Mesh { geometry, material },
            parent,
        )
    }

    pub fn add_light(
        &mut self,
        name: impl Into<String>,
        light: Light,
        position: Vec3,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        self.add_node(
            name,
            Transform::from_position(position),
            NodeKind::Light(light),
            parent,
        )
    }

    /// Move `child` (and its subtree) below `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let old_parent = self
            .nodes
            .get(&child)
            .ok_or(SceneError::UnknownNode(child))?
            .parent;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }

        self.unlink(child, old_parent);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns how many nodes were removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let parent = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?.parent;
        self.unlink(id, parent);
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Remove every child subtree of `id`, keeping `id` itself.
    pub fn clear_children(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let children = self
            .nodes
            .get(&id)
            .ok_or(SceneError::UnknownNode(id))?
            .children
            .clone();
        let mut removed = 0;
        for child in children {
            removed += self.remove(child)?;
        }
        Ok(removed)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        self.nodes
            .get_mut(&id)
            .map(|n| &mut n.transform)
            .ok_or(SceneError::UnknownNode(id))
    }

    pub fn light_mut(&mut self, id: NodeId) -> Result<&mut Light, SceneError> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Light(light)) => Ok(light),
            _ => Err(SceneError::UnknownNode(id)),
        }
    }

    pub fn light(&self, id: NodeId) -> Option<&Light> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Light(light)) => Some(light),
            _ => None,
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// First node with the given name in traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.traverse(|id, node, _| {
            if found.is_none() && node.name == name {
                found = Some(id);
            }
        });
        found
    }

    /// Local-to-world matrix of a node, composing all ancestors.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        let mut m = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self
                .nodes
                .get(&parent)
                .ok_or(SceneError::UnknownNode(parent))?;
            m = node.transform.matrix() * m;
        }
        Ok(m)
    }

    /// Depth-first walk over visible nodes with their world matrices.
    pub fn traverse(&self, mut visit: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|id| (*id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            visit(id, node, world);
            stack.extend(node.children.iter().rev().map(|c| (*c, world)));
        }
    }

    /// All visible meshes in traversal order.
    pub fn meshes(&self) -> Vec<MeshInstance> {
        let mut out = Vec::new();
        self.traverse(|id, node, world| {
            if let NodeKind::Mesh { geometry, material } = node.kind {
                out.push(MeshInstance {
                    id,
                    geometry,
                    material,
                    world,
                });
            }
        });
        out
    }

    /// All visible lights in traversal order.
    pub fn lights(&self) -> Vec<LightInstance> {
        let mut out = Vec::new();
        self.traverse(|id, node, world| {
            if let NodeKind::Light(light) = node.kind {
                out.push(LightInstance {
                    id,
                    light,
                    position: world.transform_point3(Vec3::ZERO),
                });
            }
        });
        out
    }

    /// Number of mesh nodes in the subtree below `group` (excluding `group`).
    pub fn count_meshes_under(&self, group: NodeId) -> usize {
        let mut count = 0;
        let mut stack: Vec<NodeId> = self.children(group).to_vec();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                if matches!(node.kind, NodeKind::Mesh { .. }) {
                    count += 1;
                }
                stack.extend(node.children.iter().copied());
            }
        }
        count
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    fn unlink(&mut self, child: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.retain(|c| *c != child);
                }
            }
            None => self.roots.retain(|c| *c != child),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{AmbientLight, PointLight};
    use std::f32::consts::FRAC_PI_2;

    fn cube_scene() -> (Scene, GeometryId, MaterialId) {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        });
        let m = scene.add_material(StandardMaterial::default());
        (scene, g, m)
    }

    #[test]
    fn empty_scene() {
        let scene = Scene::new();
        assert_eq!(scene.node_count(), 0);
        assert!(scene.meshes().is_empty());
        assert!(scene.lights().is_empty());
    }

    #[test]
    fn child_inherits_parent_transform() {
        let (mut scene, g, m) = cube_scene();
        let house = scene.add_group("house", None).unwrap();
        scene.transform_mut(house).unwrap().position = Vec3::new(10.0, 0.0, 0.0);
        let walls = scene
            .add_mesh(
                "walls",
                g,
                m,
                Transform::from_position(Vec3::new(0.0, 1.4, 0.0)),
                Some(house),
            )
            .unwrap();

        let world = scene.world_matrix(walls).unwrap();
        let p = world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(10.0, 1.4, 0.0)).length() < 1e-6);

        let meshes = scene.meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].world, world);
    }

    #[test]
    fn light_position_follows_rotated_parent() {
        let mut scene = Scene::new();
        let group = scene.add_group("g", None).unwrap();
        scene
            .transform_mut(group)
            .unwrap()
            .set_euler(Vec3::new(0.0, FRAC_PI_2, 0.0));
        scene
            .add_light(
                "door light",
                Light::Point(PointLight::new(Color::WHITE, 1.0, 7.0)),
                Vec3::new(0.0, 2.2, 2.7),
                Some(group),
            )
            .unwrap();
        let lights = scene.lights();
        assert_eq!(lights.len(), 1);
        // +Z rotated a quarter turn about Y lands on +X.
        assert!((lights[0].position - Vec3::new(2.7, 2.2, 0.0)).length() < 1e-5);
    }

    #[test]
    fn traversal_preserves_insertion_order() {
        let (mut scene, g, m) = cube_scene();
        let group = scene.add_group("graves", None).unwrap();
        let names = ["a", "b", "c", "d"];
        for n in names {
            scene
                .add_mesh(n, g, m, Transform::default(), Some(group))
                .unwrap();
        }
        let seen: Vec<String> = scene
            .meshes()
            .iter()
            .map(|mi| scene.get(mi.id).unwrap().name.clone())
            .collect();
        assert_eq!(seen, names);
        assert_eq!(scene.count_meshes_under(group), 4);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut scene = Scene::new();
        let missing = NodeId::new();
        assert!(matches!(
            scene.add_group("orphan", Some(missing)),
            Err(SceneError::UnknownNode(id)) if id == missing
        ));
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn attach_reparents_and_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.add_group("a", None).unwrap();
        let b = scene.add_group("b", None).unwrap();
        scene.attach(a, b).unwrap();
        assert_eq!(scene.roots(), &[a]);
        assert_eq!(scene.children(a), &[b]);
        assert_eq!(scene.get(b).unwrap().parent(), Some(a));
        assert!(matches!(
            scene.attach(b, a),
            Err(SceneError::Cycle { .. })
        ));
    }

    #[test]
    fn remove_drops_subtree() {
        let (mut scene, g, m) = cube_scene();
        let group = scene.add_group("graves", None).unwrap();
        for _ in 0..3 {
            scene
                .add_mesh("grave", g, m, Transform::default(), Some(group))
                .unwrap();
        }
        assert_eq!(scene.clear_children(group).unwrap(), 3);
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.remove(group).unwrap(), 1);
        assert!(scene.roots().is_empty());
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let (mut scene, g, m) = cube_scene();
        let group = scene.add_group("bushes", None).unwrap();
        scene
            .add_mesh("bush", g, m, Transform::default(), Some(group))
            .unwrap();
        scene.get_mut(group).unwrap().visible = false;
        assert!(scene.meshes().is_empty());
    }

    #[test]
    fn find_by_name_and_light_access() {
        let mut scene = Scene::new();
        let id = scene
            .add_light(
                "ambient",
                Light::Ambient(AmbientLight::new(Color::WHITE, 0.12)),
                Vec3::ZERO,
                None,
            )
            .unwrap();
        assert_eq!(scene.find_by_name("ambient"), Some(id));
        assert_eq!(scene.find_by_name("nope"), None);
        scene.light_mut(id).unwrap().set_intensity(0.9);
        assert_eq!(scene.light(id).unwrap().intensity(), 0.9);

        let group = scene.add_group("g", None).unwrap();
        assert!(scene.light_mut(group).is_err());
    }

    #[test]
    fn fog_factor_ramps_between_near_and_far() {
        let fog = Fog {
            color: Color::BLACK,
            near: 1.0,
            far: 15.0,
        };
        assert_eq!(fog.factor(0.5), 0.0);
        assert!((fog.factor(8.0) - 0.5).abs() < 1e-6);
        assert!(fog.factor(3.0) < (3.0 - 1.0) / 14.0);
        assert_eq!(fog.factor(30.0), 1.0);
    }
}
