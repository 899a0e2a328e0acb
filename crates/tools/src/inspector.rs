use haunted_common::NodeId;
use haunted_scene::{NodeKind, Scene};

/// Name of the group that parents the scattered graves.
const GRAVES_GROUP: &str = "graves";

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene graph for the debug panel and the
/// CLI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let meshes = scene.meshes();
        let blended = meshes
            .iter()
            .filter(|m| {
                scene
                    .material(m.material)
                    .is_some_and(|mat| mat.is_blended())
            })
            .count();
        SceneSummary {
            nodes: scene.node_count(),
            meshes: meshes.len(),
            blended_meshes: blended,
            lights: scene.lights().len(),
            graves: scene
                .find_by_name(GRAVES_GROUP)
                .map(|g| scene.count_meshes_under(g))
                .unwrap_or(0),
            fog: scene.fog.map(|f| (f.near, f.far)),
        }
    }

    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        let node = scene.get(id)?;
        let world = scene.world_matrix(id).ok()?;
        let kind = match &node.kind {
            NodeKind::Group => "group",
            NodeKind::Mesh { .. } => "mesh",
            NodeKind::Light(light) => light.kind_name(),
        };
        let s = node.transform.scale;
        Some(NodeInfo {
            id,
            name: node.name.clone(),
            kind,
            world_position: world.transform_point3(glam::Vec3::ZERO).to_array(),
            scale: [s.x, s.y, s.z],
            children: node.children().len(),
        })
    }

    /// Node ids in traversal order.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(scene.node_count());
        scene.traverse(|id, _, _| ids.push(id));
        ids
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub blended_meshes: usize,
    pub lights: usize,
    pub graves: usize,
    pub fog: Option<(f32, f32)>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} (blended={}) lights={} graves={}",
            self.nodes, self.meshes, self.blended_meshes, self.lights, self.graves
        )?;
        if let Some((near, far)) = self.fog {
            write!(f, " fog={near:.1}..{far:.1}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub world_position: [f32; 3],
    pub scale: [f32; 3],
    pub children: usize,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] {} ({}) pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}) children={}",
            self.id.short(),
            self.name,
            self.kind,
            self.world_position[0],
            self.world_position[1],
            self.world_position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
            self.children,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::summary(&Scene::new());
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.graves, 0);
        assert_eq!(summary.fog, None);
    }

    #[test]
    fn summary_counts_house() {
        let (scene, _) = fixture::house(12);
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.graves, 12);
        assert_eq!(summary.meshes, 7 + 12 + 1);
        assert_eq!(summary.blended_meshes, 1);
        assert_eq!(summary.lights, 3);
        assert_eq!(summary.fog, Some((1.0, 15.0)));
        assert!(summary.to_string().contains("graves=12"));
    }

    #[test]
    fn inspect_node_reports_world_position() {
        let (scene, handles) = fixture::house(0);
        let info = SceneInspector::inspect_node(&scene, handles.door_light).unwrap();
        assert_eq!(info.kind, "point");
        assert!((info.world_position[1] - 2.2).abs() < 1e-5);
        assert_eq!(info.name, "door light");
        assert!(info.to_string().contains("door light (point)"));
    }

    #[test]
    fn inspect_missing_node() {
        let scene = Scene::new();
        assert!(SceneInspector::inspect_node(&scene, NodeId::new()).is_none());
    }

    #[test]
    fn list_nodes_in_traversal_order() {
        let (scene, handles) = fixture::house(2);
        let ids = SceneInspector::list_nodes(&scene);
        assert_eq!(ids.len(), scene.node_count());
        assert_eq!(ids[0], handles.house);
    }
}
