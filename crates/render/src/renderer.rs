use crate::camera::PerspectiveCamera;
use haunted_scene::{NodeKind, Scene};

/// Renderer-agnostic interface.
///
/// A renderer reads the scene and camera and produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen from `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Text renderer for the CLI, logs and tests.
///
/// Lists every visible mesh and light with its world position.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let meshes = scene.meshes();
        let lights = scene.lights();
        let mut out = String::new();
        out.push_str(&format!("=== Scene (frame={}) ===\n", self.frames));
        out.push_str(&format!(
            "Nodes: {}  Meshes: {}  Lights: {}\n",
            scene.node_count(),
            meshes.len(),
            lights.len()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}\n",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees,
            camera.aspect
        ));
        match scene.fog {
            Some(fog) => out.push_str(&format!(
                "Fog: {} {:.1}..{:.1}\n",
                fog.color, fog.near, fog.far
            )),
            None => out.push_str("Fog: none\n"),
        }

        for mesh in &meshes {
            let Some(node) = scene.get(mesh.id) else {
                continue;
            };
            let kind = scene
                .geometry(mesh.geometry)
                .map(|g| g.kind_name())
                .unwrap_or("?");
            let p = mesh.world.transform_point3(glam::Vec3::ZERO);
            out.push_str(&format!(
                "  [{}] {} {} pos=({:.2}, {:.2}, {:.2})\n",
                mesh.id.short(),
                node.name,
                kind,
                p.x,
                p.y,
                p.z
            ));
        }
        for light in &lights {
            let name = scene
                .get(light.id)
                .filter(|n| matches!(n.kind, NodeKind::Light(_)))
                .map(|n| n.name.as_str())
                .unwrap_or("?");
            out.push_str(&format!(
                "  [{}] {} {} {} x{:.2} pos=({:.2}, {:.2}, {:.2})\n",
                light.id.short(),
                name,
                light.light.kind_name(),
                light.light.color(),
                light.light.intensity(),
                light.position.x,
                light.position.y,
                light.position.z
            ));
        }

        self.frames += 1;
        out
    }
}
