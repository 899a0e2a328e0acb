//! CPU-side uniform blocks and draw ordering.
//!
//! Layouts mirror the WGSL structs in [`crate::shaders`]; every member is a
//! 16-byte vector so no implicit padding is needed.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use haunted_render::PerspectiveCamera;
use haunted_scene::{Light, MeshInstance, Scene, StandardMaterial};

pub const MAX_DIRECTIONAL_LIGHTS: usize = 2;
pub const MAX_POINT_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// Linear fog color; `w` is 1 when fog is on.
    pub fog_color: [f32; 4],
    /// `near, far, 0, 0`.
    pub fog_range: [f32; 4],
    /// Summed ambient radiance.
    pub ambient: [f32; 4],
    pub directional_color: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// Unit vectors pointing towards each light.
    pub directional_direction: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// World position, `w` is the range.
    pub point_position: [[f32; 4]; MAX_POINT_LIGHTS],
    /// Radiance, `w` is the decay exponent.
    pub point_color: [[f32; 4]; MAX_POINT_LIGHTS],
    /// Directional count, point count.
    pub counts: [u32; 4],
}

fn radiance(light: &Light) -> Vec3 {
    Vec3::from_array(light.color().to_linear()) * light.intensity()
}

impl FrameUniforms {
    pub fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut u = Self::zeroed();
        u.view_proj = camera.view_projection().to_cols_array_2d();
        u.camera_position = camera.position.extend(1.0).to_array();

        if let Some(fog) = scene.fog {
            let [r, g, b] = fog.color.to_linear();
            u.fog_color = [r, g, b, 1.0];
            u.fog_range = [fog.near, fog.far, 0.0, 0.0];
        }

        let mut ambient = Vec3::ZERO;
        let mut directional = 0;
        let mut point = 0;
        let mut dropped = 0;
        for instance in scene.lights() {
            let light = instance.light;
            match light {
                Light::Ambient(_) => ambient += radiance(&light),
                Light::Directional(d) if directional < MAX_DIRECTIONAL_LIGHTS => {
                    let towards = -d.direction(instance.position);
                    u.directional_color[directional] = radiance(&light).extend(0.0).to_array();
                    u.directional_direction[directional] = towards.extend(0.0).to_array();
                    directional += 1;
                }
                Light::Point(p) if point < MAX_POINT_LIGHTS => {
                    u.point_position[point] = instance.position.extend(p.distance).to_array();
                    u.point_color[point] = radiance(&light).extend(p.decay).to_array();
                    point += 1;
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::debug!("{dropped} lights over the per-frame limit were skipped");
        }
        u.ambient = ambient.extend(0.0).to_array();
        u.counts = [directional as u32, point as u32, 0, 0];
        u
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MaterialUniforms {
    /// Linear base color, `w` is opacity.
    pub color: [f32; 4],
    /// Roughness, metalness, AO intensity, normal scale.
    pub params: [f32; 4],
    /// Displacement scale, displacement bias, UV repeat.
    pub displacement: [f32; 4],
    /// Alpha map, normal map, displacement map, transparent.
    pub flags: [u32; 4],
}

impl MaterialUniforms {
    pub fn new(material: &StandardMaterial, uv_repeat: Vec2) -> Self {
        let [r, g, b] = material.color.to_linear();
        let flag = |b: bool| b as u32;
        Self {
            color: [r, g, b, material.opacity],
            params: [
                material.roughness,
                material.metalness,
                material.ao_intensity,
                material.normal_scale,
            ],
            displacement: [
                material.displacement_scale,
                material.displacement_bias,
                uv_repeat.x,
                uv_repeat.y,
            ],
            flags: [
                flag(material.alpha_map.is_some()),
                flag(material.normal_map.is_some()),
                flag(material.displacement_map.is_some()),
                flag(material.transparent),
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MeshUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
}

impl MeshUniforms {
    pub fn new(world: Mat4) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Visible meshes in draw order: opaque meshes in scene order, then blended
/// meshes back to front.
pub fn draw_order(scene: &Scene, camera: &PerspectiveCamera) -> Vec<MeshInstance> {
    let (mut blended, mut opaque): (Vec<_>, Vec<_>) =
        scene.meshes().into_iter().partition(|mesh| {
            scene
                .material(mesh.material)
                .is_some_and(StandardMaterial::is_blended)
        });
    let depth = |m: &MeshInstance| {
        m.world
            .transform_point3(Vec3::ZERO)
            .distance_squared(camera.position)
    };
    blended.sort_by(|a, b| depth(b).total_cmp(&depth(a)));
    opaque.append(&mut blended);
    opaque
}
