//! Assembly of the haunted house scene.

use crate::config::SceneConfig;
use crate::geometry::Geometry;
use crate::graves::{ScatterParams, scatter, spawn_graves};
use crate::light::{AmbientLight, DirectionalLight, Light, PointLight};
use crate::material::StandardMaterial;
use crate::scene::{Fog, GeometryId, MaterialId, Scene, SceneError};
use glam::Vec3;
use haunted_assets::HouseTextures;
use haunted_common::{Color, NodeId, Transform};
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

const WALL_HEIGHT: f32 = 2.8;
const ROOF_HEIGHT: f32 = 1.0;
const DOOR_SIZE: f32 = 2.5;

/// Handles to the nodes and resources the app keeps poking at after setup.
#[derive(Debug, Clone)]
pub struct HouseHandles {
    pub house: NodeId,
    pub walls: NodeId,
    pub roof: NodeId,
    pub door: NodeId,
    pub door_light: NodeId,
    pub bush_group: NodeId,
    pub bushes: Vec<NodeId>,
    pub graves: NodeId,
    pub floor: NodeId,
    pub ambient_light: NodeId,
    pub moon_light: NodeId,
    pub grave_geometry: GeometryId,
    pub grave_material: MaterialId,
}

/// Position and uniform scale of each bush next to the door.
const BUSHES: [([f32; 3], f32); 4] = [
    ([0.8, 0.2, 2.2], 0.5),
    ([1.4, 0.1, 2.1], 0.25),
    ([-0.8, 0.2, 2.2], 0.4),
    ([-1.0, 0.05, 2.6], 0.15),
];

/// Populate `scene` with the house, its surroundings, the graves and lights.
///
/// Graves are scattered with `rng`; pass a seeded generator for a
/// reproducible layout.
pub fn build_haunted_house<R: Rng + ?Sized>(
    scene: &mut Scene,
    textures: &HouseTextures,
    config: &SceneConfig,
    rng: &mut R,
) -> Result<HouseHandles, SceneError> {
    scene.fog = Some(Fog {
        color: config.fog.color,
        near: config.fog.near,
        far: config.fog.far,
    });
    scene.background = config.fog.color;

    let house = scene.add_group("house", None)?;

    let walls_geometry = scene.add_geometry(Geometry::Box {
        width: 4.0,
        height: WALL_HEIGHT,
        depth: 4.0,
    });
    let bricks = textures.bricks;
    let walls_material = scene.add_material(StandardMaterial {
        map: Some(bricks.color),
        ao_map: Some(bricks.ambient_occlusion),
        normal_map: Some(bricks.normal),
        roughness_map: Some(bricks.roughness),
        ..StandardMaterial::colored("bricks", Color::WHITE)
    });
    let walls = scene.add_mesh(
        "walls",
        walls_geometry,
        walls_material,
        Transform::from_position(Vec3::new(0.0, WALL_HEIGHT / 2.0, 0.0)),
        Some(house),
    )?;

    let roof_geometry = scene.add_geometry(Geometry::Cone {
        radius: 3.5,
        height: ROOF_HEIGHT,
        radial_segments: 4,
    });
    let roof_material = scene.add_material(StandardMaterial::colored(
        "roof",
        Color::from_hex(0xb35f45),
    ));
    let roof = scene.add_mesh(
        "roof",
        roof_geometry,
        roof_material,
        Transform::from_euler_xyz(
            Vec3::new(0.0, WALL_HEIGHT + ROOF_HEIGHT / 2.0, 0.0),
            Vec3::new(0.0, FRAC_PI_4, 0.0),
        ),
        Some(house),
    )?;

    let door_geometry = scene.add_geometry(Geometry::Plane {
        width: DOOR_SIZE,
        height: DOOR_SIZE,
        width_segments: 100,
        height_segments: 100,
    });
    let door_maps = textures.door;
    let door_material = scene.add_material(StandardMaterial {
        map: Some(door_maps.color),
        transparent: true,
        alpha_map: Some(door_maps.alpha),
        ao_map: Some(door_maps.ambient_occlusion),
        displacement_map: Some(door_maps.height),
        displacement_scale: 0.1,
        normal_map: Some(door_maps.normal),
        metalness_map: Some(door_maps.metalness),
        roughness_map: Some(door_maps.roughness),
        ..StandardMaterial::colored("door", Color::WHITE)
    });
    let door = scene.add_mesh(
        "door",
        door_geometry,
        door_material,
        Transform::from_position(Vec3::new(0.0, 1.13, 2.01)),
        Some(house),
    )?;

    let dl = &config.door_light;
    let door_light = scene.add_light(
        "door light",
        Light::Point(PointLight::new(dl.color, dl.intensity, dl.distance)),
        Vec3::from_array(dl.position),
        Some(house),
    )?;

    let bush_group = scene.add_group("bushes", None)?;
    let bush_geometry = scene.add_geometry(Geometry::Sphere {
        radius: 1.0,
        width_segments: 16,
        height_segments: 16,
    });
    let bush_material =
        scene.add_material(StandardMaterial::colored("bush", "green".parse()?));
    let bushes = BUSHES
        .iter()
        .enumerate()
        .map(|(i, (position, scale))| {
            scene.add_mesh(
                format!("bush_{i}"),
                bush_geometry,
                bush_material,
                Transform::from_position(Vec3::from_array(*position))
                    .with_scale(Vec3::splat(*scale)),
                Some(bush_group),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let graves = scene.add_group("graves", None)?;
    let grave_geometry = scene.add_geometry(Geometry::Box {
        width: 0.6,
        height: 0.8,
        depth: 0.2,
    });
    let grave_material =
        scene.add_material(StandardMaterial::colored("grave", "grey ".parse()?));
    let params = ScatterParams::from(&config.graves);
    let placements = scatter(config.graves.count, &params, rng);
    spawn_graves(scene, graves, &placements, grave_geometry, grave_material)?;

    let floor_geometry = scene.add_geometry(Geometry::Plane {
        width: 20.0,
        height: 20.0,
        width_segments: 1,
        height_segments: 1,
    });
    let grass = textures.grass;
    let floor_material = scene.add_material(StandardMaterial {
        map: Some(grass.color),
        ao_map: Some(grass.ambient_occlusion),
        normal_map: Some(grass.normal),
        roughness_map: Some(grass.roughness),
        ..StandardMaterial::colored("grass", Color::WHITE)
    });
    let floor = scene.add_mesh(
        "floor",
        floor_geometry,
        floor_material,
        Transform::from_euler_xyz(Vec3::ZERO, Vec3::new(-FRAC_PI_2, 0.0, 0.0)),
        None,
    )?;

    let ambient_light = scene.add_light(
        "ambient light",
        Light::Ambient(AmbientLight::new(
            config.ambient.color,
            config.ambient.intensity,
        )),
        Vec3::ZERO,
        None,
    )?;
    let moon_light = scene.add_light(
        "moon light",
        Light::Directional(DirectionalLight::new(
            config.moon.color,
            config.moon.intensity,
        )),
        Vec3::from_array(config.moon.position),
        None,
    )?;

    tracing::info!(
        "built haunted house: {} nodes, {} graves",
        scene.node_count(),
        placements.len()
    );

    Ok(HouseHandles {
        house,
        walls,
        roof,
        door,
        door_light,
        bush_group,
        bushes,
        graves,
        floor,
        ambient_light,
        moon_light,
        grave_geometry,
        grave_material,
    })
}

/// Replace every grave with a fresh scatter of `count` graves.
///
/// Returns the number of graves now in the scene.
pub fn regenerate_graves<R: Rng + ?Sized>(
    scene: &mut Scene,
    handles: &HouseHandles,
    params: &ScatterParams,
    count: usize,
    rng: &mut R,
) -> Result<usize, SceneError> {
    let removed = scene.clear_children(handles.graves)?;
    let placements = scatter(count, params, rng);
    let spawned = spawn_graves(
        scene,
        handles.graves,
        &placements,
        handles.grave_geometry,
        handles.grave_material,
    )?;
    tracing::debug!("regenerated graves: removed {removed}, spawned {}", spawned.len());
    Ok(spawned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;
    use haunted_assets::TextureStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn build(count: usize, seed: u64) -> (Scene, HouseHandles) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TextureStore::new();
        let textures = HouseTextures::load(&mut store, dir.path()).unwrap();
        let mut config = SceneConfig::default();
        config.graves.count = count;
        let mut scene = Scene::new();
        let handles = build_haunted_house(
            &mut scene,
            &textures,
            &config,
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap();
        (scene, handles)
    }

    #[test]
    fn default_scene_has_fifty_graves() {
        let (scene, handles) = build(50, 1);
        assert_eq!(scene.count_meshes_under(handles.graves), 50);
        // walls, roof, door
        assert_eq!(scene.count_meshes_under(handles.house), 3);
        assert_eq!(scene.count_meshes_under(handles.bush_group), 4);
        assert!(scene.roots().contains(&handles.bush_group));
        for bush in &handles.bushes {
            assert_eq!(scene.get(*bush).unwrap().parent(), Some(handles.bush_group));
        }
        // 3 house meshes + 4 bushes + 50 graves + floor
        assert_eq!(scene.meshes().len(), 58);
        assert_eq!(scene.lights().len(), 3);
        for id in scene.children(handles.graves) {
            let p = scene.get(*id).unwrap().transform.position;
            let r = Vec3::new(p.x, 0.0, p.z).length();
            assert!((4.0 - 1e-4..10.0 + 1e-4).contains(&r));
        }
    }

    #[test]
    fn zero_graves_leaves_an_empty_group() {
        let (scene, handles) = build(0, 1);
        assert_eq!(scene.count_meshes_under(handles.graves), 0);
        assert!(scene.children(handles.graves).is_empty());
    }

    #[test]
    fn fog_and_background_share_a_color() {
        let (scene, _) = build(1, 1);
        let fog = scene.fog.unwrap();
        assert_eq!(fog.color.to_rgb8(), [6, 44, 44]);
        assert_eq!((fog.near, fog.far), (1.0, 15.0));
        assert_eq!(scene.background, fog.color);
    }

    #[test]
    fn house_parts_are_placed() {
        let (scene, handles) = build(0, 1);
        let walls = scene.get(handles.walls).unwrap();
        assert_eq!(walls.transform.position, Vec3::new(0.0, 1.4, 0.0));
        let roof = scene.get(handles.roof).unwrap();
        assert!((roof.transform.position.y - 3.3).abs() < 1e-6);
        assert!((roof.transform.euler().y - FRAC_PI_4).abs() < 1e-5);

        let door_world = scene.world_matrix(handles.door).unwrap();
        let p = door_world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 1.13, 2.01)).length() < 1e-6);

        let lights = scene.lights();
        let door_light = lights.iter().find(|l| l.id == handles.door_light).unwrap();
        assert!((door_light.position - Vec3::new(0.0, 2.2, 2.7)).length() < 1e-6);
        let Light::Point(point) = door_light.light else {
            panic!("door light should be a point light");
        };
        assert_eq!(point.distance, 7.0);
        assert_eq!(point.color.to_string(), "#ff7d46");

        let floor = scene.world_matrix(handles.floor).unwrap();
        let up = floor.transform_vector3(Vec3::Z);
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn door_material_is_blended_and_displaced() {
        let (scene, handles) = build(0, 1);
        let NodeKind::Mesh { material, .. } = scene.get(handles.door).unwrap().kind else {
            panic!("door should be a mesh");
        };
        let m = scene.material(material).unwrap();
        assert!(m.is_blended());
        assert_eq!(m.displacement_scale, 0.1);
        assert_eq!(m.textures().count(), 7);
    }

    #[test]
    fn bushes_are_scaled() {
        let (scene, handles) = build(0, 1);
        let scales: Vec<f32> = handles
            .bushes
            .iter()
            .map(|id| scene.get(*id).unwrap().transform.scale.x)
            .collect();
        assert_eq!(scales, vec![0.5, 0.25, 0.4, 0.15]);
    }

    #[test]
    fn named_colors_resolve() {
        let (scene, handles) = build(0, 1);
        let NodeKind::Mesh { material, .. } = scene.get(handles.bushes[0]).unwrap().kind else {
            panic!("bush should be a mesh");
        };
        assert_eq!(scene.material(material).unwrap().color.to_rgb8(), [0, 128, 0]);
        let grave = scene.material(handles.grave_material).unwrap();
        assert_eq!(grave.color.to_rgb8(), [128, 128, 128]);
    }

    #[test]
    fn same_seed_builds_same_graves() {
        let (a, ha) = build(50, 99);
        let (b, hb) = build(50, 99);
        let positions = |s: &Scene, h: &HouseHandles| -> Vec<Vec3> {
            s.children(h.graves)
                .iter()
                .map(|id| s.get(*id).unwrap().transform.position)
                .collect()
        };
        assert_eq!(positions(&a, &ha), positions(&b, &hb));
    }

    #[test]
    fn regenerate_replaces_graves() {
        let (mut scene, handles) = build(50, 3);
        let before = scene.node_count();
        let count = regenerate_graves(
            &mut scene,
            &handles,
            &ScatterParams::default(),
            20,
            &mut StdRng::seed_from_u64(4),
        )
        .unwrap();
        assert_eq!(count, 20);
        assert_eq!(scene.count_meshes_under(handles.graves), 20);
        assert_eq!(scene.node_count(), before - 30);
    }
}
