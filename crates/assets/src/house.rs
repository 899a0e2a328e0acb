use crate::store::{AssetError, TextureId, TextureStore};
use crate::texture::{ColorSpace, Wrap};
use std::path::Path;

/// How many times the grass maps tile across the floor.
pub const GRASS_REPEAT: f32 = 8.0;

/// Every map the door material uses.
#[derive(Debug, Clone, Copy)]
pub struct DoorTextures {
    pub color: TextureId,
    pub alpha: TextureId,
    pub ambient_occlusion: TextureId,
    pub height: TextureId,
    pub metalness: TextureId,
    pub normal: TextureId,
    pub roughness: TextureId,
}

/// Color, ambient occlusion, normal and roughness maps of a tiled surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceTextures {
    pub color: TextureId,
    pub ambient_occlusion: TextureId,
    pub normal: TextureId,
    pub roughness: TextureId,
}

/// The fixed texture set of the haunted house.
#[derive(Debug, Clone, Copy)]
pub struct HouseTextures {
    pub door: DoorTextures,
    pub bricks: SurfaceTextures,
    pub grass: SurfaceTextures,
}

impl SurfaceTextures {
    fn load(store: &mut TextureStore, dir: &Path) -> Self {
        Self {
            color: store.load(dir.join("color.jpg")),
            ambient_occlusion: store.load(dir.join("ambientOcclusion.jpg")),
            normal: store.load(dir.join("normal.jpg")),
            roughness: store.load(dir.join("roughness.jpg")),
        }
    }

    pub fn all(&self) -> [TextureId; 4] {
        [self.color, self.ambient_occlusion, self.normal, self.roughness]
    }
}

impl HouseTextures {
    /// Load all house textures from `root/textures/...`.
    ///
    /// Missing files become placeholders. Grass maps tile 8x8 with repeat
    /// wrapping; color maps are tagged sRGB.
    pub fn load(store: &mut TextureStore, root: impl AsRef<Path>) -> Result<Self, AssetError> {
        let textures = root.as_ref().join("textures");
        let door_dir = textures.join("door");
        let door = DoorTextures {
            color: store.load(door_dir.join("color.jpg")),
            alpha: store.load(door_dir.join("alpha.jpg")),
            ambient_occlusion: store.load(door_dir.join("ambientOcclusion.jpg")),
            height: store.load(door_dir.join("height.jpg")),
            metalness: store.load(door_dir.join("metalness.jpg")),
            normal: store.load(door_dir.join("normal.jpg")),
            roughness: store.load(door_dir.join("roughness.jpg")),
        };
        let bricks = SurfaceTextures::load(store, &textures.join("bricks"));
        let grass = SurfaceTextures::load(store, &textures.join("grass"));

        for id in [door.color, bricks.color, grass.color] {
            store.set_color_space(id, ColorSpace::Srgb)?;
        }
        for id in grass.all() {
            store.set_repeat(id, GRASS_REPEAT, GRASS_REPEAT)?;
            store.set_wrap(id, Wrap::Repeat, Wrap::Repeat)?;
        }

        let missing = store.placeholder_count();
        if missing > 0 {
            tracing::warn!(
                "{missing} house textures missing under {}",
                textures.display()
            );
        } else {
            tracing::info!("loaded {} house textures", store.len());
        }

        Ok(Self {
            door,
            bricks,
            grass,
        })
    }
}
