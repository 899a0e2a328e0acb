use crate::texture::{ColorSpace, SamplerSettings, Texture, Wrap};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Content-addressed texture handle computed from the source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// Errors from texture operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("texture not found: {0:?}")]
    NotFound(TextureId),
}

/// Registry of decoded textures.
///
/// `load` is the forgiving entry point used by scene assembly: a texture
/// that cannot be read is replaced by a white placeholder so the material
/// falls back to its base color.
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: BTreeMap<TextureId, Texture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that `load`/`try_load` would return for `path`.
    pub fn id_for(path: impl AsRef<Path>) -> TextureId {
        let normalized = path.as_ref().to_string_lossy().replace('\\', "/");
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        TextureId(u64::from_le_bytes(bytes))
    }

    /// Load a texture, substituting a placeholder on failure.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureId {
        let path = path.as_ref();
        match self.try_load(path) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("using placeholder texture: {e}");
                let id = Self::id_for(path);
                self.textures
                    .insert(id, Texture::placeholder(path.display().to_string()));
                id
            }
        }
    }

    /// Load a texture, returning the decode or IO error.
    pub fn try_load(&mut self, path: impl AsRef<Path>) -> Result<TextureId, AssetError> {
        let path = path.as_ref();
        let id = Self::id_for(path);
        if self.textures.contains_key(&id) {
            return Ok(id);
        }

        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        tracing::debug!("loaded texture {} ({width}x{height})", path.display());

        self.textures.insert(
            id,
            Texture {
                label: path.display().to_string(),
                width,
                height,
                rgba: decoded.into_raw(),
                color_space: ColorSpace::Linear,
                sampler: SamplerSettings::default(),
                placeholder: false,
            },
        );
        Ok(id)
    }

    /// Register an in-memory texture under a synthetic name.
    pub fn insert(&mut self, name: &str, texture: Texture) -> TextureId {
        let id = Self::id_for(name);
        self.textures.insert(id, texture);
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    pub fn get_mut(&mut self, id: TextureId) -> Result<&mut Texture, AssetError> {
        self.textures.get_mut(&id).ok_or(AssetError::NotFound(id))
    }

    pub fn set_color_space(
        &mut self,
        id: TextureId,
        color_space: ColorSpace,
    ) -> Result<(), AssetError> {
        self.get_mut(id)?.color_space = color_space;
        Ok(())
    }

    pub fn set_repeat(&mut self, id: TextureId, u: f32, v: f32) -> Result<(), AssetError> {
        self.get_mut(id)?.sampler.repeat = glam::Vec2::new(u, v);
        Ok(())
    }

    pub fn set_wrap(&mut self, id: TextureId, wrap_s: Wrap, wrap_t: Wrap) -> Result<(), AssetError> {
        let sampler = &mut self.get_mut(id)?.sampler;
        sampler.wrap_s = wrap_s;
        sampler.wrap_t = wrap_t;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TextureId, &Texture)> {
        self.textures.iter()
    }

    /// Number of textures that fell back to a placeholder.
    pub fn placeholder_count(&self) -> usize {
        self.textures.values().filter(|t| t.placeholder).count()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, color: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(4, 2, Rgba(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "red.png", [200, 10, 10, 255]);

        let mut store = TextureStore::new();
        let id = store.try_load(&path).unwrap();
        let tex = store.get(id).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.rgba.len(), 4 * 2 * 4);
        assert_eq!(&tex.rgba[..4], &[200, 10, 10, 255]);
        assert!(!tex.placeholder);
    }

    #[test]
    fn same_path_is_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", [1, 2, 3, 255]);

        let mut store = TextureStore::new();
        let a = store.load(&path);
        let b = store.load(&path);
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_file_degrades_to_placeholder() {
        let mut store = TextureStore::new();
        let id = store.load("does/not/exist.jpg");
        let tex = store.get(id).unwrap();
        assert!(tex.placeholder);
        assert_eq!(tex.rgba, vec![255, 255, 255, 255]);
        assert_eq!(store.placeholder_count(), 1);
    }

    #[test]
    fn try_load_reports_io_and_decode_errors() {
        let mut store = TextureStore::new();
        assert!(matches!(
            store.try_load("missing.png"),
            Err(AssetError::Io { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.jpg");
        std::fs::write(&bogus, b"not an image").unwrap();
        assert!(matches!(
            store.try_load(&bogus),
            Err(AssetError::Decode { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn sampler_settings_are_mutable_by_handle() {
        let mut store = TextureStore::new();
        let id = store.load("grass/color.jpg");
        store.set_repeat(id, 8.0, 8.0).unwrap();
        store.set_wrap(id, Wrap::Repeat, Wrap::Repeat).unwrap();
        let s = store.get(id).unwrap().sampler;
        assert_eq!(s.repeat, glam::Vec2::splat(8.0));
        assert_eq!(s.wrap_t, Wrap::Repeat);

        let unknown = TextureId(7);
        assert!(matches!(
            store.set_repeat(unknown, 1.0, 1.0),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn path_separators_do_not_change_handle() {
        assert_eq!(
            TextureStore::id_for("textures\\door\\color.jpg"),
            TextureStore::id_for("textures/door/color.jpg")
        );
    }
}
