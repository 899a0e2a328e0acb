//! Texture pipeline for the haunted house scene.
//!
//! Textures are identified by content-addressed handles derived from their
//! source path. The renderer consumes textures by handle, never by raw file
//! paths.
//!
//! # Invariants
//! - Loading never fails the scene: unreadable files degrade to a 1x1
//!   placeholder and a warning.
//! - The same path loaded twice yields the same handle and is decoded once.

mod house;
mod store;
mod texture;

pub use house::{DoorTextures, HouseTextures, SurfaceTextures};
pub use store::{AssetError, TextureId, TextureStore};
pub use texture::{ColorSpace, SamplerSettings, Texture, Wrap};

pub fn crate_info() -> &'static str {
    concat!("haunted-assets v", env!("CARGO_PKG_VERSION"))
}
