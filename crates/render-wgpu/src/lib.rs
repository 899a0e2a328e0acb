//! wgpu render backend for the haunted house.
//!
//! Draws every visible mesh of the scene with one standard-material pipeline:
//! textured surfaces, ambient, directional and point lights, and fog.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Geometries and textures are uploaded once; per-frame work only writes
//!   uniforms.
//! - Opaque meshes are drawn before blended ones.

mod gpu;
mod shaders;
mod textures;
mod uniforms;

pub use gpu::WgpuRenderer;
pub use textures::TextureSlot;
pub use uniforms::{FrameUniforms, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, draw_order};
