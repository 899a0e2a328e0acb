use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Texture coordinate wrapping outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Wrap {
    #[default]
    ClampToEdge,
    Repeat,
}

/// How texel values are interpreted by the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Color maps authored in sRGB.
    Srgb,
    /// Data maps: ambient occlusion, normals, roughness, heights.
    #[default]
    Linear,
}

/// Sampling parameters attached to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerSettings {
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    /// UV multiplier; only visible when the matching axis wraps with `Repeat`.
    pub repeat: Vec2,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
            repeat: Vec2::ONE,
        }
    }
}

/// Decoded RGBA8 image plus sampling parameters.
#[derive(Debug, Clone)]
pub struct Texture {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub color_space: ColorSpace,
    pub sampler: SamplerSettings,
    /// True when the source could not be loaded and this is a stand-in.
    pub placeholder: bool,
}

impl Texture {
    /// A single-texel texture filled with `rgba`.
    pub fn solid(label: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            label: label.into(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
            color_space: ColorSpace::Linear,
            sampler: SamplerSettings::default(),
            placeholder: false,
        }
    }

    pub(crate) fn placeholder(label: impl Into<String>) -> Self {
        Self {
            placeholder: true,
            ..Self::solid(label, [255, 255, 255, 255])
        }
    }
}
