use haunted_assets::{ColorSpace, Texture, TextureId, TextureStore, Wrap};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

/// Material texture slot, in bind group order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextureSlot {
    Color,
    AmbientOcclusion,
    Alpha,
    Normal,
    Roughness,
    Metalness,
    Displacement,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 7] = [
        TextureSlot::Color,
        TextureSlot::AmbientOcclusion,
        TextureSlot::Alpha,
        TextureSlot::Normal,
        TextureSlot::Roughness,
        TextureSlot::Metalness,
        TextureSlot::Displacement,
    ];

    /// Texel that leaves the material unchanged when the slot is empty.
    pub fn fallback_rgba(self) -> [u8; 4] {
        match self {
            TextureSlot::Normal => [128, 128, 255, 255],
            TextureSlot::Displacement => [0, 0, 0, 255],
            _ => [255, 255, 255, 255],
        }
    }

    /// Only color maps hold sRGB-encoded data.
    pub fn is_color(self) -> bool {
        self == TextureSlot::Color
    }
}

fn address_mode(wrap: Wrap) -> wgpu::AddressMode {
    match wrap {
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        Wrap::Repeat => wgpu::AddressMode::Repeat,
    }
}

pub fn texture_format(color_space: ColorSpace) -> wgpu::TextureFormat {
    match color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// A texture resident on the GPU.
pub struct GpuTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, texture: &Texture) -> Self {
        let gpu = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&texture.label),
                size: wgpu::Extent3d {
                    width: texture.width,
                    height: texture.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture_format(texture.color_space),
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &texture.rgba,
        );
        let view = gpu.create_view(&Default::default());
        Self {
            _texture: gpu,
            view,
        }
    }
}

/// GPU copies of every loaded texture in a [`TextureStore`], plus one
/// fallback per slot for materials that leave a slot empty.
pub struct TextureCache {
    textures: BTreeMap<TextureId, GpuTexture>,
    fallbacks: [GpuTexture; 7],
    clamp_sampler: wgpu::Sampler,
    repeat_sampler: wgpu::Sampler,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, store: &TextureStore) -> Self {
        // Placeholders are left out so their slots use the neutral fallback.
        let textures: BTreeMap<_, _> = store
            .iter()
            .filter(|(_, texture)| !texture.placeholder)
            .map(|(id, texture)| (*id, GpuTexture::upload(device, queue, texture)))
            .collect();

        let fallbacks = TextureSlot::ALL.map(|slot| {
            let mut texture = Texture::solid(format!("{slot:?} fallback"), slot.fallback_rgba());
            if slot.is_color() {
                texture.color_space = ColorSpace::Srgb;
            }
            GpuTexture::upload(device, queue, &texture)
        });

        tracing::debug!("uploaded {} textures", textures.len());
        Self {
            textures,
            fallbacks,
            clamp_sampler: Self::create_sampler(device, Wrap::ClampToEdge),
            repeat_sampler: Self::create_sampler(device, Wrap::Repeat),
        }
    }

    /// View for `id` in `slot`, falling back to the slot default.
    pub fn view(&self, slot: TextureSlot, id: Option<TextureId>) -> &wgpu::TextureView {
        &id.and_then(|id| self.textures.get(&id))
            .unwrap_or(&self.fallbacks[slot as usize])
            .view
    }

    pub fn sampler(&self, wrap: Wrap) -> &wgpu::Sampler {
        match wrap {
            Wrap::ClampToEdge => &self.clamp_sampler,
            Wrap::Repeat => &self.repeat_sampler,
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn create_sampler(device: &wgpu::Device, wrap: Wrap) -> wgpu::Sampler {
        let mode = address_mode(wrap);
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(match wrap {
                Wrap::ClampToEdge => "clamp_sampler",
                Wrap::Repeat => "repeat_sampler",
            }),
            address_mode_u: mode,
            address_mode_v: mode,
            address_mode_w: mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_are_neutral() {
        assert_eq!(TextureSlot::Color.fallback_rgba(), [255; 4]);
        assert_eq!(TextureSlot::AmbientOcclusion.fallback_rgba(), [255; 4]);
        assert_eq!(TextureSlot::Normal.fallback_rgba(), [128, 128, 255, 255]);
        assert_eq!(TextureSlot::Displacement.fallback_rgba()[..3], [0, 0, 0]);
    }

    #[test]
    fn color_space_picks_format() {
        assert_eq!(
            texture_format(ColorSpace::Srgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            texture_format(ColorSpace::Linear),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert_eq!(address_mode(Wrap::Repeat), wgpu::AddressMode::Repeat);
    }
}
