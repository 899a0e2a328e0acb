use haunted_assets::TextureId;
use haunted_common::Color;

/// Metallic-roughness surface description.
///
/// Each optional map modulates the matching scalar; a missing map leaves the
/// scalar as is.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub name: String,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub map: Option<TextureId>,
    pub ao_map: Option<TextureId>,
    pub ao_intensity: f32,
    pub alpha_map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub normal_scale: f32,
    pub roughness_map: Option<TextureId>,
    pub metalness_map: Option<TextureId>,
    pub displacement_map: Option<TextureId>,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    /// Blend with what is behind instead of overwriting it.
    pub transparent: bool,
    pub opacity: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            name: "default".into(),
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            map: None,
            ao_map: None,
            ao_intensity: 1.0,
            alpha_map: None,
            normal_map: None,
            normal_scale: 1.0,
            roughness_map: None,
            metalness_map: None,
            displacement_map: None,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            transparent: false,
            opacity: 1.0,
        }
    }
}

impl StandardMaterial {
    pub fn colored(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            ..Self::default()
        }
    }

    /// All texture handles referenced by this material.
    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        [
            self.map,
            self.ao_map,
            self.alpha_map,
            self.normal_map,
            self.roughness_map,
            self.metalness_map,
            self.displacement_map,
        ]
        .into_iter()
        .flatten()
    }

    /// Whether the mesh needs sorting and blending.
    pub fn is_blended(&self) -> bool {
        self.transparent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_rough_dielectric() {
        let m = StandardMaterial::default();
        assert_eq!(m.roughness, 1.0);
        assert_eq!(m.metalness, 0.0);
        assert!(!m.is_blended());
        assert_eq!(m.textures().count(), 0);
    }

    #[test]
    fn lists_referenced_textures() {
        let m = StandardMaterial {
            map: Some(TextureId(1)),
            normal_map: Some(TextureId(2)),
            ..StandardMaterial::colored("walls", Color::WHITE)
        };
        let ids: Vec<_> = m.textures().collect();
        assert_eq!(ids, vec![TextureId(1), TextureId(2)]);
    }
}
