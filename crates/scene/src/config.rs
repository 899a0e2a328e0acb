//! Scene tuning loaded from YAML.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```yaml
//! graves:
//!   count: 80
//!   seed: 7
//! fog:
//!   far: 25.0
//! ```

use crate::scene::SceneError;
use haunted_common::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn color(hex: u32) -> Color {
    Color::from_hex(hex)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: Color::from_rgb8(6, 44, 44),
            near: 1.0,
            far: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraveConfig {
    pub count: usize,
    /// Fixed seed for reproducible placement; random when absent.
    pub seed: Option<u64>,
    pub inner_radius: f32,
    pub ring_width: f32,
    pub height: f32,
    pub max_tilt: f32,
}

impl Default for GraveConfig {
    fn default() -> Self {
        Self {
            count: 50,
            seed: None,
            inner_radius: 4.0,
            ring_width: 6.0,
            height: 0.3,
            max_tilt: 0.2,
        }
    }
}

impl GraveConfig {
    /// Reject values the scatter cannot sample from.
    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |msg: String| Err(SceneError::InvalidConfig(msg));
        let fields = [
            ("inner_radius", self.inner_radius),
            ("ring_width", self.ring_width),
            ("height", self.height),
            ("max_tilt", self.max_tilt),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(format!("graves.{name} must be finite, got {value}"));
        }
        if self.inner_radius < 0.0 {
            return invalid(format!(
                "graves.inner_radius must be >= 0, got {}",
                self.inner_radius
            ));
        }
        if self.ring_width <= 0.0 {
            return invalid(format!(
                "graves.ring_width must be > 0, got {}",
                self.ring_width
            ));
        }
        if self.max_tilt < 0.0 {
            return invalid(format!("graves.max_tilt must be >= 0, got {}", self.max_tilt));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: color(0xb9d5ff),
            intensity: 0.12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: [f32; 3],
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            color: color(0xb9d5ff),
            intensity: 0.12,
            position: [4.0, 5.0, -2.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorLightConfig {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub position: [f32; 3],
}

impl Default for DoorLightConfig {
    fn default() -> Self {
        Self {
            color: color(0xff7d46),
            intensity: 1.0,
            distance: 7.0,
            position: [0.0, 2.2, 2.7],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [4.0, 2.0, 5.0],
            damping_factor: 0.05,
        }
    }
}

/// All tunable values of the haunted house scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory containing `textures/`.
    pub assets_root: PathBuf,
    pub fog: FogConfig,
    pub graves: GraveConfig,
    pub ambient: AmbientConfig,
    pub moon: MoonConfig,
    pub door_light: DoorLightConfig,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("static"),
            fog: FogConfig::default(),
            graves: GraveConfig::default(),
            ambient: AmbientConfig::default(),
            moon: MoonConfig::default(),
            door_light: DoorLightConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SceneError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.graves.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded scene config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_scene_constants() {
        let c = SceneConfig::default();
        assert_eq!(c.graves.count, 50);
        assert_eq!(c.graves.inner_radius + c.graves.ring_width, 10.0);
        assert_eq!(c.fog.color.to_rgb8(), [6, 44, 44]);
        assert_eq!(c.moon.position, [4.0, 5.0, -2.0]);
        assert_eq!(c.door_light.color.to_string(), "#ff7d46");
        assert_eq!(c.camera.fov_degrees, 75.0);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let c = SceneConfig::from_yaml_str(
            "graves:\n  count: 80\n  seed: 7\nfog:\n  color: 'rgb(10, 20, 30)'\n",
        )
        .unwrap();
        assert_eq!(c.graves.count, 80);
        assert_eq!(c.graves.seed, Some(7));
        assert_eq!(c.graves.inner_radius, 4.0);
        assert_eq!(c.fog.color.to_rgb8(), [10, 20, 30]);
        assert_eq!(c.fog.far, 15.0);
        assert_eq!(c.ambient, AmbientConfig::default());
    }

    #[test]
    fn bad_color_is_a_yaml_error() {
        let err = SceneConfig::from_yaml_str("ambient:\n  color: 'ectoplasm'\n").unwrap_err();
        assert!(matches!(err, SceneError::Yaml(_)));
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        let mut config = SceneConfig::default();
        config.graves.seed = Some(42);
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();
        assert_eq!(SceneConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            SceneConfig::load("/nonexistent/scene.yaml"),
            Err(SceneError::Io(_))
        ));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = include_str!("../../../config/haunted.yaml");
        assert_eq!(
            SceneConfig::from_yaml_str(shipped).unwrap(),
            SceneConfig::default()
        );
    }

    #[test]
    fn degenerate_grave_ring_is_rejected() {
        for yaml in [
            "graves:\n  ring_width: 0.0\n",
            "graves:\n  ring_width: -1.0\n",
            "graves:\n  max_tilt: -0.1\n",
            "graves:\n  inner_radius: -2.0\n",
            "graves:\n  height: .nan\n",
        ] {
            assert!(
                matches!(
                    SceneConfig::from_yaml_str(yaml),
                    Err(SceneError::InvalidConfig(_))
                ),
                "{yaml:?} should be rejected"
            );
        }
    }

    #[test]
    fn upright_graves_are_allowed() {
        let c = SceneConfig::from_yaml_str("graves:\n  max_tilt: 0.0\n").unwrap();
        assert_eq!(c.graves.max_tilt, 0.0);
        let params = crate::graves::ScatterParams::from(&c.graves);
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(1);
        let graves = crate::graves::scatter(3, &params, &mut rng);
        assert!(graves.iter().all(|g| g.rotation_y == 0.0 && g.rotation_z == 0.0));
    }
}
