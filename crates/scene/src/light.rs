use glam::Vec3;
use haunted_common::Color;

/// Uniform light reaching every surface regardless of orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Parallel light shining from the node position towards `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub target: Vec3,
}

/// Omni light with a finite range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Range after which the light contributes nothing; 0 means unbounded.
    pub distance: f32,
    pub decay: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
}

impl AmbientLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            target: Vec3::ZERO,
        }
    }

    /// Unit vector pointing from the light towards its target.
    pub fn direction(&self, light_position: Vec3) -> Vec3 {
        (self.target - light_position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Y)
    }
}

impl PointLight {
    pub fn new(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            color,
            intensity,
            distance,
            decay: 1.0,
        }
    }

    /// Range falloff: `(1 - d / distance)^decay` clamped to `[0, 1]`.
    pub fn attenuation(&self, d: f32) -> f32 {
        if self.distance > 0.0 && self.decay > 0.0 {
            (1.0 - d / self.distance).clamp(0.0, 1.0).powf(self.decay)
        } else {
            1.0
        }
    }
}

impl Light {
    pub fn color(&self) -> Color {
        match self {
            Light::Ambient(l) => l.color,
            Light::Directional(l) => l.color,
            Light::Point(l) => l.color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient(l) => l.intensity,
            Light::Directional(l) => l.intensity,
            Light::Point(l) => l.intensity,
        }
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        match self {
            Light::Ambient(l) => l.intensity = intensity,
            Light::Directional(l) => l.intensity = intensity,
            Light::Point(l) => l.intensity = intensity,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Light::Ambient(_) => "ambient",
            Light::Directional(_) => "directional",
            Light::Point(_) => "point",
        }
    }
}
