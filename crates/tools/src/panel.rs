use haunted_scene::{HouseHandles, Scene, SceneError};

#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    #[error("no slider at index {0}")]
    NoSuchSlider(usize),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Scene property a slider drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderBinding {
    AmbientIntensity,
    MoonIntensity,
    MoonX,
    MoonY,
    MoonZ,
}

impl SliderBinding {
    pub fn read(self, scene: &Scene, handles: &HouseHandles) -> Option<f32> {
        match self {
            SliderBinding::AmbientIntensity => {
                scene.light(handles.ambient_light).map(|l| l.intensity())
            }
            SliderBinding::MoonIntensity => scene.light(handles.moon_light).map(|l| l.intensity()),
            SliderBinding::MoonX | SliderBinding::MoonY | SliderBinding::MoonZ => {
                let p = scene.get(handles.moon_light)?.transform.position;
                Some(match self {
                    SliderBinding::MoonX => p.x,
                    SliderBinding::MoonY => p.y,
                    _ => p.z,
                })
            }
        }
    }

    pub fn write(
        self,
        scene: &mut Scene,
        handles: &HouseHandles,
        value: f32,
    ) -> Result<(), SceneError> {
        match self {
            SliderBinding::AmbientIntensity => {
                scene.light_mut(handles.ambient_light)?.set_intensity(value)
            }
            SliderBinding::MoonIntensity => {
                scene.light_mut(handles.moon_light)?.set_intensity(value)
            }
            SliderBinding::MoonX => scene.transform_mut(handles.moon_light)?.position.x = value,
            SliderBinding::MoonY => scene.transform_mut(handles.moon_light)?.position.y = value,
            SliderBinding::MoonZ => scene.transform_mut(handles.moon_light)?.position.z = value,
        }
        Ok(())
    }
}

/// A bounded, stepped numeric control.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub label: String,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub binding: SliderBinding,
}

impl Slider {
    pub fn new(label: impl Into<String>, min: f32, max: f32, step: f32, binding: SliderBinding) -> Self {
        Self {
            label: label.into(),
            min,
            max,
            step,
            binding,
        }
    }

    /// Clamp to `[min, max]` and snap to the nearest step from `min`.
    pub fn quantize(&self, value: f32) -> f32 {
        let clamped = if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        };
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

/// The live-tweak window.
#[derive(Debug, Clone)]
pub struct DebugPanel {
    pub open: bool,
    sliders: Vec<Slider>,
}

impl DebugPanel {
    /// Light intensities in `[0, 1]` and moon position in `[-5, 5]`, all
    /// stepped by 0.001.
    pub fn standard() -> Self {
        let step = 0.001;
        Self {
            open: true,
            sliders: vec![
                Slider::new("ambient intensity", 0.0, 1.0, step, SliderBinding::AmbientIntensity),
                Slider::new("moon intensity", 0.0, 1.0, step, SliderBinding::MoonIntensity),
                Slider::new("moon x", -5.0, 5.0, step, SliderBinding::MoonX),
                Slider::new("moon y", -5.0, 5.0, step, SliderBinding::MoonY),
                Slider::new("moon z", -5.0, 5.0, step, SliderBinding::MoonZ),
            ],
        }
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Apply `value` through slider `index`. Returns the value written.
    pub fn set(
        &self,
        index: usize,
        value: f32,
        scene: &mut Scene,
        handles: &HouseHandles,
    ) -> Result<f32, ToolsError> {
        let slider = self
            .sliders
            .get(index)
            .ok_or(ToolsError::NoSuchSlider(index))?;
        let applied = slider.quantize(value);
        slider.binding.write(scene, handles, applied)?;
        tracing::debug!("{} = {applied}", slider.label);
        Ok(applied)
    }

    /// Draw the panel. Changes are written to the scene immediately.
    /// Returns true when the user asked for a new grave layout.
    pub fn ui(&mut self, ctx: &egui::Context, scene: &mut Scene, handles: &HouseHandles) -> bool {
        if !self.open {
            return false;
        }
        let mut reseed = false;
        let mut changes = Vec::new();
        egui::Window::new("Haunted House")
            .default_width(260.0)
            .show(ctx, |ui| {
                for (i, slider) in self.sliders.iter().enumerate() {
                    let Some(current) = slider.binding.read(scene, handles) else {
                        continue;
                    };
                    let mut value = current;
                    let response = ui.add(
                        egui::Slider::new(&mut value, slider.min..=slider.max)
                            .step_by(slider.step as f64)
                            .text(slider.label.as_str()),
                    );
                    if response.changed() {
                        changes.push((i, value));
                    }
                }
                ui.separator();
                let summary = crate::SceneInspector::summary(scene);
                ui.label(format!("Graves: {}", summary.graves));
                if ui.button("Re-scatter graves (R)").clicked() {
                    reseed = true;
                }
                ui.small("F1: toggle panel | LMB: orbit | RMB: pan | wheel: zoom");
            });
        for (i, value) in changes {
            if let Err(e) = self.set(i, value, scene, handles) {
                tracing::warn!("slider update failed: {e}");
            }
        }
        reseed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn quantize_clamps_and_steps() {
        let s = Slider::new("x", -5.0, 5.0, 0.001, SliderBinding::MoonX);
        assert_eq!(s.quantize(12.0), 5.0);
        assert_eq!(s.quantize(-7.5), -5.0);
        assert!((s.quantize(1.23456) - 1.235).abs() < 1e-4);
        assert_eq!(s.quantize(f32::NAN), -5.0);
    }

    #[test]
    fn standard_panel_matches_controls() {
        let panel = DebugPanel::standard();
        let ranges: Vec<(f32, f32)> = panel.sliders().iter().map(|s| (s.min, s.max)).collect();
        assert_eq!(
            ranges,
            vec![(0.0, 1.0), (0.0, 1.0), (-5.0, 5.0), (-5.0, 5.0), (-5.0, 5.0)]
        );
        assert!(panel.sliders().iter().all(|s| s.step == 0.001));
    }

    #[test]
    fn bindings_read_initial_scene() {
        let (scene, handles) = fixture::house(0);
        let read = |b: SliderBinding| b.read(&scene, &handles).unwrap();
        assert!((read(SliderBinding::AmbientIntensity) - 0.12).abs() < 1e-6);
        assert!((read(SliderBinding::MoonIntensity) - 0.12).abs() < 1e-6);
        assert_eq!(read(SliderBinding::MoonX), 4.0);
        assert_eq!(read(SliderBinding::MoonY), 5.0);
        assert_eq!(read(SliderBinding::MoonZ), -2.0);
    }

    #[test]
    fn set_writes_through_immediately() {
        let (mut scene, handles) = fixture::house(0);
        let panel = DebugPanel::standard();

        let applied = panel.set(0, 0.5, &mut scene, &handles).unwrap();
        assert_eq!(applied, 0.5);
        assert_eq!(scene.light(handles.ambient_light).unwrap().intensity(), 0.5);

        let applied = panel.set(3, 9.0, &mut scene, &handles).unwrap();
        assert_eq!(applied, 5.0);
        let moon = scene
            .lights()
            .into_iter()
            .find(|l| l.id == handles.moon_light)
            .unwrap();
        assert_eq!(moon.position.y, 5.0);

        assert!(matches!(
            panel.set(9, 0.0, &mut scene, &handles),
            Err(ToolsError::NoSuchSlider(9))
        ));
    }

    #[test]
    fn closed_panel_draws_nothing() {
        let (mut scene, handles) = fixture::house(0);
        let mut panel = DebugPanel::standard();
        panel.toggle();
        let ctx = egui::Context::default();
        let mut reseed = true;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            reseed = panel.ui(ctx, &mut scene, &handles);
        });
        assert!(!reseed);
    }

    #[test]
    fn open_panel_runs_headless() {
        let (mut scene, handles) = fixture::house(3);
        let mut panel = DebugPanel::standard();
        let ctx = egui::Context::default();
        let mut reseed = true;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            reseed = panel.ui(ctx, &mut scene, &handles);
        });
        assert!(!reseed);
        assert_eq!(scene.light(handles.ambient_light).unwrap().intensity(), 0.12);
    }
}
