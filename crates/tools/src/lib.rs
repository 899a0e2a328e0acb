//! Developer tooling: live debug panel and scene inspector.
//!
//! # Invariants
//! - Slider values are clamped to their range and quantised to their step
//!   before they reach the scene.
//! - The inspector is read-only.

mod inspector;
mod panel;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use panel::{DebugPanel, Slider, SliderBinding, ToolsError};

#[cfg(test)]
pub(crate) mod fixture {
    use haunted_assets::{HouseTextures, TextureStore};
    use haunted_scene::{HouseHandles, Scene, SceneConfig, build_haunted_house};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub fn house(graves: usize) -> (Scene, HouseHandles) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TextureStore::new();
        let textures = HouseTextures::load(&mut store, dir.path()).unwrap();
        let mut config = SceneConfig::default();
        config.graves.count = graves;
        let mut scene = Scene::new();
        let handles =
            build_haunted_house(&mut scene, &textures, &config, &mut StdRng::seed_from_u64(5))
                .unwrap();
        (scene, handles)
    }
}
