//! Renderer-agnostic view side of the haunted house.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - The effective device pixel ratio never exceeds 2.
//! - The frame loop only stops through its cancellation token.

mod camera;
mod controls;
mod frame_loop;
mod renderer;
mod viewport;

pub use camera::PerspectiveCamera;
pub use controls::OrbitControls;
pub use frame_loop::{CancelToken, FrameLoop, FrameScheduler, FrameStatus, FrameTick, ManualScheduler};
pub use renderer::{DebugTextRenderer, Renderer};
pub use viewport::{
    MAX_PIXEL_RATIO, ResizeOutcome, Viewport, ViewportSize, ViewportState, clamp_pixel_ratio,
};

pub fn crate_info() -> &'static str {
    concat!("haunted-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
        assert!(crate_info().ends_with(env!("CARGO_PKG_VERSION")));
    }
}
