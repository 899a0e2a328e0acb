//! Viewport synchronisation between the host window, the camera and the
//! output surface.

use crate::camera::PerspectiveCamera;

/// Upper bound for the device pixel ratio used to size the drawing buffer.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Effective pixel ratio for a host-reported density: `min(dpr, 2)`.
/// Non-finite or non-positive densities fall back to 1.
pub fn clamp_pixel_ratio(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Logical size plus the effective pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl ViewportSize {
    /// Dimensions are clamped to at least one pixel and `dpr` to
    /// [`MAX_PIXEL_RATIO`].
    pub fn new(width: u32, height: u32, dpr: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio: clamp_pixel_ratio(dpr),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Physical size of the drawing buffer.
    pub fn drawing_buffer(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Stable,
    Resizing,
}

/// What a resize notification produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    pub size: ViewportSize,
    pub aspect: f32,
    /// Whether the size differs from before the notification.
    pub changed: bool,
}

/// Size state passed explicitly to whatever needs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    size: ViewportSize,
    state: ViewportState,
}

impl Viewport {
    pub fn new(width: u32, height: u32, dpr: f64) -> Self {
        Self {
            size: ViewportSize::new(width, height, dpr),
            state: ViewportState::Stable,
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Handle one resize notification synchronously.
    ///
    /// Records the new size and brings the camera aspect and projection in
    /// line with it. The caller resizes its surface to
    /// [`ViewportSize::drawing_buffer`]. Every notification is applied; none
    /// are coalesced.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        dpr: f64,
        camera: &mut PerspectiveCamera,
    ) -> ResizeOutcome {
        self.state = ViewportState::Resizing;
        let size = ViewportSize::new(width, height, dpr);
        let changed = size != self.size;
        self.size = size;
        self.sync_camera(camera);
        self.state = ViewportState::Stable;

        if changed {
            let (bw, bh) = size.drawing_buffer();
            tracing::debug!(
                "viewport {}x{} @{} -> buffer {bw}x{bh}",
                size.width,
                size.height,
                size.pixel_ratio
            );
        }
        ResizeOutcome {
            size,
            aspect: size.aspect(),
            changed,
        }
    }

    pub fn sync_camera(&self, camera: &mut PerspectiveCamera) {
        camera.aspect = self.size.aspect();
        camera.update_projection();
    }
}
