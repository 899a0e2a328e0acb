//! Continuously rescheduled frame loop.
//!
//! Each frame updates the camera controls, renders once and asks the
//! scheduler for the next frame. The loop never ends on its own; it stops
//! when its [`CancelToken`] is cancelled.

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::renderer::Renderer;
use haunted_scene::Scene;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Source of "next frame" callbacks, e.g. a window redraw request.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Shared stop flag. Clones observe the same flag; it is only ever set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Scheduler for driving the loop by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: bool,
    requests: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the pending request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Zero-based index of this frame.
    pub frame: u64,
}

pub struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    cancel: CancelToken,
    frames: u64,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S, cancel: CancelToken) -> Self {
        Self {
            scheduler,
            cancel,
            frames: 0,
        }
    }

    /// Schedule the first frame.
    pub fn start(&mut self) -> FrameStatus {
        if self.cancel.is_cancelled() {
            return FrameStatus::Stopped;
        }
        self.scheduler.request_frame();
        FrameStatus::Running
    }

    /// Run one frame body and reschedule unless cancelled.
    pub fn run_frame(&mut self, body: impl FnOnce(FrameTick)) -> FrameStatus {
        if self.cancel.is_cancelled() {
            return FrameStatus::Stopped;
        }
        body(FrameTick { frame: self.frames });
        self.frames += 1;
        if self.cancel.is_cancelled() {
            tracing::debug!("frame loop stopped after {} frames", self.frames);
            return FrameStatus::Stopped;
        }
        self.scheduler.request_frame();
        FrameStatus::Running
    }

    /// One standard frame: update controls, render the scene once.
    ///
    /// Returns `None` without rendering once the loop is cancelled.
    pub fn step<R: Renderer>(
        &mut self,
        controls: &mut OrbitControls,
        camera: &mut PerspectiveCamera,
        renderer: &mut R,
        scene: &Scene,
    ) -> Option<R::Output> {
        let mut output = None;
        self.run_frame(|_| {
            controls.update(camera);
            output = Some(renderer.render(scene, camera));
        });
        output
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl FrameLoop<ManualScheduler> {
    /// Drive up to `max_frames` frames synchronously, as long as each frame
    /// schedules the next. Returns the number of frames run.
    pub fn drive(&mut self, max_frames: u64, mut body: impl FnMut(FrameTick)) -> u64 {
        let mut ran = 0;
        while ran < max_frames && self.scheduler.take_pending() {
            let before = self.frames;
            let status = self.run_frame(&mut body);
            ran += self.frames - before;
            if status == FrameStatus::Stopped {
                break;
            }
        }
        ran
    }
}
