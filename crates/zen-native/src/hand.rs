//! Mouse-driven stand-in for the hand tracker.

use std::time::Duration;

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::ElementState;
use zen_core::{ClapDetector, GestureSample};

#[derive(Default)]
pub struct MouseHand {
    cursor: Option<PhysicalPosition<f64>>,
    fist: bool,
    clap: ClapDetector,
}

impl MouseHand {
    pub fn moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(position);
    }

    pub fn left(&mut self) {
        self.cursor = None;
        self.fist = false;
    }

    pub fn button(&mut self, state: ElementState) {
        self.fist = state == ElementState::Pressed;
    }

    /// Present while the cursor is inside the window. Moving down closes the
    /// hand; holding the button clenches it fully.
    pub fn sample(&self, size: PhysicalSize<u32>) -> GestureSample {
        let Some(pos) = self.cursor else {
            return GestureSample::absent();
        };
        let w = size.width.max(1) as f64;
        let h = size.height.max(1) as f64;
        let u = (pos.x / w) as f32;
        let v = (pos.y / h) as f32;
        let tension = if self.fist { 1.0 } else { v };
        GestureSample::new(tension, true, u, 1.0 - v)
    }

    /// Sample the hand and report whether it clapped.
    pub fn poll(&mut self, size: PhysicalSize<u32>, now: Duration) -> (GestureSample, bool) {
        let sample = self.sample(size);
        let clapped = self.clap.observe(&sample, now);
        (sample, clapped)
    }
}
