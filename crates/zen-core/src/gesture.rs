//! Gesture input: samples pushed by the hand tracker, landmark geometry,
//! clap detection and the latest-sample inbox read once per frame.

use std::time::Duration;

use glam::Vec3;

use crate::constants::{
    CLAP_CLOSED_ABOVE, CLAP_DEBOUNCE_MS, CLAP_OPEN_BELOW, FIST_RATIO, LANDMARK_COUNT,
    MIN_PALM_SIZE, OPEN_HAND_RATIO,
};
use crate::error::GestureError;

/// One reading from the gesture source. All fields are normalized to `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    /// 0 = open hand, 1 = fist.
    pub tension: f32,
    pub is_present: bool,
    pub x: f32,
    pub y: f32,
}

impl GestureSample {
    pub fn new(tension: f32, is_present: bool, x: f32, y: f32) -> Self {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            tension: if tension.is_finite() { tension.clamp(0.0, 1.0) } else { 0.0 },
            is_present,
            x: unit(x),
            y: unit(y),
        }
    }

    /// What the tracker reports when no hand is visible.
    pub fn absent() -> Self {
        Self {
            tension: 0.0,
            is_present: false,
            x: 0.5,
            y: 0.5,
        }
    }
}

impl Default for GestureSample {
    fn default() -> Self {
        Self::absent()
    }
}

// Landmark indices in the 21-point hand model
const WRIST: usize = 0;
const MIDDLE_MCP: usize = 9;
const FINGER_TIPS: [usize; 5] = [4, 8, 12, 16, 20];

/// 21 normalized hand landmarks as produced by the hand-tracking model.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Vec3; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Parse a flat `[x0, y0, z0, x1, ...]` array.
    pub fn from_flat(coords: &[f32]) -> Result<Self, GestureError> {
        let expected = LANDMARK_COUNT * 3;
        if coords.len() != expected {
            return Err(GestureError::LandmarkCount {
                expected,
                found: coords.len(),
            });
        }
        let mut points = [Vec3::ZERO; LANDMARK_COUNT];
        for (index, (point, xyz)) in points.iter_mut().zip(coords.chunks_exact(3)).enumerate() {
            if !xyz.iter().all(|c| c.is_finite()) {
                return Err(GestureError::NonFinite { index });
            }
            *point = Vec3::new(xyz[0], xyz[1], xyz[2]);
        }
        Ok(Self { points })
    }

    pub fn wrist(&self) -> Vec3 {
        self.points[WRIST]
    }

    /// Hand closure from fingertip reach relative to palm size.
    ///
    /// An open hand reaches about twice its palm length (tension 0); a fist
    /// about 0.9 of it (tension 1).
    pub fn tension(&self) -> f32 {
        let wrist = self.points[WRIST];
        let palm = wrist.distance(self.points[MIDDLE_MCP]);
        let palm = if palm > 0.0 { palm } else { MIN_PALM_SIZE };
        let reach = FINGER_TIPS
            .iter()
            .map(|&i| wrist.distance(self.points[i]))
            .sum::<f32>()
            / FINGER_TIPS.len() as f32;
        let ratio = reach / palm;
        ((OPEN_HAND_RATIO - ratio) / (OPEN_HAND_RATIO - FIST_RATIO)).clamp(0.0, 1.0)
    }

    /// Sample for a visible hand; X is mirrored to match a selfie camera.
    pub fn to_sample(&self) -> GestureSample {
        let wrist = self.wrist();
        GestureSample::new(self.tension(), true, 1.0 - wrist.x, 1.0 - wrist.y)
    }
}

/// Detects a rapid open-to-closed transition ("clap").
///
/// This belongs to the gesture side; the field itself never rate-limits
/// explosion triggers.
#[derive(Clone, Debug)]
pub struct ClapDetector {
    last_tension: f32,
    last_clap: Option<Duration>,
    debounce: Duration,
}

impl Default for ClapDetector {
    fn default() -> Self {
        Self::new(Duration::from_millis(CLAP_DEBOUNCE_MS))
    }
}

impl ClapDetector {
    pub fn new(debounce: Duration) -> Self {
        Self {
            last_tension: 0.0,
            last_clap: None,
            debounce,
        }
    }

    /// Feed a sample taken at `now`; returns true when a clap fires.
    pub fn observe(&mut self, sample: &GestureSample, now: Duration) -> bool {
        if !sample.is_present {
            return false;
        }
        let mut fired = false;
        if self.last_tension < CLAP_OPEN_BELOW && sample.tension > CLAP_CLOSED_ABOVE {
            let ready = self
                .last_clap
                .map_or(true, |last| now.saturating_sub(last) > self.debounce);
            if ready {
                self.last_clap = Some(now);
                fired = true;
            }
        }
        self.last_tension = sample.tension;
        fired
    }
}

/// Holds only the most recent successful gesture sample.
#[derive(Clone, Debug, Default)]
pub struct GestureInbox {
    latest: Option<GestureSample>,
    dropped: u64,
}

impl GestureInbox {
    /// Replace the stored sample, or log and keep it when detection failed.
    pub fn submit(&mut self, sample: Result<GestureSample, GestureError>) {
        match sample {
            Ok(s) => self.latest = Some(s),
            Err(e) => {
                self.dropped += 1;
                log::warn!("[gesture] skipping sample: {e}");
            }
        }
    }

    pub fn latest(&self) -> GestureSample {
        self.latest.unwrap_or_default()
    }

    /// Number of failed samples swallowed so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}
