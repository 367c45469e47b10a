//! Pendulum needle: beat phase to display angle.

use std::f64::consts::PI;

use crate::timing::{BeatPhase, Parity};

/// Default swing amplitude in degrees
pub const DEFAULT_MAX_ANGLE: f32 = 35.0;

/// Maps beat progress onto a swinging needle
///
/// `angle = max_angle * cos(pi * progress) * parity`: full deflection on the
/// beat, zero half-way, and the opposite extreme at the next boundary, where
/// the parity flips and the next beat continues from that same side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeedleModel {
    max_angle: f32,
}

impl NeedleModel {
    pub fn new(max_angle: f32) -> Self {
        Self { max_angle }
    }

    pub fn max_angle(&self) -> f32 {
        self.max_angle
    }

    /// Angle in degrees, within `[-max_angle, max_angle]`.
    #[inline]
    pub fn angle(&self, progress: f64, parity: Parity) -> f32 {
        let swing = (progress * PI).cos() as f32;
        self.max_angle * swing * parity.sign()
    }

    pub fn angle_for(&self, phase: &BeatPhase) -> f32 {
        self.angle(phase.progress, phase.parity)
    }
}

impl Default for NeedleModel {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ANGLE)
    }
}
