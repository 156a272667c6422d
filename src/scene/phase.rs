//! Per-object animation phase records.
//!
//! A record is drawn once when its object is created and never changes
//! afterwards; each object gets its own draw so nothing moves in lockstep.

use std::f64::consts::{PI, TAU};

/// Resting height of a penguin's origin above the ground.
pub const PENGUIN_BASE_Y: f64 = 1.3;
pub const JUMP_HEIGHT: f64 = 3.0;
pub const PITCH_AMPLITUDE: f64 = 0.1;
pub const FLIPPER_REST: f64 = 0.3;
pub const FLAP_AMPLITUDE: f64 = 0.3;
/// rad/s; 0.01 rad per frame at 60 Hz.
pub const MAX_YAW_RATE: f64 = 0.6;

pub(crate) fn uniform(rng: &mut fastrand::Rng, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.f64()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenguinPhase {
    pub jump_phase: f64,
    pub jump_speed: f64,
    pub amplitude: f64,
    pub yaw_rate: f64,
    pub initial_yaw: f64,
}

impl PenguinPhase {
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self {
            jump_phase: uniform(rng, 0.0, TAU),
            jump_speed: uniform(rng, 0.8, 1.2),
            amplitude: JUMP_HEIGHT,
            yaw_rate: uniform(rng, -MAX_YAW_RATE, MAX_YAW_RATE),
            initial_yaw: uniform(rng, 0.0, TAU),
        }
    }

    fn angle(&self, t: f64) -> f64 {
        t * self.jump_speed + self.jump_phase
    }

    /// Height above the resting position; always within `[0, amplitude]`.
    pub fn bounce(&self, t: f64) -> f64 {
        self.angle(t).sin().abs() * self.amplitude
    }

    /// Forward/back tilt, in step with the bounce.
    pub fn pitch(&self, t: f64) -> f64 {
        self.angle(t).sin() * PITCH_AMPLITUDE
    }

    pub fn yaw(&self, t: f64) -> f64 {
        self.initial_yaw + self.yaw_rate * t
    }

    /// Flap offset at twice the bounce frequency.
    pub fn flap(&self, t: f64) -> f64 {
        (t * self.jump_speed * 2.0 + self.jump_phase).sin() * FLAP_AMPLITUDE
    }

    /// Period of the bounce; `|sin|` repeats every half turn.
    pub fn period(&self) -> f64 {
        PI / self.jump_speed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowerPhase {
    pub sway_phase: f64,
    pub sway_speed: f64,
    pub sway_amount: f64,
}

impl FlowerPhase {
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self {
            sway_phase: uniform(rng, 0.0, TAU),
            sway_speed: uniform(rng, 0.5, 1.0),
            sway_amount: uniform(rng, 0.05, 0.10),
        }
    }

    pub fn roll(&self, t: f64) -> f64 {
        (t * self.sway_speed + self.sway_phase).sin() * self.sway_amount
    }
}
