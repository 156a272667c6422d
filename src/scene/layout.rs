//! Where things go: the penguin ring, the flower meadow and the ground bumps.

use std::f64::consts::TAU;

use super::phase::uniform;

pub const RING_MIN_RADIUS: f64 = 8.0;
pub const RING_MAX_RADIUS: f64 = 18.0;
pub const MEADOW_RADIUS: f64 = 35.0;

pub const GROUND_SIZE: f32 = 200.0;
pub const GROUND_SEGMENTS: usize = 32;
pub const GROUND_BUMP: f32 = 0.5;

/// Petal colours as `0xRRGGBB`.
pub const PETAL_COLORS: [u32; 8] = [
    0xff69b4, 0xff1493, 0xff6347, 0xff4500, 0xffa500, 0xffd700, 0x9370db, 0x8a2be2,
];

/// Evenly spaced angle, randomized radius.
pub fn ring_position(index: usize, count: usize, rng: &mut fastrand::Rng) -> [f64; 2] {
    let angle = index as f64 / count.max(1) as f64 * TAU;
    let radius = uniform(rng, RING_MIN_RADIUS, RING_MAX_RADIUS);
    [angle.cos() * radius, angle.sin() * radius]
}

/// Random angle and radius inside the meadow. The radius is drawn uniformly,
/// which clusters flowers slightly towards the centre.
pub fn meadow_position(rng: &mut fastrand::Rng) -> [f64; 2] {
    let angle = uniform(rng, 0.0, TAU);
    let radius = rng.f64() * MEADOW_RADIUS;
    [angle.cos() * radius, angle.sin() * radius]
}

/// Static, per-flower appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowerLook {
    pub scale: f32,
    pub petal_color: u32,
    pub petal_count: usize,
}

impl FlowerLook {
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self {
            scale: uniform(rng, 0.8, 1.4) as f32,
            petal_color: PETAL_COLORS[rng.usize(..PETAL_COLORS.len())],
            petal_count: 5 + rng.usize(..3),
        }
    }
}

/// Height offsets for a `(segments + 1)²` vertex grid, row-major.
pub fn ground_heights(segments: usize, rng: &mut fastrand::Rng) -> Vec<f32> {
    let side = segments + 1;
    (0..side * side).map(|_| rng.f32() * GROUND_BUMP).collect()
}
