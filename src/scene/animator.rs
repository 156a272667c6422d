//! The owned scene context: object arrays, projection and the per-frame update.

use log::{debug, info, warn};

use super::layout::{self, FlowerLook};
use super::phase::{FLIPPER_REST, FlowerPhase, PENGUIN_BASE_Y, PenguinPhase};

/// Resting height of a flower's origin (half its stem).
pub const FLOWER_BASE_Y: f32 = 0.75;

pub const FOV_Y_DEGREES: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

/// Size of the drawing surface in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn for_surface(surface: SurfaceSize) -> Self {
        Self {
            fov_y: FOV_Y_DEGREES.to_radians(),
            aspect: surface.width / surface.height,
            near: NEAR,
            far: FAR,
        }
    }
}

/// Where a penguin is this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenguinPose {
    /// Absolute height of the penguin's origin.
    pub height: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub left_flipper: f32,
    pub right_flipper: f32,
}

impl PenguinPose {
    /// `None` when any component comes out non-finite.
    pub fn at(phase: &PenguinPhase, t: f64) -> Option<Self> {
        let flap = phase.flap(t);
        let pose = Self {
            height: (PENGUIN_BASE_Y + phase.bounce(t)) as f32,
            pitch: phase.pitch(t) as f32,
            yaw: phase.yaw(t) as f32,
            left_flipper: (-FLIPPER_REST + flap) as f32,
            right_flipper: (FLIPPER_REST - flap) as f32,
        };
        [pose.height, pose.pitch, pose.yaw, pose.left_flipper, pose.right_flipper]
            .iter()
            .all(|v| v.is_finite())
            .then_some(pose)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowerPose {
    pub roll: f32,
}

impl FlowerPose {
    pub fn at(phase: &FlowerPhase, t: f64) -> Option<Self> {
        let roll = phase.roll(t) as f32;
        roll.is_finite().then_some(Self { roll })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Penguin {
    /// Ground position `(x, z)`, fixed at creation.
    pub base: [f32; 2],
    pub phase: PenguinPhase,
    pub pose: PenguinPose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flower {
    pub base: [f32; 2],
    pub look: FlowerLook,
    pub phase: FlowerPhase,
    pub pose: FlowerPose,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub updated: usize,
    /// Objects whose pose could not be computed and kept last frame's pose.
    pub held: usize,
}

#[derive(Debug, Clone)]
pub struct SceneContext {
    penguins: Vec<Penguin>,
    flowers: Vec<Flower>,
    surface: SurfaceSize,
    projection: Projection,
    ground_heights: Vec<f32>,
}

impl SceneContext {
    /// Build the scene for `surface`. Returns `None` (and draws nothing) when
    /// there is no usable surface.
    pub fn initialize(
        surface: Option<SurfaceSize>,
        penguin_count: usize,
        flower_count: usize,
        rng: &mut fastrand::Rng,
    ) -> Option<Self> {
        let Some(surface) = surface.filter(SurfaceSize::is_drawable) else {
            debug!("scene: no drawable surface, skipping initialization");
            return None;
        };

        let ground_heights = layout::ground_heights(layout::GROUND_SEGMENTS, rng);

        let penguins = (0..penguin_count)
            .map(|i| {
                let [x, z] = layout::ring_position(i, penguin_count, rng);
                let phase = PenguinPhase::random(rng);
                let pose = PenguinPose::at(&phase, 0.0).unwrap_or(PenguinPose {
                    height: PENGUIN_BASE_Y as f32,
                    pitch: 0.0,
                    yaw: 0.0,
                    left_flipper: -FLIPPER_REST as f32,
                    right_flipper: FLIPPER_REST as f32,
                });
                Penguin {
                    base: [x as f32, z as f32],
                    phase,
                    pose,
                }
            })
            .collect();

        let flowers = (0..flower_count)
            .map(|_| {
                let [x, z] = layout::meadow_position(rng);
                let look = FlowerLook::random(rng);
                let phase = FlowerPhase::random(rng);
                let pose = FlowerPose::at(&phase, 0.0).unwrap_or(FlowerPose { roll: 0.0 });
                Flower {
                    base: [x as f32, z as f32],
                    look,
                    phase,
                    pose,
                }
            })
            .collect();

        info!("scene: {penguin_count} penguins, {flower_count} flowers");
        Some(Self {
            penguins,
            flowers,
            surface,
            projection: Projection::for_surface(surface),
            ground_heights,
        })
    }

    /// Recompute every pose from `elapsed` seconds since start.
    pub fn tick(&mut self, elapsed: f64) -> TickStats {
        let mut stats = TickStats::default();
        for penguin in &mut self.penguins {
            match PenguinPose::at(&penguin.phase, elapsed) {
                Some(pose) => {
                    penguin.pose = pose;
                    stats.updated += 1;
                }
                None => stats.held += 1,
            }
        }
        for flower in &mut self.flowers {
            match FlowerPose::at(&flower.phase, elapsed) {
                Some(pose) => {
                    flower.pose = pose;
                    stats.updated += 1;
                }
                None => stats.held += 1,
            }
        }
        stats
    }

    /// Track a new surface size. Zero-sized surfaces (minimized windows) are
    /// ignored and `false` is returned.
    pub fn on_resize(&mut self, width: f32, height: f32) -> bool {
        let surface = SurfaceSize::new(width, height);
        if !surface.is_drawable() {
            warn!("scene: ignoring resize to {width}x{height}");
            return false;
        }
        self.surface = surface;
        self.projection = Projection::for_surface(surface);
        true
    }

    pub fn penguins(&self) -> &[Penguin] {
        &self.penguins
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn ground_heights(&self) -> &[f32] {
        &self.ground_heights
    }

    #[cfg(test)]
    pub(crate) fn penguins_mut(&mut self) -> &mut [Penguin] {
        &mut self.penguins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::layout::{MEADOW_RADIUS, RING_MAX_RADIUS, RING_MIN_RADIUS};
    use crate::scene::phase::JUMP_HEIGHT;

    fn scene(seed: u64) -> SceneContext {
        let mut rng = fastrand::Rng::with_seed(seed);
        SceneContext::initialize(Some(SurfaceSize::new(1280.0, 720.0)), 8, 80, &mut rng)
            .expect("drawable surface")
    }

    #[test]
    fn missing_surface_is_a_no_op() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(SceneContext::initialize(None, 8, 80, &mut rng).is_none());
        let flat = SurfaceSize::new(800.0, 0.0);
        assert!(SceneContext::initialize(Some(flat), 8, 80, &mut rng).is_none());
    }

    #[test]
    fn initialize_places_objects() {
        let s = scene(42);
        assert_eq!(s.penguins().len(), 8);
        assert_eq!(s.flowers().len(), 80);
        for p in s.penguins() {
            let r = (p.base[0].powi(2) + p.base[1].powi(2)).sqrt() as f64;
            assert!(r >= RING_MIN_RADIUS - 1e-4 && r <= RING_MAX_RADIUS + 1e-4);
        }
        for f in s.flowers() {
            let r = (f.base[0].powi(2) + f.base[1].powi(2)).sqrt() as f64;
            assert!(r <= MEADOW_RADIUS + 1e-4);
        }
        let first = s.penguins()[0].phase;
        assert!(s.penguins().iter().skip(1).all(|p| p.phase != first));
    }

    #[test]
    fn tick_is_a_function_of_elapsed_time() {
        let mut smooth = scene(7);
        let mut jumpy = smooth.clone();
        for frame in 0..600 {
            smooth.tick(frame as f64 / 60.0);
        }
        // Same end time after a handful of wildly dropped frames.
        for t in [0.5, 3.3, 9.0] {
            jumpy.tick(t);
        }
        let end = 599.0 / 60.0;
        smooth.tick(end);
        jumpy.tick(end);
        assert_eq!(smooth.penguins(), jumpy.penguins());
        assert_eq!(smooth.flowers(), jumpy.flowers());
    }

    #[test]
    fn poses_follow_the_phase_formulas() {
        let mut s = scene(3);
        let t = 4.25;
        let stats = s.tick(t);
        assert_eq!(stats, TickStats { updated: 88, held: 0 });
        for p in s.penguins() {
            let lift = p.pose.height as f64 - PENGUIN_BASE_Y;
            assert!(lift >= -1e-5 && lift <= JUMP_HEIGHT + 1e-5);
            let expected = (t * p.phase.jump_speed + p.phase.jump_phase).sin().abs() * JUMP_HEIGHT;
            assert!((lift - expected).abs() < 1e-4);
            assert!((p.pose.left_flipper + p.pose.right_flipper).abs() < 1e-6);
        }
    }

    #[test]
    fn one_broken_object_does_not_stop_the_rest() {
        let mut s = scene(5);
        s.tick(1.0);
        let frozen = s.penguins()[2].pose;
        s.penguins_mut()[2].phase.jump_speed = f64::NAN;
        let stats = s.tick(2.0);
        assert_eq!(stats.held, 1);
        assert_eq!(stats.updated, 87);
        assert_eq!(s.penguins()[2].pose, frozen);
        assert_ne!(s.penguins()[3].pose, PenguinPose::at(&s.penguins()[3].phase, 1.0).unwrap());
    }

    #[test]
    fn resize_sets_aspect_exactly() {
        let mut s = scene(9);
        assert!(s.on_resize(1920.0, 1080.0));
        assert_eq!(s.projection().aspect, 1920.0_f32 / 1080.0_f32);
        assert!(s.on_resize(390.0, 844.0));
        assert_eq!(s.projection().aspect, 390.0_f32 / 844.0_f32);
        assert_eq!(s.surface(), SurfaceSize::new(390.0, 844.0));

        assert!(!s.on_resize(390.0, 0.0));
        assert_eq!(s.projection().aspect, 390.0_f32 / 844.0_f32);
    }
}
