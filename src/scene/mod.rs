//! Decorative scene state: penguins, flowers and the camera projection.
//!
//! Everything here is pure data plus trigonometry. Poses are always derived
//! from elapsed time, so a dropped frame just means the next tick lands
//! further along the same curve.

pub mod animator;
pub mod layout;
pub mod phase;

pub use animator::{
    Flower, FlowerPose, Penguin, PenguinPose, Projection, SceneContext, SurfaceSize, TickStats,
};
pub use layout::{FlowerLook, PETAL_COLORS};
pub use phase::{FlowerPhase, PenguinPhase};
