//! penguin_meadow: engine-free core of the penguin meadow page.
//!
//! The crate owns everything that does not need a renderer or a DOM:
//! the per-frame pose math for penguins and flowers, the video candidate
//! pool and its slot-resolution policy, the debug console with its sinks,
//! and the environment-driven configuration. The Bevy crates under
//! `crates/` draw what this crate computes.

pub mod config;
pub mod console;
pub mod scene;
pub mod video;

pub use config::MeadowConfig;
pub use console::{DebugConsole, LogLevel, LogSink, PageLog, StderrSink};
pub use scene::{FlowerPose, PenguinPose, Projection, SceneContext, SurfaceSize};
pub use video::{
    Availability, AvailabilityCheck, CandidatePool, EmbedSpec, ManifestSource, PoolManifest,
    ResolvedVideo, SlotHost, VideoPoolLoader,
};
