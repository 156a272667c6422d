//! Video slots: the candidate pool, availability checks and slot resolution.
//!
//! Platform code supplies three things: a [`ManifestSource`] for the
//! prefetched pool, an [`AvailabilityCheck`] that talks to the oEmbed
//! endpoint, and a [`SlotHost`] that knows where the slots live. The
//! [`VideoPoolLoader`] does the rest.

pub mod availability;
pub mod embed;
#[cfg(all(feature = "net", not(target_arch = "wasm32")))]
pub mod http;
pub mod listeners;
pub mod loader;
pub mod manifest;
pub mod pool;

pub use availability::{
    Availability, AvailabilityCheck, CheckFuture, availability_from_response, oembed_url, watch_url,
};
pub use embed::{EmbedSpec, PLACEHOLDER_TITLE};
pub use listeners::SlotListeners;
pub use loader::{ResolvedVideo, SlotHost, VideoPoolLoader};
pub use manifest::{FALLBACK_POOL, ManifestFuture, ManifestSource, PoolManifest, pool_from_fetch};
pub use pool::{CandidatePool, PoolState};
