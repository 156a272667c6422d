//! Slot resolution: draw, check, retry, and fall back to an unverified pick.

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};

use super::availability::{Availability, AvailabilityCheck};
use super::embed::{EmbedSpec, PLACEHOLDER_TITLE};
use super::manifest::{ManifestSource, pool_from_fetch};
use super::pool::{CandidatePool, PoolState};

/// What a slot ends up showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVideo {
    pub video_id: String,
    pub title: String,
    /// `false` for the best-effort pick made after every check failed.
    pub verified: bool,
}

impl ResolvedVideo {
    pub fn embed(&self) -> EmbedSpec {
        EmbedSpec::new(self.video_id.clone(), self.title.clone())
    }
}

/// Where the slots live: DOM cards on the web, an egui panel natively.
pub trait SlotHost {
    /// Slots currently waiting for a video, by index.
    fn placeholders(&self) -> Vec<usize>;
    /// Put `video` into `slot`, replacing whatever was there.
    fn install(&self, slot: usize, video: &ResolvedVideo);
}

pub struct VideoPoolLoader<C> {
    state: Arc<PoolState>,
    checker: Arc<C>,
    max_attempts: usize,
}

impl<C> Clone for VideoPoolLoader<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            checker: Arc::clone(&self.checker),
            max_attempts: self.max_attempts,
        }
    }
}

impl<C: AvailabilityCheck> VideoPoolLoader<C> {
    /// Starts with the built-in pool; call [`Self::load_pool`] to swap in the
    /// prefetched one.
    pub fn new(checker: C, max_attempts: usize) -> Self {
        Self::with_rng(checker, max_attempts, fastrand::Rng::new())
    }

    pub fn with_rng(checker: C, max_attempts: usize, rng: fastrand::Rng) -> Self {
        Self {
            state: Arc::new(PoolState::new(CandidatePool::fallback(), rng)),
            checker: Arc::new(checker),
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn pool_state(&self) -> &PoolState {
        &self.state
    }

    /// Fetch the manifest and install the resulting pool. Always yields a
    /// non-empty list; failures fall back to the built-in pool.
    pub async fn load_pool(&self, source: &impl ManifestSource) -> Vec<String> {
        info!("video pool: loading pre-fetched penguin videos");
        let ids = pool_from_fetch(source.fetch().await);
        let pool = CandidatePool::new(ids.iter().cloned()).unwrap_or_else(|| {
            warn!("video pool: no usable ids, using fallback pool");
            CandidatePool::fallback()
        });
        info!("video pool: initialized with {} videos", pool.len());
        let installed = pool.ids().to_vec();
        self.state.replace_pool(pool);
        installed
    }

    pub fn draw_candidate(&self) -> String {
        self.state.draw()
    }

    /// Check up to `max_attempts` candidates and return the first available
    /// one. If none is, return one more unverified candidate with the
    /// generic title rather than leaving the slot empty.
    pub async fn resolve_slot(&self, max_attempts: usize) -> ResolvedVideo {
        for attempt in 1..=max_attempts {
            let video_id = self.state.draw();
            match self.checker.check(&video_id).await {
                Availability::Available { title } => {
                    info!("video {video_id} is available: {title}");
                    let title = if title.is_empty() {
                        PLACEHOLDER_TITLE.to_string()
                    } else {
                        title
                    };
                    return ResolvedVideo {
                        video_id,
                        title,
                        verified: true,
                    };
                }
                Availability::Unavailable => {
                    debug!("video {video_id} unavailable (attempt {attempt}/{max_attempts})");
                }
            }
        }

        let video_id = self.state.draw();
        warn!(
            "could not verify videos after {max_attempts} attempts, using unverified {video_id}"
        );
        ResolvedVideo {
            video_id,
            title: PLACEHOLDER_TITLE.to_string(),
            verified: false,
        }
    }

    /// Resolve every placeholder concurrently and install the results.
    /// Completes once every slot has settled.
    pub async fn attach_to_page<H: SlotHost>(&self, host: &H) -> Vec<(usize, ResolvedVideo)> {
        let slots = host.placeholders();
        info!("video loader: resolving {} slots", slots.len());

        let settled = join_all(slots.into_iter().map(|slot| async move {
            let video = self.resolve_slot(self.max_attempts).await;
            host.install(slot, &video);
            (slot, video)
        }))
        .await;

        let verified = settled.iter().filter(|(_, v)| v.verified).count();
        info!(
            "video loader: loaded {} penguin videos ({verified} verified)",
            settled.len()
        );
        settled
    }

    /// Swap out a slot whose player reported a load fault.
    pub async fn replace_slot<H: SlotHost>(&self, host: &H, slot: usize) -> ResolvedVideo {
        info!("video loader: replacing failed video in slot {slot}");
        let video = self.resolve_slot(self.max_attempts).await;
        host.install(slot, &video);
        video
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::availability::CheckFuture;
    use futures_lite::future::block_on;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports ids in `good` as available, counting every call.
    struct Scripted {
        good: HashSet<String>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(good: &[&str]) -> Self {
            Self {
                good: good.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AvailabilityCheck for Scripted {
        fn check(&self, video_id: &str) -> CheckFuture {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if self.good.contains(video_id) {
                Availability::Available {
                    title: format!("title of {video_id}"),
                }
            } else {
                Availability::Unavailable
            };
            Box::pin(async move { result })
        }
    }

    #[derive(Default)]
    struct Cards {
        count: usize,
        installed: Mutex<Vec<(usize, ResolvedVideo)>>,
    }

    impl SlotHost for Cards {
        fn placeholders(&self) -> Vec<usize> {
            (0..self.count).collect()
        }

        fn install(&self, slot: usize, video: &ResolvedVideo) {
            self.installed.lock().unwrap().push((slot, video.clone()));
        }
    }

    fn loader(good: &[&str]) -> VideoPoolLoader<Scripted> {
        VideoPoolLoader::with_rng(Scripted::new(good), 5, fastrand::Rng::with_seed(21))
    }

    #[test]
    fn unavailable_everywhere_falls_back_after_five_checks() {
        let l = loader(&[]);
        let v = block_on(l.resolve_slot(5));
        assert!(!v.video_id.is_empty());
        assert_eq!(v.title, PLACEHOLDER_TITLE);
        assert!(!v.verified);
        assert_eq!(l.checker.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn first_available_candidate_wins() {
        let all: Vec<&str> = crate::video::FALLBACK_POOL.to_vec();
        let l = loader(&all);
        let v = block_on(l.resolve_slot(5));
        assert!(v.verified);
        assert_eq!(v.title, format!("title of {}", v.video_id));
        assert_eq!(l.checker.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn attach_settles_every_slot_even_when_nothing_is_available() {
        let l = loader(&[]);
        let cards = Cards {
            count: 3,
            ..Default::default()
        };
        let settled = block_on(l.attach_to_page(&cards));
        assert_eq!(settled.len(), 3);
        assert!(settled.iter().all(|(_, v)| v.title == PLACEHOLDER_TITLE));

        let installed = cards.installed.lock().unwrap();
        let mut slots: Vec<usize> = installed.iter().map(|(s, _)| *s).collect();
        slots.sort_unstable();
        assert_eq!(slots, [0, 1, 2]);
        assert!(l.checker.calls.load(Ordering::SeqCst) <= 15);
    }

    #[test]
    fn replace_installs_into_the_same_slot() {
        let l = loader(&["Z7PlUGbsXlQ"]);
        let cards = Cards {
            count: 1,
            ..Default::default()
        };
        let v = block_on(l.replace_slot(&cards, 0));
        let installed = cards.installed.lock().unwrap();
        assert_eq!(installed.as_slice(), [(0, v)]);
    }
}
