//! Native HTTP plumbing: oEmbed checks and manifest fetches over `ureq`.
//!
//! `ureq` blocks, so every request runs on its own thread and hands its
//! result back through a oneshot; concurrent slot resolutions really do
//! overlap their network waits.

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use futures::channel::oneshot;
use log::debug;

use super::availability::{Availability, AvailabilityCheck, CheckFuture, availability_from_response, oembed_url};
use super::manifest::{ManifestFuture, ManifestSource};

const USER_AGENT: &str = "penguin_meadow";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}

/// Run `work` on a fresh thread and await its result.
async fn off_thread<T, F>(work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let _ = tx.send(work());
    });
    rx.await.ok()
}

#[derive(Clone)]
pub struct UreqAvailability {
    agent: ureq::Agent,
}

impl Default for UreqAvailability {
    fn default() -> Self {
        Self { agent: agent() }
    }
}

impl UreqAvailability {
    fn blocking_check(agent: &ureq::Agent, video_id: &str) -> Availability {
        match agent.get(&oembed_url(video_id)).call() {
            Ok(resp) => {
                let status = resp.status();
                let mut body = Vec::new();
                if let Err(e) = resp.into_reader().read_to_end(&mut body) {
                    debug!("video {video_id} failed: {e}");
                    return Availability::Unavailable;
                }
                availability_from_response(status, &body)
            }
            Err(ureq::Error::Status(code, _)) => {
                debug!("video {video_id} failed: HTTP {code}");
                Availability::Unavailable
            }
            Err(e) => {
                debug!("video {video_id} failed: {e}");
                Availability::Unavailable
            }
        }
    }
}

impl AvailabilityCheck for UreqAvailability {
    fn check(&self, video_id: &str) -> CheckFuture {
        let agent = self.agent.clone();
        let video_id = video_id.to_string();
        Box::pin(async move {
            off_thread(move || Self::blocking_check(&agent, &video_id))
                .await
                .unwrap_or(Availability::Unavailable)
        })
    }
}

/// Manifest at a local path or an `http(s)` URL.
#[derive(Clone)]
pub struct NativeManifest {
    location: String,
    agent: ureq::Agent,
}

impl NativeManifest {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            agent: agent(),
        }
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    fn blocking_fetch(&self) -> Result<Vec<u8>> {
        if !self.is_remote() {
            return std::fs::read(&self.location)
                .with_context(|| format!("failed to read {}", self.location));
        }
        let resp = match self.agent.get(&self.location).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => {
                bail!("failed to load {}: {code}", self.location)
            }
            Err(e) => return Err(e).with_context(|| format!("failed to load {}", self.location)),
        };
        let mut body = Vec::new();
        resp.into_reader()
            .read_to_end(&mut body)
            .with_context(|| format!("failed to read body of {}", self.location))?;
        Ok(body)
    }
}

impl ManifestSource for NativeManifest {
    fn fetch(&self) -> ManifestFuture {
        let this = self.clone();
        Box::pin(async move {
            off_thread(move || this.blocking_fetch())
                .await
                .unwrap_or_else(|| Err(anyhow::anyhow!("manifest fetch thread vanished")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::manifest::pool_from_fetch;
    use futures_lite::future::block_on;

    #[test]
    fn reads_a_local_manifest() {
        let path = std::env::temp_dir().join(format!("meadow-manifest-{}.json", std::process::id()));
        std::fs::write(&path, br#"{"videoIds": ["A", "B", "C"]}"#).unwrap();
        let source = NativeManifest::new(path.to_string_lossy().to_string());
        let ids = pool_from_fetch(block_on(source.fetch()));
        std::fs::remove_file(&path).ok();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn missing_file_falls_back() {
        let source = NativeManifest::new("/definitely/not/here/penguin-videos.json");
        let fetched = block_on(source.fetch());
        assert!(fetched.is_err());
        assert_eq!(pool_from_fetch(fetched).len(), crate::video::FALLBACK_POOL.len());
    }
}
