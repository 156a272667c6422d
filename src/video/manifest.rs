//! The prefetched pool manifest (`penguin-videos.json`) and the built-in
//! fallback list.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Deserialize;

/// Used whenever the manifest is missing, broken or empty.
pub const FALLBACK_POOL: [&str; 24] = [
    "Z7PlUGbsXlQ", "3wTWWjYTe1I", "_1v_EcjeIkg", "WOP-u3d9VgQ",
    "ddRvMG5yARQ", "3szxSF_hw7w", "LS-ErwR2PCg", "Kp5nUQkgWIc",
    "K3TeJEiTbIk", "6kQqW38nwkE", "oRkRwL0vjOg", "JCM6NTesP0I",
    "qZjhIYysBqU", "8tw-LyN5BYI", "nFAK8Vj62WM", "yU3-vZH_yYQ",
    "4vNuOzY2_YM", "tI0a5egh1Ck", "s4LaVjJad7Q", "DZW-_BNyj2g",
    "HU9bK2zIGIw", "xRwiY7J7zn8", "H3DfT0QLg7k", "2sD_vPGF-gQ",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolManifest {
    #[serde(alias = "identifiers")]
    pub video_ids: Vec<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl PoolManifest {
    /// Parse, drop blank and repeated ids, and reject manifests with nothing
    /// usable left.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut manifest: Self =
            serde_json::from_slice(bytes).context("penguin-videos.json is not a valid manifest")?;
        let mut seen = HashSet::new();
        manifest
            .video_ids
            .retain(|id| !id.trim().is_empty() && seen.insert(id.clone()));
        if manifest.video_ids.is_empty() {
            bail!("no usable video ids in penguin-videos.json");
        }
        Ok(manifest)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub type ManifestFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'static>>;
#[cfg(target_arch = "wasm32")]
pub type ManifestFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + 'static>>;

/// Fetches the raw manifest bytes (file, HTTP or browser `fetch`).
pub trait ManifestSource {
    fn fetch(&self) -> ManifestFuture;
}

pub fn fallback_pool() -> Vec<String> {
    FALLBACK_POOL.iter().map(|s| s.to_string()).collect()
}

/// Turn a fetch outcome into a pool. Never fails: any problem is logged and
/// the built-in list is returned.
pub fn pool_from_fetch(fetched: Result<Vec<u8>>) -> Vec<String> {
    match fetched.and_then(|bytes| PoolManifest::parse(&bytes)) {
        Ok(manifest) => {
            info!("video pool: loaded {} videos from manifest", manifest.video_ids.len());
            if let Some(updated) = &manifest.last_updated {
                info!("video pool:   last updated: {updated}");
            }
            if let Some(query) = &manifest.query {
                info!("video pool:   search query: \"{query}\"");
            }
            manifest.video_ids
        }
        Err(e) => {
            warn!("video pool: could not load pre-fetched videos: {e:#}");
            info!("video pool: using fallback pool instead");
            fallback_pool()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn manifest_ids_are_used_verbatim() {
        let body = br#"{"videoIds": ["A", "B", "C"], "lastUpdated": "2025-01-02T03:04:05Z", "query": "penguins"}"#;
        assert_eq!(pool_from_fetch(Ok(body.to_vec())), ["A", "B", "C"]);
    }

    #[test]
    fn repeated_ids_keep_their_first_position() {
        let body = br#"{"videoIds": ["A", "A", "B", "A"]}"#;
        assert_eq!(pool_from_fetch(Ok(body.to_vec())), ["A", "B"]);
    }

    #[test]
    fn identifiers_alias_is_accepted() {
        let m = PoolManifest::parse(br#"{"identifiers": ["A", "B", "C"]}"#).unwrap();
        assert_eq!(m.video_ids, ["A", "B", "C"]);
        assert_eq!(m.query, None);
    }

    #[test]
    fn broken_manifests_fall_back() {
        let cases: [Result<Vec<u8>>; 6] = [
            Err(anyhow!("404 Not Found")),
            Ok(b"<html>oops</html>".to_vec()),
            Ok(br#"{"videoIds": []}"#.to_vec()),
            Ok(br#"{"videoIds": ["", "  "]}"#.to_vec()),
            Ok(br#"{"videoIds": "A,B"}"#.to_vec()),
            Ok(br#"{"lastUpdated": "yesterday"}"#.to_vec()),
        ];
        for fetched in cases {
            let pool = pool_from_fetch(fetched);
            assert_eq!(pool.len(), FALLBACK_POOL.len());
            assert_eq!(pool[0], "Z7PlUGbsXlQ");
        }
    }
}
