//! Loads the video pool and resolves slots against the live oEmbed endpoint,
//! without opening a window.
//!
//! Usage: `probe_pool [slots] [manifest]`. Both default to the `MEADOW_*`
//! environment (see `MeadowConfig`).

use anyhow::{Context, Result};
use futures_lite::future::block_on;
use log::info;
use penguin_meadow::video::http::{NativeManifest, UreqAvailability};
use penguin_meadow::{DebugConsole, MeadowConfig, ResolvedVideo, SlotHost, StderrSink, VideoPoolLoader};

/// Every slot starts empty; installs are only logged.
struct ProbeSlots(usize);

impl SlotHost for ProbeSlots {
    fn placeholders(&self) -> Vec<usize> {
        (0..self.0).collect()
    }

    fn install(&self, slot: usize, video: &ResolvedVideo) {
        info!("slot {slot}: {} ({})", video.video_id, video.title);
    }
}

fn main() -> Result<()> {
    let mut config = MeadowConfig::from_env();
    let mut args = std::env::args().skip(1);
    if let Some(slots) = args.next() {
        config.video_slots = slots
            .parse()
            .with_context(|| format!("slot count must be a number, got {slots:?}"))?;
    }
    if let Some(manifest) = args.next() {
        config.pool_manifest = manifest;
    }

    let console = DebugConsole::new(config.log_level, vec![Box::new(StderrSink)]);
    console.install().context("failed to install the console logger")?;
    console.capture_panics();

    let loader = VideoPoolLoader::new(UreqAvailability::default(), config.max_attempts);
    let manifest = NativeManifest::new(config.pool_manifest.clone());
    let host = ProbeSlots(config.video_slots);

    let mut settled = block_on(async {
        let pool = loader.load_pool(&manifest).await;
        info!("pool has {} candidates", pool.len());
        loader.attach_to_page(&host).await
    });
    settled.sort_by_key(|(slot, _)| *slot);

    for (slot, video) in &settled {
        let embed = video.embed();
        println!(
            "{slot}\t{}\t{}\t{}\t{}",
            embed.video_id,
            if video.verified { "verified" } else { "unverified" },
            embed.title,
            embed.src()
        );
    }
    Ok(())
}
