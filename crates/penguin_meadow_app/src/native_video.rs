//! Native video slots: resolved on the IO pool, listed in an egui window.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use bevy_tasks::IoTaskPool;
use crossbeam_channel::{Receiver, Sender, unbounded};
use penguin_meadow::video::http::{NativeManifest, UreqAvailability};
use penguin_meadow::{MeadowConfig, ResolvedVideo, SlotHost, VideoPoolLoader};

pub struct NativeVideoPlugin {
    slots: usize,
    max_attempts: usize,
    manifest: String,
}

impl NativeVideoPlugin {
    pub fn from_config(config: &MeadowConfig) -> Self {
        Self {
            slots: config.video_slots,
            max_attempts: config.max_attempts,
            manifest: config.pool_manifest.clone(),
        }
    }
}

impl Plugin for NativeVideoPlugin {
    fn build(&self, app: &mut App) {
        let (tx, rx) = unbounded();
        app.insert_resource(VideoSlots {
            loader: VideoPoolLoader::new(UreqAvailability::default(), self.max_attempts),
            manifest: NativeManifest::new(self.manifest.clone()),
            host: ChannelHost {
                count: self.slots,
                tx,
            },
            rx,
            views: vec![None; self.slots],
        })
        .add_systems(Startup, start_loading)
        .add_systems(Update, receive_slots)
        .add_systems(EguiPrimaryContextPass, draw_video_slots);
    }
}

/// Hands installed videos to the frame loop.
#[derive(Clone)]
struct ChannelHost {
    count: usize,
    tx: Sender<(usize, ResolvedVideo)>,
}

impl SlotHost for ChannelHost {
    fn placeholders(&self) -> Vec<usize> {
        (0..self.count).collect()
    }

    fn install(&self, slot: usize, video: &ResolvedVideo) {
        // Receiver only goes away with the app.
        let _ = self.tx.send((slot, video.clone()));
    }
}

#[derive(Resource)]
struct VideoSlots {
    loader: VideoPoolLoader<UreqAvailability>,
    manifest: NativeManifest,
    host: ChannelHost,
    rx: Receiver<(usize, ResolvedVideo)>,
    /// `None` while a slot is still resolving.
    views: Vec<Option<ResolvedVideo>>,
}

fn start_loading(slots: Res<VideoSlots>) {
    let loader = slots.loader.clone();
    let manifest = slots.manifest.clone();
    let host = slots.host.clone();
    IoTaskPool::get()
        .spawn(async move {
            loader.load_pool(&manifest).await;
            loader.attach_to_page(&host).await;
        })
        .detach();
}

fn receive_slots(mut slots: ResMut<VideoSlots>) {
    while let Ok((slot, video)) = slots.rx.try_recv() {
        match slots.views.get_mut(slot) {
            Some(view) => *view = Some(video),
            None => warn!("video slot {slot} does not exist"),
        }
    }
}

fn replace(slots: &mut VideoSlots, slot: usize) {
    if let Some(view) = slots.views.get_mut(slot) {
        *view = None;
    }
    let loader = slots.loader.clone();
    let host = slots.host.clone();
    IoTaskPool::get()
        .spawn(async move {
            loader.replace_slot(&host, slot).await;
        })
        .detach();
}

fn draw_video_slots(mut contexts: EguiContexts, mut slots: ResMut<VideoSlots>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut to_replace = Vec::new();
    egui::Window::new("Penguin Videos")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            for (slot, view) in slots.views.iter().enumerate() {
                ui.push_id(slot, |ui| {
                    let Some(video) = view else {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Loading penguin video...");
                        });
                        ui.separator();
                        return;
                    };
                    let embed = video.embed();
                    ui.heading(&embed.title);
                    ui.horizontal(|ui| {
                        ui.monospace(&embed.video_id);
                        if !video.verified {
                            ui.weak("(unverified)");
                        }
                    });
                    ui.horizontal(|ui| {
                        if ui.button("Open").clicked() {
                            let url = embed.watch_url();
                            if let Err(e) = open::that(&url) {
                                warn!("failed to open {url}: {e}");
                            }
                        }
                        if ui.button("Replace").clicked() {
                            to_replace.push(slot);
                        }
                    });
                    ui.separator();
                });
            }
        });

    for slot in to_replace {
        replace(&mut slots, slot);
    }
}
