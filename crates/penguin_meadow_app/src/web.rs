//! Browser glue: `.video-card` slots in the page, fetch-backed availability
//! checks and manifest, page fault listeners, and the loader handle that the
//! page can call as `reload_videos()` / `replace_video(slot)`.

use std::cell::RefCell;

use anyhow::{anyhow, bail};
use bevy::prelude::{debug, error, info, warn};
use js_sys::Uint8Array;
use penguin_meadow::video::{
    Availability, AvailabilityCheck, CheckFuture, ManifestFuture, ManifestSource, SlotListeners,
    availability_from_response, oembed_url,
};
use penguin_meadow::{MeadowConfig, ResolvedVideo, SlotHost, VideoPoolLoader};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Element, ErrorEvent, PromiseRejectionEvent, Response};

thread_local! {
    static LOADER: RefCell<Option<VideoPoolLoader<FetchAvailability>>> = const { RefCell::new(None) };
    static ON_PLAYER_FAULT: RefCell<SlotListeners<Closure<dyn FnMut(web_sys::Event)>>> =
        RefCell::new(SlotListeners::default());
}

fn current_loader() -> Option<VideoPoolLoader<FetchAvailability>> {
    LOADER.with(|l| l.borrow().clone())
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn js_error(e: JsValue) -> anyhow::Error {
    anyhow!("{}", e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// GET `url`, returning the status and the raw body.
async fn fetch_bytes(url: &str) -> Result<(u16, Vec<u8>), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let resp: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    let status = resp.status();
    let body = JsFuture::from(resp.array_buffer()?).await?;
    Ok((status, Uint8Array::new(&body).to_vec()))
}

#[derive(Clone, Copy, Default)]
pub struct FetchAvailability;

impl AvailabilityCheck for FetchAvailability {
    fn check(&self, video_id: &str) -> CheckFuture {
        let video_id = video_id.to_string();
        Box::pin(async move {
            match fetch_bytes(&oembed_url(&video_id)).await {
                Ok((status, body)) => availability_from_response(status, &body),
                Err(e) => {
                    debug!("video {video_id} failed: {e:?}");
                    Availability::Unavailable
                }
            }
        })
    }
}

/// The manifest, fetched relative to the page.
pub struct FetchManifest {
    url: String,
}

impl ManifestSource for FetchManifest {
    fn fetch(&self) -> ManifestFuture {
        let url = self.url.clone();
        Box::pin(async move {
            let (status, body) = fetch_bytes(&url).await.map_err(js_error)?;
            if !(200..300).contains(&status) {
                bail!("failed to load {url}: {status}");
            }
            Ok(body)
        })
    }
}

/// The page's `.video-card` elements, in document order.
#[derive(Clone, Copy, Default)]
pub struct DomSlotHost {
    /// Treat every card as open, not just those still showing `.video-loading`.
    every_card: bool,
}

impl DomSlotHost {
    fn cards() -> Result<Vec<Element>, JsValue> {
        let list = document()?.query_selector_all(".video-card")?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn open_slots(&self) -> Result<Vec<usize>, JsValue> {
        let mut open = Vec::new();
        for (slot, card) in Self::cards()?.iter().enumerate() {
            if self.every_card || card.query_selector(".video-loading")?.is_some() {
                open.push(slot);
            }
        }
        Ok(open)
    }

    fn install_into(&self, slot: usize, video: &ResolvedVideo) -> Result<(), JsValue> {
        let card = Self::cards()?
            .into_iter()
            .nth(slot)
            .ok_or_else(|| JsValue::from_str("no such video card"))?;

        let iframe = document()?.create_element("iframe")?;
        for (name, value) in video.embed().iframe_attributes() {
            iframe.set_attribute(name, &value)?;
        }

        if let Some(loading) = card.query_selector(".video-loading")? {
            loading.replace_with_with_node_1(&iframe)?;
        } else if let Some(old) = card.query_selector("iframe")? {
            old.replace_with_with_node_1(&iframe)?;
        } else {
            card.prepend_with_node_1(&iframe)?;
        }

        if let Some(heading) = card.query_selector("h3")? {
            heading.set_text_content(Some(&video.title));
        }

        ON_PLAYER_FAULT.with(|listeners| {
            let mut listeners = listeners.borrow_mut();
            let on_fault = listeners.for_slot(slot, |slot| {
                Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
                    warn!("video slot {slot}: player failed to load, picking another");
                    replace_video(slot);
                })
            });
            iframe.add_event_listener_with_callback("error", on_fault.as_ref().unchecked_ref())
        })?;
        Ok(())
    }
}

impl SlotHost for DomSlotHost {
    fn placeholders(&self) -> Vec<usize> {
        self.open_slots().unwrap_or_else(|e| {
            warn!("video cards unavailable: {e:?}");
            Vec::new()
        })
    }

    fn install(&self, slot: usize, video: &ResolvedVideo) {
        if let Err(e) = self.install_into(slot, video) {
            warn!("video slot {slot}: could not install {}: {e:?}", video.video_id);
        }
    }
}

fn install_fault_listeners() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let on_error = Closure::<dyn FnMut(ErrorEvent)>::new(|e: ErrorEvent| {
        error!(
            "ERROR: {} at {}:{}:{}",
            e.message(),
            e.filename(),
            e.lineno(),
            e.colno()
        );
    });
    window.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
    on_error.forget();

    let on_rejection = Closure::<dyn FnMut(PromiseRejectionEvent)>::new(
        |e: PromiseRejectionEvent| {
            let reason = e.reason();
            let reason = reason.as_string().unwrap_or_else(|| format!("{reason:?}"));
            error!("UNHANDLED PROMISE REJECTION: {reason}");
        },
    );
    window.add_event_listener_with_callback(
        "unhandledrejection",
        on_rejection.as_ref().unchecked_ref(),
    )?;
    on_rejection.forget();
    Ok(())
}

/// Hook up the page: fault listeners, then load the pool and fill every card.
pub fn start(config: &MeadowConfig) {
    if let Err(e) = install_fault_listeners() {
        warn!("could not watch for page errors: {e:?}");
    }

    let loader = VideoPoolLoader::new(FetchAvailability, config.max_attempts);
    LOADER.with(|l| *l.borrow_mut() = Some(loader.clone()));
    let manifest = FetchManifest {
        url: config.pool_manifest.clone(),
    };
    spawn_local(async move {
        loader.load_pool(&manifest).await;
        loader.attach_to_page(&DomSlotHost::default()).await;
    });
}

/// Re-resolve every video card on the page.
#[wasm_bindgen]
pub fn reload_videos() {
    let Some(loader) = current_loader() else {
        warn!("reload_videos: loader not started");
        return;
    };
    info!("reloading all penguin videos");
    spawn_local(async move {
        loader
            .attach_to_page(&DomSlotHost { every_card: true })
            .await;
    });
}

/// Swap the video in card `slot` for a freshly resolved one.
#[wasm_bindgen]
pub fn replace_video(slot: usize) {
    let Some(loader) = current_loader() else {
        warn!("replace_video: loader not started");
        return;
    };
    spawn_local(async move {
        loader.replace_slot(&DomSlotHost::default(), slot).await;
    });
}
