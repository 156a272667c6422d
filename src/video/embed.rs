//! The playback element for a resolved video.

use super::availability::watch_url;

/// Title shown when a video could not be verified or reported no title.
pub const PLACEHOLDER_TITLE: &str = "Penguin Video";

pub const EMBED_WIDTH: u32 = 560;
pub const EMBED_HEIGHT: u32 = 315;
pub const EMBED_ALLOW: &str = "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";
pub const EMBED_REFERRER_POLICY: &str = "strict-origin-when-cross-origin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSpec {
    pub video_id: String,
    pub title: String,
}

impl EmbedSpec {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            video_id: video_id.into(),
            title: if title.trim().is_empty() {
                PLACEHOLDER_TITLE.to_string()
            } else {
                title
            },
        }
    }

    pub fn src(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.video_id)
    }

    pub fn watch_url(&self) -> String {
        watch_url(&self.video_id)
    }

    /// `(name, value)` attribute pairs for the `<iframe>`.
    pub fn iframe_attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("width", EMBED_WIDTH.to_string()),
            ("height", EMBED_HEIGHT.to_string()),
            ("src", self.src()),
            ("title", self.title.clone()),
            ("frameborder", "0".to_string()),
            ("allow", EMBED_ALLOW.to_string()),
            ("referrerpolicy", EMBED_REFERRER_POLICY.to_string()),
            ("allowfullscreen", String::new()),
        ]
    }
}
