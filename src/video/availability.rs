//! oEmbed availability checks.
//!
//! The check is advisory. A network error, a non-2xx status and an
//! unparsable body all read as "unavailable"; none of them is an error.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available { title: String },
    Unavailable,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub type CheckFuture = Pin<Box<dyn Future<Output = Availability> + Send + 'static>>;
#[cfg(target_arch = "wasm32")]
pub type CheckFuture = Pin<Box<dyn Future<Output = Availability> + 'static>>;

pub trait AvailabilityCheck {
    fn check(&self, video_id: &str) -> CheckFuture;
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL}{video_id}")
}

pub fn oembed_url(video_id: &str) -> String {
    format!("{OEMBED_ENDPOINT}?url={}&format=json", watch_url(video_id))
}

#[derive(Deserialize)]
struct OEmbed {
    #[serde(default)]
    title: String,
}

/// Interpret an oEmbed HTTP response.
pub fn availability_from_response(status: u16, body: &[u8]) -> Availability {
    if !(200..300).contains(&status) {
        return Availability::Unavailable;
    }
    match serde_json::from_slice::<OEmbed>(body) {
        Ok(o) => Availability::Available {
            title: o.title.trim().to_string(),
        },
        Err(_) => Availability::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_oembed_url() {
        assert_eq!(
            oembed_url("Z7PlUGbsXlQ"),
            "https://www.youtube.com/oembed?url=https://www.youtube.com/watch?v=Z7PlUGbsXlQ&format=json"
        );
    }

    #[test]
    fn success_carries_the_title() {
        let body = br#"{"title": "Penguins Jumping", "author_name": "someone", "type": "video"}"#;
        assert_eq!(
            availability_from_response(200, body),
            Availability::Available {
                title: "Penguins Jumping".into()
            }
        );
    }

    #[test]
    fn everything_else_is_unavailable() {
        assert_eq!(availability_from_response(401, b"Unauthorized"), Availability::Unavailable);
        assert_eq!(availability_from_response(404, b"Not Found"), Availability::Unavailable);
        assert_eq!(availability_from_response(200, b"Bad Request"), Availability::Unavailable);
        assert!(!availability_from_response(500, br#"{"title": "x"}"#).is_available());
    }
}
