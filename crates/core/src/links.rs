//! Share and `mailto:` link construction.

use serde::Serialize;
use urlencoding::encode;

use crate::types::EventId;

/// Canonical public URL of an event page.
#[must_use]
pub fn event_url(base_url: &str, id: &EventId) -> String {
    format!("{}/event/{}", base_url.trim_end_matches('/'), id)
}

/// Build a `mailto:` deep link with a percent-encoded subject and body.
#[must_use]
pub fn mailto(address: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        address,
        encode(subject),
        encode(body)
    )
}

/// Links for sharing an event page on social platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub url: String,
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub whatsapp: String,
    pub email: String,
}

impl ShareLinks {
    /// Build share links for an event page.
    #[must_use]
    pub fn for_event(base_url: &str, id: &EventId, title: &str) -> Self {
        let url = event_url(base_url, id);
        let text = format!("Join the countdown to {title}!");
        let enc_url = encode(&url);
        let enc_text = encode(&text);

        Self {
            twitter: format!("https://twitter.com/intent/tweet?text={enc_text}&url={enc_url}"),
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={enc_url}"),
            linkedin: format!("https://www.linkedin.com/sharing/share-offsite/?url={enc_url}"),
            whatsapp: format!("https://wa.me/?text={}", encode(&format!("{text} {url}"))),
            email: format!(
                "mailto:?subject={}&body={}",
                encode(title),
                encode(&format!("{text}\n\n{url}"))
            ),
            url,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id() -> EventId {
        EventId::parse("aB3dE5gH").unwrap()
    }

    #[test]
    fn test_event_url_trims_trailing_slash() {
        assert_eq!(
            event_url("https://countdown.example/", &id()),
            "https://countdown.example/event/aB3dE5gH"
        );
    }

    #[test]
    fn test_mailto_encodes() {
        assert_eq!(
            mailto("guest@example.com", "Re: Our wedding", "Hi & welcome"),
            "mailto:guest@example.com?subject=Re%3A%20Our%20wedding&body=Hi%20%26%20welcome"
        );
    }

    #[test]
    fn test_share_links() {
        let links = ShareLinks::for_event("https://countdown.example", &id(), "Launch Day");
        assert_eq!(links.url, "https://countdown.example/event/aB3dE5gH");
        assert!(links.twitter.starts_with("https://twitter.com/intent/tweet?text=Join%20the%20countdown"));
        assert!(
            links
                .facebook
                .ends_with("u=https%3A%2F%2Fcountdown.example%2Fevent%2FaB3dE5gH")
        );
        assert!(links.email.starts_with("mailto:?subject=Launch%20Day&body="));
        assert!(links.whatsapp.contains("aB3dE5gH"));
    }
}
