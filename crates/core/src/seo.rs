//! Meta tags for server-rendered pages.

use chrono::{DateTime, Utc};

/// Maximum length of a meta description before it is truncated.
const MAX_DESCRIPTION_CHARS: usize = 160;

/// Page metadata rendered into `<title>`, description, Open Graph and
/// Twitter card tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
    pub url: String,
    /// Only absolute `http(s)` images; data URLs cannot be scraped.
    pub image: Option<String>,
}

impl MetaTags {
    /// Metadata for the public gallery.
    #[must_use]
    pub fn for_site(site_name: &str, base_url: &str) -> Self {
        Self {
            title: site_name.to_owned(),
            description: "Create and share countdowns for weddings, birthdays, launches and every occasion worth counting down to.".to_owned(),
            url: base_url.trim_end_matches('/').to_owned(),
            image: None,
        }
    }

    /// Metadata for one event page.
    #[must_use]
    pub fn for_event(
        site_name: &str,
        url: String,
        title: &str,
        description: Option<&str>,
        event_date: DateTime<Utc>,
        background_image: Option<&str>,
    ) -> Self {
        let description = match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => truncate(d, MAX_DESCRIPTION_CHARS),
            None => format!(
                "Counting down to {title} on {}.",
                event_date.format("%B %-d, %Y")
            ),
        };
        let image = background_image
            .filter(|i| i.starts_with("https://") || i.starts_with("http://"))
            .map(str::to_owned);

        Self {
            title: format!("{title} | {site_name}"),
            description,
            url,
            image,
        }
    }
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 12, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_event_meta_defaults_description() {
        let meta = MetaTags::for_event(
            "Countdown Events",
            "https://x.test/event/aB3dE5gH".to_owned(),
            "Our Wedding",
            Some("   "),
            date(),
            Some("data:image/png;base64,AAAA"),
        );
        assert_eq!(meta.title, "Our Wedding | Countdown Events");
        assert_eq!(meta.description, "Counting down to Our Wedding on September 12, 2026.");
        assert_eq!(meta.image, None);
    }

    #[test]
    fn test_event_meta_truncates_and_keeps_http_image() {
        let long = "x".repeat(400);
        let meta = MetaTags::for_event(
            "Site",
            "u".to_owned(),
            "T",
            Some(&long),
            date(),
            Some("https://cdn.test/bg.jpg"),
        );
        assert_eq!(meta.description.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(meta.description.ends_with('…'));
        assert_eq!(meta.image.as_deref(), Some("https://cdn.test/bg.jpg"));
    }
}
