//! Server-rendered public pages: the event gallery and the event page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use countdown_core::countdown::CountdownSnapshot;
use countdown_core::image::is_css_safe;
use countdown_core::links::{ShareLinks, event_url};
use countdown_core::seo::MetaTags;
use countdown_core::settings::EventTypeOption;
use countdown_core::{EventId, SystemSettings};

use crate::db::EventRepository;
use crate::db::events::PublicEventFilter;
use crate::error::{AppError, Result};
use crate::models::CountdownEvent;
use crate::state::AppState;

/// Gallery filters.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub upcoming: bool,
}

impl GalleryQuery {
    /// Repository filter for these query parameters at `now`.
    #[must_use]
    pub fn to_filter(&self, now: DateTime<Utc>) -> PublicEventFilter {
        PublicEventFilter {
            event_type: self
                .event_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty() && *t != "all")
                .map(str::to_owned),
            upcoming_after: self.upcoming.then_some(now),
        }
    }
}

/// An event card in the gallery.
#[derive(Debug, Clone)]
pub struct EventCard {
    pub id: String,
    pub title: String,
    pub type_label: String,
    pub date: String,
    pub image: Option<String>,
    pub countdown: CountdownSnapshot,
}

/// Drop stored images that would not survive inside a CSS `url()`.
fn css_image(value: Option<&str>) -> Option<String> {
    value.filter(|v| is_css_safe(v)).map(str::to_owned)
}

impl EventCard {
    fn new(event: &CountdownEvent, settings: &SystemSettings, now: DateTime<Utc>) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            type_label: settings.event_type_label(&event.event_type),
            date: format_date(event.event_date),
            image: css_image(event.background_image.as_deref()),
            countdown: event.snapshot(now),
        }
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y at %H:%M UTC").to_string()
}

/// Gallery page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub site_name: String,
    pub meta: MetaTags,
    pub events: Vec<EventCard>,
    pub type_options: Vec<EventTypeOption>,
    pub selected_type: String,
    pub upcoming: bool,
}

/// Event page template.
#[derive(Template, WebTemplate)]
#[template(path = "event.html")]
pub struct EventTemplate {
    pub site_name: String,
    pub meta: MetaTags,
    pub event: EventCard,
    pub description: Option<String>,
    pub event_date_iso: String,
    pub mobile_image: Option<String>,
    pub allow_join: bool,
    pub share: ShareLinks,
}

/// Public event gallery.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<HomeTemplate> {
    let settings = state.settings().await?;
    let now = Utc::now();

    let events = EventRepository::new(state.pool())
        .list_public(&query.to_filter(now))
        .await?;

    Ok(HomeTemplate {
        meta: MetaTags::for_site(&settings.site_name, &state.config().base_url),
        events: events
            .iter()
            .map(|e| EventCard::new(e, &settings, now))
            .collect(),
        type_options: settings.event_type_options(),
        selected_type: query.event_type.unwrap_or_default(),
        upcoming: query.upcoming,
        site_name: settings.site_name,
    })
}

/// Event page with the initial countdown rendered server-side.
///
/// Private events are reachable by anyone holding the link.
#[instrument(skip(state))]
pub async fn event_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<EventTemplate> {
    let id = EventId::parse(&id).map_err(|_| AppError::NotFound("Event not found".to_owned()))?;
    let event = EventRepository::new(state.pool())
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_owned()))?;
    let settings = state.settings().await?;
    let base_url = &state.config().base_url;

    let meta = MetaTags::for_event(
        &settings.site_name,
        event_url(base_url, &event.id),
        &event.title,
        event.description.as_deref(),
        event.event_date,
        event.background_image.as_deref(),
    );

    Ok(EventTemplate {
        meta,
        event: EventCard::new(&event, &settings, Utc::now()),
        description: event.description.clone(),
        event_date_iso: event.event_date.to_rfc3339(),
        mobile_image: css_image(event.mobile_background_image.as_deref()),
        allow_join: event.allow_join,
        share: ShareLinks::for_event(base_url, &event.id, &event.title),
        site_name: settings.site_name,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_unsafe_stored_images_are_not_rendered() {
        assert_eq!(
            css_image(Some("https://cdn.test/bg.jpg")),
            Some("https://cdn.test/bg.jpg".to_owned())
        );
        assert_eq!(css_image(Some("https://x.test/a.jpg') ; x: url('y")), None);
        assert_eq!(css_image(None), None);
    }

    #[test]
    fn test_gallery_filter() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let filter = GalleryQuery::default().to_filter(now);
        assert_eq!(filter.event_type, None);
        assert_eq!(filter.upcoming_after, None);

        let filter = GalleryQuery {
            event_type: Some("all".to_owned()),
            upcoming: true,
        }
        .to_filter(now);
        assert_eq!(filter.event_type, None);
        assert_eq!(filter.upcoming_after, Some(now));

        let filter = GalleryQuery {
            event_type: Some(" wedding ".to_owned()),
            upcoming: false,
        }
        .to_filter(now);
        assert_eq!(filter.event_type.as_deref(), Some("wedding"));
    }

    #[test]
    fn test_date_format() {
        let date = Utc.with_ymd_and_hms(2026, 9, 12, 15, 30, 0).unwrap();
        assert_eq!(format_date(date), "September 12, 2026 at 15:30 UTC");
    }
}
