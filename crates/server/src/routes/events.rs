//! Event API route handlers.

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use tracing::instrument;

use countdown_core::EventId;
use countdown_core::countdown::CountdownSnapshot;
use countdown_core::links::ShareLinks;

use super::home::GalleryQuery;
use crate::db::EventRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CountdownEvent, EventInput, JoinRequest, NewJoinRequest};
use crate::services::events::EventService;
use crate::state::AppState;

/// Interval between countdown stream ticks.
const TICK: Duration = Duration::from_secs(1);

/// Parse a path segment as an event ID. Malformed IDs are simply not found.
pub(crate) fn parse_event_id(raw: &str) -> Result<EventId> {
    EventId::parse(raw).map_err(|_| AppError::NotFound("Event not found".to_owned()))
}

/// Snapshots of the countdown to `target`, one per `period`, ending after
/// the first expired snapshot.
///
/// Each tick is computed from the wall clock, so a delayed tick never
/// accumulates drift.
pub fn countdown_snapshots(
    target: DateTime<Utc>,
    period: Duration,
) -> impl Stream<Item = CountdownSnapshot> {
    stream! {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let snapshot = CountdownSnapshot::at(target, Utc::now());
            yield snapshot;
            if snapshot.expired {
                break;
            }
        }
    }
}

/// Public events, soonest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Vec<CountdownEvent>>> {
    let events = EventRepository::new(state.pool())
        .list_public(&query.to_filter(Utc::now()))
        .await?;
    Ok(Json(events))
}

/// Create an event owned by the current user.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<CountdownEvent>)> {
    let settings = state.settings().await?;
    let event = EventService::new(state.pool())
        .create(user.id, &input, &settings, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Event detail. Private events are reachable by direct link.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CountdownEvent>> {
    let id = parse_event_id(&id)?;
    let event = EventService::new(state.pool()).get(&id).await?;
    Ok(Json(event))
}

/// Overwrite an event. The body must echo the version it was loaded at.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(input): Json<EventInput>,
) -> Result<Json<CountdownEvent>> {
    let id = parse_event_id(&id)?;
    let settings = state.settings().await?;
    let event = EventService::new(state.pool())
        .update(user.id, &id, &input, &settings, Utc::now())
        .await?;
    Ok(Json(event))
}

/// Delete an event.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_event_id(&id)?;
    EventService::new(state.pool()).delete(user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// One countdown snapshot.
#[instrument(skip(state))]
pub async fn countdown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CountdownSnapshot>> {
    let id = parse_event_id(&id)?;
    let event = EventService::new(state.pool()).get(&id).await?;
    Ok(Json(event.snapshot(Utc::now())))
}

/// Countdown as Server-Sent Events, one `tick` per second.
///
/// The stream closes after the first expired snapshot; a client
/// disconnect drops the stream and its interval.
#[instrument(skip(state))]
pub async fn countdown_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let id = parse_event_id(&id)?;
    let event = EventService::new(state.pool()).get(&id).await?;

    let events = countdown_snapshots(event.event_date, TICK).map(|snapshot| {
        let event = Event::default().event("tick");
        Ok(event.json_data(snapshot).unwrap_or_else(|_| Event::default().event("error")))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Social share links for an event.
#[instrument(skip(state))]
pub async fn share(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShareLinks>> {
    let id = parse_event_id(&id)?;
    let event = EventService::new(state.pool()).get(&id).await?;
    Ok(Json(ShareLinks::for_event(
        &state.config().base_url,
        &event.id,
        &event.title,
    )))
}

/// Ask to join an event.
#[instrument(skip(state, input))]
pub async fn join(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<NewJoinRequest>,
) -> Result<(StatusCode, Json<JoinRequest>)> {
    let id = parse_event_id(&id)?;
    let request = EventService::new(state.pool()).join(&id, &input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;

    #[tokio::test]
    async fn test_stream_ends_after_expiry() {
        let past = Utc::now() - ChronoDuration::seconds(5);
        let snapshots: Vec<_> = countdown_snapshots(past, Duration::from_millis(10))
            .collect()
            .await;
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].expired);
        assert_eq!(snapshots[0].remaining.total_seconds(), 0);
    }

    #[tokio::test]
    async fn test_stream_counts_down_to_zero() {
        let target = Utc::now() + ChronoDuration::milliseconds(250);
        let snapshots: Vec<_> = countdown_snapshots(target, Duration::from_millis(50))
            .collect()
            .await;

        assert!(snapshots.len() >= 2);
        let expired: Vec<_> = snapshots.iter().filter(|s| s.expired).collect();
        assert_eq!(expired.len(), 1);
        assert!(snapshots.last().unwrap().expired);
        assert!(
            snapshots
                .windows(2)
                .all(|w| w[0].remaining.total_seconds() >= w[1].remaining.total_seconds())
        );
    }

    #[test]
    fn test_parse_event_id() {
        assert!(parse_event_id("aB3dE5gH").is_ok());
        let err = parse_event_id("../etc").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
