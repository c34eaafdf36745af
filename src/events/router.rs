use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{BlockId, Event, EventDraft, EventId, Rsvp, RsvpId};
use super::notify::{notify_rsvps, Messenger};
use super::query;
use super::repository::EventRepository;
use super::roster::roster;
use crate::config::PropertiesHandle;
use crate::members::domain::{Person, PersonId};
use crate::members::repository::PersonDirectory;

static EVENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static BLOCK_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RSVP_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_event_id() -> EventId {
    EventId(EVENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_block_id() -> BlockId {
    BlockId(BLOCK_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_rsvp_id() -> RsvpId {
    RsvpId(RSVP_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Shared state for the event endpoints.
pub struct EventsState<E, P, M> {
    pub events: Arc<E>,
    pub people: Arc<P>,
    pub messenger: Arc<M>,
    pub properties: PropertiesHandle,
}

impl<E, P, M> Clone for EventsState<E, P, M> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            people: self.people.clone(),
            messenger: self.messenger.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// Router builder exposing the event listing, roster, RSVP, and
/// notification endpoints.
pub fn events_router<E, P, M>(state: EventsState<E, P, M>) -> Router
where
    E: EventRepository + 'static,
    P: PersonDirectory + 'static,
    M: Messenger + 'static,
{
    Router::new()
        .route("/api/v1/events", post(create_handler::<E, P, M>))
        .route("/api/v1/events/upcoming", get(upcoming_handler::<E, P, M>))
        .route("/api/v1/events/:event_id", get(show_handler::<E, P, M>))
        .route(
            "/api/v1/events/:event_id/roster",
            get(roster_handler::<E, P, M>),
        )
        .route(
            "/api/v1/events/:event_id/rsvps",
            post(rsvp_handler::<E, P, M>),
        )
        .route(
            "/api/v1/events/:event_id/notify",
            post(notify_handler::<E, P, M>),
        )
        .with_state(state)
}

/// Sanitized event representation returned by the listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub id: EventId,
    pub name: String,
    pub location: String,
    pub event_type: &'static str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub time_range: String,
    pub short_start_time: String,
    pub allows_rsvps: bool,
}

impl EventView {
    fn from_event(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            location: event.location.clone(),
            event_type: event.event_type.label(),
            start_time: event.start_time,
            end_time: event.end_time,
            time_range: event.nice_time_range(false),
            short_start_time: event.short_start_time(),
            allows_rsvps: event.allows_rsvps(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpcomingParams {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    person_id: Option<u64>,
    /// Evaluation instant override, mainly for tests and previews.
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct RsvpView {
    person: PersonId,
    created_at: DateTime<Utc>,
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "event not found" })),
    )
        .into_response()
}

fn store_failure(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

fn viewer_for<P: PersonDirectory>(people: &P, person_id: Option<u64>) -> Result<Option<Person>, Response> {
    match person_id {
        Some(id) => people.fetch(PersonId(id)).map_err(store_failure),
        None => Ok(None),
    }
}

async fn upcoming_handler<E, P, M>(
    State(state): State<EventsState<E, P, M>>,
    Query(params): Query<UpcomingParams>,
) -> Response
where
    E: EventRepository + 'static,
    P: PersonDirectory + 'static,
    M: Messenger + 'static,
{
    let viewer = match viewer_for(state.people.as_ref(), params.person_id) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let events = match state.events.all() {
        Ok(events) => events,
        Err(err) => return store_failure(err),
    };

    let now = params.now.unwrap_or_else(Utc::now);
    let limit = params.limit.unwrap_or(0);
    let views: Vec<EventView> = query::upcoming_events(&events, limit, viewer.as_ref(), now)
        .into_iter()
        .map(EventView::from_event)
        .collect();

    (StatusCode::OK, Json(views)).into_response()
}

#[derive(Debug, Deserialize)]
struct ShowParams {
    #[serde(default)]
    person_id: Option<u64>,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

/// Event detail, gated by the full view check: permission plus the
/// current-semester window. Events the viewer may not see read as absent.
async fn show_handler<E, P, M>(
    State(state): State<EventsState<E, P, M>>,
    Path(event_id): Path<u64>,
    Query(params): Query<ShowParams>,
) -> Response
where
    E: EventRepository + 'static,
    P: PersonDirectory + 'static,
    M: Messenger + 'static,
{
    let event = match state.events.fetch(EventId(event_id)) {
        Ok(Some(event)) => event,
        Ok(None) => return not_found(),
        Err(err) => return store_failure(err),
    };

    let viewer = match viewer_for(state.people.as_ref(), params.person_id) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let now = params.now.unwrap_or_else(Utc::now);
    let semester_start = state.properties.semester().start_time();
    if !query::can_view(&event, viewer.as_ref(), semester_start, now) {
        return not_found();
    }

    (StatusCode::OK, Json(EventView::from_event(&event))).into_response()
}

async fn roster_handler<E, P, M>(
    State(state): State<EventsState<E, P, M>>,
    Path(event_id): Path<u64>,
) -> Response
where
    E: EventRepository + 'static,
    P: PersonDirectory + 'static,
    M: Messenger + 'static,
{
    let event = match state.events.fetch(EventId(event_id)) {
        Ok(Some(event)) => event,
        Ok(None) => return not_found(),
        Err(err) => return store_failure(err),
    };

    let rsvps = match state.events.rsvps(event.id) {
        Ok(rsvps) => rsvps,
        Err(err) => return store_failure(err),
    };

    let lists = roster(&event, &rsvps);
    let to_views = |entries: Vec<Rsvp>| -> Vec<RsvpView> {
        entries
            .into_iter()
            .map(|rsvp| RsvpView {
                person: rsvp.person,
                created_at: rsvp.created_at,
            })
            .collect()
    };

    let payload = json!({
        "event_id": event.id,
        "admitted": to_views(lists.admitted),
        "waitlist": to_views(lists.waitlist),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct RsvpRequest {
    person_id: u64,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

async fn rsvp_handler<E, P, M>(
    State(state): State<EventsState<E, P, M>>,
    Path(event_id): Path<u64>,
    Json(request): Json<RsvpRequest>,
) -> Response
where
    E: EventRepository + 'static,
    P: PersonDirectory + 'static,
    M: Messenger + 'static,
{
    let event = match state.events.fetch(EventId(event_id)) {
        Ok(Some(event)) => event,
        Ok(None) => return not_found(),
        Err(err) => return store_failure(err),
    };

    if !event.allows_rsvps() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "RSVPs are not open for this event" })),
        )
            .into_response();
    }

    let viewer = match viewer_for(state.people.as_ref(), Some(request.person_id)) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    if !query::can_rsvp(&event, viewer.as_ref()) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "not permitted to RSVP for this event" })),
        )
            .into_response();
    }

    let rsvp = Rsvp {
        id: next_rsvp_id(),
        event: event.id,
        person: PersonId(request.person_id),
        created_at: request.created_at.unwrap_or_else(Utc::now),
    };

    match state.events.add_rsvp(rsvp.clone()) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "rsvp_id": rsvp.id, "event_id": rsvp.event })),
        )
            .into_response(),
        Err(err) => store_failure(err),
    }
}

async fn notify_handler<E, P, M>(
    State(state): State<EventsState<E, P, M>>,
    Path(event_id): Path<u64>,
) -> Response
where
    E: EventRepository + 'static,
    P: PersonDirectory + 'static,
    M: Messenger + 'static,
{
    let event = match state.events.fetch(EventId(event_id)) {
        Ok(Some(event)) => event,
        Ok(None) => return not_found(),
        Err(err) => return store_failure(err),
    };

    let rsvps = match state.events.rsvps(event.id) {
        Ok(rsvps) => rsvps,
        Err(err) => return store_failure(err),
    };

    let summary = notify_rsvps(
        &event,
        &rsvps,
        state.people.as_ref(),
        state.messenger.as_ref(),
    );
    (StatusCode::OK, Json(summary)).into_response()
}

async fn create_handler<E, P, M>(
    State(state): State<EventsState<E, P, M>>,
    Json(draft): Json<EventDraft>,
) -> Response
where
    E: EventRepository + 'static,
    P: PersonDirectory + 'static,
    M: Messenger + 'static,
{
    let mut block_ids = next_block_id;
    let event = match draft.into_event(next_event_id(), &mut block_ids) {
        Ok(event) => event,
        Err(violations) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "violations": violations })),
            )
                .into_response();
        }
    };

    let view = EventView::from_event(&event);
    match state.events.insert(event) {
        Ok(()) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => store_failure(err),
    }
}
