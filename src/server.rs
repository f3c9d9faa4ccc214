//! HTTP endpoints for health checks, event listing, and bookings.

use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::booking::BookingRecord;
use crate::db::Database;
use crate::error::AppError;
use crate::event::{EventInput, EventRecord};
use crate::normalize::to_iso_millis;

/// Lowercase alphanumeric runs joined by single hyphens.
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

struct HttpState {
    db: Database,
}

/// Response body for the `/healthz` endpoint.
#[derive(Serialize, Deserialize)]
struct Health {
    /// Always "ok" when the server is running.
    status: String,
}

/// Minimal service information document served at `/`.
#[derive(Serialize, Deserialize)]
struct ServiceInfo {
    name: String,
    version: String,
}

/// JSON projection of an event, with timestamps as ISO strings.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EventRecord> for EventResponse {
    fn from(ev: EventRecord) -> Self {
        Self {
            id: ev.id,
            title: ev.title,
            slug: ev.slug,
            description: ev.description,
            overview: ev.overview,
            image: ev.image,
            venue: ev.venue,
            location: ev.location,
            date: ev.date,
            time: ev.time,
            mode: ev.mode,
            audience: ev.audience,
            agenda: ev.agenda,
            organizer: ev.organizer,
            tags: ev.tags,
            created_at: to_iso_millis(&ev.created_at),
            updated_at: to_iso_millis(&ev.updated_at),
        }
    }
}

/// Request body for `POST /bookings`.
#[derive(Deserialize)]
struct BookingRequest {
    slug: Option<String>,
    email: Option<String>,
}

/// Response body for a created booking.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub message: String,
    pub booking_id: String,
}

/// Start the HTTP server exposing the event and booking endpoints.
pub async fn serve_http(
    addr: SocketAddr,
    db: Database,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    let app = router(Arc::new(HttpState { db }));
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/healthz", get(healthz))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:slug", get(get_event).delete(delete_event))
        .route("/bookings", axum::routing::post(create_booking))
        .with_state(state)
}

/// Health check endpoint.
async fn healthz() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "billet".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// `GET /events` — all events, newest first.
async fn list_events(
    State(state): State<Arc<HttpState>>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let store = state.db.store().await?;
    let events = store.list_events()?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// `POST /events` — normalize and persist a new event.
async fn create_event(
    State(state): State<Arc<HttpState>>,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let store = state.db.store().await?;
    let record = EventRecord::create(input, store)?;
    store.save_event(&record)?;
    info!(slug = %record.slug, "event created");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// `GET /events/:slug` — event details by slug.
async fn get_event(
    State(state): State<Arc<HttpState>>,
    Path(slug): Path<String>,
) -> Result<Json<EventResponse>, AppError> {
    if !SLUG_RE.is_match(&slug) {
        return Err(AppError::InvalidSlug);
    }
    let store = state.db.store().await?;
    let event = store
        .find_event_by_slug(&slug)?
        .ok_or(AppError::EventNotFound)?;
    Ok(Json(event.into()))
}

/// `DELETE /events/:slug` — remove an event, leaving its bookings in place.
async fn delete_event(
    State(state): State<Arc<HttpState>>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    if !SLUG_RE.is_match(&slug) {
        return Err(AppError::InvalidSlug);
    }
    let store = state.db.store().await?;
    if !store.delete_event_by_slug(&slug)? {
        return Err(AppError::EventNotFound);
    }
    info!(%slug, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /bookings` — book a seat on the event named by slug.
async fn create_booking(
    State(state): State<Arc<HttpState>>,
    Json(body): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingCreated>), AppError> {
    // Both fields are checked up front, before any store access.
    let slug = body
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::MissingField("slug"))?;
    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::MissingField("email"))?;

    let store = state.db.store().await?;
    let event = store
        .find_event_by_slug(slug)?
        .ok_or(AppError::EventNotFound)?;
    let booking = BookingRecord::create(&event.id, email, store)?;
    store.save_booking(&booking)?;
    info!(%slug, booking = %booking.id, "booking created");
    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            message: "Booking created".into(),
            booking_id: booking.id,
        }),
    ))
}
