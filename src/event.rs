//! Event record and its normalization lifecycle.
//!
//! Normalization is an explicit phase: [`EventRecord::create`] and
//! [`EventRecord::update`] turn raw input into a canonical record or fail
//! with a typed error, and the caller then hands the record to the store.
//! Nothing is persisted until both phases succeed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::normalize::{normalize_date, normalize_time, required};
use crate::slug::{slugify, unique_slug};
use crate::store::{new_id, Store};

/// Raw attributes accepted for creating or replacing an event.
///
/// The slug is never taken from input: it is derived from the title on
/// create and re-derived on update only when the title changed.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    #[serde(default)]
    pub agenda: Vec<String>,
    pub organizer: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Canonical stored event.
///
/// `date` is an ISO-8601 instant string and `time` a 24-hour `HH:MM`
/// string; both invariants are established by the lifecycle before any
/// record reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    /// Normalize raw input into a new record.
    ///
    /// Trims every required string field, derives a unique slug from the
    /// title (creation always counts as a title change), and canonicalizes
    /// date and time. Any failure aborts the whole save.
    pub fn create(input: EventInput, store: &Store) -> Result<Self, AppError> {
        let id = new_id();
        let fields = TrimmedFields::from_input(&input)?;
        let slug = unique_slug(store, &slugify(&fields.title), &id)?;
        let date = normalize_date(&fields.date)?;
        let time = normalize_time(&fields.time)?;
        let now = Utc::now();
        Ok(Self {
            id,
            title: fields.title,
            slug,
            description: fields.description,
            overview: fields.overview,
            image: fields.image,
            venue: fields.venue,
            location: fields.location,
            date,
            time,
            mode: fields.mode,
            audience: fields.audience,
            agenda: input.agenda,
            organizer: fields.organizer,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Normalize a full replacement of this record.
    ///
    /// The slug is recomputed only when the trimmed title differs from the
    /// stored one; date and time are re-normalized only when their raw
    /// values differ from the stored canonical forms.
    pub fn update(&self, input: EventInput, store: &Store) -> Result<Self, AppError> {
        let fields = TrimmedFields::from_input(&input)?;
        let slug = if fields.title != self.title {
            unique_slug(store, &slugify(&fields.title), &self.id)?
        } else {
            self.slug.clone()
        };
        let date = if fields.date != self.date {
            normalize_date(&fields.date)?
        } else {
            self.date.clone()
        };
        let time = if fields.time != self.time {
            normalize_time(&fields.time)?
        } else {
            self.time.clone()
        };
        Ok(Self {
            id: self.id.clone(),
            title: fields.title,
            slug,
            description: fields.description,
            overview: fields.overview,
            image: fields.image,
            venue: fields.venue,
            location: fields.location,
            date,
            time,
            mode: fields.mode,
            audience: fields.audience,
            agenda: input.agenda,
            organizer: fields.organizer,
            tags: input.tags,
            created_at: self.created_at,
            updated_at: Utc::now(),
        })
    }
}

/// Required string fields after boundary trimming.
struct TrimmedFields {
    title: String,
    description: String,
    overview: String,
    image: String,
    venue: String,
    location: String,
    date: String,
    time: String,
    mode: String,
    audience: String,
    organizer: String,
}

impl TrimmedFields {
    fn from_input(input: &EventInput) -> Result<Self, AppError> {
        Ok(Self {
            title: required("title", &input.title)?,
            description: required("description", &input.description)?,
            overview: required("overview", &input.overview)?,
            image: required("image", &input.image)?,
            venue: required("venue", &input.venue)?,
            location: required("location", &input.location)?,
            date: required("date", &input.date)?,
            time: required("time", &input.time)?,
            mode: required("mode", &input.mode)?,
            audience: required("audience", &input.audience)?,
            organizer: required("organizer", &input.organizer)?,
        })
    }
}
