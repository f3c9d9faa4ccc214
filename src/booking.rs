//! Booking record and its validation lifecycle.
//!
//! Both [`BookingRecord::create`] and [`BookingRecord::update`] re-check the
//! referenced event's existence, so a booking can never be saved pointing at
//! an event that was missing at save time. Deleting an event later does not
//! touch its bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::normalize::{is_valid_email, required};
use crate::store::{new_id, Store};

/// Canonical stored booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: String,
    /// Id of the referenced event. Checked for existence on every save.
    pub event_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    /// Validate raw attributes into a new booking.
    pub fn create(event_id: &str, email: &str, store: &Store) -> Result<Self, AppError> {
        let (event_id, email) = validate(event_id, email, store)?;
        let now = Utc::now();
        Ok(Self {
            id: new_id(),
            event_id,
            email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate a replacement of this booking's attributes. The event
    /// existence check runs again even when `event_id` is unchanged.
    pub fn update(&self, event_id: &str, email: &str, store: &Store) -> Result<Self, AppError> {
        let (event_id, email) = validate(event_id, email, store)?;
        Ok(Self {
            id: self.id.clone(),
            event_id,
            email,
            created_at: self.created_at,
            updated_at: Utc::now(),
        })
    }
}

fn validate(event_id: &str, email: &str, store: &Store) -> Result<(String, String), AppError> {
    let event_id = required("eventId", event_id)?;
    let email = required("email", email)?;
    if !is_valid_email(&email) {
        return Err(AppError::InvalidEmailFormat);
    }
    if !store.event_exists(&event_id)? {
        return Err(AppError::ReferencedEventNotFound);
    }
    Ok((event_id, email))
}
