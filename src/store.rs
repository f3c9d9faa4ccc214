//! File-backed document store for events and bookings.
//!
//! Documents live as one JSON file per record under `events/` and
//! `bookings/`. Two indexes are maintained: a unique index on the event slug
//! (one file per slug holding the owning record id) and a secondary index
//! from event id to booking ids. The slug index is the last line of defense
//! for the uniqueness invariant: a save whose slug file is owned by another
//! record fails with [`AppError::UniqueConstraintViolation`].

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use rand::RngCore;
use serde_json::to_writer;

use crate::booking::BookingRecord;
use crate::error::AppError;
use crate::event::EventRecord;

/// Generate a 24-character hex record id from 12 random bytes.
pub fn new_id() -> String {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Persistent store rooted at `root`. Cheap to clone; all state is on disk.
#[derive(Clone, Debug)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store rooted at `root`, creating the directory tree if needed.
    pub fn open(root: PathBuf) -> Result<Self, AppError> {
        let store = Self { root };
        store.init()?;
        Ok(store)
    }

    /// Ensure the on-disk directory structure exists.
    pub fn init(&self) -> Result<(), AppError> {
        let dirs = [
            "events",
            "bookings",
            "log",
            "index/events/by-slug",
            "index/bookings/by-event",
        ];
        for d in dirs {
            fs::create_dir_all(self.root.join(d))?;
        }
        Ok(())
    }

    fn event_path(&self, id: &str) -> PathBuf {
        self.root.join("events").join(format!("{id}.json"))
    }

    fn booking_path(&self, id: &str) -> PathBuf {
        self.root.join("bookings").join(format!("{id}.json"))
    }

    fn slug_index_path(&self, slug: &str) -> PathBuf {
        self.root
            .join("index/events/by-slug")
            .join(format!("{slug}.txt"))
    }

    fn booking_index_path(&self, event_id: &str) -> PathBuf {
        self.root
            .join("index/bookings/by-event")
            .join(format!("{event_id}.txt"))
    }

    /// Is `slug` claimed by any record other than `own_id`?
    pub fn slug_in_use(&self, slug: &str, own_id: &str) -> Result<bool, AppError> {
        match read_owner(&self.slug_index_path(slug))? {
            Some(owner) => Ok(owner != own_id),
            None => Ok(false),
        }
    }

    /// Persist an already-normalized event.
    ///
    /// Enforces the unique slug index, moves the index entry when the slug
    /// changed, and appends the document to `log/events.ndjson`. The
    /// document write itself is atomic (write-then-rename).
    pub fn save_event(&self, record: &EventRecord) -> Result<(), AppError> {
        // Claim the slug before writing the document, so a failed claim
        // leaves no orphan document. `create_new` makes the claim atomic:
        // when two writers race past the probe, exactly one creates the
        // index file and the other surfaces the violation instead of
        // silently overwriting.
        let index = self.slug_index_path(&record.slug);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&index)
        {
            Ok(mut f) => f.write_all(record.id.as_bytes())?,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Re-saves by the owning record keep their claim.
                match read_owner(&index)? {
                    Some(owner) if owner == record.id => {}
                    _ => return Err(AppError::UniqueConstraintViolation(record.slug.clone())),
                }
            }
            Err(e) => return Err(e.into()),
        }

        // Drop the old slug's index entry when an update re-slugged the record.
        if let Some(previous) = self.get_event(&record.id)? {
            if previous.slug != record.slug {
                let old_index = self.slug_index_path(&previous.slug);
                if read_owner(&old_index)?.as_deref() == Some(record.id.as_str()) {
                    fs::remove_file(&old_index)?;
                }
            }
        }

        write_doc_atomic(&self.event_path(&record.id), record)?;

        // Append to a newline-delimited log for easy tailing.
        let log_path = self.root.join("log/events.ndjson");
        let mut log_file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        serde_json::to_writer(&mut log_file, record)?;
        log_file.write_all(b"\n")?;
        Ok(())
    }

    /// Load an event by id.
    pub fn get_event(&self, id: &str) -> Result<Option<EventRecord>, AppError> {
        read_doc(&self.event_path(id))
    }

    /// Does an event with this id exist?
    pub fn event_exists(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.event_path(id).exists())
    }

    /// Look an event up through the slug index.
    pub fn find_event_by_slug(&self, slug: &str) -> Result<Option<EventRecord>, AppError> {
        match read_owner(&self.slug_index_path(slug))? {
            Some(id) => self.get_event(&id),
            None => Ok(None),
        }
    }

    /// All events, newest first by creation time.
    pub fn list_events(&self) -> Result<Vec<EventRecord>, AppError> {
        let mut events = Vec::new();
        for entry in fs::read_dir(self.root.join("events"))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(ev) = read_doc::<EventRecord>(&entry.path())? {
                    events.push(ev);
                }
            }
        }
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    /// Delete an event by slug. Dependent bookings are deliberately left in
    /// place; returns whether a record was removed.
    pub fn delete_event_by_slug(&self, slug: &str) -> Result<bool, AppError> {
        let index = self.slug_index_path(slug);
        let Some(id) = read_owner(&index)? else {
            return Ok(false);
        };
        let path = self.event_path(&id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        fs::remove_file(index)?;
        Ok(true)
    }

    /// Persist an already-validated booking and index it by event id.
    pub fn save_booking(&self, record: &BookingRecord) -> Result<(), AppError> {
        let previous = self.get_booking(&record.id)?;
        write_doc_atomic(&self.booking_path(&record.id), record)?;
        // Index on create and whenever the booking points at a new event;
        // stale lines under the old event are filtered on read.
        let needs_index = match &previous {
            Some(p) => p.event_id != record.event_id,
            None => true,
        };
        if needs_index {
            let mut f = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.booking_index_path(&record.event_id))?;
            writeln!(f, "{}", record.id)?;
        }
        Ok(())
    }

    /// Load a booking by id.
    pub fn get_booking(&self, id: &str) -> Result<Option<BookingRecord>, AppError> {
        read_doc(&self.booking_path(id))
    }

    /// Bookings whose current `eventId` is `event_id`.
    ///
    /// The index file may hold stale ids for bookings that were re-pointed,
    /// so each document is re-checked after loading.
    pub fn bookings_for_event(&self, event_id: &str) -> Result<Vec<BookingRecord>, AppError> {
        let path = self.booking_index_path(event_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(path)?;
        let mut bookings = Vec::new();
        for id in data.lines() {
            if let Some(b) = self.get_booking(id)? {
                if b.event_id == event_id {
                    bookings.push(b);
                }
            }
        }
        Ok(bookings)
    }

    /// Mark a slug as taken without writing a document, for probe tests.
    #[cfg(test)]
    pub fn claim_slug_for_test(&self, slug: &str, id: &str) {
        fs::write(self.slug_index_path(slug), id).unwrap();
    }
}

/// Read the record id owning an index file, if the file exists.
fn read_owner(path: &Path) -> Result<Option<String>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    Ok(Some(data.trim().to_string()))
}

/// Write a JSON document atomically next to its final location.
fn write_doc_atomic<T: serde::Serialize>(path: &Path, doc: &T) -> Result<(), AppError> {
    let parent = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&parent)?;
    let tmp = tempfile::NamedTempFile::new_in(&parent)?;
    to_writer(&tmp, doc)?;
    tmp.persist(path).map_err(|e| AppError::Storage(e.error))?;
    Ok(())
}

/// Read a JSON document, returning `None` when the file is absent.
fn read_doc<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&data)?))
}
