//! Lazily-initialized shared store handle.

use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::error::AppError;
use crate::store::Store;

/// Process-wide store handle, passed to request handlers explicitly.
///
/// The store is opened on first use. Concurrent callers of [`Database::store`]
/// await the same in-flight attempt rather than opening redundantly, and a
/// failed attempt is not cached, so a later call retries.
#[derive(Debug)]
pub struct Database {
    root: PathBuf,
    cell: OnceCell<Store>,
}

impl Database {
    /// Create a handle for a store rooted at `root`; nothing is opened yet.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            cell: OnceCell::new(),
        }
    }

    /// Get the shared store, opening it on first call.
    pub async fn store(&self) -> Result<&Store, AppError> {
        self.cell
            .get_or_try_init(|| async {
                Store::open(self.root.clone())
                    .map_err(|e| AppError::ConnectionUnavailable(e.to_string()))
            })
            .await
    }
}
