//! Program catalog loading and snapshot management.
//!
//! The catalog is read from a JSON array of program objects. A missing or malformed file
//! never stops the server: the catalog becomes empty, the failure is logged, and requests
//! fall back to answering without program context. Readers take an `Arc` snapshot; a
//! reload builds a complete new sequence and swaps the pointer, so a snapshot is never
//! observed half-populated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::AppError;
use crate::model::Record;

pub struct CatalogStore {
    path: PathBuf,
    current: RwLock<Arc<[Record]>>,
}

impl CatalogStore {
    /// Load the catalog at `path`, degrading to an empty catalog on failure.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = load_or_empty(&path);
        Self {
            path,
            current: RwLock::new(records),
        }
    }

    /// Build a store around records that are already in memory.
    #[cfg(test)]
    pub fn from_records(path: impl Into<PathBuf>, records: Vec<Record>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(records.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> Arc<[Record]> {
        Arc::clone(&*self.current.read().await)
    }

    pub async fn is_loaded(&self) -> bool {
        !self.current.read().await.is_empty()
    }

    /// Re-read the source and swap in the result. Returns the new record count.
    ///
    /// A failed read replaces the catalog with an empty one, the same as at startup.
    pub async fn reload(&self) -> usize {
        let path = self.path.clone();
        let records = match tokio::task::spawn_blocking(move || load_or_empty(&path)).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "catalog reload task failed, serving with an empty catalog");
                Arc::from(Vec::new())
            }
        };
        let count = records.len();
        *self.current.write().await = records;
        info!(path = %self.path.display(), programs = count, "catalog reloaded");
        count
    }
}

/// Read and parse a catalog file. All-or-nothing: any malformed entry fails the whole file.
pub fn read_catalog(path: &Path) -> Result<Vec<Record>, AppError> {
    let content = std::fs::read(path).map_err(|source| AppError::CatalogRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&content).map_err(|source| AppError::CatalogParse {
        path: path.display().to_string(),
        source,
    })
}

pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<Record>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

fn load_or_empty(path: &Path) -> Arc<[Record]> {
    match read_catalog(path) {
        Ok(records) => {
            info!(path = %path.display(), programs = records.len(), "loaded program catalog");
            records.into()
        }
        Err(e) => {
            error!(error = %e, "catalog unavailable, serving with an empty catalog");
            Arc::from(Vec::new())
        }
    }
}
