//! Race document persistence
//!
//! Keyed document store for scraped races, with an Elasticsearch-compatible
//! HTTP backend and a local JSON-file backend

mod elastic;
mod fs;

pub use elastic::{ElasticStore, DEFAULT_STORE_URL};
pub use fs::FileStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::race::RaceRecord;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistError {
    /// The store could not be reached
    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The store rejected the request
    #[error("Store returned HTTP {status_code}: {message}")]
    Status { status_code: u16, message: String },
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Document id or collection name unusable as a key
    #[error("Invalid document key: {0}")]
    InvalidKey(String),
}

/// Trait for document store implementations.
///
/// A store is opened once, shared by every persist task of a run and closed
/// once after all of them settle.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace the document stored under `id`
    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), PersistError>;
    /// Read every document in `collection`, up to `max_results`
    async fn bulk_get(&self, collection: &str, max_results: usize)
        -> Result<Vec<Value>, PersistError>;
    /// Flush pending writes and release the store
    async fn close(&self) -> Result<(), PersistError>;
}

/// Open the store described by the configuration
pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = match config.backend {
        StoreBackend::Elasticsearch => Box::new(ElasticStore::new(&config.url, &config.doc_type)?),
        StoreBackend::Filesystem => Box::new(FileStore::new(config.path.clone()).await?),
    };
    tracing::info!(backend = ?config.backend, collection = %config.index, "Opened document store");
    Ok(store)
}

/// Store one race under its race ID
pub async fn put_race(
    store: &dyn DocumentStore,
    collection: &str,
    race: &RaceRecord,
) -> Result<(), PersistError> {
    let document = serde_json::to_value(race)?;
    store.put(collection, &race.race_id, &document).await
}

/// Bulk-read races, skipping documents that do not decode as a race
pub async fn load_races(
    store: &dyn DocumentStore,
    collection: &str,
    max_results: usize,
) -> Result<Vec<RaceRecord>, PersistError> {
    let documents = store.bulk_get(collection, max_results).await?;
    let total = documents.len();

    let races: Vec<RaceRecord> = documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<RaceRecord>(doc) {
            Ok(race) => Some(race),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable race document");
                None
            }
        })
        .collect();

    tracing::info!(retrieved = total, decoded = races.len(), "Loaded race documents");
    Ok(races)
}

/// Reject keys that would escape a collection directory or URL path segment
pub(crate) fn validate_key(key: &str) -> Result<(), PersistError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(&['/', '\\', '?', '#'][..]);
    if valid {
        Ok(())
    } else {
        Err(PersistError::InvalidKey(key.to_string()))
    }
}
