//! Elasticsearch-compatible document store over HTTP

use super::{validate_key, DocumentStore, PersistError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Default store URL
pub const DEFAULT_STORE_URL: &str = "http://localhost:9200";

/// Document store speaking the Elasticsearch REST API
pub struct ElasticStore {
    base_url: String,
    doc_type: String,
    client: Client,
    /// Collections written since the store was opened, refreshed on close
    written: Mutex<BTreeSet<String>>,
}

impl ElasticStore {
    /// Create a store client for `base_url`, storing documents under `doc_type`
    pub fn new(base_url: &str, doc_type: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            doc_type: doc_type.to_string(),
            client,
            written: Mutex::new(BTreeSet::new()),
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, collection, self.doc_type, id)
    }

    fn search_url(&self, collection: &str) -> String {
        format!("{}/{}/_search", self.base_url, collection)
    }

    fn refresh_url(&self, collection: &str) -> String {
        format!("{}/{}/_refresh", self.base_url, collection)
    }

    /// Map a non-success response to [`PersistError::Status`]
    async fn check(response: Response) -> Result<Response, PersistError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PersistError::Status {
            status_code: status.as_u16(),
            message: body,
        })
    }

    fn written(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.written.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Written-collection set was poisoned, recovering it");
            poisoned.into_inner()
        })
    }

    /// Drain the collections awaiting a refresh
    fn take_written(&self) -> Vec<String> {
        std::mem::take(&mut *self.written()).into_iter().collect()
    }
}

#[async_trait]
impl DocumentStore for ElasticStore {
    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), PersistError> {
        validate_key(collection)?;
        validate_key(id)?;

        let url = self.document_url(collection, id);
        let response = self.client.put(&url).json(document).send().await?;
        Self::check(response).await?;

        self.written().insert(collection.to_string());

        tracing::debug!(collection, id, "Document indexed");
        Ok(())
    }

    async fn bulk_get(
        &self,
        collection: &str,
        max_results: usize,
    ) -> Result<Vec<Value>, PersistError> {
        validate_key(collection)?;

        let body = json!({
            "query": { "match_all": {} },
            "from": 0,
            "size": max_results,
        });

        let response = self
            .client
            .post(self.search_url(collection))
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let search: SearchResponse = response.json().await?;

        Ok(search.hits.hits.into_iter().map(|hit| hit.source).collect())
    }

    async fn close(&self) -> Result<(), PersistError> {
        let collections = self.take_written();

        for collection in collections {
            let response = self.client.post(self.refresh_url(&collection)).send().await?;
            Self::check(response).await?;
            tracing::debug!(collection = %collection, "Collection refreshed");
        }

        Ok(())
    }
}

/// Search response envelope
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Value,
}
