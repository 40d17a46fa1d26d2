//! JSON-file document store

use super::{validate_key, DocumentStore, PersistError};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::{create_dir_all, read, read_dir, write};

/// Stores each document as `{root}/{collection}/{id}.json`
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub async fn new(root: PathBuf) -> Result<Self, PersistError> {
        create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), PersistError> {
        validate_key(collection)?;
        validate_key(id)?;

        let dir = self.collection_dir(collection);
        create_dir_all(&dir).await?;

        let bytes = serde_json::to_vec_pretty(document)?;
        write(dir.join(format!("{}.json", id)), bytes).await?;
        Ok(())
    }

    async fn bulk_get(
        &self,
        collection: &str,
        max_results: usize,
    ) -> Result<Vec<Value>, PersistError> {
        validate_key(collection)?;

        let mut entries = match read_dir(self.collection_dir(collection)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len().min(max_results));
        for path in paths.into_iter().take(max_results) {
            let bytes = read(&path).await?;
            documents.push(serde_json::from_slice(&bytes)?);
        }

        Ok(documents)
    }

    async fn close(&self) -> Result<(), PersistError> {
        Ok(())
    }
}
