//! Persistência dos mapas mentais gerados.
//!
//! [`MindMapStore`] é a costura usada pelo gerador; [`FileStore`] grava um
//! documento JSON por item em um diretório local.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::mindmap::MindMap;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed document {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A persisted mind map together with the item it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMindMap {
    pub id: String,
    pub subject: String,
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub mind_map: MindMap,
}

/// Exact-match filter for [`MindMapStore::list`]. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MindMapFilter {
    pub subject: Option<String>,
    pub topic: Option<String>,
}

impl MindMapFilter {
    fn matches(&self, doc: &StoredMindMap) -> bool {
        let subject_ok = self
            .subject
            .as_deref()
            .filter(|s| !s.is_empty())
            .is_none_or(|s| s == doc.subject);
        let topic_ok = self
            .topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .is_none_or(|t| t == doc.topic);
        subject_ok && topic_ok
    }
}

/// Storage backend for generated mind maps.
pub trait MindMapStore: Send + Sync {
    /// Saves (or overwrites) the document for `subject`/`topic`.
    fn save(
        &self,
        subject: &str,
        topic: &str,
        mind_map: &MindMap,
    ) -> impl Future<Output = Result<StoredMindMap, StoreError>> + Send;

    fn list(
        &self,
        filter: &MindMapFilter,
    ) -> impl Future<Output = Result<Vec<StoredMindMap>, StoreError>> + Send;
}

/// Document id for an item: `"{subject}--{topic}"`, whitespace runs and path
/// separators turned into `-`, lowercased.
pub fn document_id(subject: &str, topic: &str) -> String {
    let raw = format!("{subject}--{topic}");
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace(['/', '\\'], "-")
        .to_lowercase()
}

/// Keeps each mind map as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn read_doc(path: &Path) -> Result<StoredMindMap, StoreError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl MindMapStore for FileStore {
    async fn save(
        &self,
        subject: &str,
        topic: &str,
        mind_map: &MindMap,
    ) -> Result<StoredMindMap, StoreError> {
        let doc = StoredMindMap {
            id: document_id(subject, topic),
            subject: subject.to_string(),
            topic: topic.to_string(),
            generated_at: Utc::now(),
            mind_map: mind_map.clone(),
        };
        let path = self.path_for(&doc.id);
        let body = serde_json::to_vec_pretty(&doc).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };
        // Readers only ever see whole documents: write a uniquely named `.tmp`
        // file, then rename it over the target. `list` skips `.tmp` files.
        let tmp = self.dir.join(format!("{}.{}.tmp", doc.id, Uuid::new_v4()));
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(source));
        }

        tracing::debug!(id = %doc.id, path = %path.display(), "saved mind map");
        Ok(doc)
    }

    async fn list(&self, filter: &MindMapFilter) -> Result<Vec<StoredMindMap>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut docs = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let doc = Self::read_doc(&path).await?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }

        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }
}
