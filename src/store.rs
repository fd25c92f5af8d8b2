//! JSON document store on local disk.
//!
//! The whole document is read once at the start of a run and written once at
//! the end. Writes are pretty-printed with two-space indentation and replace
//! the previous file.

use crate::models::{AnimeRecord, Document};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No anime list found in {path}: expected an array or an object with an `items` array")]
    Shape { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document in whichever shape it was written.
    pub async fn load(&self) -> Result<Document, StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        let document = parse_document(&content).map_err(|err| match err {
            ParseFailure::Json(source) => StoreError::Json {
                path: self.path.clone(),
                source,
            },
            ParseFailure::Shape => StoreError::Shape {
                path: self.path.clone(),
            },
        })?;

        debug!(
            path = %self.path.display(),
            items = document.items().len(),
            wrapped = document.last_updated().is_some(),
            "Loaded document"
        );

        Ok(document)
    }

    pub async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!(
            path = %self.path.display(),
            items = document.items().len(),
            "Document written"
        );

        Ok(())
    }
}

enum ParseFailure {
    Json(serde_json::Error),
    Shape,
}

/// Normalizes either on-disk shape into a [`Document`].
fn parse_document(content: &str) -> Result<Document, ParseFailure> {
    let root: Value = serde_json::from_str(content).map_err(ParseFailure::Json)?;

    match root {
        Value::Array(_) => {
            let items: Vec<AnimeRecord> = serde_json::from_value(root).map_err(ParseFailure::Json)?;
            Ok(Document::Bare(items))
        }
        Value::Object(mut map) => {
            let items = match map.remove("items") {
                Some(items @ Value::Array(_)) => items,
                _ => return Err(ParseFailure::Shape),
            };
            let items: Vec<AnimeRecord> =
                serde_json::from_value(items).map_err(ParseFailure::Json)?;
            let last_updated = map
                .get("lastUpdated")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(Document::Wrapped {
                last_updated,
                items,
            })
        }
        _ => Err(ParseFailure::Shape),
    }
}
