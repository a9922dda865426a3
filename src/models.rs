//! Wire types for the remote knowledge-base API.
//!
//! These mirror the JSON bodies exchanged with the server. Timestamps are
//! accepted with or without a UTC offset since the server emits naive
//! datetimes.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// A named, isolated collection of ingested documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// A document ingested into one knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub file_type: String,
    /// Size in bytes.
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// One ranked chunk returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub chunk_text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub file_type: String,
    /// Server-computed relevance in `0.0..=1.0`.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub vectorstore: VectorstoreStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorstoreStats {
    /// Collection name. The server sends either a bare string or an
    /// object with a `name` field.
    #[serde(deserialize_with = "collection_name")]
    pub collection: String,
    #[serde(default)]
    pub total_vectors: u64,
}

/// Body of `POST /knowledge-bases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewKnowledgeBase {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewKnowledgeBase {
    /// Blank descriptions are sent as absent.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description: description.filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Body of `POST /search`. `knowledge_base: null` searches the default scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub knowledge_base: Option<String>,
    pub limit: u32,
}

/// Response of a single successful `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadReceipt {
    pub document_id: Option<String>,
    pub filename: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// A file picked for upload. Contents are read when the upload is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            name: file_name(path),
            size: meta.len(),
        })
    }
}

/// File payload for one upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn read(file: &SelectedFile) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(&file.path).await?;
        Ok(Self {
            filename: file.name.clone(),
            bytes,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn default_true() -> bool {
    true
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parse an RFC 3339 timestamp, treating offset-less values as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

fn collection_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Name(String),
        Detail { name: String },
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Name(name) | Repr::Detail { name } => name,
    })
}
