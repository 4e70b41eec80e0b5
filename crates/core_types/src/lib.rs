use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub type MessageId = u64;
pub type DocumentId = i64;

/// MIME fragment a candidate's declared type must contain to be accepted for upload.
pub const ACCEPTED_UPLOAD_TYPE: &str = "pdf";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UiLanguage {
    ZhCn,
    EnUs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    Assistant,
}

/// Where the backend says an assistant reply came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Provenance {
    #[serde(rename = "knowledge_base")]
    KnowledgeBase,
    #[serde(rename = "qianwen_api", alias = "external_api")]
    ExternalApi,
}

impl Provenance {
    /// Maps a wire `source` value. Values outside the known set carry no provenance.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "knowledge_base" => Some(Self::KnowledgeBase),
            "qianwen_api" | "external_api" => Some(Self::ExternalApi),
            _ => None,
        }
    }
}

/// An entry of the conversation log. Ids are assigned by the store that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub origin: Origin,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A message that has not been appended yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub origin: Origin,
    pub text: String,
    pub provenance: Option<Provenance>,
    pub source_files: Vec<String>,
}

impl NewMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
            provenance: None,
            source_files: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Assistant,
            text: text.into(),
            provenance: None,
            source_files: Vec::new(),
        }
    }

    pub fn from_reply(reply: ChatReply) -> Self {
        Self {
            origin: Origin::Assistant,
            text: reply.response,
            provenance: reply.source,
            source_files: reply.source_files,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    #[serde(
        default,
        alias = "upload_time",
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub content_length: u64,
}

impl Document {
    /// Size as shown in the document list, in (decimal) kilobytes.
    pub fn size_kb(&self) -> u64 {
        (self.content_length + 500) / 1000
    }
}

/// Accepts RFC 3339, naive ISO-8601 (with `T` or a space) and empty strings.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn deserialize_source<'de, D>(deserializer: D) -> Result<Option<Provenance>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Provenance::from_wire))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, deserialize_with = "deserialize_source")]
    pub source: Option<Provenance>,
    #[serde(default)]
    pub source_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub knowledge_base_documents: Option<u64>,
    #[serde(default)]
    pub embedding_available: Option<bool>,
    #[serde(default)]
    pub embedding_model_loaded: Option<bool>,
}

/// A file offered for upload, as picked or dropped by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub filename: String,
    pub declared_type: String,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(
        filename: impl Into<String>,
        declared_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            declared_type: declared_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn declares_accepted_type(&self) -> bool {
        self.declared_type
            .to_ascii_lowercase()
            .contains(ACCEPTED_UPLOAD_TYPE)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient user-facing message, the client's equivalent of an alert box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("backend request timed out")]
    Timeout,
    #[error("backend returned status {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("could not build backend request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// The `error` text the server put in its response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}

/// The knowledge-base backend, as seen through its HTTP contract.
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>, BackendError>;
    async fn chat(&self, message: &str) -> Result<ChatReply, BackendError>;
    async fn upload(&self, file: &UploadCandidate) -> Result<UploadReceipt, BackendError>;
    async fn delete_document(&self, id: DocumentId) -> Result<(), BackendError>;
    async fn health(&self) -> Result<HealthStatus, BackendError>;
}

/// Blocking questions the controller needs answered by the person at the keyboard.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Returns `true` only on an explicit yes; cancelling counts as no.
    async fn confirm(&self, question: &str) -> bool;
}
