use async_trait::async_trait;
use config::BackendConfig;
use core_types::{
    BackendError, ChatReply, ChatRequest, Document, DocumentId, DocumentList, HealthStatus,
    KnowledgeBackend, UploadCandidate, UploadReceipt,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// `KnowledgeBackend` over the backend's JSON/multipart HTTP API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| BackendError::InvalidRequest(err.to_string()))?;
        Ok(Self::from_parts(config.base_url.clone(), client))
    }

    pub fn from_parts(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl KnowledgeBackend for HttpBackend {
    async fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        let response = self
            .client
            .get(self.url("/api/documents"))
            .send()
            .await
            .map_err(transport_error)?;
        let list: DocumentList = read_json(response).await?;
        debug!(count = list.documents.len(), "fetched document list");
        Ok(list.documents)
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, BackendError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn upload(&self, file: &UploadCandidate) -> Result<UploadReceipt, BackendError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.declared_type)
            .map_err(|err| BackendError::InvalidRequest(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn delete_document(&self, id: DocumentId) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/documents/{id}")))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, &text))
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(status_error(status, &text));
    }
    serde_json::from_str(&text).map_err(|err| BackendError::Decode(err.to_string()))
}

fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error);
    warn!(status = status.as_u16(), error = ?message, "backend request failed");
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        warn!("backend request timed out");
        BackendError::Timeout
    } else if err.is_builder() {
        BackendError::InvalidRequest(err.to_string())
    } else {
        warn!(error = %err, "backend transport failure");
        BackendError::Transport(err.to_string())
    }
}
