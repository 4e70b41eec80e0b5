use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use core_types::{
    BackendError, ChatReply, Document, DocumentId, HealthStatus, KnowledgeBackend, Notice,
    UiLanguage, UploadCandidate, UploadReceipt, UserPrompt,
};
use i18n::I18n;
use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};

use crate::{Session, SessionEvent};

pub(crate) fn doc(id: DocumentId, filename: &str) -> Document {
    Document {
        id,
        filename: filename.to_string(),
        created_at: None,
        content_length: 1000,
    }
}

pub(crate) fn pdf(name: &str) -> UploadCandidate {
    UploadCandidate::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}

/// Holds a request in flight until the test releases it.
#[derive(Default)]
pub(crate) struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub(crate) async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// In-memory backend with scriptable failures and call counters.
#[derive(Default)]
pub(crate) struct FakeBackend {
    documents: Mutex<Vec<Document>>,
    chat_script: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    chat_messages: Mutex<Vec<String>>,
    upload_error: Mutex<Option<BackendError>>,
    list_fails: AtomicBool,
    gate: Option<Arc<Gate>>,
    pub(crate) chat_calls: AtomicUsize,
    pub(crate) upload_calls: AtomicUsize,
    pub(crate) delete_calls: AtomicUsize,
    pub(crate) list_calls: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_documents(self, documents: Vec<Document>) -> Self {
        *self.documents.lock() = documents;
        self
    }

    pub(crate) fn with_chat(self, reply: Result<ChatReply, BackendError>) -> Self {
        self.chat_script.lock().push_back(reply);
        self
    }

    pub(crate) fn with_upload_error(self, err: BackendError) -> Self {
        *self.upload_error.lock() = Some(err);
        self
    }

    pub(crate) fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn documents(&self) -> Vec<Document> {
        self.documents.lock().clone()
    }

    pub(crate) fn set_documents(&self, documents: Vec<Document>) {
        *self.documents.lock() = documents;
    }

    pub(crate) fn fail_listing(&self, fail: bool) {
        self.list_fails.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn chat_messages(&self) -> Vec<String> {
        self.chat_messages.lock().clone()
    }

    pub(crate) fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn hold(&self) {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
    }
}

#[async_trait]
impl KnowledgeBackend for FakeBackend {
    async fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("connection refused".into()));
        }
        Ok(self.documents())
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, BackendError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_messages.lock().push(message.to_string());
        self.hold().await;
        let scripted = self.chat_script.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(ChatReply {
                response: format!("echo: {message}"),
                source: None,
                source_files: Vec::new(),
            })
        })
    }

    async fn upload(&self, file: &UploadCandidate) -> Result<UploadReceipt, BackendError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.hold().await;
        if let Some(err) = self.upload_error.lock().take() {
            return Err(err);
        }
        let mut documents = self.documents.lock();
        let id = documents.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        documents.push(Document {
            id,
            filename: file.filename.clone(),
            created_at: None,
            content_length: file.bytes.len() as u64,
        });
        Ok(UploadReceipt {
            filename: file.filename.clone(),
            document_id: Some(id),
            content_length: Some(file.bytes.len() as u64),
            message: None,
        })
    }

    async fn delete_document(&self, id: DocumentId) -> Result<(), BackendError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.lock();
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(BackendError::Status {
                status: 404,
                message: Some("not found".into()),
            });
        }
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        Ok(HealthStatus {
            status: "healthy".into(),
            knowledge_base_documents: Some(self.documents.lock().len() as u64),
            embedding_available: Some(false),
            embedding_model_loaded: Some(false),
        })
    }
}

/// Answers every confirmation with a fixed choice and records the questions asked.
pub(crate) struct ScriptedPrompt {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub(crate) fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm(&self, question: &str) -> bool {
        self.asked.lock().push(question.to_string());
        self.answer
    }
}

pub(crate) fn session_with(backend: Arc<FakeBackend>, prompt: Arc<ScriptedPrompt>) -> Arc<Session> {
    Arc::new(Session::new(backend, prompt, I18n::new(UiLanguage::EnUs)))
}

pub(crate) fn session_for(backend: Arc<FakeBackend>) -> Arc<Session> {
    session_with(backend, Arc::new(ScriptedPrompt::answering(true)))
}

pub(crate) fn drain_notices(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }
    notices
}
