use std::sync::Arc;

use core_types::{
    BackendError, HealthStatus, KnowledgeBackend, Message, NewMessage, Notice, UserPrompt,
};
use i18n::I18n;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::busy::{BusyFlags, BusySnapshot};
use crate::conversation::{ConversationStore, Transcript};
use crate::registry::{DocumentRegistry, DocumentSnapshot, RefreshOutcome};

const EVENT_CAPACITY: usize = 64;

/// State changes a view re-renders on.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    MessageAppended(Message),
    DocumentsRefreshed(DocumentSnapshot),
    Notice(Notice),
}

/// One user's conversation and document inventory, plus the controllers that mutate them.
///
/// All operations take `&self`; share the session behind an `Arc` to run several at once.
/// Busy flags make concurrent sends (or concurrent uploads) resolve to a rejection instead
/// of a second request.
pub struct Session {
    pub(crate) backend: Arc<dyn KnowledgeBackend>,
    pub(crate) prompt: Arc<dyn UserPrompt>,
    pub(crate) i18n: I18n,
    pub(crate) busy: BusyFlags,
    pub(crate) input: Mutex<String>,
    conversation: ConversationStore,
    registry: DocumentRegistry,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(
        backend: Arc<dyn KnowledgeBackend>,
        prompt: Arc<dyn UserPrompt>,
        i18n: I18n,
    ) -> Self {
        let conversation = ConversationStore::seeded(NewMessage::assistant(i18n.t("chat.greeting")));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            prompt,
            i18n,
            busy: BusyFlags::new(),
            input: Mutex::new(String::new()),
            conversation,
            registry: DocumentRegistry::new(),
            events,
        }
    }

    /// Loads the initial document list.
    pub async fn start(&self) -> RefreshOutcome {
        info!("session starting");
        self.refresh_documents().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn messages(&self) -> Transcript {
        self.conversation.snapshot()
    }

    pub fn documents(&self) -> DocumentSnapshot {
        self.registry.snapshot()
    }

    pub fn busy(&self) -> BusySnapshot {
        self.busy.snapshot()
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *self.input.lock() = text.into();
    }

    pub fn input(&self) -> String {
        self.input.lock().clone()
    }

    pub async fn refresh_documents(&self) -> RefreshOutcome {
        let outcome = self.registry.refresh(self.backend.as_ref()).await;
        if let RefreshOutcome::Replaced(count) = &outcome {
            debug!(count, "document registry replaced");
            self.emit(SessionEvent::DocumentsRefreshed(self.registry.snapshot()));
        }
        outcome
    }

    /// Reads backend health. Touches no session state.
    pub async fn check_backend(&self) -> Result<HealthStatus, BackendError> {
        self.backend.health().await
    }

    pub(crate) fn append(&self, draft: NewMessage) -> Message {
        let message = self.conversation.append(draft);
        self.emit(SessionEvent::MessageAppended(message.clone()));
        message
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.emit(SessionEvent::Notice(notice));
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine: nothing is rendering.
        let _ = self.events.send(event);
    }
}
