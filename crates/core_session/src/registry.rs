use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use core_types::{BackendError, Document, KnowledgeBackend};
use parking_lot::Mutex;
use tracing::{debug, warn};

pub type DocumentSnapshot = Arc<Vec<Document>>;

#[derive(Debug)]
pub enum RefreshOutcome {
    /// The cache now holds the fetched list, of this many documents.
    Replaced(usize),
    /// A refresh issued later had already landed; this response was discarded.
    Superseded,
    /// The fetch failed and the last known list was kept.
    Failed(BackendError),
}

/// Local mirror of the backend's document list. Only ever replaced wholesale.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    state: Mutex<RegistryState>,
    issued: AtomicU64,
}

#[derive(Debug, Default)]
struct RegistryState {
    documents: DocumentSnapshot,
    applied: u64,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&self, backend: &dyn KnowledgeBackend) -> RefreshOutcome {
        let ticket = self.issue_ticket();
        match backend.list_documents().await {
            Ok(documents) => self.apply(ticket, documents),
            Err(err) => {
                warn!(error = %err, "document refresh failed, keeping last known list");
                RefreshOutcome::Failed(err)
            }
        }
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        Arc::clone(&self.state.lock().documents)
    }

    pub fn len(&self) -> usize {
        self.state.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn issue_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn apply(&self, ticket: u64, documents: Vec<Document>) -> RefreshOutcome {
        let mut state = self.state.lock();
        if ticket < state.applied {
            debug!(ticket, applied = state.applied, "dropping stale document list");
            return RefreshOutcome::Superseded;
        }
        state.applied = ticket;
        let count = documents.len();
        state.documents = Arc::new(documents);
        RefreshOutcome::Replaced(count)
    }
}
