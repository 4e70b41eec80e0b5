use core_types::{DocumentId, Notice};
use tracing::{debug, info, warn};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent.
    Cancelled,
    Deleted,
    Failed,
}

impl Session {
    /// Asks for confirmation, deletes remotely, then reloads the list.
    ///
    /// The cached list is never edited locally, so a delete that fails leaves it untouched.
    pub async fn delete_document(&self, id: DocumentId) -> DeleteOutcome {
        if !self.prompt.confirm(self.i18n.t("documents.delete_confirm")).await {
            debug!(id, "delete cancelled");
            return DeleteOutcome::Cancelled;
        }

        match self.backend.delete_document(id).await {
            Ok(()) => {
                info!(id, "document deleted");
                self.refresh_documents().await;
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!(id, error = %err, "document delete failed");
                self.notify(Notice::error(self.i18n.t("documents.delete_failed")));
                DeleteOutcome::Failed
            }
        }
    }
}
