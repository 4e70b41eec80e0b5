use core_types::{Notice, UploadCandidate, UploadReceipt};
use tracing::{debug, info, warn};

use crate::busy::Operation;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The pick or drop carried no file.
    NoFile,
    /// The declared type is not a PDF; nothing was sent.
    UnsupportedType,
    /// Another upload is in flight; nothing was sent.
    Busy,
    Uploaded(UploadReceipt),
    /// The backend refused or could not be reached; holds the notice shown.
    Failed(String),
}

impl Session {
    /// Validates and uploads one file, then reloads the document list on success.
    pub async fn upload(&self, file: UploadCandidate) -> UploadOutcome {
        if !file.declares_accepted_type() {
            debug!(filename = %file.filename, declared = %file.declared_type, "upload rejected: not a pdf");
            self.notify(Notice::error(self.i18n.t("upload.only_pdf")));
            return UploadOutcome::UnsupportedType;
        }

        let Some(guard) = self.busy.try_begin(Operation::Upload) else {
            debug!(filename = %file.filename, "upload ignored: another upload in flight");
            return UploadOutcome::Busy;
        };
        let result = self.backend.upload(&file).await;
        drop(guard);

        match result {
            Ok(receipt) => {
                info!(filename = %receipt.filename, document_id = ?receipt.document_id, "upload accepted");
                self.notify(Notice::info(
                    self.i18n
                        .format("upload.success", &[("filename", receipt.filename.as_str())]),
                ));
                self.refresh_documents().await;
                UploadOutcome::Uploaded(receipt)
            }
            Err(err) => {
                warn!(filename = %file.filename, error = %err, "upload failed");
                let reason = err
                    .server_message()
                    .unwrap_or_else(|| self.i18n.t("upload.unknown_error"));
                let text = self.i18n.format("upload.failed", &[("error", reason)]);
                self.notify(Notice::error(text.clone()));
                UploadOutcome::Failed(text)
            }
        }
    }

    /// File-picker entry point: only the first selected file is uploaded.
    pub async fn upload_selected(&self, files: Vec<UploadCandidate>) -> UploadOutcome {
        match files.into_iter().next() {
            Some(file) => self.upload(file).await,
            None => UploadOutcome::NoFile,
        }
    }

    /// Drag-and-drop entry point. The drop is always consumed here, so nothing else
    /// (such as opening the file) happens with it; only the first dropped file is uploaded.
    pub async fn upload_dropped(&self, files: Vec<UploadCandidate>) -> UploadOutcome {
        if files.len() > 1 {
            debug!(dropped = files.len(), "multiple files dropped, keeping the first");
        }
        self.upload_selected(files).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use core_types::{BackendError, NoticeLevel, UploadCandidate};
    use futures::FutureExt;

    use super::*;
    use crate::test_support::{FakeBackend, Gate, doc, drain_notices, pdf, session_for};

    #[tokio::test]
    async fn non_pdf_never_reaches_the_backend() {
        let backend = Arc::new(FakeBackend::new());
        let session = session_for(backend.clone());
        let mut rx = session.subscribe();

        let outcome = session
            .upload(UploadCandidate::new("notes.txt", "text/plain", b"hi".to_vec()))
            .await;

        assert_eq!(outcome, UploadOutcome::UnsupportedType);
        assert_eq!(FakeBackend::calls(&backend.upload_calls), 0);
        assert!(!session.busy().uploading);
        let notices = drain_notices(&mut rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].text, "Only PDF files can be uploaded");
    }

    #[tokio::test]
    async fn success_confirms_and_mirrors_server_list() {
        let backend = Arc::new(FakeBackend::new().with_documents(vec![doc(1, "old.pdf")]));
        let session = session_for(backend.clone());
        session.start().await;
        let mut rx = session.subscribe();

        let outcome = session.upload(pdf("manual.pdf")).await;

        let UploadOutcome::Uploaded(receipt) = outcome else {
            panic!("expected upload to succeed");
        };
        assert_eq!(receipt.filename, "manual.pdf");
        assert_eq!(*session.documents(), backend.documents());
        assert_eq!(session.documents().len(), 2);
        assert!(!session.busy().uploading);

        let notices = drain_notices(&mut rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert_eq!(notices[0].text, "Uploaded: manual.pdf");
    }

    #[tokio::test]
    async fn failure_shows_server_error_when_present() {
        let backend = Arc::new(FakeBackend::new().with_upload_error(BackendError::Status {
            status: 400,
            message: Some("PDF has no readable text".into()),
        }));
        let session = session_for(backend.clone());

        let outcome = session.upload(pdf("scan.pdf")).await;

        assert_eq!(
            outcome,
            UploadOutcome::Failed("Upload failed: PDF has no readable text".into())
        );
        assert!(!session.busy().uploading);
        assert_eq!(FakeBackend::calls(&backend.list_calls), 0);
    }

    #[tokio::test]
    async fn failure_without_server_error_is_generic() {
        let backend = Arc::new(FakeBackend::new().with_upload_error(BackendError::Timeout));
        let session = session_for(backend);

        let outcome = session.upload(pdf("slow.pdf")).await;
        assert_eq!(
            outcome,
            UploadOutcome::Failed("Upload failed: unknown error".into())
        );
    }

    #[tokio::test]
    async fn second_upload_while_in_flight_is_rejected() {
        let gate = Arc::new(Gate::default());
        let backend = Arc::new(FakeBackend::new().gated(gate.clone()));
        let session = session_for(backend.clone());

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.upload(pdf("a.pdf")).await }
        });
        gate.wait_entered().await;
        assert!(session.busy().uploading);

        let second = session
            .upload(pdf("b.pdf"))
            .now_or_never()
            .expect("rejection does not wait");
        assert_eq!(second, UploadOutcome::Busy);

        // Sending is not blocked by an upload.
        assert!(!session.busy().sending);

        gate.release();
        assert!(matches!(
            first.await.expect("join"),
            UploadOutcome::Uploaded(_)
        ));
        assert_eq!(FakeBackend::calls(&backend.upload_calls), 1);
        assert!(!session.busy().uploading);
    }

    #[tokio::test]
    async fn drop_takes_only_the_first_file() {
        let backend = Arc::new(FakeBackend::new());
        let session = session_for(backend.clone());

        let outcome = session
            .upload_dropped(vec![pdf("first.pdf"), pdf("second.pdf")])
            .await;

        assert!(matches!(outcome, UploadOutcome::Uploaded(ref r) if r.filename == "first.pdf"));
        assert_eq!(FakeBackend::calls(&backend.upload_calls), 1);
        assert_eq!(session.documents().len(), 1);
    }

    #[tokio::test]
    async fn empty_selection_does_nothing() {
        let backend = Arc::new(FakeBackend::new());
        let session = session_for(backend.clone());

        assert_eq!(session.upload_selected(Vec::new()).await, UploadOutcome::NoFile);
        assert_eq!(session.upload_dropped(Vec::new()).await, UploadOutcome::NoFile);
        assert_eq!(FakeBackend::calls(&backend.upload_calls), 0);
    }
}
