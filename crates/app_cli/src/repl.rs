use std::path::PathBuf;
use std::sync::Arc;

use core_session::{RefreshOutcome, SendOutcome, SendRejection, Session, UploadOutcome};
use core_types::UploadCandidate;
use tracing::{debug, info, warn};

use crate::files::candidate_from_path;
use crate::input::{Command, HELP, InputLines, parse_command};

/// Reads commands until `/quit` or end of input.
///
/// Sends and uploads run in the background so the prompt stays usable; their
/// results arrive through the session's event stream.
pub async fn run(session: Arc<Session>, lines: InputLines) {
    loop {
        let line = match lines.lock().await.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "failed to read input");
                break;
            }
        };

        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Send(text) => {
                let session = session.clone();
                tokio::spawn(async move {
                    if let SendOutcome::Rejected(SendRejection::Busy) = session.send_text(text).await {
                        println!("{}", session.i18n().t("chat.thinking"));
                    }
                });
            }
            Command::Upload(path) => spawn_upload(&session, vec![path], false),
            Command::Drop(paths) => spawn_upload(&session, paths, true),
            Command::Delete(id) => {
                let outcome = session.delete_document(id).await;
                debug!(id, ?outcome, "delete finished");
            }
            Command::Docs => println!(
                "{}",
                crate::render::documents(session.i18n(), &session.documents())
            ),
            Command::Refresh => {
                if let RefreshOutcome::Failed(_) = session.refresh_documents().await {
                    println!("{}", session.i18n().t("documents.refresh_failed"));
                }
            }
            Command::Status => match session.check_backend().await {
                Ok(health) => println!(
                    "{} ({}, {})",
                    session.i18n().t("status.healthy"),
                    health.status,
                    health
                        .knowledge_base_documents
                        .map(|count| count.to_string())
                        .unwrap_or_else(|| "-".to_string())
                ),
                Err(err) => {
                    warn!(error = %err, "health check failed");
                    println!("{}", session.i18n().t("status.unreachable"));
                }
            },
            Command::Invalid(raw) => println!("? {raw}\n{HELP}"),
        }
    }
    info!("input closed, leaving");
}

fn spawn_upload(session: &Arc<Session>, paths: Vec<PathBuf>, dropped: bool) {
    let session = session.clone();
    tokio::spawn(async move {
        let mut files: Vec<UploadCandidate> = Vec::with_capacity(1);
        // Only the first file is ever uploaded, so only it is read.
        if let Some(path) = paths.first() {
            match candidate_from_path(path).await {
                Ok(file) => files.push(file),
                Err(err) => {
                    warn!(error = %err, "could not read upload");
                    eprintln!("{err:#}");
                    return;
                }
            }
        }
        let outcome = if dropped {
            session.upload_dropped(files).await
        } else {
            session.upload_selected(files).await
        };
        if outcome == UploadOutcome::Busy {
            println!("{}", session.i18n().t("upload.in_progress"));
        }
        debug!(?outcome, "upload finished");
    });
}
