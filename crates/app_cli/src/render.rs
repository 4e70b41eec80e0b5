use core_session::SessionEvent;
use core_types::{Document, Message, Notice, NoticeLevel, Origin, Provenance};
use i18n::I18n;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

pub fn header(i18n: &I18n, advisory_max_mb: u64) -> String {
    let max_mb = advisory_max_mb.to_string();
    format!(
        "{}\n{}\n{} ({})",
        i18n.t("app.title"),
        i18n.t("app.subtitle"),
        i18n.t("upload.hint"),
        i18n.format("upload.limits", &[("max_mb", max_mb.as_str())])
    )
}

pub fn message(i18n: &I18n, message: &Message) -> String {
    let speaker = match message.origin {
        Origin::User => ">",
        Origin::Assistant => "AI:",
    };
    let mut out = format!("{speaker} {}", message.text);
    if let Some(provenance) = message.provenance {
        let label = match provenance {
            Provenance::KnowledgeBase => i18n.t("chat.source.knowledge_base"),
            Provenance::ExternalApi => i18n.t("chat.source.external_api"),
        };
        out.push_str(&format!("\n    {}: {label}", i18n.t("chat.source")));
    }
    if !message.source_files.is_empty() {
        out.push_str(&format!(
            "\n    {}: {}",
            i18n.t("chat.source_files"),
            message.source_files.join(", ")
        ));
    }
    out
}

pub fn documents(i18n: &I18n, documents: &[Document]) -> String {
    let count = documents.len().to_string();
    let mut out = i18n.format("documents.title", &[("count", count.as_str())]);
    if documents.is_empty() {
        out.push_str(&format!("\n  {}", i18n.t("documents.empty")));
        return out;
    }
    for doc in documents {
        let date = doc
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "\n  [{}] {}  {} • {}KB",
            doc.id,
            doc.filename,
            date,
            doc.size_kb()
        ));
    }
    out
}

pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("[i] {}", notice.text),
        NoticeLevel::Error => format!("[!] {}", notice.text),
    }
}

/// Prints session events until the session goes away.
pub async fn print_events(mut events: broadcast::Receiver<SessionEvent>, i18n: I18n) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::MessageAppended(msg)) => match msg.origin {
                Origin::User => println!("{}", i18n.t("chat.thinking")),
                Origin::Assistant => println!("{}", message(&i18n, &msg)),
            },
            Ok(SessionEvent::DocumentsRefreshed(docs)) => println!("{}", documents(&i18n, &docs)),
            Ok(SessionEvent::Notice(n)) => println!("{}", notice(&n)),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
