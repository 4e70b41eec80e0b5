use core_types::{Message, NewMessage};
use tracing::{debug, info, warn};

use crate::busy::Operation;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    EmptyInput,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was appended and no request was issued.
    Rejected(SendRejection),
    /// The backend answered; holds the appended reply.
    Answered(Message),
    /// The request failed; holds the appended fallback reply.
    Failed(Message),
}

impl Session {
    /// Sends the pending input.
    ///
    /// The user message is appended and the input cleared before the request goes out. Exactly
    /// one assistant message follows, either the backend's reply or the fallback text.
    pub async fn send(&self) -> SendOutcome {
        let (_guard, text) = {
            let mut input = self.input.lock();
            if input.trim().is_empty() {
                debug!("send ignored: empty input");
                return SendOutcome::Rejected(SendRejection::EmptyInput);
            }
            let Some(guard) = self.busy.try_begin(Operation::Send) else {
                debug!("send ignored: a message is already in flight");
                return SendOutcome::Rejected(SendRejection::Busy);
            };
            let text = std::mem::take(&mut *input);
            self.append(NewMessage::user(text.clone()));
            (guard, text)
        };

        match self.backend.chat(&text).await {
            Ok(reply) => {
                info!(source = ?reply.source, "chat reply received");
                SendOutcome::Answered(self.append(NewMessage::from_reply(reply)))
            }
            Err(err) => {
                warn!(error = %err, "chat request failed");
                let fallback = NewMessage::assistant(self.i18n.t("chat.fallback"));
                SendOutcome::Failed(self.append(fallback))
            }
        }
    }

    /// Replaces the pending input with `text` and sends it.
    pub async fn send_text(&self, text: impl Into<String>) -> SendOutcome {
        self.set_input(text);
        self.send().await
    }
}
