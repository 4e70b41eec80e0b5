use std::sync::Arc;

use chrono::Utc;
use core_types::{Message, MessageId, NewMessage};
use parking_lot::Mutex;

/// Immutable view of the conversation at one point in time.
pub type Transcript = Arc<Vec<Message>>;

/// Append-only message log. Ids come from a counter owned by the log, never from its length.
#[derive(Debug)]
pub struct ConversationStore {
    log: Mutex<Log>,
}

#[derive(Debug)]
struct Log {
    messages: Transcript,
    next_id: MessageId,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(Log {
                messages: Arc::new(Vec::new()),
                next_id: 1,
            }),
        }
    }

    pub fn seeded(greeting: NewMessage) -> Self {
        let store = Self::new();
        store.append(greeting);
        store
    }

    pub fn append(&self, draft: NewMessage) -> Message {
        let mut log = self.log.lock();
        let id = log.next_id;
        log.next_id += 1;

        let message = Message {
            id,
            origin: draft.origin,
            text: draft.text,
            provenance: draft.provenance,
            source_files: draft.source_files,
            created_at: Utc::now(),
        };
        // Copy-on-write: snapshots handed out earlier keep their own vector.
        Arc::make_mut(&mut log.messages).push(message.clone());
        message
    }

    pub fn snapshot(&self) -> Transcript {
        Arc::clone(&self.log.lock().messages)
    }

    pub fn len(&self) -> usize {
        self.log.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
