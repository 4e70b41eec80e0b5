//! Client-side interaction controller for a knowledge-base chat backend.
//!
//! [`Session`] owns the conversation log and the document registry cache and turns user
//! actions (send, upload, delete) into backend calls, reconciling local state with each result.

mod busy;
mod conversation;
mod deletion;
mod dispatch;
mod registry;
mod session;
mod upload;

#[cfg(test)]
mod test_support;

pub use busy::{BusyFlags, BusyGuard, BusySnapshot, Operation};
pub use conversation::{ConversationStore, Transcript};
pub use deletion::DeleteOutcome;
pub use dispatch::{SendOutcome, SendRejection};
pub use registry::{DocumentRegistry, DocumentSnapshot, RefreshOutcome};
pub use session::{Session, SessionEvent};
pub use upload::UploadOutcome;
