use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Send,
    Upload,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusySnapshot {
    pub sending: bool,
    pub uploading: bool,
}

/// Single-flight flags, one per operation class. A rejected claim is dropped, never queued.
#[derive(Debug, Default)]
pub struct BusyFlags {
    sending: AtomicBool,
    uploading: AtomicBool,
}

impl BusyFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `operation`, or returns `None` if a claim is already outstanding.
    pub fn try_begin(&self, operation: Operation) -> Option<BusyGuard<'_>> {
        let flag = self.flag(operation);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                trace!(?operation, "busy flag set");
                BusyGuard { flag, operation }
            })
    }

    pub fn is_busy(&self, operation: Operation) -> bool {
        self.flag(operation).load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> BusySnapshot {
        BusySnapshot {
            sending: self.is_busy(Operation::Send),
            uploading: self.is_busy(Operation::Upload),
        }
    }

    fn flag(&self, operation: Operation) -> &AtomicBool {
        match operation {
            Operation::Send => &self.sending,
            Operation::Upload => &self.uploading,
        }
    }
}

/// Clears its flag when dropped, whether the request finished, failed or unwound.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    operation: Operation,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        trace!(operation = ?self.operation, "busy flag cleared");
    }
}
