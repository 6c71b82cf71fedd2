//! In-flight dispatch tracking.

use std::sync::Arc;

use dashmap::DashSet;
use uuid::Uuid;

/// Set of conversations with a dispatch outstanding.
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct BusySet {
    inner: Arc<DashSet<Uuid>>,
}

impl BusySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `conversation_id` busy. Returns `None` if it already is.
    ///
    /// The mark is cleared when the returned guard drops.
    pub fn try_acquire(&self, conversation_id: Uuid) -> Option<BusyGuard> {
        if self.inner.insert(conversation_id) {
            Some(BusyGuard {
                set: self.inner.clone(),
                conversation_id,
            })
        } else {
            None
        }
    }

    pub fn is_busy(&self, conversation_id: &Uuid) -> bool {
        self.inner.contains(conversation_id)
    }

    /// Number of conversations currently dispatching.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Holds a conversation's busy mark for as long as it lives.
#[derive(Debug)]
pub struct BusyGuard {
    set: Arc<DashSet<Uuid>>,
    conversation_id: Uuid,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.set.remove(&self.conversation_id);
    }
}
