use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Logical key-value slots holding the quiz flow's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Reviewed document text waiting to be configured into a quiz.
    DocumentText,
    /// Generated quiz (questions, source text, configuration) not yet taken.
    ActiveDraft,
    /// Most recently submitted result.
    LastResult,
    /// Capped, newest-first list of past results.
    History,
}

impl Slot {
    pub const ALL: [Slot; 4] = [
        Slot::DocumentText,
        Slot::ActiveDraft,
        Slot::LastResult,
        Slot::History,
    ];

    /// Stable storage key for the slot.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Slot::DocumentText => "documentText",
            Slot::ActiveDraft => "quizData",
            Slot::LastResult => "quizResult",
            Slot::History => "quizHistory",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw blob store behind the typed [`crate::QuizStore`].
///
/// Values are opaque strings; serialization happens one layer up.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Read a slot, `None` when it was never written or has been removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn read(&self, slot: Slot) -> Result<Option<String>, StorageError>;

    /// Replace a slot's value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn write(&self, slot: Slot, value: String) -> Result<(), StorageError>;

    /// Remove a slot. Removing an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn remove(&self, slot: Slot) -> Result<(), StorageError>;
}

/// Simple in-memory slot store for tests and short-lived sessions.
#[derive(Clone, Default)]
pub struct InMemorySlotStore {
    slots: Arc<Mutex<HashMap<Slot, String>>>,
}

impl InMemorySlotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        let guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&slot).cloned())
    }

    async fn write(&self, slot: Slot, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(slot, value);
        Ok(())
    }

    async fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&slot);
        Ok(())
    }
}

/// Slot backend behind a trait object so the persistence mechanism can be
/// swapped without touching the flows.
#[derive(Clone)]
pub struct Storage {
    pub slots: Arc<dyn SlotStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            slots: Arc::new(InMemorySlotStore::new()),
        }
    }

    #[must_use]
    pub fn quiz_store(&self) -> crate::QuizStore {
        crate::QuizStore::new(Arc::clone(&self.slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_read_write_remove() {
        let store = InMemorySlotStore::new();
        assert_eq!(store.read(Slot::History).await.unwrap(), None);

        store.write(Slot::History, "[]".into()).await.unwrap();
        assert_eq!(store.read(Slot::History).await.unwrap().as_deref(), Some("[]"));

        store.remove(Slot::History).await.unwrap();
        store.remove(Slot::History).await.unwrap();
        assert_eq!(store.read(Slot::History).await.unwrap(), None);
    }

    #[test]
    fn slot_keys_are_distinct() {
        let mut keys: Vec<&str> = Slot::ALL.iter().map(|slot| slot.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Slot::ALL.len());
    }
}
