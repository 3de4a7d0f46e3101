use std::sync::Arc;

use quiz_core::model::{History, QuizDraft, QuizResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::repository::{Slot, SlotStore, StorageError};

/// Typed get/set/clear over the quiz slots, JSON at the boundary.
///
/// A missing or unreadable value is reported as absent, never as an error;
/// only backend failures surface as `StorageError`.
#[derive(Clone)]
pub struct QuizStore {
    slots: Arc<dyn SlotStore>,
}

impl QuizStore {
    #[must_use]
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    // ─── document text ────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn document_text(&self) -> Result<Option<String>, StorageError> {
        let text = self.slots.read(Slot::DocumentText).await?;
        Ok(text.filter(|text| !text.trim().is_empty()))
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn save_document_text(&self, text: &str) -> Result<(), StorageError> {
        self.slots.write(Slot::DocumentText, text.to_string()).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn clear_document_text(&self) -> Result<(), StorageError> {
        self.slots.remove(Slot::DocumentText).await
    }

    // ─── active draft ─────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn draft(&self) -> Result<Option<QuizDraft>, StorageError> {
        self.load(Slot::ActiveDraft).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the draft cannot be serialized or stored.
    pub async fn save_draft(&self, draft: &QuizDraft) -> Result<(), StorageError> {
        self.store(Slot::ActiveDraft, draft).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn clear_draft(&self) -> Result<(), StorageError> {
        self.slots.remove(Slot::ActiveDraft).await
    }

    // ─── last result ──────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn last_result(&self) -> Result<Option<QuizResult>, StorageError> {
        self.load(Slot::LastResult).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be serialized or stored.
    pub async fn save_last_result(&self, result: &QuizResult) -> Result<(), StorageError> {
        self.store(Slot::LastResult, result).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn clear_last_result(&self) -> Result<(), StorageError> {
        self.slots.remove(Slot::LastResult).await
    }

    // ─── history ──────────────────────────────────────────────────────────

    /// Load history; absent or unreadable history is empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn history(&self) -> Result<History, StorageError> {
        Ok(self.load(Slot::History).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be serialized or stored.
    pub async fn save_history(&self, history: &History) -> Result<(), StorageError> {
        self.store(Slot::History, history).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn clear_history(&self) -> Result<(), StorageError> {
        self.slots.remove(Slot::History).await
    }

    /// Prepend `result` to the stored history, cap it, and save it back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if history cannot be read or written.
    pub async fn record_result(&self, result: QuizResult) -> Result<History, StorageError> {
        let mut history = self.history().await?;
        history.record(result);
        self.save_history(&history).await?;
        debug!(entries = history.len(), "history updated");
        Ok(history)
    }

    /// Drop the in-progress flow state (document text, draft, last result).
    /// History is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn clear_quiz_state(&self) -> Result<(), StorageError> {
        self.clear_document_text().await?;
        self.clear_draft().await?;
        self.clear_last_result().await
    }

    async fn load<T: DeserializeOwned>(&self, slot: Slot) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.slots.read(slot).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(%slot, error = %err, "discarding unreadable stored value");
                Ok(None)
            }
        }
    }

    async fn store<T: Serialize>(&self, slot: Slot, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.slots.write(slot, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemorySlotStore;
    use quiz_core::model::{Question, QuizConfiguration, HISTORY_CAP};
    use quiz_core::time::fixed_now;

    fn question() -> Question {
        Question::new(
            "Which metal is the tower made of?",
            vec!["Iron".into(), "Gold".into(), "Tin".into(), "Lead".into()],
            0,
            None,
        )
        .unwrap()
    }

    fn result(topic: &str) -> QuizResult {
        QuizResult::new(
            vec![question()],
            vec![Some(0)],
            fixed_now(),
            topic,
            Some(QuizConfiguration::default()),
        )
    }

    fn store() -> (InMemorySlotStore, QuizStore) {
        let slots = InMemorySlotStore::new();
        let store = QuizStore::new(Arc::new(slots.clone()));
        (slots, store)
    }

    #[tokio::test]
    async fn corrupt_values_read_as_absent() {
        let (slots, store) = store();
        slots.write(Slot::ActiveDraft, "{not json".into()).await.unwrap();
        slots.write(Slot::LastResult, "[1,2,3]".into()).await.unwrap();
        slots.write(Slot::History, "\"oops\"".into()).await.unwrap();

        assert!(store.draft().await.unwrap().is_none());
        assert!(store.last_result().await.unwrap().is_none());
        assert!(store.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_result_caps_history() {
        let (_slots, store) = store();
        for n in 0..(HISTORY_CAP + 3) {
            store.record_result(result(&format!("t{n}"))).await.unwrap();
        }
        let history = store.history().await.unwrap();
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.get(0).unwrap().topic(), format!("t{}", HISTORY_CAP + 2));
    }

    #[tokio::test]
    async fn clear_quiz_state_keeps_history() {
        let (_slots, store) = store();
        store.save_document_text("some text").await.unwrap();
        store
            .save_draft(&QuizDraft {
                document_text: "some text".into(),
                questions: vec![question()],
                config: Some(QuizConfiguration::default()),
            })
            .await
            .unwrap();
        let r = result("kept");
        store.save_last_result(&r).await.unwrap();
        store.record_result(r).await.unwrap();

        store.clear_quiz_state().await.unwrap();

        assert!(store.document_text().await.unwrap().is_none());
        assert!(store.draft().await.unwrap().is_none());
        assert!(store.last_result().await.unwrap().is_none());
        assert_eq!(store.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn draft_without_config_still_loads() {
        let (slots, store) = store();
        let raw = serde_json::json!({
            "documentText": "legacy",
            "quiz": [serde_json::to_value(question()).unwrap()],
        });
        slots.write(Slot::ActiveDraft, raw.to_string()).await.unwrap();
        let draft = store.draft().await.unwrap().unwrap();
        assert!(draft.config.is_none());
    }
}
