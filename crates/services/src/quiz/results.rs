use quiz_core::model::{History, QuizDraft, QuizResult, RetakeFilter, build_retake_session};
use tracing::info;

use crate::error::{QuizFlowError, Step};
use crate::quiz::QuizContext;

/// Results and history screens.
pub struct ResultsService<'a> {
    ctx: &'a QuizContext,
}

impl<'a> ResultsService<'a> {
    pub(crate) fn new(ctx: &'a QuizContext) -> Self {
        Self { ctx }
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::MissingPrerequisite` when no quiz was finished.
    pub async fn last_result(&self) -> Result<QuizResult, QuizFlowError> {
        self.ctx
            .store
            .last_result()
            .await?
            .ok_or(QuizFlowError::MissingPrerequisite(Step::Results))
    }

    /// Turn `result` into the active draft for another attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Retake` when the result cannot be retaken.
    pub async fn retake(
        &self,
        result: &QuizResult,
        filter: RetakeFilter,
    ) -> Result<QuizDraft, QuizFlowError> {
        let draft = build_retake_session(result, filter)?;
        self.ctx.store.save_draft(&draft).await?;
        info!(?filter, questions = draft.questions.len(), "retake prepared");
        Ok(draft)
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` on backend failures.
    pub async fn history(&self) -> Result<History, QuizFlowError> {
        Ok(self.ctx.store.history().await?)
    }

    /// Zero-based, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::HistoryEntryNotFound` for an unknown index.
    pub async fn history_entry(&self, index: usize) -> Result<QuizResult, QuizFlowError> {
        self.history()
            .await?
            .get(index)
            .cloned()
            .ok_or(QuizFlowError::HistoryEntryNotFound(index))
    }

    /// Open a past attempt on the results screen.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::HistoryEntryNotFound` for an unknown index.
    pub async fn review_from_history(&self, index: usize) -> Result<QuizResult, QuizFlowError> {
        let result = self.history_entry(index).await?;
        self.ctx.store.save_last_result(&result).await?;
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::HistoryEntryNotFound` for an unknown index and
    /// `QuizFlowError::Retake` when the entry cannot be retaken.
    pub async fn retake_from_history(
        &self,
        index: usize,
        filter: RetakeFilter,
    ) -> Result<QuizDraft, QuizFlowError> {
        let result = self.history_entry(index).await?;
        self.retake(&result, filter).await
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` on backend failures.
    pub async fn clear_history(&self) -> Result<(), QuizFlowError> {
        self.ctx.store.clear_history().await?;
        info!("cleared quiz history");
        Ok(())
    }
}
