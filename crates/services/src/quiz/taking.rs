use quiz_core::model::{Question, QuizResult, QuizSession};
use tracing::{info, warn};

use crate::error::{GatewayOperation, QuizFlowError, Step};
use crate::gateways::SimplificationRequest;
use crate::quiz::QuizContext;

/// The quiz step: resume the active draft, score and persist the attempt.
pub struct QuizTakingService<'a> {
    ctx: &'a QuizContext,
}

impl<'a> QuizTakingService<'a> {
    pub(crate) fn new(ctx: &'a QuizContext) -> Self {
        Self { ctx }
    }

    /// Start a session over the active draft.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::MissingPrerequisite` when there is no draft and
    /// `QuizFlowError::Session` when the draft cannot be resumed.
    pub async fn start(&self) -> Result<QuizSession, QuizFlowError> {
        let draft = self
            .ctx
            .store
            .draft()
            .await?
            .ok_or(QuizFlowError::MissingPrerequisite(Step::Quiz))?;
        let session = QuizSession::resume(&draft).inspect_err(|err| {
            warn!(error = %err, "active draft cannot be resumed");
        })?;
        info!(questions = session.len(), "quiz started");
        Ok(session)
    }

    /// Score `session`, make it the last result and add it to history.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` if either write fails.
    pub async fn submit(&self, session: QuizSession) -> Result<QuizResult, QuizFlowError> {
        let result = session.submit(self.ctx.clock.now());
        self.ctx.store.save_last_result(&result).await?;
        let history = self.ctx.store.record_result(result.clone()).await?;
        info!(
            score = result.score(),
            total = result.total(),
            accuracy = result.rounded_accuracy(),
            history = history.len(),
            "quiz submitted"
        );
        Ok(result)
    }

    /// Ask for a plainer rewrite of `question`'s explanation.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Gateway` when the question has no explanation
    /// or the remote call fails.
    pub async fn simplify_explanation(&self, question: &Question) -> Result<String, QuizFlowError> {
        let request = SimplificationRequest::new(question.explanation().unwrap_or_default())
            .map_err(QuizFlowError::gateway(GatewayOperation::Simplification))?;
        self.ctx
            .simplifier
            .simplify(&request)
            .await
            .map_err(QuizFlowError::gateway(GatewayOperation::Simplification))
    }
}
