//! Shared error types for the services crate.

use std::fmt;

use thiserror::Error;

use quiz_core::model::{RetakeError, SessionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Remote-call failures, normalized at the gateway boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("AI gateway is not configured")]
    Disabled,
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("AI returned an empty response")]
    EmptyResponse,
    #[error("AI response did not match the expected shape: {0}")]
    Malformed(String),
}

/// Which remote flow a gateway error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    Generation,
    Extraction,
    Simplification,
}

impl GatewayOperation {
    /// Message shown to the user when this operation fails for a reason
    /// they cannot fix by changing their input.
    #[must_use]
    pub fn retry_message(self) -> &'static str {
        match self {
            GatewayOperation::Generation => "Failed to generate quiz. Please try again.",
            GatewayOperation::Extraction => {
                "Failed to extract text from the images. Please try again."
            }
            GatewayOperation::Simplification => {
                "Could not simplify the explanation. Please try again."
            }
        }
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GatewayOperation::Generation => "quiz generation",
            GatewayOperation::Extraction => "text extraction",
            GatewayOperation::Simplification => "explanation simplification",
        })
    }
}

/// Steps of the quiz flow that need upstream data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Configure,
    Quiz,
    Results,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Configure => "configure",
            Step::Quiz => "quiz",
            Step::Results => "results",
        })
    }
}

/// Errors emitted by the quiz flow services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("nothing to show on the {0} step yet; start from the beginning")]
    MissingPrerequisite(Step),
    #[error("document text must be at least {min} characters, got {len}")]
    DocumentTooShort { len: usize, min: usize },
    #[error("no history entry at position {0}")]
    HistoryEntryNotFound(usize),
    #[error("{operation} failed: {source}")]
    Gateway {
        operation: GatewayOperation,
        #[source]
        source: GatewayError,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Retake(#[from] RetakeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizFlowError {
    pub(crate) fn gateway(operation: GatewayOperation) -> impl FnOnce(GatewayError) -> Self {
        move |source| Self::Gateway { operation, source }
    }

    /// Whether the caller should send the user back to the start of the flow.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(
            self,
            QuizFlowError::MissingPrerequisite(_)
                | QuizFlowError::Session(SessionError::MissingConfiguration | SessionError::Empty)
        )
    }

    /// Human-readable message for inline display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            QuizFlowError::Gateway {
                source: GatewayError::InvalidInput(msg),
                ..
            } => msg.clone(),
            QuizFlowError::Gateway {
                source: GatewayError::Disabled,
                ..
            } => "AI features are not configured. Set QUIZ_AI_API_KEY.".to_string(),
            QuizFlowError::Gateway { operation, .. } => operation.retry_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
