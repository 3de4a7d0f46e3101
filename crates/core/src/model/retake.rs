use thiserror::Error;

use crate::model::config::ConfigError;
use crate::model::draft::QuizDraft;
use crate::model::question::Question;
use crate::model::result::QuizResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RetakeError {
    #[error("this quiz was saved without its configuration and cannot be retaken")]
    MissingConfiguration,

    #[error("nothing to retake: every question was answered correctly")]
    NothingToRetake,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetakeFilter {
    #[default]
    All,
    /// Only questions whose recorded answer was wrong or missing.
    IncorrectOnly,
}

/// Plan a new attempt from a finished result.
///
/// # Errors
///
/// Returns `RetakeError::MissingConfiguration` when the result carries no
/// configuration, and `RetakeError::NothingToRetake` when `IncorrectOnly`
/// selects no question.
pub fn build_retake_session(
    result: &QuizResult,
    filter: RetakeFilter,
) -> Result<QuizDraft, RetakeError> {
    let config = result.config().ok_or(RetakeError::MissingConfiguration)?;

    let questions: Vec<Question> = match filter {
        RetakeFilter::All => result.questions().to_vec(),
        RetakeFilter::IncorrectOnly => result
            .questions()
            .iter()
            .zip(result.answers())
            .filter(|(question, answer)| !question.is_correct(**answer))
            .map(|(question, _)| question.clone())
            .collect(),
    };

    if questions.is_empty() {
        return Err(RetakeError::NothingToRetake);
    }

    let count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    let config = config.with_question_count(count)?;
    let document_text = match filter {
        RetakeFilter::All => format!("Retake of quiz on \"{}\"", result.topic()),
        RetakeFilter::IncorrectOnly => {
            format!("Review of incorrect answers for \"{}\"", result.topic())
        }
    };

    Ok(QuizDraft {
        document_text,
        questions,
        config: Some(config),
    })
}
