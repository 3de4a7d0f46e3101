use thiserror::Error;

use crate::model::{ConfigError, QuestionError, ResultError, RetakeError, SessionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Result(#[from] ResultError),
    #[error(transparent)]
    Retake(#[from] RetakeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_domain_errors_transparently() {
        let err: Error = SessionError::TimeUp.into();
        assert!(matches!(err, Error::Session(SessionError::TimeUp)));
        assert_eq!(err.to_string(), SessionError::TimeUp.to_string());

        let err: Error = ConfigError::QuestionCount(0).into();
        assert!(matches!(err, Error::Config(_)));
    }
}
