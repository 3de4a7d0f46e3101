use quiz_core::model::ConfigError;
use services::{AppServicesError, GatewayError, QuizFlowError};
use thiserror::Error;

use crate::args::ArgsError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error("{}", flow_message(.0))]
    Flow(#[from] QuizFlowError),
    #[error("invalid quiz configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Upload(#[from] GatewayError),
    #[error("unsupported file `{0}`; please upload a JPG, PNG, or PDF file")]
    UnsupportedFile(String),
    #[error(transparent)]
    Services(#[from] AppServicesError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn flow_message(err: &QuizFlowError) -> String {
    if err.is_redirect() {
        format!(
            "{}\nStart over with `quiz text <file>`, `quiz extract <image>...` or `quiz sample`.",
            err.user_message()
        )
    } else {
        err.user_message()
    }
}
