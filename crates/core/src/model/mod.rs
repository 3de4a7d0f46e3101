mod config;
mod countdown;
mod draft;
mod history;
pub mod markup;
mod question;
mod result;
mod retake;
mod scoring;
mod session;

pub use config::{
    ConfigError, Difficulty, ExplanationTiming, MAX_QUESTION_COUNT, MIN_QUESTION_COUNT,
    QuestionFocus, QuizConfigDraft, QuizConfigRecord, QuizConfiguration, TimerMode,
};
pub use countdown::{Countdown, CountdownTick};
pub use draft::QuizDraft;
pub use history::{HISTORY_CAP, History, record_to_history};
pub use markup::{MarkupSpan, parse_markup};
pub use question::{MAX_OPTIONS, MIN_OPTIONS, Question, QuestionError, QuestionRecord};
pub use result::{
    PASSING_ACCURACY, QuizResult, QuizResultRecord, ResultError, ResultFilter, ReviewItem,
};
pub use retake::{RetakeError, RetakeFilter, build_retake_session};
pub use scoring::{TOPIC_LABEL_CHARS, accuracy, rounded_accuracy, score, topic_label};
pub use session::{
    Navigation, QuestionState, QuizEvent, QuizProgress, QuizSession, Selection, SessionError,
    TickOutcome, Transition,
};
