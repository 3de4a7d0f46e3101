use serde::{Deserialize, Serialize};

use crate::model::config::QuizConfiguration;
use crate::model::question::Question;

/// A generated quiz waiting to be taken: the questions, the text they were
/// generated from and the configuration used.
///
/// The configuration fields sit at the top level of the JSON object next to
/// `documentText` and `quiz`. When they are missing or do not validate,
/// `config` loads as `None` and the draft cannot be started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub document_text: String,
    #[serde(rename = "quiz")]
    pub questions: Vec<Question>,
    #[serde(flatten)]
    pub config: Option<QuizConfiguration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{ExplanationTiming, TimerMode};
    use crate::model::session::{QuizSession, SessionError};
    use serde_json::json;

    fn quiz_json() -> serde_json::Value {
        json!([{
            "question": "How tall is the tower?",
            "options": ["124 m", "224 m", "324 m", "424 m"],
            "correctAnswerIndex": 2
        }])
    }

    #[test]
    fn loads_flat_stored_quiz_data() {
        let raw = json!({
            "quiz": quiz_json(),
            "documentText": "The Eiffel Tower is 324 metres tall.",
            "numberOfQuestions": 1,
            "optionsPerQuestion": 4,
            "timer": 45,
            "quizMode": "timedChallenge",
            "difficulty": "hard",
            "questionType": "facts",
            "explanationTiming": "end"
        });
        let draft: QuizDraft = serde_json::from_value(raw).unwrap();
        let config = draft.config.clone().unwrap();
        assert_eq!(config.timer_mode(), TimerMode::WholeQuiz);
        assert_eq!(config.timer_seconds(), 45);
        assert_eq!(config.explanation_timing(), ExplanationTiming::End);

        let session = QuizSession::resume(&draft).unwrap();
        assert_eq!(session.questions().len(), 1);
        assert_eq!(session.remaining_time(), 45);
    }

    #[test]
    fn serializes_config_at_top_level() {
        let draft = QuizDraft {
            document_text: "text".into(),
            questions: serde_json::from_value(quiz_json()).unwrap(),
            config: Some(QuizConfiguration::default()),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["numberOfQuestions"], 5);
        assert_eq!(value["quizMode"], "perQuestion");
        assert!(value.get("config").is_none());

        let back: QuizDraft = serde_json::from_value(value).unwrap();
        assert_eq!(back, draft);
    }

    #[test]
    fn missing_or_invalid_config_loads_as_none() {
        let bare = json!({ "documentText": "old", "quiz": quiz_json() });
        let draft: QuizDraft = serde_json::from_value(bare).unwrap();
        assert_eq!(draft.config, None);
        assert_eq!(
            QuizSession::resume(&draft).unwrap_err(),
            SessionError::MissingConfiguration
        );

        let bad_options = json!({
            "documentText": "old",
            "quiz": quiz_json(),
            "numberOfQuestions": 1,
            "optionsPerQuestion": 3,
            "timer": 30
        });
        let draft: QuizDraft = serde_json::from_value(bad_options).unwrap();
        assert_eq!(draft.config, None);
    }
}
