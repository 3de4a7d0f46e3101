use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_QUESTION_COUNT: u32 = 1;
pub const MAX_QUESTION_COUNT: u32 = 500;
pub const MAX_TIMER_SECONDS: u32 = 86_400;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("number of questions must be between 1 and 500, got {0}")]
    QuestionCount(u32),

    #[error("options per question must be 4 or 5, got {0}")]
    OptionsPerQuestion(u8),

    #[error("a time limit is required for the {0} timer")]
    MissingTimer(TimerMode),

    #[error("time limit must be between 1 and 86400 seconds, got {0}")]
    TimerOutOfRange(u32),

    #[error("unknown {field} value: {raw}")]
    UnknownValue { field: &'static str, raw: String },
}

//
// ─── CHOICES ──────────────────────────────────────────────────────────────────
//

/// How the countdown applies to a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerMode {
    /// Each question gets `timer_seconds`; the clock resets on navigation.
    #[default]
    #[serde(rename = "perQuestion")]
    PerQuestion,
    /// `timer_seconds` is the budget for the whole attempt.
    #[serde(rename = "timedChallenge")]
    WholeQuiz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Which kind of question the generator should favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionFocus {
    #[default]
    Any,
    Facts,
    Concepts,
    CauseEffect,
}

/// When the correct answer and explanation are revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationTiming {
    #[default]
    Immediate,
    End,
}

impl TimerMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::PerQuestion => "per-question",
            TimerMode::WholeQuiz => "whole-quiz",
        }
    }
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl QuestionFocus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionFocus::Any => "any",
            QuestionFocus::Facts => "facts",
            QuestionFocus::Concepts => "concepts",
            QuestionFocus::CauseEffect => "cause_effect",
        }
    }
}

impl ExplanationTiming {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExplanationTiming::Immediate => "immediate",
            ExplanationTiming::End => "end",
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_via_as_str!(TimerMode, Difficulty, QuestionFocus, ExplanationTiming);

impl FromStr for TimerMode {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "per-question" | "perquestion" => Ok(Self::PerQuestion),
            "whole-quiz" | "timedchallenge" | "timed-challenge" => Ok(Self::WholeQuiz),
            _ => Err(ConfigError::UnknownValue {
                field: "timer mode",
                raw: raw.to_string(),
            }),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ConfigError::UnknownValue {
                field: "difficulty",
                raw: raw.to_string(),
            }),
        }
    }
}

impl FromStr for QuestionFocus {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "facts" => Ok(Self::Facts),
            "concepts" => Ok(Self::Concepts),
            "cause_effect" | "cause-effect" => Ok(Self::CauseEffect),
            _ => Err(ConfigError::UnknownValue {
                field: "question type",
                raw: raw.to_string(),
            }),
        }
    }
}

impl FromStr for ExplanationTiming {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "end" => Ok(Self::End),
            _ => Err(ConfigError::UnknownValue {
                field: "explanation timing",
                raw: raw.to_string(),
            }),
        }
    }
}

//
// ─── CONFIGURATION ────────────────────────────────────────────────────────────
//

/// Validated quiz parameters, passed unchanged into generation and persisted
/// with the quiz so it can be retaken later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizConfigRecord", into = "QuizConfigRecord")]
pub struct QuizConfiguration {
    question_count: u32,
    options_per_question: u8,
    timer_mode: TimerMode,
    timer_seconds: u32,
    difficulty: Difficulty,
    question_focus: QuestionFocus,
    keywords: Option<String>,
    explanation_enrichment: bool,
    explanation_timing: ExplanationTiming,
}

/// Raw form input for a quiz configuration. Unset fields take the form
/// defaults, except that a timer must always be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizConfigDraft {
    pub question_count: Option<u32>,
    pub options_per_question: Option<u8>,
    pub timer_mode: Option<TimerMode>,
    pub timer_seconds: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub question_focus: Option<QuestionFocus>,
    pub keywords: Option<String>,
    pub explanation_enrichment: bool,
    pub explanation_timing: Option<ExplanationTiming>,
}

impl QuizConfigDraft {
    /// Draft pre-filled with the configuration form defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            question_count: Some(5),
            options_per_question: Some(4),
            timer_mode: Some(TimerMode::PerQuestion),
            timer_seconds: Some(30),
            ..Self::default()
        }
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found: question count outside 1..=500,
    /// options other than 4 or 5, or a missing/out-of-range timer.
    pub fn validate(self) -> Result<QuizConfiguration, ConfigError> {
        let question_count = self.question_count.unwrap_or(5);
        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&question_count) {
            return Err(ConfigError::QuestionCount(question_count));
        }

        let options_per_question = self.options_per_question.unwrap_or(4);
        if !matches!(options_per_question, 4 | 5) {
            return Err(ConfigError::OptionsPerQuestion(options_per_question));
        }

        let timer_mode = self.timer_mode.unwrap_or_default();
        let timer_seconds = self
            .timer_seconds
            .ok_or(ConfigError::MissingTimer(timer_mode))?;
        if timer_seconds == 0 || timer_seconds > MAX_TIMER_SECONDS {
            return Err(ConfigError::TimerOutOfRange(timer_seconds));
        }

        let keywords = self
            .keywords
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty());

        Ok(QuizConfiguration {
            question_count,
            options_per_question,
            timer_mode,
            timer_seconds,
            difficulty: self.difficulty.unwrap_or_default(),
            question_focus: self.question_focus.unwrap_or_default(),
            keywords,
            explanation_enrichment: self.explanation_enrichment,
            explanation_timing: self.explanation_timing.unwrap_or_default(),
        })
    }
}

impl QuizConfiguration {
    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn options_per_question(&self) -> u8 {
        self.options_per_question
    }

    #[must_use]
    pub fn timer_mode(&self) -> TimerMode {
        self.timer_mode
    }

    /// Per-question duration or whole-quiz budget, depending on `timer_mode`.
    #[must_use]
    pub fn timer_seconds(&self) -> u32 {
        self.timer_seconds
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn question_focus(&self) -> QuestionFocus {
        self.question_focus
    }

    #[must_use]
    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    #[must_use]
    pub fn explanation_enrichment(&self) -> bool {
        self.explanation_enrichment
    }

    #[must_use]
    pub fn explanation_timing(&self) -> ExplanationTiming {
        self.explanation_timing
    }

    /// Copy of this configuration with a different question count.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::QuestionCount` if `count` is outside 1..=500.
    pub fn with_question_count(&self, count: u32) -> Result<Self, ConfigError> {
        let mut draft = self.to_draft();
        draft.question_count = Some(count);
        draft.validate()
    }

    #[must_use]
    pub fn to_draft(&self) -> QuizConfigDraft {
        QuizConfigDraft {
            question_count: Some(self.question_count),
            options_per_question: Some(self.options_per_question),
            timer_mode: Some(self.timer_mode),
            timer_seconds: Some(self.timer_seconds),
            difficulty: Some(self.difficulty),
            question_focus: Some(self.question_focus),
            keywords: self.keywords.clone(),
            explanation_enrichment: self.explanation_enrichment,
            explanation_timing: Some(self.explanation_timing),
        }
    }
}

impl Default for QuizConfiguration {
    fn default() -> Self {
        Self {
            question_count: 5,
            options_per_question: 4,
            timer_mode: TimerMode::PerQuestion,
            timer_seconds: 30,
            difficulty: Difficulty::Medium,
            question_focus: QuestionFocus::Any,
            keywords: None,
            explanation_enrichment: false,
            explanation_timing: ExplanationTiming::Immediate,
        }
    }
}

/// Persisted shape of a configuration, field names matching stored quiz data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfigRecord {
    pub number_of_questions: u32,
    pub options_per_question: u8,
    #[serde(default)]
    pub timer: Option<u32>,
    #[serde(default)]
    pub quiz_mode: TimerMode,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub question_type: QuestionFocus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default)]
    pub enrich_explanations: bool,
    #[serde(default)]
    pub explanation_timing: ExplanationTiming,
}

impl TryFrom<QuizConfigRecord> for QuizConfiguration {
    type Error = ConfigError;

    fn try_from(record: QuizConfigRecord) -> Result<Self, Self::Error> {
        QuizConfigDraft {
            question_count: Some(record.number_of_questions),
            options_per_question: Some(record.options_per_question),
            timer_mode: Some(record.quiz_mode),
            timer_seconds: record.timer,
            difficulty: Some(record.difficulty),
            question_focus: Some(record.question_type),
            keywords: record.keywords,
            explanation_enrichment: record.enrich_explanations,
            explanation_timing: Some(record.explanation_timing),
        }
        .validate()
    }
}

impl From<QuizConfiguration> for QuizConfigRecord {
    fn from(config: QuizConfiguration) -> Self {
        Self {
            number_of_questions: config.question_count,
            options_per_question: config.options_per_question,
            timer: Some(config.timer_seconds),
            quiz_mode: config.timer_mode,
            difficulty: config.difficulty,
            question_type: config.question_focus,
            keywords: config.keywords,
            enrich_explanations: config.explanation_enrichment,
            explanation_timing: config.explanation_timing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = QuizConfigDraft::with_defaults().validate().unwrap();
        assert_eq!(config, QuizConfiguration::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut draft = QuizConfigDraft::with_defaults();
        draft.question_count = Some(501);
        assert_eq!(draft.validate().unwrap_err(), ConfigError::QuestionCount(501));

        let mut draft = QuizConfigDraft::with_defaults();
        draft.question_count = Some(0);
        assert_eq!(draft.validate().unwrap_err(), ConfigError::QuestionCount(0));

        let mut draft = QuizConfigDraft::with_defaults();
        draft.options_per_question = Some(3);
        assert_eq!(
            draft.validate().unwrap_err(),
            ConfigError::OptionsPerQuestion(3)
        );
    }

    #[test]
    fn timed_challenge_requires_total_time() {
        let draft = QuizConfigDraft {
            timer_mode: Some(TimerMode::WholeQuiz),
            timer_seconds: None,
            ..QuizConfigDraft::with_defaults()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            ConfigError::MissingTimer(TimerMode::WholeQuiz)
        );
    }

    #[test]
    fn blank_keywords_normalize_to_none() {
        let draft = QuizConfigDraft {
            keywords: Some("   ".into()),
            ..QuizConfigDraft::with_defaults()
        };
        assert_eq!(draft.validate().unwrap().keywords(), None);
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let config = QuizConfigDraft {
            timer_mode: Some(TimerMode::WholeQuiz),
            timer_seconds: Some(600),
            question_focus: Some(QuestionFocus::CauseEffect),
            keywords: Some("towers, iron".into()),
            ..QuizConfigDraft::with_defaults()
        }
        .validate()
        .unwrap();

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["numberOfQuestions"], 5);
        assert_eq!(value["quizMode"], "timedChallenge");
        assert_eq!(value["questionType"], "cause_effect");
        assert_eq!(value["timer"], 600);

        let back: QuizConfiguration = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn with_question_count_revalidates() {
        let config = QuizConfiguration::default();
        assert_eq!(config.with_question_count(2).unwrap().question_count(), 2);
        assert!(config.with_question_count(0).is_err());
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("whole-quiz".parse::<TimerMode>().unwrap(), TimerMode::WholeQuiz);
        assert_eq!(
            "cause-effect".parse::<QuestionFocus>().unwrap(),
            QuestionFocus::CauseEffect
        );
        assert!("sometimes".parse::<ExplanationTiming>().is_err());
    }
}
