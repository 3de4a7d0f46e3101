use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::config::{QuizConfiguration, TimerMode};
use crate::model::countdown::{Countdown, CountdownTick};
use crate::model::draft::QuizDraft;
use crate::model::question::Question;
use crate::model::result::QuizResult;
use crate::model::scoring::topic_label;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("stored quiz has no configuration")]
    MissingConfiguration,

    #[error("option {index} does not exist; question has {len} options")]
    InvalidOption { index: usize, len: usize },

    #[error("time is up for this quiz")]
    TimeUp,
}

//
// ─── TRANSITIONS ──────────────────────────────────────────────────────────────
//

/// Per-question state of the machine, tagged with the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionState {
    AwaitingAnswer(usize),
    Answered(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Recorded(usize),
    /// The question already had an answer; nothing changed.
    AlreadyAnswered(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    /// Already at the first/last question; index unchanged.
    AtBoundary(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    Suspended,
    /// Per-question time ran out and the session moved to this index.
    AutoAdvanced(usize),
    /// Per-question time ran out on the last question; the clock rearmed.
    TimedOutOnLast,
    /// Whole-quiz budget exhausted; the caller must submit.
    TimeUp,
}

/// Inputs accepted by [`QuizSession::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    Select(usize),
    Advance,
    Retreat,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Selected(Selection),
    Navigated(Navigation),
    Ticked(TickOutcome),
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub current: usize,
    /// Position-based percentage: `(current + 1) / total * 100`.
    pub percent: f64,
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Live state of one quiz attempt.
///
/// `answers` always has one slot per question and `current` always points at
/// a question. Submitting consumes the session.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    current: usize,
    countdown: Countdown,
    config: QuizConfiguration,
    source_text: String,
}

impl QuizSession {
    /// Start a session over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn new(
        questions: Vec<Question>,
        config: QuizConfiguration,
        source_text: impl Into<String>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let countdown = Countdown::new(config.timer_mode(), config.timer_seconds());
        Ok(Self {
            answers: vec![None; questions.len()],
            questions,
            current: 0,
            countdown,
            config,
            source_text: source_text.into(),
        })
    }

    /// Rebuild a session from a persisted draft.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingConfiguration` for drafts written without
    /// a configuration and `SessionError::Empty` for drafts with no questions.
    pub fn resume(draft: &QuizDraft) -> Result<Self, SessionError> {
        let config = draft
            .config
            .clone()
            .ok_or(SessionError::MissingConfiguration)?;
        Self::new(draft.questions.clone(), config, draft.document_text.clone())
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfiguration {
        &self.config
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.current]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn state(&self) -> QuestionState {
        match self.answers[self.current] {
            Some(_) => QuestionState::Answered(self.current),
            None => QuestionState::AwaitingAnswer(self.current),
        }
    }

    /// Whether the "next" control should be enabled: the current question
    /// is answered and it is not the last one.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.answers[self.current].is_some() && !self.is_last()
    }

    #[must_use]
    pub fn remaining_time(&self) -> u32 {
        self.countdown.remaining()
    }

    /// False while the per-question clock is paused on an answered question.
    #[must_use]
    pub fn timer_active(&self) -> bool {
        match self.countdown.mode() {
            TimerMode::PerQuestion => self.answers[self.current].is_none(),
            TimerMode::WholeQuiz => !self.countdown.is_expired(),
        }
    }

    #[must_use]
    pub fn is_time_up(&self) -> bool {
        self.countdown.mode() == TimerMode::WholeQuiz && self.countdown.is_expired()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|answer| answer.is_some()).count()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        #[allow(clippy::cast_precision_loss)]
        let percent = (self.current + 1) as f64 / total as f64 * 100.0;
        QuizProgress {
            total,
            answered: self.answered_count(),
            current: self.current,
            percent,
        }
    }

    /// Record an answer for the current question.
    ///
    /// Answers are write-once: selecting again on an answered question is a
    /// no-op reported as `Selection::AlreadyAnswered`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidOption` if `option` is out of range and
    /// `SessionError::TimeUp` once the whole-quiz budget is spent.
    pub fn select_option(&mut self, option: usize) -> Result<Selection, SessionError> {
        if self.is_time_up() {
            return Err(SessionError::TimeUp);
        }
        let len = self.questions[self.current].option_count();
        if option >= len {
            return Err(SessionError::InvalidOption { index: option, len });
        }
        let slot = &mut self.answers[self.current];
        if slot.is_some() {
            return Ok(Selection::AlreadyAnswered(self.current));
        }
        *slot = Some(option);
        Ok(Selection::Recorded(self.current))
    }

    /// Move to the next question. On the last question this is a no-op and
    /// the caller should submit instead.
    pub fn advance(&mut self) -> Navigation {
        if self.is_last() {
            return Navigation::AtBoundary(self.current);
        }
        self.current += 1;
        self.reset_question_clock();
        Navigation::Moved(self.current)
    }

    /// Move to the previous question, keeping any recorded answer.
    pub fn retreat(&mut self) -> Navigation {
        if self.current == 0 {
            return Navigation::AtBoundary(0);
        }
        self.current -= 1;
        self.reset_question_clock();
        Navigation::Moved(self.current)
    }

    /// Feed one second of wall time into the countdown.
    pub fn tick(&mut self) -> TickOutcome {
        let suspended = self.answers[self.current].is_some();
        match self.countdown.tick(suspended) {
            CountdownTick::Running(remaining) => TickOutcome::Running(remaining),
            CountdownTick::Suspended => TickOutcome::Suspended,
            CountdownTick::Expired => match self.countdown.mode() {
                TimerMode::WholeQuiz => TickOutcome::TimeUp,
                TimerMode::PerQuestion => match self.advance() {
                    Navigation::Moved(index) => TickOutcome::AutoAdvanced(index),
                    Navigation::AtBoundary(_) => TickOutcome::TimedOutOnLast,
                },
            },
        }
    }

    /// Single transition function over all session inputs.
    ///
    /// # Errors
    ///
    /// Propagates `select_option` errors.
    pub fn handle(&mut self, event: QuizEvent) -> Result<Transition, SessionError> {
        Ok(match event {
            QuizEvent::Select(option) => Transition::Selected(self.select_option(option)?),
            QuizEvent::Advance => Transition::Navigated(self.advance()),
            QuizEvent::Retreat => Transition::Navigated(self.retreat()),
            QuizEvent::Tick => Transition::Ticked(self.tick()),
        })
    }

    /// Finalize the attempt into a scored result.
    #[must_use]
    pub fn submit(self, completed_at: DateTime<Utc>) -> QuizResult {
        let topic = topic_label(&self.source_text);
        QuizResult::new(
            self.questions,
            self.answers,
            completed_at,
            topic,
            Some(self.config),
        )
    }

    fn reset_question_clock(&mut self) {
        if self.countdown.mode() == TimerMode::PerQuestion {
            self.countdown.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::QuizConfigDraft;
    use crate::time::fixed_now;

    fn question(correct: usize) -> Question {
        Question::new(
            format!("Question with answer {correct}"),
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct,
            None,
        )
        .unwrap()
    }

    fn config(mode: TimerMode, seconds: u32) -> QuizConfiguration {
        QuizConfigDraft {
            timer_mode: Some(mode),
            timer_seconds: Some(seconds),
            ..QuizConfigDraft::with_defaults()
        }
        .validate()
        .unwrap()
    }

    fn session(correct: &[usize], mode: TimerMode, seconds: u32) -> QuizSession {
        let questions = correct.iter().copied().map(question).collect();
        QuizSession::new(questions, config(mode, seconds), "Source text").unwrap()
    }

    #[test]
    fn rejects_empty_quiz() {
        let err = QuizSession::new(Vec::new(), QuizConfiguration::default(), "").unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn resume_requires_configuration() {
        let draft = QuizDraft {
            document_text: "text".into(),
            questions: vec![question(0)],
            config: None,
        };
        assert_eq!(
            QuizSession::resume(&draft).unwrap_err(),
            SessionError::MissingConfiguration
        );
    }

    #[test]
    fn answers_are_write_once() {
        let mut s = session(&[1, 0], TimerMode::PerQuestion, 30);
        assert_eq!(s.state(), QuestionState::AwaitingAnswer(0));
        assert_eq!(s.select_option(2).unwrap(), Selection::Recorded(0));
        assert_eq!(s.select_option(1).unwrap(), Selection::AlreadyAnswered(0));
        assert_eq!(s.answers(), &[Some(2), None]);
        assert_eq!(s.state(), QuestionState::Answered(0));
        assert_eq!(s.answers().len(), s.questions().len());
    }

    #[test]
    fn rejects_option_out_of_range() {
        let mut s = session(&[1], TimerMode::PerQuestion, 30);
        assert_eq!(
            s.select_option(4).unwrap_err(),
            SessionError::InvalidOption { index: 4, len: 4 }
        );
        assert_eq!(s.answers(), &[None]);
    }

    #[test]
    fn navigation_stays_in_bounds_and_keeps_answers() {
        let mut s = session(&[0, 1, 2], TimerMode::PerQuestion, 30);
        assert_eq!(s.retreat(), Navigation::AtBoundary(0));
        s.select_option(0).unwrap();
        assert_eq!(s.advance(), Navigation::Moved(1));
        assert_eq!(s.advance(), Navigation::Moved(2));
        assert_eq!(s.advance(), Navigation::AtBoundary(2));
        assert_eq!(s.retreat(), Navigation::Moved(1));
        assert_eq!(s.retreat(), Navigation::Moved(0));
        assert_eq!(s.current_answer(), Some(0));
    }

    #[test]
    fn per_question_timeout_auto_advances_and_resets() {
        let mut s = session(&[0, 1], TimerMode::PerQuestion, 30);
        for _ in 0..29 {
            assert!(matches!(s.tick(), TickOutcome::Running(_)));
        }
        assert_eq!(s.tick(), TickOutcome::AutoAdvanced(1));
        assert_eq!(s.remaining_time(), 30);
        assert_eq!(s.answers(), &[None, None]);
    }

    #[test]
    fn per_question_clock_pauses_after_answering() {
        let mut s = session(&[0, 1], TimerMode::PerQuestion, 30);
        s.tick();
        s.select_option(0).unwrap();
        assert!(!s.timer_active());
        assert_eq!(s.tick(), TickOutcome::Suspended);
        assert_eq!(s.remaining_time(), 29);
        s.advance();
        assert_eq!(s.remaining_time(), 30);
        assert!(s.timer_active());
    }

    #[test]
    fn per_question_timeout_on_last_question_rearms() {
        let mut s = session(&[0], TimerMode::PerQuestion, 2);
        s.tick();
        assert_eq!(s.tick(), TickOutcome::TimedOutOnLast);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_time(), 2);
    }

    #[test]
    fn whole_quiz_timeout_scores_only_answered() {
        let mut s = session(&[0, 1, 2, 3, 0], TimerMode::WholeQuiz, 600);
        s.select_option(0).unwrap();
        s.advance();
        s.select_option(1).unwrap();
        s.advance();

        let mut outcome = TickOutcome::Suspended;
        for _ in 0..600 {
            outcome = s.tick();
        }
        assert_eq!(outcome, TickOutcome::TimeUp);
        assert!(s.is_time_up());
        assert_eq!(s.select_option(2).unwrap_err(), SessionError::TimeUp);

        let result = s.submit(fixed_now());
        assert_eq!(result.score(), 2);
        assert!((result.accuracy() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn whole_quiz_clock_keeps_running_after_answer() {
        let mut s = session(&[0, 1], TimerMode::WholeQuiz, 10);
        s.select_option(0).unwrap();
        assert_eq!(s.tick(), TickOutcome::Running(9));
        s.advance();
        assert_eq!(s.remaining_time(), 9);
    }

    #[test]
    fn handle_routes_events() {
        let mut s = session(&[0, 1], TimerMode::PerQuestion, 30);
        assert_eq!(
            s.handle(QuizEvent::Select(0)).unwrap(),
            Transition::Selected(Selection::Recorded(0))
        );
        assert_eq!(
            s.handle(QuizEvent::Advance).unwrap(),
            Transition::Navigated(Navigation::Moved(1))
        );
        assert_eq!(
            s.handle(QuizEvent::Tick).unwrap(),
            Transition::Ticked(TickOutcome::Running(29))
        );
        assert_eq!(
            s.handle(QuizEvent::Retreat).unwrap(),
            Transition::Navigated(Navigation::Moved(0))
        );
    }

    #[test]
    fn progress_tracks_position() {
        let mut s = session(&[0, 1, 2, 3], TimerMode::PerQuestion, 30);
        s.select_option(0).unwrap();
        s.advance();
        let progress = s.progress();
        assert_eq!(progress.total, 4);
        assert_eq!(progress.answered, 1);
        assert!((progress.percent - 50.0).abs() < f64::EPSILON);
    }
}
