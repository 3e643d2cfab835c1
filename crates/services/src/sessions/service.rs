use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{AnswerSheet, Question, QuestionId, Quiz, QuizResult};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Submitting,
    Completed,
}

/// What initiated a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The user asked to submit; requires a complete answer sheet.
    Manual,
    /// The countdown ran out; grades whatever was answered.
    Timeout,
}

/// Outcome of applying one elapsed second to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick did not apply: untimed quiz, wrong phase, or already expired.
    Idle,
    /// The countdown is still running.
    Running { remaining: u32 },
    /// The countdown just hit zero; the attempt must now be submitted.
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state machine for one attempt at a quiz.
///
/// Owns navigation, answer capture, the countdown balance, and the phase
/// transitions around submission. All scoring is delegated to the backend;
/// the session only enforces local preconditions and bookkeeping.
pub struct QuizSession {
    quiz: Arc<Quiz>,
    phase: Phase,
    current: usize,
    answers: AnswerSheet,
    remaining_secs: Option<u32>,
    result: Option<QuizResult>,
    attempt_number: u32,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a not-yet-started session over a loaded quiz.
    #[must_use]
    pub fn new(quiz: Arc<Quiz>) -> Self {
        Self::fresh(quiz, 1)
    }

    fn fresh(quiz: Arc<Quiz>, attempt_number: u32) -> Self {
        Self {
            quiz,
            phase: Phase::NotStarted,
            current: 0,
            answers: AnswerSheet::new(),
            remaining_secs: None,
            result: None,
            attempt_number,
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Arc<Quiz> {
        &self.quiz
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    /// Seconds left on the countdown. `None` for untimed quizzes and before
    /// the session starts.
    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_secs
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// 1-based number of this attempt at the quiz.
    #[must_use]
    pub fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Zero-based index of the question currently shown.
    ///
    /// Only meaningful while the session is in progress.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase != Phase::InProgress {
            return None;
        }
        self.quiz.question(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.quiz.question_count();
        SessionProgress {
            total,
            answered: self.answers.len(),
            position: (self.current + 1).min(total),
            is_complete: self.is_complete(),
        }
    }

    /// Begin the attempt.
    ///
    /// Moves to the first question and, for timed quizzes, arms the
    /// countdown with the full duration exactly once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` outside `NotStarted`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.phase != Phase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        self.phase = Phase::InProgress;
        self.current = 0;
        self.remaining_secs = self.quiz.duration_seconds();
        self.started_at = Some(now);
        Ok(())
    }

    /// Record a response for a question, overwriting any prior value.
    ///
    /// Silently ignored outside `InProgress` so nothing can mutate the sheet
    /// once a submission is pending or done.
    pub fn select_answer(&mut self, question_id: QuestionId, value: impl Into<String>) {
        if self.phase != Phase::InProgress {
            return;
        }
        self.answers.record(question_id, value);
    }

    /// Move to the next question; a no-op on the last one.
    pub fn next_question(&mut self) {
        if self.phase != Phase::InProgress {
            return;
        }
        if self.current + 1 < self.quiz.question_count() {
            self.current += 1;
        }
    }

    /// Move to the previous question; a no-op on the first one.
    pub fn previous_question(&mut self) {
        if self.phase != Phase::InProgress {
            return;
        }
        self.current = self.current.saturating_sub(1);
    }

    /// Apply one elapsed second to the countdown.
    ///
    /// Returns [`TickOutcome::Expired`] exactly once, on the transition to
    /// zero. Ticks delivered in any other phase are discarded, so a tick
    /// arriving after a submission started can never re-enter submission.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::InProgress {
            return TickOutcome::Idle;
        }
        let Some(remaining) = self.remaining_secs else {
            return TickOutcome::Idle;
        };
        if remaining == 0 {
            return TickOutcome::Idle;
        }
        let left = remaining - 1;
        self.remaining_secs = Some(left);
        if left == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running { remaining: left }
        }
    }

    /// Transition into `Submitting`.
    ///
    /// A manual trigger requires every question to be answered; a timeout
    /// trigger grades whatever was answered. State is untouched on error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SubmissionPending` while a submission is in
    /// flight, `SessionError::NotInProgress` in any other wrong phase, and
    /// `SessionError::IncompleteAnswers` for a manual submit with gaps.
    pub fn begin_submission(&mut self, trigger: SubmitTrigger) -> Result<(), SessionError> {
        match self.phase {
            Phase::InProgress => {}
            Phase::Submitting => return Err(SessionError::SubmissionPending),
            _ => return Err(SessionError::NotInProgress),
        }
        if trigger == SubmitTrigger::Manual {
            let missing = self.answers.missing_for(&self.quiz);
            if missing > 0 {
                return Err(SessionError::IncompleteAnswers { missing });
            }
        }
        self.phase = Phase::Submitting;
        Ok(())
    }

    /// Seconds the user has spent on this attempt.
    ///
    /// Timed quizzes measure against the countdown balance; untimed quizzes
    /// measure wall-clock time since `start`.
    #[must_use]
    pub fn time_spent(&self, now: DateTime<Utc>) -> u64 {
        if let (Some(total), Some(remaining)) = (self.quiz.duration_seconds(), self.remaining_secs)
        {
            return u64::from(total.saturating_sub(remaining));
        }
        let Some(started_at) = self.started_at else {
            return 0;
        };
        u64::try_from((now - started_at).num_seconds().max(0)).unwrap_or(0)
    }

    /// Store the backend's verdict and finish the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSubmissionPending` unless a submission is in
    /// flight.
    pub fn complete_submission(
        &mut self,
        result: QuizResult,
        now: DateTime<Utc>,
    ) -> Result<&QuizResult, SessionError> {
        if self.phase != Phase::Submitting {
            return Err(SessionError::NoSubmissionPending);
        }
        self.phase = Phase::Completed;
        self.completed_at = Some(now);
        self.result = Some(result);
        self.result.as_ref().ok_or(SessionError::NoSubmissionPending)
    }

    /// Roll a failed submission back to `InProgress`.
    ///
    /// Answers and the countdown balance are preserved exactly, so the
    /// attempt can be re-submitted immediately.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSubmissionPending` unless a submission is in
    /// flight.
    pub fn fail_submission(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Submitting {
            return Err(SessionError::NoSubmissionPending);
        }
        self.phase = Phase::InProgress;
        Ok(())
    }

    /// Build a fresh session for the next attempt at the same quiz.
    ///
    /// The completed session is left untouched; a retry never mutates it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` before completion and
    /// `SessionError::AttemptsExhausted` once the attempt limit is reached.
    pub fn next_attempt(&self) -> Result<QuizSession, SessionError> {
        if self.phase != Phase::Completed {
            return Err(SessionError::NotCompleted);
        }
        if let Some(max) = self.quiz.max_attempts() {
            if self.attempt_number >= max {
                return Err(SessionError::AttemptsExhausted);
            }
        }
        Ok(Self::fresh(Arc::clone(&self.quiz), self.attempt_number + 1))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id())
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("remaining_secs", &self.remaining_secs)
            .field("attempt_number", &self.attempt_number)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
