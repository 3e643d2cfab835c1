use async_trait::async_trait;
use quiz_core::model::{AnswerSheet, QuestionId, Quiz, QuizId, QuizResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Payload for one scored submission.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSubmission {
    pub answers: AnswerSheet,
    pub time_spent_secs: u64,
}

/// Repository contract for quiz definitions and scoring.
///
/// The platform owns all durable state; this trait is the only surface the
/// session layer sees.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Fetch a quiz definition by id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the id does not resolve, or other
    /// backend errors.
    async fn fetch_by_id(&self, id: QuizId) -> Result<Quiz, BackendError>;

    /// Fetch the quiz assigned to a course week.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the week has no quiz, or other
    /// backend errors.
    async fn fetch_by_week(&self, week: u32) -> Result<Quiz, BackendError>;

    /// Submit answers for scoring.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` for an unknown quiz, or other backend
    /// errors when the submission cannot be scored.
    async fn submit(
        &self,
        quiz_id: QuizId,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, BackendError>;
}

/// In-memory repository with local grading, for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryQuizRepository {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    quizzes: HashMap<QuizId, Quiz>,
    weeks: HashMap<u32, QuizId>,
    answer_keys: HashMap<QuizId, HashMap<QuestionId, String>>,
}

impl InMemoryQuizRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a quiz together with its expected answers.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Connection` if the store is poisoned.
    pub fn insert_quiz(
        &self,
        quiz: Quiz,
        answer_key: HashMap<QuestionId, String>,
    ) -> Result<(), BackendError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.answer_keys.insert(quiz.id(), answer_key);
        guard.quizzes.insert(quiz.id(), quiz);
        Ok(())
    }

    /// Store a quiz and assign it to a course week.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Connection` if the store is poisoned.
    pub fn insert_weekly_quiz(
        &self,
        week: u32,
        quiz: Quiz,
        answer_key: HashMap<QuestionId, String>,
    ) -> Result<(), BackendError> {
        let id = quiz.id();
        self.insert_quiz(quiz, answer_key)?;
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.weeks.insert(week, id);
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn fetch_by_id(&self, id: QuizId) -> Result<Quiz, BackendError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.quizzes.get(&id).cloned().ok_or(BackendError::NotFound)
    }

    async fn fetch_by_week(&self, week: u32) -> Result<Quiz, BackendError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let id = guard.weeks.get(&week).ok_or(BackendError::NotFound)?;
        guard.quizzes.get(id).cloned().ok_or(BackendError::NotFound)
    }

    #[allow(clippy::cast_precision_loss)]
    async fn submit(
        &self,
        quiz_id: QuizId,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, BackendError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let quiz = guard.quizzes.get(&quiz_id).ok_or(BackendError::NotFound)?;
        let key = guard
            .answer_keys
            .get(&quiz_id)
            .ok_or(BackendError::NotFound)?;

        let total = quiz.question_count();
        let correct = quiz
            .questions()
            .iter()
            .filter(|q| {
                key.get(&q.id())
                    .is_some_and(|expected| submission.answers.response(q.id()) == Some(expected))
            })
            .count();

        // Rounded to two decimals so equality assertions stay stable.
        let raw = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        let score_percent = (raw * 100.0).round() / 100.0;

        Ok(QuizResult {
            score_percent,
            passed: score_percent >= f64::from(quiz.passing_percent()),
        })
    }
}
