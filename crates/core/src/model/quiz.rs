use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("duration must be > 0 minutes")]
    InvalidDuration,

    #[error("passing percent must be <= 100")]
    InvalidPassingPercent,

    #[error("max attempts must be > 0")]
    InvalidMaxAttempts,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("single-choice question must offer at least one option")]
    NoOptions,
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick one of the offered options.
    SingleChoice,
    /// Free-form text response.
    FreeText,
}

/// A single quiz question.
///
/// Single-choice questions carry an ordered list of option strings;
/// free-text questions have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    kind: QuestionKind,
    options: Vec<String>,
}

impl Question {
    /// Creates a single-choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPrompt` for a blank prompt and
    /// `QuizError::NoOptions` when no options are offered.
    pub fn single_choice(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuizError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuizError::EmptyPrompt);
        }
        if options.is_empty() {
            return Err(QuizError::NoOptions);
        }
        Ok(Self {
            id,
            prompt,
            kind: QuestionKind::SingleChoice,
            options,
        })
    }

    /// Creates a free-text question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPrompt` for a blank prompt.
    pub fn free_text(id: QuestionId, prompt: impl Into<String>) -> Result<Self, QuizError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuizError::EmptyPrompt);
        }
        Ok(Self {
            id,
            prompt,
            kind: QuestionKind::FreeText,
            options: Vec::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Answer options, in presentation order. Empty for free-text questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A quiz definition as served by the platform.
///
/// Immutable for the lifetime of a session; sessions reference it, never
/// copy or mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: Option<String>,
    questions: Vec<Question>,
    duration_minutes: Option<u32>,
    passing_percent: u32,
    max_attempts: Option<u32>,
    instructions: Vec<String>,
}

impl Quiz {
    /// Creates a validated quiz.
    ///
    /// `duration_minutes` of `None` means the quiz is untimed;
    /// `max_attempts` of `None` means attempts are unlimited.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` when the title is blank, no questions are given,
    /// a question id repeats, or a numeric bound is out of range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        description: Option<String>,
        questions: Vec<Question>,
        duration_minutes: Option<u32>,
        passing_percent: u32,
        max_attempts: Option<u32>,
        instructions: Vec<String>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        let mut seen = std::collections::HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuizError::DuplicateQuestionId(question.id()));
            }
        }
        if duration_minutes == Some(0) {
            return Err(QuizError::InvalidDuration);
        }
        if passing_percent > 100 {
            return Err(QuizError::InvalidPassingPercent);
        }
        if max_attempts == Some(0) {
            return Err(QuizError::InvalidMaxAttempts);
        }

        Ok(Self {
            id,
            title,
            description,
            questions,
            duration_minutes,
            passing_percent,
            max_attempts,
            instructions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Questions in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Question at `index`, if in range.
    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    /// Full countdown length in seconds, when the quiz is timed.
    #[must_use]
    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration_minutes.map(|m| m.saturating_mul(60))
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.duration_minutes.is_some()
    }

    /// Minimum score, as a percentage, required to pass.
    #[must_use]
    pub fn passing_percent(&self) -> u32 {
        self.passing_percent
    }

    #[must_use]
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    #[must_use]
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
