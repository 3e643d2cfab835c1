use std::collections::HashMap;

use crate::model::ids::QuestionId;
use crate::model::quiz::Quiz;

/// The user's current responses, keyed by question id.
///
/// Recording twice for the same question keeps only the latest value;
/// entries are never removed for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: HashMap<QuestionId, String>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a response, overwriting any prior value for the question.
    pub fn record(&mut self, question_id: QuestionId, value: impl Into<String>) {
        self.entries.insert(question_id, value.into());
    }

    /// The current response for a question, if any.
    #[must_use]
    pub fn response(&self, question_id: QuestionId) -> Option<&str> {
        self.entries.get(&question_id).map(String::as_str)
    }

    #[must_use]
    pub fn answered(&self, question_id: QuestionId) -> bool {
        self.entries.contains_key(&question_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of quiz questions with no recorded response.
    #[must_use]
    pub fn missing_for(&self, quiz: &Quiz) -> usize {
        quiz.questions()
            .iter()
            .filter(|q| !self.answered(q.id()))
            .count()
    }

    /// True when every question of the quiz has a response.
    #[must_use]
    pub fn is_complete_for(&self, quiz: &Quiz) -> bool {
        self.missing_for(quiz) == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &str)> {
        self.entries.iter().map(|(id, v)| (*id, v.as_str()))
    }
}
