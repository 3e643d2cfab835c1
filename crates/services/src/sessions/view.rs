use serde::Serialize;

use quiz_core::model::Quiz;

/// Render a second count as a zero-padded `MM:SS` clock label.
#[must_use]
pub fn format_clock(total_secs: u32) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Presentation-agnostic start-screen card for a quiz.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI decides how to render an unlimited attempt count or a missing
/// duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOverview {
    pub title: String,
    pub description: Option<String>,
    pub question_count: usize,
    pub duration_minutes: Option<u32>,
    pub passing_percent: u32,
    pub max_attempts: Option<u32>,
    pub instructions: Vec<String>,
}

impl QuizOverview {
    #[must_use]
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title().to_string(),
            description: quiz.description().map(str::to_string),
            question_count: quiz.question_count(),
            duration_minutes: quiz.duration_minutes(),
            passing_percent: quiz.passing_percent(),
            max_attempts: quiz.max_attempts(),
            instructions: quiz.instructions().to_vec(),
        }
    }
}
