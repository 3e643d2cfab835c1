mod answer;
mod ids;
mod quiz;
mod result;

pub use answer::AnswerSheet;
pub use ids::{ParseIdError, QuestionId, QuizId};
pub use quiz::{Question, QuestionKind, Quiz, QuizError};
pub use result::QuizResult;
