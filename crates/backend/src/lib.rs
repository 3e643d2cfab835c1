#![forbid(unsafe_code)]

pub mod http;
pub mod repository;

pub use http::{BackendConfig, HttpQuizRepository};
pub use repository::{BackendError, InMemoryQuizRepository, QuizRepository, QuizSubmission};
