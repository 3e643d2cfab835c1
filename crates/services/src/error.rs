//! Shared error types for the services crate.

use thiserror::Error;

use backend::repository::BackendError;

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("session is not in progress")]
    NotInProgress,

    #[error("a submission is already pending")]
    SubmissionPending,

    #[error("no submission is pending")]
    NoSubmissionPending,

    #[error("session is not completed")]
    NotCompleted,

    #[error("{missing} question(s) still unanswered")]
    IncompleteAnswers { missing: usize },

    #[error("no attempts remaining for this quiz")]
    AttemptsExhausted,

    #[error(transparent)]
    Backend(#[from] BackendError),
}
