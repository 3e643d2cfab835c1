#![forbid(unsafe_code)]

pub mod error;
pub mod notify;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::SessionError;
pub use notify::{MemoryNotifier, Notification, NotificationSink, NullNotifier};

pub use sessions::{
    Countdown, Phase, QuizOverview, QuizSession, SessionFlowService, SessionProgress,
    SubmitTrigger, TickOutcome,
};
