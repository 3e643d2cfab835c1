use std::sync::Arc;

use backend::repository::{QuizRepository, QuizSubmission};
use quiz_core::Clock;
use quiz_core::model::{QuizId, QuizResult};

use super::service::{QuizSession, SubmitTrigger, TickOutcome};
use super::timer::Countdown;
use crate::error::SessionError;
use crate::notify::NotificationSink;

/// Orchestrates quiz loading, submission, and retry around a session.
#[derive(Clone)]
pub struct SessionFlowService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    notifier: Arc<dyn NotificationSink>,
}

impl SessionFlowService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            notifier,
        }
    }

    /// Fetch a quiz by id and wrap it in a fresh, not-yet-started session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` when the quiz cannot be fetched; a
    /// `NotFound` is fatal for the session, which is never constructed.
    pub async fn load_by_id(&self, id: QuizId) -> Result<QuizSession, SessionError> {
        let quiz = self.quizzes.fetch_by_id(id).await?;
        Ok(QuizSession::new(Arc::new(quiz)))
    }

    /// Fetch the quiz for a course week and wrap it in a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` when the quiz cannot be fetched.
    pub async fn load_by_week(&self, week: u32) -> Result<QuizSession, SessionError> {
        let quiz = self.quizzes.fetch_by_week(week).await?;
        Ok(QuizSession::new(Arc::new(quiz)))
    }

    /// Start the attempt on the services clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` outside `NotStarted`.
    pub fn start(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        session.start(self.clock.now())
    }

    /// Submit the current attempt for scoring.
    ///
    /// Holds the session exclusively for the whole call, so no tick can
    /// observe or mutate it while the request is in flight. On success the
    /// session completes and the user is notified of the verdict. On a
    /// backend failure the session rolls back to `InProgress` with answers
    /// and countdown balance intact, the failure is surfaced as a toast, and
    /// the attempt can be re-submitted immediately. The phase always
    /// resolves one way or the other.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IncompleteAnswers` for a manual submit with
    /// gaps (before any network call), phase errors from the session, or
    /// `SessionError::Backend` when the repository call fails.
    pub async fn submit(
        &self,
        session: &mut QuizSession,
        trigger: SubmitTrigger,
    ) -> Result<QuizResult, SessionError> {
        session.begin_submission(trigger)?;

        let submission = QuizSubmission {
            answers: session.answers().clone(),
            time_spent_secs: session.time_spent(self.clock.now()),
        };

        match self.quizzes.submit(session.quiz().id(), &submission).await {
            Ok(result) => {
                let result = session
                    .complete_submission(result, self.clock.now())?
                    .clone();
                if result.passed {
                    self.notifier.success("Quiz passed!");
                } else {
                    self.notifier.success("Quiz finished");
                }
                Ok(result)
            }
            Err(err) => {
                session.fail_submission()?;
                self.notifier.error("Quiz submission failed");
                Err(SessionError::Backend(err))
            }
        }
    }

    /// Drive the countdown until it expires, auto-submitting whatever was
    /// answered at that point.
    ///
    /// Untimed sessions return `Ok(None)` immediately. The loop ends when
    /// the ticker is stopped (`Ok(None)`) or the countdown expires, in which
    /// case the ticker is stopped and the timeout submission result is
    /// returned.
    ///
    /// # Errors
    ///
    /// Propagates submission errors from the timeout auto-submit; the
    /// session is then back `InProgress` with zero seconds left and can be
    /// re-submitted manually.
    pub async fn run_countdown(
        &self,
        session: &mut QuizSession,
        countdown: &mut Countdown,
    ) -> Result<Option<QuizResult>, SessionError> {
        if session.remaining_seconds().is_none() {
            return Ok(None);
        }
        while countdown.tick().await.is_some() {
            match session.tick() {
                TickOutcome::Running { .. } => {}
                TickOutcome::Idle => break,
                TickOutcome::Expired => {
                    countdown.stop();
                    let result = self.submit(session, SubmitTrigger::Timeout).await?;
                    return Ok(Some(result));
                }
            }
        }
        Ok(None)
    }

    /// Start a fresh attempt at the same quiz.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AttemptsExhausted` when the attempt limit is
    /// reached, leaving the completed session untouched, and
    /// `SessionError::NotCompleted` before completion.
    pub fn retry(&self, session: &QuizSession) -> Result<QuizSession, SessionError> {
        session.next_attempt()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemoryNotifier, Notification};
    use crate::sessions::service::Phase;
    use async_trait::async_trait;
    use backend::repository::BackendError;
    use quiz_core::model::{Question, QuestionId, Quiz};
    use quiz_core::time::fixed_clock;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn build_quiz(duration_minutes: Option<u32>) -> Quiz {
        let questions = (1..=3)
            .map(|id| {
                Question::single_choice(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["A".into(), "B".into(), "C".into()],
                )
                .unwrap()
            })
            .collect();
        Quiz::new(
            QuizId::new(1),
            "Scripted",
            None,
            questions,
            duration_minutes,
            70,
            None,
            Vec::new(),
        )
        .unwrap()
    }

    /// Repository stub that replays scripted submit responses and records
    /// every submission it receives.
    struct ScriptedRepository {
        quiz: Quiz,
        responses: Mutex<VecDeque<Result<QuizResult, BackendError>>>,
        submissions: Mutex<Vec<QuizSubmission>>,
    }

    impl ScriptedRepository {
        fn new(
            quiz: Quiz,
            responses: Vec<Result<QuizResult, BackendError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                quiz,
                responses: Mutex::new(responses.into()),
                submissions: Mutex::new(Vec::new()),
            })
        }

        fn submissions(&self) -> Vec<QuizSubmission> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QuizRepository for ScriptedRepository {
        async fn fetch_by_id(&self, id: QuizId) -> Result<Quiz, BackendError> {
            if id == self.quiz.id() {
                Ok(self.quiz.clone())
            } else {
                Err(BackendError::NotFound)
            }
        }

        async fn fetch_by_week(&self, _week: u32) -> Result<Quiz, BackendError> {
            Ok(self.quiz.clone())
        }

        async fn submit(
            &self,
            _quiz_id: QuizId,
            submission: &QuizSubmission,
        ) -> Result<QuizResult, BackendError> {
            self.submissions.lock().unwrap().push(submission.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(BackendError::NotFound))
        }
    }

    fn flow(repo: Arc<ScriptedRepository>, notifier: MemoryNotifier) -> SessionFlowService {
        SessionFlowService::new(fixed_clock(), repo, Arc::new(notifier))
    }

    #[tokio::test]
    async fn load_by_id_surfaces_not_found_without_a_session() {
        let repo = ScriptedRepository::new(build_quiz(None), Vec::new());
        let service = flow(repo, MemoryNotifier::new());

        let err = service.load_by_id(QuizId::new(404)).await.unwrap_err();
        assert!(matches!(err, SessionError::Backend(BackendError::NotFound)));
    }

    #[tokio::test]
    async fn incomplete_manual_submit_makes_no_network_call() {
        let repo = ScriptedRepository::new(
            build_quiz(None),
            vec![Ok(QuizResult {
                score_percent: 66.0,
                passed: false,
            })],
        );
        let notifier = MemoryNotifier::new();
        let service = flow(Arc::clone(&repo), notifier.clone());

        let mut session = service.load_by_id(QuizId::new(1)).await.unwrap();
        service.start(&mut session).unwrap();
        session.select_answer(QuestionId::new(1), "A");
        session.select_answer(QuestionId::new(2), "B");

        let err = service
            .submit(&mut session, SubmitTrigger::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::IncompleteAnswers { missing: 1 }));
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(repo.submissions().is_empty());

        session.select_answer(QuestionId::new(3), "C");
        let result = service
            .submit(&mut session, SubmitTrigger::Manual)
            .await
            .unwrap();
        assert_eq!(result.score_percent, 66.0);
        assert!(!result.passed);
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(
            notifier.messages(),
            vec![Notification::Success("Quiz finished".into())]
        );
    }

    #[tokio::test]
    async fn failed_submission_reverts_then_succeeds_on_retry() {
        let repo = ScriptedRepository::new(
            build_quiz(None),
            vec![
                Err(BackendError::Connection("socket closed".into())),
                Ok(QuizResult {
                    score_percent: 100.0,
                    passed: true,
                }),
            ],
        );
        let notifier = MemoryNotifier::new();
        let service = flow(Arc::clone(&repo), notifier.clone());

        let mut session = service.load_by_id(QuizId::new(1)).await.unwrap();
        service.start(&mut session).unwrap();
        for id in 1..=3 {
            session.select_answer(QuestionId::new(id), "A");
        }
        let answers_before = session.answers().clone();

        let err = service
            .submit(&mut session, SubmitTrigger::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Backend(_)));
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.answers(), &answers_before);

        let result = service
            .submit(&mut session, SubmitTrigger::Manual)
            .await
            .unwrap();
        assert!(result.passed);
        assert_eq!(
            notifier.messages(),
            vec![
                Notification::Error("Quiz submission failed".into()),
                Notification::Success("Quiz passed!".into()),
            ]
        );
    }

    #[tokio::test]
    async fn timeout_submission_reports_elapsed_time_and_empty_answers() {
        let repo = ScriptedRepository::new(
            build_quiz(Some(1)),
            vec![Ok(QuizResult {
                score_percent: 0.0,
                passed: false,
            })],
        );
        let service = flow(Arc::clone(&repo), MemoryNotifier::new());

        let mut session = service.load_by_id(QuizId::new(1)).await.unwrap();
        service.start(&mut session).unwrap();
        while session.tick() != TickOutcome::Expired {}

        service
            .submit(&mut session, SubmitTrigger::Timeout)
            .await
            .unwrap();

        let recorded = repo.submissions();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].answers.is_empty());
        assert_eq!(recorded[0].time_spent_secs, 60);
    }

    #[tokio::test]
    async fn retry_is_rejected_when_attempts_run_out() {
        let quiz = {
            let questions = vec![
                Question::free_text(QuestionId::new(1), "Only question").unwrap(),
            ];
            Quiz::new(
                QuizId::new(1),
                "One shot",
                None,
                questions,
                None,
                50,
                Some(1),
                Vec::new(),
            )
            .unwrap()
        };
        let repo = ScriptedRepository::new(
            quiz,
            vec![Ok(QuizResult {
                score_percent: 40.0,
                passed: false,
            })],
        );
        let service = flow(repo, MemoryNotifier::new());

        let mut session = service.load_by_id(QuizId::new(1)).await.unwrap();
        service.start(&mut session).unwrap();
        session.select_answer(QuestionId::new(1), "because");
        service
            .submit(&mut session, SubmitTrigger::Manual)
            .await
            .unwrap();

        let err = service.retry(&session).unwrap_err();
        assert!(matches!(err, SessionError::AttemptsExhausted));
        assert!(session.is_complete());
    }
}
