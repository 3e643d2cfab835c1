use std::collections::HashMap;
use std::env;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use quiz_core::model::{Question, QuestionId, Quiz, QuizId, QuizResult};

use crate::repository::{BackendError, QuizRepository, QuizSubmission};

/// Base-URL configuration for the platform API.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:3000/api";

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `QUIZ_API_URL`, falling back to the local API.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("QUIZ_API_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());
        Self { base_url }
    }
}

/// REST adapter for the platform's quiz endpoints.
#[derive(Clone)]
pub struct HttpQuizRepository {
    client: Client,
    base_url: String,
}

impl HttpQuizRepository {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn fetch_quiz(&self, path: String) -> Result<Quiz, BackendError> {
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let response = check_status(response)?;
        let dto: QuizDto = response
            .json()
            .await
            .map_err(|e| BackendError::Serialization(e.to_string()))?;
        dto.into_quiz()
    }
}

fn check_status(response: Response) -> Result<Response, BackendError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound);
    }
    if !response.status().is_success() {
        return Err(BackendError::Status(response.status().as_u16()));
    }
    Ok(response)
}

#[async_trait]
impl QuizRepository for HttpQuizRepository {
    async fn fetch_by_id(&self, id: QuizId) -> Result<Quiz, BackendError> {
        self.fetch_quiz(format!("quiz/{id}")).await
    }

    async fn fetch_by_week(&self, week: u32) -> Result<Quiz, BackendError> {
        self.fetch_quiz(format!("quiz/semaine/{week}")).await
    }

    async fn submit(
        &self,
        quiz_id: QuizId,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, BackendError> {
        let payload = SubmitRequest::from_submission(submission);
        let response = self
            .client
            .post(self.url(&format!("quiz/{quiz_id}/soumettre")))
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let response = check_status(response)?;
        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Serialization(e.to_string()))?;
        Ok(QuizResult {
            score_percent: body.score,
            passed: body.passed,
        })
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//
// Field names follow the platform's JSON, so the adapter can deserialize the
// API responses as-is and convert into the domain model at this boundary.

#[derive(Debug, Deserialize)]
struct QuizDto {
    id: u64,
    titre: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    duree: Option<u32>,
    note_minimale: u32,
    #[serde(default)]
    max_tentatives: Option<u32>,
    #[serde(default)]
    instructions: Vec<String>,
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    id: u64,
    question: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SubmitRequest {
    answers: HashMap<String, String>,
    time_spent: u64,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
    passed: bool,
}

impl QuizDto {
    fn into_quiz(self) -> Result<Quiz, BackendError> {
        let mut questions = Vec::with_capacity(self.questions.len());
        for dto in self.questions {
            questions.push(dto.into_question()?);
        }
        Quiz::new(
            QuizId::new(self.id),
            self.titre,
            self.description,
            questions,
            self.duree,
            self.note_minimale,
            self.max_tentatives,
            self.instructions,
        )
        .map_err(|e| BackendError::Serialization(e.to_string()))
    }
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, BackendError> {
        let id = QuestionId::new(self.id);
        let question = match self.kind.as_str() {
            "qcm" => Question::single_choice(id, self.question, self.options),
            "texte" => Question::free_text(id, self.question),
            other => {
                return Err(BackendError::Serialization(format!(
                    "unknown question type: {other}"
                )));
            }
        };
        question.map_err(|e| BackendError::Serialization(e.to_string()))
    }
}

impl SubmitRequest {
    fn from_submission(submission: &QuizSubmission) -> Self {
        // JSON object keys are strings, so question ids are rendered here.
        let answers = submission
            .answers
            .iter()
            .map(|(id, value)| (id.to_string(), value.to_string()))
            .collect();
        Self {
            answers,
            time_spent: submission.time_spent_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerSheet, QuestionKind};

    #[test]
    fn decodes_the_platform_quiz_payload() {
        let payload = serde_json::json!({
            "id": 12,
            "titre": "Quiz de la semaine 3",
            "description": "Contrôle continu",
            "duree": 15,
            "note_minimale": 70,
            "max_tentatives": 2,
            "instructions": ["Une seule réponse par question"],
            "questions": [
                {
                    "id": 1,
                    "question": "2 + 2 ?",
                    "type": "qcm",
                    "options": ["3", "4", "5"]
                },
                {
                    "id": 2,
                    "question": "Expliquez votre raisonnement",
                    "type": "texte"
                }
            ]
        });

        let dto: QuizDto = serde_json::from_value(payload).unwrap();
        let quiz = dto.into_quiz().unwrap();

        assert_eq!(quiz.id(), QuizId::new(12));
        assert_eq!(quiz.title(), "Quiz de la semaine 3");
        assert_eq!(quiz.duration_minutes(), Some(15));
        assert_eq!(quiz.passing_percent(), 70);
        assert_eq!(quiz.max_attempts(), Some(2));
        assert_eq!(quiz.question_count(), 2);
        assert_eq!(quiz.questions()[0].kind(), QuestionKind::SingleChoice);
        assert_eq!(quiz.questions()[1].kind(), QuestionKind::FreeText);
    }

    #[test]
    fn missing_optional_fields_mean_untimed_and_unlimited() {
        let payload = serde_json::json!({
            "id": 1,
            "titre": "Libre",
            "note_minimale": 50,
            "questions": [
                { "id": 1, "question": "Q1", "type": "texte" }
            ]
        });

        let quiz: Quiz = serde_json::from_value::<QuizDto>(payload)
            .unwrap()
            .into_quiz()
            .unwrap();
        assert!(!quiz.is_timed());
        assert_eq!(quiz.max_attempts(), None);
        assert!(quiz.instructions().is_empty());
    }

    #[test]
    fn unknown_question_type_is_a_serialization_error() {
        let payload = serde_json::json!({
            "id": 1,
            "titre": "Mauvais type",
            "note_minimale": 50,
            "questions": [
                { "id": 1, "question": "Q1", "type": "vrai_faux" }
            ]
        });

        let err = serde_json::from_value::<QuizDto>(payload)
            .unwrap()
            .into_quiz()
            .unwrap_err();
        assert!(matches!(err, BackendError::Serialization(_)));
    }

    #[test]
    fn submission_payload_uses_string_keys_and_time_spent() {
        let mut answers = AnswerSheet::new();
        answers.record(QuestionId::new(1), "4");
        let request = SubmitRequest::from_submission(&QuizSubmission {
            answers,
            time_spent_secs: 87,
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["answers"]["1"], "4");
        assert_eq!(value["time_spent"], 87);
    }
}
