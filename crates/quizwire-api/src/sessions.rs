//! Session lifecycle endpoints.

use crate::errors::ApiError;
use crate::models::{Participant, QuizSession};
use crate::pipeline::ApiClient;

impl ApiClient {
    /// Open a new session for a published quiz.
    pub async fn create_session(&self, quiz_id: i64) -> Result<QuizSession, ApiError> {
        self.post_json("/sessions", &serde_json::json!({ "quiz_id": quiz_id }))
            .await
    }

    /// Look up a session by join code.
    pub async fn get_session(&self, code: &str) -> Result<QuizSession, ApiError> {
        self.get_json(&format!("/sessions/{code}")).await
    }

    /// Join a session as a participant.
    ///
    /// No authentication required; participants are identified by display
    /// name only.
    pub async fn join_session(&self, code: &str, name: &str) -> Result<Participant, ApiError> {
        self.post_json(
            &format!("/sessions/{code}/join"),
            &serde_json::json!({ "name": name }),
        )
        .await
    }

    /// Session results, highest score first.
    pub async fn session_results(&self, code: &str) -> Result<Vec<Participant>, ApiError> {
        self.get_json(&format!("/sessions/{code}/results")).await
    }
}
