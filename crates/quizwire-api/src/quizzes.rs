//! Quiz and question management endpoints.

use crate::errors::ApiError;
use crate::models::{Question, QuestionDraft, Quiz, QuizDraft};
use crate::pipeline::ApiClient;

impl ApiClient {
    /// List the caller's quizzes.
    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
        self.get_json("/quizzes/from-user").await
    }

    /// Fetch one quiz with its questions.
    pub async fn get_quiz(&self, quiz_id: i64) -> Result<Quiz, ApiError> {
        self.get_json(&format!("/quizzes/{quiz_id}")).await
    }

    /// Create an empty quiz; questions are added one at a time afterwards.
    pub async fn create_quiz(
        &self,
        title: &str,
        description: &str,
        creator_id: i64,
    ) -> Result<Quiz, ApiError> {
        self.post_json(
            "/quizzes/create",
            &serde_json::json!({
                "title": title,
                "description": description,
                "creator_id": creator_id,
            }),
        )
        .await
    }

    /// Update a quiz's title, description, and published flag.
    ///
    /// Publishing is part of this payload: send the draft with
    /// `is_published: true` to make the quiz hostable.
    pub async fn update_quiz(&self, quiz_id: i64, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        self.put_json(&format!("/quizzes/{quiz_id}"), draft).await
    }

    /// Delete a quiz and everything under it.
    pub async fn delete_quiz(&self, quiz_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/quizzes/{quiz_id}")).await
    }

    /// Append a question to a quiz.
    pub async fn add_question(
        &self,
        quiz_id: i64,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        self.post_json(&format!("/quizzes/{quiz_id}/questions"), draft)
            .await
    }

    /// Replace one question.
    pub async fn update_question(
        &self,
        quiz_id: i64,
        question_id: i64,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        self.put_json(&format!("/quizzes/{quiz_id}/questions/{question_id}"), draft)
            .await
    }

    /// Remove one question.
    pub async fn delete_question(&self, quiz_id: i64, question_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/quizzes/{quiz_id}/questions/{question_id}"))
            .await
    }
}
