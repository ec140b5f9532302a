//! Backend domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a question is answered and graded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Pick one of the listed options.
    MultipleChoice,
    /// True or false.
    TrueFalse,
    /// Free text, manually scored by the host.
    OpenEnded,
    /// Short free text, auto-graded against the correct answer.
    ShortAnswer,
    /// Numeric guess, scored by proximity.
    Estimation,
}

/// Kind of media attached to a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Static image.
    Image,
    /// Audio clip.
    Audio,
    /// Video clip.
    Video,
    /// YouTube link.
    Youtube,
    /// Spotify link.
    Spotify,
}

/// Lifecycle of a quiz session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Lobby open, waiting for participants.
    Waiting,
    /// Quiz in progress.
    Active,
    /// Quiz completed.
    Ended,
}

fn default_points() -> i64 {
    10
}

fn default_time_limit() -> i64 {
    30
}

/// One question within a quiz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Server-assigned ID.
    pub id: i64,
    /// Owning quiz.
    pub quiz_id: i64,
    /// Position within the quiz.
    pub order: i32,
    /// Question kind.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Question text.
    pub content: String,
    /// URL to a media file or external link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Kind of the attached media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Options for multiple-choice questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Correct answer for auto-graded questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// Points for a correct answer.
    #[serde(default = "default_points")]
    pub points: i64,
    /// Answer time limit in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit: i64,
}

/// A quiz: an ordered collection of questions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Server-assigned ID.
    pub id: i64,
    /// Title shown to participants.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning user.
    pub creator_id: i64,
    /// Whether the quiz can be hosted.
    #[serde(default)]
    pub is_published: bool,
    /// Questions in play order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A live (or finished) run of a quiz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    /// Server-assigned ID.
    pub id: i64,
    /// Quiz being played.
    pub quiz_id: i64,
    /// Hosting user.
    pub host_id: i64,
    /// Five-character join code.
    pub code: String,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Index of the active question.
    #[serde(default)]
    pub current_question_index: i32,
}

/// A player in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Server-assigned ID.
    pub id: i64,
    /// Session joined.
    pub session_id: i64,
    /// Display name.
    pub name: String,
    /// Accumulated score.
    #[serde(default)]
    pub total_score: i64,
}

/// Payload for creating or updating a question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    /// Position within the quiz.
    pub order: i32,
    /// Question kind.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Question text.
    pub content: String,
    /// URL to a media file or external link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Kind of the attached media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Options for multiple-choice questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Correct answer for auto-graded questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// Points for a correct answer.
    #[serde(default = "default_points")]
    pub points: i64,
    /// Answer time limit in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit: i64,
}

/// Payload for updating a quiz's metadata.
///
/// Questions are managed through their own endpoints; publishing happens by
/// sending this payload with `is_published: true`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDraft {
    /// Title shown to participants.
    pub title: String,
    /// Description shown in the lobby.
    pub description: String,
    /// Whether the quiz can be hosted.
    pub is_published: bool,
}

/// Response to a media upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
    /// Public URL of the stored file.
    pub url: String,
    /// Detected media kind, when the server classifies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
