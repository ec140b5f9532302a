//! # quizwire-api
//!
//! Authenticated HTTP access to the Quizwire backend.
//!
//! [`ApiClient`] is the request pipeline: it attaches the current bearer
//! token per request, and on a 401 it refreshes the token through the
//! shared coordinator and retries the request exactly once. REST wrappers
//! for quizzes, sessions, and media uploads sit on top of it.
//!
//! [`QuizClient`] bundles configuration, auth, the pipeline, and realtime
//! channel construction behind one constructor so every piece shares the
//! same cookie-enabled HTTP client.

#![deny(unsafe_code)]

pub mod errors;
pub mod facade;
pub mod media;
pub mod models;
pub mod pipeline;
pub mod quizzes;
pub mod sessions;

pub use errors::ApiError;
pub use facade::QuizClient;
pub use models::{
    MediaType, MediaUpload, Participant, Question, QuestionDraft, QuestionType, Quiz, QuizDraft,
    QuizSession, SessionStatus,
};
pub use pipeline::ApiClient;
