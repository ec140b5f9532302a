//! # quizwire-settings
//!
//! Client configuration for the Quizwire live-quiz platform.
//!
//! Configuration is resolved in two layers (in priority order):
//! 1. **Compiled defaults** — [`ClientConfig::default()`]
//! 2. **Environment variables** — `QUIZWIRE_*` overrides
//!
//! Invalid environment values are logged and ignored rather than failing
//! startup.

#![deny(unsafe_code)]

pub mod config;

pub use config::ClientConfig;
