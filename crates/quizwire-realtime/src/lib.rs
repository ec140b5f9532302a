//! # quizwire-realtime
//!
//! Reconnecting WebSocket channel for live quiz sessions.
//!
//! A [`RealtimeChannel`] owns one session connection at a time. Incoming
//! frames are parsed into typed [`ServerEvent`]s and dispatched to handlers
//! registered per [`EventKind`]; handler registrations survive reconnects.
//!
//! Reconnection uses a fixed delay and a bounded attempt count. When the
//! attempts are exhausted the channel closes and synthesizes a
//! [`ServerEvent::ConnectionLost`] through the normal dispatch path, so
//! callers observe it exactly like a server-sent event.

#![deny(unsafe_code)]

pub mod channel;
pub mod messages;
pub mod registry;

pub use channel::{ChannelState, RealtimeChannel, RealtimeConfig, SessionIdentity};
pub use messages::{ClientCommand, EventKind, ServerEvent, parse_frame};
pub use registry::{Handler, HandlerId, HandlerRegistry};
