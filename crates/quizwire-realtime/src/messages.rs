//! Session wire protocol.
//!
//! Every frame is a flat JSON object tagged by `"type"`. Commands flow
//! client-to-server, events server-to-client. [`ServerEvent::ConnectionLost`]
//! is the one event never sent by the server: the channel synthesizes it
//! locally when reconnection gives up.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Commands (client → server)
// ─────────────────────────────────────────────────────────────────────────────

/// Commands sent over a session connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Participant submits an answer to the active question.
    SubmitAnswer {
        /// Question being answered.
        question_id: String,
        /// The answer payload; shape depends on the question type.
        answer: Value,
    },

    /// Host advances the session to the next question.
    NextQuestion,

    /// Host ends the session.
    EndSession,

    /// Host manually scores an open-ended answer.
    ScoreAnswer {
        /// Participant whose answer is scored.
        participant_id: String,
        /// Question the answer belongs to.
        question_id: String,
        /// Points awarded.
        score: i64,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Events (server → client)
// ─────────────────────────────────────────────────────────────────────────────

/// Events received over a session connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A participant joined the session.
    ParticipantJoined {
        /// New participant's ID.
        participant_id: String,
    },

    /// The host started a question.
    QuestionStart {
        /// Question payload as sent by the server.
        question: Value,
    },

    /// A participant submitted an answer (delivered to the host).
    AnswerSubmitted {
        /// Submitting participant.
        participant_id: String,
        /// Question answered.
        question_id: String,
    },

    /// The server acknowledged this client's answer.
    AnswerReceived {
        /// Question the acknowledgment is for.
        question_id: String,
    },

    /// Updated standings for the session.
    LeaderboardUpdate {
        /// Leaderboard payload as sent by the server.
        leaderboard: Value,
    },

    /// The session ended.
    SessionEnded,

    /// Reconnection attempts were exhausted. Synthesized locally.
    ConnectionLost,
}

impl ServerEvent {
    /// The kind tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ParticipantJoined { .. } => EventKind::ParticipantJoined,
            Self::QuestionStart { .. } => EventKind::QuestionStart,
            Self::AnswerSubmitted { .. } => EventKind::AnswerSubmitted,
            Self::AnswerReceived { .. } => EventKind::AnswerReceived,
            Self::LeaderboardUpdate { .. } => EventKind::LeaderboardUpdate,
            Self::SessionEnded => EventKind::SessionEnded,
            Self::ConnectionLost => EventKind::ConnectionLost,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Fieldless mirror of the [`ServerEvent`] tags, used as registry keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `participant_joined`
    ParticipantJoined,
    /// `question_start`
    QuestionStart,
    /// `answer_submitted`
    AnswerSubmitted,
    /// `answer_received`
    AnswerReceived,
    /// `leaderboard_update`
    LeaderboardUpdate,
    /// `session_ended`
    SessionEnded,
    /// `connection_lost`
    ConnectionLost,
}

impl EventKind {
    /// All kinds, in tag order.
    pub const ALL: [Self; 7] = [
        Self::ParticipantJoined,
        Self::QuestionStart,
        Self::AnswerSubmitted,
        Self::AnswerReceived,
        Self::LeaderboardUpdate,
        Self::SessionEnded,
        Self::ConnectionLost,
    ];

    /// The wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParticipantJoined => "participant_joined",
            Self::QuestionStart => "question_start",
            Self::AnswerSubmitted => "answer_submitted",
            Self::AnswerReceived => "answer_received",
            Self::LeaderboardUpdate => "leaderboard_update",
            Self::SessionEnded => "session_ended",
            Self::ConnectionLost => "connection_lost",
        }
    }

    /// Look up a kind by wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse an inbound text frame.
///
/// - `Ok(Some(event))` — a recognized, well-formed event
/// - `Ok(None)` — well-formed JSON with an unknown `type` tag; dropped
///   silently for forward compatibility
/// - `Err(_)` — unparseable JSON, a missing/non-string `type`, or a known
///   tag whose payload fails to deserialize; callers log and keep the
///   connection open
pub fn parse_frame(raw: &str) -> Result<Option<ServerEvent>, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    let Some(tag) = value.get("type").and_then(Value::as_str) else {
        return Err(serde_json::Error::custom("frame has no string `type` tag"));
    };
    if EventKind::from_tag(tag).is_none() {
        return Ok(None);
    }
    serde_json::from_value::<ServerEvent>(value).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── command serialization ───────────────────────────────────────

    #[test]
    fn submit_answer_wire_shape() {
        let cmd = ClientCommand::SubmitAnswer {
            question_id: "q1".to_string(),
            answer: json!(2),
        };
        let wire: Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            wire,
            json!({"type": "submit_answer", "question_id": "q1", "answer": 2})
        );
    }

    #[test]
    fn next_question_wire_shape() {
        let wire: Value = serde_json::to_value(ClientCommand::NextQuestion).unwrap();
        assert_eq!(wire, json!({"type": "next_question"}));
    }

    #[test]
    fn end_session_wire_shape() {
        let wire: Value = serde_json::to_value(ClientCommand::EndSession).unwrap();
        assert_eq!(wire, json!({"type": "end_session"}));
    }

    #[test]
    fn score_answer_wire_shape() {
        let cmd = ClientCommand::ScoreAnswer {
            participant_id: "p7".to_string(),
            question_id: "q3".to_string(),
            score: 15,
        };
        let wire: Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            wire,
            json!({
                "type": "score_answer",
                "participant_id": "p7",
                "question_id": "q3",
                "score": 15
            })
        );
    }

    #[test]
    fn free_text_answer_payload() {
        let cmd = ClientCommand::SubmitAnswer {
            question_id: "q2".to_string(),
            answer: json!("the mitochondria"),
        };
        let wire: Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(wire["answer"], "the mitochondria");
    }

    // ── event kinds ─────────────────────────────────────────────────

    #[test]
    fn kind_tag_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_tag(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_tag_has_no_kind() {
        assert_eq!(EventKind::from_tag("quiz_started"), None);
        assert_eq!(EventKind::from_tag(""), None);
    }

    #[test]
    fn event_kind_matches_serialized_tag() {
        let event = ServerEvent::AnswerReceived {
            question_id: "q1".to_string(),
        };
        let wire: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["type"], event.kind().as_str());
    }

    // ── parse_frame ─────────────────────────────────────────────────

    #[test]
    fn parse_participant_joined() {
        let frame = r#"{"type":"participant_joined","participant_id":"p1"}"#;
        let event = parse_frame(frame).unwrap().unwrap();
        assert_eq!(
            event,
            ServerEvent::ParticipantJoined {
                participant_id: "p1".to_string()
            }
        );
    }

    #[test]
    fn parse_question_start_keeps_payload() {
        let frame = r#"{"type":"question_start","question":{"id":"q1","content":"2+2?"}}"#;
        let event = parse_frame(frame).unwrap().unwrap();
        match event {
            ServerEvent::QuestionStart { question } => {
                assert_eq!(question["content"], "2+2?");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn parse_session_ended_unit_event() {
        let event = parse_frame(r#"{"type":"session_ended"}"#).unwrap().unwrap();
        assert_eq!(event, ServerEvent::SessionEnded);
    }

    #[test]
    fn parse_unknown_type_dropped_silently() {
        let result = parse_frame(r#"{"type":"quiz_started","quiz_id":1}"#).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn parse_invalid_json_is_error() {
        assert!(parse_frame("not json at all").is_err());
    }

    #[test]
    fn parse_missing_type_is_error() {
        assert!(parse_frame(r#"{"participant_id":"p1"}"#).is_err());
    }

    #[test]
    fn parse_non_string_type_is_error() {
        assert!(parse_frame(r#"{"type":42}"#).is_err());
    }

    #[test]
    fn parse_known_tag_bad_payload_is_error() {
        // participant_joined requires participant_id
        assert!(parse_frame(r#"{"type":"participant_joined"}"#).is_err());
    }

    #[test]
    fn leaderboard_event_roundtrip() {
        let frame = r#"{"type":"leaderboard_update","leaderboard":[{"name":"ada","total_score":30}]}"#;
        let event = parse_frame(frame).unwrap().unwrap();
        match &event {
            ServerEvent::LeaderboardUpdate { leaderboard } => {
                assert_eq!(leaderboard[0]["name"], "ada");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(event.kind(), EventKind::LeaderboardUpdate);
    }
}
