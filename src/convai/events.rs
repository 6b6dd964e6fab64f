//! Conversation WebSocket messages.

use crate::persona::{ConversationConfig, ConversationOverride};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitiationMetadata {
    pub conversation_id: String,
    #[serde(default)]
    pub agent_output_audio_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioEvent {
    pub audio_base_64: String,
    #[serde(default)]
    pub event_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentResponseEvent {
    pub agent_response: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentResponseCorrectionEvent {
    pub original_agent_response: String,
    pub corrected_agent_response: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserTranscriptionEvent {
    pub user_transcript: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterruptionEvent {
    pub event_id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PingEvent {
    pub event_id: u64,
    #[serde(default)]
    pub ping_ms: Option<u64>,
}

/// Messages pushed by the conversation server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    ConversationInitiationMetadata {
        conversation_initiation_metadata_event: InitiationMetadata,
    },
    Audio {
        audio_event: AudioEvent,
    },
    AgentResponse {
        agent_response_event: AgentResponseEvent,
    },
    AgentResponseCorrection {
        agent_response_correction_event: AgentResponseCorrectionEvent,
    },
    UserTranscript {
        user_transcription_event: UserTranscriptionEvent,
    },
    Interruption {
        interruption_event: InterruptionEvent,
    },
    Ping {
        ping_event: PingEvent,
    },
    /// Event types this client does not act on (vad scores, tool calls, ...).
    #[serde(other)]
    Unknown,
}

/// Messages sent to the conversation server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConversationInitiationClientData {
        conversation_config_override: ConversationOverride,
        custom_llm_extra_body: Map<String, Value>,
        dynamic_variables: Map<String, Value>,
    },
    Pong {
        event_id: u64,
    },
}

impl ClientMessage {
    /// First message of every session, carrying the persona override.
    #[must_use]
    pub fn initiation(config: &ConversationConfig) -> Self {
        Self::ConversationInitiationClientData {
            conversation_config_override: config.conversation_config_override.clone(),
            custom_llm_extra_body: config.extra_body.clone(),
            dynamic_variables: config.dynamic_variables.clone(),
        }
    }
}

/// One base64 chunk of microphone audio. Sent untagged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAudioChunk {
    pub user_audio_chunk: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;

    #[test]
    fn test_parse_agent_response() {
        let raw = r#"{"type":"agent_response","agent_response_event":{"agent_response":"There is no spoon."}}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            ServerEvent::AgentResponse {
                agent_response_event: AgentResponseEvent {
                    agent_response: "There is no spoon.".into()
                }
            }
        );
    }

    #[test]
    fn test_parse_correction() {
        let raw = r#"{"type":"agent_response_correction","agent_response_correction_event":{"original_agent_response":"Follow the white","corrected_agent_response":"Follow"}}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();
        let ServerEvent::AgentResponseCorrection {
            agent_response_correction_event: ev,
        } = event
        else {
            panic!("expected correction event");
        };
        assert_eq!(ev.original_agent_response, "Follow the white");
        assert_eq!(ev.corrected_agent_response, "Follow");
    }

    #[test]
    fn test_parse_ping_and_audio() {
        let ping: ServerEvent =
            serde_json::from_str(r#"{"type":"ping","ping_event":{"event_id":7,"ping_ms":40}}"#)
                .unwrap();
        assert!(matches!(ping, ServerEvent::Ping { ping_event } if ping_event.event_id == 7));

        let audio: ServerEvent = serde_json::from_str(
            r#"{"type":"audio","audio_event":{"audio_base_64":"AAA=","event_id":3}}"#,
        )
        .unwrap();
        assert!(matches!(audio, ServerEvent::Audio { audio_event } if audio_event.event_id == Some(3)));
    }

    #[test]
    fn test_unknown_event_type() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"vad_score","vad_score_event":{"vad_score":0.4}}"#)
                .unwrap();
        assert_eq!(event, ServerEvent::Unknown);
    }

    #[test]
    fn test_initiation_message_shape() {
        let config = Persona::default().build().unwrap();
        let json = serde_json::to_value(ClientMessage::initiation(&config)).unwrap();
        assert_eq!(json["type"], "conversation_initiation_client_data");
        assert_eq!(
            json["conversation_config_override"]["agent"]["first_message"],
            config.first_message()
        );
        assert!(json["custom_llm_extra_body"].as_object().unwrap().is_empty());
        assert!(json["dynamic_variables"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_pong_and_audio_chunk_shape() {
        let pong = serde_json::to_string(&ClientMessage::Pong { event_id: 7 }).unwrap();
        assert_eq!(pong, r#"{"type":"pong","event_id":7}"#);

        let chunk = serde_json::to_string(&UserAudioChunk {
            user_audio_chunk: "AAA=".into(),
        })
        .unwrap();
        assert_eq!(chunk, r#"{"user_audio_chunk":"AAA="}"#);
    }
}
