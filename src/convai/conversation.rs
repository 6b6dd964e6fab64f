//! A live voice conversation with an ElevenLabs agent.

use crate::convai::audio::AudioInterface;
use crate::convai::client::ElevenLabs;
use crate::convai::error::Error;
use crate::convai::events::{ClientMessage, ServerEvent, UserAudioChunk};
use crate::persona::ConversationConfig;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

/// Receives the text events of a conversation.
///
/// Implementations must not panic: they run inside the session loop.
pub trait ConversationHandler: Send + Sync {
    fn on_agent_response(&self, text: &str);
    /// An earlier agent response was cut short and revised.
    fn on_agent_response_correction(&self, original: &str, corrected: &str);
    fn on_user_transcript(&self, text: &str);
}

/// A session that runs until the conversation ends.
#[async_trait]
pub trait VoiceSession: Send {
    /// Connect and drive the conversation. Returns when the server ends it.
    async fn start_session(&mut self) -> Result<(), Error>;
    /// Release local resources. Safe to call more than once.
    fn end_session(&mut self);
}

/// Everything a conversation needs besides the client and agent id.
pub struct ConversationOptions {
    pub config: ConversationConfig,
    pub requires_auth: bool,
    pub audio: Box<dyn AudioInterface>,
    pub handler: Arc<dyn ConversationHandler>,
}

pub struct Conversation {
    client: ElevenLabs,
    agent_id: String,
    config: ConversationConfig,
    requires_auth: bool,
    audio: Box<dyn AudioInterface>,
    handler: Arc<dyn ConversationHandler>,
    conversation_id: Option<String>,
    last_interrupt_id: u64,
}

impl Conversation {
    pub fn new(client: ElevenLabs, agent_id: impl Into<String>, options: ConversationOptions) -> Self {
        Self {
            client,
            agent_id: agent_id.into(),
            config: options.config,
            requires_auth: options.requires_auth,
            audio: options.audio,
            handler: options.handler,
            conversation_id: None,
            last_interrupt_id: 0,
        }
    }

    /// Server-assigned id, known once the session has started.
    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Apply one server event. Returns the reply to send, if any.
    fn dispatch(&mut self, event: ServerEvent) -> Result<Option<ClientMessage>, Error> {
        match event {
            ServerEvent::ConversationInitiationMetadata {
                conversation_initiation_metadata_event: meta,
            } => {
                tracing::debug!(conversation_id = %meta.conversation_id, "Conversation started");
                self.conversation_id = Some(meta.conversation_id);
            }
            ServerEvent::Audio { audio_event } => {
                // Untagged audio cannot belong to an interrupted turn.
                match audio_event.event_id {
                    Some(event_id) if event_id <= self.last_interrupt_id => {
                        tracing::debug!(event_id, "Dropping interrupted audio");
                    }
                    _ => {
                        let pcm = BASE64.decode(audio_event.audio_base_64.as_bytes())?;
                        self.audio.output(&pcm);
                    }
                }
            }
            ServerEvent::AgentResponse {
                agent_response_event,
            } => {
                self.handler
                    .on_agent_response(&agent_response_event.agent_response);
            }
            ServerEvent::AgentResponseCorrection {
                agent_response_correction_event: ev,
            } => {
                self.handler.on_agent_response_correction(
                    &ev.original_agent_response,
                    &ev.corrected_agent_response,
                );
            }
            ServerEvent::UserTranscript {
                user_transcription_event,
            } => {
                self.handler
                    .on_user_transcript(&user_transcription_event.user_transcript);
            }
            ServerEvent::Interruption { interruption_event } => {
                tracing::debug!(event_id = interruption_event.event_id, "Agent interrupted");
                self.last_interrupt_id = interruption_event.event_id;
                self.audio.interrupt();
            }
            ServerEvent::Ping { ping_event } => {
                return Ok(Some(ClientMessage::Pong {
                    event_id: ping_event.event_id,
                }));
            }
            ServerEvent::Unknown => {}
        }
        Ok(None)
    }

    fn handle_text(&mut self, text: &str) -> Result<Option<ClientMessage>, Error> {
        match serde_json::from_str::<ServerEvent>(text) {
            Ok(event) => self.dispatch(event),
            Err(e) => {
                // Known event types with unexpected payloads are skipped, not fatal.
                tracing::debug!("Ignoring unparseable server message: {e}");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl VoiceSession for Conversation {
    async fn start_session(&mut self) -> Result<(), Error> {
        // Borrow fields, not `self`: the future must stay `Send`.
        let url = if self.requires_auth {
            self.client.get_signed_url(&self.agent_id).await?
        } else {
            self.client.public_url(&self.agent_id)?
        };
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (mut sink, mut stream) = ws.split();

        let init = serde_json::to_string(&ClientMessage::initiation(&self.config))?;
        sink.send(Message::text(init)).await?;

        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        self.audio.start(input_tx)?;

        loop {
            tokio::select! {
                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = self.handle_text(&text)? {
                            sink.send(Message::text(serde_json::to_string(&reply)?)).await?;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(?frame, "Server closed the conversation");
                        if let Some(frame) = frame
                            && frame.code != CloseCode::Normal
                        {
                            self.audio.stop();
                            return Err(Error::Closed {
                                code: frame.code.into(),
                                reason: frame.reason.as_str().to_owned(),
                            });
                        }
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        self.audio.stop();
                        return Err(e.into());
                    }
                    None => break,
                },
                Some(chunk) = input_rx.recv() => {
                    let message = UserAudioChunk {
                        user_audio_chunk: BASE64.encode(&chunk),
                    };
                    sink.send(Message::text(serde_json::to_string(&message)?)).await?;
                }
            }
        }

        self.audio.stop();
        Ok(())
    }

    fn end_session(&mut self) {
        self.audio.stop();
    }
}
