//! Client for ElevenLabs conversational agents.
//!
//! Covers the pieces a voice session needs: signed URL lookup, the
//! conversation WebSocket, and local audio I/O.

pub mod audio;
mod client;
mod conversation;
#[cfg(feature = "audio")]
mod device;
mod error;
pub mod events;

pub use audio::{AudioError, AudioInterface, SilentAudio, default_audio_interface};
pub use client::{DEFAULT_BASE_URL, ElevenLabs};
pub use conversation::{
    Conversation, ConversationHandler, ConversationOptions, VoiceSession,
};
#[cfg(feature = "audio")]
pub use device::DeviceAudio;
pub use error::{Error, format_api_error};

/// Creates conversations for an agent.
pub trait VoiceBackend {
    fn conversation(&self, agent_id: &str, options: ConversationOptions) -> Box<dyn VoiceSession>;
}

impl VoiceBackend for ElevenLabs {
    fn conversation(&self, agent_id: &str, options: ConversationOptions) -> Box<dyn VoiceSession> {
        Box::new(Conversation::new(self.clone(), agent_id, options))
    }
}
