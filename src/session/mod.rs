//! Session orchestration: build a conversation and run it to completion.

use crate::config::Credentials;
use crate::convai::{
    AudioInterface, ConversationHandler, ConversationOptions, VoiceBackend, VoiceSession,
};
use crate::persona::ConversationConfig;
use std::process::ExitCode;
use std::sync::Arc;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The server ended the conversation.
    Completed,
    /// The user interrupted (Ctrl+C).
    Interrupted,
    /// The session failed with this message.
    Failed(String),
}

impl SessionOutcome {
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Completed | Self::Interrupted => 0,
            Self::Failed(_) => 1,
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Create the client for `credentials` and a conversation bound to its agent.
///
/// `connect` builds the client from the API key. No network traffic happens
/// until the returned session is started.
pub fn prepare_session<B, F>(
    credentials: &Credentials,
    config: ConversationConfig,
    requires_auth: bool,
    connect: F,
    audio: Box<dyn AudioInterface>,
    handler: Arc<dyn ConversationHandler>,
) -> Box<dyn VoiceSession>
where
    B: VoiceBackend,
    F: FnOnce(&str) -> B,
{
    let backend = connect(credentials.api_key());
    tracing::debug!(agent_id = credentials.agent_id(), requires_auth, "Creating conversation");
    backend.conversation(
        credentials.agent_id(),
        ConversationOptions {
            config,
            requires_auth,
            audio,
            handler,
        },
    )
}

/// Run `session` until it ends or `interrupt` resolves, then release it.
pub async fn run_session<S, I>(session: &mut S, interrupt: I) -> SessionOutcome
where
    S: VoiceSession + ?Sized,
    I: Future<Output = ()>,
{
    let outcome = tokio::select! {
        result = session.start_session() => match result {
            Ok(()) => SessionOutcome::Completed,
            Err(e) => SessionOutcome::Failed(e.to_string()),
        },
        () = interrupt => SessionOutcome::Interrupted,
    };
    session.end_session();
    tracing::debug!(?outcome, "Session finished");
    outcome
}

/// Resolves on Ctrl+C. Never resolves if the signal handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests;
