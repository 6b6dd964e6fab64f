use super::*;
use crate::config::{AGENT_ID_VAR, API_KEY_VAR};
use crate::convai::{Error, SilentAudio};
use crate::display::MatrixConsole;
use crate::persona::{MATRIX_PROMPT, Persona};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
struct Constructed {
    api_key: String,
    agent_id: String,
    requires_auth: bool,
    config: ConversationConfig,
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Constructed>>,
}

struct StubBackend {
    api_key: String,
    recorder: Arc<Recorder>,
}

impl VoiceBackend for StubBackend {
    fn conversation(&self, agent_id: &str, options: ConversationOptions) -> Box<dyn VoiceSession> {
        self.recorder.calls.lock().unwrap().push(Constructed {
            api_key: self.api_key.clone(),
            agent_id: agent_id.to_string(),
            requires_auth: options.requires_auth,
            config: options.config,
        });
        Box::new(StubSession::Completes(Arc::default()))
    }
}

enum StubSession {
    Completes(Arc<Mutex<usize>>),
    Fails(&'static str),
    Hangs(Arc<Mutex<usize>>),
}

#[async_trait]
impl VoiceSession for StubSession {
    async fn start_session(&mut self) -> Result<(), Error> {
        match self {
            Self::Completes(_) => Ok(()),
            Self::Fails(msg) => Err(Error::Api((*msg).to_string())),
            Self::Hangs(_) => std::future::pending().await,
        }
    }

    fn end_session(&mut self) {
        if let Self::Completes(ends) | Self::Hangs(ends) = self {
            *ends.lock().unwrap() += 1;
        }
    }
}

fn credentials() -> Credentials {
    Credentials::from_lookup(|name| match name {
        AGENT_ID_VAR => Some("agent123".into()),
        API_KEY_VAR => Some("key123".into()),
        _ => None,
    })
    .unwrap()
}

#[test]
fn test_prepare_session_passes_persona_and_auth() {
    let recorder = Arc::new(Recorder::default());
    let config = Persona::default().build().unwrap();

    let _session = prepare_session(
        &credentials(),
        config,
        true,
        |api_key| StubBackend {
            api_key: api_key.to_string(),
            recorder: recorder.clone(),
        },
        Box::new(SilentAudio::default()),
        Arc::new(MatrixConsole::new(Vec::new())),
    );

    let calls = recorder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.api_key, "key123");
    assert_eq!(call.agent_id, "agent123");
    assert!(call.requires_auth);
    assert!(call.config.prompt().contains(MATRIX_PROMPT));
    assert_eq!(
        call.config.first_message(),
        "Wake up, Traveler... The Matrix has you. I am MATRIX-AI, your guide in this digital realm. What brings you to seek the truth today?"
    );
}

#[test]
fn test_missing_credentials_construct_nothing() {
    let recorder = Arc::new(Recorder::default());
    let result = Credentials::from_lookup(|name| (name == AGENT_ID_VAR).then(|| "agent123".into()))
        .map(|creds| {
            prepare_session(
                &creds,
                Persona::default().build().unwrap(),
                true,
                |api_key| StubBackend {
                    api_key: api_key.to_string(),
                    recorder: recorder.clone(),
                },
                Box::new(SilentAudio::default()),
                Arc::new(MatrixConsole::new(Vec::new())),
            )
        });

    let err = result.err().unwrap();
    assert!(err.to_string().contains(API_KEY_VAR));
    assert!(recorder.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_completed_session_exits_zero() {
    let ends = Arc::new(Mutex::new(0));
    let mut session = StubSession::Completes(ends.clone());
    let outcome = run_session(&mut session, std::future::pending()).await;
    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(outcome.exit_status(), 0);
    assert_eq!(*ends.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_interrupt_exits_zero() {
    let ends = Arc::new(Mutex::new(0));
    let mut session = StubSession::Hangs(ends.clone());
    let outcome = run_session(&mut session, async {}).await;
    assert_eq!(outcome, SessionOutcome::Interrupted);
    assert_eq!(outcome.exit_status(), 0);
    assert_eq!(*ends.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_failure_exits_one_with_message() {
    let mut session = StubSession::Fails("socket closed unexpectedly");
    let outcome = run_session(&mut session, std::future::pending()).await;
    assert_eq!(outcome.exit_status(), 1);
    let SessionOutcome::Failed(msg) = outcome else {
        panic!("expected failure");
    };
    assert!(msg.contains("socket closed unexpectedly"));
}

#[tokio::test]
async fn test_boxed_session_runs() {
    let mut session: Box<dyn VoiceSession> = Box::new(StubSession::Completes(Arc::default()));
    let outcome = run_session(session.as_mut(), std::future::pending()).await;
    assert_eq!(outcome, SessionOutcome::Completed);
}
