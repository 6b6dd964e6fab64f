//! Command-line entry: flags, logging setup, and the session run.

use crate::config::{self, Credentials};
use crate::convai::{ConversationHandler, ElevenLabs, default_audio_interface};
use crate::display::{Console, LogHandler, MatrixConsole, Pace};
use crate::persona::{DEFAULT_USER_NAME, Persona};
use crate::session::{self, SessionOutcome};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter (e.g. `matrix_ai=debug`).
pub const LOG_ENV: &str = "MATRIX_AI_LOG";

/// Talk to your ElevenLabs agent as MATRIX-AI
#[derive(Parser, Debug)]
#[command(name = "matrix-ai", version, about)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Dotenv file to load (default: ./.env, then ../.env)
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Name the agent greets you by
    #[arg(long = "user-name", value_name = "NAME", default_value = DEFAULT_USER_NAME)]
    pub user_name: String,

    /// Replace the persona prompt with the contents of a file
    #[arg(long = "prompt-file", value_name = "PATH")]
    pub prompt_file: Option<PathBuf>,

    /// Connect without a signed URL (public agents only)
    #[arg(long)]
    pub public: bool,

    /// Log conversation events instead of drawing the Matrix console
    #[arg(long)]
    pub plain: bool,

    /// Skip typing animation and pauses
    #[arg(long = "no-animation")]
    pub no_animation: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub fn pace(&self) -> Pace {
        if self.no_animation || self.plain {
            Pace::Instant
        } else {
            Pace::Animated
        }
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        !self.public
    }

    /// Tracing filter to install, or `None` to leave logging off.
    fn log_filter(&self) -> Option<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
            return Some(filter);
        }
        if self.verbose {
            Some(EnvFilter::new("matrix_ai=debug"))
        } else if self.plain {
            Some(EnvFilter::new("matrix_ai=info"))
        } else {
            None
        }
    }

    fn persona(&self) -> Result<Persona> {
        let persona = Persona::matrix(self.user_name.clone());
        match &self.prompt_file {
            Some(path) => {
                let prompt = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
                Ok(persona.with_prompt(prompt))
            }
            None => Ok(persona),
        }
    }
}

fn init_tracing(cli: &Cli) {
    if let Some(filter) = cli.log_filter() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Run the voice console. Configuration errors exit 1 before any session exists.
pub async fn run(cli: Cli) -> ExitCode {
    init_tracing(&cli);

    match run_inner(&cli).await {
        Ok(code) => code,
        Err(e) => {
            let _ = Console::stderr(Pace::Instant).config_error(&format!("{e:#}"));
            ExitCode::from(1)
        }
    }
}

async fn run_inner(cli: &Cli) -> Result<ExitCode> {
    config::load_env_file(cli.env_file.as_deref())?;
    let credentials = Credentials::from_env()?;
    let conversation_config = cli.persona()?.build()?;

    let handler: Arc<dyn ConversationHandler> = if cli.plain {
        Arc::new(LogHandler)
    } else {
        Arc::new(MatrixConsole::stdout())
    };
    let audio = default_audio_interface();
    let audio_live = audio.is_live();

    let mut conversation = session::prepare_session(
        &credentials,
        conversation_config,
        cli.requires_auth(),
        |api_key| ElevenLabs::new(api_key),
        audio,
        handler,
    );

    let mut console = Console::stdout(cli.pace());
    if !cli.plain
        && let Err(e) = show_startup(&mut console, audio_live)
    {
        tracing::warn!("Failed to draw startup screens: {e}");
    }

    let outcome = session::run_session(conversation.as_mut(), session::ctrl_c()).await;
    Ok(ExitCode::from(report_outcome(&mut console, &outcome, cli.plain)))
}

fn show_startup<W: Write>(console: &mut Console<W>, audio_live: bool) -> io::Result<()> {
    console.banner()?;
    console.boot_sequence()?;
    console.welcome()?;
    console.voice_status(audio_live)
}

/// Draw the shutdown screen for `outcome` and return its exit status.
///
/// A console that can no longer be written to (closed pipe after Ctrl+C)
/// does not change the status.
fn report_outcome<W: Write>(console: &mut Console<W>, outcome: &SessionOutcome, plain: bool) -> u8 {
    let drawn = match outcome {
        SessionOutcome::Completed | SessionOutcome::Interrupted if plain => {
            tracing::info!(?outcome, "Disconnected");
            Ok(())
        }
        SessionOutcome::Completed | SessionOutcome::Interrupted => console.farewell(),
        SessionOutcome::Failed(message) if plain => {
            tracing::error!("Session failed: {message}");
            Ok(())
        }
        SessionOutcome::Failed(message) => console.anomaly(message),
    };
    if let Err(e) = drawn {
        tracing::warn!("Failed to draw shutdown screen: {e}");
    }
    outcome.exit_status()
}
