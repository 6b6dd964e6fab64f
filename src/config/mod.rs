//! Environment configuration: dotenv loading and credential validation.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the ElevenLabs API key.
pub const API_KEY_VAR: &str = "ELEVENLABS_API_KEY";
/// Environment variable holding the conversational agent id.
pub const AGENT_ID_VAR: &str = "AGENT_ID";

/// Dotenv files tried when no explicit path is given, in order.
const ENV_FILE_CANDIDATES: &[&str] = &[".env", "../.env"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} not found in environment variables. Please check your .env file.")]
    Missing { var: &'static str },

    #[error("Failed to load env file {}: {message}", path.display())]
    EnvFile { path: PathBuf, message: String },
}

/// API key and agent id for one process run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    agent_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("agent_id", &self.agent_id)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`, which maps a variable name to its value.
    ///
    /// The API key is checked first. Whitespace-only values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { var })
        };

        let api_key = required(API_KEY_VAR)?;
        let agent_id = required(AGENT_ID_VAR)?;
        Ok(Self { api_key, agent_id })
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

/// Load a dotenv file into the process environment.
///
/// An explicit path must exist. Otherwise `.env` and `../.env` are tried and a
/// missing file is fine. Variables already set in the environment are kept.
/// Returns the file that was loaded, if any.
pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!("Loaded environment from {}", path.display());
        return Ok(Some(path.to_path_buf()));
    }

    for candidate in ENV_FILE_CANDIDATES {
        let path = Path::new(candidate);
        match dotenvy::from_path(path) {
            Ok(()) => {
                tracing::debug!("Loaded environment from {}", path.display());
                return Ok(Some(path.to_path_buf()));
            }
            Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::EnvFile {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(None)
}
