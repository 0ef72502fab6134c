//! Config schema: bot credentials, engine location, working directories.
use std::path::PathBuf;

use {
    cliprelay_media::EngineConfig,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

use crate::error::{Error, Result};

/// Environment variable holding the bot token.
pub const TOKEN_VAR: &str = "BOT_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliprelayConfig {
    pub telegram: TelegramConfig,
    pub engine: EngineConfig,
    pub paths: PathsConfig,
}

impl CliprelayConfig {
    /// The bot token, or [`Error::MissingCredential`] when it is blank.
    pub fn require_token(&self) -> Result<&Secret<String>> {
        if self.telegram.token.expose_secret().trim().is_empty() {
            return Err(Error::MissingCredential { var: TOKEN_VAR });
        }
        Ok(&self.telegram.token)
    }

    /// Directory for downloaded inputs. Defaults to the executable's
    /// directory, then the current directory.
    #[must_use]
    pub fn work_dir(&self) -> PathBuf {
        self.paths
            .work_dir
            .clone()
            .or_else(crate::loader::exe_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Directory for converted clips. Defaults to [`Self::work_dir`].
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.paths
            .output_dir
            .clone()
            .unwrap_or_else(|| self.work_dir())
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,

    /// Long-poll timeout for `getUpdates`, in seconds.
    pub poll_timeout_secs: u32,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            poll_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub work_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}
