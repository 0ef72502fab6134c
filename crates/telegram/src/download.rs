//! Fetching an uploaded file by its Telegram file id.

use std::{
    error::Error as StdError,
    path::{Path, PathBuf},
};

use {
    async_trait::async_trait,
    cliprelay_media::FailureKind,
    teloxide::prelude::*,
    tokio::io::AsyncWriteExt,
    tracing::debug,
};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("failed to get file {file_id}: {source}")]
    HandleResolution {
        file_id: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("failed to download file: {message}")]
    Transfer { message: String },

    #[error("failed to save file {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::HandleResolution { .. } => FailureKind::HandleResolutionFailure,
            Self::Transfer { .. } => FailureKind::TransferFailure,
            Self::Persist { .. } => FailureKind::PersistFailure,
        }
    }

    fn persist(path: &Path, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.to_path_buf(),
            source,
        }
    }

    fn transfer(error: reqwest::Error) -> Self {
        // The download URL embeds the bot token.
        Self::Transfer {
            message: error.without_url().to_string(),
        }
    }
}

/// Resolves an upload handle and writes its bytes to a local path.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Write the file behind `file_id` to `dest`, creating or truncating it.
    async fn fetch(&self, file_id: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// [`MediaFetcher`] backed by the Bot API `getFile` method and its file
/// endpoint.
pub struct TelegramFetcher {
    bot: Bot,
    client: reqwest::Client,
}

impl TelegramFetcher {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            client: reqwest::Client::new(),
        }
    }

    /// `<api_url>/file/bot<token>/<file_path>`
    fn file_url(&self, file_id: &str, file_path: &str) -> Result<reqwest::Url, DownloadError> {
        self.bot
            .api_url()
            .join(&format!("file/bot{}/{file_path}", self.bot.token()))
            .map_err(|e| DownloadError::HandleResolution {
                file_id: file_id.to_string(),
                source: Box::new(e),
            })
    }
}

#[async_trait]
impl MediaFetcher for TelegramFetcher {
    async fn fetch(&self, file_id: &str, dest: &Path) -> Result<(), DownloadError> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| DownloadError::HandleResolution {
                file_id: file_id.to_string(),
                source: Box::new(e),
            })?;

        let url = self.file_url(file_id, &file.path)?;

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DownloadError::transfer)?;
        if !response.status().is_success() {
            return Err(DownloadError::Transfer {
                message: format!("HTTP {}", response.status()),
            });
        }

        let mut out = tokio::fs::File::create(dest)
            .await
            .map_err(|e| DownloadError::persist(dest, e))?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await.map_err(DownloadError::transfer)? {
            out.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::persist(dest, e))?;
            written += chunk.len();
        }
        out.flush()
            .await
            .map_err(|e| DownloadError::persist(dest, e))?;

        debug!(file_id, path = %dest.display(), bytes = written, "downloaded file");
        Ok(())
    }
}
