use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("telegram authentication failed: {0}")]
    Authentication(#[source] teloxide::RequestError),

    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
