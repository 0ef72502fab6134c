use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{binary} is not installed or could not be executed")]
    EngineUnavailable { binary: &'static str },

    #[error("failed to get video dimensions: {message}")]
    Probe { message: String },

    #[error("failed to convert video: {message}")]
    Conversion { message: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Failure kind reported in logs and used to pick the user-facing reply.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EngineUnavailable { .. } => FailureKind::EngineUnavailable,
            Self::Probe { .. } => FailureKind::ProbeFailure,
            Self::Conversion { .. } | Self::InvalidInput { .. } | Self::Io(_) => {
                FailureKind::ConversionFailure
            },
        }
    }
}

/// Every way a job can end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    UnsupportedFormat,
    HandleResolutionFailure,
    TransferFailure,
    PersistFailure,
    EngineUnavailable,
    ProbeFailure,
    ConversionFailure,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "unsupported_format",
            Self::HandleResolutionFailure => "handle_resolution_failure",
            Self::TransferFailure => "transfer_failure",
            Self::PersistFailure => "persist_failure",
            Self::EngineUnavailable => "engine_unavailable",
            Self::ProbeFailure => "probe_failure",
            Self::ConversionFailure => "conversion_failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
