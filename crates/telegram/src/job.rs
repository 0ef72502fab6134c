//! One upload, end to end.
//!
//! ```text
//! Received → Validated → Downloaded → Probed → Scaled → Converted → Replied → CleanedUp
//!                 └──────────── any error ─────────────────┘→ Failed(kind) → CleanedUp
//! ```
//!
//! A rejected filename stops at `Received`: nothing was written, so there is
//! nothing to clean up. From `Validated` on, both the input path and the
//! output path are handed to cleanup exactly once, after the job body has
//! returned, whatever the outcome.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    cliprelay_media::{FailureKind, Pipeline, cleanup, format, transcode::output_path_for},
    teloxide::types::ChatId,
    tracing::{debug, info, warn},
};

use crate::{
    download::{DownloadError, MediaFetcher},
    outbound::{ReplyDispatcher, ReplyMessage},
};

pub const CONVERTING_NOTICE: &str = "Converting video...";
pub const SENDING_NOTICE: &str = "Video converted, sending back...";
pub const UNSUPPORTED_REPLY: &str = "File format not supported.";
pub const DOWNLOAD_FAILED_REPLY: &str = "Failed to download file.";
pub const CONVERSION_FAILED_REPLY: &str = "Failed to convert video.";

/// An attachment pulled out of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMedia {
    pub file_id: String,
    /// Name suggested by the client; may contain directories or nothing.
    pub file_name: String,
    pub chat_id: ChatId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobStage {
    Received,
    Validated,
    Downloaded,
    Probed,
    Scaled,
    Converted,
    Replied,
    CleanedUp,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Downloaded => "downloaded",
            Self::Probed => "probed",
            Self::Scaled => "scaled",
            Self::Converted => "converted",
            Self::Replied => "replied",
            Self::CleanedUp => "cleaned_up",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("unsupported file format: {file_name:?}")]
    UnsupportedFormat { file_name: String },

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Media(#[from] cliprelay_media::Error),
}

impl JobError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnsupportedFormat { .. } => FailureKind::UnsupportedFormat,
            Self::Download(e) => e.kind(),
            Self::Media(e) => e.kind(),
        }
    }

    /// The one text the sender sees for this failure.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::UnsupportedFormat => UNSUPPORTED_REPLY,
            FailureKind::HandleResolutionFailure
            | FailureKind::TransferFailure
            | FailureKind::PersistFailure => DOWNLOAD_FAILED_REPLY,
            FailureKind::EngineUnavailable
            | FailureKind::ProbeFailure
            | FailureKind::ConversionFailure => CONVERSION_FAILED_REPLY,
        }
    }
}

/// How a job ended.
#[derive(Debug)]
pub struct JobOutcome {
    /// Furthest stage the job body reached.
    pub reached: JobStage,
    /// The delivered clip's path, or why the job failed.
    pub result: Result<PathBuf, JobError>,
    /// Paths handed to cleanup, in order. Empty when validation rejected
    /// the upload.
    pub cleanup_candidates: Vec<PathBuf>,
    /// The candidates that existed and were removed.
    pub removed: Vec<PathBuf>,
}

impl JobOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Input and output locations of one job. Owned by that job alone.
struct JobFiles {
    input: PathBuf,
    output: PathBuf,
}

impl JobFiles {
    fn candidates(&self) -> Vec<PathBuf> {
        vec![self.input.clone(), self.output.clone()]
    }
}

/// Everything a job needs, built once at startup and shared by reference.
pub struct Relay {
    fetcher: Arc<dyn MediaFetcher>,
    replies: ReplyDispatcher,
    pipeline: Pipeline,
    work_dir: PathBuf,
    output_dir: PathBuf,
}

impl Relay {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        replies: ReplyDispatcher,
        pipeline: Pipeline,
        work_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            replies,
            pipeline,
            work_dir: work_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn replies(&self) -> &ReplyDispatcher {
        &self.replies
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run one job to completion. Never fails: errors are reported to the
    /// sender and recorded in the outcome.
    pub async fn run_job(&self, media: IncomingMedia) -> JobOutcome {
        let chat_id = media.chat_id;

        let Some(file_name) =
            format::local_file_name(&media.file_name).filter(|name| format::is_supported(name))
        else {
            let err = JobError::UnsupportedFormat {
                file_name: media.file_name.clone(),
            };
            info!(chat_id = chat_id.0, file_name = %media.file_name, "upload rejected");
            self.replies
                .dispatch(chat_id, ReplyMessage::text(err.user_message()));
            return JobOutcome {
                reached: JobStage::Received,
                result: Err(err),
                cleanup_candidates: Vec::new(),
                removed: Vec::new(),
            };
        };

        self.replies
            .dispatch(chat_id, ReplyMessage::text(CONVERTING_NOTICE));

        let input = self.work_dir.join(&file_name);
        let files = JobFiles {
            output: output_path_for(&input, &self.output_dir),
            input,
        };

        let mut reached = JobStage::Validated;
        let result = self.process(&media, &files, &mut reached).await;

        match &result {
            Ok(path) => info!(
                chat_id = chat_id.0,
                file_name,
                output = %path.display(),
                "job finished"
            ),
            Err(e) => {
                warn!(
                    chat_id = chat_id.0,
                    file_name,
                    stage = %reached,
                    kind = %e.kind(),
                    error = %e,
                    "job failed"
                );
                self.replies
                    .dispatch(chat_id, ReplyMessage::text(e.user_message()));
            },
        }

        let cleanup_candidates = files.candidates();
        let removed = cleanup::remove_all(&cleanup_candidates).await;
        debug!(
            chat_id = chat_id.0,
            removed = removed.len(),
            stage = %JobStage::CleanedUp,
            "job files cleaned up"
        );

        JobOutcome {
            reached,
            result,
            cleanup_candidates,
            removed,
        }
    }

    async fn process(
        &self,
        media: &IncomingMedia,
        files: &JobFiles,
        reached: &mut JobStage,
    ) -> Result<PathBuf, JobError> {
        let chat_id = media.chat_id;

        self.fetcher.fetch(&media.file_id, &files.input).await?;
        advance(reached, JobStage::Downloaded, chat_id);

        let raw = self.pipeline.probe(&files.input).await?;
        advance(reached, JobStage::Probed, chat_id);

        let size = self.pipeline.scale(&raw)?;
        advance(reached, JobStage::Scaled, chat_id);

        self.pipeline
            .transcode(&files.input, size, &files.output)
            .await?;
        advance(reached, JobStage::Converted, chat_id);

        self.replies
            .dispatch(chat_id, ReplyMessage::text(SENDING_NOTICE));
        // Awaited: cleanup removes the clip as soon as this returns.
        if let Err(e) = self
            .replies
            .send(chat_id, &ReplyMessage::Clip(files.output.clone()))
            .await
        {
            warn!(chat_id = chat_id.0, error = %e, "failed to send converted clip");
        }
        advance(reached, JobStage::Replied, chat_id);

        Ok(files.output.clone())
    }
}

fn advance(reached: &mut JobStage, next: JobStage, chat_id: ChatId) {
    debug!(chat_id = chat_id.0, from = %reached, to = %next, "job stage");
    *reached = next;
}
