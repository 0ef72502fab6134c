//! Telegram front end for the clip relay.
//!
//! One polling loop consumes updates strictly in order and runs each upload
//! as a job (download, probe, scale, convert, reply, cleanup) before taking
//! the next update. Text replies are dispatched as detached tasks.

pub mod bot;
pub mod download;
pub mod error;
pub mod handlers;
pub mod job;
pub mod outbound;

#[cfg(test)]
mod mock_api;

pub use {
    bot::{connect, run_polling},
    download::{DownloadError, MediaFetcher, TelegramFetcher},
    error::{Error, Result},
    job::{IncomingMedia, JobError, JobOutcome, JobStage, Relay},
    outbound::{ReplyDispatcher, ReplyMessage, ReplySink, TelegramReplies},
};
