//! Clip conversion pipeline: format check, engine location, dimension probe,
//! scale computation, transcode to a looping webm preview, and cleanup.
//!
//! Front ends (the chat relay, the local `convert` command) supply input and
//! output paths and decide what to do with the result; everything that talks
//! to the external engine lives here.

pub mod cleanup;
pub mod engine;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod probe;
pub mod scale;
#[cfg(all(unix, any(test, feature = "test-support")))]
pub mod testing;
pub mod transcode;

pub use {
    engine::{Engine, EngineConfig},
    error::{Error, FailureKind, Result},
    pipeline::Pipeline,
    scale::Dimensions,
};
