//! Locating and invoking the external engine (`ffmpeg` / `ffprobe`).
//!
//! Where the binaries live is configuration: an explicit path per binary, a
//! bundled directory, or a `PATH` search, checked in that order.

use std::{
    ffi::OsStr,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Output, Stdio},
};

use {serde::Deserialize, tokio::process::Command, tracing::debug};

use crate::error::{Error, Result};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Where to find the engine binaries.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Explicit path to the conversion binary.
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit path to the inspection binary.
    pub ffprobe_path: Option<PathBuf>,
    /// Directory holding both binaries (bundled layout).
    pub bin_dir: Option<PathBuf>,
}

/// Stateless handle to the engine; binaries are resolved on every call.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve the conversion binary.
    pub fn ffmpeg(&self) -> Result<PathBuf> {
        resolve_binary(
            FFMPEG,
            self.config.ffmpeg_path.as_deref(),
            self.config.bin_dir.as_deref(),
        )
        .ok_or(Error::EngineUnavailable { binary: FFMPEG })
    }

    /// Resolve the inspection binary.
    pub fn ffprobe(&self) -> Result<PathBuf> {
        resolve_binary(
            FFPROBE,
            self.config.ffprobe_path.as_deref(),
            self.config.bin_dir.as_deref(),
        )
        .ok_or(Error::EngineUnavailable { binary: FFPROBE })
    }

    /// Run `binary` with `args` to completion, stdin closed, output captured.
    ///
    /// Only a failure to start the process is an error here; exit status is
    /// left to the caller.
    pub(crate) async fn run<I, S>(
        &self,
        name: &'static str,
        binary: &Path,
        args: I,
    ) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        debug!(binary = %binary.display(), "invoking {name}");
        Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    Error::EngineUnavailable { binary: name }
                },
                _ => Error::Io(e),
            })
    }
}

/// Find `name`: explicit path first, then `bin_dir`, then `PATH`.
#[must_use]
pub fn resolve_binary(
    name: &str,
    explicit: Option<&Path>,
    bin_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }

    if let Some(dir) = bin_dir {
        let candidate = dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    which::which(name).ok()
}

/// Last meaningful line of an engine's stderr, for error messages.
pub(crate) fn stderr_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    if line.is_empty() {
        format!("exited with {}", output.status)
    } else {
        format!("exited with {}: {line}", output.status)
    }
}
