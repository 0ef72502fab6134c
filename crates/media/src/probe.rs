//! Source dimension probe.

use std::{ffi::OsString, path::Path};

use tracing::debug;

use crate::{
    engine::{Engine, FFPROBE, stderr_summary},
    error::{Error, Result},
};

/// Arguments for reading the first video stream's size as `WxH`, no header.
#[must_use]
pub fn probe_args(input: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height",
        "-of",
        "csv=s=x:p=0",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(input.as_os_str().to_owned());
    args
}

/// Run the inspection binary against `input` and return its raw stdout.
///
/// The output is not validated here; see
/// [`compute_output_dimensions`](crate::scale::compute_output_dimensions).
pub async fn probe_dimensions(engine: &Engine, input: &Path) -> Result<String> {
    let binary = engine.ffprobe()?;
    let output = engine
        .run(FFPROBE, &binary, probe_args(input))
        .await
        .map_err(spawn_failure)?;

    if !output.status.success() {
        return Err(Error::probe(stderr_summary(&output)));
    }

    let raw = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!(input = %input.display(), raw = raw.trim(), "probed dimensions");
    Ok(raw)
}

/// I/O errors starting the inspection binary belong to the probe step.
fn spawn_failure(err: Error) -> Error {
    match err {
        Error::Io(e) => Error::probe(format!("failed to run {FFPROBE}: {e}")),
        other => other,
    }
}
