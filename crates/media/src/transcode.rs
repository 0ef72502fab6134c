//! Conversion to a short looping VP9 clip.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    engine::{Engine, FFMPEG, stderr_summary},
    error::{Error, Result},
    scale::Dimensions,
};

/// Container extension of every output.
pub const OUTPUT_EXTENSION: &str = "webm";

/// Fixed encoder settings for preview clips.
pub const VIDEO_CODEC: &str = "libvpx-vp9";
pub const FRAME_RATE: &str = "30";
pub const MAX_DURATION_SECS: &str = "3";
pub const CRF: &str = "36";
pub const MAX_BITRATE: &str = "256k";

/// Where the clip for `input` is written: `output_dir/<stem>.webm`.
///
/// Falls back to `<stem>.clip.webm` when that would be the input itself.
#[must_use]
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    let candidate = output_dir.join(format!("{stem}.{OUTPUT_EXTENSION}"));
    if candidate == input {
        output_dir.join(format!("{stem}.clip.{OUTPUT_EXTENSION}"))
    } else {
        candidate
    }
}

/// The full conversion argument list.
///
/// Overwrites the output, resizes to `size`, drops audio, forces 30 fps,
/// trims to 3 seconds, marks the clip as looping, and re-asserts the frame
/// size after the filter.
#[must_use]
pub fn conversion_args(input: &Path, size: Dimensions, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(24);
    args.push("-y".into());
    args.push("-i".into());
    args.push(input.as_os_str().to_owned());
    for arg in [
        "-vf".to_string(),
        size.filter_arg(),
        "-c:v".to_string(),
        VIDEO_CODEC.to_string(),
        "-an".to_string(),
        "-r".to_string(),
        FRAME_RATE.to_string(),
        "-t".to_string(),
        MAX_DURATION_SECS.to_string(),
        "-loop".to_string(),
        "0".to_string(),
        "-s".to_string(),
        size.to_string(),
        "-crf".to_string(),
        CRF.to_string(),
        "-b:v".to_string(),
        MAX_BITRATE.to_string(),
    ] {
        args.push(arg.into());
    }
    args.push(output.as_os_str().to_owned());
    args
}

/// Encode `input` into `output` at `size`.
///
/// A non-zero exit is a [`Error::Conversion`]; a partially written `output`
/// is left for the caller's cleanup.
pub async fn transcode(
    engine: &Engine,
    input: &Path,
    size: Dimensions,
    output: &Path,
) -> Result<()> {
    if !size.is_valid() {
        return Err(Error::probe(format!("unusable output size {size}")));
    }

    let binary = engine.ffmpeg()?;
    let output_status = engine
        .run(FFMPEG, &binary, conversion_args(input, size, output))
        .await?;

    if !output_status.status.success() {
        return Err(Error::conversion(stderr_summary(&output_status)));
    }

    debug!(
        input = %input.display(),
        output = %output.display(),
        %size,
        "transcode finished"
    );
    Ok(())
}
