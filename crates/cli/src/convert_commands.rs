//! `cliprelay convert`: the relay pipeline against a local file.

use std::path::{Path, PathBuf};

use {
    anyhow::{Result, bail},
    cliprelay_config::CliprelayConfig,
    cliprelay_media::{Error, Pipeline, cleanup, format, transcode::output_path_for},
    tracing::{info, warn},
};

/// Where the clip goes when `--output` is not given: the configured output
/// directory, else beside the input.
fn default_output(config: &CliprelayConfig, input: &Path) -> PathBuf {
    let dir = config.paths.output_dir.clone().unwrap_or_else(|| {
        input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    output_path_for(input, &dir)
}

pub async fn handle_convert(
    config: &CliprelayConfig,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !format::is_supported(&name) {
        bail!("file format not supported: {}", input.display());
    }

    let output = output.unwrap_or_else(|| default_output(config, input));
    if output == input {
        bail!("refusing to overwrite the input file {}", input.display());
    }

    let pipeline = Pipeline::new(config.engine.clone());
    match pipeline.convert(input, &output).await {
        Ok(size) => {
            info!(input = %input.display(), output = %output.display(), %size, "converted");
            println!("{}", output.display());
            Ok(())
        },
        Err(e) => {
            warn!(input = %input.display(), kind = %e.kind(), error = %e, "conversion failed");
            // Only the encoder writes to `output`; any earlier failure leaves
            // whatever was there untouched.
            if matches!(e, Error::Conversion { .. }) {
                cleanup::remove_all([&output]).await;
            }
            Err(e.into())
        },
    }
}
