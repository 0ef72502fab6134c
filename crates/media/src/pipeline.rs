//! Probe → scale → transcode for one input file.

use std::path::Path;

use tracing::{debug, info};

use crate::{
    engine::{Engine, EngineConfig},
    error::{Error, Result},
    probe, scale,
    scale::Dimensions,
    transcode,
};

/// The conversion steps, bound to one engine location.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    engine: Engine,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: Engine::new(config),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Raw `WxH` probe output for `input`.
    pub async fn probe(&self, input: &Path) -> Result<String> {
        probe::probe_dimensions(&self.engine, input).await
    }

    /// Output size for the probe output; zero dimensions are a probe failure.
    pub fn scale(&self, raw: &str) -> Result<Dimensions> {
        let size = scale::compute_output_dimensions(raw);
        if size.is_valid() {
            Ok(size)
        } else {
            Err(Error::probe(format!(
                "could not read dimensions from {:?}",
                raw.trim()
            )))
        }
    }

    pub async fn transcode(&self, input: &Path, size: Dimensions, output: &Path) -> Result<()> {
        transcode::transcode(&self.engine, input, size, output).await
    }

    /// Run every step against `input`, writing the clip to `output`.
    ///
    /// Neither file is removed; that is up to the caller.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<Dimensions> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(Error::invalid_input(format!(
                "input file does not exist: {}",
                input.display()
            )));
        }

        let raw = self.probe(input).await?;
        let size = self.scale(&raw)?;
        debug!(input = %input.display(), source = raw.trim(), %size, "scaled");
        self.transcode(input, size, output).await?;
        info!(
            input = %input.display(),
            output = %output.display(),
            %size,
            "clip converted"
        );
        Ok(size)
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, crate::testing::FakeEngine};

    #[tokio::test]
    async fn converts_landscape_source() {
        let fake = FakeEngine::new().unwrap();
        let pipeline = Pipeline::new(fake.config());
        let input = fake.path().join("clip.mp4");
        let output = fake.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();

        let size = pipeline.convert(&input, &output).await.unwrap();

        assert_eq!(size, Dimensions::new(512, 288));
        assert!(output.exists());
        let args = fake.recorded_args().unwrap();
        assert!(args.contains(&"scale=512:288".to_string()));
        assert!(args.contains(&"512x288".to_string()));
        assert_eq!(args.last(), Some(&output.to_string_lossy().into_owned()));
    }

    #[tokio::test]
    async fn garbage_probe_output_skips_transcode() {
        let fake = FakeEngine::new()
            .unwrap()
            .with_probe_output("garbage", 0)
            .unwrap();
        let pipeline = Pipeline::new(fake.config());
        let input = fake.path().join("clip.mp4");
        std::fs::write(&input, b"source").unwrap();

        let err = pipeline
            .convert(&input, &fake.path().join("clip.webm"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Probe { .. }));
        assert!(fake.recorded_args().is_none(), "transcoder must not run");
    }

    #[tokio::test]
    async fn probe_exit_code_is_probe_failure() {
        let fake = FakeEngine::new()
            .unwrap()
            .with_probe_output("", 1)
            .unwrap();
        let pipeline = Pipeline::new(fake.config());
        let input = fake.path().join("clip.mp4");
        std::fs::write(&input, b"source").unwrap();

        let err = pipeline.probe(&input).await.unwrap_err();
        assert!(matches!(err, Error::Probe { .. }));
    }

    #[tokio::test]
    async fn engine_exit_code_is_conversion_failure() {
        let fake = FakeEngine::new().unwrap().with_convert_exit(1).unwrap();
        let pipeline = Pipeline::new(fake.config());
        let input = fake.path().join("clip.mp4");
        let output = fake.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();

        let err = pipeline.convert(&input, &output).await.unwrap_err();

        assert!(matches!(err, Error::Conversion { .. }));
        // The partial output stays for the caller to clean up.
        assert!(output.exists());
    }

    #[tokio::test]
    async fn missing_engine_is_unavailable() {
        let fake = FakeEngine::missing().unwrap();
        let pipeline = Pipeline::new(fake.config());
        let input = fake.path().join("clip.mp4");
        std::fs::write(&input, b"source").unwrap();

        let err = pipeline
            .convert(&input, &fake.path().join("clip.webm"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable { binary: "ffprobe" }));
    }

    #[tokio::test]
    async fn missing_input_is_rejected_before_probing() {
        let fake = FakeEngine::new().unwrap();
        let pipeline = Pipeline::new(fake.config());

        let err = pipeline
            .convert(
                &fake.path().join("absent.mp4"),
                &fake.path().join("absent.webm"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }
}
