use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    schema::{CliprelayConfig, TOKEN_VAR},
};

/// Config file name searched beside the executable and in `./`.
pub const CONFIG_FILENAME: &str = "cliprelay.toml";

const ENV_FILENAME: &str = ".env";

/// Directory containing the running executable.
#[must_use]
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Load `.env` from beside the executable, then from `./`.
///
/// Variables already present in the environment are never overwritten, so
/// the first file wins over the second and the real environment wins over
/// both.
pub fn load_env_files() {
    if let Some(dir) = exe_dir() {
        let path = dir.join(ENV_FILENAME);
        match dotenvy::from_path(&path) {
            Ok(()) => debug!(path = %path.display(), "loaded env file"),
            Err(e) if e.not_found() => {},
            Err(e) => warn!(path = %path.display(), error = %e, "failed to load env file"),
        }
    }
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded env file");
    }
}

/// Parse a TOML config file.
pub fn load_config(path: &Path) -> Result<CliprelayConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config file (explicit, or discovered) and apply environment
/// overrides.
///
/// A missing explicit file is an error; when nothing is discovered the
/// defaults are used.
pub fn discover_and_load(explicit: Option<&Path>) -> Result<CliprelayConfig> {
    let mut config = match explicit.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)?
        },
        None => {
            debug!("no config file found, using defaults");
            CliprelayConfig::default()
        },
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn find_config_file() -> Option<PathBuf> {
    exe_dir()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .into_iter()
        .chain(std::iter::once(PathBuf::from(CONFIG_FILENAME)))
        .find(|p| p.is_file())
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut CliprelayConfig) {
    apply_overrides_with(config, |name| std::env::var(name).ok());
}

/// Apply overrides from `lookup`; blank values are ignored.
pub fn apply_overrides_with(config: &mut CliprelayConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = get(TOKEN_VAR) {
        config.telegram.token = Secret::new(token);
    }
    if let Some(dir) = get("CLIPRELAY_WORK_DIR") {
        config.paths.work_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = get("CLIPRELAY_OUTPUT_DIR") {
        config.paths.output_dir = Some(PathBuf::from(dir));
    }
    if let Some(path) = get("CLIPRELAY_FFMPEG") {
        config.engine.ffmpeg_path = Some(PathBuf::from(path));
    }
    if let Some(path) = get("CLIPRELAY_FFPROBE") {
        config.engine.ffprobe_path = Some(PathBuf::from(path));
    }
    if let Some(dir) = get("CLIPRELAY_ENGINE_DIR") {
        config.engine.bin_dir = Some(PathBuf::from(dir));
    }
    if let Some(raw) = get("CLIPRELAY_POLL_TIMEOUT") {
        match raw.trim().parse::<u32>() {
            Ok(secs) => config.telegram.poll_timeout_secs = secs,
            Err(e) => warn!(value = raw, error = %e, "ignoring invalid CLIPRELAY_POLL_TIMEOUT"),
        }
    }
}
