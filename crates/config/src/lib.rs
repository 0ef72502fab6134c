//! Configuration loading for the relay.
//!
//! Sources, lowest precedence first:
//! - `cliprelay.toml` (explicit path, else beside the executable, else `./`)
//! - environment variables, including a `.env` file beside the executable
//! - command-line flags (applied by the binary)

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{
        CONFIG_FILENAME, apply_env_overrides, apply_overrides_with, discover_and_load, exe_dir,
        load_config, load_env_files,
    },
    schema::{CliprelayConfig, PathsConfig, TOKEN_VAR, TelegramConfig},
};
