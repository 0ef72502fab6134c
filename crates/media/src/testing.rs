//! Stand-in engine binaries for tests.
//!
//! Each [`FakeEngine`] owns a scratch directory holding shell scripts named
//! `ffprobe` and `ffmpeg`. The probe prints a fixed `WxH`; the converter
//! records its arguments (one per line) and writes a few bytes to its last
//! argument before exiting with the configured status.

use std::{fs, io, os::unix::fs::PermissionsExt, path::Path};

use tempfile::TempDir;

use crate::engine::{EngineConfig, FFMPEG, FFPROBE};

const ARGS_FILE: &str = "ffmpeg.args";

pub struct FakeEngine {
    dir: TempDir,
}

impl FakeEngine {
    /// Probe reports `1920x1080`, conversion succeeds.
    pub fn new() -> io::Result<Self> {
        Self::missing()?
            .with_probe_output("1920x1080", 0)?
            .with_convert_exit(0)
    }

    /// No binaries at all.
    pub fn missing() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn with_probe_output(self, stdout: &str, exit_code: i32) -> io::Result<Self> {
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' '{}'\necho 'probe stderr' >&2\nexit {exit_code}\n",
            stdout.replace('\'', "")
        );
        write_script(&self.dir.path().join(FFPROBE), &script)?;
        Ok(self)
    }

    pub fn with_convert_exit(self, exit_code: i32) -> io::Result<Self> {
        let args_file = self.dir.path().join(ARGS_FILE);
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nfor last; do :; done\nprintf 'webm' > \"$last\"\n\
             echo 'Conversion failed!' >&2\nexit {exit_code}\n",
            args_file.display()
        );
        write_script(&self.dir.path().join(FFMPEG), &script)?;
        Ok(self)
    }

    /// Scratch directory, usable for inputs and outputs too.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Explicit paths to both scripts; nothing falls back to `PATH`.
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            ffmpeg_path: Some(self.dir.path().join(FFMPEG)),
            ffprobe_path: Some(self.dir.path().join(FFPROBE)),
            bin_dir: None,
        }
    }

    /// Arguments of the last conversion run, if there was one.
    pub fn recorded_args(&self) -> Option<Vec<String>> {
        let raw = fs::read_to_string(self.dir.path().join(ARGS_FILE)).ok()?;
        Some(raw.lines().map(str::to_string).collect())
    }
}

fn write_script(path: &Path, body: &str) -> io::Result<()> {
    fs::write(path, body)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}
