//! `cliprelay check`: where the engine binaries resolve from, and whether
//! the relay has what it needs to start.

use {
    anyhow::{Result, bail},
    cliprelay_config::{CliprelayConfig, TOKEN_VAR},
    cliprelay_media::engine::{FFMPEG, FFPROBE, resolve_binary},
};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

fn check_engine(config: &CliprelayConfig) -> Vec<CheckItem> {
    let engine = &config.engine;
    [
        (FFPROBE, engine.ffprobe_path.as_deref()),
        (FFMPEG, engine.ffmpeg_path.as_deref()),
    ]
    .into_iter()
    .map(|(name, explicit)| {
        match resolve_binary(name, explicit, engine.bin_dir.as_deref()) {
            Some(path) => CheckItem {
                status: Status::Ok,
                message: format!("{name}: {}", path.display()),
            },
            None => CheckItem {
                status: Status::Fail,
                message: match explicit {
                    Some(path) => format!("{name}: not found at {}", path.display()),
                    None => format!("{name}: not found in engine dir or PATH"),
                },
            },
        }
    })
    .collect()
}

fn check_token(config: &CliprelayConfig) -> CheckItem {
    match config.require_token() {
        Ok(_) => CheckItem {
            status: Status::Ok,
            message: "bot token configured".into(),
        },
        Err(_) => CheckItem {
            status: Status::Warn,
            message: format!("{TOKEN_VAR} is not set; `run` will refuse to start"),
        },
    }
}

fn print_items(items: &[CheckItem]) -> usize {
    let mut failures = 0;
    for item in items {
        let color = item.status.color();
        let label = item.status.label();
        eprintln!("  [{color}{label}{RESET}]  {}", item.message);
        if item.status == Status::Fail {
            failures += 1;
        }
    }
    failures
}

pub fn handle_check(config: &CliprelayConfig) -> Result<()> {
    eprintln!("{BOLD}cliprelay check{RESET}");

    let mut items = check_engine(config);
    items.push(check_token(config));
    items.push(CheckItem {
        status: Status::Ok,
        message: format!(
            "work dir {}, output dir {}",
            config.work_dir().display(),
            config.output_dir().display()
        ),
    });

    let failures = print_items(&items);
    if failures > 0 {
        bail!("{failures} engine binary(ies) missing");
    }
    Ok(())
}
