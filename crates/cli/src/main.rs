mod check_commands;
mod convert_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    cliprelay_config::CliprelayConfig,
    cliprelay_media::Pipeline,
    cliprelay_telegram::{ReplyDispatcher, Relay, TelegramFetcher, TelegramReplies},
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "cliprelay",
    version,
    about = "Turns uploaded videos into short WebM clips"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (default: cliprelay.toml beside the executable, then ./).
    #[arg(long, global = true, env = "CLIPRELAY_CONFIG")]
    config: Option<PathBuf>,
    /// Directory for downloaded uploads (overrides config value).
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,
    /// Directory for converted clips (overrides config value).
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Path to the ffmpeg binary (overrides config value).
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,
    /// Path to the ffprobe binary (overrides config value).
    #[arg(long, global = true)]
    ffprobe: Option<PathBuf>,
    /// Directory holding both engine binaries (overrides config value).
    #[arg(long, global = true)]
    engine_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram relay (default when no subcommand is provided).
    Run,
    /// Convert a local video file to a clip.
    Convert {
        /// Video to convert. Never modified or removed.
        input: PathBuf,
        /// Where to write the clip (default: `<stem>.webm` in the output
        /// directory, or beside the input).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show where the engine binaries are resolved from.
    Check,
}

impl Cli {
    /// Command-line flags win over the config file and environment.
    fn apply_overrides(&self, config: &mut CliprelayConfig) {
        if let Some(ref dir) = self.work_dir {
            config.paths.work_dir = Some(dir.clone());
        }
        if let Some(ref dir) = self.output_dir {
            config.paths.output_dir = Some(dir.clone());
        }
        if let Some(ref path) = self.ffmpeg {
            config.engine.ffmpeg_path = Some(path.clone());
        }
        if let Some(ref path) = self.ffprobe {
            config.engine.ffprobe_path = Some(path.clone());
        }
        if let Some(ref dir) = self.engine_dir {
            config.engine.bin_dir = Some(dir.clone());
        }
    }
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

async fn run_relay(config: CliprelayConfig) -> anyhow::Result<()> {
    let token = config.require_token()?;
    let poll_timeout = config.telegram.poll_timeout_secs;

    let work_dir = config.work_dir();
    let output_dir = config.output_dir();
    for dir in [&work_dir, &output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let pipeline = Pipeline::new(config.engine.clone());
    for resolved in [pipeline.engine().ffprobe(), pipeline.engine().ffmpeg()] {
        if let Err(e) = resolved {
            warn!(error = %e, "conversions will fail until the engine is installed");
        }
    }

    let bot = cliprelay_telegram::connect(token, poll_timeout).await?;
    let relay = Relay::new(
        Arc::new(TelegramFetcher::new(bot.clone())),
        ReplyDispatcher::new(Arc::new(TelegramReplies::new(bot.clone()))),
        pipeline,
        work_dir,
        output_dir,
    );
    info!(
        work_dir = %relay.work_dir().display(),
        output_dir = %relay.output_dir().display(),
        "relay ready"
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested, finishing current job");
                cancel.cancel();
            }
        }
    });

    cliprelay_telegram::run_polling(&bot, &relay, poll_timeout, cancel).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cliprelay_config::load_env_files();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "cliprelay starting");

    let mut config = cliprelay_config::discover_and_load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    match cli.command {
        None | Some(Commands::Run) => run_relay(config).await,
        Some(Commands::Convert { input, output }) => {
            convert_commands::handle_convert(&config, &input, output).await
        },
        Some(Commands::Check) => check_commands::handle_check(&config),
    }
}
