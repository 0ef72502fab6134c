use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    handlers,
    job::Relay,
};

/// Slack between the long-poll timeout and the HTTP client timeout, so the
/// client never aborts a poll the server is still holding open.
const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

/// Pause after a failed `getUpdates` before polling again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Build a client for `token`, verify it, and prepare the bot for polling.
pub async fn connect(token: &Secret<String>, poll_timeout_secs: u32) -> Result<Bot> {
    prepare(build_bot(token, poll_timeout_secs)?).await
}

/// Bot whose HTTP client outlives a `poll_timeout_secs` long poll.
pub(crate) fn build_bot(token: &Secret<String>, poll_timeout_secs: u32) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(u64::from(poll_timeout_secs)) + CLIENT_TIMEOUT_MARGIN)
        .build()
        .map_err(|e| Error::message(format!("failed to build telegram client: {e}")))?;
    Ok(Bot::with_client(token.expose_secret(), client))
}

/// Verify credentials, clear any webhook and register `/start`.
pub(crate) async fn prepare(bot: Bot) -> Result<Bot> {
    let me = bot.get_me().await.map_err(Error::Authentication)?;

    bot.delete_webhook().send().await?;

    let commands = vec![BotCommand::new("start", "Show what this bot does")];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?me.username, "telegram bot connected (webhook cleared)");
    Ok(bot)
}

/// Long-poll for updates and handle each message to completion before the
/// next one.
///
/// Returns `Ok(())` once `cancel` fires. Cancellation is only observed while
/// waiting for updates, never in the middle of a job. Returns an error when
/// another process is polling with the same token.
pub async fn run_polling(
    bot: &Bot,
    relay: &Relay,
    poll_timeout_secs: u32,
    cancel: CancellationToken,
) -> Result<()> {
    info!("starting telegram polling loop");
    let mut offset: i32 = 0;

    loop {
        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(poll_timeout_secs)
            .allowed_updates(vec![AllowedUpdate::Message])
            .send();

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = request => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    match update.kind {
                        UpdateKind::Message(msg) => {
                            debug!(chat_id = msg.chat.id.0, "received telegram message");
                            handlers::handle_message(relay, &msg).await;
                        },
                        other => {
                            debug!("ignoring non-message update: {other:?}");
                        },
                    }
                }
            },
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                warn!("another instance is already polling with this token");
                return Err(Error::Telegram(RequestError::Api(
                    ApiError::TerminatedByOtherGetUpdates,
                )));
            },
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(RETRY_DELAY) => {},
                }
            },
        }
    }

    info!("telegram polling stopped");
    Ok(())
}
