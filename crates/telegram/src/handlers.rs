use {
    teloxide::{
        prelude::*,
        types::{MediaKind, MessageKind},
    },
    tracing::debug,
};

use crate::{
    job::{IncomingMedia, JobOutcome, Relay},
    outbound::ReplyMessage,
};

/// `true` for `/start` and `/start@<bot>`, optionally followed by arguments.
#[must_use]
pub fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split('@').next().unwrap_or_default();
    command == "/start"
}

/// Pull the convertible attachment out of a message, if it has one.
///
/// Documents keep the client's file name (empty when absent). Native videos
/// carry no usable name and are named `<file_id>.mp4`.
#[must_use]
pub fn extract_media(msg: &Message) -> Option<IncomingMedia> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };
    let (file_id, file_name) = match &common.media_kind {
        MediaKind::Document(d) => (
            d.document.file.id.clone(),
            d.document.file_name.clone().unwrap_or_default(),
        ),
        MediaKind::Video(v) => {
            let id = v.video.file.id.clone();
            let name = format!("{id}.mp4");
            (id, name)
        },
        _ => return None,
    };
    Some(IncomingMedia {
        file_id,
        file_name,
        chat_id: msg.chat.id,
    })
}

/// Route one inbound message. Returns the job outcome when the message
/// carried an upload.
pub async fn handle_message(relay: &Relay, msg: &Message) -> Option<JobOutcome> {
    if let Some(text) = msg.text()
        && is_start_command(text)
    {
        debug!(chat_id = msg.chat.id.0, "welcome requested");
        relay.replies().dispatch(msg.chat.id, ReplyMessage::Welcome);
        return None;
    }

    let Some(media) = extract_media(msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring message without upload");
        return None;
    };
    Some(relay.run_job(media).await)
}
