use std::sync::Arc;

use teloxide::prelude::*;

use rcb_core::{
    domain::{ChatId, UserId},
    messaging::types::IncomingCommand,
};

use crate::router::AppState;

struct ParsedCommand {
    name: String,
    /// `botname` from `/cmd@botname`, if present.
    mention: Option<String>,
    args: String,
}

fn parse_command(text: &str) -> ParsedCommand {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let args = parts.next().unwrap_or("").trim().to_string();

    let (name, mention) = match first.trim_start_matches('/').split_once('@') {
        Some((name, bot)) => (name, Some(bot.to_string())),
        None => (first.trim_start_matches('/'), None),
    };

    ParsedCommand {
        name: name.to_lowercase(),
        mention,
        args,
    }
}

/// True when the command explicitly names a bot other than us.
///
/// Without a known own username every mention is accepted.
fn addressed_elsewhere(mention: Option<&str>, own_username: Option<&str>) -> bool {
    match (mention, own_username) {
        (Some(mention), Some(own)) => !mention.eq_ignore_ascii_case(own),
        _ => false,
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let parsed = parse_command(text);
    if addressed_elsewhere(parsed.mention.as_deref(), state.bot_username.as_deref()) {
        tracing::debug!(mention = ?parsed.mention, "ignoring command for another bot");
        return Ok(());
    }

    let ParsedCommand { name, args, .. } = parsed;
    let cmd = IncomingCommand {
        chat_id: ChatId(msg.chat.id.0),
        user_id: UserId(user.id.0),
        username: user.username.clone(),
        name,
        args,
    };
    tracing::debug!(
        user_id = cmd.user_id.0,
        username = cmd.username.as_deref().unwrap_or("unknown"),
        command = %cmd.name,
        "command received"
    );

    let Some(reply) = state.handler.handle(&cmd).await else {
        return Ok(());
    };

    if let Err(e) = state.messenger.send_reply(cmd.chat_id, reply).await {
        tracing::warn!(chat_id = cmd.chat_id.0, error = %e, "failed to deliver reply");
    }
    Ok(())
}
