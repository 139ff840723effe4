//! Telegram update handlers.
//!
//! Each handler is a thin adapter: translate the Telegram message into an
//! `IncomingCommand`, let `rcb-core` decide, deliver whatever it returns.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod commands;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let is_command = msg.text().is_some_and(|t| t.starts_with('/'));
    if !is_command {
        return Ok(());
    }
    commands::handle_command(msg, state).await
}
