use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use rcb_core::{commands::CommandHandler, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<CommandHandler>,
    /// From `get_me`; used to drop `/cmd@otherbot` in groups.
    pub bot_username: Option<String>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(token: String, handler: Arc<CommandHandler>) -> anyhow::Result<()> {
    let bot = Bot::new(token);

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(username = %me.username(), "bot started");
            Some(me.username().to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "get_me failed; continuing");
            None
        }
    };

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        handler,
        bot_username,
        messenger,
    });

    let tree = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, tree)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
