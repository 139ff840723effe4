use std::sync::Arc;

use rcb_rcon::{RconConfig, RconConsole};

use rcb_core::{
    access::AccessStore, admin::Admin, commands::CommandHandler, config::Config,
    images::ImageMap, ports::RemoteConsole, relay::Relay,
};

#[tokio::main]
async fn main() -> Result<(), rcb_core::Error> {
    rcb_core::logging::init("rcb")?;

    let cfg = Config::load()?;

    let access = Arc::new(AccessStore::load(&cfg.allowed_file, cfg.super_admins.clone()).await?);
    let images = Arc::new(ImageMap::load(&cfg.images_file, &cfg.images_dir).await?);

    let console = RconConsole::new(RconConfig {
        host: cfg.rcon_host.clone(),
        port: cfg.rcon_port,
        password: cfg.rcon_password.clone(),
    });
    tracing::info!(
        rcon = %console.address(),
        super_admins = cfg.super_admins.len(),
        allowed = access.list().await.len(),
        images = images.len(),
        "configuration loaded"
    );
    let console: Arc<dyn RemoteConsole> = Arc::new(console);

    let relay = Relay::new(
        access.clone(),
        console,
        cfg.rcon_timeout,
        cfg.color_filter,
    );
    let handler = Arc::new(CommandHandler::new(relay, Admin::new(access), images));

    rcb_telegram::router::run_polling(cfg.telegram_bot_token, handler)
        .await
        .map_err(|e| rcb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
