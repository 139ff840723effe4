//! RCON adapter (Minecraft remote console).
//!
//! Opens one authenticated connection per command, the way the console is used by
//! the bot: short, infrequent round-trips from chat.

use async_trait::async_trait;
use rcon::Connection;
use tokio::net::TcpStream;

use rcb_core::{errors::Error, ports::RemoteConsole, Result};

#[derive(Clone)]
pub struct RconConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
}

impl std::fmt::Debug for RconConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RconConfig {
    /// `host:port`, bracketing bare IPv6 hosts.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Clone, Debug)]
pub struct RconConsole {
    cfg: RconConfig,
}

impl RconConsole {
    pub fn new(cfg: RconConfig) -> Self {
        Self { cfg }
    }

    pub fn address(&self) -> String {
        self.cfg.address()
    }
}

#[async_trait]
impl RemoteConsole for RconConsole {
    async fn execute(&self, command: &str) -> Result<String> {
        let address = self.address();
        tracing::debug!(%address, command, "rcon connect");

        let mut conn = <Connection<TcpStream>>::builder()
            .enable_minecraft_quirks(true)
            .connect(address.as_str(), &self.cfg.password)
            .await
            .map_err(|e| Error::Remote(format!("rcon connect to {address} failed: {e}")))?;

        conn.cmd(command)
            .await
            .map_err(|e| Error::Remote(format!("rcon command failed: {e}")))
    }
}
