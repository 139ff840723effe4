use async_trait::async_trait;

use crate::Result;

/// Hexagonal port for the game server's remote console.
///
/// Implementations authenticate out-of-band (host, port, password at construction) and
/// report connection/auth/protocol failures as [`crate::Error::Remote`].
#[async_trait]
pub trait RemoteConsole: Send + Sync {
    async fn execute(&self, command: &str) -> Result<String>;
}
