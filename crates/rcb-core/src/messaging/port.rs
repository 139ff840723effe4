use async_trait::async_trait;

use crate::{domain::ChatId, messaging::types::OutgoingReply, Result};

/// Outbound delivery port.
///
/// `send_reply` sends exactly one message. When the reply carries an image and the
/// image send fails, implementations fall back to sending the text alone.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_reply(&self, chat_id: ChatId, reply: OutgoingReply) -> Result<()>;
}
