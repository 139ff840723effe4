use crate::{
    domain::{ChatId, UserId},
    images::ImageSource,
};

/// A recognized inbound directive (`/name args`).
#[derive(Clone, Debug)]
pub struct IncomingCommand {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub name: String,
    pub args: String,
}

/// How the messenger should interpret the reply text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingReply {
    pub text: String,
    pub format: TextFormat,
    pub image: Option<ImageSource>,
}

impl OutgoingReply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            image: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Html,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<ImageSource>) -> Self {
        self.image = image;
        self
    }
}
