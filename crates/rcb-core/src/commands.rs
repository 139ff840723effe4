//! Directive dispatch: one inbound command → at most one outgoing reply.

use std::sync::Arc;

use crate::{
    admin::Admin,
    formatting::escape_html,
    images::ImageMap,
    messaging::types::{IncomingCommand, OutgoingReply},
    relay::{Relay, RelayResult},
    Result,
};

pub const START_TEXT: &str = "👋 Hi! I'm an RCON bot.\nHelp: /help\nRun: /cmd <command>";

pub const HELP_TEXT: &str = "⚒ <b>RCON bot</b>\n\
/cmd <code>&lt;command&gt;</code> - run a console command\n\
/online - players online\n\
/tps - server TPS\n\
Admin: /adduser /deluser /listusers";

/// Inbound directives the bot understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    Start,
    Help,
    Cmd(&'a str),
    Online,
    Tps,
    AddUser(Option<&'a str>),
    DelUser(Option<&'a str>),
    ListUsers,
}

impl<'a> Directive<'a> {
    /// `name` is the lower-cased command without `/`; unknown names yield `None`.
    pub fn parse(name: &str, args: &'a str) -> Option<Self> {
        let first_arg = args.split_whitespace().next();
        let d = match name {
            "start" => Self::Start,
            "help" => Self::Help,
            "cmd" => Self::Cmd(args.trim()),
            "online" => Self::Online,
            "tps" => Self::Tps,
            "adduser" => Self::AddUser(first_arg),
            "deluser" => Self::DelUser(first_arg),
            "listusers" => Self::ListUsers,
            _ => return None,
        };
        Some(d)
    }
}

pub struct CommandHandler {
    relay: Relay,
    admin: Admin,
    images: Arc<ImageMap>,
}

impl CommandHandler {
    pub fn new(relay: Relay, admin: Admin, images: Arc<ImageMap>) -> Self {
        Self {
            relay,
            admin,
            images,
        }
    }

    /// Handle one command. `None` means "send nothing".
    pub async fn handle(&self, cmd: &IncomingCommand) -> Option<OutgoingReply> {
        let Some(directive) = Directive::parse(&cmd.name, &cmd.args) else {
            tracing::debug!(name = %cmd.name, "ignoring unknown command");
            return None;
        };
        let caller = cmd.user_id;

        match directive {
            Directive::Start => Some(self.enrich(OutgoingReply::plain(START_TEXT), "start")),
            Directive::Help => Some(self.enrich(OutgoingReply::html(HELP_TEXT), "help")),
            Directive::Cmd(raw) => Some(self.relayed(self.relay.execute_command(caller, raw).await)),
            Directive::Online => Some(self.relayed(self.relay.list_online_players(caller).await)),
            Directive::Tps => Some(self.relayed(self.relay.query_server_load(caller).await)),
            Directive::AddUser(arg) => admin_reply(self.admin.add_user(caller, arg).await),
            Directive::DelUser(arg) => admin_reply(self.admin.remove_user(caller, arg).await),
            Directive::ListUsers => self.admin.list_users(caller).await,
        }
    }

    fn relayed(&self, res: RelayResult) -> OutgoingReply {
        let reply = OutgoingReply::html(res.text);
        match res.enrichment_key {
            Some(key) => self.enrich(reply, &key),
            None => reply,
        }
    }

    fn enrich(&self, reply: OutgoingReply, key: &str) -> OutgoingReply {
        reply.with_image(self.images.resolve(key))
    }
}

fn admin_reply(res: Result<Option<OutgoingReply>>) -> Option<OutgoingReply> {
    match res {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "allow-list change not saved");
            Some(OutgoingReply::html(format!(
                "❌ Failed to save access list: {}",
                escape_html(&e.to_string())
            )))
        }
    }
}
