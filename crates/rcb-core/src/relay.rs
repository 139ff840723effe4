//! Command relay: authorization gate → remote console → sanitized, keyed reply.

use std::{sync::Arc, time::Duration};

use crate::{
    access::AccessStore,
    domain::UserId,
    errors::Error,
    formatting::{escape_html, escape_html_truncated, strip_color_codes, ColorFilter},
    ports::RemoteConsole,
    Result,
};

pub const DENIED_TEXT: &str = "⛔ You don't have access.";
pub const USAGE_TEXT: &str = "⚠️ Example: <code>/cmd say Hello</code>";
pub const EMPTY_OUTPUT_TEXT: &str = "✅ Command executed, empty response.";

/// Escaped console output kept in a reply; Telegram caps messages at 4096 characters.
const OUTPUT_LIMIT: usize = 3800;

pub const KEY_NO_ACCESS: &str = "no_access";
pub const KEY_ERROR: &str = "error";
pub const KEY_ONLINE: &str = "online";
pub const KEY_TPS: &str = "tps";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    Success,
    /// Caller is not on the allow-list.
    Denied,
    /// Rejected before reaching the console (e.g. empty command).
    Invalid,
    /// Connection, auth, protocol or timeout failure talking to the console.
    RemoteFailure,
}

/// Reply produced by a relay operation. `text` is Telegram HTML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayResult {
    pub text: String,
    pub enrichment_key: Option<String>,
    pub outcome: RelayOutcome,
}

impl RelayResult {
    fn new(outcome: RelayOutcome, text: impl Into<String>, key: Option<&str>) -> Self {
        Self {
            text: text.into(),
            enrichment_key: key.map(str::to_string),
            outcome,
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome != RelayOutcome::Success
    }
}

pub struct Relay {
    access: Arc<AccessStore>,
    console: Arc<dyn RemoteConsole>,
    timeout: Duration,
    color_filter: ColorFilter,
}

impl Relay {
    pub fn new(
        access: Arc<AccessStore>,
        console: Arc<dyn RemoteConsole>,
        timeout: Duration,
        color_filter: ColorFilter,
    ) -> Self {
        Self {
            access,
            console,
            timeout,
            color_filter,
        }
    }

    /// `/cmd <raw_text>`: run an arbitrary console command.
    pub async fn execute_command(&self, caller: UserId, raw_text: &str) -> RelayResult {
        if !self.access.is_authorized(caller).await {
            return denied(caller, "cmd");
        }

        let raw_text = raw_text.trim();
        let Some(subkey) = raw_text.split_whitespace().next() else {
            return RelayResult::new(RelayOutcome::Invalid, USAGE_TEXT, None);
        };

        let key = format!("cmd:{subkey}");
        tracing::info!(user_id = caller.0, command = raw_text, "relaying console command");

        match self.call(raw_text).await {
            Ok(out) => {
                let text = if out.trim().is_empty() {
                    EMPTY_OUTPUT_TEXT.to_string()
                } else {
                    format!(
                        "✅ Output:\n<code>{}</code>",
                        escape_html_truncated(&out, OUTPUT_LIMIT)
                    )
                };
                RelayResult::new(RelayOutcome::Success, text, Some(&key))
            }
            Err(e) => remote_failure(caller, raw_text, &e),
        }
    }

    /// `/online`: the server's player list.
    pub async fn list_online_players(&self, caller: UserId) -> RelayResult {
        self.fixed(caller, "list", KEY_ONLINE, "👥 Online:").await
    }

    /// `/tps`: the server's ticks-per-second report.
    pub async fn query_server_load(&self, caller: UserId) -> RelayResult {
        self.fixed(caller, "tps", KEY_TPS, "⚡ TPS:").await
    }

    async fn fixed(&self, caller: UserId, command: &str, key: &str, title: &str) -> RelayResult {
        if !self.access.is_authorized(caller).await {
            return denied(caller, command);
        }

        tracing::info!(user_id = caller.0, command, "relaying console command");
        match self.call(command).await {
            Ok(out) => RelayResult::new(
                RelayOutcome::Success,
                format!(
                    "{title}\n<code>{}</code>",
                    escape_html_truncated(&out, OUTPUT_LIMIT)
                ),
                Some(key),
            ),
            Err(e) => remote_failure(caller, command, &e),
        }
    }

    /// One console round-trip, bounded by the configured timeout, output colour-stripped.
    async fn call(&self, command: &str) -> Result<String> {
        let out = tokio::time::timeout(self.timeout, self.console.execute(command))
            .await
            .map_err(|_| {
                Error::Remote(format!(
                    "no response within {} ms",
                    self.timeout.as_millis()
                ))
            })??;
        Ok(strip_color_codes(&out, self.color_filter))
    }
}

fn denied(caller: UserId, command: &str) -> RelayResult {
    tracing::info!(user_id = caller.0, command, "denied: not on the allow-list");
    RelayResult::new(RelayOutcome::Denied, DENIED_TEXT, Some(KEY_NO_ACCESS))
}

fn remote_failure(caller: UserId, command: &str, e: &Error) -> RelayResult {
    tracing::warn!(user_id = caller.0, command, error = %e, "console command failed");
    RelayResult::new(
        RelayOutcome::RemoteFailure,
        format!("❌ Error: {}", escape_html(&e.to_string())),
        Some(KEY_ERROR),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tmp_path, FakeConsole, Script};

    async fn relay_with(script: Script, allowed: &[u64]) -> (Relay, Arc<FakeConsole>) {
        let access = AccessStore::load(tmp_path("rcb-relay"), [UserId(1)])
            .await
            .unwrap();
        for id in allowed {
            access.add(UserId(*id)).await.unwrap();
        }
        let console = Arc::new(FakeConsole::new(script));
        let relay = Relay::new(
            Arc::new(access),
            console.clone(),
            Duration::from_millis(200),
            ColorFilter::All,
        );
        (relay, console)
    }

    #[tokio::test]
    async fn unauthorized_caller_is_denied_without_remote_call() {
        let (relay, console) = relay_with(Script::Reply("ok"), &[]).await;

        let res = relay.execute_command(UserId(555), "say hi").await;
        assert_eq!(res.text, DENIED_TEXT);
        assert_eq!(res.enrichment_key.as_deref(), Some(KEY_NO_ACCESS));
        assert_eq!(res.outcome, RelayOutcome::Denied);

        let res = relay.list_online_players(UserId(555)).await;
        assert_eq!(res.enrichment_key.as_deref(), Some(KEY_NO_ACCESS));
        let res = relay.query_server_load(UserId(555)).await;
        assert_eq!(res.outcome, RelayOutcome::Denied);

        assert!(console.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_command_is_a_validation_error() {
        let (relay, console) = relay_with(Script::Reply("ok"), &[7]).await;

        for raw in ["", "   "] {
            let res = relay.execute_command(UserId(7), raw).await;
            assert_eq!(res.outcome, RelayOutcome::Invalid);
            assert!(res.is_error());
            assert_eq!(res.text, USAGE_TEXT);
            assert_eq!(res.enrichment_key, None);
        }
        assert!(console.calls().is_empty());
    }

    #[tokio::test]
    async fn command_output_is_sanitized_and_keyed_by_subcommand() {
        let (relay, console) =
            relay_with(Script::Reply("§aGave 1 §6[Diamond]§r to <Steve>"), &[7]).await;

        let res = relay.execute_command(UserId(7), "give Steve diamond").await;
        assert!(!res.is_error());
        assert_eq!(res.enrichment_key.as_deref(), Some("cmd:give"));
        assert_eq!(
            res.text,
            "✅ Output:\n<code>Gave 1 [Diamond] to &lt;Steve&gt;</code>"
        );
        assert_eq!(console.calls(), vec!["give Steve diamond".to_string()]);
    }

    #[tokio::test]
    async fn blank_output_uses_fixed_message() {
        let (relay, _) = relay_with(Script::Reply("§r  \n"), &[7]).await;
        let res = relay.execute_command(UserId(7), "save-all").await;
        assert_eq!(res.text, EMPTY_OUTPUT_TEXT);
        assert_eq!(res.enrichment_key.as_deref(), Some("cmd:save-all"));
    }

    #[tokio::test]
    async fn super_admin_passes_the_gate() {
        let (relay, console) = relay_with(Script::Reply("20.0"), &[]).await;
        let res = relay.query_server_load(UserId(1)).await;
        assert_eq!(res.outcome, RelayOutcome::Success);
        assert_eq!(res.enrichment_key.as_deref(), Some(KEY_TPS));
        assert_eq!(res.text, "⚡ TPS:\n<code>20.0</code>");
        assert_eq!(console.calls(), vec!["tps".to_string()]);
    }

    #[tokio::test]
    async fn online_uses_list_command() {
        let (relay, console) =
            relay_with(Script::Reply("§6There are §c0§6 players online:"), &[7]).await;
        let res = relay.list_online_players(UserId(7)).await;
        assert_eq!(res.enrichment_key.as_deref(), Some(KEY_ONLINE));
        assert_eq!(res.text, "👥 Online:\n<code>There are 0 players online:</code>");
        assert_eq!(console.calls(), vec!["list".to_string()]);
    }

    #[tokio::test]
    async fn remote_failure_becomes_error_result() {
        let (relay, _) = relay_with(Script::Fail("connection refused"), &[7]).await;

        let res = relay.execute_command(UserId(7), "list").await;
        assert!(res.is_error());
        assert_eq!(res.outcome, RelayOutcome::RemoteFailure);
        assert_eq!(res.enrichment_key.as_deref(), Some(KEY_ERROR));
        assert!(res.text.contains("connection refused"), "{}", res.text);

        let res = relay.list_online_players(UserId(7)).await;
        assert_eq!(res.enrichment_key.as_deref(), Some(KEY_ERROR));
    }

    #[tokio::test]
    async fn markup_heavy_output_stays_within_message_limit() {
        let long: &'static str =
            Box::leak("/give <targets> <item> [<count>]\n".repeat(200).into_boxed_str());
        let (relay, _) = relay_with(Script::Reply(long), &[7]).await;

        let res = relay.execute_command(UserId(7), "help give").await;
        assert_eq!(res.outcome, RelayOutcome::Success);
        assert!(res.text.chars().count() <= 4096, "{} chars", res.text.chars().count());
        assert!(res.text.ends_with("...</code>"));

        let (relay, _) = relay_with(Script::Reply(long), &[7]).await;
        let res = relay.list_online_players(UserId(7)).await;
        assert!(res.text.chars().count() <= 4096);
    }

    #[tokio::test]
    async fn slow_console_times_out() {
        let (relay, _) = relay_with(Script::Hang, &[7]).await;
        let res = relay.query_server_load(UserId(7)).await;
        assert_eq!(res.outcome, RelayOutcome::RemoteFailure);
        assert!(res.text.contains("no response within 200 ms"), "{}", res.text);
    }
}
