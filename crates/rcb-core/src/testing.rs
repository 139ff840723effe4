//! Test doubles shared by the core's unit tests.

use std::{path::PathBuf, sync::Mutex, time::Duration};

use async_trait::async_trait;

use crate::{errors::Error, ports::RemoteConsole, Result};

/// Unique `/tmp` path per call.
pub(crate) fn tmp_path(prefix: &str) -> PathBuf {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    PathBuf::from(format!("/tmp/{prefix}-{}-{ts}.json", std::process::id()))
}

pub(crate) enum Script {
    Reply(&'static str),
    Fail(&'static str),
    Hang,
}

pub(crate) struct FakeConsole {
    script: Script,
    calls: Mutex<Vec<String>>,
}

impl FakeConsole {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteConsole for FakeConsole {
    async fn execute(&self, command: &str) -> Result<String> {
        self.calls.lock().unwrap().push(command.to_string());
        match self.script {
            Script::Reply(s) => Ok(s.to_string()),
            Script::Fail(s) => Err(Error::Remote(s.to_string())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
        }
    }
}
