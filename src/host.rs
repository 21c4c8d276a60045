//! The environment the client runs in: where navigation goes, and how the
//! user is told things or asked to confirm them.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const FEED_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

#[async_trait]
pub trait Host: Send + Sync {
    /// Leave the current page for `path`.
    fn navigate(&self, path: &str);

    /// The last path navigated to, if any.
    fn location(&self) -> Option<String>;

    fn alert(&self, message: &str);

    async fn confirm(&self, message: &str) -> bool;
}

/// Host backed by the terminal: alerts go to stdout and confirmations are
/// read from stdin unless `assume_yes` is set.
pub struct TerminalHost {
    assume_yes: bool,
    location: Mutex<Option<String>>,
}

impl TerminalHost {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            location: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Host for TerminalHost {
    fn navigate(&self, path: &str) {
        tracing::info!("Navigating to {}", path);
        if let Ok(mut location) = self.location.lock() {
            *location = Some(path.to_string());
        }
    }

    fn location(&self) -> Option<String> {
        self.location.lock().ok().and_then(|l| l.clone())
    }

    fn alert(&self, message: &str) {
        println!("{}", message);
    }

    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        println!("{} [y/N]", message);
        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
            Err(e) => {
                tracing::error!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

/// Host that remembers everything it was asked to do. Confirmations are
/// answered with a fixed reply.
#[derive(Debug, Default)]
pub struct RecordingHost {
    confirm_reply: bool,
    navigations: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
    confirms: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new(confirm_reply: bool) -> Self {
        Self {
            confirm_reply,
            ..Self::default()
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn confirms(&self) -> Vec<String> {
        self.confirms.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Host for RecordingHost {
    fn navigate(&self, path: &str) {
        if let Ok(mut v) = self.navigations.lock() {
            v.push(path.to_string());
        }
    }

    fn location(&self) -> Option<String> {
        self.navigations.lock().ok().and_then(|v| v.last().cloned())
    }

    fn alert(&self, message: &str) {
        if let Ok(mut v) = self.alerts.lock() {
            v.push(message.to_string());
        }
    }

    async fn confirm(&self, message: &str) -> bool {
        if let Ok(mut v) = self.confirms.lock() {
            v.push(message.to_string());
        }
        self.confirm_reply
    }
}
