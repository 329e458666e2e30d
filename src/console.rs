//! Console log fed by the preview bridge.
//!
//! The sandboxed preview posts `{ type: "console", logType, content }` to the
//! host page, which forwards it here. Entries are kept in arrival order with a
//! host-side timestamp; nothing is reordered or de-duplicated and the log only
//! shrinks on an explicit [`ConsoleLog::clear`].

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Entry written when the log is created.
pub const INIT_MESSAGE: &str = "Console initialized. Listening for logs...";

/// Entry left behind by a clear.
pub const CLEARED_MESSAGE: &str = "Console cleared";

/// Console method that produced the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Log,
    Info,
    Warn,
    Error,
}

impl LogKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Self::Log),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(BridgeError::UnknownKind(other.to_string())),
        }
    }
}

/// One console line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub text: String,
    pub produced_at: DateTime<Local>,
}

impl LogEntry {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            produced_at: Local::now(),
        }
    }
}

/// Malformed bridge payloads.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid console message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected message type `{0}`")]
    UnexpectedType(String),

    #[error("unknown logType `{0}`")]
    UnknownKind(String),
}

/// Raw message as posted by the console shim.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    r#type: String,
    log_type: String,
    #[serde(default)]
    content: String,
}

/// Validated bridge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    pub kind: LogKind,
    pub content: String,
}

impl ConsoleMessage {
    /// Parse a JSON bridge payload, rejecting other message types and unknown kinds.
    pub fn from_json(body: &str) -> Result<Self, BridgeError> {
        let raw: RawMessage = serde_json::from_str(body)?;
        if raw.r#type != "console" {
            return Err(BridgeError::UnexpectedType(raw.r#type));
        }
        Ok(Self {
            kind: raw.log_type.parse()?,
            content: raw.content,
        })
    }
}

/// Append-only, in-memory console log.
#[derive(Debug)]
pub struct ConsoleLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLog {
    /// A log holding the single `info` initialization entry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(vec![LogEntry::new(LogKind::Info, INIT_MESSAGE)]),
        }
    }

    /// Append one entry, returning it.
    pub fn push(&self, kind: LogKind, text: impl Into<String>) -> LogEntry {
        let entry = LogEntry::new(kind, text);
        self.entries.lock().push(entry.clone());
        entry
    }

    pub fn record(&self, message: ConsoleMessage) -> LogEntry {
        self.push(message.kind, message.content)
    }

    /// Drop every entry, leaving one `info` entry saying so.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        entries.push(LogEntry::new(LogKind::Info, CLEARED_MESSAGE));
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// JSON array of every entry, for `GET /__console`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.entries.lock())
    }
}
