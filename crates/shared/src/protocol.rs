use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::Generation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Status,
    Message,
}

/// One line of the scrolling chat log.
///
/// `Message` lines hold the inbound frame exactly as received; renderers add
/// their own prefix via [`LogLine::display_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub kind: LogKind,
    pub text: String,
    pub at: DateTime<Local>,
}

impl LogLine {
    pub fn status(text: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Status,
            text: text.into(),
            at: Local::now(),
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Message,
            text: text.into(),
            at: Local::now(),
        }
    }

    pub fn display_text(&self) -> String {
        match self.kind {
            LogKind::Status => self.text.clone(),
            LogKind::Message => format!("Received: {}", self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    Opened,
    Message(String),
    Closed,
}

/// Lifecycle notification from a transport worker, tagged with the
/// generation of the handle that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub generation: Generation,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn opened(generation: Generation) -> Self {
        Self {
            generation,
            kind: TransportEventKind::Opened,
        }
    }

    pub fn message(generation: Generation, text: impl Into<String>) -> Self {
        Self {
            generation,
            kind: TransportEventKind::Message(text.into()),
        }
    }

    pub fn closed(generation: Generation) -> Self {
        Self {
            generation,
            kind: TransportEventKind::Closed,
        }
    }
}
