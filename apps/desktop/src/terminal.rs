//! Terminal rendition of the chat surface: the log goes to a writer, the
//! "input field" is the line most recently typed.

use std::io::Write;

use client_core::ChatSurface;
use shared::{domain::ConnectionStatus, protocol::LogLine};

pub struct TerminalSurface<W: Write> {
    out: W,
    input: String,
    indicator: Option<ConnectionStatus>,
    toggle_label: String,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            input: String::new(),
            indicator: None,
            toggle_label: ConnectionStatus::Disconnected.toggle_label().to_string(),
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn indicator(&self) -> Option<ConnectionStatus> {
        self.indicator
    }

    pub fn toggle_label(&self) -> &str {
        &self.toggle_label
    }

    /// Prints a client-side note that is not part of the chat log.
    pub fn note(&mut self, text: &str) {
        self.write_line(&format!("-- {text}"));
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write> ChatSurface for TerminalSurface<W> {
    fn set_indicator(&mut self, status: ConnectionStatus) {
        if self.indicator == Some(status) {
            return;
        }
        self.indicator = Some(status);
        self.note(&format!("status: {}", status.label()));
    }

    fn set_toggle_label(&mut self, label: &str) {
        self.toggle_label = label.to_string();
    }

    fn append_log(&mut self, line: LogLine) {
        let rendered = format!("[{}] {}", line.at.format("%H:%M:%S"), line.display_text());
        self.write_line(&rendered);
    }

    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    // A terminal's input line is always focused.
    fn focus_input(&mut self) {}
}
