use egui::Color32;
use shared::{domain::ConnectionStatus, protocol::LogLine};

use client_core::ChatSurface;

/// Widget state the controller writes and the frame loop draws.
#[derive(Debug)]
pub struct GuiSurface {
    pub indicator: ConnectionStatus,
    pub toggle_label: String,
    pub log: Vec<LogLine>,
    pub input: String,
    focus_pending: bool,
}

impl Default for GuiSurface {
    fn default() -> Self {
        Self {
            indicator: ConnectionStatus::Disconnected,
            toggle_label: ConnectionStatus::Disconnected.toggle_label().to_string(),
            log: Vec::new(),
            input: String::new(),
            focus_pending: false,
        }
    }
}

impl GuiSurface {
    /// Returns whether the input asked for focus since the last frame.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_pending)
    }
}

impl ChatSurface for GuiSurface {
    fn set_indicator(&mut self, status: ConnectionStatus) {
        self.indicator = status;
    }

    fn set_toggle_label(&mut self, label: &str) {
        self.toggle_label = label.to_string();
    }

    fn append_log(&mut self, line: LogLine) {
        self.log.push(line);
    }

    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {
        self.focus_pending = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorStyle {
    pub text: Color32,
    pub background: Color32,
}

impl IndicatorStyle {
    pub fn for_status(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Connected => Self {
                text: Color32::GREEN,
                background: Color32::TRANSPARENT,
            },
            ConnectionStatus::Disconnected => Self {
                text: Color32::WHITE,
                background: Color32::RED,
            },
        }
    }
}
