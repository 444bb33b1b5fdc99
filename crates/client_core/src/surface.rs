//! Capability contract between the connection controller and whatever draws it.

use shared::{domain::ConnectionStatus, protocol::LogLine};

/// The handful of UI operations the controller needs.
///
/// Frontends own their widgets; the controller only ever talks to them
/// through this trait, which is also what lets tests run without a window.
pub trait ChatSurface {
    /// Sets the indicator's text and appearance for `status`.
    fn set_indicator(&mut self, status: ConnectionStatus);
    fn set_toggle_label(&mut self, label: &str);
    fn append_log(&mut self, line: LogLine);
    fn input_text(&self) -> String;
    fn clear_input(&mut self);
    fn focus_input(&mut self);
}
