//! The connection controller: one optional transport handle, its status, and
//! the text relayed through it.

use shared::{
    domain::{ConnectionState, ConnectionStatus, Generation},
    error::ChatError,
    protocol::{LogLine, TransportEvent, TransportEventKind},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    surface::ChatSurface,
    transport::{Connector, TransportHandle},
};

pub const CONNECTING_LINE: &str = "Connecting...";
pub const CONNECTED_LINE: &str = "Connected";
pub const DISCONNECTING_LINE: &str = "Disconnecting...";
pub const DISCONNECTED_LINE: &str = "Disconnected";
pub const NOT_CONNECTED_LINE: &str = "Not connected; message not sent";

struct ActiveConnection<H> {
    handle: H,
    open: bool,
}

pub struct ConnectionController<C: Connector, S: ChatSurface> {
    endpoint: Url,
    connector: C,
    surface: S,
    connection: Option<ActiveConnection<C::Handle>>,
    /// Most recently issued generation. Zero until the first connect.
    generation: Generation,
}

impl<C: Connector, S: ChatSurface> ConnectionController<C, S> {
    pub fn new(endpoint: Url, connector: C, surface: S) -> Self {
        Self {
            endpoint,
            connector,
            surface,
            connection: None,
            generation: Generation::INITIAL,
        }
    }

    /// Startup trigger.
    pub fn start(&mut self, auto_connect: bool) {
        if auto_connect {
            self.connect();
        }
        self.refresh_status();
    }

    pub fn connect(&mut self) {
        self.disconnect();

        self.generation = self.generation.next();
        self.log_status(CONNECTING_LINE);
        info!(endpoint = %self.endpoint, generation = %self.generation, "connecting");

        let handle = self.connector.open(&self.endpoint, self.generation);
        self.connection = Some(ActiveConnection {
            handle,
            open: false,
        });
    }

    /// Closes and forgets the current handle without waiting for the close
    /// to complete. No-op when nothing is connected.
    pub fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        self.log_status(DISCONNECTING_LINE);
        info!(generation = %connection.handle.generation(), "disconnecting");
        connection.handle.close();

        self.refresh_status();
    }

    pub fn toggle(&mut self) {
        if self.connection.is_some() {
            self.disconnect();
        } else {
            self.connect();
        }

        self.refresh_status();
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        let TransportEvent { generation, kind } = event;
        let current = self.generation;
        match kind {
            TransportEventKind::Opened => {
                let Some(connection) = self.current_connection_mut(generation) else {
                    debug!(%generation, %current, "ignoring stale open");
                    return;
                };
                connection.open = true;
                self.log_status(CONNECTED_LINE);
                self.refresh_status();
            }
            TransportEventKind::Message(text) => {
                if self.current_connection_mut(generation).is_none() {
                    debug!(%generation, %current, "ignoring stale message");
                    return;
                }
                self.surface.append_log(LogLine::message(text));
            }
            TransportEventKind::Closed => {
                if generation == Generation::INITIAL || generation != self.generation {
                    debug!(%generation, %current, "ignoring stale close");
                    return;
                }
                self.log_status(DISCONNECTED_LINE);
                self.connection = None;
                self.refresh_status();
            }
        }
    }

    /// Form submit: sends the input field's text when the connection is open.
    pub fn submit(&mut self) {
        let text = self.surface.input_text();

        if !self.is_open() {
            info!(state = ?self.state(), "submit ignored while not connected");
            self.log_status(NOT_CONNECTED_LINE);
            return;
        }

        self.log_status(format!("Sending: {text}"));
        match self.send(&text) {
            Ok(()) => {
                self.surface.clear_input();
                self.surface.focus_input();
            }
            Err(err) => {
                warn!(error = %err, "send failed");
                self.log_status(format!("Send failed: {err}"));
            }
        }
    }

    /// Writes `text` as one frame on the open connection.
    pub fn send(&self, text: &str) -> Result<(), ChatError> {
        match &self.connection {
            Some(connection) if connection.open => connection.handle.send_text(text),
            _ => Err(ChatError::NotConnected),
        }
    }

    pub fn refresh_status(&mut self) {
        let status = self.status();
        self.surface.set_indicator(status);
        self.surface.set_toggle_label(status.toggle_label());
        if status.is_connected() {
            self.surface.focus_input();
        }
    }

    pub fn state(&self) -> ConnectionState {
        match &self.connection {
            None => ConnectionState::Disconnected,
            Some(connection) if connection.open => ConnectionState::Connected,
            Some(_) => ConnectionState::Connecting,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state().into()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn current_connection_mut(
        &mut self,
        generation: Generation,
    ) -> Option<&mut ActiveConnection<C::Handle>> {
        self.connection
            .as_mut()
            .filter(|connection| connection.handle.generation() == generation)
    }

    fn log_status(&mut self, text: impl Into<String>) {
        self.surface.append_log(LogLine::status(text));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
