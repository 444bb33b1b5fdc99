//! Client core for a single-connection WebSocket chat: the connection
//! controller, its UI surface contract, the WebSocket transport, and
//! settings.

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod surface;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use controller::ConnectionController;
pub use endpoint::ws_endpoint;
pub use surface::ChatSurface;
pub use transport::{Connector, EventSink, TransportHandle, WsConnector, WsHandle};

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod transport_tests;
