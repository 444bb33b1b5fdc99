//! Transport seam: the controller opens connections through a [`Connector`]
//! and hears back through [`TransportEvent`]s pushed into an [`EventSink`].

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use shared::{domain::Generation, error::ChatError, protocol::TransportEvent};
use tokio::{runtime::Handle, sync::mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

/// Receives every lifecycle event a transport worker produces.
pub type EventSink = Arc<dyn Fn(TransportEvent) + Send + Sync>;

pub trait TransportHandle {
    fn generation(&self) -> Generation;
    /// Queues one text frame. Never blocks.
    fn send_text(&self, text: &str) -> Result<(), ChatError>;
    /// Requests close; completion is reported as a `Closed` event.
    fn close(&self);
}

pub trait Connector {
    type Handle: TransportHandle;

    /// Starts opening a transport. Failures are reported asynchronously as
    /// a `Closed` event for `generation`, never as a synchronous error.
    fn open(&mut self, endpoint: &Url, generation: Generation) -> Self::Handle;
}

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// Opens WebSocket connections on a tokio runtime.
pub struct WsConnector {
    runtime: Handle,
    sink: EventSink,
}

impl WsConnector {
    pub fn new(runtime: Handle, sink: impl Fn(TransportEvent) + Send + Sync + 'static) -> Self {
        Self {
            runtime,
            sink: Arc::new(sink),
        }
    }
}

impl Connector for WsConnector {
    type Handle = WsHandle;

    fn open(&mut self, endpoint: &Url, generation: Generation) -> WsHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.runtime.spawn(run_connection(
            endpoint.to_string(),
            generation,
            outbound_rx,
            Arc::clone(&self.sink),
        ));
        WsHandle {
            generation,
            outbound: outbound_tx,
        }
    }
}

/// Handle to one connection worker. Dropping it closes the connection.
pub struct WsHandle {
    generation: Generation,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl TransportHandle for WsHandle {
    fn generation(&self) -> Generation {
        self.generation
    }

    fn send_text(&self, text: &str) -> Result<(), ChatError> {
        self.outbound
            .send(Outbound::Text(text.to_string()))
            .map_err(|_| ChatError::TransportClosed)
    }

    fn close(&self) {
        // The worker may already be gone; it has reported `Closed` then.
        let _ = self.outbound.send(Outbound::Close);
    }
}

async fn wait_for_close(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
    loop {
        match outbound.recv().await {
            Some(Outbound::Close) | None => return,
            Some(Outbound::Text(_)) => {
                debug!("dropping frame queued before the connection opened");
            }
        }
    }
}

async fn run_connection(
    endpoint: String,
    generation: Generation,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    sink: EventSink,
) {
    let ws_stream = tokio::select! {
        result = connect_async(endpoint.as_str()) => match result {
            Ok((stream, _response)) => stream,
            Err(err) => {
                warn!(%generation, %endpoint, error = %err, "websocket connect failed");
                sink(TransportEvent::closed(generation));
                return;
            }
        },
        _ = wait_for_close(&mut outbound) => {
            info!(%generation, %endpoint, "websocket connect cancelled");
            sink(TransportEvent::closed(generation));
            return;
        }
    };

    info!(%generation, %endpoint, "websocket open");
    sink(TransportEvent::opened(generation));

    let (mut writer, mut reader) = ws_stream.split();
    loop {
        tokio::select! {
            inbound = reader.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    debug!(%generation, bytes = text.len(), "frame received");
                    sink(TransportEvent::message(generation, text));
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(%generation, ?frame, "websocket closed by peer");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(%generation, error = %err, "websocket receive failed");
                    break;
                }
                None => break,
            },
            command = outbound.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(err) = writer.send(Message::Text(text)).await {
                        warn!(%generation, error = %err, "websocket send failed");
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(err) = writer.close().await {
                        debug!(%generation, error = %err, "websocket close handshake failed");
                    }
                    break;
                }
            },
        }
    }

    info!(%generation, "websocket closed");
    sink(TransportEvent::closed(generation));
}
