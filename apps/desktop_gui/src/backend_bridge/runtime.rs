//! Tokio runtime hosting the transport workers, and the sink that hands their
//! events to the UI thread.

use anyhow::Context;
use crossbeam_channel::{Sender, TrySendError};
use shared::protocol::TransportEvent;
use tokio::runtime::Runtime;

pub fn build_transport_runtime() -> anyhow::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("chat-transport")
        .enable_all()
        .build()
        .context("failed to build transport runtime")
}

/// Queues events for the frame loop and wakes it with `repaint`.
pub fn ui_event_sink(
    ui_tx: Sender<TransportEvent>,
    repaint: impl Fn() + Send + Sync + 'static,
) -> impl Fn(TransportEvent) + Send + Sync + 'static {
    move |event| match ui_tx.try_send(event) {
        Ok(()) => repaint(),
        Err(TrySendError::Full(event)) => {
            tracing::warn!(generation = %event.generation, "ui event queue full; dropping transport event");
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui event queue closed; dropping transport event");
        }
    }
}
