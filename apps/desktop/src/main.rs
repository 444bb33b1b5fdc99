use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, ChatSurface, ConnectionController, Connector, WsConnector};
use shared::{
    domain::ConnectionState,
    protocol::{TransportEvent, TransportEventKind},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::timeout,
};
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(about = "Chat over a single WebSocket from the terminal")]
struct Args {
    /// Settings file; defaults to ./chat_client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Server origin, e.g. http://127.0.0.1:8080.
    #[arg(long)]
    origin: Option<String>,
    #[arg(long)]
    ws_path: Option<String>,
    #[arg(long)]
    no_auto_connect: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Connect,
    Disconnect,
    Toggle,
    Status,
    Help,
    Quit,
    Say(String),
    Unknown(String),
}

const HELP: &str =
    "commands: /connect /disconnect /toggle /status /help /quit; other lines are sent (use // for a leading /)";

/// How long `/quit` waits for the close handshake before exiting anyway.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

fn parse_line(line: &str) -> Command {
    if let Some(literal) = line.strip_prefix("//") {
        return Command::Say(format!("/{literal}"));
    }
    let Some(command) = line.strip_prefix('/') else {
        return Command::Say(line.to_string());
    };
    match command.trim() {
        "connect" => Command::Connect,
        "disconnect" => Command::Disconnect,
        "toggle" => Command::Toggle,
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    settings.apply_cli_overrides(args.origin, args.ws_path, args.no_auto_connect);
    let endpoint = settings
        .endpoint()
        .with_context(|| format!("cannot derive websocket endpoint from '{}'", settings.origin))?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let connector = WsConnector::new(tokio::runtime::Handle::current(), move |event| {
        let _ = event_tx.send(event);
    });
    let mut controller =
        ConnectionController::new(endpoint, connector, TerminalSurface::new(io::stdout()));
    controller.surface_mut().note(HELP);
    controller.start(settings.auto_connect);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => controller.handle_event(event),
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_line(&line) {
                    Command::Connect => controller.connect(),
                    Command::Disconnect => controller.disconnect(),
                    Command::Toggle => controller.toggle(),
                    Command::Status => {
                        let line = status_line(&controller);
                        controller.surface_mut().note(&line);
                    }
                    Command::Help => controller.surface_mut().note(HELP),
                    Command::Quit => break,
                    Command::Say(text) => {
                        controller.surface_mut().set_input(text);
                        controller.submit();
                    }
                    Command::Unknown(name) => controller
                        .surface_mut()
                        .note(&format!("unknown command '/{name}'; {HELP}")),
                }
            }
        }
    }

    finish_disconnect(&mut controller, &mut event_rx, SHUTDOWN_GRACE).await;
    Ok(())
}

fn status_line<C: Connector, W: io::Write>(
    controller: &ConnectionController<C, TerminalSurface<W>>,
) -> String {
    let surface = controller.surface();
    let shown = surface
        .indicator()
        .map_or("unknown", |status| status.label());
    format!(
        "{shown} ({}); /toggle will {}",
        controller.endpoint(),
        surface.toggle_label()
    )
}

/// Closes the connection and waits up to `grace` for its `Closed` event so the
/// worker can finish the close handshake before the runtime shuts down.
async fn finish_disconnect<C: Connector, S: ChatSurface>(
    controller: &mut ConnectionController<C, S>,
    events: &mut mpsc::UnboundedReceiver<TransportEvent>,
    grace: Duration,
) {
    if controller.state() == ConnectionState::Disconnected {
        return;
    }
    controller.disconnect();
    let generation = controller.generation();

    let drained = timeout(grace, async {
        while let Some(event) = events.recv().await {
            let done = event.generation == generation && event.kind == TransportEventKind::Closed;
            controller.handle_event(event);
            if done {
                return;
            }
        }
    })
    .await;
    if drained.is_err() {
        tracing::warn!(%generation, "exiting before the connection finished closing");
    }
}
