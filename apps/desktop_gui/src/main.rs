use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use client_core::load_settings;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod ui;

use backend_bridge::runtime::build_transport_runtime;
use ui::ChatApp;

const WINDOW_TITLE: &str = "WebSocket Chat";

#[derive(Parser, Debug)]
#[command(about = "Chat over a single WebSocket in a desktop window")]
struct Args {
    /// Settings file; defaults to ./chat_client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Server origin, e.g. https://chat.example.com.
    #[arg(long)]
    origin: Option<String>,
    #[arg(long)]
    ws_path: Option<String>,
    #[arg(long)]
    no_auto_connect: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    settings.apply_cli_overrides(args.origin, args.ws_path, args.no_auto_connect);
    let endpoint = settings
        .endpoint()
        .with_context(|| format!("cannot derive websocket endpoint from '{}'", settings.origin))?;
    let auto_connect = settings.auto_connect;
    let runtime = build_transport_runtime()?;

    tracing::info!(%endpoint, auto_connect, "starting chat window");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([640.0, 480.0])
            .with_min_inner_size([360.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            Ok(Box::new(ChatApp::new(
                cc.egui_ctx.clone(),
                endpoint,
                auto_connect,
                runtime,
            )))
        }),
    )
    .map_err(|err| anyhow!("chat window exited with error: {err}"))
}
