//! Derives the WebSocket endpoint from the origin a client was pointed at.

use shared::error::ChatError;
use url::Url;

pub const DEFAULT_WS_PATH: &str = "/ws";

/// Maps `http`→`ws` and `https`→`wss`, keeps host and port, and replaces
/// everything after the authority with `path`.
pub fn ws_endpoint(origin: &str, path: &str) -> Result<Url, ChatError> {
    let parsed = Url::parse(origin.trim())
        .map_err(|err| ChatError::invalid_origin(origin, err.to_string()))?;

    let scheme = match parsed.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(ChatError::invalid_origin(
                origin,
                format!("unsupported scheme '{other}', expected http(s) or ws(s)"),
            ))
        }
    };

    let Some(host) = parsed.host_str() else {
        return Err(ChatError::invalid_origin(origin, "missing host"));
    };

    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Url::parse(&format!("{scheme}://{authority}{path}"))
        .map_err(|err| ChatError::invalid_origin(origin, err.to_string()))
}
