use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::error::ChatError;
use url::Url;

use crate::endpoint::{ws_endpoint, DEFAULT_WS_PATH};

pub const DEFAULT_SETTINGS_FILE: &str = "chat_client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Origin of the chat server, e.g. `http://127.0.0.1:8080`.
    pub origin: String,
    pub ws_path: String,
    pub auto_connect: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8080".into(),
            ws_path: DEFAULT_WS_PATH.into(),
            auto_connect: true,
        }
    }
}

impl ClientSettings {
    pub fn endpoint(&self) -> Result<Url, ChatError> {
        ws_endpoint(&self.origin, &self.ws_path)
    }

    /// Applies command-line flags, which win over file and env values.
    pub fn apply_cli_overrides(
        &mut self,
        origin: Option<String>,
        ws_path: Option<String>,
        no_auto_connect: bool,
    ) {
        if let Some(origin) = origin {
            self.origin = origin;
        }
        if let Some(ws_path) = ws_path {
            self.ws_path = ws_path;
        }
        if no_auto_connect {
            self.auto_connect = false;
        }
    }
}

/// Defaults, then the settings file, then env overrides.
///
/// An explicitly named file must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                read_settings_file(&default_path)?
            } else {
                ClientSettings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<ClientSettings> {
    toml::from_str(raw).context("failed to parse client settings")
}

fn read_settings_file(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid settings file '{}'", path.display()))
}

pub fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CHAT_ORIGIN") {
        settings.origin = v;
    }
    if let Some(v) = lookup("APP__ORIGIN") {
        settings.origin = v;
    }

    if let Some(v) = lookup("APP__WS_PATH") {
        settings.ws_path = v;
    }

    if let Some(v) = lookup("APP__AUTO_CONNECT") {
        if let Some(parsed) = parse_flag(&v) {
            settings.auto_connect = parsed;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
