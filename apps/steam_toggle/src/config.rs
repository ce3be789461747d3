use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "steam_toggle.toml";
const ENV_PREFIX: &str = "STEAM_TOGGLE__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub button_index: u8,
    pub online_icon: PathBuf,
    pub invisible_icon: PathBuf,
    pub alerts_enabled: bool,
    pub alert_title: String,
    pub alert_timeout_seconds: u64,
    pub call_timeout_ms: u64,
    pub render_dir: PathBuf,
    pub presence_url: Option<String>,
    pub presence_token: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            button_index: 0,
            online_icon: PathBuf::from("images/online.png"),
            invisible_icon: PathBuf::from("images/invisible.png"),
            alerts_enabled: true,
            alert_title: "Stream Deck Plugin".into(),
            alert_timeout_seconds: 1,
            call_timeout_ms: 5000,
            render_dir: PathBuf::from("./render"),
            presence_url: None,
            presence_token: None,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    button_index: Option<u8>,
    online_icon: Option<PathBuf>,
    invisible_icon: Option<PathBuf>,
    alerts_enabled: Option<bool>,
    alert_title: Option<String>,
    alert_timeout_seconds: Option<u64>,
    call_timeout_ms: Option<u64>,
    render_dir: Option<PathBuf>,
    presence_url: Option<String>,
    presence_token: Option<String>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn alert_display(&self) -> Duration {
        Duration::from_secs(self.alert_timeout_seconds)
    }

    pub fn presence_endpoint(&self) -> anyhow::Result<Option<Url>> {
        self.presence_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).with_context(|| format!("invalid presence_url '{raw}'"))
            })
            .transpose()
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.button_index {
            self.button_index = v;
        }
        if let Some(v) = file.online_icon {
            self.online_icon = v;
        }
        if let Some(v) = file.invisible_icon {
            self.invisible_icon = v;
        }
        if let Some(v) = file.alerts_enabled {
            self.alerts_enabled = v;
        }
        if let Some(v) = file.alert_title {
            self.alert_title = v;
        }
        if let Some(v) = file.alert_timeout_seconds {
            self.alert_timeout_seconds = v;
        }
        if let Some(v) = file.call_timeout_ms {
            self.call_timeout_ms = v;
        }
        if let Some(v) = file.render_dir {
            self.render_dir = v;
        }
        if file.presence_url.is_some() {
            self.presence_url = file.presence_url;
        }
        if file.presence_token.is_some() {
            self.presence_token = file.presence_token;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
    }

    /// Values that fail to parse are skipped and the previous value kept.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("BUTTON_INDEX").and_then(|v| v.trim().parse().ok()) {
            self.button_index = v;
        }
        if let Some(v) = var("ONLINE_ICON") {
            self.online_icon = PathBuf::from(v);
        }
        if let Some(v) = var("INVISIBLE_ICON") {
            self.invisible_icon = PathBuf::from(v);
        }
        if let Some(v) = var("ALERTS_ENABLED").and_then(|v| parse_bool(&v)) {
            self.alerts_enabled = v;
        }
        if let Some(v) = var("ALERT_TITLE") {
            self.alert_title = v;
        }
        if let Some(v) = var("ALERT_TIMEOUT_SECONDS").and_then(|v| v.trim().parse().ok()) {
            self.alert_timeout_seconds = v;
        }
        if let Some(v) = var("CALL_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
            self.call_timeout_ms = v;
        }
        if let Some(v) = var("RENDER_DIR") {
            self.render_dir = PathBuf::from(v);
        }
        if let Some(v) = var("PRESENCE_URL") {
            self.presence_url = Some(v);
        }
        if let Some(v) = var("PRESENCE_TOKEN") {
            self.presence_token = Some(v);
        }
        if let Some(v) = var("LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Defaults, then the TOML file at `path` if it exists, then
/// `STEAM_TOGGLE__*` environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

fn load_settings_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            settings.apply_file(file);
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    settings.apply_env(lookup);
    settings.presence_endpoint()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
