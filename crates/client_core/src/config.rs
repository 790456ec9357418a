use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::domain::ExerciseKind;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "trends.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub access_token: Option<String>,
    pub exercise_kind: ExerciseKind,
    /// Per-fetch limit. `None` leaves a hung fetch loading indefinitely.
    pub fetch_timeout_secs: Option<u64>,
    pub include_goals: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            access_token: None,
            exercise_kind: ExerciseKind::Strength,
            fetch_timeout_secs: None,
            include_goals: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    access_token: Option<String>,
    exercise_kind: Option<ExerciseKind>,
    fetch_timeout_secs: Option<u64>,
    include_goals: Option<bool>,
}

impl ClientSettings {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn apply_toml(&mut self, raw: &str) -> Result<()> {
        let file: FileSettings = toml::from_str(raw).context("invalid settings file")?;
        if let Some(v) = file.server_url {
            self.server_url = v;
        }
        if let Some(v) = file.access_token {
            self.access_token = Some(v);
        }
        if let Some(v) = file.exercise_kind {
            self.exercise_kind = v;
        }
        if let Some(v) = file.fetch_timeout_secs {
            self.fetch_timeout_secs = Some(v);
        }
        if let Some(v) = file.include_goals {
            self.include_goals = v;
        }
        Ok(())
    }

    /// Applies environment overrides. Unparseable values are logged and
    /// skipped.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("TRENDS_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("TRENDS_ACCESS_TOKEN") {
            self.access_token = Some(v);
        }
        if let Some(v) = lookup("TRENDS_EXERCISE_KIND") {
            match v.parse() {
                Ok(kind) => self.exercise_kind = kind,
                Err(err) => warn!(value = %v, error = %err, "ignoring TRENDS_EXERCISE_KIND"),
            }
        }
        if let Some(v) = lookup("TRENDS_FETCH_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) => self.fetch_timeout_secs = Some(secs),
                Err(err) => warn!(value = %v, error = %err, "ignoring TRENDS_FETCH_TIMEOUT_SECS"),
            }
        }
        if let Some(v) = lookup("TRENDS_INCLUDE_GOALS") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.include_goals = true,
                "0" | "false" | "no" => self.include_goals = false,
                _ => warn!(value = %v, "ignoring TRENDS_INCLUDE_GOALS"),
            }
        }
    }
}

/// Defaults, then the settings file, then the environment. An explicit path
/// must exist; the default `trends.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => settings
            .apply_toml(&raw)
            .with_context(|| format!("failed to load {}", path.display()))?,
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
        Err(_) => {}
    }

    settings.apply_env_with(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
