// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rfpdesk_app::{ChatTiming, DEFAULT_REPLY_DELAY, DEFAULT_TYPING_INTERVAL};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "rfpdesk";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const URL_ENV: &str = "SUPABASE_URL";
const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub remote: Remote,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub chat: Chat,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            remote: Remote::default(),
            export: Export::default(),
            chat: Chat::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Remote {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Export {
    pub dir: Option<String>,
    pub open_html: Option<bool>,
}

impl Default for Export {
    fn default() -> Self {
        Self {
            dir: None,
            open_html: Some(true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chat {
    pub reply_delay: Option<String>,
    pub typing_interval: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("RFPDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set RFPDESK_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [remote], [export], [chat], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let durations = [
            ("remote.timeout", &self.remote.timeout),
            ("chat.reply_delay", &self.chat.reply_delay),
            ("chat.typing_interval", &self.chat.typing_interval),
        ];
        for (key, raw) in durations {
            let Some(raw) = raw else {
                continue;
            };
            let parsed = parse_duration(raw)
                .with_context(|| format!("{key} in {}", path.display()))?;
            if parsed.is_zero() {
                bail!("{key} in {} must be positive, got {raw}", path.display());
            }
        }

        if let Some(level) = &self.logging.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            bail!(
                "logging.level in {} must be one of {}, got {level:?}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        if let Some(dir) = &self.export.dir
            && dir.trim().is_empty()
        {
            bail!(
                "export.dir in {} must not be empty; remove it to use the download directory",
                path.display()
            );
        }

        Ok(())
    }

    /// Config value first, then `SUPABASE_URL`.
    pub fn remote_url(&self) -> Option<String> {
        config_or_env(self.remote.url.as_deref(), URL_ENV)
    }

    /// Config value first, then `SUPABASE_ANON_KEY`.
    pub fn remote_anon_key(&self) -> Option<String> {
        config_or_env(self.remote.anon_key.as_deref(), ANON_KEY_ENV)
    }

    pub fn remote_timeout(&self) -> Result<Duration> {
        parse_duration(self.remote.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn export_dir(&self) -> PathBuf {
        match &self.export.dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn open_html(&self) -> bool {
        self.export.open_html.unwrap_or(true)
    }

    pub fn chat_timing(&self) -> Result<ChatTiming> {
        let reply_delay = match &self.chat.reply_delay {
            Some(raw) => parse_duration(raw)?,
            None => DEFAULT_REPLY_DELAY,
        };
        let typing_interval = match &self.chat.typing_interval {
            Some(raw) => parse_duration(raw)?,
            None => DEFAULT_TYPING_INTERVAL,
        };
        Ok(ChatTiming {
            reply_delay,
            typing_interval,
        })
    }

    pub fn log_level(&self) -> String {
        self.logging
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_ascii_lowercase()
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.logging.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [logging].file to a log file path")
        })?;
        Ok(data_root.join(APP_NAME).join("rfpdesk.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rfpdesk config\n# Place this file at: {}\n\nversion = 1\n\n[remote]\n# Falls back to SUPABASE_URL / SUPABASE_ANON_KEY when unset\n# url = \"https://your-project.supabase.co\"\n# anon_key = \"your-anon-key\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[export]\n# Optional. Default is the platform download directory\n# dir = \"/absolute/path/to/exports\"\nopen_html = true\n\n[chat]\nreply_delay = \"500ms\"\ntyping_interval = \"15ms\"\n\n[logging]\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/rfpdesk/rfpdesk.log)\n# file = \"/absolute/path/to/rfpdesk.log\"\n",
            path.display(),
        )
    }
}

fn config_or_env(configured: Option<&str>, var: &str) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .or_else(|| {
            env::var(var)
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        })
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
