//! Runtime configuration, resolved once at startup.
//!
//! Layering, lowest to highest precedence: built-in defaults, a TOML file
//! (explicit path or `config.toml` in the platform config dir), then
//! `MASTHEAD_*` environment variables. The CLI applies its flags on top.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub token: Option<String>,
    /// Items fetched per collection when filling the content store.
    pub page_size: usize,
    pub timeout: Duration,
    pub slow_warn: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_millis(15_000),
            slow_warn: Duration::from_secs(5),
        }
    }
}

/// On-disk shape; every key optional.
#[derive(Debug, Deserialize, Clone, Default)]
struct FileConfig {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    page_size: Option<usize>,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    slow_warn_ms: Option<u64>,
}

impl Config {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = Config::default();
        let file = match path {
            Some(p) => Some(read_file(p)?),
            None => match default_config_path() {
                Some(p) if p.is_file() => Some(read_file(&p)?),
                _ => None,
            },
        };
        if let Some(file) = file { cfg.apply_file(file)?; }
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn with_api_url(mut self, raw: &str) -> Result<Self> {
        self.api_url = parse_api_url(raw)?;
        Ok(self)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(u) = file.api_url { self.api_url = parse_api_url(&u)?; }
        if let Some(t) = file.token { *self = std::mem::take(self).with_token(t); }
        if let Some(n) = file.page_size { self.page_size = n.max(1); }
        if let Some(ms) = file.timeout_ms { self.timeout = Duration::from_millis(ms); }
        if let Some(ms) = file.slow_warn_ms { self.slow_warn = Duration::from_millis(ms); }
        Ok(())
    }

    fn apply_env<F>(&mut self, get: F) -> Result<()>
    where F: Fn(&str) -> Option<String> {
        if let Some(u) = get("MASTHEAD_API_URL") { self.api_url = parse_api_url(&u)?; }
        if let Some(t) = get("MASTHEAD_API_TOKEN") { *self = std::mem::take(self).with_token(t); }
        if let Some(n) = get("MASTHEAD_PAGE_SIZE").and_then(|s| s.parse::<usize>().ok()) { self.page_size = n.max(1); }
        if let Some(ms) = get("MASTHEAD_TIMEOUT_MS").and_then(|s| s.parse::<u64>().ok()) { self.timeout = Duration::from_millis(ms); }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config file: {}", path.display()))
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid api url: {raw}"))?;
    anyhow::ensure!(matches!(url.scheme(), "http" | "https"), "api url must be http(s): {raw}");
    Ok(url)
}

/// `<platform config dir>/config.toml`, if a home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "masthead", "masthead").map(|p| p.config_dir().join("config.toml"))
}
