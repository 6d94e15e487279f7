use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::lang;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub presenter: PresenterConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Which collaborator adapter talks to the cache runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// Shell out to a status script that prints snapshot JSON.
    Command,
    /// Serve an in-memory snapshot loaded from a JSON file.
    Fixture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    pub kind: RuntimeKind,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
}

/// Options consumed by the snapshot normalizer and the renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_size_precision")]
    pub size_precision: usize,
    #[serde(default)]
    pub size_space: bool,
    /// chrono strftime format used for every timestamp.
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
    /// Radial gauges instead of big numbers for percentage metrics.
    #[serde(default = "default_true")]
    pub charts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,
    /// Text overrides keyed like the built-in English strings (localization).
    #[serde(default)]
    pub language_pack: BTreeMap<String, String>,
}

fn default_size_precision() -> usize {
    2
}

fn default_datetime_format() -> String {
    "%a, %d %b %Y %H:%M:%S %z".into()
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            size_precision: default_size_precision(),
            size_space: false,
            datetime_format: default_datetime_format(),
            charts: true,
            highlight: HighlightConfig::default(),
            language_pack: BTreeMap::new(),
        }
    }
}

impl DisplayConfig {
    /// Localized text for `key`: language pack override first, then the built-in string.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.language_pack
            .get(key)
            .map(String::as_str)
            .or_else(|| lang::default_text(key))
            .unwrap_or(key)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_true")]
    pub memory: bool,
    #[serde(default = "default_true")]
    pub hits: bool,
    #[serde(default = "default_true")]
    pub keys: bool,
    #[serde(default = "default_true")]
    pub jit: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            memory: true,
            hits: true,
            keys: true,
            jit: true,
        }
    }
}

/// Interactive behaviour of the dashboard page.
#[derive(Debug, Clone, Deserialize)]
pub struct PresenterConfig {
    #[serde(default = "default_true")]
    pub allow_filelist: bool,
    #[serde(default = "default_true")]
    pub allow_invalidate: bool,
    #[serde(default = "default_true")]
    pub allow_reset: bool,
    #[serde(default = "default_true")]
    pub allow_realtime: bool,
    #[serde(default = "default_refresh_time_ms")]
    pub refresh_time_ms: u64,
    #[serde(default = "default_debounce_rate_ms")]
    pub debounce_rate_ms: u64,
    /// Rows per file-list page; 0 disables pagination.
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_refresh_time_ms() -> u64 {
    5000
}

fn default_debounce_rate_ms() -> u64 {
    250
}

fn default_per_page() -> usize {
    200
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            allow_filelist: true,
            allow_invalidate: true,
            allow_reset: true,
            allow_realtime: true,
            refresh_time_ms: default_refresh_time_ms(),
            debounce_rate_ms: default_debounce_rate_ms(),
            per_page: default_per_page(),
        }
    }
}

/// Realtime preference cookie.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,
    #[serde(default = "default_cookie_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cookie_name() -> String {
    "opcachegui_realtime".into()
}

fn default_cookie_ttl_secs() -> u64 {
    86_400
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            ttl_secs: default_cookie_ttl_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        match self.runtime.kind {
            RuntimeKind::Command => anyhow::ensure!(
                self.runtime.program.as_deref().is_some_and(|p| !p.is_empty()),
                "runtime.program must be set when runtime.kind = \"command\""
            ),
            RuntimeKind::Fixture => anyhow::ensure!(
                self.runtime.fixture_path.is_some(),
                "runtime.fixture_path must be set when runtime.kind = \"fixture\""
            ),
        }
        anyhow::ensure!(
            self.display.size_precision <= 6,
            "display.size_precision must be <= 6, got {}",
            self.display.size_precision
        );
        anyhow::ensure!(
            !self.display.datetime_format.is_empty(),
            "display.datetime_format must be non-empty"
        );
        anyhow::ensure!(
            self.presenter.refresh_time_ms > 0,
            "presenter.refresh_time_ms must be > 0, got {}",
            self.presenter.refresh_time_ms
        );
        anyhow::ensure!(
            self.presenter.debounce_rate_ms > 0,
            "presenter.debounce_rate_ms must be > 0, got {}",
            self.presenter.debounce_rate_ms
        );
        anyhow::ensure!(
            !self.cookie.name.is_empty()
                && self
                    .cookie
                    .name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "cookie.name must be a non-empty token of [A-Za-z0-9_-], got {:?}",
            self.cookie.name
        );
        anyhow::ensure!(
            self.cookie.ttl_secs > 0,
            "cookie.ttl_secs must be > 0, got {}",
            self.cookie.ttl_secs
        );
        Ok(())
    }
}
