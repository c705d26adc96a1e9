//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{bail, Context, Result};
use shared::search::{DrainOptions, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// URL scheme selecting the in-process search backend.
pub const MEMORY_SEARCH_URL: &str = "memory://";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("Unknown log format '{other}', expected 'text' or 'json'"),
        }
    }
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `LOGSCOPE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `LOGSCOPE_PORT`: The port to listen on (default: 8080)
/// - `LOGSCOPE_SEARCH_URL`: Search backend base URL (default: <http://localhost:9200>).
///   `memory://` selects the in-process backend.
/// - `LOGSCOPE_SEARCH_TIMEOUT_SECS`: Per-round-trip HTTP timeout (default: 10)
/// - `LOGSCOPE_PAGE_SIZE`: Scroll page size, 1..=10000 (default: 1000)
/// - `LOGSCOPE_SCROLL_WINDOW_SECS`: Cursor keep-alive window (default: 60)
/// - `LOGSCOPE_REQUEST_DEADLINE_SECS`: Whole-drain deadline per request (default: 30)
/// - `LOGSCOPE_ALERTS_FILE`: JSON file of alert registrations (default: unset)
/// - `LOGSCOPE_EXPORT_DIR`: Directory for generated documents (default: "exports")
/// - `LOGSCOPE_LOG_FORMAT`: `text` or `json` (default: text)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Search backend base URL.
    pub search_url: String,
    /// Per-round-trip timeout towards the search backend.
    pub search_timeout: Duration,
    /// Scroll page size.
    pub page_size: usize,
    /// Cursor keep-alive window.
    pub scroll_window: Duration,
    /// Whole-drain deadline per request.
    pub request_deadline: Duration,
    /// Optional alert registrations file.
    pub alerts_file: Option<PathBuf>,
    /// Directory for generated documents.
    pub export_dir: PathBuf,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A numeric variable is set but cannot be parsed
    /// - `LOGSCOPE_PAGE_SIZE` is outside 1..=10000
    /// - `LOGSCOPE_LOG_FORMAT` is neither `text` nor `json`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("LOGSCOPE_HOST").unwrap_or(defaults.host);
        let port = env_parse::<u16>("LOGSCOPE_PORT")?.unwrap_or(defaults.port);
        let search_url = std::env::var("LOGSCOPE_SEARCH_URL").unwrap_or(defaults.search_url);
        let search_timeout = env_secs("LOGSCOPE_SEARCH_TIMEOUT_SECS")?
            .unwrap_or(defaults.search_timeout);
        let page_size = env_parse::<usize>("LOGSCOPE_PAGE_SIZE")?.unwrap_or(defaults.page_size);
        let scroll_window =
            env_secs("LOGSCOPE_SCROLL_WINDOW_SECS")?.unwrap_or(defaults.scroll_window);
        let request_deadline =
            env_secs("LOGSCOPE_REQUEST_DEADLINE_SECS")?.unwrap_or(defaults.request_deadline);
        let alerts_file = std::env::var("LOGSCOPE_ALERTS_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let export_dir = std::env::var("LOGSCOPE_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);
        let log_format = std::env::var("LOGSCOPE_LOG_FORMAT")
            .ok()
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            host,
            port,
            search_url,
            search_timeout,
            page_size,
            scroll_window,
            request_deadline,
            alerts_file,
            export_dir,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size or a window is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            bail!(
                "LOGSCOPE_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            );
        }
        if self.scroll_window.is_zero() {
            bail!("LOGSCOPE_SCROLL_WINDOW_SECS must be positive");
        }
        if self.request_deadline.is_zero() {
            bail!("LOGSCOPE_REQUEST_DEADLINE_SECS must be positive");
        }
        Ok(())
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Returns true if the in-process search backend is selected.
    #[must_use]
    pub fn uses_memory_backend(&self) -> bool {
        self.search_url.starts_with(MEMORY_SEARCH_URL)
    }

    /// Drain settings derived from this configuration.
    #[must_use]
    pub fn drain_options(&self) -> DrainOptions {
        DrainOptions::default()
            .with_page_size(self.page_size)
            .with_scroll_window(self.scroll_window)
            .with_deadline(self.request_deadline)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            search_url: "http://localhost:9200".to_string(),
            search_timeout: Duration::from_secs(10),
            page_size: DEFAULT_PAGE_SIZE,
            scroll_window: Duration::from_secs(60),
            request_deadline: Duration::from_secs(30),
            alerts_file: None,
            export_dir: PathBuf::from("exports"),
            log_format: LogFormat::Text,
        }
    }
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(name)
        .ok()
        .map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("Invalid value for {name}"))
}

fn env_secs(name: &str) -> Result<Option<Duration>> {
    Ok(env_parse::<u64>(name)?.map(Duration::from_secs))
}
