use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_SOURCE: &str = "data/iot-hours.json";

/// Where the telemetry document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(String),
    File(PathBuf),
}

impl DataSource {
    /// `http(s)://` locations are fetched over HTTP, `file://` and bare paths are read from disk
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Http(location.to_string())
        } else if let Some(path) = location.strip_prefix("file://") {
            DataSource::File(PathBuf::from(path))
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Http(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub source: DataSource,
    pub poll_interval: Duration,
    /// Only applies to HTTP sources. `None` leaves the transport's own behaviour in place.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Reads IOT_DATA_SOURCE, IOT_POLL_INTERVAL_MS and IOT_REQUEST_TIMEOUT_MS.
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let source = env::var("IOT_DATA_SOURCE").unwrap_or_else(|_| DEFAULT_SOURCE.to_string());
        let poll_interval_ms: u64 = env::var("IOT_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse()
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        let request_timeout = env::var("IOT_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis);

        Self {
            source: DataSource::parse(&source),
            // A zero period would make the interval timer panic
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
            request_timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DataSource::parse(DEFAULT_SOURCE))
    }
}
