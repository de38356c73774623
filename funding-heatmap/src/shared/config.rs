/// Heatmap configuration
///
/// Settings come from the environment, each with a default:
/// - `HEATMAP_API_URL` base URL of the funding backend (default `http://localhost:8001`)
/// - `HEATMAP_REFRESH_SECS` polling period (default 30)
/// - `HEATMAP_HTTP_TIMEOUT_SECS` per-request timeout (default 10)
/// - `HEATMAP_LOG_FILE` optional tracing output file

use std::{path::PathBuf, time::Duration};

use url::Url;

use super::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the funding endpoint relative to the base URL
pub const DATA_PATH: &str = "api/hyperliquid/data";

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapConfig {
    /// Base URL of the backend serving the funding data
    pub api_base: Url,
    /// Polling period of the refresh scheduler
    pub refresh_period: Duration,
    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,
    /// Where tracing output goes; `None` disables logging
    pub log_file: Option<PathBuf>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_URL).expect("default API url is valid"),
            refresh_period: DEFAULT_REFRESH_PERIOD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_file: None,
        }
    }
}

impl HeatmapConfig {
    /// Create a configuration for a custom base URL
    pub fn new(api_base: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: parse_base(api_base)?,
            ..Default::default()
        })
    }

    /// Read every setting from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = match get("HEATMAP_API_URL") {
            Some(url) => Self::new(&url)?,
            None => Self::default(),
        };

        if let Some(secs) = get("HEATMAP_REFRESH_SECS") {
            config.refresh_period = parse_secs("HEATMAP_REFRESH_SECS", secs)?;
        }
        if let Some(secs) = get("HEATMAP_HTTP_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("HEATMAP_HTTP_TIMEOUT_SECS", secs)?;
        }
        config.log_file = get("HEATMAP_LOG_FILE").map(PathBuf::from);

        Ok(config)
    }

    /// Set refresh period
    pub fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = period;
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL of the funding endpoint
    pub fn data_url(&self) -> Url {
        // `parse_base` guarantees a trailing slash, so join appends
        self.api_base
            .join(DATA_PATH)
            .unwrap_or_else(|_| self.api_base.clone())
    }
}

fn parse_base(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_secs(name: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
