use asc_api::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use log::LevelFilter;
use std::time::Duration;

const DEFAULT_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    /// Tournament-list refresh period. `None` disables the refresher.
    pub refresh_interval: Option<Duration>,
    /// Tournament to open on start, from `--tournament`.
    pub initial_tournament: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: Some(LevelFilter::Info),
            api_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: Some(Duration::from_secs(DEFAULT_REFRESH_SECS)),
            initial_tournament: None,
        }
    }
}

impl AppSettings {
    /// Read `ASC_*` variables from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout = get("ASC_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let refresh_interval = match get("ASC_REFRESH_SECS").map(|v| v.parse::<u64>()) {
            Some(Ok(0)) => None,
            Some(Ok(secs)) => Some(Duration::from_secs(secs)),
            _ => defaults.refresh_interval,
        };

        Self {
            api_url: get("ASC_API_URL").unwrap_or(defaults.api_url),
            api_token: get("ASC_API_TOKEN"),
            timeout,
            refresh_interval,
            log_level: get("ASC_LOG_LEVEL")
                .and_then(|v| v.parse::<LevelFilter>().ok())
                .or(defaults.log_level),
            ..defaults
        }
    }
}
