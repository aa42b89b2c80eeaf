//! Service configuration parsed from environment variables.
//!
//! `from_env` reads the process environment (after `dotenvy` has loaded a
//! local `.env`); `from_lookup` takes any key lookup so tests never touch
//! process-global state.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_API_URL: &str = "http://localhost:4000/api";
pub const DEFAULT_STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";
pub const DEFAULT_CHECKOUT_PATH: &str = "/checkout";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VISITOR_IDLE_HOURS: u64 = 72;
pub const DEFAULT_VISITOR_CAPACITY: usize = 10_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Parse { key: &'static str, value: String },
}

/// Timeouts applied to every outbound HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub backend_api_url: String,
    /// `None` disables the static map route (it answers 500).
    pub maps_api_key: Option<String>,
    pub static_map_url: String,
    pub checkout_path: String,
    pub cookie_secure: bool,
    pub timeouts: HttpTimeouts,
    /// Visitor stores idle this long are dropped.
    pub visitor_idle_hours: u64,
    pub visitor_capacity: usize,
}

impl AppConfig {
    #[must_use]
    pub fn visitor_idle(&self) -> Duration {
        Duration::from_secs(self.visitor_idle_hours.saturating_mul(60 * 60))
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BACKEND_API_URL`: booking backend base URL
    /// - `GOOGLE_MAPS_API_KEY`: static map provider key
    /// - `MAPS_STATIC_BASE_URL`: static map endpoint
    /// - `CHECKOUT_PATH`: default redirect after cart sync
    /// - `COOKIE_SECURE`: inferred from an `https` backend URL when absent
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 10
    /// - `VISITOR_IDLE_HOURS`: default 72
    /// - `VISITOR_CAPACITY`: default 10000
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let port = parse_or("PORT", non_empty("PORT"), DEFAULT_PORT)?;
        let backend_api_url = non_empty("BACKEND_API_URL")
            .unwrap_or_else(|| DEFAULT_BACKEND_API_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let static_map_url = non_empty("MAPS_STATIC_BASE_URL").unwrap_or_else(|| DEFAULT_STATIC_MAP_URL.to_owned());
        let checkout_path = non_empty("CHECKOUT_PATH")
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| DEFAULT_CHECKOUT_PATH.to_owned());

        let cookie_secure = match non_empty("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Parse { key: "COOKIE_SECURE", value: raw })?,
            None => backend_api_url.starts_with("https://"),
        };

        let timeouts = HttpTimeouts {
            request_secs: parse_or(
                "BACKEND_REQUEST_TIMEOUT_SECS",
                non_empty("BACKEND_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_or(
                "BACKEND_CONNECT_TIMEOUT_SECS",
                non_empty("BACKEND_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };

        let visitor_idle_hours =
            parse_or("VISITOR_IDLE_HOURS", non_empty("VISITOR_IDLE_HOURS"), DEFAULT_VISITOR_IDLE_HOURS)?;
        let visitor_capacity = parse_or("VISITOR_CAPACITY", non_empty("VISITOR_CAPACITY"), DEFAULT_VISITOR_CAPACITY)?;

        Ok(Self {
            port,
            backend_api_url,
            maps_api_key: non_empty("GOOGLE_MAPS_API_KEY"),
            static_map_url,
            checkout_path,
            cookie_secure,
            timeouts,
            visitor_idle_hours,
            visitor_capacity,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_api_url: DEFAULT_BACKEND_API_URL.to_owned(),
            maps_api_key: None,
            static_map_url: DEFAULT_STATIC_MAP_URL.to_owned(),
            checkout_path: DEFAULT_CHECKOUT_PATH.to_owned(),
            cookie_secure: false,
            timeouts: HttpTimeouts::default(),
            visitor_idle_hours: DEFAULT_VISITOR_IDLE_HOURS,
            visitor_capacity: DEFAULT_VISITOR_CAPACITY,
        }
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Parse { key, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
