//! Runtime configuration for the uploader

use crate::error::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

const ENV_BASE_URL: &str = "CSV_UPLOADER_BASE_URL";
const ENV_POLL_INTERVAL: &str = "CSV_UPLOADER_POLL_INTERVAL_MS";
const ENV_MAX_POLL_FAILURES: &str = "CSV_UPLOADER_MAX_POLL_FAILURES";
const ENV_REQUEST_TIMEOUT: &str = "CSV_UPLOADER_REQUEST_TIMEOUT_SECS";
const ENV_STATUS_TIMEOUT: &str = "CSV_UPLOADER_STATUS_TIMEOUT_MS";

/// Server location and polling behavior
#[derive(Clone, Debug, Deserialize)]
pub struct UploaderConfig {
    /// Server root, without trailing slash (default: "http://127.0.0.1:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Delay between status queries (default: 3000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bytes inspected by the content sniff (default: 8192)
    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,

    /// Consecutive status transport failures before giving up (None = retry forever)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: Option<u32>,

    /// Deadline for a single status query; a late answer counts as a failure (default: 10000)
    #[serde(default = "default_status_timeout_ms")]
    pub status_timeout_ms: u64,

    /// Per-request timeout (None = transport default)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            sniff_bytes: default_sniff_bytes(),
            max_consecutive_failures: default_max_consecutive_failures(),
            status_timeout_ms: default_status_timeout_ms(),
            request_timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_sniff_bytes() -> usize {
    8192
}

fn default_status_timeout_ms() -> u64 {
    10_000
}

fn default_max_consecutive_failures() -> Option<u32> {
    Some(10)
}

impl UploaderConfig {
    /// Build from the process environment, loading `.env` first when present.
    ///
    /// `CSV_UPLOADER_MAX_POLL_FAILURES=0` disables the failure cap.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(Error::config(ENV_BASE_URL, "must not be empty"));
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            let ms = parse_number::<u64>(ENV_POLL_INTERVAL, &raw)?;
            if ms == 0 {
                return Err(Error::config(ENV_POLL_INTERVAL, "must be greater than zero"));
            }
            config.poll_interval_ms = ms;
        }

        if let Some(raw) = lookup(ENV_MAX_POLL_FAILURES) {
            config.max_consecutive_failures = match parse_number::<u32>(ENV_MAX_POLL_FAILURES, &raw)? {
                0 => None,
                n => Some(n),
            };
        }

        if let Some(raw) = lookup(ENV_STATUS_TIMEOUT) {
            let ms = parse_number::<u64>(ENV_STATUS_TIMEOUT, &raw)?;
            if ms == 0 {
                return Err(Error::config(ENV_STATUS_TIMEOUT, "must be greater than zero"));
            }
            config.status_timeout_ms = ms;
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout_secs = Some(parse_number::<u64>(ENV_REQUEST_TIMEOUT, &raw)?);
        }

        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// Status endpoint for `work_id`. The id is escaped as a single path segment.
    pub fn status_url(&self, work_id: &str) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| Error::config(ENV_BASE_URL, e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Error::config(ENV_BASE_URL, "cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(["api", "status", work_id]);
        Ok(url)
    }

    /// Absolute form of a server-supplied link; absolute URLs pass through.
    pub fn resolve_url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else if link.starts_with('/') {
            format!("{}{}", self.base_url, link)
        } else {
            format!("{}/{}", self.base_url, link)
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::config(key, format!("expected a number, got {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_polling_contract() {
        let config = UploaderConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
        assert_eq!(config.sniff_bytes, 8192);
        assert_eq!(config.max_consecutive_failures, Some(10));
        assert_eq!(config.status_timeout(), Duration::from_secs(10));
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = UploaderConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://csv.example.com/"),
            (ENV_POLL_INTERVAL, "500"),
            (ENV_MAX_POLL_FAILURES, "0"),
            (ENV_REQUEST_TIMEOUT, "30"),
            (ENV_STATUS_TIMEOUT, "4000"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://csv.example.com");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.max_consecutive_failures, None);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.status_timeout(), Duration::from_millis(4000));
    }

    #[test]
    fn invalid_interval_is_a_config_error() {
        let err = UploaderConfig::from_lookup(lookup_from(&[(ENV_POLL_INTERVAL, "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config { ref key, .. } if key == ENV_POLL_INTERVAL));

        let err =
            UploaderConfig::from_lookup(lookup_from(&[(ENV_POLL_INTERVAL, "0")])).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn work_id_is_escaped_as_one_segment() {
        let config = UploaderConfig {
            base_url: "http://localhost:8000/csv".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.status_url("abc#1").unwrap().as_str(),
            "http://localhost:8000/csv/api/status/abc%231"
        );
        assert_eq!(
            config.status_url("a/b?c").unwrap().path(),
            "/csv/api/status/a%2Fb%3Fc"
        );

        let bad = UploaderConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad.status_url("x"), Err(Error::Config { .. })));
    }

    #[test]
    fn urls_are_built_from_base() {
        let config = UploaderConfig {
            base_url: "http://localhost:8000".to_string(),
            ..Default::default()
        };
        assert_eq!(config.upload_url(), "http://localhost:8000/");
        assert_eq!(
            config.status_url("abc123").unwrap().as_str(),
            "http://localhost:8000/api/status/abc123"
        );
        assert_eq!(
            config.resolve_url("/download/42"),
            "http://localhost:8000/download/42"
        );
        assert_eq!(
            config.resolve_url("https://cdn.example.com/x.csv"),
            "https://cdn.example.com/x.csv"
        );
    }
}
