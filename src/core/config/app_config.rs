use std::collections::HashSet;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use validator::Validate;

use crate::core::client::usage_endpoint::UsageEndpoint;

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1/organization/usage";
pub const DEFAULT_OUT_FILE: &str = "usage_dump.jsonl";
pub const DEFAULT_DAYS_BACK: u32 = 365;
/// Widest window the usage API accepts with daily buckets.
pub const MAX_WINDOW_DAYS: u32 = 31;
pub const DEFAULT_PAGE_LIMIT: u32 = 31;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration, read once from the environment at start-up.
#[derive(Clone, Validate)]
pub struct AppConfig {
    #[validate(length(min = 8))]
    pub admin_key: String,
    pub project_ids: Vec<String>,
    #[validate(range(max = 3650))]
    pub days_back: u32,
    #[validate(range(min = 1, max = 31))]
    pub window_days: u32,
    #[validate(range(min = 1, max = 180))]
    pub page_limit: u32,
    #[validate(url)]
    pub api_base_url: String,
    #[validate(length(min = 1))]
    pub endpoints: Vec<UsageEndpoint>,
    pub out_file: PathBuf,
    pub status_file: PathBuf,
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
    pub refresh_interval_hours: Option<u64>,
    pub force_refresh: bool,
    pub isolate_endpoint_failures: bool,
    pub model_breakdown: bool,
    pub log_dir: Option<PathBuf>,
}

/// The subset of configuration the window walker needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSettings {
    pub days_back: u32,
    pub window_days: u32,
    pub page_limit: u32,
    pub project_ids: Vec<String>,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            window_days: MAX_WINDOW_DAYS,
            page_limit: DEFAULT_PAGE_LIMIT,
            project_ids: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads `USAGE_*` variables.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let admin_key = get("USAGE_ADMIN_KEY").ok_or_else(|| anyhow!("USAGE_ADMIN_KEY is not set"))?;

        let endpoints = match get("USAGE_ENDPOINTS") {
            Some(raw) => split_list(&raw)
                .into_iter()
                .map(|code| {
                    UsageEndpoint::from_code(&code)
                        .ok_or_else(|| anyhow!("USAGE_ENDPOINTS: unknown endpoint '{}'", code))
                })
                .collect::<Result<Vec<_>>>()?,
            None => UsageEndpoint::ALL.to_vec(),
        };
        if let Some(dup) = first_duplicate(&endpoints) {
            return Err(anyhow!("USAGE_ENDPOINTS: endpoint '{}' is listed more than once", dup));
        }

        let out_file = get("USAGE_OUT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_FILE));
        let status_file = get("USAGE_STATUS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| out_file.with_extension("status.json"));

        let cfg = Self {
            admin_key,
            project_ids: get("USAGE_PROJECT_IDS").map(|v| split_list(&v)).unwrap_or_default(),
            days_back: parse_or("USAGE_DAYS_BACK", get("USAGE_DAYS_BACK"), DEFAULT_DAYS_BACK)?,
            window_days: parse_or("USAGE_WINDOW_DAYS", get("USAGE_WINDOW_DAYS"), MAX_WINDOW_DAYS)?,
            page_limit: parse_or("USAGE_PAGE_LIMIT", get("USAGE_PAGE_LIMIT"), DEFAULT_PAGE_LIMIT)?,
            api_base_url: get("USAGE_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            endpoints,
            out_file,
            status_file,
            request_timeout_secs: parse_or(
                "USAGE_REQUEST_TIMEOUT_SECS",
                get("USAGE_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            refresh_interval_hours: get("USAGE_REFRESH_INTERVAL_HOURS")
                .map(|v| parse_value("USAGE_REFRESH_INTERVAL_HOURS", &v))
                .transpose()?,
            force_refresh: parse_flag("USAGE_FORCE_REFRESH", get("USAGE_FORCE_REFRESH"))?,
            isolate_endpoint_failures: parse_flag(
                "USAGE_ISOLATE_ENDPOINT_FAILURES",
                get("USAGE_ISOLATE_ENDPOINT_FAILURES"),
            )?,
            model_breakdown: parse_flag("USAGE_MODEL_BREAKDOWN", get("USAGE_MODEL_BREAKDOWN"))?,
            log_dir: get("USAGE_LOG_DIR").map(PathBuf::from),
        };

        cfg.validate().context("Invalid usage configuration")?;
        Ok(cfg)
    }

    pub fn walk_settings(&self) -> WalkSettings {
        WalkSettings {
            days_back: self.days_back,
            window_days: self.window_days,
            page_limit: self.page_limit,
            project_ids: self.project_ids.clone(),
        }
    }
}

// Keeps the admin key out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("admin_key", &"<redacted>")
            .field("project_ids", &self.project_ids)
            .field("days_back", &self.days_back)
            .field("window_days", &self.window_days)
            .field("page_limit", &self.page_limit)
            .field("api_base_url", &self.api_base_url)
            .field("endpoints", &self.endpoints)
            .field("out_file", &self.out_file)
            .field("status_file", &self.status_file)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("refresh_interval_hours", &self.refresh_interval_hours)
            .field("force_refresh", &self.force_refresh)
            .field("isolate_endpoint_failures", &self.isolate_endpoint_failures)
            .field("model_breakdown", &self.model_breakdown)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn first_duplicate(endpoints: &[UsageEndpoint]) -> Option<UsageEndpoint> {
    let mut seen = HashSet::new();
    endpoints.iter().copied().find(|ep| !seen.insert(*ep))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow!("{}: cannot parse '{}': {}", key, raw, e))
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(v) => parse_value(key, &v),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, raw: Option<String>) -> Result<bool> {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => Err(anyhow!("{}: expected a boolean, got '{}'", key, other)),
    }
}
