use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://tycoon.airlines-manager.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";
pub const DEFAULT_CARD_HOLDER_PATH: &str = "/shop/buycards/5/0/Econ%C3%B4mica";

/// Environment variable consulted when `account.email` is not configured
pub const EMAIL_ENV: &str = "AM_USER_EMAIL";
/// Environment variable consulted when `account.password` is not configured
pub const PASSWORD_ENV: &str = "AM_USER_PASSWORD";

/// Main configuration structure for Tycoon-Autopilot
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub account: AccountConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub bonuses: BonusConfig,
}

/// Where the game lives and how we present ourselves to it
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Scheme and host of the game, e.g. `http://tycoon.airlines-manager.com`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent on every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Localized endpoint of the free card holder
    #[serde(rename = "card-holder-path", default = "default_card_holder_path")]
    pub card_holder_path: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            card_holder_path: default_card_holder_path(),
        }
    }
}

/// Account credentials; either field may come from the environment instead
#[derive(Clone, Default, Deserialize)]
pub struct AccountConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Local files and directories the agent owns
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Persisted cookie blob
    #[serde(rename = "cookies-path")]
    pub cookies_path: PathBuf,

    /// One JSON record per line ID
    #[serde(rename = "lines-dir")]
    pub lines_dir: PathBuf,

    /// One JSON record per airport code
    #[serde(rename = "airports-dir")]
    pub airports_dir: PathBuf,

    /// Raw response bodies saved on layout failures
    #[serde(rename = "dump-dir")]
    pub dump_dir: PathBuf,

    /// CSV export of the lines listing
    #[serde(rename = "lines-summary-path")]
    pub lines_summary_path: PathBuf,

    /// CSV export of the airplanes listing
    #[serde(rename = "airplanes-summary-path")]
    pub airplanes_summary_path: PathBuf,

    /// Timestamped JSON results of bonus claims
    #[serde(rename = "bonus-results-dir")]
    pub bonus_results_dir: PathBuf,
}

/// Timing knobs: staleness, request pacing and pass cadence
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Minimum age (days) before a cached line is refreshed
    #[serde(rename = "line-update-interval-days", default = "default_update_days")]
    pub line_update_interval_days: u32,

    /// Lower bound of the pause after every request (seconds)
    #[serde(rename = "request-interval-min", default = "default_request_min")]
    pub request_interval_min: u64,

    /// Upper bound of the pause after every request (seconds)
    #[serde(rename = "request-interval-max", default = "default_request_max")]
    pub request_interval_max: u64,

    /// Lower bound of the sleep between passes (seconds)
    #[serde(rename = "pass-interval-min", default = "default_pass_min")]
    pub pass_interval_min: u64,

    /// Upper bound of the sleep between passes (seconds)
    #[serde(rename = "pass-interval-max", default = "default_pass_max")]
    pub pass_interval_max: u64,

    /// Fixed delay before rerunning a pass that hit a retryable error (seconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Ceiling on pages fetched from a single listing
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            line_update_interval_days: default_update_days(),
            request_interval_min: default_request_min(),
            request_interval_max: default_request_max(),
            pass_interval_min: default_pass_min(),
            pass_interval_max: default_pass_max(),
            retry_delay: default_retry_delay(),
            max_pages: default_max_pages(),
        }
    }
}

/// Bonus-claim routines run after the line pass
#[derive(Debug, Clone, Deserialize)]
pub struct BonusConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_card_holder_path() -> String {
    DEFAULT_CARD_HOLDER_PATH.to_string()
}

fn default_update_days() -> u32 {
    2
}

fn default_request_min() -> u64 {
    1
}

fn default_request_max() -> u64 {
    5
}

fn default_pass_min() -> u64 {
    60 * 60 * 5
}

fn default_pass_max() -> u64 {
    60 * 60 * 8
}

fn default_retry_delay() -> u64 {
    10
}

fn default_max_pages() -> u32 {
    200
}

fn default_true() -> bool {
    true
}

/// Resolved login credentials
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AccountConfig {
    /// Resolves credentials from the file, falling back to the environment
    pub fn resolve(&self) -> Result<Credentials, crate::ConfigError> {
        let email = resolve_field(self.email.as_deref(), EMAIL_ENV)?;
        let password = resolve_field(self.password.as_deref(), PASSWORD_ENV)?;
        Ok(Credentials { email, password })
    }
}

fn resolve_field(configured: Option<&str>, env_var: &str) -> Result<String, crate::ConfigError> {
    match configured {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => std::env::var(env_var)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| crate::ConfigError::MissingCredential(env_var.to_string())),
    }
}
