use crate::extract::Site;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Stay-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceEntry>,
}

impl Config {
    /// Returns the sites a session should run, in configuration order
    ///
    /// An empty `[[source]]` list means every known site.
    pub fn enabled_sites(&self) -> Vec<Site> {
        if self.sources.is_empty() {
            return Site::ALL.to_vec();
        }
        self.sources
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.site)
            .collect()
    }

    /// Looks up the origin override for a site, if one is configured
    pub fn base_url_for(&self, site: Site) -> Option<&str> {
        self.sources
            .iter()
            .find(|entry| entry.site == site)
            .and_then(|entry| entry.base_url.as_deref())
    }
}

/// Session timing and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Interval between orchestrator liveness checks (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on joining each worker once none is running (seconds)
    #[serde(rename = "join-timeout-secs", default = "default_join_timeout_secs")]
    pub join_timeout_secs: u64,

    /// Period of the "operation paused" notice (seconds)
    #[serde(rename = "pause-notice-secs", default = "default_pause_notice_secs")]
    pub pause_notice_secs: u64,

    /// Consecutive empty or failed pages after which a worker stops
    #[serde(rename = "max-empty-pages", default = "default_max_empty_pages")]
    pub max_empty_pages: u32,

    /// Deadline for a single page extraction (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    pub fn pause_notice_interval(&self) -> Duration {
        Duration::from_secs(self.pause_notice_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            join_timeout_secs: default_join_timeout_secs(),
            pause_notice_secs: default_pause_notice_secs(),
            max_empty_pages: default_max_empty_pages(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_join_timeout_secs() -> u64 {
    30
}

fn default_pause_notice_secs() -> u64 {
    5
}

fn default_max_empty_pages() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the client
    #[serde(rename = "client-name")]
    pub client_name: String,

    /// Version of the client
    #[serde(rename = "client-version")]
    pub client_version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.client_name, self.client_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory that receives exported reports
    #[serde(rename = "export-dir", default = "default_export_dir")]
    pub export_dir: String,
}

fn default_export_dir() -> String {
    "exports".to_string()
}

/// One site to search
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub site: Site,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Replaces the site's public origin (mirrors, local test servers)
    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,
}

fn default_enabled() -> bool {
    true
}
