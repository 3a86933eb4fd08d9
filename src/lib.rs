//! Stay-Scout: concurrent accommodation search across booking sites
//!
//! This crate runs one pagination worker per configured site, lets an operator
//! pause, resume or stop all of them from a line-oriented control channel, and
//! folds the collected properties into a single statistics summary per session.

pub mod config;
pub mod extract;
pub mod output;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Errors that end a search session
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Site binding error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Worker for {site} did not finish within {seconds}s")]
    WorkerJoinTimeout { site: extract::Site, seconds: u64 },

    #[error("Worker for {site} failed: {message}")]
    WorkerFailed {
        site: extract::Site,
        message: String,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching or parsing one result page
///
/// A worker never propagates these: every variant counts as an empty page
/// toward the retry streak.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {site} timed out")]
    Timeout { site: extract::Site },

    #[error("Failed to parse page {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] ::url::ParseError),
}

/// Result type alias for search sessions
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page extraction
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{Extractor, PageQuery, Site};
pub use output::{SessionReport, Statistics, Summary};
pub use session::{Orchestrator, PauseSignal, Property, PropertySet, SearchTerms, WorkerState};
