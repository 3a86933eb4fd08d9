//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the site extractors:
//! - Building one HTTP client with a proper user agent string
//! - GET requests returning the page body
//! - Classifying non-success responses

use crate::config::UserAgentConfig;
use crate::{ExtractionError, ExtractionResult};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// The client keeps a cookie store because some sites only serve results
/// after a priming request has set session cookies.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `request_timeout` - Overall deadline for one request
///
/// # Example
///
/// ```no_run
/// use stay_scout::config::UserAgentConfig;
/// use stay_scout::extract::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     client_name: "StayScout".to_string(),
///     client_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// # Returns
///
/// * `Ok(String)` - The response body of a 2xx response
/// * `Err(ExtractionError::Status)` - The server answered with a non-success code
/// * `Err(ExtractionError::Http)` - Connection, timeout or body read failure
pub async fn fetch_document(client: &Client, url: &Url) -> ExtractionResult<String> {
    let url_str = url.as_str();
    tracing::debug!("GET {}", url_str);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| ExtractionError::Http {
            url: url_str.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::Status {
            url: url_str.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| ExtractionError::Http {
        url: url_str.to_string(),
        source,
    })
}
