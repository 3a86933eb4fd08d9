use crate::config::types::{Config, OutputConfig, SessionConfig, SourceEntry, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_session_config(&config.session)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates session timing and retry settings
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.poll_interval_ms < 10 || config.poll_interval_ms > 5000 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be between 10 and 5000, got {}",
            config.poll_interval_ms
        )));
    }

    if config.join_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "join_timeout_secs must be >= 1, got {}",
            config.join_timeout_secs
        )));
    }

    if config.pause_notice_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "pause_notice_secs must be >= 1, got {}",
            config.pause_notice_secs
        )));
    }

    if config.max_empty_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_empty_pages must be >= 1, got {}",
            config.max_empty_pages
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate client name: non-empty, alphanumeric + hyphens only
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client-name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.export_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "export_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the `[[source]]` list
///
/// An empty list is accepted (all sites run). A non-empty list must name each
/// site at most once and keep at least one of them enabled.
fn validate_sources(sources: &[SourceEntry]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Ok(());
    }

    let mut seen = HashSet::new();
    for entry in sources {
        if !seen.insert(entry.site) {
            return Err(ConfigError::Validation(format!(
                "Site '{}' is configured more than once",
                entry.site
            )));
        }

        if let Some(base_url) = &entry.base_url {
            let url = Url::parse(base_url).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e))
            })?;

            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(ConfigError::Validation(format!(
                    "base_url '{}' must use HTTP or HTTPS",
                    base_url
                )));
            }
        }
    }

    if !sources.iter().any(|entry| entry.enabled) {
        return Err(ConfigError::Validation(
            "At least one source must be enabled".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Site;

    fn entry(site: Site, enabled: bool) -> SourceEntry {
        SourceEntry {
            site,
            enabled,
            base_url: None,
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_empty_source_list_is_valid() {
        assert!(validate_sources(&[]).is_ok());
    }

    #[test]
    fn test_duplicate_site_rejected() {
        let sources = vec![entry(Site::Booking, true), entry(Site::Booking, false)];
        assert!(matches!(
            validate_sources(&sources),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_all_sources_disabled_rejected() {
        let sources = vec![entry(Site::Airbnb, false), entry(Site::Hotels, false)];
        assert!(validate_sources(&sources).is_err());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut source = entry(Site::Hotels, true);
        source.base_url = Some("ftp://mirror.example.com".to_string());
        assert!(validate_sources(&[source]).is_err());

        let mut source = entry(Site::Hotels, true);
        source.base_url = Some("http://127.0.0.1:8080".to_string());
        assert!(validate_sources(&[source]).is_ok());
    }

    #[test]
    fn test_session_bounds() {
        let mut session = SessionConfig::default();
        assert!(validate_session_config(&session).is_ok());

        session.max_empty_pages = 0;
        assert!(validate_session_config(&session).is_err());

        let mut session = SessionConfig::default();
        session.poll_interval_ms = 5;
        assert!(validate_session_config(&session).is_err());
    }
}
