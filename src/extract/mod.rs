//! Extraction module: turning one result page of one site into properties
//!
//! This module contains:
//! - The `Extractor` port a worker drives, one implementation per site
//! - HTTP fetching with a shared, identified client
//! - Selector-driven listing parsing
//! - The compile-time binding from `Site` to its extractor

mod fetcher;
mod parser;
mod sites;

pub use fetcher::{build_http_client, fetch_document};
pub use parser::{parse_listings, parse_number, ListingSelectors};
pub use sites::{Site, SiteExtractor};

use crate::config::Config;
use crate::session::{Property, SearchTerms};
use crate::ExtractionResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::sync::Arc;

/// Everything an extractor needs to fetch one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub destination: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    /// Zero-based page number
    pub page_index: u32,
}

impl PageQuery {
    /// Builds the query for `page_index` of a search
    pub fn new(terms: &SearchTerms, page_index: u32) -> Self {
        Self {
            destination: terms.destination.clone(),
            checkin: terms.checkin,
            checkout: terms.checkout(),
            page_index,
        }
    }
}

/// Fetches and parses result pages for a single site
///
/// Implementations must be cheap to share between tasks; a worker holds one
/// behind an `Arc` for the whole session.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns the properties listed on the requested page
    ///
    /// An empty vector means the page had no listings. Transport and parse
    /// failures are reported as `ExtractionError`.
    async fn fetch_page(&self, query: &PageQuery) -> ExtractionResult<Vec<Property>>;
}

/// A site together with the extractor bound to it for one session
#[derive(Clone)]
pub struct SourceBinding {
    pub site: Site,
    pub extractor: Arc<dyn Extractor>,
}

impl std::fmt::Debug for SourceBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBinding")
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

/// Binds every enabled site to its HTTP extractor
///
/// The mapping is a plain `match` over `Site`, resolved once here; workers
/// never look extractors up by name at runtime.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `client` - Shared HTTP client (see `build_http_client`)
///
/// # Returns
///
/// * `Ok(Vec<SourceBinding>)` - One binding per enabled site, in config order
/// * `Err(ExtractionError)` - A configured base URL could not be parsed
pub fn bind_sources(config: &Config, client: &Client) -> ExtractionResult<Vec<SourceBinding>> {
    config
        .enabled_sites()
        .into_iter()
        .map(|site| {
            let extractor = SiteExtractor::new(site, client.clone(), config.base_url_for(site))?;
            Ok(SourceBinding {
                site,
                extractor: Arc::new(extractor),
            })
        })
        .collect()
}
