//! Supported booking sites and their HTTP extractor
//!
//! Each site differs only in how its search URL pages through results and
//! which CSS classes hold the listing fields. `SiteExtractor` combines those
//! per-site details with the shared fetcher and listing parser.

use crate::extract::fetcher::fetch_document;
use crate::extract::parser::{parse_listings, parse_number, ListingSelectors};
use crate::extract::{Extractor, PageQuery};
use crate::session::Property;
use crate::{ExtractionError, ExtractionResult};
use async_trait::async_trait;
use chrono::Datelike;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// A booking site the crate knows how to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Site {
    Airbnb,
    Booking,
    Hotels,
    HotelsScanner,
}

impl Site {
    /// Every supported site, in a stable order
    pub const ALL: [Site; 4] = [
        Site::Airbnb,
        Site::Booking,
        Site::Hotels,
        Site::HotelsScanner,
    ];

    /// The public host name, used in logs and reports
    pub fn host(&self) -> &'static str {
        match self {
            Self::Airbnb => "airbnb.gr",
            Self::Booking => "booking.com",
            Self::Hotels => "hotels.com",
            Self::HotelsScanner => "hotels-scanner.com",
        }
    }

    /// The origin search URLs are built on
    pub fn default_origin(&self) -> &'static str {
        match self {
            Self::Airbnb => "https://www.airbnb.gr/",
            Self::Booking => "https://www.booking.com/",
            Self::Hotels => "https://el.hotels.com/",
            Self::HotelsScanner => "https://www.hotels-scanner.com/",
        }
    }

    fn selectors(&self) -> ListingSelectors {
        match self {
            Self::Airbnb => ListingSelectors {
                item: "._8ssblpx",
                name: "._bzh5lkq",
                score: "._10fy1f8",
                score_attr: None,
                price: "._1p7iugi",
                // Rated out of 5
                score_transform: |text| parse_number(text).map(|s| s * 2.0),
            },
            Self::Booking => ListingSelectors {
                item: ".sr_property_block",
                name: ".sr-hotel__name",
                score: ".bui-review-score__badge",
                score_attr: None,
                price: ".bui-price-display__value",
                score_transform: parse_number,
            },
            Self::Hotels => ListingSelectors {
                item: ".hotel-wrap",
                name: ".p-name",
                score: ".guest-reviews-badge",
                score_attr: None,
                price: ".price",
                // Badge text such as "Εξαιρετικό 9,2" keeps only its digits: 92 -> 9.2
                score_transform: |text| {
                    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                    digits.parse::<f64>().ok().map(|s| s / 10.0)
                },
            },
            Self::HotelsScanner => ListingSelectors {
                item: ".hc-searchresultitem",
                name: ".hc-searchresultitem__hotelname",
                score: ".hc-guestratingsummary",
                score_attr: Some("content"),
                price: ".hc-searchresultitemdeal__currentrate",
                score_transform: parse_number,
            },
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host())
    }
}

/// HTTP extractor for one site
#[derive(Debug, Clone)]
pub struct SiteExtractor {
    site: Site,
    client: Client,
    origin: Url,
}

impl SiteExtractor {
    /// Creates an extractor for `site`
    ///
    /// `origin` replaces the site's public origin when given.
    pub fn new(site: Site, client: Client, origin: Option<&str>) -> ExtractionResult<Self> {
        let origin = Url::parse(origin.unwrap_or(site.default_origin()))?;
        Ok(Self {
            site,
            client,
            origin,
        })
    }

    pub fn site(&self) -> Site {
        self.site
    }

    /// Builds the search URL for a page
    ///
    /// # Paging
    ///
    /// | Site | Parameter |
    /// |------|-----------|
    /// | airbnb | `items_offset = page * 20` |
    /// | booking | `offset = page * 25` |
    /// | hotels | `pn = page + 1` |
    /// | hotels-scanner | `pageIndex = page` |
    pub fn page_url(&self, query: &PageQuery) -> ExtractionResult<Url> {
        let checkin = query.checkin.format("%Y-%m-%d").to_string();
        let checkout = query.checkout.format("%Y-%m-%d").to_string();

        let url = match self.site {
            Site::Airbnb => {
                let mut url = self.origin.clone();
                url.path_segments_mut()
                    .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                    .pop_if_empty()
                    .extend(["s", query.destination.as_str(), "homes"]);
                url.query_pairs_mut()
                    .append_pair("checkin", &checkin)
                    .append_pair("checkout", &checkout)
                    .append_pair("items_offset", &(query.page_index * 20).to_string());
                url
            }
            Site::Booking => {
                let mut url = self.origin.join("searchresults.en.html")?;
                url.query_pairs_mut()
                    .append_pair("ss", &query.destination)
                    .append_pair("checkin_year", &query.checkin.year().to_string())
                    .append_pair("checkin_month", &query.checkin.month().to_string())
                    .append_pair("checkin_monthday", &query.checkin.day().to_string())
                    .append_pair("checkout_year", &query.checkout.year().to_string())
                    .append_pair("checkout_month", &query.checkout.month().to_string())
                    .append_pair("checkout_monthday", &query.checkout.day().to_string())
                    .append_pair("offset", &(query.page_index * 25).to_string());
                url
            }
            Site::Hotels => {
                let mut url = self.origin.join("search.do")?;
                url.query_pairs_mut()
                    .append_pair("q-destination", &query.destination)
                    .append_pair("q-check-in", &checkin)
                    .append_pair("q-check-out", &checkout)
                    .append_pair("pn", &(query.page_index + 1).to_string());
                url
            }
            Site::HotelsScanner => self.hotels_scanner_url("Hotels/SearchResults", query)?,
        };

        Ok(url)
    }

    fn hotels_scanner_url(&self, path: &str, query: &PageQuery) -> ExtractionResult<Url> {
        let mut url = self.origin.join(path)?;
        url.query_pairs_mut()
            .append_pair("destination", &format!("place:{}", query.destination))
            .append_pair("checkin", &query.checkin.format("%Y-%m-%d").to_string())
            .append_pair("checkout", &query.checkout.format("%Y-%m-%d").to_string())
            .append_pair("pageIndex", &query.page_index.to_string())
            .append_pair("radius", "0km")
            .append_pair("Rooms", "1")
            .append_pair("adults_1", "2")
            .append_pair("showSoldOut", "true");
        Ok(url)
    }

    fn parse(&self, url: &Url, body: &str) -> ExtractionResult<Vec<Property>> {
        parse_listings(body, &self.site.selectors()).map_err(|message| ExtractionError::Parse {
            url: url.to_string(),
            message,
        })
    }
}

#[async_trait]
impl Extractor for SiteExtractor {
    async fn fetch_page(&self, query: &PageQuery) -> ExtractionResult<Vec<Property>> {
        if self.site == Site::HotelsScanner {
            // Results are only served once the search page has set its cookies
            let priming = self.hotels_scanner_url("Hotels/Search", query)?;
            fetch_document(&self.client, &priming).await?;

            let url = self.page_url(query)?;
            return match fetch_document(&self.client, &url).await {
                Ok(body) => self.parse(&url, &body),
                Err(ExtractionError::Status { status, .. }) => {
                    tracing::info!(
                        "{} refused the results request (HTTP {}), treating page {} as empty",
                        self.site,
                        status,
                        query.page_index
                    );
                    Ok(Vec::new())
                }
                Err(e) => Err(e),
            };
        }

        let url = self.page_url(query)?;
        let body = fetch_document(&self.client, &url).await?;
        self.parse(&url, &body)
    }
}
