//! HTML listing parser
//!
//! Every supported site renders its search results as a list of repeated
//! blocks. This module extracts one `Property` per block using a small set of
//! CSS selectors, so each site only has to describe where its fields live.

use crate::session::Property;
use scraper::{ElementRef, Html, Selector};

/// Where the fields of one listing live inside a result page
#[derive(Debug, Clone, Copy)]
pub struct ListingSelectors {
    /// Selector matching one result block
    pub item: &'static str,
    /// Selector for the property name, relative to the block
    pub name: &'static str,
    /// Selector for the review score, relative to the block
    pub score: &'static str,
    /// Read the score from this attribute instead of the element text
    pub score_attr: Option<&'static str>,
    /// Selector for the nightly price, relative to the block
    pub price: &'static str,
    /// Converts the raw score text to the 0-10 scale
    pub score_transform: fn(&str) -> Option<f64>,
}

/// Parses a result page into properties
///
/// # Rules
///
/// - A block without a (non-blank) name is skipped
/// - An unparsable or missing score leaves `score` unset
/// - An unparsable or missing price leaves `price` unset (the property is
///   counted as unavailable)
///
/// # Returns
///
/// * `Ok(Vec<Property>)` - Properties in page order (may be empty)
/// * `Err(String)` - A selector in `selectors` is not valid CSS
///
/// # Example
///
/// ```
/// use stay_scout::extract::{parse_listings, parse_number, ListingSelectors};
///
/// let selectors = ListingSelectors {
///     item: ".card",
///     name: ".name",
///     score: ".score",
///     score_attr: None,
///     price: ".price",
///     score_transform: parse_number,
/// };
/// let html = r#"<div class="card"><span class="name">Villa</span>
///     <span class="score">8.4</span><span class="price">€ 120</span></div>"#;
/// let properties = parse_listings(html, &selectors).unwrap();
/// assert_eq!(properties[0].name, "Villa");
/// assert_eq!(properties[0].price, Some(120.0));
/// ```
pub fn parse_listings(html: &str, selectors: &ListingSelectors) -> Result<Vec<Property>, String> {
    let item = compile(selectors.item)?;
    let name = compile(selectors.name)?;
    let score = compile(selectors.score)?;
    let price = compile(selectors.price)?;

    let document = Html::parse_document(html);
    let mut properties = Vec::new();

    for block in document.select(&item) {
        let Some(name) = first_text(&block, &name).filter(|n| !n.is_empty()) else {
            tracing::debug!("Skipping listing without a name");
            continue;
        };

        let score_text = match selectors.score_attr {
            Some(attr) => block
                .select(&score)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string()),
            None => first_text(&block, &score),
        };

        properties.push(Property {
            name,
            score: score_text
                .as_deref()
                .and_then(|text| (selectors.score_transform)(text)),
            price: first_text(&block, &price)
                .as_deref()
                .and_then(parse_price),
        });
    }

    Ok(properties)
}

fn compile(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid selector '{}': {:?}", selector, e))
}

/// Returns the trimmed text of the first element matching `selector`
fn first_text(block: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Parses the first number in `text`
///
/// Accepts `.` as the decimal separator and `,` as a thousands separator. A
/// lone comma followed by one or two digits is read as a decimal comma
/// (`"8,5"` is 8.5).
pub fn parse_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let token = token.trim_end_matches(['.', ',']);

    let normalized = if token.contains('.') {
        token.replace(',', "")
    } else if let Some((whole, frac)) = token.split_once(',') {
        if !frac.contains(',') && (1..=2).contains(&frac.len()) {
            format!("{}.{}", whole, frac)
        } else {
            token.replace(',', "")
        }
    } else {
        token.to_string()
    };

    normalized.parse().ok()
}

/// Parses a displayed price, ignoring any label before the currency sign
///
/// `"Price per night:€85"`, `"€ 1,250"` and `"95€"` all parse.
pub fn parse_price(text: &str) -> Option<f64> {
    match text.rfind('€') {
        Some(pos) => parse_number(&text[pos + '€'.len_utf8()..]).or_else(|| parse_number(text)),
        None => parse_number(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTORS: ListingSelectors = ListingSelectors {
        item: ".card",
        name: ".name",
        score: ".score",
        score_attr: None,
        price: ".price",
        score_transform: parse_number,
    };

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("8.4"), Some(8.4));
        assert_eq!(parse_number("Scored 9"), Some(9.0));
        assert_eq!(parse_number("8,5"), Some(8.5));
        assert_eq!(parse_number("1,250"), Some(1250.0));
        assert_eq!(parse_number("1,250.75"), Some(1250.75));
        assert_eq!(parse_number("no digits"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("€ 120"), Some(120.0));
        assert_eq!(parse_price("Price per night:€85"), Some(85.0));
        assert_eq!(parse_price("95€"), Some(95.0));
        assert_eq!(parse_price("210"), Some(210.0));
        assert_eq!(parse_price("Sold out"), None);
    }

    #[test]
    fn test_parse_listings() {
        let html = r#"
            <html><body>
                <div class="card"><span class="name"> Sea View </span>
                    <span class="score">9.1</span><span class="price">€ 140</span></div>
                <div class="card"><span class="name">Old Town Loft</span>
                    <span class="price">Sold out</span></div>
            </body></html>
        "#;
        let properties = parse_listings(html, &SELECTORS).unwrap();

        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].name, "Sea View");
        assert_eq!(properties[0].score, Some(9.1));
        assert_eq!(properties[0].price, Some(140.0));
        assert_eq!(properties[1].name, "Old Town Loft");
        assert_eq!(properties[1].score, None);
        assert_eq!(properties[1].price, None);
    }

    #[test]
    fn test_skip_listing_without_name() {
        let html = r#"
            <div class="card"><span class="score">7</span></div>
            <div class="card"><span class="name">   </span></div>
            <div class="card"><span class="name">Kept</span></div>
        "#;
        let properties = parse_listings(html, &SELECTORS).unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name, "Kept");
    }

    #[test]
    fn test_score_from_attribute() {
        let selectors = ListingSelectors {
            score_attr: Some("content"),
            ..SELECTORS
        };
        let html = r#"<div class="card"><span class="name">A</span>
            <meta class="score" content="8.2"></div>"#;
        let properties = parse_listings(html, &selectors).unwrap();
        assert_eq!(properties[0].score, Some(8.2));
    }

    #[test]
    fn test_page_without_listings() {
        let html = r#"<html><body><p>No results</p></body></html>"#;
        assert!(parse_listings(html, &SELECTORS).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let selectors = ListingSelectors {
            item: "[[[",
            ..SELECTORS
        };
        assert!(parse_listings("<html></html>", &selectors).is_err());
    }
}
