//! Statistics over collected properties
//!
//! This module folds every worker's property set into one flat collection
//! and computes the session statistics, and prints summaries to stdout.

use crate::output::Summary;
use crate::session::{Property, WorkerOutcome};

/// Aggregate figures for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Total number of properties across all sites
    pub properties_found: u64,

    /// Number of properties without a price
    pub unavailable_properties: u64,

    /// Sum of defined scores divided by `properties_found`
    pub score_mean: Option<f64>,

    /// Sum of defined prices divided by `properties_found`
    pub price_mean: Option<f64>,
}

impl Statistics {
    /// Computes statistics over a flat collection of properties
    ///
    /// Both means divide by the total number of properties, so a property
    /// with no score (or no price) lowers the corresponding mean. With no
    /// properties at all, both means stay unset.
    pub fn from_properties<'a, I>(properties: I) -> Self
    where
        I: IntoIterator<Item = &'a Property>,
    {
        let mut found = 0u64;
        let mut unavailable = 0u64;
        let mut score_sum = 0.0;
        let mut price_sum = 0.0;

        for property in properties {
            found += 1;
            if let Some(score) = property.score {
                score_sum += score;
            }
            match property.price {
                Some(price) => price_sum += price,
                None => unavailable += 1,
            }
        }

        if found == 0 {
            return Self::default();
        }

        Self {
            properties_found: found,
            unavailable_properties: unavailable,
            score_mean: Some(score_sum / found as f64),
            price_mean: Some(price_sum / found as f64),
        }
    }

    /// Merges every worker's properties and computes statistics
    ///
    /// Properties are not deduplicated across sites: the same name from two
    /// sites counts twice.
    pub fn aggregate(outcomes: &[WorkerOutcome]) -> Self {
        Self::from_properties(outcomes.iter().flat_map(|outcome| outcome.properties.iter()))
    }
}

/// Formats an optional mean with two decimals
pub fn format_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Prints one summary to stdout
pub fn print_summary(summary: &Summary) {
    println!("=== Search Summary ===\n");
    if let Some(id) = summary.id {
        println!("Search id: {}", id);
    }
    println!("Destination: {}", summary.destination);
    println!("Date: {}", summary.date.format(crate::session::DATE_FORMAT));
    println!("Properties found: {}", summary.properties_found);
    println!("Unavailable properties: {}", summary.unavailable_properties);
    println!("Mean score: {}", format_mean(summary.score_mean));
    println!("Mean price: {}", format_mean(summary.price_mean));
    println!(
        "Searched at: {}",
        summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Prints stored summaries to stdout, one line each
///
/// # Arguments
///
/// * `history` - Summaries, most recent first
pub fn print_history(history: &[Summary]) {
    if history.is_empty() {
        println!("No previous searches for these terms.");
        return;
    }

    println!("=== Search History ({}) ===\n", history.len());
    println!(
        "{:<20} {:>6} {:>12} {:>10} {:>10}",
        "Searched at", "Found", "Unavailable", "Score", "Price"
    );
    for summary in history {
        println!(
            "{:<20} {:>6} {:>12} {:>10} {:>10}",
            summary.timestamp.format("%Y-%m-%d %H:%M:%S"),
            summary.properties_found,
            summary.unavailable_properties,
            format_mean(summary.score_mean),
            format_mean(summary.price_mean)
        );
    }
}
