//! Search terms: what and when to search

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Date format accepted from the operator
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Errors in operator-supplied search terms
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TermsError {
    #[error("destination cannot be empty")]
    EmptyDestination,

    #[error("date must use the dd/mm/yyyy format, got '{0}'")]
    MalformedDate(String),

    #[error("date {0} is in the past")]
    PastDate(String),
}

/// Destination and check-in date of one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    pub destination: String,
    pub checkin: NaiveDate,
}

impl SearchTerms {
    /// Validates raw operator input
    ///
    /// The destination is trimmed and must not be blank. The date must parse
    /// as `dd/mm/yyyy` and must not be earlier than `today`.
    pub fn parse(destination: &str, date: &str, today: NaiveDate) -> Result<Self, TermsError> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(TermsError::EmptyDestination);
        }

        let date = date.trim();
        let checkin = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| TermsError::MalformedDate(date.to_string()))?;
        if checkin < today {
            return Err(TermsError::PastDate(date.to_string()));
        }

        Ok(Self {
            destination: destination.to_string(),
            checkin,
        })
    }

    /// Searches cover a single night
    pub fn checkout(&self) -> NaiveDate {
        self.checkin + Duration::days(1)
    }
}
