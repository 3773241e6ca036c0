//! Food lookup
//!
//! Search and detail retrieval against a food database. Sources implement
//! [`FoodLookup`]; [`DebouncedSearch`] drives search-as-you-type on top of any
//! of them.

pub mod catalog;
pub mod debounce;
pub mod nutritionix;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FoodRecord, FoodSummary};

pub use catalog::CatalogLookup;
pub use debounce::{DebouncedSearch, SearchOutcome, DEFAULT_DEBOUNCE};
pub use nutritionix::{HttpFoodLookup, HttpLookupConfig};

/// Default bound on a single lookup call
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Lookup failures. None of these affect the ledger; callers show an empty
/// result set with a warning.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Food lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Food lookup returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Food lookup response could not be decoded: {0}")]
    Decode(String),

    #[error("Food lookup timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Unknown food: {0}")]
    UnknownFood(String),
}

impl LookupError {
    /// Transport, auth, decoding or timeout failure of the food database.
    ///
    /// These are shown as an empty result plus a warning. `UnknownFood` is a
    /// stale reference to a previous result instead.
    pub fn is_lookup_failure(&self) -> bool {
        match self {
            LookupError::Request(_)
            | LookupError::Status { .. }
            | LookupError::Decode(_)
            | LookupError::TimedOut(_) => true,
            LookupError::UnknownFood(_) => false,
        }
    }
}

/// A food database
#[async_trait]
pub trait FoodLookup: Send + Sync {
    /// Candidate matches for `query`. No matches is an empty list, not an error.
    async fn search(&self, query: &str) -> Result<Vec<FoodSummary>, LookupError>;

    /// Full record, including units, for a summary from a prior search
    async fn get_details(&self, summary: &FoodSummary) -> Result<FoodRecord, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_failure_category() {
        let failures = [
            LookupError::Status {
                status: 401,
                body: "invalid app key".into(),
            },
            LookupError::Decode("expected value".into()),
            LookupError::TimedOut(DEFAULT_LOOKUP_TIMEOUT),
        ];
        assert!(failures.iter().all(LookupError::is_lookup_failure));
        assert!(!LookupError::UnknownFood("milk:9".into()).is_lookup_failure());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_lookup_failure() {
        let lookup = HttpFoodLookup::new(HttpLookupConfig {
            base_url: "http://127.0.0.1:9".into(),
            app_id: "app".into(),
            app_key: "key".into(),
            ..HttpLookupConfig::default()
        })
        .unwrap();
        let err = lookup.search("apple").await.unwrap_err();
        assert!(err.is_lookup_failure());
    }
}
