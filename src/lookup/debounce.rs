//! Debounced search-as-you-type
//!
//! Each keystroke calls [`DebouncedSearch::schedule`], which aborts whatever
//! is pending and re-arms a timer. Only after the query has been quiet for the
//! debounce delay does the lookup run, bounded by a timeout. Outcomes of
//! superseded queries are never delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{FoodLookup, LookupError};
use crate::models::FoodSummary;

/// Quiet period before a search fires
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Result of one fired search. Failures arrive as empty results plus a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<FoodSummary>,
    pub warning: Option<String>,
    /// The food database itself failed (see [`LookupError::is_lookup_failure`])
    pub lookup_failed: bool,
}

/// Cancellable, re-armable search task. Must be used inside a Tokio runtime.
pub struct DebouncedSearch {
    lookup: Arc<dyn FoodLookup>,
    delay: Duration,
    timeout: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    outcomes: mpsc::UnboundedSender<SearchOutcome>,
}

impl DebouncedSearch {
    /// Returns the scheduler and the receiving end for outcomes
    pub fn new(
        lookup: Arc<dyn FoodLookup>,
        delay: Duration,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let search = Self {
            lookup,
            delay,
            timeout,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            outcomes: tx,
        };
        (search, rx)
    }

    /// Supersede any pending search with `query`.
    ///
    /// A blank query clears immediately with an empty outcome.
    pub fn schedule(&mut self, query: &str) {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        if query.is_empty() {
            let _ = self.outcomes.send(SearchOutcome {
                query,
                results: Vec::new(),
                warning: None,
                lookup_failed: false,
            });
            return;
        }

        let lookup = Arc::clone(&self.lookup);
        let current = Arc::clone(&self.generation);
        let outcomes = self.outcomes.clone();
        let delay = self.delay;
        let timeout = self.timeout;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let outcome = match tokio::time::timeout(timeout, lookup.search(&query)).await {
                Ok(Ok(results)) => SearchOutcome {
                    query,
                    results,
                    warning: None,
                    lookup_failed: false,
                },
                Ok(Err(e)) => {
                    let lookup_failed = e.is_lookup_failure();
                    if lookup_failed {
                        tracing::warn!("Food search for '{}' failed: {}", query, e);
                    } else {
                        tracing::debug!("Food search for '{}' found nothing usable: {}", query, e);
                    }
                    SearchOutcome {
                        query,
                        results: Vec::new(),
                        warning: Some(e.to_string()),
                        lookup_failed,
                    }
                }
                Err(_) => {
                    let e = LookupError::TimedOut(timeout);
                    tracing::warn!("Food search for '{}' failed: {}", query, e);
                    SearchOutcome {
                        query,
                        results: Vec::new(),
                        warning: Some(e.to_string()),
                        lookup_failed: true,
                    }
                }
            };

            if current.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding superseded search for '{}'", outcome.query);
                return;
            }
            let _ = outcomes.send(outcome);
        }));
    }

    /// Abort the pending search, if any
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a scheduled search has not finished yet
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel();
    }
}
