//! Pagination worker for a single site
//!
//! A worker walks a site's result pages from index 0, merging each page into
//! its own `PropertySet`, until one of three things happens:
//! - the session (or the worker's own handle) is stopped
//! - too many consecutive pages come back empty or fail
//! - a page contains only names the worker has already collected
//!
//! Between pages it consults the session `PauseSignal` and blocks while the
//! session is paused. An in-flight extraction is never interrupted; pause and
//! stop take effect at the next page boundary.

use crate::config::SessionConfig;
use crate::extract::{Extractor, PageQuery, Site, SourceBinding};
use crate::session::{PauseSignal, Property, PropertySet, SearchTerms, StopReason, WorkerState};
use crate::{ExtractionError, ExtractionResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Retry and deadline policy for one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Consecutive empty or failed pages that end the worker
    pub max_empty_pages: u32,
    /// Deadline for one extractor call
    pub request_timeout: Duration,
}

impl From<&SessionConfig> for WorkerSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            max_empty_pages: config.max_empty_pages,
            request_timeout: config.request_timeout(),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// The run state of one worker
///
/// Written by the worker as it pauses, resumes and finishes, and by its
/// handle when the worker is stopped on its own. `Stopped` is absorbing.
#[derive(Debug, Clone)]
struct WorkerStateCell {
    tx: Arc<watch::Sender<WorkerState>>,
}

impl WorkerStateCell {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(WorkerState::Running);
        Self { tx: Arc::new(tx) }
    }

    fn get(&self) -> WorkerState {
        *self.tx.borrow()
    }

    fn is_stopped(&self) -> bool {
        self.get().is_terminal()
    }

    /// Returns true if the state changed
    fn set(&self, next: WorkerState) -> bool {
        self.tx.send_if_modified(|state| {
            let changed = state.can_transition_to(next);
            if changed {
                *state = next;
            }
            changed
        })
    }

    async fn wait_until_stopped(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|state| state.is_terminal()).await;
    }
}

/// Observer and stop switch for a running worker
///
/// Cloning a handle is cheap; every clone refers to the same worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    site: Site,
    cell: WorkerStateCell,
}

impl WorkerHandle {
    pub fn site(&self) -> Site {
        self.site
    }

    /// The worker's own state
    ///
    /// `Paused` while the worker is blocked on the session signal, `Stopped`
    /// once it has finished or been stopped.
    pub fn state(&self) -> WorkerState {
        self.cell.get()
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Stops this worker only
    ///
    /// Idempotent. A worker blocked on a paused session is released at once.
    /// Returns true for the call that actually stopped it.
    pub fn stop(&self) -> bool {
        self.cell.set(WorkerState::Stopped)
    }
}

/// What a finished worker hands back to the orchestrator
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub site: Site,
    pub properties: PropertySet,
    /// Extractor calls made, including failed and empty ones
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// Drives pagination for one site
pub struct Worker {
    site: Site,
    extractor: Arc<dyn Extractor>,
    terms: SearchTerms,
    signal: PauseSignal,
    settings: WorkerSettings,
    cell: WorkerStateCell,
}

impl Worker {
    /// Creates a worker and the handle used to observe it
    ///
    /// # Arguments
    ///
    /// * `binding` - The site and its extractor
    /// * `terms` - Destination and check-in date
    /// * `signal` - The session-wide pause signal
    /// * `settings` - Retry threshold and request deadline
    pub fn new(
        binding: SourceBinding,
        terms: SearchTerms,
        signal: PauseSignal,
        settings: WorkerSettings,
    ) -> (Self, WorkerHandle) {
        let cell = WorkerStateCell::new();
        let handle = WorkerHandle {
            site: binding.site,
            cell: cell.clone(),
        };
        let worker = Self {
            site: binding.site,
            extractor: binding.extractor,
            terms,
            signal,
            settings,
            cell,
        };
        (worker, handle)
    }

    /// Runs until a stop condition is met
    ///
    /// Always leaves the worker `Stopped` and returns everything collected so
    /// far, whatever the stop cause.
    pub async fn run(self) -> WorkerOutcome {
        let mut properties = PropertySet::new();
        let mut last_page: Vec<Property> = Vec::new();
        let mut page_index = 0u32;
        let mut empty_streak = 0u32;
        let mut pages_fetched = 0u32;

        tracing::info!("{}: searching {}", self.site, self.terms.destination);

        let stop_reason = loop {
            for property in last_page.drain(..) {
                tracing::info!(
                    "{}: {} | score {} | price {}",
                    self.site,
                    property.name,
                    display_value(property.score),
                    display_value(property.price)
                );
            }

            if !self.await_permission().await {
                break StopReason::Operator;
            }

            let query = PageQuery::new(&self.terms, page_index);
            let page = match self.fetch(&query).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("{}: page {} failed: {}", self.site, page_index, e);
                    Vec::new()
                }
            };
            pages_fetched += 1;

            if page.is_empty() {
                empty_streak += 1;
                tracing::debug!(
                    "{}: page {} empty ({}/{})",
                    self.site,
                    page_index,
                    empty_streak,
                    self.settings.max_empty_pages
                );
                if empty_streak >= self.settings.max_empty_pages {
                    break StopReason::RetriesExhausted;
                }
                continue;
            }

            if properties.merge_page(page.clone()) == 0 {
                break StopReason::NoNewRecords;
            }

            last_page = page;
            empty_streak = 0;
            page_index += 1;
        };

        self.cell.set(WorkerState::Stopped);
        tracing::info!(
            "{}: finished with {} properties after {} requests ({})",
            self.site,
            properties.len(),
            pages_fetched,
            stop_reason
        );

        WorkerOutcome {
            site: self.site,
            properties,
            pages_fetched,
            stop_reason,
        }
    }

    /// Blocks while the session is paused
    ///
    /// Returns false if the worker must stop instead of fetching.
    async fn await_permission(&self) -> bool {
        if self.cell.is_stopped() {
            return false;
        }

        match self.signal.state() {
            WorkerState::Running => return true,
            WorkerState::Stopped => return false,
            WorkerState::Paused => {}
        }

        self.cell.set(WorkerState::Paused);
        tracing::debug!("{}: paused", self.site);

        let released = tokio::select! {
            state = self.signal.wait_while_paused() => state,
            _ = self.cell.wait_until_stopped() => WorkerState::Stopped,
        };

        if released.is_terminal() || self.cell.is_stopped() {
            return false;
        }

        self.cell.set(WorkerState::Running);
        tracing::debug!("{}: resumed", self.site);
        true
    }

    async fn fetch(&self, query: &PageQuery) -> ExtractionResult<Vec<Property>> {
        tokio::time::timeout(self.settings.request_timeout, self.extractor.fetch_page(query))
            .await
            .unwrap_or(Err(ExtractionError::Timeout { site: self.site }))
    }
}

fn display_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
