//! Usage: Dashboard session state machine (filter cycles, stale guards, load-more).

mod full_fetch;
mod window;

pub use full_fetch::{FullDatasetFetcher, STORE_ROW_CAP};
pub use window::{WindowPage, WindowedFetcher};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::analytics::{aggregate, Aggregates};
use crate::domain::export::export_csv;
use crate::domain::filter::FilterSpec;
use crate::domain::request_log::RequestLog;
use crate::error::ExportError;
use crate::infra::log_store::LogStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    LoadingMore,
    Errored,
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    filter: FilterSpec,
    phase: SessionPhase,
    aggregates: Aggregates,
    rows: Vec<RequestLog>,
    total_count: u64,
    has_more: bool,
    error: Option<String>,
    load_more_error: Option<String>,
}

/// Point-in-time copy of the session for rendering.
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub filter: FilterSpec,
    pub phase: SessionPhase,
    pub aggregates: Aggregates,
    pub rows: Vec<RequestLog>,
    pub total_count: u64,
    pub has_more: bool,
    pub error: Option<String>,
    pub load_more_error: Option<String>,
}

impl AnalyticsSnapshot {
    pub fn loading(&self) -> bool {
        self.phase == SessionPhase::Loading
    }

    pub fn loading_more(&self) -> bool {
        self.phase == SessionPhase::LoadingMore
    }
}

/// One dashboard session over a log store. Each filter change starts a new
/// fetch cycle; a generation counter discards results of superseded cycles
/// so a slow old response can never overwrite a newer one.
pub struct AnalyticsSession<S> {
    store: S,
    full: FullDatasetFetcher,
    window: WindowedFetcher,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl<S: LogStore> AnalyticsSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_fetcher(store, FullDatasetFetcher::new())
    }

    pub fn with_fetcher(store: S, full: FullDatasetFetcher) -> Self {
        Self {
            store,
            full,
            window: WindowedFetcher,
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let state = self.lock_state();
        AnalyticsSnapshot {
            filter: state.filter.clone(),
            phase: state.phase,
            aggregates: state.aggregates.clone(),
            rows: state.rows.clone(),
            total_count: state.total_count,
            has_more: state.has_more,
            error: state.error.clone(),
            load_more_error: state.load_more_error.clone(),
        }
    }

    /// Replaces the filter and runs a fresh fetch cycle. Any cycle still in
    /// flight is superseded and its results will be discarded on arrival.
    pub async fn apply_filter(&self, filter: FilterSpec) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock_state();
            state.filter = filter.clone();
            state.phase = SessionPhase::Loading;
            state.error = None;
            state.load_more_error = None;
        }
        self.run_cycle(generation, filter).await;
    }

    /// Re-runs the current filter from scratch.
    pub async fn refresh(&self) {
        let filter = self.lock_state().filter.clone();
        self.apply_filter(filter).await;
    }

    async fn run_cycle(&self, generation: u64, filter: FilterSpec) {
        let (full_result, window_result) = tokio::join!(
            self.full.fetch(&self.store, &filter),
            self.window.fetch_page(&self.store, &filter, None),
        );

        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded fetch cycle");
            return;
        }

        let mut error = None;
        match full_result {
            Ok(rows) => state.aggregates = aggregate(&rows),
            Err(e) => {
                warn!(error = %e, "full dataset fetch failed");
                state.aggregates = Aggregates::default();
                error = Some(e.to_string());
            }
        }
        match window_result {
            Ok(page) => {
                state.rows = page.rows;
                state.total_count = page.total_count;
                state.has_more = page.has_more;
            }
            Err(e) => {
                warn!(error = %e, "window fetch failed");
                state.rows.clear();
                state.total_count = 0;
                state.has_more = false;
                error.get_or_insert(e.to_string());
            }
        }
        state.phase = if error.is_some() {
            SessionPhase::Errored
        } else {
            SessionPhase::Ready
        };
        state.error = error;
    }

    /// Appends the next page to the visible rows. A no-op unless the session
    /// is `Ready` with more rows expected. A failure keeps the rows already
    /// shown and records a separate load-more error.
    pub async fn load_more(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let (filter, known_len) = {
            let mut state = self.lock_state();
            if state.phase != SessionPhase::Ready || !state.has_more {
                return;
            }
            state.phase = SessionPhase::LoadingMore;
            state.load_more_error = None;
            (state.filter.clone(), state.rows.len())
        };

        let result = self
            .window
            .fetch_page(&self.store, &filter, Some(known_len))
            .await;

        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) != generation {
            // A newer cycle owns the state now, including its phase.
            debug!(generation, "discarding superseded load-more");
            return;
        }
        match result {
            Ok(page) => {
                state.has_more = page.has_more;
                state.total_count = page.total_count;
                state.rows.extend(page.rows);
            }
            Err(e) => {
                warn!(error = %e, "load more failed");
                state.load_more_error = Some(e.to_string());
                state.has_more = false;
            }
        }
        state.phase = SessionPhase::Ready;
    }

    /// CSV of the rows currently shown in the list, in display order.
    pub fn export_visible(&self) -> Result<String, ExportError> {
        let state = self.lock_state();
        export_csv(&state.rows)
    }
}
