//! The session controller: owns the catalog, selection, and view, and
//! the lifecycle of the (at most one) background batch.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use padtrim_core::{recompute, status_summary, Catalog, SelectionSet, BYTES_PER_MIB};
use padtrim_types::{BatchMode, CatalogSeed, FileRecord, Outcome, RecordPath};

use crate::collaborators::{ArchiveLibrary, ArchiveTrimmer};
use crate::state::{ActiveBatch, SessionState};
use crate::worker::{run_batch, BatchJob};
use crate::{CancelSignal, ProcessingRecord, SessionEvent, WorkerEvent};

/// Capacity of the change-notification channel. Listeners that lag past
/// this many events miss some cues and simply re-read on the next one.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Orchestrates catalog/selection/view consistency and the background
/// worker lifecycle.
///
/// All methods must be called from the interactive context. The worker
/// posts [`WorkerEvent`]s; the host loop calls
/// [`drain_worker_events`](Self::drain_worker_events) to apply them, so
/// every mutation of the shared collections happens on the caller's
/// thread.
pub struct SessionController {
    catalog: Catalog,
    selection: SelectionSet,
    view: Vec<FileRecord>,
    search: String,
    state: SessionState,
    library: Arc<dyn ArchiveLibrary>,
    trimmer: Arc<dyn ArchiveTrimmer>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    #[must_use]
    pub fn new(library: Arc<dyn ArchiveLibrary>, trimmer: Arc<dyn ArchiveTrimmer>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            catalog: Catalog::new(),
            selection: SelectionSet::new(),
            view: Vec::new(),
            search: String::new(),
            state: SessionState::Idle,
            library,
            trimmer,
            events,
        }
    }

    /// Discover candidates and populate the catalog, default-selecting
    /// every record the cheap capability probe accepts. Returns the
    /// number of discovered records. No-op while a batch is running.
    pub fn load_catalog(&mut self) -> anyhow::Result<usize> {
        if self.state.is_running() {
            tracing::debug!("load_catalog ignored while a batch is running");
            return Ok(0);
        }
        let seeds = self.library.discover()?;
        let count = seeds.len();
        for seed in seeds {
            let path = seed.path.clone();
            self.catalog.upsert(FileRecord::from_seed(seed));
            if self.library.can_trim(&path) {
                self.selection.select(path);
            }
        }
        self.view = recompute(&self.catalog, &self.search);
        tracing::info!(count, "catalog loaded");
        self.emit(SessionEvent::CatalogChanged);
        self.emit(SessionEvent::SelectionChanged);
        self.emit(SessionEvent::ViewChanged);
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Update the search text. The view is recomputed immediately unless
    /// a batch is running, in which case it stays pinned to the batch
    /// set and the new text takes effect when the batch finishes.
    pub fn set_search_text(&mut self, search: impl Into<String>) {
        self.search = search.into();
        if self.state.is_running() {
            return;
        }
        self.view = recompute(&self.catalog, &self.search);
        self.emit(SessionEvent::ViewChanged);
    }

    /// Select one record. Selecting a path not present in the catalog is
    /// a defensive no-op, never an error.
    pub fn select(&mut self, path: &RecordPath) {
        if !self.catalog.contains(path) {
            tracing::debug!(path = %path, "select ignored: not in catalog");
            return;
        }
        self.selection.select(path.clone());
        self.emit(SessionEvent::SelectionChanged);
    }

    pub fn deselect(&mut self, path: &RecordPath) {
        self.selection.deselect(path);
        self.emit(SessionEvent::SelectionChanged);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.catalog);
        self.emit(SessionEvent::SelectionChanged);
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
        self.emit(SessionEvent::SelectionChanged);
    }

    /// Start a trim batch. Returns whether a batch actually started.
    pub fn start_trim(&mut self) -> bool {
        self.start_batch(BatchMode::Trim)
    }

    /// Start an untrim batch. Returns whether a batch actually started.
    pub fn start_untrim(&mut self) -> bool {
        self.start_batch(BatchMode::Untrim)
    }

    /// Request cooperative cancellation of the running batch. No-op when
    /// idle. The in-flight record still runs to completion; the batch
    /// stops before the next one.
    pub fn request_cancel(&mut self) {
        if let Some(batch) = self.state.running() {
            tracing::info!(mode = %batch.mode(), "cancellation requested");
            batch.cancel().request();
        }
    }

    // ------------------------------------------------------------------
    // Worker event application (interactive context only)
    // ------------------------------------------------------------------

    /// Apply every queued worker event in order. Call this from the host
    /// loop; it never blocks.
    pub fn drain_worker_events(&mut self) {
        enum Step {
            Apply(WorkerEvent),
            Stop,
            Finish(bool),
        }

        loop {
            let step = match self.state.running_mut() {
                Some(batch) => match batch.try_recv() {
                    Ok(event) => Step::Apply(event),
                    Err(mpsc::error::TryRecvError::Empty) => Step::Stop,
                    // Worker gone without a final event (panic); close
                    // out the batch so the session cannot wedge.
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        Step::Finish(batch.cancel().is_requested())
                    }
                },
                None => Step::Stop,
            };
            match step {
                Step::Apply(event) => self.apply_worker_event(event),
                Step::Stop => break,
                Step::Finish(cancelled) => {
                    tracing::warn!("worker channel closed without BatchFinished");
                    self.finish_batch(cancelled);
                    break;
                }
            }
        }
    }

    /// Await the running batch and apply its remaining events. Used by
    /// non-interactive hosts (and tests) that have nothing to do until
    /// the batch is over.
    pub async fn run_to_completion(&mut self) {
        let handle = self.state.running_mut().and_then(ActiveBatch::take_handle);
        if let Some(handle) = handle {
            if let Err(error) = handle.await {
                tracing::error!("worker task failed: {error}");
            }
        }
        self.drain_worker_events();
    }

    fn apply_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::RecordStarted { path } => {
                let record = self.catalog.get(&path).cloned();
                if let (Some(record), Some(batch)) = (record, self.state.running_mut()) {
                    batch.set_processing(record);
                    self.emit(SessionEvent::ProgressChanged);
                }
            }
            WorkerEvent::Progress { path, percent } => {
                let mut changed = false;
                if let Some(processing) =
                    self.state.running_mut().and_then(ActiveBatch::processing_mut)
                {
                    if processing.path() == &path {
                        processing.set_percent(percent);
                        changed = true;
                    }
                }
                if changed {
                    self.emit(SessionEvent::ProgressChanged);
                }
            }
            WorkerEvent::RecordFinished {
                path,
                outcome,
                refreshed,
            } => self.merge_record_outcome(&path, outcome, refreshed),
            WorkerEvent::BatchFinished { cancelled } => self.finish_batch(cancelled),
        }
    }

    /// Merge one finished record back into the catalog: refreshed
    /// discovery data where available, with observed cancellation
    /// normalised to "not attempted".
    fn merge_record_outcome(
        &mut self,
        path: &RecordPath,
        outcome: Outcome,
        refreshed: Option<CatalogSeed>,
    ) {
        let outcome = outcome.normalised();
        let base = refreshed
            .map(FileRecord::from_seed)
            .or_else(|| self.catalog.get(path).cloned());
        if let Some(record) = base {
            let record = record.with_outcome(outcome);
            self.catalog.upsert(record.clone());
            self.selection.reconcile(&self.catalog);
            // Keep the pinned view row current so refreshed savings and
            // the outcome are visible mid-run.
            if let Some(row) = self.view.iter_mut().find(|r| &r.path == path) {
                *row = record;
            }
            self.emit(SessionEvent::CatalogChanged);
        } else {
            tracing::warn!(path = %path, "finished record missing from catalog and discovery");
        }
        if let Some(batch) = self.state.running_mut() {
            batch.clear_processing();
        }
        self.emit(SessionEvent::ProgressChanged);
    }

    /// `Running -> Idle`: re-derive the view from the latest catalog
    /// data and reconcile the selection against it.
    fn finish_batch(&mut self, cancelled: bool) {
        self.state = SessionState::Idle;
        self.view = recompute(&self.catalog, &self.search);
        self.selection.reconcile(&self.catalog);
        tracing::info!(cancelled, "batch finished");
        self.emit(SessionEvent::BatchFinished { cancelled });
        self.emit(SessionEvent::ViewChanged);
        self.emit(SessionEvent::SelectionChanged);
    }

    fn start_batch(&mut self, mode: BatchMode) -> bool {
        if self.state.is_running() {
            tracing::debug!(%mode, "batch already running; start request ignored");
            return false;
        }
        let pinned = self.selection.eligible_for(&self.catalog, mode);
        if pinned.is_empty() {
            tracing::debug!(%mode, "no eligible records selected");
            return false;
        }

        let cancel = CancelSignal::new();
        let (events, receiver) = mpsc::unbounded_channel();
        let job = BatchJob {
            mode,
            records: pinned.clone(),
            library: Arc::clone(&self.library),
            trimmer: Arc::clone(&self.trimmer),
            cancel: cancel.clone(),
            events,
        };
        let handle = tokio::task::spawn_blocking(move || run_batch(job));

        tracing::info!(%mode, count = pinned.len(), "batch started");
        // The visible view is pinned to the batch set for the whole run
        // so the running set cannot shift under the user.
        self.view = pinned.clone();
        self.state = SessionState::Running(ActiveBatch::new(mode, cancel, pinned, receiver, handle));
        self.emit(SessionEvent::BatchStarted(mode));
        self.emit(SessionEvent::ViewChanged);
        true
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Subscribe to change notifications. Events are cues to re-read the
    /// controller, not data carriers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn view(&self) -> &[FileRecord] {
        &self.view
    }

    #[must_use]
    pub fn catalog_snapshot(&self) -> Vec<FileRecord> {
        self.catalog.snapshot()
    }

    #[must_use]
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn is_selected(&self, path: &RecordPath) -> bool {
        self.selection.contains(path)
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    #[must_use]
    pub fn cancel_requested(&self) -> bool {
        self.state
            .running()
            .is_some_and(|batch| batch.cancel().is_requested())
    }

    /// The running batch's mode, if any.
    #[must_use]
    pub fn mode(&self) -> Option<BatchMode> {
        self.state.running().map(ActiveBatch::mode)
    }

    /// The record currently being processed, with its live progress.
    #[must_use]
    pub fn processing(&self) -> Option<&ProcessingRecord> {
        self.state.running().and_then(ActiveBatch::processing)
    }

    /// The pinned batch set of the running batch, if any.
    #[must_use]
    pub fn pinned_batch(&self) -> Option<&[FileRecord]> {
        self.state.running().map(ActiveBatch::pinned)
    }

    /// Sum of potential savings over the catalog, in whole MiB.
    #[must_use]
    pub fn potential_savings_mb(&self) -> u64 {
        self.catalog.total_potential_savings_b() / BYTES_PER_MIB
    }

    /// Sum of realised savings over the catalog, in whole MiB.
    #[must_use]
    pub fn actual_savings_mb(&self) -> u64 {
        self.catalog.total_current_savings_b() / BYTES_PER_MIB
    }

    /// Human-readable selection/total(/displayed) counts.
    #[must_use]
    pub fn status_summary(&self) -> String {
        status_summary(self.selection.len(), self.catalog.len(), self.view.len())
    }

    #[must_use]
    pub fn can_start_trim(&self) -> bool {
        !self.state.is_running() && self.has_eligible(BatchMode::Trim)
    }

    #[must_use]
    pub fn can_start_untrim(&self) -> bool {
        !self.state.is_running() && self.has_eligible(BatchMode::Untrim)
    }

    fn has_eligible(&self, mode: BatchMode) -> bool {
        self.catalog
            .iter()
            .any(|record| self.selection.contains(&record.path) && record.eligible_for(mode))
    }

    fn emit(&self, event: SessionEvent) {
        // A send error just means nobody is listening right now.
        let _ = self.events.send(event);
    }
}
