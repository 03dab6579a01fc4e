use padtrim_types::{BatchMode, CatalogSeed, Outcome, RecordPath};

/// Message from the worker context to the interactive context.
///
/// Applied strictly in order by `drain_worker_events`; events for record
/// *i* are always fully applied before record *i+1* starts because the
/// worker is sequential and the channel preserves order.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    /// The worker is about to operate on this record.
    RecordStarted { path: RecordPath },
    /// The in-flight record's progress percentage changed.
    Progress { path: RecordPath, percent: u8 },
    /// One record ran to completion (success, failure, or observed
    /// cancellation). `refreshed` carries the post-operation re-probe
    /// when discovery could produce one.
    RecordFinished {
        path: RecordPath,
        outcome: Outcome,
        refreshed: Option<CatalogSeed>,
    },
    /// The batch loop exited; always the final event of a run.
    BatchFinished { cancelled: bool },
}

/// Change notification for presentation-layer listeners.
///
/// Events are cues to re-read the controller, not data carriers; a
/// lagging broadcast receiver may miss events but never observes a stale
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    CatalogChanged,
    ViewChanged,
    SelectionChanged,
    ProgressChanged,
    BatchStarted(BatchMode),
    BatchFinished { cancelled: bool },
}
