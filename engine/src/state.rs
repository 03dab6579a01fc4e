//! Session state machine types.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use padtrim_types::{BatchMode, FileRecord, RecordPath};

use crate::{CancelSignal, WorkerEvent};

/// The record currently being operated on, carrying its transient
/// progress. Kept separate from the catalog so the percentage can never
/// leak into persisted record state once processing ends.
#[derive(Debug, Clone)]
pub struct ProcessingRecord {
    record: FileRecord,
    percent: Option<u8>,
}

impl ProcessingRecord {
    pub(crate) fn new(record: FileRecord) -> Self {
        Self {
            record,
            percent: None,
        }
    }

    #[must_use]
    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    #[must_use]
    pub fn path(&self) -> &RecordPath {
        &self.record.path
    }

    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        self.percent
    }

    /// Published percentages are non-decreasing for the lifetime of the
    /// record; a late or reordered lower value is clamped.
    pub(crate) fn set_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.percent = Some(self.percent.map_or(percent, |old| old.max(percent)));
    }
}

/// One in-flight batch run.
///
/// Holds the pinned record sequence captured at start time (immune to
/// concurrent selection/filter changes), the shared cancel signal, the
/// worker's event channel, and the worker handle.
#[derive(Debug)]
pub(crate) struct ActiveBatch {
    mode: BatchMode,
    cancel: CancelSignal,
    pinned: Vec<FileRecord>,
    processing: Option<ProcessingRecord>,
    events: mpsc::UnboundedReceiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
}

impl ActiveBatch {
    pub(crate) fn new(
        mode: BatchMode,
        cancel: CancelSignal,
        pinned: Vec<FileRecord>,
        events: mpsc::UnboundedReceiver<WorkerEvent>,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            mode,
            cancel,
            pinned,
            processing: None,
            events,
            handle: Some(handle),
        }
    }

    pub(crate) fn mode(&self) -> BatchMode {
        self.mode
    }

    pub(crate) fn cancel(&self) -> &CancelSignal {
        &self.cancel
    }

    pub(crate) fn pinned(&self) -> &[FileRecord] {
        &self.pinned
    }

    pub(crate) fn processing(&self) -> Option<&ProcessingRecord> {
        self.processing.as_ref()
    }

    pub(crate) fn processing_mut(&mut self) -> Option<&mut ProcessingRecord> {
        self.processing.as_mut()
    }

    pub(crate) fn set_processing(&mut self, record: FileRecord) {
        self.processing = Some(ProcessingRecord::new(record));
    }

    pub(crate) fn clear_processing(&mut self) {
        self.processing = None;
    }

    pub(crate) fn try_recv(&mut self) -> Result<WorkerEvent, mpsc::error::TryRecvError> {
        self.events.try_recv()
    }

    /// Take the worker handle for awaiting; `None` after the first take.
    pub(crate) fn take_handle(&mut self) -> Option<JoinHandle<()>> {
        self.handle.take()
    }
}

/// `Idle -> Running -> Idle`. "Cancelling" is not a separate state, only
/// the cancel flag on the running batch.
#[derive(Debug, Default)]
pub(crate) enum SessionState {
    #[default]
    Idle,
    Running(ActiveBatch),
}

impl SessionState {
    pub(crate) fn running(&self) -> Option<&ActiveBatch> {
        match self {
            Self::Idle => None,
            Self::Running(batch) => Some(batch),
        }
    }

    pub(crate) fn running_mut(&mut self) -> Option<&mut ActiveBatch> {
        match self {
            Self::Idle => None,
            Self::Running(batch) => Some(batch),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}
