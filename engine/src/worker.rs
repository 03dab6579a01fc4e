//! The batch worker: strictly sequential, cancellation-aware, and
//! collection-blind. It only ever talks to the interactive context
//! through its event channel.

use std::sync::Arc;

use tokio::sync::mpsc;

use padtrim_types::{BatchMode, FileRecord, Outcome};

use crate::collaborators::{ArchiveLibrary, ArchiveTrimmer};
use crate::{CancelSignal, WorkerEvent};

pub(crate) struct BatchJob {
    pub(crate) mode: BatchMode,
    pub(crate) records: Vec<FileRecord>,
    pub(crate) library: Arc<dyn ArchiveLibrary>,
    pub(crate) trimmer: Arc<dyn ArchiveTrimmer>,
    pub(crate) cancel: CancelSignal,
    pub(crate) events: mpsc::UnboundedSender<WorkerEvent>,
}

/// Run a whole batch on the current (blocking) thread.
///
/// Per record: cancel check, `RecordStarted`, the external operation
/// with deduplicated `Progress` updates, a discovery re-probe, then
/// `RecordFinished`. A send failure means the controller is gone, so the
/// loop just stops.
pub(crate) fn run_batch(job: BatchJob) {
    let BatchJob {
        mode,
        records,
        library,
        trimmer,
        cancel,
        events,
    } = job;

    let mut cancelled = false;
    for record in records {
        // Already-started records always run to completion; cancellation
        // only prevents starting the next one.
        if cancel.is_requested() {
            cancelled = true;
            break;
        }

        let path = record.path.clone();
        if events
            .send(WorkerEvent::RecordStarted { path: path.clone() })
            .is_err()
        {
            return;
        }

        let mut last_percent: Option<u8> = None;
        let mut on_progress = |done: u64, total: u64| {
            let percent = percent_of(done, total);
            if last_percent == Some(percent) {
                return;
            }
            last_percent = Some(percent);
            let _ = events.send(WorkerEvent::Progress {
                path: path.clone(),
                percent,
            });
        };

        let result = match mode {
            BatchMode::Trim => trimmer.trim(&path, &cancel, &mut on_progress),
            BatchMode::Untrim => trimmer.untrim(&path, &cancel, &mut on_progress),
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!(path = %path, %mode, "operation failed: {error:#}");
                Outcome::Failed
            }
        };

        let refreshed = match library.refresh(&path) {
            Ok(seed) => seed,
            Err(error) => {
                tracing::warn!(path = %path, "post-operation refresh failed: {error:#}");
                None
            }
        };

        if events
            .send(WorkerEvent::RecordFinished {
                path,
                outcome,
                refreshed,
            })
            .is_err()
        {
            return;
        }
    }

    let _ = events.send(WorkerEvent::BatchFinished { cancelled });
}

/// `100 * done / total`, clamped to 100. A zero total is a degenerate
/// empty operation and reads as complete.
fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.saturating_mul(100) / total).min(100)) as u8
}

#[cfg(test)]
mod tests {
    use super::percent_of;

    #[test]
    fn percent_is_clamped() {
        assert_eq!(percent_of(0, 100), 0);
        assert_eq!(percent_of(50, 100), 50);
        assert_eq!(percent_of(150, 100), 100);
    }

    #[test]
    fn zero_total_reads_as_complete() {
        assert_eq!(percent_of(0, 0), 100);
    }
}
