//! External collaborator contracts consumed by the session controller.
//!
//! The controller treats discovery and the byte-level trim work as black
//! boxes behind these traits; the `padtrim` binary supplies filesystem
//! implementations and tests supply mocks.

use anyhow::Result;

use padtrim_types::{CatalogSeed, Outcome, RecordPath};

use crate::CancelSignal;

/// Progress callback: `(done, total)` in collaborator-defined units
/// (typically bytes). The worker converts to a percentage and drops
/// updates that do not change it.
pub type ProgressFn<'a> = dyn FnMut(u64, u64) + 'a;

/// Discovery side: enumerates candidate files and re-probes single
/// paths after an operation so savings and capability flags stay fresh.
pub trait ArchiveLibrary: Send + Sync {
    /// Full scan at session start.
    fn discover(&self) -> Result<Vec<CatalogSeed>>;

    /// Re-probe one path. `Ok(None)` means the file is gone.
    fn refresh(&self, path: &RecordPath) -> Result<Option<CatalogSeed>>;

    /// Cheap capability probe, used to default-select fresh records.
    fn can_trim(&self, path: &RecordPath) -> bool;
}

/// Operation side: the actual trim/untrim work for one file.
///
/// Implementations should poll `cancel` between IO chunks and return
/// `Ok(Outcome::Cancelled)` when they observe it; an `Err` is recorded
/// as a per-record failure and never aborts the batch.
pub trait ArchiveTrimmer: Send + Sync {
    fn trim(
        &self,
        path: &RecordPath,
        cancel: &CancelSignal,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<Outcome>;

    fn untrim(
        &self,
        path: &RecordPath,
        cancel: &CancelSignal,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<Outcome>;
}
