//! Trim session controller for padtrim - state machine and orchestration.
//!
//! The [`SessionController`] owns the canonical catalog, the selection
//! set, and the derived view, and runs at most one background batch at a
//! time. The worker never touches the shared collections: it posts
//! [`WorkerEvent`]s over a channel and the interactive context applies
//! them in order via [`SessionController::drain_worker_events`]
//! (single-writer discipline, no fine-grained locks).

mod cancel;
mod collaborators;
mod events;
mod session;
mod state;
mod worker;

pub use cancel::CancelSignal;
pub use collaborators::{ArchiveLibrary, ArchiveTrimmer, ProgressFn};
pub use events::SessionEvent;
pub use session::SessionController;
pub use state::ProcessingRecord;

pub(crate) use events::WorkerEvent;

// Re-export the domain types callers need to drive a session.
pub use padtrim_core::{Catalog, SelectionSet};
pub use padtrim_types::{BatchMode, CatalogSeed, FileRecord, Outcome, RecordPath};
