//! Core domain types for padtrim - no IO, no async.
//!
//! Everything here is a plain value: the catalog, selection, view, and
//! session layers are built on top of these types without this crate
//! knowing about any of them.

mod mode;
mod path;
mod record;
mod seed;

pub use mode::BatchMode;
pub use path::{EmptyPathError, RecordPath};
pub use record::{FileRecord, Outcome};
pub use seed::CatalogSeed;
