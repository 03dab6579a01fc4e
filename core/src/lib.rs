//! Catalog, selection, and view projection for padtrim.
//!
//! Three views of one set of records, kept consistent by construction:
//! the [`Catalog`] is the canonical identity-keyed collection, the
//! [`SelectionSet`] is a set of catalog keys, and the view projection is
//! recomputed wholesale from the catalog on demand rather than patched
//! incrementally.

mod catalog;
mod display;
mod selection;
mod view;

pub use catalog::Catalog;
pub use display::{
    capability_label, outcome_label, space_savings_summary, status_summary, BYTES_PER_MIB,
};
pub use selection::SelectionSet;
pub use view::{display_order, matches_search, recompute};
