use std::collections::HashSet;

use padtrim_types::{BatchMode, FileRecord, RecordPath};

use crate::view::display_order;
use crate::Catalog;

/// The set of catalog keys chosen for the next batch operation.
///
/// Keyed by path rather than by record value, so replacing a record with
/// a refreshed version of itself cannot invalidate the selection. Always
/// a subset of the catalog's keys after [`SelectionSet::reconcile`]; NOT
/// required to be a subset of the current view - the filter hides
/// records, it never deselects them.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    paths: HashSet<RecordPath>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &RecordPath) -> bool {
        self.paths.contains(path)
    }

    /// Select one record. Selecting an already-selected path is a no-op.
    pub fn select(&mut self, path: RecordPath) {
        self.paths.insert(path);
    }

    pub fn deselect(&mut self, path: &RecordPath) {
        self.paths.remove(path);
    }

    /// Replace the selection with every key in the catalog.
    pub fn select_all(&mut self, catalog: &Catalog) {
        self.paths = catalog.iter().map(|r| r.path.clone()).collect();
    }

    pub fn select_none(&mut self) {
        self.paths.clear();
    }

    /// Drop any selected path no longer present in the catalog. Must run
    /// after every catalog mutation that can remove entries, otherwise
    /// stale selections leak.
    pub fn reconcile(&mut self, catalog: &Catalog) {
        let before = self.paths.len();
        self.paths.retain(|path| catalog.contains(path));
        let dropped = before - self.paths.len();
        if dropped > 0 {
            tracing::debug!(dropped, "selection reconciled against catalog");
        }
    }

    /// Selected records eligible for `mode`, in display order (name,
    /// then path) so batch processing order is deterministic and
    /// independent of selection insertion order.
    #[must_use]
    pub fn eligible_for(&self, catalog: &Catalog, mode: BatchMode) -> Vec<FileRecord> {
        let mut eligible: Vec<FileRecord> = catalog
            .iter()
            .filter(|record| self.paths.contains(&record.path) && record.eligible_for(mode))
            .cloned()
            .collect();
        eligible.sort_by(display_order);
        eligible
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordPath> {
        self.paths.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionSet;
    use crate::Catalog;
    use padtrim_types::{BatchMode, CatalogSeed, FileRecord, RecordPath};

    fn path(s: &str) -> RecordPath {
        RecordPath::new(s).unwrap()
    }

    fn record(p: &str, name: &str, trimmable: bool) -> FileRecord {
        FileRecord::from_seed(CatalogSeed {
            name: name.to_string(),
            path: path(p),
            trimmable,
            untrimmable: !trimmable,
            potential_savings_b: 0,
            current_savings_b: 0,
        })
    }

    #[test]
    fn select_and_deselect_are_set_operations() {
        let mut selection = SelectionSet::new();
        selection.select(path("/a"));
        selection.select(path("/a"));
        assert_eq!(selection.len(), 1);
        selection.deselect(&path("/a"));
        assert!(selection.is_empty());
        // Deselecting a missing path is a no-op, never an error.
        selection.deselect(&path("/a"));
    }

    #[test]
    fn reconcile_drops_paths_missing_from_catalog() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", true));
        catalog.upsert(record("/b", "B", true));

        let mut selection = SelectionSet::new();
        selection.select_all(&catalog);
        assert_eq!(selection.len(), 2);

        catalog.remove(&path("/a"));
        selection.reconcile(&catalog);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&path("/b")));
    }

    #[test]
    fn selection_survives_record_replacement() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", true));
        let mut selection = SelectionSet::new();
        selection.select(path("/a"));

        catalog.upsert(record("/a", "A renamed", false));
        selection.reconcile(&catalog);
        assert!(selection.contains(&path("/a")));
    }

    #[test]
    fn eligible_for_filters_by_capability() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", true));
        catalog.upsert(record("/b", "B", false));
        let mut selection = SelectionSet::new();
        selection.select_all(&catalog);

        let trim = selection.eligible_for(&catalog, BatchMode::Trim);
        assert_eq!(trim.len(), 1);
        assert_eq!(trim[0].path, path("/a"));

        let untrim = selection.eligible_for(&catalog, BatchMode::Untrim);
        assert_eq!(untrim.len(), 1);
        assert_eq!(untrim[0].path, path("/b"));
    }

    #[test]
    fn eligible_order_is_name_then_path_not_selection_order() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/b", "B", true));
        catalog.upsert(record("/a", "A", true));
        catalog.upsert(record("/c", "C", true));

        let mut selection = SelectionSet::new();
        // Select in scrambled order: B, A, C.
        selection.select(path("/b"));
        selection.select(path("/a"));
        selection.select(path("/c"));

        let order: Vec<String> = selection
            .eligible_for(&catalog, BatchMode::Trim)
            .iter()
            .map(|r| r.name.clone())
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }
}
