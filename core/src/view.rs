//! View projection: the filtered, sorted display sequence.
//!
//! Deliberately recomputed wholesale from the catalog on every change
//! rather than patched incrementally - O(n log n) per call buys freedom
//! from incremental-diff bugs. Hiding a record never deselects it;
//! membership in the selection is independent of the current filter.

use std::cmp::Ordering;

use padtrim_types::FileRecord;

use crate::Catalog;

/// The one total order used everywhere records are shown or processed:
/// ascending by name, ties broken by path. Name comparison is
/// case-sensitive byte order; the tie-break makes the order total
/// because paths are unique.
#[must_use]
pub fn display_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.path.cmp(&b.path))
}

/// Case-insensitive substring filter over name OR path. Blank search
/// matches everything.
#[must_use]
pub fn matches_search(record: &FileRecord, search: &str) -> bool {
    let search = search.trim();
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    record.name.to_lowercase().contains(&needle)
        || record.path.display_string().to_lowercase().contains(&needle)
}

/// Derive the display sequence from the catalog and search text.
#[must_use]
pub fn recompute(catalog: &Catalog, search: &str) -> Vec<FileRecord> {
    let mut view: Vec<FileRecord> = catalog
        .iter()
        .filter(|record| matches_search(record, search))
        .cloned()
        .collect();
    view.sort_by(display_order);
    view
}

#[cfg(test)]
mod tests {
    use super::{matches_search, recompute};
    use crate::Catalog;
    use padtrim_types::{CatalogSeed, FileRecord, RecordPath};

    fn record(path: &str, name: &str) -> FileRecord {
        FileRecord::from_seed(CatalogSeed {
            name: name.to_string(),
            path: RecordPath::new(path).unwrap(),
            trimmable: true,
            untrimmable: false,
            potential_savings_b: 0,
            current_savings_b: 0,
        })
    }

    fn catalog(records: &[(&str, &str)]) -> Catalog {
        let mut catalog = Catalog::new();
        for (path, name) in records {
            catalog.upsert(record(path, name));
        }
        catalog
    }

    #[test]
    fn sorted_by_name_then_path_regardless_of_insertion() {
        let catalog = catalog(&[("/2", "Beta"), ("/3", "Alpha"), ("/1", "Alpha")]);
        let view = recompute(&catalog, "");
        let order: Vec<String> = view
            .iter()
            .map(|r| format!("{}{}", r.name, r.path))
            .collect();
        assert_eq!(order, vec!["Alpha/1", "Alpha/3", "Beta/2"]);
    }

    #[test]
    fn recompute_is_deterministic() {
        let a = catalog(&[("/2", "B"), ("/1", "A")]);
        let b = catalog(&[("/1", "A"), ("/2", "B")]);
        let view_a = recompute(&a, "");
        let view_b = recompute(&b, "");
        assert_eq!(view_a.len(), view_b.len());
        for (x, y) in view_a.iter().zip(&view_b) {
            assert!(x.same_contents(y));
        }
    }

    #[test]
    fn blank_search_matches_all() {
        let record = record("/games/zelda.img", "Zelda");
        assert!(matches_search(&record, ""));
        assert!(matches_search(&record, "   "));
    }

    #[test]
    fn search_is_case_insensitive_on_name_and_path() {
        let record = record("/Games/cart.img", "Metroid Prime");
        assert!(matches_search(&record, "metroid"));
        assert!(matches_search(&record, "PRIME"));
        assert!(matches_search(&record, "games/CART"));
        assert!(!matches_search(&record, "zelda"));
    }

    #[test]
    fn filtered_view_contains_only_matches() {
        let catalog = catalog(&[("/1", "Alpha"), ("/2", "Beta"), ("/3", "Alphabet")]);
        let view = recompute(&catalog, "alpha");
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.name.to_lowercase().contains("alpha")));
    }
}
