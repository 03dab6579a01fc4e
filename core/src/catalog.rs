use padtrim_types::{FileRecord, RecordPath};

/// The canonical, identity-keyed collection of file records.
///
/// Semantically a set keyed by path, stored in insertion order. Upserting
/// a path that already exists replaces the record AT THE SAME POSITION:
/// identity equality diverges from structural equality on [`FileRecord`],
/// so replacement always locates the slot by key rather than by value
/// match, which is what makes "replace" actually replace.
///
/// Ordering for display is the view projection's job; the catalog only
/// promises key uniqueness and a stable position per key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<FileRecord>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &RecordPath) -> bool {
        self.position(path).is_some()
    }

    #[must_use]
    pub fn get(&self, path: &RecordPath) -> Option<&FileRecord> {
        self.position(path).map(|i| &self.records[i])
    }

    /// Insert or replace by identity. Returns `true` when an existing
    /// record was replaced.
    pub fn upsert(&mut self, record: FileRecord) -> bool {
        match self.position(&record.path) {
            Some(i) => {
                tracing::debug!(path = %record.path, "catalog replace");
                self.records[i] = record;
                true
            }
            None => {
                self.records.push(record);
                false
            }
        }
    }

    /// Remove by identity. Callers that also hold a selection must
    /// reconcile it afterwards (see `SelectionSet::reconcile`).
    pub fn remove(&mut self, path: &RecordPath) -> Option<FileRecord> {
        let i = self.position(path)?;
        tracing::debug!(path = %path, "catalog remove");
        Some(self.records.remove(i))
    }

    /// Point-in-time copy, safe to hand to another context.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FileRecord> {
        self.records.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    /// Sum of potential savings over the whole catalog, in bytes.
    #[must_use]
    pub fn total_potential_savings_b(&self) -> u64 {
        self.records.iter().map(|r| r.potential_savings_b).sum()
    }

    /// Sum of already-realised savings over the whole catalog, in bytes.
    #[must_use]
    pub fn total_current_savings_b(&self) -> u64 {
        self.records.iter().map(|r| r.current_savings_b).sum()
    }

    fn position(&self, path: &RecordPath) -> Option<usize> {
        self.records.iter().position(|r| &r.path == path)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Catalog;
    use padtrim_types::{CatalogSeed, FileRecord, Outcome, RecordPath};

    fn record(path: &str, name: &str, potential: u64) -> FileRecord {
        FileRecord::from_seed(CatalogSeed {
            name: name.to_string(),
            path: RecordPath::new(path).unwrap(),
            trimmable: true,
            untrimmable: false,
            potential_savings_b: potential,
            current_savings_b: 0,
        })
    }

    #[test]
    fn upsert_new_record_appends() {
        let mut catalog = Catalog::new();
        assert!(!catalog.upsert(record("/a", "A", 10)));
        assert!(!catalog.upsert(record("/b", "B", 20)));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn upsert_same_path_replaces_not_appends() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", 10));
        catalog.upsert(record("/b", "B", 20));

        let replaced = catalog.upsert(record("/a", "A renamed", 99));
        assert!(replaced);
        assert_eq!(catalog.len(), 2);
        let stored = catalog
            .get(&RecordPath::new("/a").unwrap())
            .expect("record still present");
        assert_eq!(stored.name, "A renamed");
        assert_eq!(stored.potential_savings_b, 99);
    }

    #[test]
    fn replace_keeps_position() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", 10));
        catalog.upsert(record("/b", "B", 20));
        catalog.upsert(record("/a", "A2", 11));

        let order: Vec<String> = catalog.iter().map(|r| r.name.clone()).collect();
        assert_eq!(order, vec!["A2", "B"]);
    }

    #[test]
    fn replace_with_different_outcome_still_replaces() {
        // Identity equality ignores the outcome field; replacement must
        // key on the path, not on full structural equality.
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", 10));
        catalog.upsert(record("/a", "A", 10).with_outcome(Outcome::Successful));
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(&RecordPath::new("/a").unwrap()).unwrap().outcome,
            Outcome::Successful
        );
    }

    #[test]
    fn remove_drops_the_entry() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", 10));
        let removed = catalog.remove(&RecordPath::new("/a").unwrap());
        assert!(removed.is_some());
        assert!(catalog.is_empty());
        assert!(catalog.remove(&RecordPath::new("/a").unwrap()).is_none());
    }

    #[test]
    fn aggregates_sum_over_all_records() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("/a", "A", 10));
        catalog.upsert(record("/b", "B", 20));
        let mut c = record("/c", "C", 0);
        c.current_savings_b = 7;
        catalog.upsert(c);
        assert_eq!(catalog.total_potential_savings_b(), 30);
        assert_eq!(catalog.total_current_savings_b(), 7);
    }
}
