use std::hash::{Hash, Hasher};

use crate::{CatalogSeed, RecordPath};

/// Terminal classification of one record's attempted operation.
///
/// `Cancelled` is only ever reported by the trim collaborator when it
/// observes the cancel signal mid-operation; the session controller
/// normalises it to `Undetermined` before the record reaches the
/// catalog, so catalog records never carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Outcome {
    /// No completed attempt yet.
    Undetermined,
    /// The last attempted operation succeeded.
    Successful,
    /// The last attempted operation failed.
    Failed,
    /// The operation stopped early because cancellation was observed.
    Cancelled,
}

impl Outcome {
    /// Collapse observed cancellation into "not attempted".
    #[must_use]
    pub fn normalised(self) -> Self {
        match self {
            Self::Cancelled => Self::Undetermined,
            other => other,
        }
    }
}

/// One catalog entry's trimming state.
///
/// Immutable per version: a changed record is a new value replacing the
/// old one by identity. Equality and hashing use the PATH ONLY, so set
/// and map membership follow identity rather than field contents -
/// replacing a record with a refreshed version of itself never changes
/// membership. Use [`FileRecord::same_contents`] when a structural
/// comparison is actually wanted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: RecordPath,
    pub trimmable: bool,
    pub untrimmable: bool,
    pub potential_savings_b: u64,
    pub current_savings_b: u64,
    pub outcome: Outcome,
}

impl FileRecord {
    /// Build a fresh record from a discovery seed. Outcome starts
    /// undetermined; transient progress lives outside the record.
    #[must_use]
    pub fn from_seed(seed: CatalogSeed) -> Self {
        Self {
            name: seed.name,
            path: seed.path,
            trimmable: seed.trimmable,
            untrimmable: seed.untrimmable,
            potential_savings_b: seed.potential_savings_b,
            current_savings_b: seed.current_savings_b,
            outcome: Outcome::Undetermined,
        }
    }

    /// Same record, different outcome.
    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Whether this record is eligible for the given batch direction.
    #[must_use]
    pub fn eligible_for(&self, mode: crate::BatchMode) -> bool {
        match mode {
            crate::BatchMode::Trim => self.trimmable,
            crate::BatchMode::Untrim => self.untrimmable,
        }
    }

    /// Field-by-field comparison, for tests and diffing.
    #[must_use]
    pub fn same_contents(&self, other: &Self) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.trimmable == other.trimmable
            && self.untrimmable == other.untrimmable
            && self.potential_savings_b == other.potential_savings_b
            && self.current_savings_b == other.current_savings_b
            && self.outcome == other.outcome
    }
}

impl PartialEq for FileRecord {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileRecord {}

impl Hash for FileRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}
