//! Pure formatting helpers for the presentation layer.

use padtrim_types::{FileRecord, Outcome};

/// Savings are shown in whole mebibytes.
pub const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Short capability tag for a record row.
#[must_use]
pub fn capability_label(record: &FileRecord) -> &'static str {
    match (record.trimmable, record.untrimmable) {
        (true, true) => "Partial",
        (true, false) => "Trimmable",
        (false, true) => "Untrimmable",
        (false, false) => "",
    }
}

/// Outcome tag for a record row. Blank while the record is the one
/// actively being processed (`in_progress`), so a live progress readout
/// can take its place.
#[must_use]
pub fn outcome_label(record: &FileRecord, in_progress: bool) -> &'static str {
    if in_progress {
        return "";
    }
    match record.outcome {
        Outcome::Undetermined | Outcome::Cancelled => "",
        Outcome::Successful => "Success",
        Outcome::Failed => "Failed",
    }
}

/// Per-record savings summary: what could still be saved, or what has
/// been saved already once nothing is left to reclaim.
#[must_use]
pub fn space_savings_summary(potential_savings_b: u64, current_savings_b: u64) -> String {
    if current_savings_b < potential_savings_b {
        format!(
            "Can save {} MB",
            (potential_savings_b - current_savings_b) / BYTES_PER_MIB
        )
    } else {
        format!("Saving {} MB", current_savings_b / BYTES_PER_MIB)
    }
}

/// Session status line: selection counts, plus the displayed count when
/// a filter is hiding part of the catalog.
#[must_use]
pub fn status_summary(selected: usize, total: usize, displayed: usize) -> String {
    if displayed == total {
        format!("{selected} of {total} selected")
    } else {
        format!("{selected} of {total} selected ({displayed} shown)")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        capability_label, outcome_label, space_savings_summary, status_summary, BYTES_PER_MIB,
    };
    use padtrim_types::{CatalogSeed, FileRecord, Outcome, RecordPath};

    fn record(trimmable: bool, untrimmable: bool) -> FileRecord {
        FileRecord::from_seed(CatalogSeed {
            name: "Game".to_string(),
            path: RecordPath::new("/g.img").unwrap(),
            trimmable,
            untrimmable,
            potential_savings_b: 0,
            current_savings_b: 0,
        })
    }

    #[test]
    fn capability_labels() {
        assert_eq!(capability_label(&record(true, true)), "Partial");
        assert_eq!(capability_label(&record(true, false)), "Trimmable");
        assert_eq!(capability_label(&record(false, true)), "Untrimmable");
        assert_eq!(capability_label(&record(false, false)), "");
    }

    #[test]
    fn outcome_label_blank_while_processing() {
        let done = record(true, false).with_outcome(Outcome::Successful);
        assert_eq!(outcome_label(&done, true), "");
        assert_eq!(outcome_label(&done, false), "Success");
    }

    #[test]
    fn savings_summary_prefers_remaining_potential() {
        assert_eq!(
            space_savings_summary(5 * BYTES_PER_MIB, 2 * BYTES_PER_MIB),
            "Can save 3 MB"
        );
        assert_eq!(
            space_savings_summary(2 * BYTES_PER_MIB, 2 * BYTES_PER_MIB),
            "Saving 2 MB"
        );
    }

    #[test]
    fn savings_use_whole_mib_division() {
        // 1 MiB + 1 byte still rounds down to 1 MB.
        assert_eq!(space_savings_summary(BYTES_PER_MIB + 1, 0), "Can save 1 MB");
    }

    #[test]
    fn status_summary_mentions_filter_only_when_active() {
        assert_eq!(status_summary(2, 5, 5), "2 of 5 selected");
        assert_eq!(status_summary(2, 5, 3), "2 of 5 selected (3 shown)");
    }
}
