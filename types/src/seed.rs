use crate::RecordPath;

/// Discovery output for one candidate file.
///
/// Produced by the archive library collaborator at session start and
/// re-queried per path after an operation completes, so savings and
/// capability flags reflect the file as it is on disk right now.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogSeed {
    pub name: String,
    pub path: RecordPath,
    pub trimmable: bool,
    pub untrimmable: bool,
    pub potential_savings_b: u64,
    pub current_savings_b: u64,
}
