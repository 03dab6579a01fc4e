//! Filesystem discovery collaborator: walks a root directory for
//! archive files and probes their trim state.

use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::WalkBuilder;

use padtrim_engine::{ArchiveLibrary, CatalogSeed, RecordPath};

use crate::probe::trailing_padding_run;
use crate::sidecar::{Sidecar, SIDECAR_EXTENSION};

/// Runs shorter than this are not worth a trim; they would save less
/// than a filesystem block anyway.
pub const DEFAULT_MIN_TRIM_BYTES: u64 = 4096;

pub struct PaddedFileLibrary {
    root: PathBuf,
    /// Lowercase extensions without the leading dot.
    extensions: Vec<String>,
    min_trim_bytes: u64,
}

impl PaddedFileLibrary {
    #[must_use]
    pub fn new(root: PathBuf, extensions: Vec<String>, min_trim_bytes: u64) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self {
            root,
            extensions,
            min_trim_bytes,
        }
    }

    fn wanted(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        ext != SIDECAR_EXTENSION && self.extensions.contains(&ext)
    }

    /// Probe one file into a catalog seed. `Ok(None)` when the file is
    /// gone or is not a regular file.
    fn probe_seed(&self, path: &Path) -> Result<Option<CatalogSeed>> {
        let Ok(metadata) = std::fs::metadata(path) else {
            return Ok(None);
        };
        if !metadata.is_file() {
            return Ok(None);
        }
        let len = metadata.len();

        let run = trailing_padding_run(path)?.map_or(0, |run| run.len);
        // A file that is nothing but padding is not trimmed down to zero.
        let trimmable = run >= self.min_trim_bytes && run < len;

        let sidecar = Sidecar::load(path)?;
        let (untrimmable, current_savings_b) = match sidecar {
            Some(sidecar) => (true, sidecar.original_len.saturating_sub(len)),
            None => (false, 0),
        };

        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        let path = RecordPath::new(path)?;
        Ok(Some(CatalogSeed {
            name,
            path,
            trimmable,
            untrimmable,
            potential_savings_b: if trimmable { run } else { 0 },
            current_savings_b,
        }))
    }
}

impl ArchiveLibrary for PaddedFileLibrary {
    fn discover(&self) -> Result<Vec<CatalogSeed>> {
        let mut seeds = Vec::new();
        for entry in WalkBuilder::new(&self.root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!("walk error under {}: {error}", self.root.display());
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if !self.wanted(entry.path()) {
                continue;
            }
            match self.probe_seed(entry.path()) {
                Ok(Some(seed)) => seeds.push(seed),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(path = %entry.path().display(), "probe failed: {error:#}");
                }
            }
        }
        seeds.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(count = seeds.len(), root = %self.root.display(), "discovery complete");
        Ok(seeds)
    }

    fn refresh(&self, path: &RecordPath) -> Result<Option<CatalogSeed>> {
        self.probe_seed(path.as_path())
    }

    fn can_trim(&self, path: &RecordPath) -> bool {
        self.probe_seed(path.as_path())
            .ok()
            .flatten()
            .is_some_and(|seed| seed.trimmable)
    }
}
