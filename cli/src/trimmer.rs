//! Filesystem trim collaborator: truncates trailing padding and can
//! restore it from the sidecar record.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};

use padtrim_engine::{ArchiveTrimmer, CancelSignal, Outcome, ProgressFn, RecordPath};

use crate::probe::{scan_trailing_padding, Scan, CHUNK_SIZE};
use crate::sidecar::Sidecar;

#[derive(Debug, Clone, Copy, Default)]
pub struct PaddingTrimmer;

impl PaddingTrimmer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Verify the padding run, then record the sidecar and truncate.
    ///
    /// The scan completes before the file is touched, so observing
    /// cancellation (or any scan error) leaves the file byte-identical.
    /// The sidecar is written before the truncate: a crash in between
    /// leaves an untouched file plus a stale sidecar, never a trimmed
    /// file with no restore record.
    fn trim_file(
        &self,
        path: &Path,
        cancel: &CancelSignal,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<Outcome> {
        let run = match scan_trailing_padding(path, cancel, on_progress)? {
            Scan::Cancelled => return Ok(Outcome::Cancelled),
            Scan::Complete(run) => run,
        };
        let Some(run) = run else {
            // Nothing to reclaim; a no-op trim still counts as done.
            return Ok(Outcome::Successful);
        };
        let total = std::fs::metadata(path)?.len();
        if run.len == 0 {
            return Ok(Outcome::Successful);
        }
        if run.len >= total {
            bail!("{} is entirely padding; refusing to trim", path.display());
        }

        Sidecar {
            original_len: total,
            fill: run.fill,
        }
        .store(path)?;

        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .with_context(|| format!("open {} for truncation", path.display()))?;
        file.set_len(total - run.len)
            .with_context(|| format!("truncate {}", path.display()))?;
        file.sync_all()?;

        on_progress(total, total);
        tracing::info!(path = %path.display(), reclaimed = run.len, "trimmed");
        Ok(Outcome::Successful)
    }

    /// Re-extend the file with the recorded fill byte, then drop the
    /// sidecar. Cancellation between chunks leaves a partially restored
    /// file with the sidecar intact, so a later untrim can finish the
    /// job.
    fn untrim_file(
        &self,
        path: &Path,
        cancel: &CancelSignal,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<Outcome> {
        let Some(sidecar) = Sidecar::load(path)? else {
            bail!("{} has no padtrim sidecar; nothing to restore", path.display());
        };
        let current = std::fs::metadata(path)?.len();
        let needed = sidecar.original_len.saturating_sub(current);

        if needed > 0 {
            let mut file = OpenOptions::new()
                .append(true)
                .open(path)
                .with_context(|| format!("open {} for restore", path.display()))?;
            let chunk = vec![sidecar.fill; CHUNK_SIZE as usize];
            let mut written: u64 = 0;
            while written < needed {
                if cancel.is_requested() {
                    file.sync_all()?;
                    return Ok(Outcome::Cancelled);
                }
                let step = (needed - written).min(CHUNK_SIZE);
                file.write_all(&chunk[..step as usize])?;
                written += step;
                on_progress(written, needed);
            }
            file.sync_all()?;
        }

        Sidecar::remove(path)?;
        on_progress(needed, needed);
        tracing::info!(path = %path.display(), restored = needed, "untrimmed");
        Ok(Outcome::Successful)
    }
}

impl ArchiveTrimmer for PaddingTrimmer {
    fn trim(
        &self,
        path: &RecordPath,
        cancel: &CancelSignal,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<Outcome> {
        self.trim_file(path.as_path(), cancel, on_progress)
    }

    fn untrim(
        &self,
        path: &RecordPath,
        cancel: &CancelSignal,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<Outcome> {
        self.untrim_file(path.as_path(), cancel, on_progress)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use padtrim_engine::{ArchiveTrimmer, CancelSignal, Outcome, RecordPath};

    use super::PaddingTrimmer;
    use crate::sidecar::Sidecar;

    fn write_file(dir: &std::path::Path, name: &str, content: &[u8]) -> RecordPath {
        let path = dir.join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(content)
            .unwrap();
        RecordPath::new(path).unwrap()
    }

    fn padded(data: usize, padding: usize, fill: u8) -> Vec<u8> {
        let mut content = vec![7u8; data];
        content.extend(std::iter::repeat(fill).take(padding));
        content
    }

    #[test]
    fn trim_then_untrim_restores_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let original = padded(100, 50_000, 0xFF);
        let path = write_file(dir.path(), "a.img", &original);
        let trimmer = PaddingTrimmer::new();
        let cancel = CancelSignal::new();

        let outcome = trimmer.trim(&path, &cancel, &mut |_, _| {}).unwrap();
        assert_eq!(outcome, Outcome::Successful);
        assert_eq!(std::fs::metadata(path.as_path()).unwrap().len(), 100);
        assert!(Sidecar::load(path.as_path()).unwrap().is_some());

        let outcome = trimmer.untrim(&path, &cancel, &mut |_, _| {}).unwrap();
        assert_eq!(outcome, Outcome::Successful);
        assert_eq!(std::fs::read(path.as_path()).unwrap(), original);
        assert!(Sidecar::load(path.as_path()).unwrap().is_none());
    }

    #[test]
    fn cancelled_trim_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let original = padded(100, 50_000, 0x00);
        let path = write_file(dir.path(), "a.img", &original);
        let cancel = CancelSignal::new();
        cancel.request();

        let outcome = PaddingTrimmer::new()
            .trim(&path, &cancel, &mut |_, _| {})
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(std::fs::read(path.as_path()).unwrap(), original);
        assert!(Sidecar::load(path.as_path()).unwrap().is_none());
    }

    #[test]
    fn trim_without_padding_is_a_successful_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.img", &[7u8; 100]);
        let outcome = PaddingTrimmer::new()
            .trim(&path, &CancelSignal::new(), &mut |_, _| {})
            .unwrap();
        assert_eq!(outcome, Outcome::Successful);
        assert_eq!(std::fs::metadata(path.as_path()).unwrap().len(), 100);
    }

    #[test]
    fn trim_refuses_all_padding_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.img", &[0u8; 8192]);
        let result = PaddingTrimmer::new().trim(&path, &CancelSignal::new(), &mut |_, _| {});
        assert!(result.is_err());
        assert_eq!(std::fs::metadata(path.as_path()).unwrap().len(), 8192);
    }

    #[test]
    fn untrim_without_sidecar_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.img", &[7u8; 100]);
        let result = PaddingTrimmer::new().untrim(&path, &CancelSignal::new(), &mut |_, _| {});
        assert!(result.is_err());
    }

    #[test]
    fn trims_through_a_trait_object() {
        // The engine only ever calls the trimmer via `dyn ArchiveTrimmer`
        // with a borrowing progress closure; exercise that exact shape.
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.img", &padded(100, 50_000, 0x00));
        let trimmer: &dyn ArchiveTrimmer = &PaddingTrimmer::new();

        let mut seen = Vec::new();
        let outcome = trimmer
            .trim(&path, &CancelSignal::new(), &mut |done, total| {
                seen.push((done, total));
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Successful);
        assert!(!seen.is_empty());
        assert_eq!(std::fs::metadata(path.as_path()).unwrap().len(), 100);
    }

    #[test]
    fn trim_reports_terminal_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.img", &padded(100, 200_000, 0x00));
        let mut last = (0, 0);
        PaddingTrimmer::new()
            .trim(&path, &CancelSignal::new(), &mut |done, total| {
                last = (done, total);
            })
            .unwrap();
        assert_eq!(last.0, last.1);
        assert!(last.1 > 0);
    }
}
