//! Trailing-padding probe shared by discovery and the trimmer.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result};

use padtrim_engine::CancelSignal;

/// Chunk size for backward scanning and for padding writes.
pub const CHUNK_SIZE: u64 = 64 * 1024;

/// Fill bytes recognised as padding.
const FILL_BYTES: [u8; 2] = [0x00, 0xFF];

/// Result of probing a file's tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingRun {
    /// The padding byte value, when a run exists.
    pub fill: u8,
    /// Length of the trailing run, in bytes.
    pub len: u64,
}

/// Outcome of a cancellable tail scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    Complete(Option<PaddingRun>),
    Cancelled,
}

/// Measure the run of identical fill bytes (0x00 or 0xFF) at the end of
/// `path`, reading backwards in chunks. `on_progress` receives
/// `(bytes examined, file length)`; `cancel` is polled between chunks.
/// A file that is empty or whose last byte is not a recognised fill
/// byte has no run.
pub fn scan_trailing_padding(
    path: &Path,
    cancel: &CancelSignal,
    on_progress: &mut dyn FnMut(u64, u64),
) -> Result<Scan> {
    let mut file =
        File::open(path).with_context(|| format!("open {} for probing", path.display()))?;
    let total = file.metadata()?.len();
    if total == 0 {
        return Ok(Scan::Complete(None));
    }

    // Peek the last byte to pick the fill value.
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if !FILL_BYTES.contains(&last[0]) {
        return Ok(Scan::Complete(None));
    }
    let fill = last[0];

    let mut run: u64 = 0;
    let mut remaining = total;
    let mut buffer = vec![0u8; CHUNK_SIZE as usize];
    'scan: while remaining > 0 {
        if cancel.is_requested() {
            return Ok(Scan::Cancelled);
        }
        let chunk = remaining.min(CHUNK_SIZE);
        file.seek(SeekFrom::Start(remaining - chunk))?;
        let buf = &mut buffer[..chunk as usize];
        file.read_exact(buf)?;
        for byte in buf.iter().rev() {
            if *byte == fill {
                run += 1;
            } else {
                break 'scan;
            }
        }
        remaining -= chunk;
        on_progress(total - remaining, total);
    }

    Ok(Scan::Complete(Some(PaddingRun { fill, len: run })))
}

/// Non-cancellable probe used by discovery. Runs the scan with a fresh
/// signal that is never requested, so `Cancelled` cannot occur; it maps
/// to "no run" rather than a panic all the same.
pub fn trailing_padding_run(path: &Path) -> Result<Option<PaddingRun>> {
    match scan_trailing_padding(path, &CancelSignal::new(), &mut |_, _| {})? {
        Scan::Complete(run) => Ok(run),
        Scan::Cancelled => Ok(None),
    }
}
