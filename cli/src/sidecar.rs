//! Sidecar files marking a trimmed archive.
//!
//! Trimming is only reversible if we remember what was removed. A small
//! JSON file next to the archive records the original length and the
//! fill byte; its presence is what makes a file untrimmable-back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const SIDECAR_EXTENSION: &str = "padtrim";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sidecar {
    /// File length before trimming, in bytes.
    pub original_len: u64,
    /// The padding byte that was removed.
    pub fill: u8,
}

impl Sidecar {
    /// `<file>.padtrim` next to the archive.
    #[must_use]
    pub fn path_for(archive: &Path) -> PathBuf {
        let mut name = archive.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(SIDECAR_EXTENSION);
        archive.with_file_name(name)
    }

    pub fn load(archive: &Path) -> Result<Option<Self>> {
        let path = Self::path_for(archive);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read sidecar {}", path.display()))?;
        let sidecar = serde_json::from_str(&raw)
            .with_context(|| format!("parse sidecar {}", path.display()))?;
        Ok(Some(sidecar))
    }

    pub fn store(&self, archive: &Path) -> Result<()> {
        let path = Self::path_for(archive);
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(&path, raw).with_context(|| format!("write sidecar {}", path.display()))
    }

    pub fn remove(archive: &Path) -> Result<()> {
        let path = Self::path_for(archive);
        fs::remove_file(&path).with_context(|| format!("remove sidecar {}", path.display()))
    }
}
