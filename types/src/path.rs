use std::fmt;
use std::path::{Path, PathBuf};

/// Error returned when constructing a [`RecordPath`] from an empty path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("record path must not be empty")]
pub struct EmptyPathError;

/// The identity key of a catalog entry.
///
/// Two records are the same entity iff their paths are equal; every
/// identity-keyed container in the workspace keys on this type. The
/// constructor rejects empty paths so a key always names a real file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RecordPath(PathBuf);

impl RecordPath {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, EmptyPathError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(EmptyPathError);
        }
        Ok(Self(path))
    }

    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Lossy string form, used for substring search and display.
    #[must_use]
    pub fn display_string(&self) -> String {
        self.0.display().to_string()
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for RecordPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
