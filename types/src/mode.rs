use std::fmt;

/// Direction of a batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BatchMode {
    /// Reclaim disk space by removing padding.
    Trim,
    /// Restore previously removed padding.
    Untrim,
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trim => write!(f, "trim"),
            Self::Untrim => write!(f, "untrim"),
        }
    }
}
