//! Shared data types.

use std::fmt;
use std::path::{Path, PathBuf};

/// One unit of work: the file a notification was about.
///
/// Items move by value from the dispatcher into the queue and from the queue
/// into exactly one worker, which drops it after its task returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    path: PathBuf,
}

impl WorkItem {
    /// Create a work item for the given file identifier.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File identifier carried by this item.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
