use thiserror::Error;

/// Ways a location fetch can fail. The tracker treats all of them the same,
/// the split only matters for diagnostics.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    #[error("location source unreachable: {0}")]
    Unreachable(String),
    #[error("location source rejected request with status {0}")]
    Rejected(u16),
    #[error("malformed location payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("tracker already running")]
    AlreadyRunning,
    #[error("tracker has been stopped")]
    Stopped,
}
