use std::path::PathBuf;

/// Errors reported by block-store implementations.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Snapshot file not readable: {0}")]
    SnapshotRead(PathBuf),

    #[error("Snapshot parse error: {0}")]
    SnapshotParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}
