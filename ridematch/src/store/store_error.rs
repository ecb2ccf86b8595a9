#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: &'static str, id: String },
    #[error("listing store lock was poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("failed to read listing snapshot {path}: {message}")]
    SnapshotRead { path: String, message: String },
    #[error("failed to write listing snapshot {path}: {message}")]
    SnapshotWrite { path: String, message: String },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: &str) -> StoreError {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
