use crate::access::{ModeratedResource, ResourceId};

/// Storage abstraction so the service can be exercised in isolation.
///
/// Implementations serialise writers per resource. `update` must reject a
/// record whose `version` no longer matches the stored copy and return the
/// stored copy with its version bumped on success.
pub trait ResourceRepository: Send + Sync {
    fn insert(&self, resource: ModeratedResource) -> Result<ModeratedResource, RepositoryError>;
    fn update(&self, resource: ModeratedResource) -> Result<ModeratedResource, RepositoryError>;
    fn fetch(&self, id: &ResourceId) -> Result<Option<ModeratedResource>, RepositoryError>;
    fn remove(&self, id: &ResourceId) -> Result<(), RepositoryError>;
    /// Live resources awaiting review, oldest first.
    fn pending(&self, limit: usize) -> Result<Vec<ModeratedResource>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record changed concurrently (expected version {expected}, found {found})")]
    StaleVersion { expected: u64, found: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
