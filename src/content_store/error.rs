use thiserror::Error;
use uuid::Uuid;

/// Raised by the mapper when a creation payload is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("Field '{field}' is required to create content")]
    MissingField { field: &'static str },
}

/// Errors surfaced by a `ContentStore`.
///
/// A missing record is not an error: lookups return `None` and deletes
/// return the nil id.
#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error(transparent)]
    Validation(#[from] MappingError),

    #[error("Content with id '{0}' already exists")]
    DuplicateId(Uuid),

    #[error("Update of content '{id}' kept losing to concurrent writers after {attempts} attempts")]
    Conflict { id: Uuid, attempts: usize },

    #[error("Backing store unavailable: {0:#}")]
    Unavailable(#[from] anyhow::Error),
}

pub type ContentStoreResult<T> = Result<T, ContentStoreError>;
