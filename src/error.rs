use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found")]
    NotFound,

    #[error("authentication required")]
    Unauthenticated,

    #[error("not a member of this group")]
    NotAMember,

    #[error("not authorized")]
    NotAuthorized,

    #[error("{0}")]
    Validation(String),

    #[error("cannot remove the last admin: add another admin first")]
    LastAdminGuard,

    #[error("storage is not configured")]
    StorageUnconfigured,

    #[error("storage key does not belong to the current user")]
    KeyMismatch,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("identity provider error: {0}")]
    Identity(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
