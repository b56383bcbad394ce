use thiserror::Error;

/// Errors raised by the schema store and the SQL generator.
#[derive(Debug, Error)]
pub enum Error {
    /// The identifier did not resolve to a stored entity.
    ///
    /// Carries the entity kind, e.g. `"Project"`.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request was well-formed but cannot be applied, e.g. an empty patch.
    #[error("{0}")]
    InvalidRequest(String),

    /// Any failure reported by the underlying store.
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl Error {
    pub(crate) fn empty_patch() -> Self {
        Error::InvalidRequest("No valid fields to update".to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
