use thiserror::Error;

/// Errors returned by engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The requested entity does not exist (or belongs to another user).
    #[error("key not found: `{0}`")]
    KeyNotFound(String),
    /// An entity with the same unique key already exists.
    #[error("key already exists: `{0}`")]
    ExistingKey(String),
    /// Credentials were rejected or the account is inactive.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// A monetary amount failed validation.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// A name or free-text field failed validation.
    #[error("invalid name: {0}")]
    InvalidName(String),
    /// An unsupported or inconsistent currency was supplied.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::UnknownCurrency(a), Self::UnknownCurrency(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
