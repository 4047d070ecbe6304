//! The module contains the errors the engine can throw.
//!
//! The settlement errors are:
//!
//! - [`Validation`] thrown when contract data is malformed (negative price,
//!   total mismatch, unknown participant).
//! - [`AlreadySubmitted`] thrown when a contract was already consumed by a
//!   settlement.
//! - [`InvalidContractSet`] thrown when a requested contract does not exist
//!   in the hangout, or the set itself is malformed.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`AlreadySubmitted`]: EngineError::AlreadySubmitted
//!  [`InvalidContractSet`]: EngineError::InvalidContractSet
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Already submitted: {0}")]
    AlreadySubmitted(String),
    #[error("Invalid contract set: {0}")]
    InvalidContractSet(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::AlreadySubmitted(a), Self::AlreadySubmitted(b)) => a == b,
            (Self::InvalidContractSet(a), Self::InvalidContractSet(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
