//! Repository implementations for database access

pub mod messages;

pub use messages::{Message, MessageRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
