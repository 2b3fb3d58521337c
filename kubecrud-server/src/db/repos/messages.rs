//! Message repository
//!
//! One statement per operation; every statement auto-commits.

use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::MessageContent;

/// Message record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Message {
    pub id: i32,
    pub content: String,
    pub timestamp: NaiveDateTime,
}

/// Message repository
pub struct MessageRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All messages, newest first.
    pub async fn list(&self) -> Result<Vec<Message>, DbError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, content, timestamp
            FROM messages
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Message>, DbError> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, content, timestamp FROM messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(message)
    }

    pub async fn create(&self, content: &MessageContent) -> Result<Message, DbError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (content)
            VALUES ($1)
            RETURNING id, content, timestamp
            "#,
        )
        .bind(content.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(message)
    }

    /// Overwrite content of an existing message.
    ///
    /// Returns `false` when no row has that id; nothing is created.
    pub async fn update(&self, id: i32, content: &MessageContent) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE messages SET content = $1 WHERE id = $2")
            .bind(content.as_str())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete by id. Deleting a missing id is not an error.
    pub async fn delete(&self, id: i32) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
