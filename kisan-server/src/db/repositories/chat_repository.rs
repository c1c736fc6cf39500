use anyhow::{anyhow, Context, Result};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use kisan_types::{ChatMessage, ChatRole};

use crate::db::columns;
use crate::db::DbPool;

fn map_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let role_str: String = row.get(2)?;
    let role = ChatRole::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            anyhow!("unknown chat role '{role_str}'").into(),
        )
    })?;
    Ok(ChatMessage {
        id: columns::uuid(row, 0)?,
        user_id: columns::uuid(row, 1)?,
        role,
        content: row.get(3)?,
        created_at: columns::timestamp(row, 4)?,
    })
}

pub struct ChatRepository {
    pool: DbPool,
}

impl ChatRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn append(&self, message: &ChatMessage) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO chat_messages (id, user_id, role, content, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                message.id.to_string(),
                message.user_id.to_string(),
                message.role.as_str(),
                &message.content,
                columns::format_timestamp(&message.created_at),
            ),
        )
        .context("Failed to store chat message")?;
        Ok(())
    }

    /// Conversation history for a user, oldest first
    pub fn history(&self, user_id: &Uuid) -> Result<Vec<ChatMessage>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, role, content, created_at
             FROM chat_messages
             WHERE user_id = ?
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let messages = stmt
            .query_map([user_id.to_string()], map_message)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}
