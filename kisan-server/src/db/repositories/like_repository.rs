use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::db::{columns, is_unique_violation, DbPool};

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a like. Returns false when the user already liked the post.
    pub fn add_like(&self, post_id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = conn
            .execute(
                "INSERT INTO likes (post_id, user_id, created_at) VALUES (?, ?, ?)",
                (
                    post_id.to_string(),
                    user_id.to_string(),
                    columns::format_timestamp(&Utc::now()),
                ),
            )
            .context("Failed to record like");

        match inserted {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Posts the user has liked, for highlighting the like button
    pub fn liked_post_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT post_id FROM likes WHERE user_id = ?")?;
        let ids = stmt
            .query_map([user_id.to_string()], |row| columns::uuid(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
