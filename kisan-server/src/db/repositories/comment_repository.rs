use anyhow::{Context, Result};
use rusqlite::Row;
use uuid::Uuid;

use kisan_types::Comment;

use crate::db::columns;
use crate::db::DbPool;

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: columns::uuid(row, 0)?,
        post_id: columns::uuid(row, 1)?,
        author_name: row.get(2)?,
        content: row.get(3)?,
        created_at: columns::timestamp(row, 4)?,
    })
}

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, comment: &Comment, author_id: &Uuid) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO comments (id, post_id, author_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                comment.id.to_string(),
                comment.post_id.to_string(),
                author_id.to_string(),
                &comment.content,
                columns::format_timestamp(&comment.created_at),
            ),
        )
        .context("Failed to create comment")?;
        Ok(())
    }

    /// Comments on a post, oldest first
    pub fn list_for_post(&self, post_id: &Uuid) -> Result<Vec<Comment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.post_id, u.name, c.content, c.created_at
             FROM comments c
             JOIN users u ON c.author_id = u.id
             WHERE c.post_id = ?
             ORDER BY c.created_at ASC, c.rowid ASC",
        )?;

        let comments = stmt
            .query_map([post_id.to_string()], map_comment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, UserRepository};
    use crate::db::Database;
    use chrono::Utc;
    use kisan_types::CommunityPost;

    #[test]
    fn test_comments_are_chronological() {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let (user, _) = UserRepository::new(db.pool.clone())
            .find_or_create_by_phone("9811122233")
            .unwrap();

        let post = CommunityPost {
            id: Uuid::new_v4(),
            author_id: user.id,
            author_name: user.name.clone(),
            content: "Yellow leaves on paddy".to_string(),
            tag: "Rice".to_string(),
            created_at: Utc::now(),
            has_image: false,
            like_count: 0,
            comment_count: 0,
            comments: Vec::new(),
        };
        PostRepository::new(db.pool.clone()).create(&post, None).unwrap();

        let repo = CommentRepository::new(db.pool.clone());
        for content in ["Check nitrogen", "Try urea top dressing"] {
            let comment = Comment {
                id: Uuid::new_v4(),
                post_id: post.id,
                author_name: user.name.clone(),
                content: content.to_string(),
                created_at: Utc::now(),
            };
            repo.create(&comment, &user.id).unwrap();
        }

        let comments = repo.list_for_post(&post.id).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "Check nitrogen");
        assert_eq!(comments[1].author_name, "Farmer 2233");

        let reloaded = PostRepository::new(db.pool).get_by_id(&post.id).unwrap().unwrap();
        assert_eq!(reloaded.comment_count, 2);
    }
}
