use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use kisan_types::{CommunityPost, StoredImage};

use crate::db::columns;
use crate::db::DbPool;

const POST_SELECT: &str = "SELECT p.id, p.author_id, u.name, p.content, p.tag, p.created_at,
        p.image IS NOT NULL AS has_image, p.like_count,
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
     FROM community_posts p
     JOIN users u ON p.author_id = u.id";

fn map_post(row: &Row<'_>) -> rusqlite::Result<CommunityPost> {
    Ok(CommunityPost {
        id: columns::uuid(row, 0)?,
        author_id: columns::uuid(row, 1)?,
        author_name: row.get(2)?,
        content: row.get(3)?,
        tag: row.get(4)?,
        created_at: columns::timestamp(row, 5)?,
        has_image: row.get(6)?,
        like_count: row.get(7)?,
        comment_count: row.get(8)?,
        comments: Vec::new(), // Populated by the handler
    })
}

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append a new post, optionally with an attached photo
    pub fn create(&self, post: &CommunityPost, image: Option<&StoredImage>) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO community_posts (id, author_id, content, tag, created_at, image, image_content_type, like_count)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
            (
                post.id.to_string(),
                post.author_id.to_string(),
                &post.content,
                &post.tag,
                columns::format_timestamp(&post.created_at),
                image.map(|img| img.bytes.as_slice()),
                image.map(|img| img.content_type.as_str()),
            ),
        )
        .context("Failed to create post")?;
        Ok(())
    }

    /// All posts, newest first, optionally restricted to one tag
    pub fn list(&self, tag: Option<&str>) -> Result<Vec<CommunityPost>> {
        let conn = self.pool.get()?;
        let order = "ORDER BY p.created_at DESC, p.rowid DESC";

        let posts = match tag {
            Some(tag) => {
                let mut stmt = conn.prepare(&format!("{POST_SELECT} WHERE p.tag = ? {order}"))?;
                let rows = stmt.query_map([tag], map_post)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!("{POST_SELECT} {order}"))?;
                let rows = stmt.query_map([], map_post)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(posts)
    }

    /// Get a single post by ID
    pub fn get_by_id(&self, post_id: &Uuid) -> Result<Option<CommunityPost>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                &format!("{POST_SELECT} WHERE p.id = ?"),
                [post_id.to_string()],
                map_post,
            )
            .optional()?;
        Ok(post)
    }

    /// Fetch the photo attached to a post, if any
    pub fn get_image(&self, post_id: &Uuid) -> Result<Option<StoredImage>> {
        let conn = self.pool.get()?;
        let image = conn
            .query_row(
                "SELECT image_content_type, image FROM community_posts
                 WHERE id = ? AND image IS NOT NULL",
                [post_id.to_string()],
                |row| {
                    Ok(StoredImage {
                        content_type: row
                            .get::<_, Option<String>>(0)?
                            .unwrap_or_else(|| "application/octet-stream".to_string()),
                        bytes: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(image)
    }

    /// Recompute the like counter from the likes table
    pub fn update_like_count(&self, post_id: &Uuid) -> Result<i32> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE community_posts
             SET like_count = (SELECT COUNT(*) FROM likes WHERE post_id = ?1)
             WHERE id = ?1",
            [post_id.to_string()],
        )
        .context("Failed to update like count")?;

        let count = conn.query_row(
            "SELECT like_count FROM community_posts WHERE id = ?",
            [post_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
