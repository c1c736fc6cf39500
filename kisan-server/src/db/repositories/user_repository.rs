use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use kisan_types::User;

use crate::db::columns;
use crate::db::DbPool;

const USER_COLUMNS: &str = "id, phone, name, password_hash, join_date";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: columns::uuid(row, 0)?,
        phone: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        join_date: columns::timestamp(row, 4)?,
    })
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [user_id.to_string()],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by phone number
    pub fn get_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE phone = ?"),
                [phone],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a new user row. Fails on a duplicate phone number.
    pub fn create(&self, user: &User) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, phone, name, password_hash, join_date) VALUES (?, ?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.phone,
                &user.name,
                &user.password_hash,
                columns::format_timestamp(&user.join_date),
            ),
        )
        .context("Failed to create user")?;
        Ok(())
    }

    /// Look up a user by phone, creating a phone-only account when absent.
    ///
    /// Returns the user and whether it was created by this call.
    pub fn find_or_create_by_phone(&self, phone: &str) -> Result<(User, bool)> {
        if let Some(existing) = self.get_by_phone(phone)? {
            return Ok((existing, false));
        }

        let user = User {
            id: Uuid::new_v4(),
            phone: phone.to_string(),
            name: User::default_name_for_phone(phone),
            password_hash: None,
            join_date: Utc::now(),
        };

        match self.create(&user) {
            Ok(()) => {
                tracing::info!("Created user {} for phone login", user.id);
                Ok((user, true))
            }
            // Lost a race with a concurrent login for the same phone
            Err(e) if crate::db::is_unique_violation(&e) => {
                let existing = self
                    .get_by_phone(phone)?
                    .context("User vanished after unique violation")?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }
}
