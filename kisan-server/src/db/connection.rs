use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::{SCHEMA, SEED_DATA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// Every `:memory:` connection is its own database, so the in-memory
    /// variant is capped at a single pooled connection.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let is_memory = Self::is_memory_path(path.as_ref());
        let manager = Self::create_connection_manager(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        let mut builder = Pool::builder();
        if is_memory {
            builder = builder.max_size(1);
        }
        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    fn is_memory_path(path: &Path) -> bool {
        path.to_string_lossy()
            .trim()
            .eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create appropriate connection manager based on path
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> SqliteConnectionManager {
        if Self::is_memory_path(path.as_ref()) {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path)
        }
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Create all tables. Safe to run on every startup.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Insert the schemes and market price reference rows
    pub fn seed_reference_data(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SEED_DATA)
            .context("Failed to seed reference data")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
