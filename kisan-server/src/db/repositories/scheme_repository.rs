use anyhow::{anyhow, Result};
use rusqlite::types::Type;
use rusqlite::Row;

use kisan_types::{Scheme, SchemeKind};

use crate::db::DbPool;

fn map_scheme(row: &Row<'_>) -> rusqlite::Result<Scheme> {
    let kind_str: String = row.get(4)?;
    let kind = SchemeKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            anyhow!("unknown scheme kind '{kind_str}'").into(),
        )
    })?;
    Ok(Scheme {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        eligibility: row.get(3)?,
        kind,
        link: row.get(5)?,
    })
}

pub struct SchemeRepository {
    pool: DbPool,
}

impl SchemeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Schemes ordered by name, optionally restricted to one kind
    pub fn list(&self, kind: Option<SchemeKind>) -> Result<Vec<Scheme>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, eligibility, kind, link
             FROM schemes
             WHERE ?1 IS NULL OR kind = ?1
             ORDER BY name",
        )?;

        let schemes = stmt
            .query_map([kind.map(|k| k.as_str())], map_scheme)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(schemes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn seeded() -> SchemeRepository {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        db.seed_reference_data().unwrap();
        SchemeRepository::new(db.pool)
    }

    #[test]
    fn test_list_all_sorted_by_name() {
        let schemes = seeded().list(None).unwrap();
        assert_eq!(schemes.len(), 7);
        let names: Vec<&str> = schemes.iter().map(|s| s.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_list_by_kind() {
        let repo = seeded();
        let private = repo.list(Some(SchemeKind::Private)).unwrap();
        assert_eq!(private.len(), 2);
        assert!(private.iter().all(|s| s.kind == SchemeKind::Private));

        let government = repo.list(Some(SchemeKind::Government)).unwrap();
        assert_eq!(government.len(), 5);
    }
}
