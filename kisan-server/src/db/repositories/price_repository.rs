use anyhow::Result;
use rusqlite::Row;

use kisan_types::PriceQuote;

use crate::db::DbPool;

fn map_quote(row: &Row<'_>) -> rusqlite::Result<PriceQuote> {
    Ok(PriceQuote {
        id: row.get(0)?,
        market: row.get(1)?,
        crop: row.get(2)?,
        variety: row.get(3)?,
        min_price: row.get(4)?,
        max_price: row.get(5)?,
        modal_price: row.get(6)?,
        date: row.get(7)?,
    })
}

pub struct PriceRepository {
    pool: DbPool,
}

impl PriceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Distinct market names, alphabetical
    pub fn markets(&self) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT DISTINCT market FROM market_prices ORDER BY market")?;
        let markets = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(markets)
    }

    /// Quotes for one market. An unknown market yields an empty list.
    pub fn list_for_market(&self, market: &str) -> Result<Vec<PriceQuote>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, market, crop, variety, min_price, max_price, modal_price, price_date
             FROM market_prices
             WHERE market = ?
             ORDER BY crop, variety",
        )?;
        let quotes = stmt
            .query_map([market], map_quote)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quotes)
    }
}
