use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use kisan_types::{Product, StoredImage};

use crate::db::columns;
use crate::db::DbPool;

fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: columns::uuid(row, 0)?,
        seller_id: columns::uuid(row, 1)?,
        seller_name: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        price: row.get(5)?,
        location: row.get(6)?,
        contact: row.get(7)?,
        has_image: row.get(8)?,
        created_at: columns::timestamp(row, 9)?,
    })
}

pub struct ProductRepository {
    pool: DbPool,
}

impl ProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, product: &Product, image: Option<&StoredImage>) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO products (id, seller_id, name, description, price, location, contact, image, image_content_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                product.id.to_string(),
                product.seller_id.to_string(),
                &product.name,
                &product.description,
                &product.price,
                &product.location,
                &product.contact,
                image.map(|img| img.bytes.as_slice()),
                image.map(|img| img.content_type.as_str()),
                columns::format_timestamp(&product.created_at),
            ),
        )
        .context("Failed to create product")?;
        Ok(())
    }

    /// All listings, newest first
    pub fn list(&self) -> Result<Vec<Product>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.seller_id, u.name, p.name, p.description, p.price, p.location, p.contact,
                    p.image IS NOT NULL, p.created_at
             FROM products p
             JOIN users u ON p.seller_id = u.id
             ORDER BY p.created_at DESC, p.rowid DESC",
        )?;

        let products = stmt
            .query_map([], map_product)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    pub fn get_image(&self, product_id: &Uuid) -> Result<Option<StoredImage>> {
        let conn = self.pool.get()?;
        let image = conn
            .query_row(
                "SELECT image_content_type, image FROM products WHERE id = ? AND image IS NOT NULL",
                [product_id.to_string()],
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
}
