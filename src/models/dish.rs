//! Dish model
//!
//! A named composition of products. Totals and per-100 g values are computed
//! once when the dish is saved and stored alongside it.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::Totals;
use super::Nutrition;

/// A dish with frozen nutrition totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub total_weight_g: f64,
    pub total: Nutrition,
    pub per_100: Nutrition,
    pub created_at: String,
}

impl Dish {
    /// Create a Dish from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            total_weight_g: row.get("total_weight")?,
            total: Nutrition {
                calories: row.get("total_calories")?,
                protein: row.get("total_protein")?,
                fat: row.get("total_fat")?,
                carbs: row.get("total_carbs")?,
            },
            per_100: Nutrition {
                calories: row.get("calories_per_100")?,
                protein: row.get("protein_per_100")?,
                fat: row.get("fat_per_100")?,
                carbs: row.get("carbs_per_100")?,
            },
            created_at: row.get("created_at")?,
        })
    }

    /// Insert the dish row. Ingredient rows are written separately by the
    /// caller, in the same transaction.
    pub fn create(conn: &Connection, name: &str, totals: &Totals) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO dishes (
                name, total_weight,
                total_calories, total_protein, total_fat, total_carbs,
                calories_per_100, protein_per_100, fat_per_100, carbs_per_100
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                name,
                totals.total_weight_g,
                totals.total.calories,
                totals.total.protein,
                totals.total.fat,
                totals.total.carbs,
                totals.per_100.calories,
                totals.per_100.protein,
                totals.per_100.fat,
                totals.per_100.carbs,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a dish by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM dishes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(dish) => Ok(Some(dish)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all dishes ordered by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM dishes ORDER BY name ASC, id ASC")?;

        let dishes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(dishes)
    }

    /// Count dishes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM dishes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a dish; its ingredient rows cascade.
    /// Returns Ok(false) if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM dishes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
