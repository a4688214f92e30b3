//! Dish Ingredient model
//!
//! Links a product and its weight to the dish that owns it.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::Nutrition;

/// A product used in a dish, by weight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishIngredient {
    pub id: i64,
    pub dish_id: i64,
    pub product_id: i64,
    pub weight_g: f64,
}

/// Dish ingredient joined with the product it refers to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishIngredientDetail {
    pub id: i64,
    pub dish_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub weight_g: f64,
    /// Product nutrition per 100 g
    pub per_100: Nutrition,
}

impl DishIngredient {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            dish_id: row.get("dish_id")?,
            product_id: row.get("product_id")?,
            weight_g: row.get("weight")?,
        })
    }

    /// Add an ingredient row to a dish
    pub fn create(conn: &Connection, dish_id: i64, product_id: i64, weight_g: f64) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO dish_ingredients (dish_id, product_id, weight) VALUES (?1, ?2, ?3)",
            params![dish_id, product_id, weight_g],
        )?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            dish_id,
            product_id,
            weight_g,
        })
    }

    /// Get all ingredient rows for a dish, in insertion order
    pub fn get_for_dish(conn: &Connection, dish_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM dish_ingredients WHERE dish_id = ?1 ORDER BY id"
        )?;

        let ingredients = stmt
            .query_map([dish_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Get ingredients joined with product fields for a dish
    pub fn get_details_for_dish(conn: &Connection, dish_id: i64) -> DbResult<Vec<DishIngredientDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT di.id, di.dish_id, di.product_id, di.weight,
                   p.name AS product_name, p.calories, p.protein, p.fat, p.carbs
            FROM dish_ingredients di
            INNER JOIN products p ON di.product_id = p.id
            WHERE di.dish_id = ?1
            ORDER BY di.id
            "#
        )?;

        let details = stmt
            .query_map([dish_id], |row| {
                Ok(DishIngredientDetail {
                    id: row.get("id")?,
                    dish_id: row.get("dish_id")?,
                    product_id: row.get("product_id")?,
                    product_name: row.get("product_name")?,
                    weight_g: row.get("weight")?,
                    per_100: Nutrition {
                        calories: row.get("calories")?,
                        protein: row.get("protein")?,
                        fat: row.get("fat")?,
                        carbs: row.get("carbs")?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(details)
    }

    /// Count ingredient rows for a dish
    pub fn count_for_dish(conn: &Connection, dish_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM dish_ingredients WHERE dish_id = ?1",
            [dish_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
