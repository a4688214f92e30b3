//! Product model
//!
//! A food with macronutrients per 100 g. Products are immutable once created.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::Nutrition;

/// A product with nutrition per 100 g
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub nutrition: Nutrition,
    pub created_at: String,
}

/// Data for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl Product {
    /// Create a Product from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            nutrition: Nutrition {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                fat: row.get("fat")?,
                carbs: row.get("carbs")?,
            },
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new product; calories are derived from the macros here and
    /// never recomputed
    pub fn create(conn: &Connection, data: &ProductCreate) -> DbResult<Self> {
        let nutrition = Nutrition::from_macros(data.protein, data.fat, data.carbs);

        conn.execute(
            r#"
            INSERT INTO products (name, protein, fat, carbs, calories)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.name,
                nutrition.protein,
                nutrition.fat,
                nutrition.carbs,
                nutrition.calories,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a product by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM products WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all products ordered by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM products ORDER BY name ASC, id ASC")?;

        let products = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Count products
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a product.
    ///
    /// Returns Ok(false) if not found. A product still referenced by a dish
    /// ingredient is refused by the foreign key and surfaces as an error.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    fn create(conn: &Connection, name: &str, protein: f64, fat: f64, carbs: f64) -> Product {
        Product::create(
            conn,
            &ProductCreate { name: name.to_string(), protein, fat, carbs },
        )
        .unwrap()
    }

    #[test]
    fn test_create_derives_calories() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        let product = create(&conn, "Oats", 10.0, 5.0, 20.0);
        assert_eq!(product.name, "Oats");
        assert_eq!(product.nutrition.calories, 165.0);

        let loaded = Product::get_by_id(&conn, product.id).unwrap().unwrap();
        assert_eq!(loaded.nutrition, product.nutrition);
    }

    #[test]
    fn test_list_is_ordered_by_name() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        create(&conn, "Rice", 7.0, 1.0, 78.0);
        create(&conn, "Apple", 0.3, 0.2, 14.0);
        create(&conn, "Milk", 3.2, 3.6, 4.8);

        let names: Vec<String> = Product::list(&conn).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Apple", "Milk", "Rice"]);
        assert_eq!(Product::count(&conn).unwrap(), 3);
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        let a = create(&conn, "Egg", 13.0, 11.0, 1.0);
        let b = create(&conn, "Egg", 13.0, 11.0, 1.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_delete() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        let product = create(&conn, "Butter", 0.5, 82.0, 0.8);
        assert!(Product::delete(&conn, product.id).unwrap());
        assert!(Product::get_by_id(&conn, product.id).unwrap().is_none());
        assert!(!Product::delete(&conn, product.id).unwrap());
    }
}
