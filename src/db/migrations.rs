//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: products, dishes, dish ingredients
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PRODUCTS
        -- Macros per 100 g; calories derived at insert
        -- ============================================
        CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            protein REAL NOT NULL DEFAULT 0,
            fat REAL NOT NULL DEFAULT 0,
            carbs REAL NOT NULL DEFAULT 0,
            calories REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_products_name ON products(name);

        -- ============================================
        -- DISHES
        -- Totals and per-100 g values frozen at creation
        -- ============================================
        CREATE TABLE dishes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            total_weight REAL NOT NULL DEFAULT 0,
            total_calories REAL NOT NULL DEFAULT 0,
            total_protein REAL NOT NULL DEFAULT 0,
            total_fat REAL NOT NULL DEFAULT 0,
            total_carbs REAL NOT NULL DEFAULT 0,
            calories_per_100 REAL NOT NULL DEFAULT 0,
            protein_per_100 REAL NOT NULL DEFAULT 0,
            fat_per_100 REAL NOT NULL DEFAULT 0,
            carbs_per_100 REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_dishes_name ON dishes(name);

        -- ============================================
        -- DISH INGREDIENTS
        -- Owned by a dish; a referenced product cannot be deleted
        -- ============================================
        CREATE TABLE dish_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dish_id INTEGER NOT NULL REFERENCES dishes(id) ON DELETE CASCADE,
            product_id INTEGER NOT NULL REFERENCES products(id),
            weight REAL NOT NULL DEFAULT 0,

            UNIQUE(dish_id, product_id)
        );

        CREATE INDEX idx_dish_ingredients_dish ON dish_ingredients(dish_id);
        CREATE INDEX idx_dish_ingredients_product ON dish_ingredients(product_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version; 0 before any migration has run
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let tracked: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations')",
        [],
        |row| row.get(0),
    )?;
    if !tracked {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_needs_migration() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);
        assert!(needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('products', 'dishes', 'dish_ingredients')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_schema_version_surfaces_sqlite_errors() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE schema_migrations (applied_at TEXT)", [])
            .unwrap();
        assert!(get_schema_version(&conn).is_err());
    }
}
