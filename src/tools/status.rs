//! Status tool
//!
//! Runtime status of the service plus usage instructions for clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};
use crate::models::{Dish, Product};

/// How to drive the tools, for assistants connecting over MCP
pub const USAGE_INSTRUCTIONS: &str = r#"
# nutricalc Usage

## Products
Products store protein, fat and carbohydrate grams **per 100 g**. Calories are
derived when the product is added (protein x 4 + fat x 9 + carbs x 4) and never
change afterwards; there is no edit. To correct a product, add a new one.

- `add_product` name, protein, fat, carbs
- `list_products` (ordered by name)
- `delete_product` id, confirm=true. Fails while a saved dish uses the product.

## Dishes
A dish is a name plus products by weight in grams. Each product may appear
once. Totals and per-100 g values are computed when the dish is saved.

- `preview_dish` name, ingredients=[{product_id, weight_g}] - totals only
- `create_dish` same arguments - saves dish and ingredients together
- `list_dishes`, `get_dish` id, `list_dish_ingredients` dish_id
- `delete_dish` id, confirm=true

## Calculator
A working set of products and dishes, each at its own weight, with a live
total. Items start at 100 g.

- `calculator_catalog` - everything that can be added
- `calculator_add_product` product_id / `calculator_add_dish` dish_id
- `calculator_update_weight` item_id, weight (text; the leading number is used, so "150g" is 150; no number means 0 g)
- `calculator_remove_item` item_id
- `calculator_clear` confirm=true
- `calculator_view`

Calculator items copy the source values when added. Deleting a product or dish
afterwards does not change items already in the calculator.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    #[serde(flatten)]
    pub build: BuildInfo,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,
    pub product_count: Option<i64>,
    pub dish_count: Option<i64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Collect the current status. Database figures are `None` when the
    /// database cannot be read, so status stays available when storage is not.
    pub fn get_status(&self, db: &Database) -> ServiceStatus {
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let counts = db.with_conn(|conn| {
            Ok((
                migrations::get_schema_version(conn)?,
                Product::count(conn)?,
                Dish::count(conn)?,
            ))
        });
        let (schema_version, product_count, dish_count) = match counts {
            Ok((version, products, dishes)) => (Some(version), Some(products), Some(dishes)),
            Err(e) => {
                tracing::warn!(error = %e, "status could not read database");
                (None, None, None)
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            product_count,
            dish_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
