//! Calculator tools
//!
//! Load products and dishes into the selection ledger and report its totals.
//! The ledger itself is owned by the caller. Loading touches storage and
//! never the ledger, so callers can load before locking.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Dish, Nutrition, Product};
use crate::nutrition::{ClearConfirmation, SelectionItem, SelectionLedger};
use super::dishes::DishSummary;
use super::error::{storage, ToolError, ToolResult};
use super::products::ProductSummary;

/// Everything that can be added to the calculator
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub products: Vec<ProductSummary>,
    pub dishes: Vec<DishSummary>,
}

/// Current ledger contents and totals
#[derive(Debug, Serialize)]
pub struct CalculatorView {
    pub items: Vec<SelectionItem>,
    pub item_count: usize,
    pub total_weight_g: f64,
    pub totals: Nutrition,
}

impl From<&SelectionLedger> for CalculatorView {
    fn from(ledger: &SelectionLedger) -> Self {
        Self {
            items: ledger.items().to_vec(),
            item_count: ledger.len(),
            total_weight_g: ledger.total_weight(),
            totals: *ledger.totals(),
        }
    }
}

/// Response for a single-item change
#[derive(Debug, Serialize)]
pub struct ItemChangeResponse {
    pub item: SelectionItem,
    pub totals: Nutrition,
}

/// Response for calculator_clear
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
    pub removed_items: usize,
    pub totals: Nutrition,
}

/// Products and dishes available to the calculator, each ordered by name
pub fn catalog(db: &Database) -> ToolResult<CatalogResponse> {
    let conn = db.get_conn().map_err(storage("open database"))?;
    let products = Product::list(&conn).map_err(storage("list products"))?;
    let dishes = Dish::list(&conn).map_err(storage("list dishes"))?;

    Ok(CatalogResponse {
        products: products.iter().map(ProductSummary::from).collect(),
        dishes: dishes.iter().map(DishSummary::from).collect(),
    })
}

/// Load a product for the calculator
pub fn load_product(db: &Database, product_id: i64) -> ToolResult<Product> {
    let conn = db.get_conn().map_err(storage("open database"))?;
    Product::get_by_id(&conn, product_id)
        .map_err(storage("load product"))?
        .ok_or(ToolError::NotFound { kind: "Product", id: product_id })
}

/// Load a dish for the calculator
pub fn load_dish(db: &Database, dish_id: i64) -> ToolResult<Dish> {
    let conn = db.get_conn().map_err(storage("open database"))?;
    Dish::get_by_id(&conn, dish_id)
        .map_err(storage("load dish"))?
        .ok_or(ToolError::NotFound { kind: "Dish", id: dish_id })
}

/// Snapshot a product into the ledger at 100 g
pub fn add_product(ledger: &mut SelectionLedger, product: &Product) -> ItemChangeResponse {
    let item = ledger.add_product(product).clone();
    ItemChangeResponse { item, totals: *ledger.totals() }
}

/// Snapshot a dish's per-100 g values into the ledger at 100 g
pub fn add_dish(ledger: &mut SelectionLedger, dish: &Dish) -> ItemChangeResponse {
    let item = ledger.add_dish(dish).clone();
    ItemChangeResponse { item, totals: *ledger.totals() }
}

/// Change an item's weight from raw text; unusable text counts as 0 g
pub fn update_weight(ledger: &mut SelectionLedger, item_id: &str, weight: &str) -> ToolResult<ItemChangeResponse> {
    let item = ledger
        .update_weight(item_id, weight)
        .cloned()
        .ok_or_else(|| ToolError::SelectionItemNotFound(item_id.to_string()))?;
    Ok(ItemChangeResponse { item, totals: *ledger.totals() })
}

/// Remove an item from the ledger
pub fn remove_item(ledger: &mut SelectionLedger, item_id: &str) -> ToolResult<ItemChangeResponse> {
    let item = ledger
        .remove(item_id)
        .ok_or_else(|| ToolError::SelectionItemNotFound(item_id.to_string()))?;
    Ok(ItemChangeResponse { item, totals: *ledger.totals() })
}

/// Clear the ledger. Without confirmation nothing changes and the caller is
/// told confirmation is needed.
pub fn clear(ledger: &mut SelectionLedger, confirm: bool) -> ToolResult<ClearResponse> {
    let removed_items = ledger.len();
    if !ledger.clear_all(ClearConfirmation::from(confirm)) {
        return Err(ToolError::ConfirmationRequired("Clearing the calculator"));
    }
    tracing::info!(removed_items, "calculator cleared");

    Ok(ClearResponse {
        cleared: true,
        removed_items,
        totals: *ledger.totals(),
    })
}

/// Current ledger contents
pub fn view(ledger: &SelectionLedger) -> CalculatorView {
    CalculatorView::from(ledger)
}
