//! Product tools
//!
//! Add, list, and delete products.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Product, ProductCreate};
use crate::nutrition::ValidationError;
use super::error::{storage, ToolError, ToolResult};

/// Response for add_product
#[derive(Debug, Serialize)]
pub struct AddProductResponse {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub created_at: String,
}

/// Summary of a product for list results
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            calories: product.nutrition.calories,
            protein: product.nutrition.protein,
            fat: product.nutrition.fat,
            carbs: product.nutrition.carbs,
        }
    }
}

/// Response for list_products
#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub items: Vec<ProductSummary>,
    pub total: usize,
}

/// Response for a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Add a new product. The name is trimmed; macros are taken as given.
pub fn add_product(db: &Database, data: ProductCreate) -> ToolResult<AddProductResponse> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyProductName.into());
    }
    let data = ProductCreate {
        name: name.to_string(),
        ..data
    };

    let conn = db.get_conn().map_err(storage("open database"))?;
    let product = Product::create(&conn, &data).map_err(storage("add product"))?;
    tracing::info!(id = product.id, name = %product.name, "product added");

    Ok(AddProductResponse {
        id: product.id,
        name: product.name,
        calories: product.nutrition.calories,
        created_at: product.created_at,
    })
}

/// List all products ordered by name
pub fn list_products(db: &Database) -> ToolResult<ListProductsResponse> {
    let conn = db.get_conn().map_err(storage("open database"))?;
    let products = Product::list(&conn).map_err(storage("list products"))?;

    let items: Vec<ProductSummary> = products.iter().map(ProductSummary::from).collect();
    let total = items.len();
    Ok(ListProductsResponse { items, total })
}

/// Delete a product.
///
/// Products used by a saved dish are protected by the schema; that refusal
/// comes back as a storage error.
pub fn delete_product(db: &Database, id: i64) -> ToolResult<DeleteProductResponse> {
    let conn = db.get_conn().map_err(storage("open database"))?;

    if !Product::delete(&conn, id).map_err(storage("delete product"))? {
        return Err(ToolError::NotFound { kind: "Product", id });
    }
    tracing::info!(id, "product deleted");

    Ok(DeleteProductResponse {
        success: true,
        deleted_id: id,
    })
}
