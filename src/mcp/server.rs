//! MCP Server Implementation
//!
//! Exposes products, dishes, and the calculator as MCP tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::ProductCreate;
use crate::nutrition::SelectionLedger;
use crate::tools::dishes::{self, IngredientRequest};
use crate::tools::status::{StatusTracker, USAGE_INSTRUCTIONS};
use crate::tools::{calculator, products, ToolError};

/// nutricalc MCP Service
///
/// One calculator ledger lives for as long as the server does.
#[derive(Clone)]
pub struct NutriService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    ledger: Arc<Mutex<SelectionLedger>>,
    tool_router: ToolRouter<NutriService>,
}

impl NutriService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(database_path)),
            database,
            ledger: Arc::new(Mutex::new(SelectionLedger::new())),
            tool_router: Self::tool_router(),
        }
    }
}

fn to_mcp_error(e: ToolError) -> McpError {
    if e.is_user_error() {
        McpError::invalid_params(e.to_string(), None)
    } else {
        McpError::internal_error(e.to_string(), None)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Product Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddProductParams {
    /// Product name
    pub name: String,
    /// Protein grams per 100 g
    #[serde(default)]
    pub protein: f64,
    /// Fat grams per 100 g
    #[serde(default)]
    pub fat: f64,
    /// Carbohydrate grams per 100 g
    #[serde(default)]
    pub carbs: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteProductParams {
    /// Product ID to delete
    pub id: i64,
    /// Must be true to delete
    #[serde(default)]
    pub confirm: bool,
}

// ============================================================================
// Dish Parameter Structs
// ============================================================================

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct IngredientParams {
    /// Product ID
    pub product_id: i64,
    /// Grams of the product in the dish (must be > 0)
    pub weight_g: f64,
}

impl From<IngredientParams> for IngredientRequest {
    fn from(p: IngredientParams) -> Self {
        IngredientRequest {
            product_id: p.product_id,
            weight_g: p.weight_g,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DishParams {
    /// Dish name
    pub name: String,
    /// Products by weight; each product at most once
    pub ingredients: Vec<IngredientParams>,
}

impl DishParams {
    fn requests(self) -> (String, Vec<IngredientRequest>) {
        (self.name, self.ingredients.into_iter().map(IngredientRequest::from).collect())
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDishParams {
    /// Dish ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDishIngredientsParams {
    /// Dish ID
    pub dish_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDishParams {
    /// Dish ID to delete
    pub id: i64,
    /// Must be true to delete
    #[serde(default)]
    pub confirm: bool,
}

// ============================================================================
// Calculator Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculatorAddProductParams {
    /// Product ID
    pub product_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculatorAddDishParams {
    /// Dish ID
    pub dish_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculatorUpdateWeightParams {
    /// Calculator item ID (from calculator_view or an add response)
    pub item_id: String,
    /// New weight in grams, as typed; the leading number is used, no number counts as 0
    pub weight: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculatorRemoveItemParams {
    /// Calculator item ID
    pub item_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculatorClearParams {
    /// Must be true to clear
    #[serde(default)]
    pub confirm: bool,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutriService {
    // --- Status ---

    #[tool(description = "Get the current status of the nutricalc service including build info, database status, and process information")]
    fn nutricalc_status(&self) -> Result<CallToolResult, McpError> {
        let status = self.status_tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get instructions for managing products, dishes, and the calculator. Call this when starting a session.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Products ---

    #[tool(description = "Add a product with protein, fat, and carbs per 100 g. Calories are derived automatically.")]
    fn add_product(&self, Parameters(p): Parameters<AddProductParams>) -> Result<CallToolResult, McpError> {
        let data = ProductCreate { name: p.name, protein: p.protein, fat: p.fat, carbs: p.carbs };
        let result = products::add_product(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List all products ordered by name")]
    fn list_products(&self) -> Result<CallToolResult, McpError> {
        let result = products::list_products(&self.database).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a product (requires confirm=true; refused while a dish uses it)")]
    fn delete_product(&self, Parameters(p): Parameters<DeleteProductParams>) -> Result<CallToolResult, McpError> {
        if !p.confirm {
            return Err(to_mcp_error(ToolError::ConfirmationRequired("Deleting a product")));
        }
        let result = products::delete_product(&self.database, p.id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Dishes ---

    #[tool(description = "Calculate a dish's totals and per-100 g values without saving it")]
    fn preview_dish(&self, Parameters(p): Parameters<DishParams>) -> Result<CallToolResult, McpError> {
        let (name, ingredients) = p.requests();
        let result = dishes::preview_dish(&self.database, &name, &ingredients).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Create a dish from products by weight. Dish and ingredients are saved together.")]
    fn create_dish(&self, Parameters(p): Parameters<DishParams>) -> Result<CallToolResult, McpError> {
        let (name, ingredients) = p.requests();
        let result = dishes::create_dish_from_request(&self.database, &name, &ingredients)
            .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a dish with totals, per-100 g values, and ingredients")]
    fn get_dish(&self, Parameters(p): Parameters<GetDishParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::get_dish(&self.database, p.id).map_err(to_mcp_error)?;
        match result {
            Some(detail) => json_result(&detail),
            None => Err(to_mcp_error(ToolError::NotFound { kind: "Dish", id: p.id })),
        }
    }

    #[tool(description = "List all dishes ordered by name")]
    fn list_dishes(&self) -> Result<CallToolResult, McpError> {
        let result = dishes::list_dishes(&self.database).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List a dish's ingredients with product details")]
    fn list_dish_ingredients(&self, Parameters(p): Parameters<ListDishIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::list_dish_ingredients(&self.database, p.dish_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a dish and its ingredient list (requires confirm=true)")]
    fn delete_dish(&self, Parameters(p): Parameters<DeleteDishParams>) -> Result<CallToolResult, McpError> {
        if !p.confirm {
            return Err(to_mcp_error(ToolError::ConfirmationRequired("Deleting a dish")));
        }
        let result = dishes::delete_dish(&self.database, p.id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Calculator ---

    #[tool(description = "List products and dishes that can be added to the calculator")]
    fn calculator_catalog(&self) -> Result<CallToolResult, McpError> {
        let result = calculator::catalog(&self.database).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Add a product to the calculator at 100 g")]
    async fn calculator_add_product(&self, Parameters(p): Parameters<CalculatorAddProductParams>) -> Result<CallToolResult, McpError> {
        let product = calculator::load_product(&self.database, p.product_id).map_err(to_mcp_error)?;
        let mut ledger = self.ledger.lock().await;
        json_result(&calculator::add_product(&mut ledger, &product))
    }

    #[tool(description = "Add a dish to the calculator at 100 g")]
    async fn calculator_add_dish(&self, Parameters(p): Parameters<CalculatorAddDishParams>) -> Result<CallToolResult, McpError> {
        let dish = calculator::load_dish(&self.database, p.dish_id).map_err(to_mcp_error)?;
        let mut ledger = self.ledger.lock().await;
        json_result(&calculator::add_dish(&mut ledger, &dish))
    }

    #[tool(description = "Set a calculator item's weight in grams")]
    async fn calculator_update_weight(&self, Parameters(p): Parameters<CalculatorUpdateWeightParams>) -> Result<CallToolResult, McpError> {
        let mut ledger = self.ledger.lock().await;
        let result = calculator::update_weight(&mut ledger, &p.item_id, &p.weight).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Remove an item from the calculator")]
    async fn calculator_remove_item(&self, Parameters(p): Parameters<CalculatorRemoveItemParams>) -> Result<CallToolResult, McpError> {
        let mut ledger = self.ledger.lock().await;
        let result = calculator::remove_item(&mut ledger, &p.item_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Remove every item from the calculator (requires confirm=true)")]
    async fn calculator_clear(&self, Parameters(p): Parameters<CalculatorClearParams>) -> Result<CallToolResult, McpError> {
        let mut ledger = self.ledger.lock().await;
        let result = calculator::clear(&mut ledger, p.confirm).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Show calculator items and running totals")]
    async fn calculator_view(&self) -> Result<CallToolResult, McpError> {
        let ledger = self.ledger.lock().await;
        json_result(&calculator::view(&ledger))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutriService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutricalc".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("nutricalc".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "nutricalc - products, dishes, and a calorie calculator. \
                 Call usage_instructions first. \
                 Products (per 100 g): add_product, list_products, delete_product. \
                 Dishes: preview_dish, create_dish, get_dish, list_dishes, list_dish_ingredients, delete_dish. \
                 Calculator: calculator_catalog, calculator_add_product, calculator_add_dish, \
                 calculator_update_weight, calculator_remove_item, calculator_clear, calculator_view. \
                 Deletes and calculator_clear require confirm=true."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    fn service() -> NutriService {
        NutriService::new(PathBuf::from(":memory:"), test_database())
    }

    #[test]
    fn test_tool_router_registers_tools() {
        let service = service();
        let names: Vec<String> = service
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        for expected in ["add_product", "create_dish", "calculator_update_weight", "calculator_clear"] {
            assert!(names.iter().any(|n| n == expected), "missing tool {}", expected);
        }
    }

    #[test]
    fn test_delete_requires_confirm() {
        let service = service();
        let err = service
            .delete_product(Parameters(DeleteProductParams { id: 1, confirm: false }))
            .unwrap_err();
        assert!(err.message.contains("confirm=true"));
    }

    #[tokio::test]
    async fn test_calculator_flow() {
        let service = service();
        service
            .add_product(Parameters(AddProductParams {
                name: "Oats".to_string(),
                protein: 10.0,
                fat: 5.0,
                carbs: 20.0,
            }))
            .unwrap();

        let product_id = products::list_products(&service.database).unwrap().items[0].id;
        service
            .calculator_add_product(Parameters(CalculatorAddProductParams { product_id }))
            .await
            .unwrap();

        let ledger = service.ledger.lock().await;
        assert_eq!(ledger.len(), 1);
        assert!((ledger.totals().calories - 165.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_source_fails_without_waiting_on_ledger() {
        let service = service();
        let _held = service.ledger.lock().await;

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            service.calculator_add_dish(Parameters(CalculatorAddDishParams { dish_id: 404 })),
        )
        .await
        .expect("lookup finished while the ledger was locked");
        assert!(result.is_err());
    }
}
