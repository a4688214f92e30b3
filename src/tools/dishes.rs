//! Dish tools
//!
//! Build, save, inspect, and delete dishes.

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{Dish, DishIngredient, DishIngredientDetail, Nutrition, Product};
use crate::nutrition::{DishDraft, Totals};
use super::error::{storage, ToolError, ToolResult};

/// One ingredient of a dish request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRequest {
    pub product_id: i64,
    pub weight_g: f64,
}

/// Response for create_dish
#[derive(Debug, Serialize)]
pub struct CreateDishResponse {
    pub id: i64,
    pub name: String,
    pub ingredient_count: usize,
    pub totals: Totals,
    pub created_at: String,
}

/// Response for preview_dish
#[derive(Debug, Serialize)]
pub struct PreviewDishResponse {
    pub name: String,
    pub ingredient_count: usize,
    pub totals: Totals,
}

/// Dish summary for listing
#[derive(Debug, Serialize)]
pub struct DishSummary {
    pub id: i64,
    pub name: String,
    pub total_weight_g: f64,
    pub total_calories: f64,
    pub per_100: Nutrition,
}

impl From<&Dish> for DishSummary {
    fn from(dish: &Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name.clone(),
            total_weight_g: dish.total_weight_g,
            total_calories: dish.total.calories,
            per_100: dish.per_100,
        }
    }
}

/// Response for list_dishes
#[derive(Debug, Serialize)]
pub struct ListDishesResponse {
    pub dishes: Vec<DishSummary>,
    pub total: usize,
}

/// Full dish detail with ingredients
#[derive(Debug, Serialize)]
pub struct DishDetail {
    pub id: i64,
    pub name: String,
    pub total_weight_g: f64,
    pub total: Nutrition,
    pub per_100: Nutrition,
    pub ingredients: Vec<DishIngredientDetail>,
    pub created_at: String,
}

/// Response for list_dish_ingredients
#[derive(Debug, Serialize)]
pub struct ListDishIngredientsResponse {
    pub dish_id: i64,
    pub ingredients: Vec<DishIngredientDetail>,
}

/// Response for a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteDishResponse {
    pub success: bool,
    pub deleted_id: i64,
}

// ============================================================================
// Drafts
// ============================================================================

/// Build a draft from product ids, loading each product.
///
/// Ingredients are added in request order, so weight and duplicate checks
/// fail on the first offending entry.
pub fn build_draft(db: &Database, name: &str, ingredients: &[IngredientRequest]) -> ToolResult<DishDraft> {
    let conn = db.get_conn().map_err(storage("open database"))?;
    let mut draft = DishDraft::new(name);

    for request in ingredients {
        let product = Product::get_by_id(&conn, request.product_id)
            .map_err(storage("load product"))?
            .ok_or(ToolError::NotFound { kind: "Product", id: request.product_id })?;
        draft.add_ingredient(product, request.weight_g)?;
    }

    Ok(draft)
}

/// Totals a dish would have, without saving it
pub fn preview_dish(db: &Database, name: &str, ingredients: &[IngredientRequest]) -> ToolResult<PreviewDishResponse> {
    let draft = build_draft(db, name, ingredients)?;
    Ok(PreviewDishResponse {
        name: draft.name().trim().to_string(),
        ingredient_count: draft.ingredients().len(),
        totals: draft.totals(),
    })
}

// ============================================================================
// Dish Tools
// ============================================================================

/// Save a draft as a dish.
///
/// The dish row and all of its ingredient rows are written in one
/// transaction; if any insert fails nothing is stored.
pub fn create_dish(db: &Database, draft: &DishDraft) -> ToolResult<CreateDishResponse> {
    let validated = draft.validate()?;

    let dish = db
        .with_transaction(|tx| {
            let dish = Dish::create(tx, validated.name, &validated.totals)?;
            for ingredient in validated.ingredients {
                DishIngredient::create(tx, dish.id, ingredient.product.id, ingredient.weight_g)?;
            }
            Ok(dish)
        })
        .map_err(storage("add dish"))?;
    tracing::info!(id = dish.id, name = %dish.name, ingredients = validated.ingredients.len(), "dish added");

    Ok(CreateDishResponse {
        id: dish.id,
        name: dish.name,
        ingredient_count: validated.ingredients.len(),
        totals: validated.totals,
        created_at: dish.created_at,
    })
}

/// Build and save a dish from a name and product/weight pairs
pub fn create_dish_from_request(
    db: &Database,
    name: &str,
    ingredients: &[IngredientRequest],
) -> ToolResult<CreateDishResponse> {
    let draft = build_draft(db, name, ingredients)?;
    create_dish(db, &draft)
}

/// List all dishes ordered by name
pub fn list_dishes(db: &Database) -> ToolResult<ListDishesResponse> {
    let conn = db.get_conn().map_err(storage("open database"))?;
    let dishes = Dish::list(&conn).map_err(storage("list dishes"))?;

    let dishes: Vec<DishSummary> = dishes.iter().map(DishSummary::from).collect();
    let total = dishes.len();
    Ok(ListDishesResponse { dishes, total })
}

/// Get a dish with its ingredients
pub fn get_dish(db: &Database, id: i64) -> ToolResult<Option<DishDetail>> {
    let conn = db.get_conn().map_err(storage("open database"))?;

    let dish = match Dish::get_by_id(&conn, id).map_err(storage("get dish"))? {
        Some(dish) => dish,
        None => return Ok(None),
    };
    let ingredients = DishIngredient::get_details_for_dish(&conn, id)
        .map_err(storage("get dish ingredients"))?;

    Ok(Some(DishDetail {
        id: dish.id,
        name: dish.name,
        total_weight_g: dish.total_weight_g,
        total: dish.total,
        per_100: dish.per_100,
        ingredients,
        created_at: dish.created_at,
    }))
}

/// Ingredients of a dish joined with their products
pub fn list_dish_ingredients(db: &Database, dish_id: i64) -> ToolResult<ListDishIngredientsResponse> {
    let conn = db.get_conn().map_err(storage("open database"))?;
    let ingredients = DishIngredient::get_details_for_dish(&conn, dish_id)
        .map_err(storage("get dish ingredients"))?;

    Ok(ListDishIngredientsResponse { dish_id, ingredients })
}

/// Delete a dish and, by cascade, its ingredient rows
pub fn delete_dish(db: &Database, id: i64) -> ToolResult<DeleteDishResponse> {
    let conn = db.get_conn().map_err(storage("open database"))?;

    if !Dish::delete(&conn, id).map_err(storage("delete dish"))? {
        return Err(ToolError::NotFound { kind: "Dish", id });
    }
    tracing::info!(id, "dish deleted");

    Ok(DeleteDishResponse {
        success: true,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::ProductCreate;
    use crate::nutrition::ValidationError;
    use crate::tools::products::{add_product, delete_product};

    fn product(db: &Database, name: &str, protein: f64, fat: f64, carbs: f64) -> i64 {
        add_product(db, ProductCreate { name: name.to_string(), protein, fat, carbs })
            .unwrap()
            .id
    }

    fn request(product_id: i64, weight_g: f64) -> IngredientRequest {
        IngredientRequest { product_id, weight_g }
    }

    #[test]
    fn test_create_dish_round_trip() {
        let db = test_database();
        let oats = product(&db, "Oats", 12.0, 6.0, 60.0);
        let milk = product(&db, "Milk", 3.2, 3.6, 4.8);

        let created = create_dish_from_request(
            &db,
            " Porridge ",
            &[request(oats, 60.0), request(milk, 200.0)],
        )
        .unwrap();
        assert_eq!(created.name, "Porridge");
        assert_eq!(created.ingredient_count, 2);
        assert_eq!(created.totals.total_weight_g, 260.0);

        let listed = list_dish_ingredients(&db, created.id).unwrap();
        let mut pairs: Vec<(i64, f64)> = listed
            .ingredients
            .iter()
            .map(|i| (i.product_id, i.weight_g))
            .collect();
        pairs.sort_by_key(|(id, _)| *id);
        let mut expected = vec![(oats, 60.0), (milk, 200.0)];
        expected.sort_by_key(|(id, _)| *id);
        assert_eq!(pairs, expected);

        let stored: Vec<(i64, f64)> = db
            .with_conn(|conn| DishIngredient::get_for_dish(conn, created.id))
            .unwrap()
            .iter()
            .map(|row| (row.product_id, row.weight_g))
            .collect();
        assert_eq!(stored, vec![(oats, 60.0), (milk, 200.0)]);
    }

    #[test]
    fn test_create_dish_stores_totals() {
        let db = test_database();
        // 100 kcal and 200 kcal per 100 g, via carbs only
        let a = product(&db, "A", 0.0, 0.0, 25.0);
        let b = product(&db, "B", 0.0, 0.0, 50.0);

        let created = create_dish_from_request(&db, "Mix", &[request(a, 50.0), request(b, 150.0)]).unwrap();
        let dish = get_dish(&db, created.id).unwrap().unwrap();
        assert_eq!(dish.total_weight_g, 200.0);
        assert!((dish.total.calories - 350.0).abs() < 1e-9);
        assert!((dish.per_100.calories - 175.0).abs() < 1e-9);
        assert_eq!(dish.ingredients.len(), 2);
    }

    #[test]
    fn test_create_dish_validation() {
        let db = test_database();
        let egg = product(&db, "Egg", 13.0, 11.0, 1.0);

        let err = create_dish_from_request(&db, "  ", &[request(egg, 50.0)]).unwrap_err();
        assert!(matches!(err, ToolError::Validation(ValidationError::EmptyDishName)));

        let err = create_dish_from_request(&db, "Nothing", &[]).unwrap_err();
        assert!(matches!(err, ToolError::Validation(ValidationError::NoIngredients)));

        let err = create_dish_from_request(&db, "Eggs", &[request(egg, 50.0), request(egg, 60.0)]).unwrap_err();
        assert!(matches!(err, ToolError::Validation(ValidationError::DuplicateIngredient { .. })));

        let err = create_dish_from_request(&db, "Eggs", &[request(egg, 0.0)]).unwrap_err();
        assert!(matches!(err, ToolError::Validation(ValidationError::InvalidWeight { .. })));

        let err = create_dish_from_request(&db, "Eggs", &[request(9999, 10.0)]).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { kind: "Product", id: 9999 }));

        assert_eq!(list_dishes(&db).unwrap().total, 0);
    }

    #[test]
    fn test_failed_ingredient_write_rolls_back_dish() {
        let db = test_database();
        let egg = product(&db, "Egg", 13.0, 11.0, 1.0);
        let draft = build_draft(&db, "Omelette", &[request(egg, 120.0)]).unwrap();

        // The product disappears between drafting and saving
        delete_product(&db, egg).unwrap();

        let err = create_dish(&db, &draft).unwrap_err();
        assert!(matches!(err, ToolError::Storage { .. }));
        assert_eq!(list_dishes(&db).unwrap().total, 0);
    }

    #[test]
    fn test_delete_dish_cascades_and_frees_product() {
        let db = test_database();
        let rice = product(&db, "Rice", 7.0, 1.0, 78.0);
        let created = create_dish_from_request(&db, "Pilaf", &[request(rice, 150.0)]).unwrap();

        // Still referenced by the dish
        let err = delete_product(&db, rice).unwrap_err();
        assert!(matches!(err, ToolError::Storage { .. }));

        delete_dish(&db, created.id).unwrap();
        assert!(list_dish_ingredients(&db, created.id).unwrap().ingredients.is_empty());
        assert!(get_dish(&db, created.id).unwrap().is_none());

        delete_product(&db, rice).unwrap();
    }

    #[test]
    fn test_delete_missing_dish() {
        let db = test_database();
        let err = delete_dish(&db, 42).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { kind: "Dish", id: 42 }));
    }

    #[test]
    fn test_preview_does_not_save() {
        let db = test_database();
        let bread = product(&db, "Bread", 8.0, 3.0, 49.0);
        let preview = preview_dish(&db, "Toast", &[request(bread, 40.0)]).unwrap();
        assert_eq!(preview.ingredient_count, 1);
        assert_eq!(preview.totals.total_weight_g, 40.0);
        assert_eq!(list_dishes(&db).unwrap().total, 0);
    }

    #[test]
    fn test_list_dishes_sorted() {
        let db = test_database();
        let apple = product(&db, "Apple", 0.3, 0.2, 14.0);
        create_dish_from_request(&db, "Strudel", &[request(apple, 300.0)]).unwrap();
        create_dish_from_request(&db, "Compote", &[request(apple, 200.0)]).unwrap();

        let names: Vec<String> = list_dishes(&db).unwrap().dishes.into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Compote", "Strudel"]);
    }
}
