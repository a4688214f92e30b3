//! Dish draft
//!
//! The in-progress ingredient list of a dish that has not been saved yet.
//! Ingredient checks happen as each one is added; name and emptiness are
//! checked when the draft is validated for saving.

use serde::Serialize;
use thiserror::Error;

use crate::models::Product;
use super::aggregate::{aggregate, IngredientLine, Totals};

/// Input rejected before anything reaches storage
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Product name cannot be empty")]
    EmptyProductName,

    #[error("Dish name cannot be empty")]
    EmptyDishName,

    #[error("Add at least one ingredient")]
    NoIngredients,

    #[error("Product '{name}' (id {product_id}) is already in this dish")]
    DuplicateIngredient { product_id: i64, name: String },

    #[error("Ingredient weight must be greater than 0 (got {weight})")]
    InvalidWeight { weight: f64 },
}

/// A product and the grams of it used in the draft
#[derive(Debug, Clone, Serialize)]
pub struct DraftIngredient {
    pub product: Product,
    pub weight_g: f64,
}

impl DraftIngredient {
    pub fn line(&self) -> IngredientLine {
        IngredientLine::new(self.product.nutrition, self.weight_g)
    }
}

/// A dish under construction
#[derive(Debug, Clone, Default, Serialize)]
pub struct DishDraft {
    name: String,
    ingredients: Vec<DraftIngredient>,
}

/// A draft that passed validation, ready to persist
#[derive(Debug, Clone)]
pub struct ValidatedDish<'a> {
    pub name: &'a str,
    pub ingredients: &'a [DraftIngredient],
    pub totals: Totals,
}

impl DishDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingredients(&self) -> &[DraftIngredient] {
        &self.ingredients
    }

    /// Add a product by weight.
    ///
    /// Rejects a weight that is not strictly positive and a product whose id
    /// is already in the draft.
    pub fn add_ingredient(&mut self, product: Product, weight_g: f64) -> Result<(), ValidationError> {
        if !(weight_g.is_finite() && weight_g > 0.0) {
            return Err(ValidationError::InvalidWeight { weight: weight_g });
        }

        if self.ingredients.iter().any(|ing| ing.product.id == product.id) {
            return Err(ValidationError::DuplicateIngredient {
                product_id: product.id,
                name: product.name,
            });
        }

        self.ingredients.push(DraftIngredient { product, weight_g });
        Ok(())
    }

    /// Remove a product from the draft. Returns whether it was present.
    pub fn remove_ingredient(&mut self, product_id: i64) -> bool {
        let before = self.ingredients.len();
        self.ingredients.retain(|ing| ing.product.id != product_id);
        self.ingredients.len() != before
    }

    /// Live totals for the current ingredient list
    pub fn totals(&self) -> Totals {
        let lines: Vec<IngredientLine> = self.ingredients.iter().map(DraftIngredient::line).collect();
        aggregate(&lines)
    }

    /// Check the draft can be saved and compute what will be stored
    pub fn validate(&self) -> Result<ValidatedDish<'_>, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyDishName);
        }
        if self.ingredients.is_empty() {
            return Err(ValidationError::NoIngredients);
        }

        Ok(ValidatedDish {
            name,
            ingredients: &self.ingredients,
            totals: self.totals(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrition;

    fn product(id: i64, name: &str, calories: f64) -> Product {
        Product {
            id,
            name: name.to_string(),
            nutrition: Nutrition { calories, ..Nutrition::zero() },
            created_at: String::new(),
        }
    }

    #[test]
    fn test_totals_preview() {
        let mut draft = DishDraft::new("Mix");
        draft.add_ingredient(product(1, "A", 100.0), 50.0).unwrap();
        draft.add_ingredient(product(2, "B", 200.0), 150.0).unwrap();

        let totals = draft.totals();
        assert_eq!(totals.total_weight_g, 200.0);
        assert!((totals.total.calories - 350.0).abs() < 1e-9);
        assert!((totals.per_100.calories - 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let mut draft = DishDraft::new("Mix");
        draft.add_ingredient(product(1, "A", 100.0), 50.0).unwrap();
        let err = draft.add_ingredient(product(1, "A", 100.0), 20.0).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateIngredient { product_id: 1, name: "A".to_string() });
        assert_eq!(draft.ingredients().len(), 1);
    }

    #[test]
    fn test_same_name_different_id_allowed() {
        let mut draft = DishDraft::new("Mix");
        draft.add_ingredient(product(1, "Egg", 150.0), 50.0).unwrap();
        draft.add_ingredient(product(2, "Egg", 150.0), 50.0).unwrap();
        assert_eq!(draft.ingredients().len(), 2);
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let mut draft = DishDraft::new("Mix");
        for weight in [0.0, -5.0, f64::NAN] {
            let err = draft.add_ingredient(product(1, "A", 100.0), weight).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidWeight { .. }));
        }
        assert!(draft.ingredients().is_empty());
    }

    #[test]
    fn test_remove_ingredient() {
        let mut draft = DishDraft::new("Mix");
        draft.add_ingredient(product(1, "A", 100.0), 50.0).unwrap();
        assert!(draft.remove_ingredient(1));
        assert!(!draft.remove_ingredient(1));
        assert_eq!(draft.totals(), Totals::default());
    }

    #[test]
    fn test_validate_requires_name_and_ingredients() {
        let mut draft = DishDraft::new("   ");
        draft.add_ingredient(product(1, "A", 100.0), 50.0).unwrap();
        assert_eq!(draft.validate().unwrap_err(), ValidationError::EmptyDishName);

        let empty = DishDraft::new("Soup");
        assert_eq!(empty.validate().unwrap_err(), ValidationError::NoIngredients);

        draft.set_name("  Salad ");
        let validated = draft.validate().unwrap();
        assert_eq!(validated.name, "Salad");
        assert_eq!(validated.ingredients.len(), 1);
        assert_eq!(validated.totals.total_weight_g, 50.0);
    }
}
