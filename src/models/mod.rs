//! Data models
//!
//! Rust structs representing database entities.

mod dish;
mod dish_ingredient;
mod nutrition;
mod product;

pub use dish::Dish;
pub use dish_ingredient::{DishIngredient, DishIngredientDetail};
pub use nutrition::{calories_from_macros, Nutrition};
pub use product::{Product, ProductCreate};
