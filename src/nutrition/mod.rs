//! Nutrition calculation module
//!
//! Aggregation of weighted ingredients, dish drafts, and the calculator ledger.

pub mod aggregate;
pub mod draft;
pub mod ledger;

pub use aggregate::{aggregate, per_100, scale, IngredientLine, Totals};
pub use draft::{DishDraft, DraftIngredient, ValidatedDish, ValidationError};
pub use ledger::{
    parse_weight, ClearConfirmation, SelectionItem, SelectionLedger, SelectionSource, SourceKind,
    DEFAULT_WEIGHT_G,
};
