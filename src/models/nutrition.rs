//! Shared nutrition data structure
//!
//! Used across products, dishes, and calculator items.

use serde::{Deserialize, Serialize};

/// Energy per gram of protein (kcal)
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
/// Energy per gram of fat (kcal)
pub const KCAL_PER_G_FAT: f64 = 9.0;
/// Energy per gram of carbohydrate (kcal)
pub const KCAL_PER_G_CARBS: f64 = 4.0;

/// Calories derived from macronutrient grams.
///
/// Negative inputs are not rejected and propagate arithmetically.
pub fn calories_from_macros(protein: f64, fat: f64, carbs: f64) -> f64 {
    protein * KCAL_PER_G_PROTEIN + fat * KCAL_PER_G_FAT + carbs * KCAL_PER_G_CARBS
}

/// Calories and macronutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub fat: f64,     // grams
    pub carbs: f64,   // grams
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a record from macros, deriving its calories
    pub fn from_macros(protein: f64, fat: f64, carbs: f64) -> Self {
        Self {
            calories: calories_from_macros(protein, fat, carbs),
            protein,
            fat,
            carbs,
        }
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            carbs: self.carbs * multiplier,
        }
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

impl<'a> std::iter::Sum<&'a Nutrition> for Nutrition {
    fn sum<I: Iterator<Item = &'a Nutrition>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + *n)
    }
}
