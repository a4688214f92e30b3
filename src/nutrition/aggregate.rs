//! Nutrient aggregation
//!
//! Folds weighted ingredient lines into totals and per-100 g values.

use serde::{Deserialize, Serialize};

use crate::models::Nutrition;

/// One ingredient: nutrition per 100 g and the weight used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub per_100: Nutrition,
    pub weight_g: f64,
}

impl IngredientLine {
    pub fn new(per_100: Nutrition, weight_g: f64) -> Self {
        Self { per_100, weight_g }
    }

    /// Absolute nutrition contributed by this line
    pub fn absolute(&self) -> Nutrition {
        scale(&self.per_100, self.weight_g)
    }
}

/// Aggregated nutrition for a set of ingredient lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_weight_g: f64,
    pub total: Nutrition,
    pub per_100: Nutrition,
}

/// Scale per-100 g nutrition to an absolute amount for `weight_g` grams.
///
/// Computed as `(value / 100) * weight_g` per field; weight 0 yields zeros.
pub fn scale(per_100: &Nutrition, weight_g: f64) -> Nutrition {
    Nutrition {
        calories: (per_100.calories / 100.0) * weight_g,
        protein: (per_100.protein / 100.0) * weight_g,
        fat: (per_100.fat / 100.0) * weight_g,
        carbs: (per_100.carbs / 100.0) * weight_g,
    }
}

/// Normalize absolute nutrition to 100 g.
///
/// A non-positive total weight yields all zeros instead of NaN.
pub fn per_100(total: &Nutrition, total_weight_g: f64) -> Nutrition {
    if total_weight_g > 0.0 {
        Nutrition {
            calories: total.calories / total_weight_g * 100.0,
            protein: total.protein / total_weight_g * 100.0,
            fat: total.fat / total_weight_g * 100.0,
            carbs: total.carbs / total_weight_g * 100.0,
        }
    } else {
        Nutrition::zero()
    }
}

/// Aggregate ingredient lines into dish totals.
///
/// Pure: the same lines always produce the same totals, in any order up to
/// floating-point rounding.
pub fn aggregate<'a, I>(lines: I) -> Totals
where
    I: IntoIterator<Item = &'a IngredientLine>,
{
    let (total_weight_g, total) = lines.into_iter().fold(
        (0.0, Nutrition::zero()),
        |(weight, total), line| (weight + line.weight_g, total + line.absolute()),
    );

    Totals {
        total_weight_g,
        total,
        per_100: per_100(&total, total_weight_g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn approx_nutrition(a: &Nutrition, b: &Nutrition) -> bool {
        approx(a.calories, b.calories)
            && approx(a.protein, b.protein)
            && approx(a.fat, b.fat)
            && approx(a.carbs, b.carbs)
    }

    fn calories_only(calories: f64) -> Nutrition {
        Nutrition { calories, ..Nutrition::zero() }
    }

    #[test]
    fn test_two_ingredient_dish() {
        let lines = [
            IngredientLine::new(calories_only(100.0), 50.0),
            IngredientLine::new(calories_only(200.0), 150.0),
        ];
        let totals = aggregate(&lines);
        assert!(approx(totals.total_weight_g, 200.0));
        assert!(approx(totals.total.calories, 350.0));
        assert!(approx(totals.per_100.calories, 175.0));
    }

    #[test]
    fn test_totals_match_weighted_sum() {
        let lines = [
            IngredientLine::new(Nutrition::from_macros(10.0, 5.0, 20.0), 30.0),
            IngredientLine::new(Nutrition::from_macros(2.5, 0.0, 70.0), 120.0),
            IngredientLine::new(Nutrition::from_macros(25.0, 14.0, 0.0), 75.5),
        ];
        let totals = aggregate(&lines);

        let expected = lines.iter().fold(Nutrition::zero(), |acc, l| {
            Nutrition {
                calories: acc.calories + l.per_100.calories / 100.0 * l.weight_g,
                protein: acc.protein + l.per_100.protein / 100.0 * l.weight_g,
                fat: acc.fat + l.per_100.fat / 100.0 * l.weight_g,
                carbs: acc.carbs + l.per_100.carbs / 100.0 * l.weight_g,
            }
        });
        assert!(approx_nutrition(&totals.total, &expected));
        assert!(approx(totals.total_weight_g, 225.5));
    }

    #[test]
    fn test_order_independent() {
        let a = IngredientLine::new(Nutrition::from_macros(10.0, 5.0, 20.0), 33.3);
        let b = IngredientLine::new(Nutrition::from_macros(2.5, 0.1, 70.0), 120.0);
        let c = IngredientLine::new(Nutrition::from_macros(25.0, 14.0, 0.0), 0.7);

        let forward = aggregate(&[a, b, c]);
        let reversed = aggregate(&[c, b, a]);
        let shuffled = aggregate(&[b, c, a]);

        for other in [reversed, shuffled] {
            assert!(approx(forward.total_weight_g, other.total_weight_g));
            assert!(approx_nutrition(&forward.total, &other.total));
            assert!(approx_nutrition(&forward.per_100, &other.per_100));
        }
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let lines = [IngredientLine::new(Nutrition::from_macros(1.0, 2.0, 3.0), 42.0)];
        assert_eq!(aggregate(&lines), aggregate(&lines));
    }

    #[test]
    fn test_empty_aggregate_has_no_nan() {
        let totals = aggregate(std::iter::empty::<&IngredientLine>());
        assert_eq!(totals.total_weight_g, 0.0);
        assert_eq!(totals.total, Nutrition::zero());
        assert_eq!(totals.per_100, Nutrition::zero());
    }

    #[test]
    fn test_zero_weight_lines() {
        let lines = [IngredientLine::new(Nutrition::from_macros(10.0, 10.0, 10.0), 0.0)];
        let totals = aggregate(&lines);
        assert_eq!(totals.per_100, Nutrition::zero());
        assert!(!totals.per_100.calories.is_nan());
    }

    #[test]
    fn test_scale() {
        let per_100 = Nutrition::from_macros(10.0, 5.0, 20.0);
        assert_eq!(scale(&per_100, 0.0), Nutrition::zero());
        assert!(approx_nutrition(&scale(&per_100, 100.0), &per_100));
        assert!(approx(scale(&per_100, 50.0).calories, 82.5));
    }
}
