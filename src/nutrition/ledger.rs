//! Calculator selection ledger
//!
//! An ordered working set of products and dishes, each scaled by an editable
//! weight, with running totals kept current after every mutation.

use serde::{Deserialize, Serialize};

use crate::models::{Dish, Nutrition, Product};
use super::aggregate::scale;

/// Weight given to a freshly added item
pub const DEFAULT_WEIGHT_G: f64 = 100.0;

/// Where a selection item was copied from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Product,
    Dish,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Product => "product",
            SourceKind::Dish => "dish",
        }
    }
}

/// A snapshot of a product or dish taken when it enters the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSource {
    pub kind: SourceKind,
    pub source_id: i64,
    pub name: String,
    pub per_100: Nutrition,
}

impl From<&Product> for SelectionSource {
    fn from(product: &Product) -> Self {
        Self {
            kind: SourceKind::Product,
            source_id: product.id,
            name: product.name.clone(),
            per_100: product.nutrition,
        }
    }
}

impl From<&Dish> for SelectionSource {
    fn from(dish: &Dish) -> Self {
        Self {
            kind: SourceKind::Dish,
            source_id: dish.id,
            name: dish.name.clone(),
            per_100: dish.per_100,
        }
    }
}

/// One scaled entry in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub id: String,
    pub kind: SourceKind,
    pub source_id: i64,
    pub name: String,
    pub per_100: Nutrition,
    pub weight_g: f64,
    pub absolute: Nutrition,
}

/// Answer to the "clear everything?" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearConfirmation {
    Confirmed,
    Cancelled,
}

impl From<bool> for ClearConfirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            ClearConfirmation::Confirmed
        } else {
            ClearConfirmation::Cancelled
        }
    }
}

/// Parse weight text, holding anything unusable at 0.
///
/// Reads the leading number and ignores whatever follows it, so `"150g"` is
/// 150. Accepts surrounding whitespace and a comma decimal separator. Empty,
/// non-numeric, and non-finite input all become 0.
pub fn parse_weight(text: &str) -> f64 {
    let normalized = text.trim().replace(',', ".");
    match leading_number(&normalized).parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Longest prefix shaped like a decimal float: sign, digits with at most one
/// `.`, then an exponent only when digits follow it
fn leading_number(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let mut seen_dot = false;
    let mut digits = 0;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end..].iter().take_while(|b| b.is_ascii_digit()).count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    &text[..end]
}

/// The calculator's working set
#[derive(Debug, Clone, Default)]
pub struct SelectionLedger {
    items: Vec<SelectionItem>,
    totals: Nutrition,
    last_stamp: i64,
}

impl SelectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot of `source` at the default weight
    pub fn add(&mut self, source: SelectionSource) -> &SelectionItem {
        let now = chrono::Utc::now().timestamp_millis();
        self.add_at(source, now)
    }

    pub fn add_product(&mut self, product: &Product) -> &SelectionItem {
        self.add(SelectionSource::from(product))
    }

    pub fn add_dish(&mut self, dish: &Dish) -> &SelectionItem {
        self.add(SelectionSource::from(dish))
    }

    /// Ids embed a millisecond stamp; the stamp never repeats within one
    /// ledger so repeated additions of a source stay distinguishable.
    fn add_at(&mut self, source: SelectionSource, now_millis: i64) -> &SelectionItem {
        let stamp = now_millis.max(self.last_stamp + 1);
        self.last_stamp = stamp;

        let item = SelectionItem {
            id: format!("{}_{}_{}", source.kind.as_str(), source.source_id, stamp),
            kind: source.kind,
            source_id: source.source_id,
            absolute: scale(&source.per_100, DEFAULT_WEIGHT_G),
            name: source.name,
            per_100: source.per_100,
            weight_g: DEFAULT_WEIGHT_G,
        };
        tracing::debug!(item_id = %item.id, "calculator item added");

        self.items.push(item);
        self.recompute_totals();
        let last = self.items.len() - 1;
        &self.items[last]
    }

    /// Set an item's weight from user text. Returns `None` for an unknown id.
    pub fn update_weight(&mut self, item_id: &str, weight_text: &str) -> Option<&SelectionItem> {
        let weight_g = parse_weight(weight_text);
        let index = self.items.iter().position(|item| item.id == item_id)?;

        let item = &mut self.items[index];
        item.weight_g = weight_g;
        item.absolute = scale(&item.per_100, weight_g);
        tracing::debug!(item_id, weight_g, "calculator weight updated");

        self.recompute_totals();
        Some(&self.items[index])
    }

    /// Remove an item, returning it
    pub fn remove(&mut self, item_id: &str) -> Option<SelectionItem> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        let removed = self.items.remove(index);
        self.recompute_totals();
        Some(removed)
    }

    /// Empty the ledger if the user confirmed. Returns whether it was cleared.
    pub fn clear_all(&mut self, confirmation: ClearConfirmation) -> bool {
        match confirmation {
            ClearConfirmation::Confirmed => {
                self.items.clear();
                self.recompute_totals();
                true
            }
            ClearConfirmation::Cancelled => false,
        }
    }

    fn recompute_totals(&mut self) {
        self.totals = self.items.iter().map(|item| &item.absolute).sum();
    }

    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    pub fn get(&self, item_id: &str) -> Option<&SelectionItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn totals(&self) -> &Nutrition {
        &self.totals
    }

    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|item| item.weight_g).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
