//! Data model shared by the resolver, the collaborator clients, and the API.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

use crate::defaults;

// =============================================================================
// MACROS
// =============================================================================

/// Calories, protein, carbs, and fat. Per 100g unless scaled by a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroRecord {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroRecord {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// The hardcoded record used when every lookup stage misses.
    pub const fn generic_estimate() -> Self {
        Self::new(
            defaults::GENERIC_CALORIES,
            defaults::GENERIC_PROTEIN,
            defaults::GENERIC_CARBS,
            defaults::GENERIC_FAT,
        )
    }

    /// Multiply every field by `factor`. Linear, no clamping.
    pub fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    /// Field-wise sum over any number of records.
    pub fn sum<'a>(records: impl IntoIterator<Item = &'a MacroRecord>) -> Self {
        records
            .into_iter()
            .fold(MacroRecord::default(), |acc, r| acc + *r)
    }

    /// Replace negative or non-finite values with zero.
    pub fn sanitized(self) -> Self {
        fn clean(v: f64) -> f64 {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                0.0
            }
        }
        Self::new(
            clean(self.calories),
            clean(self.protein),
            clean(self.carbs),
            clean(self.fat),
        )
    }
}

impl Add for MacroRecord {
    type Output = MacroRecord;

    fn add(self, rhs: Self) -> Self::Output {
        MacroRecord::new(
            self.calories + rhs.calories,
            self.protein + rhs.protein,
            self.carbs + rhs.carbs,
            self.fat + rhs.fat,
        )
    }
}

impl Mul<f64> for MacroRecord {
    type Output = MacroRecord;

    fn mul(self, rhs: f64) -> Self::Output {
        MacroRecord::new(
            self.calories * rhs,
            self.protein * rhs,
            self.carbs * rhs,
            self.fat * rhs,
        )
    }
}

/// Macros as returned to callers, with the scaling context when quantity > 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMacros {
    #[serde(flatten)]
    pub macros: MacroRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_item: Option<String>,
}

impl ResolvedMacros {
    /// Unscaled macros with no quantity context.
    pub fn plain(macros: MacroRecord) -> Self {
        Self {
            macros,
            quantity: None,
            base_item: None,
        }
    }
}

// =============================================================================
// LABELS
// =============================================================================

/// A food phrase split into its leading count and the remaining term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodLabel {
    /// Parsed count, at least 1.
    pub quantity: u32,
    /// Lowercase term with a single plural "s" removed when a count was present.
    pub base_term: String,
    /// The trimmed lowercase phrase as given.
    pub original: String,
}

/// A normalized label ready for table lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLabel {
    pub quantity: u32,
    pub base_term: String,
    /// Canonical table key, or the base term when no synonym matched.
    pub canonical_key: String,
}

/// Raw detector output kept for the response, independent of macro resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLabel {
    pub label: String,
    /// Confidence percentage (0-100, one decimal).
    pub confidence: f64,
}

// =============================================================================
// DETECTION
// =============================================================================

/// A ranked label from the image-label API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub description: String,
    /// Confidence in [0, 1].
    pub score: f64,
}

/// Normalized bounding box (all coordinates in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// A localized object from the image-label API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedObject {
    pub name: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// Everything the image-label API returned for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub labels: Vec<ScoredLabel>,
    pub objects: Vec<LocalizedObject>,
}

// =============================================================================
// ESTIMATES AND RESULTS
// =============================================================================

/// One component of a plate as estimated by the vision LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodComponent {
    pub name: String,
    #[serde(flatten)]
    pub macros: MacroRecord,
}

/// Vision LLM estimate for a whole plate.
///
/// `total` always equals the field-wise sum of `components`; construct
/// through [`MealEstimate::from_components`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealEstimate {
    total: MacroRecord,
    components: Vec<FoodComponent>,
}

impl MealEstimate {
    pub fn from_components(components: Vec<FoodComponent>) -> Self {
        let total = MacroRecord::sum(components.iter().map(|c| &c.macros));
        Self { total, components }
    }

    pub fn total(&self) -> MacroRecord {
        self.total
    }

    pub fn components(&self) -> &[FoodComponent] {
        &self.components
    }

    pub fn into_components(self) -> Vec<FoodComponent> {
        self.components
    }
}

/// Which stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroSource {
    StaticTable,
    NutritionDatabase,
    AiEstimated,
    GenericEstimate,
}

impl MacroSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MacroSource::StaticTable => "static_table",
            MacroSource::NutritionDatabase => "nutrition_database",
            MacroSource::AiEstimated => "ai_estimated",
            MacroSource::GenericEstimate => "generic_estimate",
        }
    }
}

impl std::fmt::Display for MacroSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `results` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelResult {
    pub label: String,
    pub macros: ResolvedMacros,
    pub source: MacroSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<FoodComponent>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_record_scaled_is_linear() {
        let taco = MacroRecord::new(210.0, 9.0, 21.0, 10.0);
        let three = taco.scaled(3.0);
        assert_eq!(three, MacroRecord::new(630.0, 27.0, 63.0, 30.0));
    }

    #[test]
    fn test_macro_record_sum() {
        let a = MacroRecord::new(100.0, 1.0, 2.0, 3.0);
        let b = MacroRecord::new(50.5, 0.5, 0.5, 0.5);
        assert_eq!(
            MacroRecord::sum([&a, &b]),
            MacroRecord::new(150.5, 1.5, 2.5, 3.5)
        );
        assert_eq!(
            MacroRecord::sum(Vec::<&MacroRecord>::new()),
            MacroRecord::default()
        );
    }

    #[test]
    fn test_macro_record_sanitized() {
        let r = MacroRecord::new(-5.0, f64::NAN, 3.0, f64::INFINITY).sanitized();
        assert_eq!(r, MacroRecord::new(0.0, 0.0, 3.0, 0.0));
    }

    #[test]
    fn test_generic_estimate_values() {
        assert_eq!(
            MacroRecord::generic_estimate(),
            MacroRecord::new(250.0, 15.0, 25.0, 10.0)
        );
    }

    #[test]
    fn test_meal_estimate_total_is_sum_of_components() {
        let estimate = MealEstimate::from_components(vec![
            FoodComponent {
                name: "rice".into(),
                macros: MacroRecord::new(200.0, 4.0, 44.0, 0.5),
            },
            FoodComponent {
                name: "chicken".into(),
                macros: MacroRecord::new(300.0, 30.0, 0.0, 18.0),
            },
        ]);
        assert_eq!(estimate.total(), MacroRecord::new(500.0, 34.0, 44.0, 18.5));
        assert_eq!(estimate.components().len(), 2);
    }

    #[test]
    fn test_resolved_macros_serializes_flat() {
        let resolved = ResolvedMacros {
            macros: MacroRecord::new(630.0, 27.0, 63.0, 30.0),
            quantity: Some(3),
            base_item: Some("taco".into()),
        };
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["calories"], 630.0);
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["base_item"], "taco");

        let plain = serde_json::to_value(ResolvedMacros::plain(MacroRecord::default())).unwrap();
        assert!(plain.get("quantity").is_none());
        assert!(plain.get("base_item").is_none());
    }

    #[test]
    fn test_macro_source_serialization() {
        let json = serde_json::to_string(&MacroSource::NutritionDatabase).unwrap();
        assert_eq!(json, "\"nutrition_database\"");
        assert_eq!(MacroSource::AiEstimated.to_string(), "ai_estimated");
    }
}
