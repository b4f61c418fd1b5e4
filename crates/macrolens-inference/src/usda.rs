//! USDA FoodData Central nutrition database client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use macrolens_core::{defaults, Error, MacroRecord, NutritionDatabase, Result};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "USDA_API_KEY";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "USDA_BASE_URL";

const ENERGY: &[&str] = &["energy", "energy (kcal)"];
const PROTEIN: &str = "protein";
const CARBS: &str = "carbohydrate, by difference";
const FAT: &str = "total lipid (fat)";

/// Searches `/foods/search` and reads macros off the top hit.
pub struct UsdaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl UsdaClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::USDA_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::NutritionLookup(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Create from environment variables.
    /// Returns None if USDA_API_KEY is not set.
    pub fn from_env() -> Option<Result<Self>> {
        let api_key = std::env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty())?;
        let base_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| defaults::USDA_URL.to_string());
        Some(Self::new(base_url, api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl NutritionDatabase for UsdaClient {
    async fn search_macros(&self, query: &str) -> Result<Option<MacroRecord>> {
        let start = Instant::now();
        let url = format!("{}/foods/search", self.base_url.trim_end_matches('/'));

        let mut params: Vec<(&str, &str)> = vec![
            ("api_key", self.api_key.as_str()),
            ("query", query),
            ("pageSize", "1"),
        ];
        params.extend(defaults::USDA_DATA_TYPES.iter().map(|t| ("dataType", *t)));

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::NutritionLookup(format!("USDA request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::NutritionLookup(format!(
                "USDA returned {}: {}",
                status, body
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::NutritionLookup(format!("Failed to parse USDA response: {}", e)))?;

        let record = body.foods.first().map(FoodItem::macros);
        debug!(
            subsystem = "inference",
            component = "usda",
            op = "search_macros",
            label = query,
            result_count = body.foods.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "USDA search complete"
        );
        Ok(record)
    }

    fn name(&self) -> &str {
        "usda"
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodItem {
    #[serde(default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodNutrient {
    #[serde(default)]
    nutrient_name: String,
    #[serde(default)]
    unit_name: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

impl FoodItem {
    /// Missing nutrients read as zero. Energy reported in kJ is ignored.
    fn macros(&self) -> MacroRecord {
        let find = |names: &[&str]| -> f64 {
            self.food_nutrients
                .iter()
                .filter(|n| names.contains(&n.nutrient_name.to_lowercase().as_str()))
                .filter(|n| {
                    !n.unit_name
                        .as_deref()
                        .is_some_and(|u| u.eq_ignore_ascii_case("kj"))
                })
                .find_map(|n| n.value)
                .unwrap_or(0.0)
        };

        MacroRecord::new(find(ENERGY), find(&[PROTEIN]), find(&[CARBS]), find(&[FAT])).sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_item_macros() {
        let json = r#"{
            "foodNutrients": [
                {"nutrientName": "Energy", "unitName": "kJ", "value": 1113},
                {"nutrientName": "Energy", "unitName": "KCAL", "value": 266},
                {"nutrientName": "Protein", "unitName": "G", "value": 11.4},
                {"nutrientName": "Carbohydrate, by difference", "unitName": "G", "value": 33.3},
                {"nutrientName": "Total lipid (fat)", "unitName": "G", "value": 9.69}
            ]
        }"#;
        let item: FoodItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.macros(), MacroRecord::new(266.0, 11.4, 33.3, 9.69));
    }

    #[test]
    fn test_missing_nutrients_are_zero() {
        let json = r#"{"foodNutrients": [{"nutrientName": "Energy (kcal)", "value": 52}]}"#;
        let item: FoodItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.macros(), MacroRecord::new(52.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_search_response() {
        let body: SearchResponse = serde_json::from_str(r#"{"totalHits": 0}"#).unwrap();
        assert!(body.foods.is_empty());
    }
}
