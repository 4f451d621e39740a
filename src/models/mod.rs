#[cfg(feature = "http-server")]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized output of one grocery-text analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub recognized_text: String,
    pub detected_items: Vec<DetectedItem>,
    pub nutritional_analysis: String,
    pub recipe_suggestions: Vec<String>,
    pub total_estimated_cost: f64,
    #[serde(default)]
    pub health_insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedItem {
    pub name: String,
    pub confidence: f64,       // 0.0 - 1.0
    pub estimated_cost: f64,   // USD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionFacts>,
}

impl DetectedItem {
    pub fn new(name: impl Into<String>, confidence: f64, estimated_cost: f64) -> Self {
        Self {
            name: name.into(),
            confidence,
            estimated_cost,
            category: None,
            nutritional_info: None,
        }
    }
}

/// Per-item nutrition facts. Every field is optional because the model may omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,  // gram
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
}

/// Which analyzer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Remote,
    Mock,
}

impl std::fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisSource::Remote => "remote",
            AnalysisSource::Mock => "mock",
        };
        write!(f, "{}", s)
    }
}

// Saved items, products and preferences are served by the HTTP API only

/// An item the user chose to keep from a scan.
#[cfg(feature = "http-server")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub id: u64,
    pub name: String,
    pub estimated_cost: f64,
    pub nutritional_info: Option<NutritionFacts>,
    pub scanned_text: String,
    pub saved_at: DateTime<Utc>,
}

/// Product record returned by barcode lookup.
#[cfg(feature = "http-server")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub nutrition: NutritionFacts,
}

#[cfg(feature = "http-server")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DietaryPreferences {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    pub keto: bool,
    pub low_carb: bool,
    pub allergies: String,
    pub currency: String,       // ISO code, "USD" by default
    pub default_store: String,
    pub recipe_notifications: bool,
    pub nutrition_reminders: bool,
    pub deal_notifications: bool,
}

#[cfg(feature = "http-server")]
impl Default for DietaryPreferences {
    fn default() -> Self {
        Self {
            vegetarian: false,
            vegan: false,
            gluten_free: false,
            dairy_free: false,
            keto: false,
            low_carb: false,
            allergies: String::new(),
            currency: "USD".to_string(),
            default_store: String::new(),
            recipe_notifications: true,
            nutrition_reminders: true,
            deal_notifications: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_result_serializes_camel_case() {
        let result = ScanResult {
            recognized_text: "milk".to_string(),
            detected_items: vec![DetectedItem::new("Milk", 0.92, 3.99)],
            nutritional_analysis: "Dairy".to_string(),
            recipe_suggestions: vec![],
            total_estimated_cost: 3.99,
            health_insights: vec![],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["recognizedText"], "milk");
        assert_eq!(json["detectedItems"][0]["estimatedCost"], 3.99);
        assert_eq!(json["totalEstimatedCost"], 3.99);
        // Mock items carry no category or nutrition
        assert!(json["detectedItems"][0].get("category").is_none());
        assert!(json["detectedItems"][0].get("nutritionalInfo").is_none());
    }

    #[test]
    fn test_nutrition_facts_keeps_omitted_fields_omitted() {
        let facts: NutritionFacts =
            serde_json::from_str(r#"{"calories": 105, "sugar": 14.4}"#).unwrap();
        assert_eq!(facts.calories, Some(105.0));
        assert_eq!(facts.protein, None);

        let json = serde_json::to_value(&facts).unwrap();
        assert_eq!(json, serde_json::json!({"calories": 105.0, "sugar": 14.4}));
    }

    #[cfg(feature = "http-server")]
    #[test]
    fn test_dietary_preferences_defaults() {
        let prefs: DietaryPreferences = serde_json::from_str(r#"{"vegan": true}"#).unwrap();
        assert!(prefs.vegan);
        assert_eq!(prefs.currency, "USD");
        assert!(prefs.recipe_notifications);
        assert!(!prefs.deal_notifications);
    }
}
