use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NutritionFacts;

/// Settings key holding the chat-completion API credential.
pub const API_KEY_SETTING: &str = "openai_api_key";

/// Opaque API credential. Debug output never reveals the token.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Empty or whitespace-only values mean "no credential".
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Why a remote analysis did not produce a usable result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum AnalysisError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
    #[error("Network error occurred: {0}")]
    Network(String),
    #[error("Failed to decode response: {0}")]
    Decoding(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AnalysisError::Decoding(e.to_string())
        } else {
            AnalysisError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Decoding(e.to_string())
    }
}

/// Structured analysis the model is asked to return as its message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryAnalysis {
    pub detected_items: Vec<AnalyzedItem>,
    pub nutritional_analysis: String,
    pub recipe_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_estimated_cost: Option<f64>,
    #[serde(default)]
    pub health_insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedItem {
    pub name: String,
    pub confidence: f64,
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionFacts>,
}

/// Language-model backed grocery analysis (OpenAI, OpenRouter, etc.)
#[async_trait::async_trait]
pub trait RemoteAnalyzer: Send + Sync {
    async fn analyze_grocery_text(
        &self,
        credential: &ApiKey,
        text: &str,
    ) -> Result<GroceryAnalysis, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_blank_is_absent() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   \n").is_none());
        assert_eq!(ApiKey::new(" sk-test ").unwrap().expose(), "sk-test");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }

    #[test]
    fn test_analysis_error_serializes_kind() {
        let err = AnalysisError::Decoding("expected value".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "decoding");
        assert_eq!(json["detail"], "expected value");
    }
}
