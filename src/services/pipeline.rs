use serde::Serialize;
use std::sync::Arc;

use super::ai_service::{AnalysisError, ApiKey, GroceryAnalysis, RemoteAnalyzer};
use super::mock_analyzer::mock_analyze;
use crate::models::{AnalysisSource, DetectedItem, ScanResult};

/// Result of one pipeline run. `result` is always populated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub result: ScanResult,
    pub source: AnalysisSource,
    /// Set when a remote attempt was made and failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<AnalysisError>,
}

/// Picks the remote analyzer when a credential is given, otherwise (or on
/// any remote failure) the deterministic mock analyzer.
pub struct AnalysisPipeline {
    remote: Arc<dyn RemoteAnalyzer>,
}

impl AnalysisPipeline {
    pub fn new(remote: Arc<dyn RemoteAnalyzer>) -> Self {
        Self { remote }
    }

    /// Never fails. At most one remote call, none without a credential.
    pub async fn analyze(&self, text: &str, credential: Option<&ApiKey>) -> AnalysisOutcome {
        let Some(credential) = credential else {
            log::debug!("🔑 No API key configured, using mock analyzer");
            return AnalysisOutcome {
                result: mock_analyze(text),
                source: AnalysisSource::Mock,
                fallback: None,
            };
        };

        let reply = self
            .remote
            .analyze_grocery_text(credential, text)
            .await
            .and_then(|analysis| {
                if analysis.detected_items.is_empty() {
                    Err(AnalysisError::InvalidResponse(
                        "model returned no detected items".to_string(),
                    ))
                } else {
                    Ok(analysis)
                }
            });

        match reply {
            Ok(analysis) => AnalysisOutcome {
                result: into_scan_result(analysis, text),
                source: AnalysisSource::Remote,
                fallback: None,
            },
            Err(e) => {
                log::warn!("⚠️ Remote analysis failed, falling back to mock analyzer: {}", e);
                AnalysisOutcome {
                    result: mock_analyze(text),
                    source: AnalysisSource::Mock,
                    fallback: Some(e),
                }
            }
        }
    }
}

/// Map the model's reply into a `ScanResult` for `original_text`.
pub fn into_scan_result(analysis: GroceryAnalysis, original_text: &str) -> ScanResult {
    let detected_items: Vec<DetectedItem> = analysis
        .detected_items
        .into_iter()
        .map(|item| DetectedItem {
            name: item.name,
            confidence: item.confidence.clamp(0.0, 1.0),
            estimated_cost: item.estimated_cost.max(0.0),
            category: item.category,
            nutritional_info: item.nutritional_info,
        })
        .collect();

    let total_estimated_cost = analysis
        .total_estimated_cost
        .map(|total| total.max(0.0))
        .unwrap_or_else(|| detected_items.iter().map(|i| i.estimated_cost).sum());

    ScanResult {
        recognized_text: original_text.to_string(),
        detected_items,
        nutritional_analysis: analysis.nutritional_analysis,
        recipe_suggestions: analysis.recipe_suggestions,
        total_estimated_cost,
        health_insights: analysis.health_insights,
    }
}
