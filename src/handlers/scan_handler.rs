use anyhow::Result;
use std::fmt::Write as _;
use std::sync::Arc;

#[cfg(feature = "http-server")]
use chrono::Utc;
#[cfg(feature = "http-server")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "http-server")]
use tokio::sync::RwLock;

#[cfg(feature = "http-server")]
use crate::models::GroceryItem;

use crate::models::{AnalysisSource, ScanResult};
use crate::services::{AnalysisOutcome, AnalysisPipeline, SettingsStore};

pub struct ScanHandler {
    pipeline: Arc<AnalysisPipeline>,
    settings: Arc<SettingsStore>,
    // Saved items are only reachable through the HTTP API
    #[cfg(feature = "http-server")]
    saved_items: RwLock<Vec<GroceryItem>>,
    #[cfg(feature = "http-server")]
    next_item_id: AtomicU64,
}

impl ScanHandler {
    pub fn new(pipeline: Arc<AnalysisPipeline>, settings: Arc<SettingsStore>) -> Self {
        Self {
            pipeline,
            settings,
            #[cfg(feature = "http-server")]
            saved_items: RwLock::new(Vec::new()),
            #[cfg(feature = "http-server")]
            next_item_id: AtomicU64::new(1),
        }
    }

    /// Analyze OCR text. The credential is read from settings on every call,
    /// so a key saved through the settings API takes effect immediately.
    pub async fn scan_text(&self, text: &str) -> Result<AnalysisOutcome> {
        if text.trim().is_empty() {
            anyhow::bail!("Recognized text is empty");
        }

        log::info!("🧾 Scan received: {} chars", text.chars().count());

        let credential = self.settings.api_key().await;
        let outcome = self.pipeline.analyze(text, credential.as_ref()).await;

        match (&outcome.source, &outcome.fallback) {
            (AnalysisSource::Mock, Some(reason)) => {
                log::warn!("⚠️ Scan served by mock analyzer after remote failure: {}", reason)
            }
            (source, _) => log::info!(
                "✅ Scan analyzed ({}): {} items, ${:.2}",
                source,
                outcome.result.detected_items.len(),
                outcome.result.total_estimated_cost
            ),
        }

        Ok(outcome)
    }
}

#[cfg(feature = "http-server")]
impl ScanHandler {
    /// Keep the named items from `result`. An empty `names` keeps every item.
    /// Returns the newly saved entries.
    pub async fn save_items(&self, result: &ScanResult, names: &[String]) -> Vec<GroceryItem> {
        let now = Utc::now();
        let new_items: Vec<GroceryItem> = result
            .detected_items
            .iter()
            .filter(|item| {
                names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(&item.name))
            })
            .map(|item| GroceryItem {
                id: self.next_item_id.fetch_add(1, Ordering::SeqCst),
                name: item.name.clone(),
                estimated_cost: item.estimated_cost,
                nutritional_info: item.nutritional_info.clone(),
                scanned_text: result.recognized_text.clone(),
                saved_at: now,
            })
            .collect();

        // Newest first
        let mut saved = self.saved_items.write().await;
        for item in new_items.iter().rev() {
            saved.insert(0, item.clone());
        }
        log::info!("💾 Saved {} items ({} total)", new_items.len(), saved.len());

        new_items
    }

    pub async fn saved_items(&self) -> Vec<GroceryItem> {
        self.saved_items.read().await.clone()
    }

    pub async fn clear_saved_items(&self) -> usize {
        let mut saved = self.saved_items.write().await;
        let count = saved.len();
        saved.clear();
        count
    }
}

/// Plain-text rendering of the items, nutrition and recipe views.
pub fn format_report(result: &ScanResult) -> String {
    let mut report = String::new();

    let _ = writeln!(report, "🛒 Detected Items ({})", result.detected_items.len());
    for item in &result.detected_items {
        let _ = write!(
            report,
            "  • {} - ${:.2} ({:.0}% confidence)",
            item.name,
            item.estimated_cost,
            item.confidence * 100.0
        );
        if let Some(category) = &item.category {
            let _ = write!(report, " [{}]", category);
        }
        report.push('\n');

        if let Some(facts) = &item.nutritional_info {
            let parts: Vec<String> = [
                ("kcal", facts.calories),
                ("g protein", facts.protein),
                ("g carbs", facts.carbs),
                ("g fat", facts.fat),
                ("g fiber", facts.fiber),
                ("g sugar", facts.sugar),
            ]
            .iter()
            .filter_map(|(unit, value)| value.map(|v| format!("{:.1} {}", v, unit)))
            .collect();
            if !parts.is_empty() {
                let _ = writeln!(report, "    {}", parts.join(", "));
            }
        }
    }
    let _ = writeln!(report, "💰 Total: ${:.2}", result.total_estimated_cost);

    let _ = writeln!(report, "\n🥗 Nutrition\n  {}", result.nutritional_analysis);
    for insight in &result.health_insights {
        let _ = writeln!(report, "  💡 {}", insight);
    }

    let _ = writeln!(report, "\n👨‍🍳 Recipe Ideas");
    for (i, recipe) in result.recipe_suggestions.iter().enumerate() {
        let _ = writeln!(report, "  {}. {}", i + 1, recipe);
    }

    report.trim_end().to_string()
}
