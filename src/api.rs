use serde::{Deserialize, Serialize};

use crate::models::{DietaryPreferences, ScanResult};

/// Body of `POST /api/scan` and `POST /api/scan/report`
#[derive(Debug, Deserialize, Serialize)]
pub struct ScanRequest {
    pub text: String,
}

/// Body of `POST /api/items`
#[derive(Debug, Deserialize, Serialize)]
pub struct SaveItemsRequest {
    pub result: ScanResult,
    /// Item names to keep; empty keeps everything
    #[serde(default)]
    pub names: Vec<String>,
}

/// Settings as exposed over HTTP. The credential itself is never returned.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub api_key_configured: bool,
    pub notifications_enabled: bool,
    pub dietary_preferences: DietaryPreferences,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    /// Blank string clears the key
    pub api_key: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub dietary_preferences: Option<DietaryPreferences>,
}

// Axum integration
pub mod server {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;
    use tower_http::cors::CorsLayer;

    use crate::handlers::{format_report, ScanHandler};
    use crate::models::{GroceryItem, ProductInfo};
    use crate::services::{AnalysisOutcome, BarcodeService, SettingsStore};

    pub struct AppState {
        pub scan_handler: Arc<ScanHandler>,
        pub settings: Arc<SettingsStore>,
        pub barcode: BarcodeService,
    }

    type ApiError = (StatusCode, String);

    pub fn create_router(scan_handler: Arc<ScanHandler>, settings: Arc<SettingsStore>) -> Router {
        let state = Arc::new(AppState {
            scan_handler,
            settings,
            barcode: BarcodeService::new(),
        });

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/api/scan", post(scan))
            .route("/api/scan/report", post(scan_report))
            .route("/api/items", get(list_items).post(save_items).delete(clear_items))
            .route("/api/barcode/:code", get(lookup_barcode))
            .route(
                "/api/settings",
                get(get_settings).put(update_settings).delete(clear_settings),
            )
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    async fn scan(
        State(state): State<Arc<AppState>>,
        Json(request): Json<ScanRequest>,
    ) -> Result<Json<AnalysisOutcome>, ApiError> {
        let outcome = state
            .scan_handler
            .scan_text(&request.text)
            .await
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

        Ok(Json(outcome))
    }

    async fn scan_report(
        State(state): State<Arc<AppState>>,
        Json(request): Json<ScanRequest>,
    ) -> Result<String, ApiError> {
        let outcome = state
            .scan_handler
            .scan_text(&request.text)
            .await
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

        Ok(format_report(&outcome.result))
    }

    async fn list_items(State(state): State<Arc<AppState>>) -> Json<Vec<GroceryItem>> {
        Json(state.scan_handler.saved_items().await)
    }

    async fn save_items(
        State(state): State<Arc<AppState>>,
        Json(request): Json<SaveItemsRequest>,
    ) -> (StatusCode, Json<Vec<GroceryItem>>) {
        let saved = state
            .scan_handler
            .save_items(&request.result, &request.names)
            .await;
        (StatusCode::CREATED, Json(saved))
    }

    async fn clear_items(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
        let removed = state.scan_handler.clear_saved_items().await;
        Json(serde_json::json!({ "removed": removed }))
    }

    async fn lookup_barcode(
        State(state): State<Arc<AppState>>,
        Path(code): Path<String>,
    ) -> Result<Json<ProductInfo>, StatusCode> {
        state
            .barcode
            .lookup_product(&code)
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn settings_view(settings: &SettingsStore) -> SettingsView {
        SettingsView {
            api_key_configured: settings.api_key().await.is_some(),
            notifications_enabled: settings.notifications_enabled().await,
            dietary_preferences: settings.dietary_preferences().await,
        }
    }

    async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsView> {
        Json(settings_view(&state.settings).await)
    }

    async fn update_settings(
        State(state): State<Arc<AppState>>,
        Json(update): Json<SettingsUpdate>,
    ) -> Result<Json<SettingsView>, ApiError> {
        let internal = |e: anyhow::Error| {
            log::error!("❌ Failed to save settings: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save settings".to_string())
        };

        if let Some(api_key) = &update.api_key {
            state.settings.set_api_key(api_key).await.map_err(internal)?;
            let action = if api_key.trim().is_empty() { "cleared" } else { "updated" };
            log::info!("🔑 API key {}", action);
        }
        if let Some(enabled) = update.notifications_enabled {
            state
                .settings
                .set(crate::services::settings::NOTIFICATIONS_SETTING, enabled)
                .await
                .map_err(internal)?;
        }
        if let Some(prefs) = &update.dietary_preferences {
            state
                .settings
                .save_dietary_preferences(prefs)
                .await
                .map_err(internal)?;
        }

        Ok(Json(settings_view(&state.settings).await))
    }

    async fn clear_settings(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
        state.settings.clear_all_data().await.map_err(|e| {
            log::error!("❌ Failed to clear settings: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear settings".to_string())
        })?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn root_handler() -> &'static str {
        "Grocery Scanner API - POST recognized text to /api/scan"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

}
