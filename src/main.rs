#[cfg(feature = "http-server")]
mod api; // HTTP API
mod config;
mod handlers;
mod models;
mod services;

#[cfg(feature = "http-server")]
use api::server::create_router;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::AppConfig;
use handlers::ScanHandler;
use services::{AnalysisPipeline, OpenAiService, SettingsStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Grocery Scanner...");

    let config = AppConfig::from_env()?;

    let settings = Arc::new(SettingsStore::load(&config.settings_path).await?);
    log::info!("✅ Settings loaded from {}", settings.path().display());

    // Seed the key from the environment only when none has been saved yet
    if let Some(env_key) = &config.openai_api_key {
        if settings.api_key().await.is_none() {
            settings.set_api_key(env_key.expose()).await?;
            log::info!("🔑 API key seeded from OPENAI_API_KEY");
        }
    }

    if settings.api_key().await.is_some() {
        log::info!("🔑 API key configured, remote analysis enabled");
    } else {
        log::warn!("⚠️ No API key configured, scans will use the offline mock analyzer");
    }

    let openai = Arc::new(OpenAiService::new(config.openai.clone())?);
    log::info!(
        "✅ Chat completion client initialized with model: {} (timeout {}s)",
        openai.model(),
        config.openai.timeout.as_secs()
    );

    let pipeline = Arc::new(AnalysisPipeline::new(openai));
    let scan_handler = Arc::new(ScanHandler::new(pipeline, settings.clone()));
    log::info!("✅ Scan handler initialized");

    #[cfg(feature = "http-server")]
    {
        let app = create_router(scan_handler.clone(), settings.clone());

        let listener = tokio::net::TcpListener::bind(&config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
        log::info!("🌐 HTTP server listening on {}", config.bind_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                log::info!("🛑 Shutting down...");
            })
            .await
            .context("HTTP server error")?;
    }

    #[cfg(not(feature = "http-server"))]
    {
        // Without the HTTP API, analyze stdin once and print the report
        use tokio::io::AsyncReadExt;

        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read recognized text from stdin")?;

        let outcome = scan_handler.scan_text(&text).await?;
        println!("{}", handlers::format_report(&outcome.result));
    }

    Ok(())
}
