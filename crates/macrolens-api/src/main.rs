//! macrolens-api - HTTP API server for macrolens

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use macrolens_api::config::ServerConfig;
use macrolens_api::services::{FoodAnalyzer, ResponseCache};
use macrolens_api::{router, AppState};
use macrolens_core::{
    LabelDetector, LabelNormalizer, MacroEstimator, MacroResolver, NutritionDatabase, SynonymTable,
};
use macrolens_inference::{
    vision_backend_from_env, GoogleVisionDetector, LlmMacroEstimator, UsdaClient, VisionBackend,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "macrolens_api=debug,macrolens_inference=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("macrolens-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env()?;

    // Label detector: always constructed, fails per request when unconfigured
    let detector = GoogleVisionDetector::from_env()?;
    if !detector.is_configured() {
        warn!("GOOGLE_VISION_API_KEY not set; image analysis will report a configuration error");
    }
    let detector: Arc<dyn LabelDetector> = Arc::new(detector);

    // Nutrition database: optional
    let database: Option<Arc<dyn NutritionDatabase>> = match UsdaClient::from_env() {
        Some(client) => {
            let client = client?;
            info!(base_url = client.base_url(), "USDA nutrition database enabled");
            Some(Arc::new(client))
        }
        None => {
            warn!("USDA_API_KEY not set; nutrition database stage disabled");
            None
        }
    };

    // Vision LLM: optional
    let estimator: Option<Arc<dyn MacroEstimator>> = match vision_backend_from_env()? {
        Some(backend) => {
            info!(model = backend.model_name(), "Vision LLM estimator enabled");
            Some(Arc::new(LlmMacroEstimator::new(backend)))
        }
        None => {
            warn!("No vision LLM configured; AI estimate stage disabled");
            None
        }
    };

    let synonyms = SynonymTable::builtin().with_strategy(config.synonym_strategy);
    let analyzer = FoodAnalyzer::new(detector)
        .with_resolver(MacroResolver::new(LabelNormalizer::new(synonyms)))
        .with_database(database)
        .with_estimator(estimator)
        .with_cache(ResponseCache::new(config.response_cache_size))
        .with_budget(config.analysis_budget);

    let state = AppState::new(analyzer).with_rate_limit(config.rate_limit);
    let app = router(state, &config);

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        address = %addr,
        rate_limit = config.rate_limit.is_some(),
        response_cache_size = config.response_cache_size,
        analysis_budget_secs = config.analysis_budget.as_secs(),
        synonym_strategy = ?config.synonym_strategy,
        "macrolens-api listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
