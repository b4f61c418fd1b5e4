//! End-to-end tests for the HTTP API.
//!
//! Each test serves the real router on an ephemeral port with in-process
//! collaborator doubles and drives it over HTTP.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use macrolens_api::config::{RateLimitConfig, ServerConfig};
use macrolens_api::services::{FoodAnalyzer, ResponseCache};
use macrolens_api::{router, AppState};
use macrolens_core::MacroRecord;
use macrolens_inference::mock::{
    MockFailure, MockLabelDetector, MockMacroEstimator, MockNutritionDatabase,
};

/// Smallest byte string `infer` recognizes as a PNG.
const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

async fn spawn_with(state: AppState, config: ServerConfig) -> String {
    let app = router(state, &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_app(analyzer: FoodAnalyzer) -> String {
    spawn_with(AppState::new(analyzer), ServerConfig::default()).await
}

fn image_form(field: &str, bytes: &[u8]) -> Form {
    Form::new().part(
        field.to_string(),
        Part::bytes(bytes.to_vec())
            .file_name("plate.png")
            .mime_str("image/png")
            .unwrap(),
    )
}

async fn post_image(base: &str, path: &str, bytes: &[u8]) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .multipart(image_form("file", bytes))
        .send()
        .await
        .unwrap()
}

fn three_tacos() -> MockLabelDetector {
    MockLabelDetector::new()
        .with_object("Taco", 0.91)
        .with_object("Taco", 0.89)
        .with_object("Taco", 0.87)
        .with_label("Food", 0.97)
}

#[tokio::test]
async fn test_unknown_food_gets_generic_estimate() {
    let detector = MockLabelDetector::new().with_label("Pad Thai", 0.9);
    let analyzer = FoodAnalyzer::new(Arc::new(detector))
        .with_database(Some(Arc::new(MockNutritionDatabase::new())))
        .with_estimator(Some(Arc::new(MockMacroEstimator::new())));
    let base = spawn_app(analyzer).await;

    let resp = post_image(&base, "/api/analyze-image", PNG).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["success"], true);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["label"], "pad thai");
    assert_eq!(results[0]["source"], "generic_estimate");
    assert_eq!(results[0]["macros"]["calories"].as_f64(), Some(250.0));
    assert_eq!(results[0]["macros"]["protein"].as_f64(), Some(15.0));
    assert_eq!(
        results[0]["summary"],
        "Could not find nutritional information for pad thai."
    );
    assert_eq!(body["candidates"][0]["label"], "pad thai");
    assert_eq!(body["candidates"][0]["confidence"].as_f64(), Some(90.0));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_alias_route_scales_counted_objects() {
    let base = spawn_app(FoodAnalyzer::new(Arc::new(three_tacos()))).await;

    let resp = post_image(&base, "/analyze", PNG).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    let result = &body["results"][0];
    assert_eq!(result["label"], "3 tacos");
    assert_eq!(result["source"], "static_table");
    assert_eq!(result["macros"]["calories"].as_f64(), Some(630.0));
    assert_eq!(result["macros"]["quantity"], 3);
    assert_eq!(result["macros"]["base_item"], "taco");
}

#[tokio::test]
async fn test_unconfigured_detector_reports_configuration_error() {
    let detector = MockLabelDetector::new().with_failure(MockFailure::Config("no key".into()));
    let base = spawn_app(FoodAnalyzer::new(Arc::new(detector))).await;

    let resp = post_image(&base, "/api/analyze-image", PNG).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Google Vision API is not configured properly. Please check server credentials."
    );
    assert!(body.get("results").is_none());
}

#[tokio::test]
async fn test_detector_failure_is_reported() {
    let detector =
        MockLabelDetector::new().with_failure(MockFailure::Upstream("quota exceeded".into()));
    let base = spawn_app(FoodAnalyzer::new(Arc::new(detector))).await;

    let body: Value = post_image(&base, "/api/analyze-image", PNG)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error analyzing food: "));
    assert!(error.contains("quota exceeded"));
}

#[tokio::test]
async fn test_vision_llm_estimate_carries_components() {
    let detector = MockLabelDetector::new().with_label("Bibimbap bowl", 0.92);
    let estimator = MockMacroEstimator::new()
        .with_component("rice", MacroRecord::new(300.0, 6.0, 65.0, 1.0))
        .with_component("egg", MacroRecord::new(90.0, 6.0, 1.0, 7.0));
    let analyzer =
        FoodAnalyzer::new(Arc::new(detector)).with_estimator(Some(Arc::new(estimator.clone())));
    let base = spawn_app(analyzer).await;

    let body: Value = post_image(&base, "/api/analyze-image", PNG)
        .await
        .json()
        .await
        .unwrap();
    let result = &body["results"][0];
    assert_eq!(result["source"], "ai_estimated");
    assert_eq!(result["macros"]["calories"].as_f64(), Some(390.0));
    assert_eq!(result["components"].as_array().unwrap().len(), 2);
    assert_eq!(result["components"][1]["name"], "egg");
    assert_eq!(estimator.calls(), vec!["bibimbap bowl"]);
}

#[tokio::test]
async fn test_repeat_upload_uses_response_cache() {
    let detector = MockLabelDetector::new().with_label("Kimchi jjigae", 0.9);
    let db = MockNutritionDatabase::new()
        .with_record("kimchi jjigae", MacroRecord::new(60.0, 4.0, 5.0, 2.0));
    let analyzer = FoodAnalyzer::new(Arc::new(detector))
        .with_database(Some(Arc::new(db.clone())))
        .with_cache(ResponseCache::new(16));
    let base = spawn_app(analyzer).await;

    for _ in 0..2 {
        let body: Value = post_image(&base, "/api/analyze-image", PNG)
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(body["results"][0]["source"], "nutrition_database");
    }
    assert_eq!(db.calls().len(), 1);
}

#[tokio::test]
async fn test_food_detection_route() {
    let base = spawn_app(FoodAnalyzer::new(Arc::new(three_tacos()))).await;

    let resp = post_image(&base, "/test-food-detection", PNG).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detected_labels"], serde_json::json!(["3 tacos"]));
}

#[tokio::test]
async fn test_food_detection_failure_is_500() {
    let detector = MockLabelDetector::new().with_failure(MockFailure::Upstream("boom".into()));
    let base = spawn_app(FoodAnalyzer::new(Arc::new(detector))).await;

    let resp = post_image(&base, "/test-food-detection", PNG).await;
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Error detecting food: "));
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let detector = MockLabelDetector::new().with_label("Pizza", 0.9);
    let base = spawn_app(FoodAnalyzer::new(Arc::new(detector.clone()))).await;

    let resp = post_image(&base, "/api/analyze-image", b"just some text").await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not an image"));
    assert_eq!(detector.call_count(), 0);
}

#[tokio::test]
async fn test_upload_field_names() {
    let base = spawn_app(FoodAnalyzer::new(Arc::new(three_tacos()))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/analyze-image", base))
        .multipart(image_form("image", PNG))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/api/analyze-image", base))
        .multipart(image_form("photo", PNG))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing file in multipart form");
}

#[tokio::test]
async fn test_macros_route() {
    let db =
        MockNutritionDatabase::new().with_record("kimchi", MacroRecord::new(15.0, 1.1, 2.4, 0.5));
    let analyzer = FoodAnalyzer::new(Arc::new(MockLabelDetector::new()))
        .with_database(Some(Arc::new(db)));
    let base = spawn_app(analyzer).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/api/macros", base))
        .query(&[("label", "3 tacos")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["source"], "static_table");
    assert_eq!(body["macros"]["calories"].as_f64(), Some(630.0));

    let body: Value = client
        .get(format!("{}/api/macros", base))
        .query(&[("label", "Kimchi")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["source"], "nutrition_database");
    assert_eq!(body["macros"]["calories"].as_f64(), Some(15.0));

    let resp = client
        .get(format!("{}/api/macros?label=%20", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_health_reports_collaborators() {
    let analyzer = FoodAnalyzer::new(Arc::new(MockLabelDetector::new()))
        .with_database(Some(Arc::new(MockNutritionDatabase::new())));
    let base = spawn_app(analyzer).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["collaborators"]["label_detector"], true);
    assert_eq!(body["collaborators"]["nutrition_database"], true);
    assert_eq!(body["collaborators"]["vision_llm"], false);
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let limit = RateLimitConfig {
        requests: NonZeroU32::new(1).unwrap(),
        period: Duration::from_secs(3600),
    };
    let state = AppState::new(FoodAnalyzer::new(Arc::new(MockLabelDetector::new())))
        .with_rate_limit(Some(limit));
    let base = spawn_with(state, ServerConfig::default()).await;

    let first = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(first.status(), 200);

    let second = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(second.status(), 429);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "rate_limit_exceeded");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..Default::default()
    };
    let state = AppState::new(FoodAnalyzer::new(Arc::new(three_tacos())));
    let base = spawn_with(state, config).await;

    let mut big = PNG.to_vec();
    big.resize(8 * 1024, 0);
    let resp = post_image(&base, "/api/analyze-image", &big).await;
    assert!(resp.status().is_client_error());
}
