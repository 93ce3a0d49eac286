//! End-to-end tests driving the router against a mock geo service.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::GenericImageView;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use tower::ServiceExt;

use earth_engine::StatLayer;
use earth_engine::SnapshotStats;
use geo_common::UrbanError;
use test_utils::{create_stat_records, MockCall, MockGeoService, StaticDir};
use urban_api::config::ServiceConfig;
use urban_api::pipeline::PipelineMode;
use urban_api::response::PNG_DATA_URI_PREFIX;
use urban_api::state::AppState;

// ============================================================================
// Helpers
// ============================================================================

struct TestApp {
    router: Router,
    mock: Arc<MockGeoService>,
    static_dir: StaticDir,
}

fn test_app(mock: MockGeoService, configure: impl FnOnce(&mut ServiceConfig)) -> TestApp {
    let static_dir = StaticDir::new();
    std::fs::write(static_dir.path().join("index.html"), "<html>map</html>").unwrap();

    let mut config = ServiceConfig {
        static_dir: static_dir.path(),
        template_dir: static_dir.path(),
        ..Default::default()
    };
    configure(&mut config);

    let mock = Arc::new(mock);
    let state = Arc::new(AppState::new(mock.clone(), config));
    let handle = PrometheusBuilder::new().build_recorder().handle();

    TestApp {
        router: urban_api::build_router(state, handle),
        mock,
        static_dir,
    }
}

fn default_app() -> TestApp {
    test_app(MockGeoService::new(), |_| {})
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn post_process(router: &Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

// ============================================================================
// Land cover
// ============================================================================

#[tokio::test]
async fn test_process_writes_landcover_png() {
    let app = default_app();
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::OK);
    let landcover = json["landcover"].as_str().unwrap();
    assert!(landcover.starts_with("static/exports/landcover-"));
    assert!(landcover.ends_with(".png"));

    let on_disk = app
        .static_dir
        .path()
        .join(landcover.trim_start_matches("static/"));
    assert!(on_disk.exists());
    assert!(image::open(&on_disk).is_ok());

    // landcover_only carries nothing else
    assert_eq!(json.as_object().unwrap().len(), 1);
    assert_eq!(app.mock.calls(), vec![MockCall::Landcover]);
}

#[tokio::test]
async fn test_png_keeps_raster_dimensions() {
    let app = test_app(MockGeoService::new().with_landcover_size(5, 3), |_| {});
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::OK);
    let landcover = json["landcover"].as_str().unwrap();
    let on_disk = app
        .static_dir
        .path()
        .join(landcover.trim_start_matches("static/"));
    assert_eq!(image::open(&on_disk).unwrap().dimensions(), (5, 3));
}

#[tokio::test]
async fn test_exported_file_is_served() {
    let app = default_app();
    let (_, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;
    let landcover = json["landcover"].as_str().unwrap();

    let (status, bytes) = get(&app.router, &format!("/{}", landcover)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_tif_export_when_conversion_disabled() {
    let app = test_app(MockGeoService::new(), |c| c.export.convert_to_png = false);
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["landcover"].as_str().unwrap().ends_with(".tif"));
    let files = app.static_dir.exported_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".tif"));
}

#[tokio::test]
async fn test_requests_do_not_share_files() {
    let app = default_app();
    let (_, first) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;
    let (_, second) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_ne!(first["landcover"], second["landcover"]);
    // one .tif and one .png per request
    assert_eq!(app.static_dir.exported_files().len(), 4);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_bounds_is_bad_request() {
    let app = default_app();
    let (status, json) = post_process(&app.router, r#"{"region": [0, 0, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "validation");
    assert!(json["error"].as_str().unwrap().contains("bounds"));
    assert!(app.mock.calls().is_empty());
}

#[tokio::test]
async fn test_reversed_bounds_is_bad_request() {
    let app = default_app();
    let (status, json) = post_process(&app.router, r#"{"bounds": [10, 0, 5, 5]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "validation");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = default_app();
    let (status, json) = post_process(&app.router, "{bounds: nope").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "validation");
}

// ============================================================================
// Statistics modes
// ============================================================================

#[tokio::test]
async fn test_snapshot_mode_returns_charts() {
    let app = test_app(MockGeoService::new(), |c| {
        c.default_mode = PipelineMode::LandcoverPlusSnapshotStats
    });
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::OK);
    for key in ["pop_graph", "built_graph"] {
        let uri = json[key].as_str().unwrap();
        let encoded = uri.strip_prefix(PNG_DATA_URI_PREFIX).unwrap();
        let png = STANDARD.decode(encoded).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
    assert!(json.get("population_data").is_none());
}

#[tokio::test]
async fn test_time_series_mode() {
    let app = default_app();
    let (status, json) = post_process(
        &app.router,
        r#"{"bounds": [-1, -1, 1, 1], "mode": "time_series"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let pop = &json["population_data"];
    assert_eq!(pop["date"], serde_json::json!(["1980-01-01", "1985-01-01"]));
    assert_eq!(pop["pop"], serde_json::json!([20.0, 15.0]));
    assert_eq!(pop["change"], serde_json::json!([100.0, -25.0]));

    let built = &json["built_area_data"];
    assert_eq!(built["area"], serde_json::json!([150.0, 150.0]));
    assert_eq!(built["change"], serde_json::json!([50.0, 0.0]));

    assert_eq!(
        app.mock.calls(),
        vec![
            MockCall::Landcover,
            MockCall::Series(StatLayer::Population),
            MockCall::Series(StatLayer::BuiltUp),
        ]
    );
}

#[tokio::test]
async fn test_empty_series_is_not_found() {
    let mock = MockGeoService::new().with_series(StatLayer::Population, Ok(Vec::new()));
    let app = test_app(mock, |c| c.default_mode = PipelineMode::LandcoverPlusTimeSeries);
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "empty_series");
    assert!(json["error"].as_str().unwrap().contains("population"));
}

#[tokio::test]
async fn test_all_zero_built_series_is_not_found() {
    let records = create_stat_records(1975, &[Some(0.0), Some(0.0), Some(0.0)]);
    let mock = MockGeoService::new().with_series(StatLayer::BuiltUp, Ok(records));
    let app = test_app(mock, |c| c.default_mode = PipelineMode::LandcoverPlusTimeSeries);
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "empty_series");
    assert_eq!(
        json["error"],
        "No data available for the selected region: \
         built-up area: no change computable from 3 valid observations"
    );
}

// ============================================================================
// Upstream failures
// ============================================================================

#[tokio::test]
async fn test_export_failure() {
    let mock = MockGeoService::new()
        .with_landcover_error(UrbanError::Export("computePixels: quota exceeded".to_string()));
    let app = test_app(mock, |_| {});
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["kind"], "export");
    assert!(app.static_dir.exported_files().is_empty());
}

#[tokio::test]
async fn test_data_fetch_failure_is_distinct_from_export() {
    let mock = MockGeoService::new().with_snapshot(
        StatLayer::BuiltUp,
        Err(UrbanError::DataFetch("built-up area: reduction returned no bands".to_string())),
    );
    let app = test_app(mock, |_| {});
    let (status, json) = post_process(
        &app.router,
        r#"{"bounds": [-1, -1, 1, 1], "mode": "snapshot"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["kind"], "data_fetch");
    assert!(json["error"].as_str().unwrap().contains("built-up area"));
}

#[tokio::test]
async fn test_snapshot_without_values_is_data_fetch() {
    let empty = SnapshotStats::from([("population_count".to_string(), None)]);
    let mock = MockGeoService::new().with_snapshot(StatLayer::Population, Ok(empty));
    let app = test_app(mock, |c| {
        c.default_mode = PipelineMode::LandcoverPlusSnapshotStats
    });
    let (status, json) = post_process(&app.router, r#"{"bounds": [-1, -1, 1, 1]}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["kind"], "data_fetch");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("population: reduction returned no values"));
    assert!(json.get("pop_graph").is_none());
}

// ============================================================================
// Pages, health and metrics
// ============================================================================

#[tokio::test]
async fn test_message() {
    let app = default_app();
    let (status, bytes) = get(&app.router, "/message").await;
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to the Urban Planning API");
}

#[tokio::test]
async fn test_index_page() {
    let app = default_app();
    let (status, bytes) = get(&app.router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"<html>map</html>");
}

#[tokio::test]
async fn test_health() {
    let app = default_app();
    let (status, bytes) = get(&app.router, "/health").await;
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "urban-api");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = default_app();
    let (status, _) = get(&app.router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
}
