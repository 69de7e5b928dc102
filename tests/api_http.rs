// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health, GET /criteria
// - POST /evaluate (success, structured 422s, default-weight fallback)
// - GET /history and the on-disk result log

use std::path::Path;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use lecture_evaluator::api::{self, AppState};
use lecture_evaluator::config::EvaluatorConfig;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_state(dir: &Path) -> AppState {
    let mut cfg = EvaluatorConfig::default();
    cfg.criteria.names = vec!["clarity".into(), "engagement".into(), "tools".into()];
    cfg.history.log_path = dir.join("out/results.jsonl");
    cfg.history.default_weights_path = dir.join("weights.json");
    AppState::new(cfg)
}

fn test_router(dir: &Path) -> (Router, AppState) {
    let state = test_state(dir);
    (api::router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn post_json(app: &Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let (status, bytes) = send(app, req).await;
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = test_router(tmp.path());

    let req = Request::get("/health").body(Body::empty()).unwrap();
    let (status, bytes) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap().trim(), "OK");
}

#[tokio::test]
async fn api_criteria_lists_configured_names_and_range() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = test_router(tmp.path());

    let (status, v) = get_json(&app, "/criteria").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["criteria"], json!(["clarity", "engagement", "tools"]));
    assert_eq!(v["score_range"], json!({ "min": 1.0, "max": 10.0 }));
    assert_eq!(v["methods"], json!(["manual", "entropy"]));
}

#[tokio::test]
async fn api_evaluate_returns_comparison_and_records_history() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, state) = test_router(tmp.path());

    let payload = json!({
        "item_name": "Week 3: Normal forms",
        "scores": [[8, 7, 9], [6, 7, 5], [9, 7, 8]],
        "manual_weights": [[0.5, 0.3, 0.2], [0.3, 0.3, 0.4]],
        "methods": ["manual", "pairwise_average", "entropy"]
    });
    let (status, v) = post_json(&app, "/evaluate", payload).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");

    assert_eq!(v["item_name"], "Week 3: Normal forms");
    assert_eq!(v["settings"]["boundary"], "strict");
    let comparison = v["comparison"].as_array().expect("comparison array");
    assert_eq!(comparison.len(), 3);
    for o in comparison {
        let score = o["aggregate"]["score"].as_f64().expect("aggregate score");
        assert!((0.0..=1.0).contains(&score));
        assert!(o["aggregate"]["label"].is_string());
        assert_eq!(o["rows"].as_array().unwrap().len(), 3);
        let sum: f64 = o["weights"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w.as_f64().unwrap())
            .sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }
    // panel mean of the two experts, already summing to 1
    let manual = &comparison[0]["weights"];
    assert!((manual[0].as_f64().unwrap() - 0.4).abs() < 1e-9);
    assert_eq!(v["weight_comparison"][1]["criterion"], "engagement");

    let (status, hist) = get_json(&app, "/history?n=2").await;
    assert_eq!(status, StatusCode::OK);
    let rows = hist.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["method"], "entropy");
    assert_eq!(rows[1]["item_name"], "Week 3: Normal forms");

    let logged = state.result_log().read_all().unwrap();
    assert_eq!(logged.len(), 3);
}

#[tokio::test]
async fn api_zero_manual_weights_are_422_and_not_logged() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, state) = test_router(tmp.path());

    let payload = json!({
        "item_name": "x",
        "scores": [[1, 2, 3]],
        "manual_weights": [0, 0, 0]
    });
    let (status, v) = post_json(&app, "/evaluate", payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["error"], "zero_weight_sum");
    assert!(v["message"].as_str().unwrap().contains("sum"));

    assert!(state.result_log().read_all().unwrap().is_empty());
    let (_, hist) = get_json(&app, "/history").await;
    assert_eq!(hist, json!([]));
}

#[tokio::test]
async fn api_rejects_malformed_matrices_with_invalid_input() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = test_router(tmp.path());

    for scores in [json!([]), json!([[1, 2, 3], [4, 5]]), json!([[1, 2, 11]]), json!([[1, 2]])] {
        let payload = json!({ "item_name": "x", "scores": scores, "methods": ["entropy"] });
        let (status, v) = post_json(&app, "/evaluate", payload).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "scores {scores}");
        assert_eq!(v["error"], "invalid_input", "scores {scores}");
    }
}

#[tokio::test]
async fn api_manual_without_weights_uses_default_file() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = test_router(tmp.path());
    let payload = json!({ "item_name": "x", "scores": [[4, 6, 8], [5, 5, 9]] });

    let (status, v) = post_json(&app, "/evaluate", payload.clone()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["error"], "invalid_input");

    std::fs::write(
        tmp.path().join("weights.json"),
        r#"{ "weights": [2.0, 1.0, 1.0] }"#,
    )
    .unwrap();
    let (status, v) = post_json(&app, "/evaluate", payload).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert!((v["comparison"][0]["weights"][0].as_f64().unwrap() - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn api_degenerate_average_is_reported_with_kind() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = EvaluatorConfig::default();
    cfg.criteria.names = vec!["a".into(), "b".into()];
    cfg.scores.enforce_range = false;
    cfg.history.log_path = tmp.path().join("results.jsonl");
    let app = api::router(AppState::new(cfg));

    let payload = json!({
        "item_name": "x",
        "scores": [[0, 50], [0, 70]],
        "methods": ["pairwise_average"]
    });
    let (status, v) = post_json(&app, "/evaluate", payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["error"], "degenerate_average");
}

#[tokio::test]
async fn api_alternatives_log_one_row_per_alternative() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, state) = test_router(tmp.path());

    let payload = json!({
        "item_name": "week 3 materials",
        "scores": [[9, 9, 8], [2, 3, 4], [5, 6, 5]],
        "row_labels": ["slides", "video", "quiz"],
        "ranking_unit": "alternatives",
        "methods": ["entropy"],
        "boundary": "inclusive"
    });
    let (status, v) = post_json(&app, "/evaluate", payload).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    let o = &v["comparison"][0];
    assert!(o.get("aggregate").is_none());
    assert_eq!(o["rows"][0]["identifier"], "slides");
    assert_eq!(o["rows"][0]["rank"], 1);
    assert_eq!(o["rows"][1]["rank"], 3);

    let logged = state.result_log().read_all().unwrap();
    let names: Vec<&str> = logged.iter().map(|r| r.item_name.as_str()).collect();
    assert_eq!(names, vec!["slides", "video", "quiz"]);
}

#[tokio::test]
async fn api_log_failure_is_500_and_leaves_history_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = EvaluatorConfig::default();
    cfg.criteria.names = vec!["a".into(), "b".into()];
    // a directory cannot be opened for append
    cfg.history.log_path = tmp.path().to_path_buf();
    let app = api::router(AppState::new(cfg));

    let payload = json!({ "item_name": "x", "scores": [[3, 8], [6, 2]], "methods": ["entropy"] });
    let (status, v) = post_json(&app, "/evaluate", payload).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["error"], "result_log");

    let (status, hist) = get_json(&app, "/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hist, json!([]));
}
