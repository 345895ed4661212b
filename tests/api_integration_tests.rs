//! Integration Tests for the Admin API
//!
//! Drives the full router for each endpoint against real caches.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use storefront_cache::{
    api::create_router,
    cache::{RecommendationContext, ScoredProduct, UserProfile},
    AppState, Config,
};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Router, AppState) {
    let state = AppState::from_config(&Config::default());
    (create_router(state.clone()), state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == Health ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, state) = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());

    state.caches.shutdown().await;
}

// == Stats ==

#[tokio::test]
async fn test_stats_reflect_cache_activity() {
    let (app, state) = create_test_app();
    let params = json!({"limit": 3});
    let profile = UserProfile {
        user_id: Some("u1".to_string()),
        ..Default::default()
    };
    let context = RecommendationContext::default();

    state
        .caches
        .recommendations
        .set(
            &profile,
            &context,
            params.as_object().unwrap(),
            vec![ScoredProduct::new("p1", 0.9, "also_viewed")],
            None,
        )
        .await;
    state
        .caches
        .recommendations
        .get(&profile, &context, params.as_object().unwrap())
        .await;
    state
        .caches
        .recommendations
        .get(&UserProfile::default(), &context, params.as_object().unwrap())
        .await;

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let recs = &json["caches"]["recommendations"];
    assert_eq!(recs["count"], 1);
    assert_eq!(recs["capacity"], 500);
    assert_eq!(recs["hits"], 1);
    assert_eq!(recs["misses"], 1);
    assert_eq!(recs["hit_rate"], 0.5);
    assert!(recs["estimated_memory"].as_u64().unwrap() > 0);
    assert_eq!(json["caches"]["api_responses"]["capacity"], 1000);
    assert_eq!(json["caches"]["graph_queries"]["capacity"], 200);

    state.caches.shutdown().await;
}

// == Invalidate ==

#[tokio::test]
async fn test_invalidate_endpoint_removes_matching_entries() {
    let (app, state) = create_test_app();
    state
        .caches
        .graph_queries
        .set("graph|k:similar_products|id:p9|n:5".to_string(), json!([]), None)
        .await;
    state
        .caches
        .graph_queries
        .set("graph|k:similar_products|id:p1|n:5".to_string(), json!([]), None)
        .await;

    let response = app
        .oneshot(post_json("/invalidate", r#"{"tag":"id:p9"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tag"], "id:p9");
    assert_eq!(json["removed"], 1);
    assert_eq!(state.caches.graph_queries.len().await, 1);

    state.caches.shutdown().await;
}

#[tokio::test]
async fn test_invalidate_endpoint_rejects_empty_tag() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(post_json("/invalidate", r#"{"tag":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Tag cannot be empty"));

    state.caches.shutdown().await;
}

// == Clear ==

#[tokio::test]
async fn test_clear_endpoint() {
    let (app, state) = create_test_app();
    state
        .caches
        .api_responses
        .set("api|m:GET|path:/cart".to_string(), json!({"items": []}), None)
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/caches/api_responses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cache"], "api_responses");
    assert_eq!(state.caches.api_responses.len().await, 0);

    state.caches.shutdown().await;
}

#[tokio::test]
async fn test_clear_unknown_cache() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/caches/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("sessions"));

    state.caches.shutdown().await;
}

// == Sweep ==

#[tokio::test]
async fn test_sweep_endpoint_removes_expired_entries() {
    let (app, state) = create_test_app();
    state
        .caches
        .api_responses
        .set("api|stale".to_string(), json!(1), Some(Duration::from_millis(20)))
        .await;
    state
        .caches
        .api_responses
        .set("api|fresh".to_string(), json!(2), None)
        .await;

    tokio::time::sleep(Duration::from_millis(40)).await;
    // Not yet swept: still counted by len()
    assert_eq!(state.caches.api_responses.len().await, 2);

    let response = app
        .oneshot(Request::builder().method("POST").uri("/sweep").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 1);
    assert_eq!(state.caches.api_responses.len().await, 1);

    state.caches.shutdown().await;
}

// == Unknown Route ==

#[tokio::test]
async fn test_unknown_route() {
    let (app, state) = create_test_app();

    let response = app.oneshot(get("/get/anything")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    state.caches.shutdown().await;
}
