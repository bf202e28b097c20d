use super::*;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use crate::bundle::{Bundle, CatalogEntry};
use crate::embedding::{EmbedderConfig, QueryEmbedder};

fn test_router() -> Router {
    let embedder = QueryEmbedder::load(EmbedderConfig::stub()).expect("load stub embedder");
    let bundle = Bundle::build(
        vec![CatalogEntry::new(
            "how do I reset my password",
            "Go to settings > security > reset password.",
        )],
        embedder,
    )
    .expect("build bundle");

    create_router(Arc::new(Engine::new(bundle)))
}

fn query_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_healthz_reports_ok() {
    let response = test_router()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_reports_bundle_stats() {
    let response = test_router()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["entries"], 1);
    assert_eq!(body["embedder_mode"], "stub");
    assert!(body["vocab_len"].as_u64().unwrap() > 2);
}

#[tokio::test]
async fn test_query_returns_catalog_answer() {
    let response = test_router()
        .oneshot(query_request(r#"{"message": "how can I reset password"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(SOURCE_HEADER).unwrap(),
        "catalog"
    );

    let body = body_json(response).await;
    assert_eq!(body["answer"], "Go to settings > security > reset password.");
    assert!(body["confidence_score"].as_f64().unwrap() >= 0.80);
}

#[tokio::test]
async fn test_query_small_talk_has_full_confidence() {
    let response = test_router()
        .oneshot(query_request(r#"{"message": "thanks a lot"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(SOURCE_HEADER).unwrap(),
        "small_talk"
    );

    let body = body_json(response).await;
    assert!(body["answer"].as_str().unwrap().starts_with("You're welcome"));
    assert_eq!(body["confidence_score"].as_f64().unwrap(), 1.0);
}

#[tokio::test]
async fn test_query_low_confidence_returns_fallback_with_score() {
    let response = test_router()
        .oneshot(query_request(r#"{"message": "what is the weather today"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(SOURCE_HEADER).unwrap(),
        "fallback"
    );

    let body = body_json(response).await;
    assert_eq!(body["answer"], crate::engine::FALLBACK_MESSAGE);
    assert!(body["confidence_score"].as_f64().unwrap() < 0.80);
}

#[tokio::test]
async fn test_query_empty_message_is_rejected() {
    let response = test_router()
        .oneshot(query_request(r#"{"message": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers().get(SOURCE_HEADER).unwrap(), "error");

    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("message"));
}

#[tokio::test]
async fn test_query_missing_message_field_is_client_error() {
    let response = test_router()
        .oneshot(query_request(r#"{"text": "hello"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_query_identical_requests_get_identical_responses() {
    let router = test_router();

    let first = router
        .clone()
        .oneshot(query_request(r#"{"message": "how can I reset password"}"#))
        .await
        .unwrap();
    let second = router
        .oneshot(query_request(r#"{"message": "how can I reset password"}"#))
        .await
        .unwrap();

    assert_eq!(body_json(first).await, body_json(second).await);
}

#[test]
fn test_engine_error_maps_to_service_unavailable() {
    use crate::engine::EngineError;
    use crate::ranker::RankError;

    let response =
        GatewayError::MatchingUnavailable(EngineError::from(RankError::EmptyMatrix))
            .into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
