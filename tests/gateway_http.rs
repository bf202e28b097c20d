//! In-process HTTP round trips through the public API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use faqmatch::{
    Bundle, CatalogEntry, EmbedderConfig, Engine, QueryEmbedder, QueryResponse, create_router,
};

fn app() -> axum::Router {
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

#[tokio::test]
async fn test_query_round_trip_deserializes_into_response_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"message": "how can I reset password"}"#))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let payload: QueryResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload.answer, "Go to settings > security > reset password.");
    assert!(payload.confidence_score >= 0.80);
}

#[tokio::test]
async fn test_empty_message_maps_to_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"message": ""}"#))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
