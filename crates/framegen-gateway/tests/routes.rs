// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route tests driving the router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use framegen_core::types::QueueName;
use framegen_gateway::{build_router, AuthConfig, GatewayState, HealthState};
use framegen_test_utils::TestHarness;
use framegen_worker::EnqueueService;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(harness: &TestHarness, bearer_token: Option<&str>) -> Router {
    let enqueue = EnqueueService::new(harness.processor.queue_client().clone(), None);
    build_router(GatewayState {
        processor: harness.processor.clone(),
        enqueue: Arc::new(enqueue),
        auth: AuthConfig {
            bearer_token: bearer_token.map(str::to_string),
        },
        health: HealthState::default(),
    })
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = router(&harness, Some("secret"));

    let response = app
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].is_u64());
}

#[tokio::test]
async fn api_requires_matching_bearer_token() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = router(&harness, Some("secret"));

    let missing = app
        .clone()
        .oneshot(request(Method::GET, "/v1/queues/image_generation/count", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let authorized = Request::builder()
        .uri("/v1/queues/image_generation/count")
        .header(header::AUTHORIZATION, "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(authorized).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_job_enqueues_on_media_kind_queue() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = router(&harness, None);

    let response = app
        .oneshot(request(
            Method::POST,
            "/v1/jobs",
            Some(json!({"media_kind": "video", "prompt": "waves", "owner_entity_key": "scene:3"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["queue"], "video_generation");
    assert_eq!(body["message_id"], 1);
    assert_eq!(harness.queue.len(QueueName::VideoGeneration).await, 1);
    assert_eq!(harness.queue.len(QueueName::ImageGeneration).await, 0);
}

#[tokio::test]
async fn post_job_rejects_invalid_payloads() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = router(&harness, None);

    let empty_prompt = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/v1/jobs",
            Some(json!({"media_kind": "image", "prompt": "  "})),
        ))
        .await
        .unwrap();
    assert_eq!(empty_prompt.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let unknown_kind = app
        .oneshot(request(
            Method::POST,
            "/v1/jobs",
            Some(json!({"media_kind": "audio", "prompt": "hum"})),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_kind.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(harness.queue.len(QueueName::ImageGeneration).await, 0);
}

#[tokio::test]
async fn worker_route_returns_batch_summary() {
    let harness = TestHarness::builder()
        .with_entity("scene:1", json!({"title": "Opening"}))
        .build()
        .await
        .unwrap();
    let app = router(&harness, None);

    app.clone()
        .oneshot(request(
            Method::POST,
            "/v1/jobs",
            Some(json!({"media_kind": "image", "prompt": "fox", "owner_entity_key": "scene:1"})),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request(Method::POST, "/v1/worker/image_generation", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["processed"], 1);
    assert_eq!(body["results"][0]["success"], true);
    assert_eq!(body["results"][0]["owner_entity_key"], "scene:1");
    assert!(body["results"][0]["asset_url"]
        .as_str()
        .unwrap()
        .starts_with("https://cdn.test/scene:1/"));
}

#[tokio::test]
async fn unknown_queue_is_not_found() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = router(&harness, None);

    for (method, uri) in [
        (Method::POST, "/v1/worker/audio_generation"),
        (Method::GET, "/v1/queues/audio_generation/count"),
        (Method::GET, "/v1/queues/audio_generation/peek"),
    ] {
        let response = app.clone().oneshot(request(method, uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn peek_with_zero_timeout_leaves_messages_visible() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = router(&harness, None);
    for prompt in ["a", "b"] {
        app.clone()
            .oneshot(request(
                Method::POST,
                "/v1/jobs",
                Some(json!({"media_kind": "image", "prompt": prompt})),
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/v1/queues/image_generation/peek?vt=0&qty=5",
            None,
        ))
        .await
        .unwrap();
    let envelopes = json_body(response).await;
    assert_eq!(envelopes.as_array().unwrap().len(), 2);
    assert_eq!(envelopes[0]["payload"]["prompt"], "a");

    let count = app
        .oneshot(request(
            Method::GET,
            "/v1/queues/image_generation/count",
            None,
        ))
        .await
        .unwrap();
    let body = json_body(count).await;
    assert_eq!(body, json!({"queue": "image_generation", "count": 2}));

    let summary = harness.run(QueueName::ImageGeneration).await.unwrap();
    assert_eq!(summary.processed, 2);
}
