// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /v1/jobs, POST /v1/worker/{queue}, GET /v1/queues/{queue}/count,
//! GET /v1/queues/{queue}/peek, and the public GET /health.

use std::str::FromStr;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use framegen_core::types::{JobPayload, MessageId, QueueName};
use framegen_core::FramegenError;

use crate::server::GatewayState;

/// Response body for POST /v1/jobs.
#[derive(Debug, Serialize, Deserialize)]
pub struct EnqueueResponse {
    pub message_id: MessageId,
    pub queue: QueueName,
}

/// Response body for GET /v1/queues/{queue}/count.
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub queue: QueueName,
    pub count: u64,
}

/// Query string for GET /v1/queues/{queue}/peek.
#[derive(Debug, Deserialize)]
pub struct PeekQuery {
    /// Visibility timeout in seconds. Zero leaves the messages visible.
    #[serde(default)]
    pub vt: u64,
    #[serde(default = "default_peek_qty")]
    pub qty: usize,
}

fn default_peek_qty() -> usize {
    10
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn status_for(err: &FramegenError) -> StatusCode {
    match err {
        FramegenError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Resolves the `{queue}` path segment, or a 404 response.
fn parse_queue(raw: &str) -> Result<QueueName, Response> {
    QueueName::from_str(raw)
        .map_err(|_| error_response(StatusCode::NOT_FOUND, format!("unknown queue `{raw}`")))
}

/// POST /v1/jobs
///
/// Validates and enqueues a job on the queue for its media kind, then fires
/// the dispatch trigger. Responds before any generation happens.
pub async fn post_job(
    State(state): State<GatewayState>,
    Json(payload): Json<JobPayload>,
) -> Response {
    if let Err(e) = payload.validate() {
        return error_response(status_for(&e), e.to_string());
    }

    match state.enqueue.submit(&payload).await {
        Ok((message_id, queue)) => {
            tracing::info!(%queue, %message_id, "job accepted");
            (
                StatusCode::ACCEPTED,
                Json(EnqueueResponse { message_id, queue }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "enqueue failed");
            error_response(status_for(&e), e.to_string())
        }
    }
}

/// POST /v1/worker/{queue}
///
/// Runs one worker batch and returns its summary.
///
/// The batch runs on its own task, so a caller that hangs up early (the
/// dispatch trigger does) does not cancel jobs mid-generation.
pub async fn post_worker(
    State(state): State<GatewayState>,
    Path(queue): Path<String>,
) -> Response {
    let queue = match parse_queue(&queue) {
        Ok(queue) => queue,
        Err(response) => return response,
    };

    let processor = state.processor.clone();
    let batch = tokio::spawn(async move { processor.run(queue).await });
    match batch.await {
        Ok(Ok(summary)) => Json(summary).into_response(),
        Ok(Err(e)) => {
            tracing::error!(%queue, error = %e, "worker invocation failed");
            error_response(status_for(&e), e.to_string())
        }
        Err(e) => {
            tracing::error!(%queue, error = %e, "worker batch task aborted");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "worker batch aborted")
        }
    }
}

/// GET /v1/queues/{queue}/count
pub async fn get_count(State(state): State<GatewayState>, Path(queue): Path<String>) -> Response {
    let queue = match parse_queue(&queue) {
        Ok(queue) => queue,
        Err(response) => return response,
    };

    match state.processor.queue_client().count(queue).await {
        Ok(count) => Json(CountResponse { queue, count }).into_response(),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

/// GET /v1/queues/{queue}/peek?vt=0&qty=10
pub async fn get_peek(
    State(state): State<GatewayState>,
    Path(queue): Path<String>,
    Query(query): Query<PeekQuery>,
) -> Response {
    let queue = match parse_queue(&queue) {
        Ok(queue) => queue,
        Err(response) => return response,
    };

    match state
        .processor
        .queue_client()
        .peek(queue, Duration::from_secs(query.vt), query.qty)
        .await
    {
        Ok(envelopes) => Json(envelopes).into_response(),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
