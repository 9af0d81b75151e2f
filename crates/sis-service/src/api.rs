//! HTTP surface of the validation service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::error::{ErrorCode, ErrorResponse};
use crate::pipeline::{PipelineOutcome, UserIdentityRequest, ValidationPipeline};

pub fn build_router(pipeline: Arc<ValidationPipeline>) -> Router {
    Router::new()
        .route("/user-identity", post(handle_user_identity))
        .with_state(pipeline)
}

async fn handle_user_identity(
    State(pipeline): State<Arc<ValidationPipeline>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match serde_json::from_slice::<UserIdentityRequest>(&body) {
        Ok(request) if request.is_valid() => request,
        _ => {
            tracing::error!("request body is invalid");
            return error_response(ErrorCode::BadRequest);
        }
    };

    // Header lookup is case-insensitive by construction.
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());

    match pipeline.handle(authorization, &request).await {
        PipelineOutcome::Success(response) => (StatusCode::OK, Json(response)).into_response(),
        PipelineOutcome::Failure(code) => error_response(code),
    }
}

fn error_response(code: ErrorCode) -> Response {
    (code.status(), Json(ErrorResponse::from(code))).into_response()
}

pub async fn serve(listen_addr: SocketAddr, pipeline: Arc<ValidationPipeline>) -> anyhow::Result<()> {
    let app = build_router(pipeline);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    tracing::info!("received shutdown signal");
}
