//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::BytesRejection, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use super::handlers::{
    self, RequestError, StatusPolicy, TranscriptPipeline, UploadRejection,
};
use super::models::ResponseEnvelope;
use super::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN};
use crate::config::{Config, UploadConfig};

const UPLOAD_FIELD: &str = "audio_file";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TranscriptPipeline>,
    pub config: Arc<Config>,
}

/// Build the application router with routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_ui))
        .route("/health", get(health_handler))
        .route("/transcribe", post(transcribe_handler).options(preflight_handler))
        .route(
            "/transcribe-upload",
            post(upload_handler)
                .options(preflight_handler)
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static(CORS_ALLOW_ORIGIN),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(CORS_ALLOW_METHODS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOW_HEADERS),
                )),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(config: Arc<Config>, pipeline: Arc<TranscriptPipeline>) -> Result<()> {
    let address = config.bind_address();
    let app = build_router(AppState { pipeline, config });

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 API server listening on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

fn envelope_response(status: u16, envelope: ResponseEnvelope) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check()))
}

/// CORS preflight, no body
async fn preflight_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Transcript extraction handler
async fn transcribe_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let outcome = match (handlers::check_json_content_type(content_type), body) {
        (Ok(()), Ok(body)) => state.pipeline.handle_body(&body).await,
        (Err(e), _) => {
            error!("Request processing error: {}", e);
            handlers::TranscribeOutcome::ServerError(e)
        }
        (Ok(()), Err(rejection)) => {
            let e = RequestError::Body(rejection.body_text());
            error!("Request processing error: {}", e);
            handlers::TranscribeOutcome::ServerError(e)
        }
    };

    let status = outcome.status(StatusPolicy::Strict);
    envelope_response(status, outcome.into_envelope())
}

/// Audio upload handler; validates the file, transcription itself is unavailable
async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(multipart) = multipart else {
        return envelope_response(400, ResponseEnvelope::failure(UploadRejection::NoFile.to_string()));
    };

    match read_upload(multipart, &state.config.upload).await {
        Ok(Ok((filename, size))) => envelope_response(400, handlers::upload_outcome(&filename, size)),
        Ok(Err(rejection)) => envelope_response(400, ResponseEnvelope::failure(rejection.to_string())),
        Err(e) => {
            error!("Upload processing error: {}", e);
            envelope_response(500, ResponseEnvelope::server_error(e))
        }
    }
}

/// Find the upload field and measure it, stopping once past the size limit
async fn read_upload(
    mut multipart: Multipart,
    limits: &UploadConfig,
) -> Result<Result<(String, u64), UploadRejection>, RequestError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::Multipart(e.body_text()))?
    {
        // Only file parts count; a plain form value under the same name is ignored.
        if field.name() != Some(UPLOAD_FIELD) || field.file_name().is_none() {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let mut size: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| RequestError::Multipart(e.body_text()))?
        {
            size += chunk.len() as u64;
            if size > limits.max_file_size {
                break;
            }
        }

        return Ok(handlers::validate_upload(&filename, size, limits).map(|_| (filename, size)));
    }

    Ok(Err(UploadRejection::NoFile))
}

/// Serve a small landing page describing the API
async fn serve_ui() -> impl IntoResponse {
    let html = r#"<!DOCTYPE html>
<html>
<head>
    <title>YouTube Transcript API</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .endpoint { background: #f5f5f5; padding: 10px; margin: 10px 0; }
        code { background: #e8e8e8; padding: 2px 4px; }
    </style>
</head>
<body>
    <h1>YouTube Transcript API</h1>
    <div class="endpoint">
        <strong>POST /transcribe</strong> - body <code>{"youtube_url": "..."}</code>
    </div>
    <div class="endpoint">
        <strong>POST /transcribe-upload</strong> - multipart field <code>audio_file</code> (not implemented)
    </div>
    <div class="endpoint">
        <strong>GET /health</strong> - Health check
    </div>
</body>
</html>
"#;
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], html)
}
