mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{stub_pipeline, StubFetcher};
use yt_transcript_api::api::server::{build_router, AppState};
use yt_transcript_api::{Config, ConfigBuilder};

fn app_with(config: Config) -> (Router, Arc<StubFetcher>) {
    let (pipeline, fetcher) = stub_pipeline();
    let router = build_router(AppState {
        pipeline,
        config: Arc::new(config),
    });
    (router, fetcher)
}

fn app() -> (Router, Arc<StubFetcher>) {
    app_with(Config::default())
}

fn transcribe_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/transcribe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn assert_cors(headers: &axum::http::HeaderMap) {
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "POST, OPTIONS");
    assert_eq!(headers.get("access-control-allow-headers").unwrap(), "Content-Type");
}

#[tokio::test]
async fn test_transcribe_success() {
    let (router, fetcher) = app();

    let (status, headers, body) = send(
        router,
        transcribe_request(r#"{"youtube_url": "https://youtu.be/dQw4w9WgXcQ?t=5"}"#),
    )
    .await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert_eq!(
        body,
        json!({
            "success": true,
            "transcript": "We're no strangers to love You know the rules and so do I",
            "video_id": "dQw4w9WgXcQ",
            "segments": [
                {"text": "We're no strangers to love", "start": 18.64, "duration": 3.24},
                {"text": "You know the rules and so do I", "start": 22.64, "duration": 4.32}
            ],
            "message": "Transcript extracted successfully"
        })
    );
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_transcribe_blank_url() {
    let (router, fetcher) = app();

    let (status, body) = send_json(router, transcribe_request(r#"{"youtube_url": "   "}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "YouTube URL is required"}));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_transcribe_invalid_url() {
    let (router, fetcher) = app();

    let (status, body) = send_json(router, transcribe_request(r#"{"youtube_url": "not a url"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Invalid YouTube URL"}));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_transcribe_extraction_failure() {
    let (router, _) = app();

    let (status, body) = send_json(
        router,
        transcribe_request(r#"{"youtube_url": "https://www.youtube.com/watch?feature=share&v=missing0001"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Could not extract transcript: The video is no longer available: This video is unavailable",
            "video_id": "missing0001",
            "message": "This video may not have captions available"
        })
    );
}

#[tokio::test]
async fn test_transcribe_malformed_body() {
    let (router, fetcher) = app();

    let (status, headers, body) = send(router, transcribe_request("{\"youtube_url\":")).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&headers);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().starts_with("Server error: Invalid JSON body"));
    assert!(body.get("video_id").is_none());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_transcribe_requires_json_content_type() {
    let (router, fetcher) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/transcribe")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"youtube_url": "https://youtu.be/dQw4w9WgXcQ"}"#))
        .unwrap();
    let (status, body) = send_json(router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Server error: Unsupported Content-Type: expected application/json, got text/plain"
        })
    );
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_transcribe_json_with_charset() {
    let (router, _) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/transcribe")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(r#"{"youtube_url": "https://youtu.be/dQw4w9WgXcQ"}"#))
        .unwrap();
    let (status, body) = send_json(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_id"], json!("dQw4w9WgXcQ"));
}

#[tokio::test]
async fn test_transcribe_non_string_url() {
    let (router, _) = app();

    let (status, body) = send_json(router, transcribe_request(r#"{"youtube_url": null}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": "Server error: Field 'youtube_url' must be a string"})
    );
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let (router, _) = app();
    let body = r#"{"youtube_url": "https://www.youtube.com/embed/dQw4w9WgXcQ"}"#;

    let (_, first) = send_json(router.clone(), transcribe_request(body)).await;
    let (_, second) = send_json(router, transcribe_request(body)).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_preflight() {
    let (router, _) = app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/transcribe")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_health() {
    let (router, _) = app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send_json(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "message": "YouTube Transcript API is running"}));
}

#[tokio::test]
async fn test_landing_page() {
    let (router, _) = app();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, headers, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/html");
    assert!(String::from_utf8(body).unwrap().contains("/transcribe"));
}

const BOUNDARY: &str = "XBOUNDARYX";

fn upload_request(field: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/transcribe-upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_not_implemented() {
    let (router, _) = app();

    let (status, body) = send_json(router, upload_request("audio_file", "talk.mp3", b"ID3 fake audio")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Direct audio transcription is not implemented in this version. Please use YouTube videos with captions.",
            "message": "This feature requires OpenAI Whisper API integration"
        })
    );
}

#[tokio::test]
async fn test_upload_missing_field() {
    let (router, _) = app();

    let (status, body) = send_json(router, upload_request("other", "talk.mp3", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "No audio file provided"}));
}

#[tokio::test]
async fn test_upload_not_multipart() {
    let (router, _) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/transcribe-upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send_json(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "No audio file provided"}));
}

#[tokio::test]
async fn test_upload_plain_field_is_not_a_file() {
    let (router, _) = app();

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"audio_file\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/transcribe-upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send_json(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "No audio file provided"}));
}

#[tokio::test]
async fn test_upload_empty_filename() {
    let (router, _) = app();

    let (status, body) = send_json(router, upload_request("audio_file", "", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "No file selected"}));
}

#[tokio::test]
async fn test_upload_unsupported_extension() {
    let (router, _) = app();

    let (status, body) = send_json(router, upload_request("audio_file", "notes.txt", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Unsupported file type. Allowed: .mp3, .m4a, .wav, .flac, .ogg, .webm, .mp4"
        })
    );
}

#[tokio::test]
async fn test_upload_too_large() {
    let config = ConfigBuilder::new().with_max_upload_size(1024 * 1024).build();
    let (router, _) = app_with(config);

    let contents = vec![0u8; 1024 * 1024 + 1];
    let (status, body) = send_json(router, upload_request("audio_file", "talk.wav", &contents)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "File too large. Maximum size is 1MB"}));
}
