//! Single-invocation (CGI style) request handling
//!
//! One request is read from `REQUEST_METHOD`, `CONTENT_LENGTH` and stdin; one
//! response is written to stdout. Every POST is answered with status 200 and
//! callers must inspect the envelope's `success` field.

use std::io::{self, Read, Write};
use tracing::error;

use super::handlers::{RequestError, StatusPolicy, TranscribeOutcome, TranscriptPipeline};
use super::models::ResponseEnvelope;
use super::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN};

/// A request as received by the invocation handler
#[derive(Debug)]
pub struct InvocationRequest {
    pub method: String,
    /// Body framed by Content-Length, or the framing error
    pub body: Result<Vec<u8>, RequestError>,
}

impl InvocationRequest {
    /// Read a request body of `content_length` bytes from `input`
    pub fn read<R: Read>(method: &str, content_length: Option<&str>, input: R) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            body: read_body(content_length, input),
        }
    }

    /// Read the request from the CGI environment and stdin
    pub fn from_process() -> Self {
        let method = std::env::var("REQUEST_METHOD").unwrap_or_else(|_| "POST".to_string());
        let content_length = std::env::var("CONTENT_LENGTH").ok();
        let stdin = io::stdin();
        Self::read(&method, content_length.as_deref(), stdin.lock())
    }
}

fn read_body<R: Read>(content_length: Option<&str>, input: R) -> Result<Vec<u8>, RequestError> {
    let raw = content_length
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(RequestError::MissingContentLength)?;
    let length: u64 = raw
        .parse()
        .map_err(|_| RequestError::InvalidContentLength(raw.to_string()))?;

    let mut body = Vec::new();
    input
        .take(length)
        .read_to_end(&mut body)
        .map_err(|e| RequestError::Body(e.to_string()))?;

    if body.len() as u64 != length {
        return Err(RequestError::Body(format!(
            "expected {} bytes, received {}",
            length,
            body.len()
        )));
    }

    Ok(body)
}

/// Response produced by the invocation handler
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
}

impl InvocationResponse {
    fn new(status: u16, body: Option<Vec<u8>>) -> Self {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        headers.push(("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN.to_string()));
        headers.push(("Access-Control-Allow-Methods", CORS_ALLOW_METHODS.to_string()));
        headers.push(("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS.to_string()));

        Self {
            status,
            headers,
            body,
        }
    }

    fn envelope(status: u16, envelope: &ResponseEnvelope) -> Self {
        Self::new(status, Some(envelope.to_json_bytes()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse the body back into an envelope
    pub fn envelope_body(&self) -> Option<ResponseEnvelope> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    /// Write the response in CGI format
    pub fn write_cgi<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "Status: {} {}\r\n", self.status, reason_phrase(self.status))?;
        for (name, value) in &self.headers {
            write!(out, "{}: {}\r\n", name, value)?;
        }
        write!(out, "\r\n")?;
        if let Some(body) = &self.body {
            out.write_all(body)?;
        }
        out.flush()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "",
    }
}

/// Handle one invocation end to end
pub async fn handle_invocation(pipeline: &TranscriptPipeline, request: InvocationRequest) -> InvocationResponse {
    match request.method.as_str() {
        "OPTIONS" => InvocationResponse::new(200, None),
        "POST" => {
            let outcome = match request.body {
                Ok(body) => pipeline.handle_body(&body).await,
                Err(e) => {
                    error!("Request processing error: {}", e);
                    TranscribeOutcome::ServerError(e)
                }
            };
            let status = outcome.status(StatusPolicy::AlwaysOk);
            InvocationResponse::envelope(status, &outcome.into_envelope())
        }
        other => {
            let e = RequestError::MethodNotAllowed(other.to_string());
            InvocationResponse::envelope(405, &ResponseEnvelope::failure(e.to_string()))
        }
    }
}
