//! Middleware for logging requests and responses.

use axum::{extract::Request, middleware::Next, response::Response};

/// The max response-body characters logged at the `info` level before
/// truncating.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log each request and its response.
///
/// Requests are logged at the `info` level. Response bodies longer than
/// [LOG_BODY_LENGTH_LIMIT] characters are truncated at `info` and logged in
/// full at `debug`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    tracing::info!(
        "Received request: {} {}",
        request.method(),
        request.uri()
    );

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let body_text = String::from_utf8_lossy(&body_bytes).to_string();

    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.chars().count() > LOG_BODY_LENGTH_LIMIT {
        let prefix: String = body.chars().take(LOG_BODY_LENGTH_LIMIT).collect();
        tracing::info!("Sending response: {} body: {prefix}...", parts.status);
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {} body: {body:?}", parts.status);
    }
}
