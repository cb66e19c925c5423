//! Per-request logging and request id handling.

use std::time::Instant;

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tracing::{field, Instrument, Span};

/// The id [`request_id_layer`] attached to `request`, if any.
fn request_id(request: &Request) -> &str {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
}

/// Log every request and its outcome, at a level picked by status class.
///
/// Handlers run inside a `request` span carrying the request id, so
/// everything they log is tied to it. Status and latency are recorded on
/// the same span once the response is ready.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id(&request),
        method = %request.method(),
        uri = %request.uri(),
        status = field::Empty,
        duration_ms = field::Empty,
    );
    tracing::debug!(parent: &span, version = ?request.version(), "received request");

    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    span.record("status", status.as_u16());
    span.record("duration_ms", start.elapsed().as_millis() as u64);
    log_outcome(&span, status);

    response
}

fn log_outcome(span: &Span, status: StatusCode) {
    if status.is_server_error() {
        tracing::error!(parent: span, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(parent: span, "request rejected");
    } else {
        tracing::info!(parent: span, "request completed");
    }
}

/// Tag incoming requests with a fresh `x-request-id`.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Copy the request's `x-request-id` onto its response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, Request};

    #[test]
    fn test_request_id_from_extension() {
        let mut request = Request::new(Body::empty());
        assert_eq!(request_id(&request), "unknown");

        request
            .extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("abc-123")));
        assert_eq!(request_id(&request), "abc-123");
    }
}
