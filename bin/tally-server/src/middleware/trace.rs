use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Attach a trace id to every request and log its start and end.
///
/// A valid UUID in the incoming `x-trace-id` header is reused; otherwise a new
/// one is generated. The id is echoed back on the response.
pub async fn trace_middleware(mut req: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!(body = %describe_body(req.headers()), "→ request started");

        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();
        if let Some(value) = header_value.clone() {
            req.headers_mut().insert(X_TRACE_ID, value);
        }

        let mut response = next.run(req).await;

        if let Some(value) = header_value {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            body = %describe_body(response.headers()),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Summarise a body from its headers; bodies are spreadsheets or small JSON,
/// neither worth buffering just to log.
fn describe_body(headers: &HeaderMap) -> String {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    let length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("?");
    format!("[Type={content_type}, Size={length}]")
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::Request;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn app() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(trace_middleware))
    }

    #[tokio::test]
    #[traced_test]
    async fn generates_trace_id_when_missing() {
        let response = app()
            .oneshot(Request::get("/ping").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        let id = response
            .headers()
            .get(X_TRACE_ID)
            .and_then(|v| v.to_str().ok())
            .expect("trace id header");
        assert!(Uuid::parse_str(id).is_ok());
        assert!(logs_contain("response finished"));
    }

    #[tokio::test]
    async fn echoes_incoming_trace_id() {
        let incoming = Uuid::new_v4().to_string();
        let response = app()
            .oneshot(
                Request::get("/ping")
                    .header(X_TRACE_ID, incoming.as_str())
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get(X_TRACE_ID).and_then(|v| v.to_str().ok()),
            Some(incoming.as_str())
        );
    }

    #[test]
    fn describes_body_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        assert_eq!(describe_body(&headers), "[Type=application/json, Size=12]");
        assert_eq!(describe_body(&HeaderMap::new()), "[Type=-, Size=?]");
    }
}
