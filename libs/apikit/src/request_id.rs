use axum::http::{HeaderName, Request};
use axum::{body::Body, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::field::Empty;

/// Request id as found on (or generated for) the inbound request.
#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        Some(RequestId::new(id.parse().ok()?))
    }
}

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Request id of the inbound request currently being served, when inside
/// the [`propagate_request_id`] scope. Outbound calls attach it to their
/// own headers.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Run `fut` with `id` visible through [`current_request_id`].
pub async fn with_request_id<F>(id: String, fut: F) -> F::Output
where
    F: std::future::Future,
{
    REQUEST_ID.scope(id, fut).await
}

/// Middleware that stores the request id in `Request.extensions`, records it
/// in the current span, keeps it readable through [`current_request_id`] for
/// the duration of the request, and back-fills the span's `status` and
/// `latency_ms` fields once the response is ready.
pub async fn propagate_request_id(mut req: Request<Body>, next: Next) -> Response {
    let hdr = header();
    let rid = req
        .headers()
        .get(&hdr)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "n/a".to_string());

    // Make it available to handlers
    req.extensions_mut().insert(XRequestId(rid.clone()));

    // Ensure the current span has the request_id field recorded
    tracing::Span::current().record("request_id", tracing::field::display(&rid));

    let started = Instant::now();
    let response = with_request_id(rid, next.run(req)).await;

    let span = tracing::Span::current();
    span.record("status", response.status().as_u16());
    span.record("latency_ms", started.elapsed().as_millis() as u64);

    response
}

/// Create trace layer with proper typing
#[allow(clippy::type_complexity)]
pub fn create_trace_layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    use tower_http::trace::TraceLayer;

    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let hdr = header();
        let rid = req
            .headers()
            .get(&hdr)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("n/a");
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %req.uri().path(),
            version = ?req.version(),
            request_id = %rid,
            status = Empty,
            latency_ms = Empty
        )
    })
}
