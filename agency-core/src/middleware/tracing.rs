use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assign every request a correlation id and echo it back on the response.
///
/// An id supplied by the caller (the dashboard BFF forwards one per page
/// action) is kept so a single operator action can be traced across calls.
/// Ids that are not valid header values are replaced rather than propagated.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .cloned()
        .filter(|value| value.to_str().is_ok())
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    if let Ok(id) = request_id.to_str() {
        tracing::Span::current().record("request_id", id);
    }
    req.headers_mut()
        .insert(REQUEST_ID_HEADER, request_id.clone());

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}
