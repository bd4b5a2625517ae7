//! Correlation-id middleware.
//!
//! Every request gets a correlation id resolved as: the `X-Correlation-Id`
//! header, else the `correlationId` query parameter (redirects drop
//! headers, so our own redirects carry the id this way), else a freshly
//! generated id. Handlers read it from request extensions; responses echo
//! it back in the header.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use atf_core::{CORRELATION_HEADER, CorrelationId};

fn correlation_id_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "correlationId")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

pub async fn correlation_middleware(mut req: Request<Body>, next: Next) -> Response {
    let from_header = req
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    let from_query = req.uri().query().and_then(correlation_id_from_query);

    let correlation_id = from_header
        .or(from_query)
        .map(CorrelationId::new)
        .unwrap_or_else(CorrelationId::generate);

    req.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}
