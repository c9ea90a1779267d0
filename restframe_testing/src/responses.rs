//! Canned [`EndpointResponse`]s.

use bytes::Bytes;
use http::StatusCode;
use restframe::response::EndpointResponse;

/// `application/json` response with `body`.
#[must_use]
pub fn json(status: StatusCode, body: &str) -> EndpointResponse {
    EndpointResponse::new(status)
        .with_header("Content-Type", "application/json")
        .with_body(Bytes::copy_from_slice(body.as_bytes()))
}

/// `text/plain` response with `body`.
#[must_use]
pub fn text(status: StatusCode, body: &str) -> EndpointResponse {
    EndpointResponse::new(status)
        .with_header("Content-Type", "text/plain; charset=utf-8")
        .with_body(Bytes::copy_from_slice(body.as_bytes()))
}

/// Response with no headers and no body.
#[must_use]
pub fn empty(status: StatusCode) -> EndpointResponse { EndpointResponse::new(status) }

/// One JSON page with a `Link` to `next` and an `X-Total-Count` of `total`.
#[must_use]
pub fn page(body: &str, next: Option<&str>, total: u64) -> EndpointResponse {
    let response = json(StatusCode::OK, body).with_header("X-Total-Count", &total.to_string());
    match next {
        Some(next) => response.with_header("Link", &format!("<{next}>; rel=\"next\"")),
        None => response,
    }
}
