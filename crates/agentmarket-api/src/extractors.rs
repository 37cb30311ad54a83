//! Custom Axum Extractors

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, ConnectInfo, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;
use crate::rate_limit::RateLimiter;

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Body-level problems (syntax, missing fields, wrong types) become a single
/// `body` field error so every 400 has the same shape.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::invalid_field("body", rejection.body_text())
}

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Client address used as the rate limit key.
///
/// Proxy headers (`X-Forwarded-For` first hop, then `X-Real-IP`) are honoured
/// only when the limiter trusts them; otherwise the socket peer is used.
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn from_parts(parts: &Parts, trust_proxy_headers: bool) -> Self {
        let forwarded = if trust_proxy_headers {
            let headers = &parts.headers;
            headers
                .get("X-Forwarded-For")
                .or_else(|| headers.get("X-Real-IP"))
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        } else {
            None
        };

        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        ClientIp(ip)
    }
}

#[async_trait]
impl FromRequestParts<RateLimiter> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        limiter: &RateLimiter,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, limiter.config().trust_proxy_headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn client_ip(request: HttpRequest<()>, trust_proxy_headers: bool) -> String {
        let (parts, _) = request.into_parts();
        ClientIp::from_parts(&parts, trust_proxy_headers).0
    }

    fn with_peer(mut request: HttpRequest<()>) -> HttpRequest<()> {
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 5000))));
        request
    }

    #[test]
    fn test_forwarded_for_first_hop_when_trusted() {
        let request = HttpRequest::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("X-Real-IP", "198.51.100.9")
            .body(())
            .unwrap();
        assert_eq!(client_ip(with_peer(request), true), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_when_trusted() {
        let request = HttpRequest::builder()
            .header("X-Real-IP", "198.51.100.9")
            .body(())
            .unwrap();
        assert_eq!(client_ip(with_peer(request), true), "198.51.100.9");
    }

    #[test]
    fn test_proxy_headers_ignored_by_default() {
        let request = HttpRequest::builder()
            .header("X-Forwarded-For", "203.0.113.7")
            .header("X-Real-IP", "198.51.100.9")
            .body(())
            .unwrap();
        assert_eq!(client_ip(with_peer(request), false), "192.168.1.20");
    }

    #[test]
    fn test_unknown_without_hints() {
        let request = HttpRequest::builder().body(()).unwrap();
        assert_eq!(client_ip(request, false), "unknown");
    }
}
