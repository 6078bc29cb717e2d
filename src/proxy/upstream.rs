//! The network layer: executing an [`OutboundRequest`] against the target.
//!
//! [`Upstream`] is the seam the engine calls through; [`HyperUpstream`] is
//! the production implementation on top of the connection-pooled hyper
//! client built by [`server::build_http_client`](crate::server::build_http_client).

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_LENGTH, HOST};
use http_body_util::{BodyExt, Full};

use crate::error::BoxError;
use crate::server::HttpClient;

use super::message::{InboundResponse, OutboundRequest};

/// Connection-level headers that describe the caller's hop, not the
/// request. The client re-frames the body itself.
static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-connection",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

// async_trait keeps Upstream usable as Arc<dyn Upstream>.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn execute(&self, request: &OutboundRequest) -> Result<InboundResponse, BoxError>;
}

pub struct HyperUpstream {
    client: HttpClient,
    timeout: Duration,
}

impl HyperUpstream {
    #[must_use]
    pub const fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Upstream for HyperUpstream {
    #[allow(clippy::cast_possible_truncation)]
    async fn execute(&self, request: &OutboundRequest) -> Result<InboundResponse, BoxError> {
        let start = Instant::now();
        let url = url::Url::parse(request.destination())?;

        let mut builder = hyper::Request::builder()
            .method(request.method().to_http())
            .uri(url.as_str());

        for (key, value) in request.headers() {
            builder = builder.header(key, value);
        }

        let body = if request.has_body() {
            request.body().clone()
        } else {
            Bytes::new()
        };
        let mut req = builder.body(Full::new(body))?;

        let headers = req.headers_mut();
        for name in HOP_BY_HOP.iter() {
            headers.remove(name);
        }
        headers.remove(CONTENT_LENGTH);

        // Host and Accept-Encoding always come from the proxy, never the caller.
        if let Some(host) = host_header(&url) {
            headers.insert(HOST, host);
        }
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

        let response = tokio::time::timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| format!("request timed out after {}ms", self.timeout.as_millis()))??;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await?.to_bytes();

        tracing::debug!(
            destination = %request.destination(),
            method = %request.method(),
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "upstream responded"
        );

        Ok(InboundResponse::new(status, headers, body))
    }
}

/// `Host` value for the destination, with the port when one is explicit.
fn host_header(url: &url::Url) -> Option<HeaderValue> {
    let host = url.host_str()?;
    let value = url
        .port()
        .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
    HeaderValue::from_str(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_header_keeps_explicit_port() {
        let url = url::Url::parse("http://backend:9090/path").unwrap();
        assert_eq!(host_header(&url).unwrap(), "backend:9090");
    }

    #[test]
    fn host_header_omits_default_port() {
        let url = url::Url::parse("https://backend.example:443/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "backend.example");
    }
}
