//! Request and response values that flow through the forwarding engine.
//!
//! [`InboundRequest`] is what the server layer hands to the engine,
//! [`OutboundRequest`] is the working request modifiers rewrite before it
//! is sent upstream, [`InboundResponse`] is the raw upstream result,
//! [`OutboundResponse`] is the modifier-replaceable response, and
//! [`Reply`] is what is finally written back to the caller.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};

use crate::error::ForwardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
    Trace,
    Connect,
}

impl HttpMethod {
    pub const ALL: [Self; 9] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Options,
        Self::Patch,
        Self::Trace,
        Self::Connect,
    ];

    /// Methods that may be forwarded and carry modifier chains.
    pub const PROXYABLE: [Self; 7] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Options,
        Self::Patch,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }

    /// TRACE and CONNECT are reserved and never proxied.
    #[must_use]
    pub const fn is_proxyable(self) -> bool {
        !matches!(self, Self::Trace | Self::Connect)
    }

    #[must_use]
    pub fn to_http(self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Head => http::Method::HEAD,
            Self::Post => http::Method::POST,
            Self::Put => http::Method::PUT,
            Self::Delete => http::Method::DELETE,
            Self::Options => http::Method::OPTIONS,
            Self::Patch => http::Method::PATCH,
            Self::Trace => http::Method::TRACE,
            Self::Connect => http::Method::CONNECT,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ForwardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ForwardError::UnknownMethod(s.to_string()))
    }
}

/// A parsed request as delivered by the server layer.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The request about to be sent upstream.
///
/// `has_body` always mirrors whether `body` is non-empty; every body
/// mutation goes through [`OutboundRequest::set_body`].
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    destination: String,
    method: HttpMethod,
    headers: HeaderMap,
    body: Bytes,
    has_body: bool,
}

impl OutboundRequest {
    #[must_use]
    pub fn new(destination: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            destination: destination.into(),
            method,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            has_body: false,
        }
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.destination = destination.into();
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
        self.has_body = !self.body.is_empty();
    }

    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.has_body
    }
}

/// Raw result of executing an [`OutboundRequest`].
#[derive(Debug, Clone)]
pub struct InboundResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl InboundResponse {
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }
}

/// The response a modifier hands back; starts as a copy of the upstream
/// response and may be rewritten freely.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl From<InboundResponse> for OutboundResponse {
    fn from(response: InboundResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

/// What gets written back to the original caller.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    /// Normalize the final response for the caller.
    ///
    /// `Content-Length` is always recomputed from the body. `Content-Type`
    /// comes from the inbound request when it carried one, otherwise from
    /// the response.
    #[must_use]
    pub fn new(response: OutboundResponse, request_content_type: Option<HeaderValue>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(response.body.len()));
        let content_type = request_content_type
            .or_else(|| response.headers.get(CONTENT_TYPE).cloned());
        if let Some(value) = content_type {
            headers.insert(CONTENT_TYPE, value);
        }
        Self {
            status: response.status,
            headers,
            body: response.body,
        }
    }

    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_methods_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!("TRACE".parse::<HttpMethod>().unwrap(), HttpMethod::Trace);
        assert!(matches!(
            "BREW".parse::<HttpMethod>(),
            Err(ForwardError::UnknownMethod(m)) if m == "BREW"
        ));
    }

    #[test]
    fn only_trace_and_connect_are_reserved() {
        let reserved: Vec<_> = HttpMethod::ALL
            .into_iter()
            .filter(|m| !m.is_proxyable())
            .collect();
        assert_eq!(reserved, vec![HttpMethod::Trace, HttpMethod::Connect]);
        assert!(HttpMethod::PROXYABLE.iter().all(|m| m.is_proxyable()));
    }

    #[test]
    fn has_body_tracks_body() {
        let mut req = OutboundRequest::new("http://upstream/a", HttpMethod::Post);
        assert!(!req.has_body());

        req.set_body("payload");
        assert!(req.has_body());

        req.set_body(Bytes::new());
        assert!(!req.has_body());
    }

    #[test]
    fn reply_recomputes_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("999"));
        let response = OutboundResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static("héllo".as_bytes()),
        };

        let reply = Reply::new(response, None);
        assert_eq!(reply.header(&CONTENT_LENGTH), Some("6"));
    }

    #[test]
    fn reply_prefers_request_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        let response = OutboundResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"{}"),
        };

        let reply = Reply::new(
            response.clone(),
            Some(HeaderValue::from_static("application/json")),
        );
        assert_eq!(reply.header(&CONTENT_TYPE), Some("application/json"));

        let reply = Reply::new(response, None);
        assert_eq!(reply.header(&CONTENT_TYPE), Some("text/html"));
    }
}
