//! Add and strip headers on the outbound request and on the response.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::model::HeaderRules;
use crate::error::BoxError;
use crate::proxy::message::{InboundResponse, OutboundRequest, OutboundResponse};
use crate::proxy::modifier::Modifier;

#[derive(Debug, Default)]
struct ParsedRules {
    add: Vec<(HeaderName, HeaderValue)>,
    strip: Vec<HeaderName>,
}

impl ParsedRules {
    fn parse(rules: &HeaderRules, side: &str) -> Self {
        let add = rules
            .add
            .iter()
            .filter_map(|(key, value)| {
                match (key.parse::<HeaderName>(), HeaderValue::from_str(value)) {
                    (Ok(name), Ok(val)) => Some((name, val)),
                    _ => {
                        tracing::warn!(header = %key, side, "invalid header name or value, skipping");
                        None
                    }
                }
            })
            .collect();
        let strip = rules
            .strip
            .iter()
            .filter_map(|key| key.parse::<HeaderName>().ok())
            .collect();
        Self { add, strip }
    }

    fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.add {
            headers.insert(name.clone(), value.clone());
        }
        for name in &self.strip {
            headers.remove(name);
        }
    }
}

#[derive(Debug)]
pub struct HeaderModifier {
    request: ParsedRules,
    response: ParsedRules,
}

impl HeaderModifier {
    #[must_use]
    pub fn new(request: &HeaderRules, response: &HeaderRules) -> Self {
        Self {
            request: ParsedRules::parse(request, "request"),
            response: ParsedRules::parse(response, "response"),
        }
    }
}

impl Modifier for HeaderModifier {
    fn name(&self) -> &str {
        "headers"
    }

    fn on_before_request(&self, mut request: OutboundRequest) -> Result<OutboundRequest, BoxError> {
        self.request.apply(request.headers_mut());
        Ok(request)
    }

    fn on_response(&self, response: InboundResponse) -> Result<OutboundResponse, BoxError> {
        let mut response = OutboundResponse::from(response);
        self.response.apply(&mut response.headers);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::proxy::message::HttpMethod;

    fn rules(add: &[(&str, &str)], strip: &[&str]) -> HeaderRules {
        HeaderRules {
            add: add
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            strip: strip.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn rewrites_request_headers() {
        let modifier = HeaderModifier::new(
            &rules(&[("x-proxy", "waypoint")], &["cookie"]),
            &HeaderRules::default(),
        );
        let mut request = OutboundRequest::new("http://upstream/", HttpMethod::Get);
        request
            .headers_mut()
            .insert("Cookie", HeaderValue::from_static("session=1"));
        request
            .headers_mut()
            .insert("X-Proxy", HeaderValue::from_static("someone-else"));

        let request = modifier.on_before_request(request).unwrap();
        assert_eq!(request.headers().get("x-proxy").unwrap(), "waypoint");
        assert!(request.headers().get("cookie").is_none());
    }

    #[test]
    fn rewrites_response_headers() {
        let modifier = HeaderModifier::new(
            &HeaderRules::default(),
            &rules(&[("x-served-by", "waypoint")], &["server"]),
        );
        let mut headers = HeaderMap::new();
        headers.insert("server", HeaderValue::from_static("nginx"));
        let inbound = InboundResponse::new(StatusCode::OK, headers, Bytes::from_static(b"ok"));

        let response = modifier.on_response(inbound).unwrap();
        assert!(response.headers.get("server").is_none());
        assert_eq!(response.headers.get("x-served-by").unwrap(), "waypoint");
        assert_eq!(response.body, Bytes::from_static(b"ok"));
    }

    #[test]
    fn invalid_rules_are_skipped() {
        let modifier = HeaderModifier::new(
            &rules(&[("bad header", "v"), ("x-ok", "1")], &["also bad"]),
            &HeaderRules::default(),
        );
        let request = OutboundRequest::new("http://upstream/", HttpMethod::Get);

        let request = modifier.on_before_request(request).unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers().get("x-ok").unwrap(), "1");
    }
}
