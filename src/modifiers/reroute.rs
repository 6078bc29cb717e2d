//! Send requests under a path prefix to a different base URL.

use crate::error::BoxError;
use crate::proxy::message::OutboundRequest;
use crate::proxy::modifier::Modifier;

#[derive(Debug)]
pub struct RerouteModifier {
    prefix: String,
    upstream: String,
}

impl RerouteModifier {
    #[must_use]
    pub fn new(prefix: impl Into<String>, upstream: &str) -> Self {
        Self {
            prefix: prefix.into(),
            upstream: upstream.trim_end_matches('/').to_string(),
        }
    }
}

impl RerouteModifier {
    /// Whole-segment prefix match: `/config` covers `/config` and
    /// `/config/x`, not `/configuration`.
    fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl Modifier for RerouteModifier {
    fn name(&self) -> &str {
        "reroute"
    }

    fn on_before_request(&self, mut request: OutboundRequest) -> Result<OutboundRequest, BoxError> {
        let url = url::Url::parse(request.destination())?;
        if !self.matches(url.path()) {
            return Ok(request);
        }

        let destination = match url.query() {
            Some(q) => format!("{}{}?{q}", self.upstream, url.path()),
            None => format!("{}{}", self.upstream, url.path()),
        };
        tracing::debug!(from = %url, to = %destination, "rerouting request");
        request.set_destination(destination);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::message::HttpMethod;

    #[test]
    fn matching_prefix_switches_base() {
        let modifier = RerouteModifier::new("/config", "http://config:8080/");
        let request = OutboundRequest::new("http://upstream:9000/config/v1?x=1", HttpMethod::Get);

        let request = modifier.on_before_request(request).unwrap();
        assert_eq!(request.destination(), "http://config:8080/config/v1?x=1");
    }

    #[test]
    fn other_paths_are_untouched() {
        let modifier = RerouteModifier::new("/config", "http://config:8080");
        let request = OutboundRequest::new("http://upstream:9000/status", HttpMethod::Get);

        let request = modifier.on_before_request(request).unwrap();
        assert_eq!(request.destination(), "http://upstream:9000/status");
    }

    #[test]
    fn prefix_matches_whole_segments_only() {
        let modifier = RerouteModifier::new("/config", "http://config:8080");

        for path in ["/configuration", "/configs/x"] {
            let request = OutboundRequest::new(format!("http://upstream:9000{path}"), HttpMethod::Get);
            let request = modifier.on_before_request(request).unwrap();
            assert_eq!(request.destination(), format!("http://upstream:9000{path}"));
        }

        let request = OutboundRequest::new("http://upstream:9000/config", HttpMethod::Get);
        let request = modifier.on_before_request(request).unwrap();
        assert_eq!(request.destination(), "http://config:8080/config");
    }

    #[test]
    fn trailing_slash_prefix_still_matches_segment() {
        let modifier = RerouteModifier::new("/config/", "http://config:8080");
        let request = OutboundRequest::new("http://upstream:9000/config/v1", HttpMethod::Get);

        let request = modifier.on_before_request(request).unwrap();
        assert_eq!(request.destination(), "http://config:8080/config/v1");
    }

    #[test]
    fn unparseable_destination_is_an_error() {
        let modifier = RerouteModifier::new("/config", "http://config:8080");
        let request = OutboundRequest::new("not a url", HttpMethod::Get);

        assert!(modifier.on_before_request(request).is_err());
    }
}
