//! Turns one inbound request into one reply.
//!
//! [`ForwardingEngine::forward`] builds the canonical [`OutboundRequest`],
//! runs the modifier chain registered for the request's method, and falls
//! back to a direct forward when no modifier produced a response.
//!
//! Chain semantics: every modifier runs in registration order, each one
//! rewriting the working request, executing it, and rewriting the
//! response. A failing modifier is reported and skipped; the chain keeps
//! going and the last modifier that produced a response wins.

use std::sync::Arc;

use http::header::{ACCEPT_ENCODING, CONTENT_TYPE, HOST};

use crate::error::ForwardError;

use super::diagnostics::DiagnosticSink;
use super::message::{HttpMethod, InboundRequest, OutboundRequest, OutboundResponse, Reply};
use super::modifier::Modifier;
use super::registry::ModifierRegistry;
use super::upstream::Upstream;

pub struct ForwardingEngine {
    target: String,
    registry: Arc<ModifierRegistry>,
    upstream: Arc<dyn Upstream>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ForwardingEngine {
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        registry: Arc<ModifierRegistry>,
        upstream: Arc<dyn Upstream>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let target: String = target.into();
        Self {
            target: target.trim_end_matches('/').to_string(),
            registry,
            upstream,
            sink,
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn registry(&self) -> &ModifierRegistry {
        &self.registry
    }

    /// `target + path`, plus `?query` when a non-empty query is present.
    #[must_use]
    pub fn destination(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{path}?{q}", self.target),
            _ => format!("{}{path}", self.target),
        }
    }

    /// Build the canonical outbound request for `inbound`.
    ///
    /// `Host` and `Accept-Encoding` are never copied; the upstream sets
    /// its own.
    pub fn build_request(&self, inbound: &InboundRequest) -> Result<OutboundRequest, ForwardError> {
        let method: HttpMethod = inbound.method.parse()?;
        let destination = self.destination(&inbound.path, inbound.query.as_deref());

        let mut request = OutboundRequest::new(destination, method);
        request.set_body(inbound.body.clone());

        let headers = request.headers_mut();
        for (name, value) in &inbound.headers {
            if name == HOST || name == ACCEPT_ENCODING {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }

        Ok(request)
    }

    /// Forward `inbound` through the modifier chain and the upstream.
    ///
    /// Returns `Err` when the method is unknown, or when no modifier
    /// produced a response and the direct forward failed too. Every
    /// error raised inside the chain is reported to the sink and
    /// swallowed.
    pub async fn forward(&self, inbound: InboundRequest) -> Result<Reply, ForwardError> {
        let mut request = self.build_request(&inbound)?;
        let request_content_type = inbound.headers.get(CONTENT_TYPE).cloned();

        let mut response: Option<OutboundResponse> = None;
        for modifier in self.registry.lookup(request.method()) {
            match modifier.on_before_request(request.clone()) {
                Ok(rewritten) => request = rewritten,
                Err(source) => {
                    self.fail(modifier.as_ref(), &modifier_error(modifier.as_ref(), source));
                    continue;
                }
            }

            match self.exchange(modifier.as_ref(), &request).await {
                Ok(candidate) => response = Some(candidate),
                Err(e) => self.fail(modifier.as_ref(), &e),
            }
        }

        let response = match response {
            Some(response) => response,
            None => match self.upstream.execute(&request).await {
                Ok(inbound_response) => inbound_response.into(),
                Err(source) => {
                    let err = ForwardError::Upstream {
                        destination: request.destination().to_string(),
                        source,
                    };
                    self.sink.report(&err);
                    return Err(err);
                }
            },
        };

        Ok(Reply::new(response, request_content_type))
    }

    /// Execute `request` and let `modifier` rewrite the result.
    async fn exchange(
        &self,
        modifier: &dyn Modifier,
        request: &OutboundRequest,
    ) -> Result<OutboundResponse, ForwardError> {
        let inbound_response =
            self.upstream
                .execute(request)
                .await
                .map_err(|source| ForwardError::Upstream {
                    destination: request.destination().to_string(),
                    source,
                })?;
        modifier
            .on_response(inbound_response)
            .map_err(|source| modifier_error(modifier, source))
    }

    fn fail(&self, modifier: &dyn Modifier, error: &ForwardError) {
        modifier.on_exception(error);
        self.sink.report(error);
    }
}

fn modifier_error(modifier: &dyn Modifier, source: crate::error::BoxError) -> ForwardError {
    ForwardError::Modifier {
        modifier: modifier.name().to_string(),
        source,
    }
}
