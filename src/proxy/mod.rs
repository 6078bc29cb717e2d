//! Core HTTP forwarding.
//!
//! The [`forward_handler`] function is the Axum fallback that receives
//! every non-health request, converts it into an
//! [`InboundRequest`](message::InboundRequest) and hands it to the
//! current [`ForwardingEngine`](engine::ForwardingEngine). Submodules hold
//! the message types ([`message`]), the modifier capability
//! ([`modifier`]), per-method chains ([`registry`]), the network layer
//! ([`upstream`]), error reporting ([`diagnostics`]) and the engine
//! itself ([`engine`]).

pub mod diagnostics;
pub mod engine;
pub mod message;
pub mod modifier;
pub mod registry;
pub mod upstream;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::server::AppState;
use message::{HttpMethod, InboundRequest};

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path();
    let correlation_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    // Only proxyable methods reach the engine.
    let proxied = match method.as_str().parse::<HttpMethod>() {
        Ok(m) if m.is_proxyable() => m,
        _ => {
            tracing::warn!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path,
                "method not proxied"
            );
            return StatusCode::METHOD_NOT_ALLOWED.into_response();
        }
    };

    // Clone the Arc<ForwardingEngine> to release the RwLock before .await
    let engine = Arc::clone(&state.engine.read().await.engine);

    tracing::info!(
        correlation_id = %correlation_id,
        method = %method,
        path = %path,
        modifiers = engine.registry().lookup(proxied).len(),
        "request received"
    );

    let inbound = InboundRequest {
        method: method.as_str().to_string(),
        path: path.to_string(),
        query: uri.query().map(String::from),
        headers: req_headers,
        body,
    };

    match engine.forward(inbound).await {
        Ok(reply) => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            let mut builder = Response::builder().status(reply.status);
            for (key, value) in &reply.headers {
                builder = builder.header(key, value);
            }
            builder.body(Body::from(reply.body)).unwrap_or_else(|e| {
                tracing::error!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "failed to build response"
                );
                StatusCode::BAD_GATEWAY.into_response()
            })
        }
        Err(e) => {
            // The engine never synthesizes a response; total failure is a 502.
            tracing::error!(
                correlation_id = %correlation_id,
                error = %e,
                "forwarding failed"
            );
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}
