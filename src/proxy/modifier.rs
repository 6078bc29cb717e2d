//! The [`Modifier`] capability: intercept and rewrite proxied traffic.
//!
//! A modifier sees the working [`OutboundRequest`] before it is sent, the
//! upstream's [`InboundResponse`] after it returns, and any error raised
//! while doing either. Every hook has a pass-through default so an
//! implementation only overrides what it needs.

use crate::error::{BoxError, ForwardError};

use super::message::{InboundResponse, OutboundRequest, OutboundResponse};

pub trait Modifier: Send + Sync {
    /// Name used in logs and in [`ForwardError::Modifier`].
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Rewrite the request before it is executed. The returned value
    /// replaces the working request for the rest of the chain.
    fn on_before_request(&self, request: OutboundRequest) -> Result<OutboundRequest, BoxError> {
        Ok(request)
    }

    /// Turn the upstream response into the response offered to the caller.
    fn on_response(&self, response: InboundResponse) -> Result<OutboundResponse, BoxError> {
        Ok(response.into())
    }

    /// Called when this modifier's hooks or its upstream execution failed.
    fn on_exception(&self, _error: &ForwardError) {}
}
