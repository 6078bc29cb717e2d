//! Where the engine reports errors it recovers from (or gives up on).

use crate::error::ForwardError;

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &ForwardError);
}

/// Logs every reported error through `tracing` at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, error: &ForwardError) {
        match error {
            ForwardError::Modifier { modifier, source } => {
                tracing::error!(modifier = %modifier, error = %source, "modifier failed");
            }
            ForwardError::Upstream {
                destination,
                source,
            } => {
                tracing::error!(destination = %destination, error = %source, "upstream request failed");
            }
            other => tracing::error!(error = %other, "forwarding failed"),
        }
    }
}
