//! Unified error types for Waypoint.
//!
//! Defines [`WaypointError`] (the application error enum),
//! [`ForwardError`] for per-request failures inside the forwarding
//! engine, [`UnsupportedMethodError`] for rejected modifier
//! registrations, and [`ValidationError`] for config validation
//! failures. All use `thiserror` for `Display` and `Error` derives.

use std::path::PathBuf;

use crate::proxy::message::HttpMethod;

/// Boxed error used at the seams where foreign errors cross into the core
/// (upstream calls and modifier hooks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

/// A modifier was registered for a method that must never be proxied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("modifiers cannot be registered for {method} requests")]
pub struct UnsupportedMethodError {
    pub method: HttpMethod,
}

/// Failure while forwarding a single request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ForwardError {
    #[error("unknown HTTP method '{0}'")]
    UnknownMethod(String),

    #[error("modifier {modifier} failed: {source}")]
    Modifier {
        modifier: String,
        #[source]
        source: BoxError,
    },

    #[error("upstream request to {destination} failed: {source}")]
    Upstream {
        destination: String,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WaypointError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error(transparent)]
    UnsupportedMethod(#[from] UnsupportedMethodError),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: BoxError,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: BoxError,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}
