//! Waypoint is an HTTP forwarding proxy with per-method modifier chains.
//!
//! Every inbound request is forwarded to a single upstream target. Before
//! that, the request passes through the chain of modifiers registered for
//! its HTTP method: each modifier may rewrite the outbound request and the
//! upstream's response. When no modifier produces a response, the request
//! is forwarded directly.
//!
//! # Architecture
//!
//! - [`proxy`] -- The core: message types, the
//!   [`Modifier`](proxy::modifier::Modifier) trait, the
//!   [`ModifierRegistry`](proxy::registry::ModifierRegistry), the
//!   [`ForwardingEngine`](proxy::engine::ForwardingEngine), the upstream
//!   client seam, and the Axum fallback handler.
//! - [`modifiers`] -- Built-in, config-driven modifiers (headers, reroute,
//!   replace) and registry construction.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`config`] -- Configuration model, validation, and file sources via
//!   the [`ConfigSource`](config::ConfigSource) trait.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- Health endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`server`] -- Axum server setup, shared application state, HTTP client,
//!   engine construction, and graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file formats |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod modifiers;
pub mod proxy;
pub mod server;
