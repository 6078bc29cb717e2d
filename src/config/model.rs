//! Serde data structures for the Waypoint configuration file.
//!
//! Contains [`Config`] (the root), [`Defaults`], [`ModifierSpec`] (one
//! entry of the modifier chain, tagged by `kind`) and [`HeaderRules`].
//! Structs use `deny_unknown_fields` for strict parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::proxy::message::HttpMethod;

const fn default_timeout() -> u64 {
    5000
}

fn default_methods() -> Vec<String> {
    vec!["*".to_string()]
}

fn is_default_timeout(v: &u64) -> bool {
    *v == default_timeout()
}

fn is_default_methods(v: &[String]) -> bool {
    v.len() == 1 && v[0] == "*"
}

fn is_default_defaults(v: &Defaults) -> bool {
    v.timeout == default_timeout()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL every request is forwarded to.
    pub upstream: String,

    #[serde(default, skip_serializing_if = "is_default_defaults")]
    pub defaults: Defaults,

    /// Registration order is chain order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierSpec>,
}

impl Config {
    /// Number of (modifier, method) registrations the config produces.
    #[must_use]
    pub fn total_registrations(&self) -> usize {
        self.modifiers
            .iter()
            .map(|m| resolve_methods(m.methods()).map_or(0, |methods| methods.len()))
            .sum()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Upstream timeout in milliseconds.
    #[serde(
        default = "default_timeout",
        skip_serializing_if = "is_default_timeout"
    )]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ModifierSpec {
    /// Add or strip request and response headers.
    Headers {
        #[serde(
            default = "default_methods",
            skip_serializing_if = "is_default_methods"
        )]
        methods: Vec<String>,

        #[serde(default, skip_serializing_if = "HeaderRules::is_default")]
        request: HeaderRules,

        #[serde(default, skip_serializing_if = "HeaderRules::is_default")]
        response: HeaderRules,
    },

    /// Send requests whose path starts with `prefix` to another base URL.
    Reroute {
        #[serde(
            default = "default_methods",
            skip_serializing_if = "is_default_methods"
        )]
        methods: Vec<String>,

        prefix: String,

        upstream: String,
    },

    /// Textual find/replace over response bodies.
    Replace {
        #[serde(
            default = "default_methods",
            skip_serializing_if = "is_default_methods"
        )]
        methods: Vec<String>,

        find: String,

        replace: String,
    },
}

impl ModifierSpec {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Headers { .. } => "headers",
            Self::Reroute { .. } => "reroute",
            Self::Replace { .. } => "replace",
        }
    }

    #[must_use]
    pub fn methods(&self) -> &[String] {
        match self {
            Self::Headers { methods, .. }
            | Self::Reroute { methods, .. }
            | Self::Replace { methods, .. } => methods,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderRules {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub add: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strip: Vec<String>,
}

impl HeaderRules {
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.add.is_empty() && self.strip.is_empty()
    }
}

/// Expand a config method list into [`HttpMethod`]s.
///
/// `"*"` stands for every proxyable method. Duplicates are dropped,
/// order is kept. Unknown names are returned as the error.
pub fn resolve_methods(methods: &[String]) -> Result<Vec<HttpMethod>, String> {
    let mut resolved = Vec::new();
    for name in methods {
        let expanded: Vec<HttpMethod> = if name == "*" {
            HttpMethod::PROXYABLE.to_vec()
        } else {
            vec![name.parse().map_err(|_| name.clone())?]
        };
        for method in expanded {
            if !resolved.contains(&method) {
                resolved.push(method);
            }
        }
    }
    Ok(resolved)
}
