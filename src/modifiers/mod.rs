//! Built-in, config-driven modifiers.
//!
//! - [`headers`] -- add/strip request and response headers.
//! - [`reroute`] -- send a path prefix to a different base URL.
//! - [`replace`] -- find/replace text in response bodies.
//!
//! [`build_registry`] turns the config's `modifiers` list into a
//! [`ModifierRegistry`], registering each entry for its methods in file
//! order.

pub mod headers;
pub mod replace;
pub mod reroute;

use std::sync::Arc;

use crate::config::model::{resolve_methods, Config, ModifierSpec};
use crate::error::{ValidationError, WaypointError};
use crate::proxy::modifier::Modifier;
use crate::proxy::registry::ModifierRegistry;

pub use headers::HeaderModifier;
pub use replace::ReplaceModifier;
pub use reroute::RerouteModifier;

#[must_use]
pub fn instantiate(spec: &ModifierSpec) -> Arc<dyn Modifier> {
    match spec {
        ModifierSpec::Headers {
            request, response, ..
        } => Arc::new(HeaderModifier::new(request, response)),
        ModifierSpec::Reroute {
            prefix, upstream, ..
        } => Arc::new(RerouteModifier::new(prefix.clone(), upstream)),
        ModifierSpec::Replace { find, replace, .. } => {
            Arc::new(ReplaceModifier::new(find.clone(), replace.clone()))
        }
    }
}

pub fn build_registry(config: &Config) -> Result<ModifierRegistry, WaypointError> {
    let mut registry = ModifierRegistry::new();

    for (i, spec) in config.modifiers.iter().enumerate() {
        let methods = resolve_methods(spec.methods()).map_err(|name| {
            WaypointError::ConfigValidation {
                errors: vec![ValidationError {
                    field: format!("modifiers[{i}].methods"),
                    message: format!("'{name}' is not a valid HTTP method"),
                    suggestion: None,
                }],
            }
        })?;

        registry.register(instantiate(spec), &methods)?;
        tracing::debug!(
            index = i,
            kind = spec.kind(),
            methods = ?methods,
            "modifier registered"
        );
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{Defaults, HeaderRules};
    use crate::proxy::message::HttpMethod;

    fn config(modifiers: Vec<ModifierSpec>) -> Config {
        Config {
            upstream: "http://localhost:9000".into(),
            defaults: Defaults::default(),
            modifiers,
        }
    }

    #[test]
    fn registers_in_file_order() {
        let registry = build_registry(&config(vec![
            ModifierSpec::Headers {
                methods: vec!["GET".into()],
                request: HeaderRules::default(),
                response: HeaderRules::default(),
            },
            ModifierSpec::Replace {
                methods: vec!["*".into()],
                find: "a".into(),
                replace: "b".into(),
            },
        ]))
        .unwrap();

        let get: Vec<&str> = registry
            .lookup(HttpMethod::Get)
            .iter()
            .map(|m| m.name())
            .collect();
        assert_eq!(get, ["headers", "replace"]);
        let post: Vec<&str> = registry
            .lookup(HttpMethod::Post)
            .iter()
            .map(|m| m.name())
            .collect();
        assert_eq!(post, ["replace"]);
        assert!(registry.lookup(HttpMethod::Trace).is_empty());
    }

    #[test]
    fn reserved_method_is_rejected() {
        let err = build_registry(&config(vec![ModifierSpec::Replace {
            methods: vec!["CONNECT".into()],
            find: "a".into(),
            replace: "b".into(),
        }]))
        .unwrap_err();
        assert!(matches!(err, WaypointError::UnsupportedMethod(e) if e.method == HttpMethod::Connect));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = build_registry(&config(vec![ModifierSpec::Replace {
            methods: vec!["FETCH".into()],
            find: "a".into(),
            replace: "b".into(),
        }]))
        .unwrap_err();
        assert!(matches!(err, WaypointError::ConfigValidation { .. }));
    }
}
