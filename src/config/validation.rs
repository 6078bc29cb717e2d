//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors: a malformed upstream URL, unknown or reserved HTTP methods on
//! a modifier, bad reroute prefixes and targets, empty replace patterns
//! and invalid header names or values. Returns every
//! [`ValidationError`] found, each with an optional suggestion.

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use super::model::{Config, HeaderRules, ModifierSpec};
use crate::error::ValidationError;
use crate::proxy::message::HttpMethod;

/// Validate an upstream base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_upstream_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.query().is_some() {
                Err("upstream URL cannot carry a query string".into())
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

/// Validate a modifier method name. Returns `Ok(())` or a human-readable error.
pub fn validate_method(method: &str) -> Result<(), String> {
    if method == "*" {
        return Ok(());
    }
    match method.parse::<HttpMethod>() {
        Ok(m) if m.is_proxyable() => Ok(()),
        Ok(m) => Err(format!("{m} requests are never proxied")),
        Err(_) => Err(format!("'{method}' is not a valid HTTP method")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(msg) = validate_upstream_url(&config.upstream) {
        errors.push(ValidationError {
            field: "upstream".into(),
            message: msg,
            suggestion: None,
        });
    }

    if config.defaults.timeout == 0 {
        errors.push(ValidationError {
            field: "defaults.timeout".into(),
            message: "timeout must be greater than zero".into(),
            suggestion: Some("the default is 5000".into()),
        });
    }

    for (i, modifier) in config.modifiers.iter().enumerate() {
        let prefix = format!("modifiers[{i}]");

        if modifier.methods().is_empty() {
            errors.push(ValidationError {
                field: format!("{prefix}.methods"),
                message: "at least one method must be listed".into(),
                suggestion: Some("use [\"*\"] for every method".into()),
            });
        }

        for method in modifier.methods() {
            if let Err(msg) = validate_method(method) {
                let reserved = method
                    .parse::<HttpMethod>()
                    .is_ok_and(|m| !m.is_proxyable());
                errors.push(ValidationError {
                    field: format!("{prefix}.methods"),
                    message: msg,
                    suggestion: reserved.then(|| "remove it from the list".into()),
                });
            }
        }

        match modifier {
            ModifierSpec::Headers {
                request, response, ..
            } => {
                validate_header_rules(&format!("{prefix}.request"), request, &mut errors);
                validate_header_rules(&format!("{prefix}.response"), response, &mut errors);
            }
            ModifierSpec::Reroute {
                prefix: path_prefix,
                upstream,
                ..
            } => {
                if !path_prefix.starts_with('/') {
                    errors.push(ValidationError {
                        field: format!("{prefix}.prefix"),
                        message: "prefix must start with '/'".into(),
                        suggestion: Some(format!("did you mean '/{path_prefix}'?")),
                    });
                }
                if let Err(msg) = validate_upstream_url(upstream) {
                    errors.push(ValidationError {
                        field: format!("{prefix}.upstream"),
                        message: msg,
                        suggestion: None,
                    });
                }
            }
            ModifierSpec::Replace { find, .. } => {
                if find.is_empty() {
                    errors.push(ValidationError {
                        field: format!("{prefix}.find"),
                        message: "find pattern cannot be empty".into(),
                        suggestion: None,
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_header_rules(field: &str, rules: &HeaderRules, errors: &mut Vec<ValidationError>) {
    for (name, value) in &rules.add {
        if name.parse::<HeaderName>().is_err() {
            errors.push(ValidationError {
                field: format!("{field}.add"),
                message: format!("'{name}' is not a valid header name"),
                suggestion: None,
            });
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError {
                field: format!("{field}.add"),
                message: format!("value of '{name}' is not a valid header value"),
                suggestion: None,
            });
        }
    }
    for name in &rules.strip {
        if name.parse::<HeaderName>().is_err() {
            errors.push(ValidationError {
                field: format!("{field}.strip"),
                message: format!("'{name}' is not a valid header name"),
                suggestion: None,
            });
        }
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![format!(
        "  upstream {} ({}ms timeout), {} modifiers, {} registrations\n",
        config.upstream,
        config.defaults.timeout,
        config.modifiers.len(),
        config.total_registrations()
    )];

    for (i, modifier) in config.modifiers.iter().enumerate() {
        let detail = match modifier {
            ModifierSpec::Headers {
                request, response, ..
            } => format!(
                "request +{}/-{}, response +{}/-{}",
                request.add.len(),
                request.strip.len(),
                response.add.len(),
                response.strip.len()
            ),
            ModifierSpec::Reroute {
                prefix, upstream, ..
            } => format!("{prefix} -> {upstream}"),
            ModifierSpec::Replace { find, replace, .. } => format!("'{find}' -> '{replace}'"),
        };
        lines.push(format!("  {}. {}  {}", i + 1, modifier.kind(), detail));
        lines.push(format!("    methods: {}", modifier.methods().join(", ")));
    }

    format!("{} is valid\n{}", path, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::Defaults;

    fn minimal_config() -> Config {
        Config {
            upstream: "http://localhost:9000".into(),
            defaults: Defaults::default(),
            modifiers: vec![],
        }
    }

    fn with_modifier(modifier: ModifierSpec) -> Config {
        Config {
            modifiers: vec![modifier],
            ..minimal_config()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn invalid_upstream_fails() {
        let config = Config {
            upstream: "not a url".into(),
            ..minimal_config()
        };
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("not a valid URL"));
    }

    #[test]
    fn non_http_upstream_fails() {
        let config = Config {
            upstream: "ftp://files.example".into(),
            ..minimal_config()
        };
        let errors = validate(&config).unwrap_err();
        assert!(errors[0].message.contains("unsupported scheme"));
    }

    #[test]
    fn reserved_method_fails_with_suggestion() {
        let config = with_modifier(ModifierSpec::Replace {
            methods: vec!["GET".into(), "trace".into()],
            find: "a".into(),
            replace: "b".into(),
        });
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "modifiers[0].methods");
        assert!(errors[0].message.contains("TRACE requests are never proxied"));
        assert!(errors[0].suggestion.is_some());
    }

    #[test]
    fn unknown_method_fails() {
        let config = with_modifier(ModifierSpec::Replace {
            methods: vec!["FETCH".into()],
            find: "a".into(),
            replace: "b".into(),
        });
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message.contains("not a valid HTTP method")));
    }

    #[test]
    fn reroute_prefix_without_slash_fails() {
        let config = with_modifier(ModifierSpec::Reroute {
            methods: vec!["*".into()],
            prefix: "config".into(),
            upstream: "http://config:8080".into(),
        });
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.suggestion.as_deref() == Some("did you mean '/config'?")));
    }

    #[test]
    fn empty_find_fails() {
        let config = with_modifier(ModifierSpec::Replace {
            methods: vec!["*".into()],
            find: String::new(),
            replace: "b".into(),
        });
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors[0].field, "modifiers[0].find");
    }

    #[test]
    fn invalid_header_name_fails() {
        let mut request = HeaderRules::default();
        request.add.insert("bad header".into(), "v".into());
        let config = with_modifier(ModifierSpec::Headers {
            methods: vec!["*".into()],
            request,
            response: HeaderRules::default(),
        });
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors[0].field, "modifiers[0].request.add");
    }

    #[test]
    fn report_lists_modifiers() {
        let config = with_modifier(ModifierSpec::Reroute {
            methods: vec!["GET".into()],
            prefix: "/config".into(),
            upstream: "http://config:8080".into(),
        });
        let report = format_validation_report("waypoint.yaml", &config);
        assert!(report.starts_with("waypoint.yaml is valid"));
        assert!(report.contains("1. reroute  /config -> http://config:8080"));
        assert!(report.contains("methods: GET"));
        assert!(report.contains("1 modifiers, 1 registrations"));
    }

    #[test]
    fn report_counts_wildcard_registrations() {
        let config = with_modifier(ModifierSpec::Replace {
            methods: vec!["*".into()],
            find: "a".into(),
            replace: "b".into(),
        });
        let report = format_validation_report("waypoint.yaml", &config);
        assert!(report.contains("1 modifiers, 7 registrations"));
    }
}
