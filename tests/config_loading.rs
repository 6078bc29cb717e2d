//! Integration tests for config loading across all file formats.

use waypoint::config::model::Config;
use waypoint::config::sources::parse_config_str;
use waypoint::config::validation::validate;
use waypoint::modifiers::build_registry;
use waypoint::proxy::message::HttpMethod;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("waypoint.yaml");
    let config = parse_config_str("yaml", &content, "waypoint.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.upstream, "http://localhost:8080");
    assert_eq!(config.modifiers.len(), 1);
}

#[test]
fn yaml_full_example_builds_registry() {
    let content = load_example("full.yaml");
    let config = parse_config_str("yaml", &content, "full.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.defaults.timeout, 3000);
    assert_eq!(config.total_registrations(), 12);

    let registry = build_registry(&config).unwrap();
    assert_eq!(registry.len(), 12);
    // headers, both reroutes, replace
    assert_eq!(registry.lookup(HttpMethod::Get).len(), 4);
    assert_eq!(registry.lookup(HttpMethod::Post).len(), 2);
    assert_eq!(registry.lookup(HttpMethod::Delete).len(), 1);
    assert!(registry.lookup(HttpMethod::Trace).is_empty());
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("waypoint.json");
    let config = parse_config_str("json", &content, "waypoint.json").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.modifiers.len(), 1);
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_loads_and_validates() {
    let content = load_example("waypoint.toml");
    let config = parse_config_str("toml", &content, "waypoint.toml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.modifiers.len(), 1);
}

#[cfg(all(feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equivalent_configs() {
    let yaml_config = parse_config_str("yaml", &load_example("waypoint.yaml"), "yaml").unwrap();
    let json_config = parse_config_str("json", &load_example("waypoint.json"), "json").unwrap();
    let toml_config = parse_config_str("toml", &load_example("waypoint.toml"), "toml").unwrap();

    assert_eq!(yaml_config.upstream, json_config.upstream);
    assert_eq!(yaml_config.upstream, toml_config.upstream);
    assert_eq!(
        yaml_config.total_registrations(),
        json_config.total_registrations()
    );
    assert_eq!(
        yaml_config.total_registrations(),
        toml_config.total_registrations()
    );
}

#[test]
fn unsupported_format_returns_error() {
    let result = parse_config_str("xml", "{}", "test.xml");
    assert!(result.is_err());
}

#[test]
fn relative_upstream_fails_validation() {
    let config: Config = serde_json::from_str(r#"{"upstream": "/api"}"#).unwrap();
    assert!(validate(&config).is_err());
}

#[test]
fn reserved_method_is_rejected_by_validation_and_registry() {
    let json = r#"{
        "upstream": "http://localhost:8080",
        "modifiers": [
            {"kind": "replace", "methods": ["GET", "TRACE"], "find": "a", "replace": "b"}
        ]
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    let errors = validate(&config).unwrap_err();
    assert!(errors.iter().any(|e| e.message.contains("TRACE")));
    assert!(build_registry(&config).is_err());
}

#[test]
fn unknown_modifier_kind_is_a_parse_error() {
    let json = r#"{
        "upstream": "http://localhost:8080",
        "modifiers": [{"kind": "teleport"}]
    }"#;
    assert!(serde_json::from_str::<Config>(json).is_err());
}
