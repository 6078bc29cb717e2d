//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! File-based sources for YAML, JSON and TOML, each gated by its feature
//! flag. Every format is a [`FileSource`] paired with a deserializer
//! picked from the file extension by [`deserializer_for`].

pub mod file_source;

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::model::Config;
use crate::config::ConfigSource;
use crate::error::{BoxError, WaypointError};
use file_source::FileSource;

pub type Deserializer = fn(&str) -> Result<Config, BoxError>;

#[cfg(feature = "yaml")]
fn from_yaml(content: &str) -> Result<Config, BoxError> {
    serde_yml::from_str(content).map_err(|e| Box::new(e) as BoxError)
}

#[cfg(feature = "json")]
fn from_json(content: &str) -> Result<Config, BoxError> {
    serde_json::from_str(content).map_err(|e| Box::new(e) as BoxError)
}

#[cfg(feature = "toml")]
fn from_toml(content: &str) -> Result<Config, BoxError> {
    toml::from_str(content).map_err(|e| Box::new(e) as BoxError)
}

/// Source name and deserializer for a file extension, if the format is
/// compiled in.
#[must_use]
pub fn deserializer_for(ext: &str) -> Option<(&'static str, Deserializer)> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Some(("yaml", from_yaml as Deserializer)),

        #[cfg(feature = "json")]
        "json" => Some(("json", from_json as Deserializer)),

        #[cfg(feature = "toml")]
        "toml" => Some(("toml", from_toml as Deserializer)),

        _ => None,
    }
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, WaypointError> {
    let (_, deserialize) =
        deserializer_for(ext).ok_or_else(|| WaypointError::UnsupportedFormat(ext.to_string()))?;
    deserialize(content).map_err(|source| WaypointError::ConfigParse {
        path: path_display.to_string(),
        source,
    })
}

/// Pick the file source matching `path`'s extension.
pub fn for_path(path: &Path) -> Result<Box<dyn ConfigSource>, WaypointError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let (name, deserialize) =
        deserializer_for(ext).ok_or_else(|| WaypointError::UnsupportedFormat(ext.to_string()))?;
    Ok(Box::new(FileSource::new(path.to_path_buf(), name, deserialize)))
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_stable_hex() {
        assert_eq!(
            sha256_hex(b"waypoint"),
            sha256_hex(b"waypoint"),
        );
        assert_eq!(sha256_hex(b"").len(), 64);
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = parse_config_str("ini", "", "waypoint.ini").unwrap_err();
        assert!(matches!(err, WaypointError::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_modifiers_are_tagged_by_kind() {
        let content = r#"
upstream: "http://127.0.0.1:9000"
modifiers:
  - kind: reroute
    prefix: "/config"
    upstream: "http://config:8080"
  - kind: replace
    methods: ["GET"]
    find: "a"
    replace: "b"
"#;
        let config = parse_config_str("yaml", content, "inline").unwrap();
        assert_eq!(config.modifiers.len(), 2);
        assert_eq!(config.modifiers[0].kind(), "reroute");
        assert_eq!(config.modifiers[0].methods(), ["*"]);
        assert_eq!(config.modifiers[1].methods(), ["GET"]);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_unknown_root_field_is_rejected() {
        let content = "upstream: \"http://127.0.0.1:9000\"\nroutes: []\n";
        assert!(parse_config_str("yaml", content, "inline").is_err());
    }
}
