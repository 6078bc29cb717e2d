//! `waypoint init`: generate a starter configuration file.
//!
//! Creates a YAML, JSON, or TOML config file with either minimal
//! or fully documented templates.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::WaypointError;

pub fn execute(args: &InitArgs) -> Result<(), WaypointError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("waypoint.{}", args.format.extension())));

    if output.exists() {
        return Err(WaypointError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format, args.full))?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub const fn template(format: &ConfigFormat, full: bool) -> &'static str {
    match (format, full) {
        (ConfigFormat::Yaml, false) => YAML_MINIMAL,
        (ConfigFormat::Yaml, true) => YAML_FULL,
        (ConfigFormat::Json, false) => JSON_MINIMAL,
        (ConfigFormat::Json, true) => JSON_FULL,
        (ConfigFormat::Toml, false) => TOML_MINIMAL,
        (ConfigFormat::Toml, true) => TOML_FULL,
    }
}

const YAML_MINIMAL: &str = r#"# Waypoint config

upstream: "http://localhost:8080"
"#;

const YAML_FULL: &str = r#"# Waypoint config
#
# Every request is forwarded to `upstream`. Modifiers run in the order
# listed here, per HTTP method. TRACE and CONNECT are never proxied.

upstream: "http://localhost:8080"

# defaults:
#   timeout: 5000              # Upstream timeout in ms

modifiers:
  # Add or strip headers on the way out and on the way back
  - kind: headers
    methods: ["*"]             # Default: every proxyable method
    request:
      add:
        X-Proxy: "waypoint"
      strip: ["Cookie"]
    response:
      strip: ["Server"]

  # Send a path prefix to a different base URL
  # - kind: reroute
  #   methods: ["GET", "POST"]
  #   prefix: "/config"
  #   upstream: "http://config-service:8080"

  # Rewrite text in response bodies
  # - kind: replace
  #   methods: ["GET"]
  #   find: "https://real.example"
  #   replace: "http://127.0.0.1:3000"
"#;

const JSON_MINIMAL: &str = r#"{
  "upstream": "http://localhost:8080"
}
"#;

const JSON_FULL: &str = r#"{
  "upstream": "http://localhost:8080",
  "defaults": {
    "timeout": 5000
  },
  "modifiers": [
    {
      "kind": "headers",
      "methods": ["*"],
      "request": {
        "add": { "X-Proxy": "waypoint" },
        "strip": ["Cookie"]
      },
      "response": {
        "strip": ["Server"]
      }
    },
    {
      "kind": "reroute",
      "methods": ["GET", "POST"],
      "prefix": "/config",
      "upstream": "http://config-service:8080"
    },
    {
      "kind": "replace",
      "methods": ["GET"],
      "find": "https://real.example",
      "replace": "http://127.0.0.1:3000"
    }
  ]
}
"#;

const TOML_MINIMAL: &str = r#"# Waypoint config

upstream = "http://localhost:8080"
"#;

const TOML_FULL: &str = r#"# Waypoint config
#
# Every request is forwarded to `upstream`. Modifiers run in the order
# listed here, per HTTP method. TRACE and CONNECT are never proxied.

upstream = "http://localhost:8080"

[defaults]
# timeout = 5000

[[modifiers]]
kind = "headers"
methods = ["*"]

[modifiers.request]
add = { X-Proxy = "waypoint" }
strip = ["Cookie"]

[modifiers.response]
strip = ["Server"]

# [[modifiers]]
# kind = "reroute"
# methods = ["GET", "POST"]
# prefix = "/config"
# upstream = "http://config-service:8080"

# [[modifiers]]
# kind = "replace"
# methods = ["GET"]
# find = "https://real.example"
# replace = "http://127.0.0.1:3000"
"#;
