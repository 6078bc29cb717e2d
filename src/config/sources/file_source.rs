//! Generic async file-based config source with SHA256 change detection.
//!
//! [`FileSource`] implements [`ConfigSource`]
//! for any file format by accepting a deserialization function at
//! construction time. It reads the file asynchronously via Tokio,
//! validates the result, and computes a SHA256 hash for version tracking.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{sha256_hex, Deserializer};
use crate::config::model::Config;
use crate::config::validation::validate;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::WaypointError;

pub struct FileSource {
    path: PathBuf,
    name: &'static str,
    deserialize: Deserializer,
}

impl FileSource {
    #[must_use]
    pub fn new(
        path: PathBuf,
        name: &'static str,
        deserialize: Deserializer,
    ) -> Self {
        Self {
            path,
            name,
            deserialize,
        }
    }

    async fn read_content(&self) -> Result<String, WaypointError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WaypointError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                WaypointError::Io(e)
            }
        })
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn load(&self) -> Result<(Config, ConfigVersion), WaypointError> {
        let content = self.read_content().await?;

        let config = (self.deserialize)(&content).map_err(|e| WaypointError::ConfigParse {
            path: self.path.display().to_string(),
            source: e,
        })?;

        if let Err(errors) = validate(&config) {
            return Err(WaypointError::ConfigValidation { errors });
        }

        let hash = sha256_hex(content.as_bytes());
        Ok((config, ConfigVersion::Hash(hash)))
    }

    async fn has_changed(&self, current: &ConfigVersion) -> Result<bool, WaypointError> {
        let content = self.read_content().await?;
        let hash = sha256_hex(content.as_bytes());
        Ok(*current != ConfigVersion::Hash(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;

    fn json_like(content: &str) -> Result<Config, BoxError> {
        serde_json::from_str::<Config>(content).map_err(|e| Box::new(e) as BoxError)
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("waypoint-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn loads_and_detects_changes() {
        let path = temp_path("change.json");
        tokio::fs::write(&path, r#"{"upstream": "http://localhost:9000"}"#)
            .await
            .unwrap();

        let source = FileSource::new(path.clone(), "json", json_like);
        let (config, version) = source.load().await.unwrap();
        assert_eq!(config.upstream, "http://localhost:9000");
        assert!(!source.has_changed(&version).await.unwrap());

        tokio::fs::write(&path, r#"{"upstream": "http://localhost:9001"}"#)
            .await
            .unwrap();
        assert!(source.has_changed(&version).await.unwrap());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let source = FileSource::new(temp_path("missing.json"), "json", json_like);
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, WaypointError::ConfigFileNotFound { .. }));
    }

    #[tokio::test]
    async fn invalid_config_fails_validation() {
        let path = temp_path("invalid.json");
        tokio::fs::write(&path, r#"{"upstream": "ftp://nope"}"#)
            .await
            .unwrap();

        let source = FileSource::new(path.clone(), "json", json_like);
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, WaypointError::ConfigValidation { .. }));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
