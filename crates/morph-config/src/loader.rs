//! Configuration file loading
//!
//! The format is picked from the file extension. YAML support sits behind the
//! `yaml` feature (on by default).

use crate::{ConfigError, ConfigResult, EngineConfig};
use std::{fs, path::Path};
use tracing::debug;

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`)
    Toml,
    /// JSON (`.json`)
    Json,
    /// YAML (`.yaml`, `.yml`)
    #[cfg(feature = "yaml")]
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(ConfigError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                other.to_string()
            })),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
            #[cfg(feature = "yaml")]
            Self::Yaml => "yaml",
        }
    }
}

/// Loads and validates [`EngineConfig`] values
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, detecting the format from its extension.
    ///
    /// The loaded configuration is validated before it is returned.
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<EngineConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loading {} config from {}", format.name(), path.display());
        Self::load_from_str(&contents, format)
    }

    /// Parse configuration text in an explicit format
    pub fn load_from_str(contents: &str, format: ConfigFormat) -> ConfigResult<EngineConfig> {
        let config: EngineConfig = match format {
            ConfigFormat::Toml => {
                toml::from_str(contents).map_err(|e| ConfigError::parse("toml", e))?
            }
            ConfigFormat::Json => {
                serde_json::from_str(contents).map_err(|e| ConfigError::parse("json", e))?
            }
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(contents).map_err(|e| ConfigError::parse("yaml", e))?
            }
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use test_case::test_case;

    fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).expect("Failed to create file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write file");
        path
    }

    #[test_case("morph.toml", "fallback_source = \"fb\"" ; "toml")]
    #[test_case("morph.json", r#"{"fallback_source": "fb"}"# ; "json")]
    fn test_load_from_file(name: &str, contents: &str) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_config(&dir, name, contents);

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.fallback_source, "fb");
        assert_eq!(config.origin_source, "origin");
    }

    #[cfg(feature = "yaml")]
    #[test_case("morph.yaml" ; "yaml")]
    #[test_case("morph.yml" ; "yml")]
    fn test_load_yaml_file(name: &str) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_config(&dir, name, "fallback_source: fb");

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.fallback_source, "fb");
    }

    #[cfg(not(feature = "yaml"))]
    #[test]
    fn test_yaml_needs_feature() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_config(&dir, "morph.yaml", "fallback_source: fb");

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "yaml"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_config(&dir, "morph.ini", "x=1");

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from_file("/nonexistent/morph.toml").unwrap_err();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_parse_error() {
        let err = ConfigLoader::load_from_str("origin_source = ", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "toml", .. }));
    }

    #[test]
    fn test_loaded_config_is_validated() {
        let err =
            ConfigLoader::load_from_str(r#"{"tag_source": "origin"}"#, ConfigFormat::Json)
                .unwrap_err();
        assert_eq!(err.category(), "invalid_value");
    }
}
