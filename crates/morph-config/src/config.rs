//! Engine configuration for one evaluation pass

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Configuration shared by every stage of an evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Source dereferenced when a node names none, and the document inception
    /// leaders are rendered against.
    ///
    /// Default: "origin"
    #[serde(default = "default_origin_source")]
    pub origin_source: String,

    /// Source consulted by the `?` constraint when no source argument is given.
    ///
    /// Default: "default"
    #[serde(default = "default_fallback_source")]
    pub fallback_source: String,

    /// Name under which the tag table is visible to alternate-source lookups.
    ///
    /// Default: "tags"
    #[serde(default = "default_tag_source")]
    pub tag_source: String,

    /// Coerce operator arguments that parse as JSON (`"7"` becomes `7`).
    ///
    /// Default: true
    #[serde(default = "default_literal_arguments")]
    pub literal_arguments: bool,
}

fn default_origin_source() -> String {
    "origin".to_string()
}

fn default_fallback_source() -> String {
    "default".to_string()
}

fn default_tag_source() -> String {
    "tags".to_string()
}

fn default_literal_arguments() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            origin_source: default_origin_source(),
            fallback_source: default_fallback_source(),
            tag_source: default_tag_source(),
            literal_arguments: default_literal_arguments(),
        }
    }
}

impl EngineConfig {
    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("origin_source", &self.origin_source),
            ("fallback_source", &self.fallback_source),
            ("tag_source", &self.tag_source),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(field, "source name must not be empty"));
            }
        }

        if self.tag_source == self.origin_source {
            return Err(ConfigError::invalid(
                "tag_source",
                format!("'{}' shadows the origin source", self.tag_source),
            ));
        }

        Ok(())
    }
}
