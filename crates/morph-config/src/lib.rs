//! # Morph Configuration
//!
//! Engine configuration for the morph operator evaluation engine.
//!
//! ## Features
//!
//! - Source naming (origin, fallback, tag table alias)
//! - Literal argument coercion switch
//! - Multi-format loading (TOML, JSON, YAML behind the `yaml` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use morph_config::ConfigLoader;
//!
//! let config = ConfigLoader::load_from_file("morph.toml")?;
//! assert_eq!(config.origin_source, "origin");
//! # Ok::<(), morph_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::*;
pub use loader::*;
