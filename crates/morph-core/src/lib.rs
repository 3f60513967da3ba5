//! # Morph Core
//!
//! Operator evaluation engine for morph templates. Given a parsed AST node
//! and a set of named JSON source documents, the engine resolves the node's
//! value through a fixed stage pipeline.
//!
//! ## Stages
//!
//! - **Dereference**: resolve the node's path against a source document
//! - **Query**: collapse the matches (last match, or `+N` to take a prefix)
//! - **Constraints**: soft defaults (`?`), alternate sources (`!=`) and
//!   tag handlers (`!name`)
//! - **Symbol**: record the value in the pass-wide [`TagTable`] (`#`)
//! - **Enumerate**: expand containers into elements (`*`) or entries (`**`)
//! - **Pipe**: run the ordered `$1`, `$2`, ... function pipeline
//!
//! [`stages::inception`] composes nested templates through a [`Transform`]
//! injected by the driver.
//!
//! ## Quick Start
//!
//! ```rust
//! use morph_core::{apply_all, AstNode, Context, Environment, FunctionRegistry, Sources, TagTable};
//! use serde_json::json;
//!
//! let env = Environment::new(Sources::new().with_source("origin", json!({"n": ["1", "2"]})))
//!     .with_functions(FunctionRegistry::with_builtins());
//! let node: AstNode = serde_json::from_value(json!({
//!     "path": "n[*]",
//!     "pipes": {"$1": "toInt"}
//! }))?;
//!
//! let mut tags = TagTable::new();
//! let node = apply_all(&env).apply(&node, &mut tags, &Context::root())?;
//! assert_eq!(node.value, Some(json!(2)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all)]

pub mod ast;
mod builtins;
pub mod context;
pub mod error;
pub mod operators;
pub mod path;
pub mod registry;
pub mod sort;
pub mod stages;
pub mod tags;
pub mod value;

pub use ast::{meta, AstNode};
pub use context::{Context, Environment, Sources};
pub use error::{OperatorError, OperatorResult};
pub use operators::{
    ConstraintOp, Depth, EnumerateOp, InceptionMode, InceptionOp, Operators, QueryOp, SymbolOp,
};
pub use path::{normalize, JsonPathQuery, PathError, PathQuery, PathSegment};
pub use registry::{FunctionError, FunctionRegistry, PipeFn, TagHandler, TagHandlerRegistry};
pub use sort::{compare_values, sort_by, SortOptions};
pub use stages::inception::Transform;
pub use stages::{apply_all, StageComposer};
pub use tags::TagTable;

pub use morph_config::EngineConfig;
