//! Per-pass inputs: named source documents, the traversal context and the
//! injected capabilities every stage reads from.

use crate::path::{self, JsonPathQuery, PathQuery, PathSegment};
use crate::registry::{FunctionRegistry, TagHandlerRegistry};
use morph_config::EngineConfig;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named source documents for one evaluation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sources {
    documents: HashMap<String, Value>,
}

impl Sources {
    /// No sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a source
    pub fn insert(&mut self, name: impl Into<String>, document: Value) -> Option<Value> {
        self.documents.insert(name.into(), document)
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_source(mut self, name: impl Into<String>, document: Value) -> Self {
        self.insert(name, document);
        self
    }

    /// Document registered under `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.documents.get(name)
    }

    /// Registered source names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Sources {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Location of the node being evaluated within the template tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    path: Vec<PathSegment>,
}

impl Context {
    /// Context at the template root
    pub fn root() -> Self {
        Self::default()
    }

    /// Context at an explicit path
    pub fn at(path: Vec<PathSegment>) -> Self {
        Self { path }
    }

    /// Context for a child of this one
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.path.clone();
        path.push(segment.into());
        Self { path }
    }

    /// Segments from the root
    pub fn segments(&self) -> &[PathSegment] {
        &self.path
    }

    /// Canonical path string (`$.a[0]`)
    pub fn path_string(&self) -> String {
        path::stringify(&self.path)
    }
}

/// Read-only dependencies of one evaluation pass.
///
/// Built once by the driver and shared by every stage. The tag table and
/// the traversal [`Context`] are not part of it: the first is the pass's
/// only mutable state and the second changes per node.
pub struct Environment {
    sources: Sources,
    functions: FunctionRegistry,
    tag_handlers: TagHandlerRegistry,
    config: EngineConfig,
    path_query: Arc<dyn PathQuery>,
}

impl Environment {
    /// Environment over `sources` with empty registries, the default
    /// configuration and the built-in path query
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            functions: FunctionRegistry::new(),
            tag_handlers: TagHandlerRegistry::new(),
            config: EngineConfig::default(),
            path_query: Arc::new(JsonPathQuery),
        }
    }

    /// Use `functions` for pipe resolution
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Use `tag_handlers` for `!` constraints
    pub fn with_tag_handlers(mut self, tag_handlers: TagHandlerRegistry) -> Self {
        self.tag_handlers = tag_handlers;
        self
    }

    /// Replace the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the path query capability
    pub fn with_path_query(mut self, path_query: Arc<dyn PathQuery>) -> Self {
        self.path_query = path_query;
        self
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn tag_handlers(&self) -> &TagHandlerRegistry {
        &self.tag_handlers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn path_query(&self) -> &dyn PathQuery {
        self.path_query.as_ref()
    }

    /// The origin document, null when it is not registered
    pub fn origin(&self) -> Value {
        self.sources
            .get(&self.config.origin_source)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("sources", &self.sources.names())
            .field("functions", &self.functions)
            .field("tag_handlers", &self.tag_handlers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sources_lookup() {
        let sources: Sources = [("origin", json!({"a": 1})), ("default", json!(2))]
            .into_iter()
            .collect();
        assert_eq!(sources.get("default"), Some(&json!(2)));
        assert!(sources.get("missing").is_none());
        assert_eq!(sources.names(), vec!["default", "origin"]);
    }

    #[test]
    fn test_context_path_string() {
        let context = Context::root().child("items").child(2usize).child("first name");
        assert_eq!(context.path_string(), r#"$.items[2]["first name"]"#);
        assert_eq!(Context::root().path_string(), "$");
    }

    #[test]
    fn test_environment_origin() {
        let env = Environment::new(Sources::new().with_source("origin", json!([1])));
        assert_eq!(env.origin(), json!([1]));

        let config = EngineConfig {
            origin_source: "root".to_string(),
            ..EngineConfig::default()
        };
        let env = Environment::new(Sources::new()).with_config(config);
        assert_eq!(env.origin(), Value::Null);
    }
}
