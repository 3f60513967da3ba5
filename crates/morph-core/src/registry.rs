//! Named function and tag handler registries.
//!
//! Both registries are built once by the caller and shared read-only by
//! every stage of a pass.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by pipe functions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunctionError {
    /// Wrong number of arguments
    #[error("expected {expected} argument(s), got {found}")]
    Arity {
        /// Expected count (as text, e.g. `1..=2`)
        expected: &'static str,
        /// Actual count
        found: usize,
    },

    /// An argument has the wrong type or value
    #[error("argument {index}: {message}")]
    InvalidArgument {
        /// Zero-based argument position
        index: usize,
        /// What is wrong with it
        message: String,
    },

    /// Function-specific failure
    #[error("{0}")]
    Failed(String),
}

impl FunctionError {
    /// Create an invalid argument error
    pub fn invalid(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            index,
            message: message.into(),
        }
    }
}

/// A pipe function: receives bound arguments and the piped value
pub type PipeFn = Arc<dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync>;

/// A tag handler: receives the current value (undefined as `None`) and
/// the remaining constraint arguments
pub type TagHandler = Arc<dyn Fn(Option<&Value>, &[Value]) -> Value + Send + Sync>;

/// Registry of pipe functions by name
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, PipeFn>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.register(name, function);
        self
    }

    /// Look up a function
    pub fn get(&self, name: &str) -> Option<&PipeFn> {
        self.functions.get(name)
    }

    /// True when `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// Registry of tag handlers by name
#[derive(Clone, Default)]
pub struct TagHandlerRegistry {
    handlers: HashMap<String, TagHandler>,
}

impl TagHandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Option<&Value>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.register(name, handler);
        self
    }

    /// Look up a handler
    pub fn get(&self, name: &str) -> Option<&TagHandler> {
        self.handlers.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TagHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagHandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
