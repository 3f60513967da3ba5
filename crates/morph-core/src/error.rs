//! Operator evaluation errors
//!
//! Only structural failures are represented here. Missing sources, missing
//! tag handlers and absent defaults degrade to null or undefined inside the
//! stages and never surface as errors.

use crate::path::PathError;
use crate::registry::FunctionError;
use thiserror::Error;

/// Fatal errors that abort evaluation of a node
#[derive(Debug, Error)]
pub enum OperatorError {
    /// Operator is part of the grammar but has no behavior yet
    #[error("Not implemented yet: [{family}({token})]")]
    Unimplemented {
        /// Operator family, e.g. `symbol`
        family: &'static str,
        /// Operator token
        token: String,
    },

    /// Operator token does not belong to its family
    #[error("Unknown {family} operator: '{token}'")]
    UnknownOperator {
        /// Operator family
        family: &'static str,
        /// Rejected token
        token: String,
    },

    /// Inception depth literal is not a non-negative integer
    #[error("Invalid inception depth in '{token}'")]
    InvalidDepth {
        /// Rejected token
        token: String,
    },

    /// Pipe references a function missing from the registry
    #[error("could not resolve function name [{name}]")]
    UnresolvedFunction {
        /// Function name as written in the pipe
        name: String,
    },

    /// More than one `__` slot in a pipe argument list
    #[error("function [{name}] declares {count} placeholders, at most one is supported")]
    MultiplePlaceholders {
        /// Function name
        name: String,
        /// Number of placeholders found
        count: usize,
    },

    /// Pipe key after `$` is not an ordinal
    #[error("Invalid pipe ordinal: '{key}'")]
    InvalidPipeOrdinal {
        /// Offending key
        key: String,
    },

    /// Pipe entry is not a function expression string
    #[error("Invalid pipe expression at {key}: {message}")]
    InvalidPipeExpression {
        /// Pipe key
        key: String,
        /// What is wrong with the entry
        message: String,
    },

    /// Value has the wrong shape for the operator
    #[error("Inception operator [{operator}] expected {expected}, found {found}")]
    TypeMismatch {
        /// Operator token
        operator: char,
        /// Expected JSON type
        expected: &'static str,
        /// Actual JSON type
        found: &'static str,
    },

    /// Nested inception went deeper than an enclosing depth allows
    #[error("Inception operator [{operator}] exceeded its depth")]
    DepthExceeded {
        /// Operator token
        operator: char,
    },

    /// Path could not be parsed or written
    #[error(transparent)]
    Path(#[from] PathError),

    /// Registered pipe function failed
    #[error("function [{name}] failed: {source}")]
    Function {
        /// Function name
        name: String,
        /// Underlying function error
        #[source]
        source: FunctionError,
    },
}

/// Specialized Result type for operator evaluation
pub type OperatorResult<T> = Result<T, OperatorError>;

impl OperatorError {
    /// Create an unknown operator error
    pub fn unknown(family: &'static str, token: impl Into<String>) -> Self {
        Self::UnknownOperator {
            family,
            token: token.into(),
        }
    }

    /// Create an unresolved function error
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedFunction { name: name.into() }
    }

    /// True for errors raised while building operators rather than evaluating them
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::UnknownOperator { .. } | Self::InvalidDepth { .. }
        )
    }

    /// Get error category for diagnostics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Unimplemented { .. } => "unimplemented",
            Self::UnknownOperator { .. } => "unknown_operator",
            Self::InvalidDepth { .. } => "invalid_depth",
            Self::UnresolvedFunction { .. } => "unresolved_function",
            Self::MultiplePlaceholders { .. } => "multiple_placeholders",
            Self::InvalidPipeOrdinal { .. } => "invalid_pipe_ordinal",
            Self::InvalidPipeExpression { .. } => "invalid_pipe_expression",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::DepthExceeded { .. } => "depth_exceeded",
            Self::Path(_) => "path",
            Self::Function { .. } => "function",
        }
    }
}
