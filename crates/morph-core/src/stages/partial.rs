//! Single-slot partial application for pipe functions.

use crate::error::{OperatorError, OperatorResult};
use crate::registry::PipeFn;
use crate::value::argument;
use serde_json::Value;
use std::fmt;

/// Argument text marking where the piped value goes
pub const PLACEHOLDER: &str = "__";

/// One argument position
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Fixed argument from the pipe expression
    Bound(Value),
    /// Filled with the piped value on application
    Open,
}

/// A pipe function with all arguments but one bound
#[derive(Clone)]
pub struct Partial {
    name: String,
    function: PipeFn,
    slots: Vec<Slot>,
}

impl Partial {
    /// Bind `args` to `function`.
    ///
    /// A [`PLACEHOLDER`] argument leaves its position open for the piped
    /// value. Without one the piped value goes last. More than one
    /// placeholder is rejected.
    pub fn build(
        name: impl Into<String>,
        function: PipeFn,
        args: &[String],
        coerce: bool,
    ) -> OperatorResult<Self> {
        let name = name.into();
        let count = args.iter().filter(|arg| *arg == PLACEHOLDER).count();
        if count > 1 {
            return Err(OperatorError::MultiplePlaceholders { name, count });
        }

        let mut slots: Vec<Slot> = args
            .iter()
            .map(|arg| {
                if arg == PLACEHOLDER {
                    Slot::Open
                } else {
                    Slot::Bound(argument(arg, coerce))
                }
            })
            .collect();
        if count == 0 {
            slots.push(Slot::Open);
        }

        Ok(Self {
            name,
            function,
            slots,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Call the function with `value` in the open slot
    pub fn apply(&self, value: Value) -> OperatorResult<Value> {
        let mut value = Some(value);
        let args: Vec<Value> = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Bound(bound) => bound.clone(),
                Slot::Open => value.take().unwrap_or(Value::Null),
            })
            .collect();

        (self.function)(&args).map_err(|source| OperatorError::Function {
            name: self.name.clone(),
            source,
        })
    }
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("name", &self.name)
            .field("slots", &self.slots)
            .finish()
    }
}
