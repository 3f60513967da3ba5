//! Evaluation stages and their fixed composition.
//!
//! ## Stage order
//!
//! ```text
//! deref ─> query ─> constraints ─> symbol ─> enumerate ─> pipe
//! ```
//!
//! Dereference and query always run. The remaining stages run only when the
//! node declares their operator, in this order: constraints see the
//! query-shaped value, the symbol binder tags the defaulted value, the
//! enumerator expands after defaulting and pipes see the final value.
//!
//! Inception is not part of the composition. The driver calls
//! [`inception::incept`] for nodes carrying an inception operator.

pub mod constraints;
pub mod deref;
pub mod enumerate;
pub mod inception;
pub mod partial;
pub mod pipe;
pub mod query;
pub mod symbol;

use crate::ast::{meta, AstNode};
use crate::context::{Context, Environment};
use crate::error::OperatorResult;
use crate::tags::TagTable;
use deref::DerefOptions;
use tracing::debug;

/// The composed stage pipeline for one evaluation pass
#[derive(Debug, Clone, Copy)]
pub struct StageComposer<'env> {
    env: &'env Environment,
}

/// Build the stage pipeline over `env`
pub fn apply_all(env: &Environment) -> StageComposer<'_> {
    StageComposer::new(env)
}

impl<'env> StageComposer<'env> {
    /// Compose the stages over `env`
    pub fn new(env: &'env Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &'env Environment {
        self.env
    }

    /// Evaluate one node.
    ///
    /// `tags` is shared by the whole pass and `context` locates the node in
    /// the template tree. Returns the first fatal error unchanged.
    pub fn apply(
        &self,
        node: &AstNode,
        tags: &mut TagTable,
        context: &Context,
    ) -> OperatorResult<AstNode> {
        let env = self.env;

        let node = deref::deref(node, env, &DerefOptions::default())?;
        let mut node = query::select(&node, meta::QUERY);

        if node.operators.constraints.is_some() {
            node = constraints::resolve(&node, env, tags, meta::CONSTRAINTS)?;
        }
        if node.operators.symbol.is_some() {
            node = symbol::bind(&node, tags, context, meta::SYMBOL)?;
        }
        if node.operators.enumerate.is_some() {
            node = enumerate::expand(&node, meta::ENUMERATE);
        }
        if node.pipes.is_some() {
            node = pipe::run(&node, env, meta::PIPE)?;
        }

        debug!(
            path = %node.path,
            context = %context.path_string(),
            meta = node.meta,
            "node evaluated"
        );
        Ok(node)
    }
}
