//! Type errors surfaced by inference and unification.
//!
//! Every variant carries the source position of the most-specific AST
//! node involved. The first error terminates the run; no recovery is
//! attempted.

use lachs::Span;
use thiserror::Error;

use super::ty::{Type, TypeVar};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("unknown symbol `{name}`")]
    UnknownSymbol { name: String, position: Span },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Type,
        found: Type,
        position: Span,
    },

    #[error("cannot construct the infinite type {var} = {ty}")]
    RecursiveUnification {
        var: TypeVar,
        ty: Type,
        position: Span,
    },

    #[error("not a function: {tpe}")]
    NotAFunction { tpe: Type, position: Span },

    #[error("cannot unify class constraints of {left} and {right}")]
    ClassUnificationUnsupported {
        left: Type,
        right: Type,
        position: Span,
    },

    #[error("scope underflow: the prelude frame cannot be popped")]
    ScopeUnderflow { position: Span },
}

impl TypeError {
    /// Source position of the node the error is anchored to.
    pub fn position(&self) -> &Span {
        match self {
            TypeError::UnknownSymbol { position, .. }
            | TypeError::TypeMismatch { position, .. }
            | TypeError::RecursiveUnification { position, .. }
            | TypeError::NotAFunction { position, .. }
            | TypeError::ClassUnificationUnsupported { position, .. }
            | TypeError::ScopeUnderflow { position } => position,
        }
    }
}
