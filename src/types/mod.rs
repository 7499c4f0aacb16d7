pub mod error;
pub mod infer;
pub mod scope;
pub mod subst;
pub mod ty;
pub mod unify;

pub use error::TypeError;
pub use infer::Typer;
pub use scope::{Scope, Symbol, SymbolLocation};
pub use ty::{Predicate, Type, TypeVar, VarSupply};
pub use unify::unify;
