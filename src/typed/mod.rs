//! Typed abstract syntax
//!
//! Mirrors the raw AST node for node; every node carries its resolved
//! [`Type`] next to the source position it came from, and references
//! carry the full [`Symbol`] they resolved to. This is the tree the
//! closure lifter rewrites and code emission consumes.

use lachs::Span;

use crate::types::scope::Symbol;
use crate::types::ty::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExpr {
    Ident(TypedIdent),
    Int(TypedIntLit),
    Bool(TypedBoolLit),
    Str(TypedStrLit),
    Apply(TypedApply),
    Lambda(TypedLambda),
    Let(TypedLet),
    Module(TypedModule),
}

/// A resolved reference. The type lives on the symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedIdent {
    pub symbol: Symbol,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedIntLit {
    pub value: i64,
    pub tpe: Type,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedBoolLit {
    pub value: bool,
    pub tpe: Type,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedStrLit {
    pub value: String,
    pub tpe: Type,
    pub position: Span,
}

/// Application of a resolved reference. `tpe` is the residual type after
/// all supplied arguments, so a partial application keeps a function
/// type here.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedApply {
    pub target: TypedIdent,
    pub args: Vec<TypedExpr>,
    pub tpe: Type,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedLambda {
    pub params: Vec<Symbol>,
    pub body: Box<TypedExpr>,
    pub tpe: Type,
    pub position: Span,
}

/// A typed top-level binding. `tpe` is the full curried function type;
/// for a zero-parameter binding it is the body type itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedLet {
    pub name: String,
    pub params: Vec<Symbol>,
    pub body: Box<TypedExpr>,
    pub tpe: Type,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedModule {
    pub name: String,
    pub definitions: Vec<TypedLet>,
    pub position: Span,
}

impl TypedExpr {
    pub fn tpe(&self) -> Type {
        match self {
            TypedExpr::Ident(i) => i.symbol.tpe.clone(),
            TypedExpr::Int(i) => i.tpe.clone(),
            TypedExpr::Bool(b) => b.tpe.clone(),
            TypedExpr::Str(s) => s.tpe.clone(),
            TypedExpr::Apply(a) => a.tpe.clone(),
            TypedExpr::Lambda(l) => l.tpe.clone(),
            TypedExpr::Let(l) => l.tpe.clone(),
            TypedExpr::Module(_) => Type::unit(),
        }
    }

    pub fn position(&self) -> Span {
        match self {
            TypedExpr::Ident(i) => i.position.clone(),
            TypedExpr::Int(i) => i.position.clone(),
            TypedExpr::Bool(b) => b.position.clone(),
            TypedExpr::Str(s) => s.position.clone(),
            TypedExpr::Apply(a) => a.position.clone(),
            TypedExpr::Lambda(l) => l.position.clone(),
            TypedExpr::Let(l) => l.position.clone(),
            TypedExpr::Module(m) => m.position.clone(),
        }
    }
}
