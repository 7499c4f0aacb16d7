//! Raw abstract syntax for MinML
//!
//! The parser produces this tree; the typer consumes it. Every node
//! carries the source position it was parsed from. A tree handed to the
//! typer may be rooted at a [`Module`] or at any expression node.

use lachs::Span;

use crate::types::ty::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Int(IntLit),
    Bool(BoolLit),
    Str(StrLit),
    Apply(Apply),
    Lambda(Lambda),
    Let(Let),
    Module(Module),
}

/// A reference to a named binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLit {
    pub value: i64,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLit {
    pub value: bool,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    pub value: String,
    pub position: Span,
}

/// Curried application of a named function to zero or more arguments.
///
/// The callee is always a name reference; applying an arbitrary
/// expression is expressed by binding it first.
#[derive(Debug, Clone, PartialEq)]
pub struct Apply {
    pub target: Ident,
    pub args: Vec<Expr>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<Ident>,
    pub body: Box<Expr>,
    pub position: Span,
}

/// A named binding of zero or more parameters to a body, optionally
/// annotated with its full curried type.
#[derive(Debug, Clone, PartialEq)]
pub struct Let {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub annotation: Option<Type>,
    pub body: Box<Expr>,
    pub position: Span,
}

/// A module of top-level bindings in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub definitions: Vec<Let>,
    pub position: Span,
}

impl Expr {
    pub fn position(&self) -> Span {
        match self {
            Expr::Ident(i) => i.position.clone(),
            Expr::Int(i) => i.position.clone(),
            Expr::Bool(b) => b.position.clone(),
            Expr::Str(s) => s.position.clone(),
            Expr::Apply(a) => a.position.clone(),
            Expr::Lambda(l) => l.position.clone(),
            Expr::Let(l) => l.position.clone(),
            Expr::Module(m) => m.position.clone(),
        }
    }
}
