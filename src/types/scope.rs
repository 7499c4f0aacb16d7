//! # Symbols and Lexical Scope
//!
//! The symbol table is a stack of frames. The root frame is the prelude
//! of built-ins supplied by the caller; a new frame is pushed for every
//! lambda or let body and popped on exit, in strictly LIFO order. Lookup
//! walks from the innermost frame outward, so inner bindings shadow
//! outer ones.

use lachs::Span;

use super::error::TypeError;
use super::ty::Type;

/// Where a symbol lives, which decides how code emission will address it.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolLocation {
    /// A lambda or let parameter.
    Argument,
    /// A built-in provided by the prelude.
    BuiltIn,
    /// A top-level binding compiled to a static method of its module.
    StaticMethod {
        module: String,
        method: String,
        arg_types: Vec<Type>,
        return_type: Type,
    },
}

/// A named, typed entry in the symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub tpe: Type,
    pub location: SymbolLocation,
}

impl Symbol {
    pub fn argument(name: impl Into<String>, tpe: Type) -> Self {
        Symbol {
            name: name.into(),
            tpe,
            location: SymbolLocation::Argument,
        }
    }

    pub fn built_in(name: impl Into<String>, tpe: Type) -> Self {
        Symbol {
            name: name.into(),
            tpe,
            location: SymbolLocation::BuiltIn,
        }
    }

    /// A static method of `module`, with the signature taken from the
    /// fully flattened binding type.
    pub fn static_method(module: impl Into<String>, name: impl Into<String>, tpe: Type) -> Self {
        let name = name.into();
        let (arg_types, return_type) = tpe.deconstruct_args();
        Symbol {
            name: name.clone(),
            tpe,
            location: SymbolLocation::StaticMethod {
                module: module.into(),
                method: name,
                arg_types,
                return_type,
            },
        }
    }
}

/// Stack of scope frames over a prelude root.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<Vec<Symbol>>,
}

impl Scope {
    /// A scope whose root frame is the given prelude.
    pub fn new(prelude: Vec<Symbol>) -> Self {
        Scope {
            frames: vec![prelude],
        }
    }

    /// Look a name up, innermost frame first.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.iter().find(|sym| sym.name == name))
    }

    /// Open a new frame holding the given symbols.
    pub fn push(&mut self, symbols: Vec<Symbol>) {
        self.frames.push(symbols);
    }

    /// Add a symbol to the innermost frame.
    pub fn insert(&mut self, symbol: Symbol) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(symbol);
        }
    }

    /// Close the innermost frame. Popping the prelude frame breaks the
    /// LIFO discipline and terminates the run.
    pub fn pop(&mut self, position: &Span) -> Result<(), TypeError> {
        if self.frames.len() <= 1 {
            return Err(TypeError::ScopeUnderflow {
                position: position.clone(),
            });
        }
        self.frames.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
