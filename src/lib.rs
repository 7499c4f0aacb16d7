//! MinML compiler core - type inference and closure lifting
//!
//! This library contains the middle of the MinML compiler pipeline: it
//! consumes a raw AST together with a prelude of built-in symbols, infers
//! concrete types for every node, and rewrites partial applications into
//! synthesised top-level bindings so that code emission can produce plain
//! static methods instead of closure objects.

pub mod ast;
pub mod lift;
pub mod typed;
pub mod types;
