//! Substitution store: type-variable id to current refinement.
//!
//! The store is owned by a single typing run, grows during unification,
//! and is cleared between sibling top-level lets so inference never
//! leaks across them. It never holds a trivial `v := v` binding, and the
//! unifier establishes the occurs check before every insertion.

use std::collections::HashMap;

use super::ty::{Type, TypeVar};

#[derive(Debug, Default)]
pub struct Substitutions {
    map: HashMap<u64, Type>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Drop every binding. Called between sibling top-level lets.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Record `var := tpe`. The trivial `v := v` binding is dropped.
    pub fn bind(&mut self, var: TypeVar, tpe: Type) {
        if let Type::Var(other) = &tpe {
            if other.id == var.id {
                return;
            }
        }
        self.map.insert(var.id, tpe);
    }

    /// Resolve a type through the substitution chain: a bound variable
    /// prunes to whatever its binding prunes to, anything else is
    /// returned unchanged. Does not descend into constructor arguments.
    pub fn prune(&self, tpe: &Type) -> Type {
        match tpe {
            Type::Var(v) => match self.map.get(&v.id) {
                Some(bound) => self.prune(bound),
                None => tpe.clone(),
            },
            _ => tpe.clone(),
        }
    }

    /// Resolve a type all the way down: constructors rebuild with
    /// recursively pruned arguments, qualified types recurse into the
    /// underlying, and a variable prunes again whenever pruning changed
    /// it, chasing chains that were extended mid-pass.
    pub fn recursive_prune(&self, tpe: &Type) -> Type {
        match tpe {
            Type::Con { name, args } => Type::Con {
                name: name.clone(),
                args: args.iter().map(|arg| self.recursive_prune(arg)).collect(),
            },
            Type::Qualified { predicate, ty } => Type::Qualified {
                predicate: predicate.clone(),
                ty: Box::new(self.recursive_prune(ty)),
            },
            Type::Var(_) => {
                let pruned = self.prune(tpe);
                if &pruned != tpe {
                    self.recursive_prune(&pruned)
                } else {
                    pruned
                }
            }
        }
    }

    /// Path compression: rewrite every binding to its chain endpoint so
    /// bound variables map directly to a non-variable or to an unbound
    /// variable. Semantics are unchanged.
    pub fn compress(&mut self) {
        let ids: Vec<u64> = self.map.keys().copied().collect();
        for id in ids {
            if let Some(tpe) = self.map.get(&id) {
                let endpoint = self.prune(&tpe.clone());
                self.map.insert(id, endpoint);
            }
        }
    }
}
