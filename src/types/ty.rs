//! # Core Type Representation
//!
//! Types in MinML are built from three shapes:
//!
//! - **Var** - A type variable, unique within a typing run (e.g. `'t0`)
//! - **Con** - A named constructor with an ordered argument list
//!   (`Int`, `Bool`, `String`, and function types)
//! - **Qualified** - A type carrying an optional class constraint
//!
//! There is no dedicated function variant. The distinguished constructor
//! name `"Function"` with exactly two arguments (`from`, `to`) encodes a
//! unary function type, and multi-argument functions are right-associated
//! curried chains:
//!
//! ```text
//! Int -> Int -> Int
//! == Function(Int, Function(Int, Int))
//! ```
//!
//! [`Type::function_n`] folds an argument list into such a chain and
//! [`Type::deconstruct_args`] flattens one back out. The bounded variant
//! [`Type::deconstruct_args_bounded`] stops after `k` arrow peels and
//! treats the remainder as the return type, which is how the closure
//! lifter expresses "after receiving `k` more arguments, the result is
//! the rest".
//!
//! ## Related Modules
//!
//! - [`crate::types::subst`] - Substitution store refining type variables
//! - [`crate::types::unify`] - Unification over these types

use std::fmt;

/// Name of the distinguished constructor encoding unary function types.
pub const FUNCTION: &str = "Function";

/// Type variable, identified by a run-unique id.
///
/// Two variables are equal iff their ids are equal. Fresh variables come
/// out of a [`VarSupply`] owned by the typing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: u64,
}

impl TypeVar {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'t{}", self.id)
    }
}

/// A class constraint over a type, e.g. `Num` in `Num => Int -> Int`.
///
/// There is no class environment yet. Predicates only ever compare for
/// structural equality during unification; anything beyond that fails
/// loudly until one exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub class: String,
}

impl Predicate {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.class)
    }
}

/// All type shapes in MinML.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Var(TypeVar),
    Con {
        name: String,
        args: Vec<Type>,
    },
    Qualified {
        predicate: Option<Predicate>,
        ty: Box<Type>,
    },
}

impl Type {
    /// A constructor with no arguments.
    pub fn con(name: impl Into<String>) -> Type {
        Type::Con {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn int() -> Type {
        Type::con("Int")
    }

    pub fn bool_() -> Type {
        Type::con("Bool")
    }

    pub fn string() -> Type {
        Type::con("String")
    }

    pub fn unit() -> Type {
        Type::con("Unit")
    }

    /// The unary function type `from -> to`.
    pub fn function(from: Type, to: Type) -> Type {
        Type::Con {
            name: FUNCTION.into(),
            args: vec![from, to],
        }
    }

    /// Fold an argument list into a right-associated curried function
    /// type. An empty argument list yields `result` itself, which is the
    /// type of a zero-parameter binding.
    pub fn function_n(args: Vec<Type>, result: Type) -> Type {
        args.into_iter()
            .rev()
            .fold(result, |acc, arg| Type::function(arg, acc))
    }

    /// Wrap a type in a class constraint.
    pub fn qualified(predicate: Option<Predicate>, ty: Type) -> Type {
        Type::Qualified {
            predicate,
            ty: Box::new(ty),
        }
    }

    /// Split a unary function type into `(from, to)`, consuming it.
    /// Returns `None` for anything that is not exactly a `Function`
    /// constructor with two arguments.
    pub fn into_function(self) -> Option<(Type, Type)> {
        match self {
            Type::Con { name, args } if name == FUNCTION && args.len() == 2 => {
                let mut args = args.into_iter();
                let from = args.next()?;
                let to = args.next()?;
                Some((from, to))
            }
            _ => None,
        }
    }

    /// Flatten a curried function type into its argument types and final
    /// return type. A non-function type flattens to no arguments and
    /// itself. A `Qualified` wrapper is opaque to the walk.
    pub fn deconstruct_args(&self) -> (Vec<Type>, Type) {
        self.deconstruct_args_bounded(usize::MAX)
    }

    /// Like [`Type::deconstruct_args`], but stops after at most `limit`
    /// arrow peels and treats the remainder as the return type.
    pub fn deconstruct_args_bounded(&self, limit: usize) -> (Vec<Type>, Type) {
        let mut args = Vec::new();
        let mut current = self;
        while args.len() < limit {
            match current {
                Type::Con { name, args: cargs } if name == FUNCTION && cargs.len() == 2 => {
                    args.push(cargs[0].clone());
                    current = &cargs[1];
                }
                _ => break,
            }
        }
        (args, current.clone())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Var(v) => write!(f, "{}", v),
            Type::Con { name, args } if name == FUNCTION && args.len() == 2 => {
                let (from, to) = (&args[0], &args[1]);
                // Parenthesise a function in argument position.
                let nested =
                    matches!(from, Type::Con { name, args } if name == FUNCTION && args.len() == 2);
                if nested {
                    write!(f, "({}) -> {}", from, to)
                } else {
                    write!(f, "{} -> {}", from, to)
                }
            }
            Type::Con { name, args } => {
                if args.is_empty() {
                    write!(f, "{}", name)
                } else {
                    write!(f, "{}(", name)?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")
                }
            }
            Type::Qualified { predicate, ty } => match predicate {
                Some(pred) => write!(f, "{} => {}", pred, ty),
                None => write!(f, "{}", ty),
            },
        }
    }
}

/// Supply of fresh type variables for one typing run.
#[derive(Debug, Default)]
pub struct VarSupply {
    next: u64,
}

impl VarSupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// A supply whose first variable has the given id. Used to keep
    /// run-fresh variables clear of any ids already present in the
    /// prelude.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn fresh(&mut self) -> TypeVar {
        let id = self.next;
        self.next += 1;
        TypeVar::new(id)
    }

    pub fn fresh_ty(&mut self) -> Type {
        Type::Var(self.fresh())
    }
}
