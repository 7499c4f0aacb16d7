use lachs::Span;
use log::trace;

use super::error::TypeError;
use super::subst::Substitutions;
use super::ty::{Type, TypeVar};

/// Unify two types, recording refinements in the store, and return their
/// most general common instance.
///
/// Both operands are pruned first, so callers may pass types containing
/// already-bound variables. Variable-variable unification always binds
/// the variable with the larger id to the one with the smaller id, which
/// keeps chains shallow and the outcome deterministic.
pub fn unify(
    subs: &mut Substitutions,
    t1: &Type,
    t2: &Type,
    position: &Span,
) -> Result<Type, TypeError> {
    let left = subs.prune(t1);
    let right = subs.prune(t2);

    match (left, right) {
        (
            Type::Qualified {
                predicate: p1,
                ty: u1,
            },
            Type::Qualified {
                predicate: p2,
                ty: u2,
            },
        ) => {
            if p1 != p2 {
                return Err(TypeError::ClassUnificationUnsupported {
                    left: Type::Qualified {
                        predicate: p1,
                        ty: u1,
                    },
                    right: Type::Qualified {
                        predicate: p2,
                        ty: u2,
                    },
                    position: position.clone(),
                });
            }
            let underlying = unify(subs, &u1, &u2, position)?;
            Ok(Type::Qualified {
                predicate: p1,
                ty: Box::new(underlying),
            })
        }

        (Type::Var(a), Type::Var(b)) => {
            if a.id == b.id {
                Ok(Type::Var(a))
            } else {
                let (keep, bound) = if a.id < b.id { (a, b) } else { (b, a) };
                trace!("binding {} := {}", bound, keep);
                subs.bind(bound, Type::Var(keep));
                Ok(Type::Var(keep))
            }
        }

        (Type::Var(v), other) | (other, Type::Var(v)) => {
            if occurs_in(subs, v, &other) {
                return Err(TypeError::RecursiveUnification {
                    var: v,
                    ty: other,
                    position: position.clone(),
                });
            }
            trace!("binding {} := {}", v, other);
            subs.bind(v, other.clone());
            Ok(other)
        }

        (
            Type::Con {
                name: n1,
                args: a1,
            },
            Type::Con {
                name: n2,
                args: a2,
            },
        ) => {
            if n1 != n2 || a1.len() != a2.len() {
                return Err(TypeError::TypeMismatch {
                    expected: Type::Con { name: n1, args: a1 },
                    found: Type::Con { name: n2, args: a2 },
                    position: position.clone(),
                });
            }
            let mut unified = Vec::with_capacity(a1.len());
            for (x, y) in a1.iter().zip(a2.iter()) {
                unified.push(unify(subs, x, y, position)?);
            }
            Ok(Type::Con {
                name: n1,
                args: unified,
            })
        }

        // Qualified against plain: only the underlying participates, the
        // predicate rides along on the result.
        (Type::Qualified { predicate, ty }, other) | (other, Type::Qualified { predicate, ty }) => {
            let underlying = unify(subs, &ty, &other, position)?;
            Ok(Type::Qualified {
                predicate,
                ty: Box::new(underlying),
            })
        }
    }
}

/// Would binding `var` to `tpe` create an infinite type? Walks
/// constructor arguments and qualified underlyings, pruning as it goes.
fn occurs_in(subs: &Substitutions, var: TypeVar, tpe: &Type) -> bool {
    match subs.prune(tpe) {
        Type::Var(v) => v.id == var.id,
        Type::Con { args, .. } => args.iter().any(|arg| occurs_in(subs, var, arg)),
        Type::Qualified { ty, .. } => occurs_in(subs, var, &ty),
    }
}
