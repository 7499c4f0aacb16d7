//! Closure lifting - rewrite partial applications into named bindings
//!
//! Code emission turns every top-level binding into a plain static
//! method, so it has no way to produce a closure object for a partial
//! application. This pass removes the need for one: every partial
//! application of a built-in, and every application still missing more
//! than one argument, is rewritten to go through a synthesised top-level
//! helper binding that code emission can compile like any other.
//!
//! Example - partially applying a binary built-in:
//!
//! ```text
//! let inc = add 1
//! ```
//!
//! becomes
//!
//! ```text
//! let inc = inc$lambda$0 1
//! let inc$lambda$0 arg0 arg1 = add arg0 arg1
//! ```
//!
//! and an application two or more arguments short of a ternary `f`:
//!
//! ```text
//! let g x = f x
//! ```
//!
//! becomes
//!
//! ```text
//! let g x = g$curied$0 x
//! let g$curied$0 arg0 arg1 = f arg0 arg1
//! ```
//!
//! Afterwards no built-in is partially applied and every remaining
//! partial application is exactly one argument short, which code
//! emission handles directly. Types are never changed: a rewritten node
//! keeps the type of the node it replaces.

use log::debug;

use crate::typed::{TypedApply, TypedExpr, TypedIdent, TypedLambda, TypedLet, TypedModule};
use crate::types::scope::{Symbol, SymbolLocation};
use crate::types::ty::Type;

/// Lift every definition of a typed module. The output lists each
/// rewritten source binding first, followed by the helpers synthesised
/// for it in reverse-discovery order.
pub fn lift_module(module: &TypedModule) -> TypedModule {
    let mut definitions = Vec::with_capacity(module.definitions.len());
    for def in &module.definitions {
        let mut ctx = LiftContext::new(module.name.clone(), def.name.clone());
        let mut lifted = def.clone();
        *lifted.body = ctx.lift_expr(&def.body);
        definitions.push(lifted);
        definitions.extend(ctx.generated);
    }
    TypedModule {
        name: module.name.clone(),
        definitions,
        position: module.position.clone(),
    }
}

/// Lifting state for a single source binding. Helper names are prefixed
/// with the source binding's name, and the `$lambda$`/`$curied$`
/// counters are independent and start at zero for each source binding.
struct LiftContext {
    module: String,
    enclosing: String,
    generated: Vec<TypedLet>,
    lambda_counter: usize,
    curried_counter: usize,
}

impl LiftContext {
    fn new(module: String, enclosing: String) -> Self {
        Self {
            module,
            enclosing,
            generated: Vec::new(),
            lambda_counter: 0,
            curried_counter: 0,
        }
    }

    fn lift_expr(&mut self, expr: &TypedExpr) -> TypedExpr {
        match expr {
            TypedExpr::Apply(apply) => self.lift_apply(apply),
            TypedExpr::Lambda(lambda) => TypedExpr::Lambda(TypedLambda {
                params: lambda.params.clone(),
                body: Box::new(self.lift_expr(&lambda.body)),
                tpe: lambda.tpe.clone(),
                position: lambda.position.clone(),
            }),
            TypedExpr::Let(binding) => {
                let mut lifted = binding.clone();
                *lifted.body = self.lift_expr(&binding.body);
                TypedExpr::Let(lifted)
            }
            TypedExpr::Module(module) => {
                let mut lifted = module.clone();
                for def in &mut lifted.definitions {
                    *def.body = self.lift_expr(&def.body.clone());
                }
                TypedExpr::Module(lifted)
            }
            leaf => leaf.clone(),
        }
    }

    fn lift_apply(&mut self, apply: &TypedApply) -> TypedExpr {
        let arity = reference_arity(&apply.target);
        let supplied = apply.args.len();
        let built_in = matches!(apply.target.symbol.location, SymbolLocation::BuiltIn);

        if supplied < arity && built_in {
            let rewritten = self.lift_built_in_partial(apply);
            // The helper call keeps the original partial argument list,
            // so it may still be more than one argument short; cascade
            // it through the currying rule.
            if rewritten.args.len() + 1 < reference_arity(&rewritten.target) {
                return TypedExpr::Apply(self.curry_partial(&rewritten));
            }
            return TypedExpr::Apply(rewritten);
        }

        if supplied + 1 < arity {
            let partial = TypedApply {
                target: apply.target.clone(),
                args: apply.args.iter().map(|arg| self.lift_expr(arg)).collect(),
                tpe: apply.tpe.clone(),
                position: apply.position.clone(),
            };
            return TypedExpr::Apply(self.curry_partial(&partial));
        }

        TypedExpr::Apply(TypedApply {
            target: apply.target.clone(),
            args: apply.args.iter().map(|arg| self.lift_expr(arg)).collect(),
            tpe: apply.tpe.clone(),
            position: apply.position.clone(),
        })
    }

    /// Synthesise `<enclosing>$lambda$<n>`, a binding that fully applies
    /// the built-in to its complete parameter list, and rewrite the
    /// partial application to call it instead. The destructured argument
    /// types annotate the parameters verbatim.
    fn lift_built_in_partial(&mut self, apply: &TypedApply) -> TypedApply {
        let (arg_types, return_type) = apply.target.symbol.tpe.deconstruct_args();
        let name = format!("{}$lambda${}", self.enclosing, self.lambda_counter);
        self.lambda_counter += 1;

        let params = parameter_symbols(&arg_types);
        let full_application = TypedApply {
            target: apply.target.clone(),
            args: parameter_references(&params, apply),
            tpe: return_type.clone(),
            position: apply.position.clone(),
        };
        let helper = TypedLet {
            name: name.clone(),
            params,
            body: Box::new(TypedExpr::Apply(full_application)),
            tpe: apply.target.symbol.tpe.clone(),
            position: apply.position.clone(),
        };
        debug!("synthesised {} for built-in {}", name, apply.target.symbol.name);
        self.generated.insert(0, helper);

        TypedApply {
            target: self.helper_reference(name, arg_types, return_type, apply),
            args: apply.args.iter().map(|arg| self.lift_expr(arg)).collect(),
            tpe: apply.tpe.clone(),
            position: apply.position.clone(),
        }
    }

    /// Synthesise `<enclosing>$curied$<n>` taking one argument more than
    /// the application supplies, applying the original reference to all
    /// of them. The helper body may itself be a partial application, so
    /// it is lifted recursively before being recorded. Expects the
    /// application's arguments to be lifted already.
    fn curry_partial(&mut self, apply: &TypedApply) -> TypedApply {
        let new_len = apply.args.len() + 1;
        let (arg_types, residual) = apply.target.symbol.tpe.deconstruct_args_bounded(new_len);
        let name = format!("{}$curied${}", self.enclosing, self.curried_counter);
        self.curried_counter += 1;

        let params = parameter_symbols(&arg_types);
        let body = TypedApply {
            target: apply.target.clone(),
            args: parameter_references(&params, apply),
            tpe: residual.clone(),
            position: apply.position.clone(),
        };
        let body = self.lift_expr(&TypedExpr::Apply(body));
        let helper = TypedLet {
            name: name.clone(),
            params,
            body: Box::new(body),
            tpe: Type::function_n(arg_types.clone(), residual.clone()),
            position: apply.position.clone(),
        };
        debug!("synthesised {} for {}", name, apply.target.symbol.name);
        self.generated.insert(0, helper);

        TypedApply {
            target: self.helper_reference(name, arg_types, residual, apply),
            args: apply.args.clone(),
            tpe: apply.tpe.clone(),
            position: apply.position.clone(),
        }
    }

    /// A reference to a synthesised helper, addressed as a static method
    /// of the enclosing module.
    fn helper_reference(
        &self,
        name: String,
        arg_types: Vec<Type>,
        return_type: Type,
        apply: &TypedApply,
    ) -> TypedIdent {
        let tpe = Type::function_n(arg_types.clone(), return_type.clone());
        TypedIdent {
            symbol: Symbol {
                name: name.clone(),
                tpe,
                location: SymbolLocation::StaticMethod {
                    module: self.module.clone(),
                    method: name,
                    arg_types,
                    return_type,
                },
            },
            position: apply.target.position.clone(),
        }
    }
}

/// Arity of an applied reference: the signature length for a static
/// method (a synthesised helper keeps its intended arity even when its
/// curried type flattens further), the flattened arrow count otherwise.
fn reference_arity(target: &TypedIdent) -> usize {
    match &target.symbol.location {
        SymbolLocation::StaticMethod { arg_types, .. } => arg_types.len(),
        _ => target.symbol.tpe.deconstruct_args().0.len(),
    }
}

fn parameter_symbols(arg_types: &[Type]) -> Vec<Symbol> {
    arg_types
        .iter()
        .enumerate()
        .map(|(i, tpe)| Symbol::argument(format!("arg{}", i), tpe.clone()))
        .collect()
}

fn parameter_references(params: &[Symbol], apply: &TypedApply) -> Vec<TypedExpr> {
    params
        .iter()
        .map(|param| {
            TypedExpr::Ident(TypedIdent {
                symbol: param.clone(),
                position: apply.position.clone(),
            })
        })
        .collect()
}
