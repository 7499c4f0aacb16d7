//! # Type Inference Driver
//!
//! [`Typer`] walks a raw AST and produces the typed AST. One `Typer`
//! value is one typing run: it owns the scope stack (rooted at the
//! caller-supplied prelude), the substitution store, and the fresh
//! variable supply. A run either produces a typed tree or terminates
//! with the first [`TypeError`].
//!
//! Top-level bindings of a module are typed in declaration order. After
//! each one, its subtree is pruned to its final types, the substitution
//! store is cleared so nothing leaks into the next sibling, and the
//! binding is registered in scope as a static method of the module so
//! later siblings can reference it.

use log::debug;

use crate::ast;
use crate::typed::{
    TypedApply, TypedBoolLit, TypedExpr, TypedIdent, TypedIntLit, TypedLambda, TypedLet,
    TypedModule, TypedStrLit,
};

use super::error::TypeError;
use super::scope::{Scope, Symbol, SymbolLocation};
use super::subst::Substitutions;
use super::ty::{Predicate, Type, VarSupply};
use super::unify;

pub struct Typer {
    scope: Scope,
    subs: Substitutions,
    supply: VarSupply,
}

impl Typer {
    /// A typing run over the given prelude of built-ins. The fresh
    /// variable supply starts above any variable id appearing in the
    /// prelude, so prelude types can never collide with run-fresh ones.
    pub fn new(prelude: Vec<Symbol>) -> Self {
        let floor = prelude
            .iter()
            .filter_map(|sym| max_var_id(&sym.tpe))
            .max()
            .map_or(0, |id| id + 1);
        Typer {
            scope: Scope::new(prelude),
            subs: Substitutions::new(),
            supply: VarSupply::starting_at(floor),
        }
    }

    pub fn infer_expr(&mut self, expr: &ast::Expr) -> Result<TypedExpr, TypeError> {
        match expr {
            ast::Expr::Int(lit) => Ok(TypedExpr::Int(TypedIntLit {
                value: lit.value,
                tpe: Type::int(),
                position: lit.position.clone(),
            })),
            ast::Expr::Bool(lit) => Ok(TypedExpr::Bool(TypedBoolLit {
                value: lit.value,
                tpe: Type::bool_(),
                position: lit.position.clone(),
            })),
            ast::Expr::Str(lit) => Ok(TypedExpr::Str(TypedStrLit {
                value: lit.value.clone(),
                tpe: Type::string(),
                position: lit.position.clone(),
            })),
            ast::Expr::Ident(ident) => self.infer_ident(ident).map(TypedExpr::Ident),
            ast::Expr::Apply(apply) => self.infer_apply(apply),
            ast::Expr::Lambda(lambda) => self.infer_lambda(lambda),
            ast::Expr::Let(binding) => self.infer_let(binding).map(TypedExpr::Let),
            ast::Expr::Module(module) => self.infer_module(module).map(TypedExpr::Module),
        }
    }

    pub fn infer_module(&mut self, module: &ast::Module) -> Result<TypedModule, TypeError> {
        self.scope.push(Vec::new());
        let mut definitions = Vec::with_capacity(module.definitions.len());
        for def in &module.definitions {
            let mut typed = self.infer_let(def)?;
            self.prune_let(&mut typed);
            self.subs.clear();
            self.scope.insert(Symbol::static_method(
                &module.name,
                &typed.name,
                typed.tpe.clone(),
            ));
            definitions.push(typed);
        }
        self.scope.pop(&module.position)?;
        Ok(TypedModule {
            name: module.name.clone(),
            definitions,
            position: module.position.clone(),
        })
    }

    fn infer_ident(&mut self, ident: &ast::Ident) -> Result<TypedIdent, TypeError> {
        match self.scope.lookup(&ident.name) {
            Some(symbol) => Ok(TypedIdent {
                symbol: symbol.clone(),
                position: ident.position.clone(),
            }),
            None => Err(TypeError::UnknownSymbol {
                name: ident.name.clone(),
                position: ident.position.clone(),
            }),
        }
    }

    /// Type an application by refining the callee one argument at a
    /// time. Each step realises one arrow of the right-folded refinement
    /// type `Function(t1, ... Function(tn, fresh))`: a function callee
    /// peels an arrow and unifies its domain with the argument, a
    /// variable callee unifies against `Function(arg, fresh)` (which is
    /// where the occurs check catches self-application), and anything
    /// else means the callee's type has fewer arrows than there are
    /// arguments. A qualified callee applies through its underlying
    /// type, and the stripped constraint comes back on the result type,
    /// mirroring the unifier's predicate-preserving rule.
    fn infer_apply(&mut self, apply: &ast::Apply) -> Result<TypedExpr, TypeError> {
        let target = self.infer_ident(&apply.target)?;
        let mut args = Vec::with_capacity(apply.args.len());
        for arg in &apply.args {
            args.push(self.infer_expr(arg)?);
        }

        let mut callee = target.symbol.tpe.clone();
        let mut constraint: Option<Predicate> = None;
        for arg in &args {
            // Only the underlying of a qualified callee participates; the
            // stripped constraint is re-attached to the result below.
            callee = match self.subs.prune(&callee) {
                Type::Qualified { predicate, ty } => {
                    constraint = constraint.or(predicate);
                    *ty
                }
                other => other,
            };
            callee = match callee {
                Type::Var(v) => {
                    let result = self.supply.fresh_ty();
                    let refined = Type::function(arg.tpe(), result.clone());
                    self.unify(&Type::Var(v), &refined, &apply.position)?;
                    result
                }
                other => match other.into_function() {
                    Some((from, to)) => {
                        self.unify(&from, &arg.tpe(), &arg.position())?;
                        to
                    }
                    None => {
                        return Err(TypeError::NotAFunction {
                            tpe: self.subs.recursive_prune(&target.symbol.tpe),
                            position: apply.position.clone(),
                        })
                    }
                },
            };
        }

        let mut tpe = self.subs.recursive_prune(&callee);
        if constraint.is_some() {
            tpe = Type::qualified(constraint, tpe);
        }
        Ok(TypedExpr::Apply(TypedApply {
            target,
            args,
            tpe,
            position: apply.position.clone(),
        }))
    }

    fn infer_lambda(&mut self, lambda: &ast::Lambda) -> Result<TypedExpr, TypeError> {
        let mut params: Vec<Symbol> = lambda
            .params
            .iter()
            .map(|param| Symbol::argument(param.name.clone(), self.supply.fresh_ty()))
            .collect();

        self.scope.push(params.clone());
        let body = self.infer_expr(&lambda.body)?;
        let body_tpe = self.subs.recursive_prune(&body.tpe());
        for param in &mut params {
            param.tpe = self.subs.recursive_prune(&param.tpe);
        }
        self.scope.pop(&lambda.position)?;

        let arg_types = params.iter().map(|param| param.tpe.clone()).collect();
        Ok(TypedExpr::Lambda(TypedLambda {
            params,
            body: Box::new(body),
            tpe: Type::function_n(arg_types, body_tpe),
            position: lambda.position.clone(),
        }))
    }

    fn infer_let(&mut self, binding: &ast::Let) -> Result<TypedLet, TypeError> {
        let param_count = binding.params.len();
        let (param_types, declared_result) = match &binding.annotation {
            Some(annotation) => {
                let (args, result) = annotation.deconstruct_args_bounded(param_count);
                if args.len() < param_count {
                    return Err(TypeError::NotAFunction {
                        tpe: annotation.clone(),
                        position: binding.position.clone(),
                    });
                }
                (args, Some(result))
            }
            None => (
                (0..param_count).map(|_| self.supply.fresh_ty()).collect(),
                None,
            ),
        };

        let mut params: Vec<Symbol> = binding
            .params
            .iter()
            .zip(param_types)
            .map(|(param, tpe)| Symbol::argument(param.name.clone(), tpe))
            .collect();

        self.scope.push(params.clone());
        let body = self.infer_expr(&binding.body)?;
        let result = match declared_result {
            Some(expected) => self.unify(&expected, &body.tpe(), &body.position())?,
            None => body.tpe(),
        };
        let result = self.subs.recursive_prune(&result);
        for param in &mut params {
            param.tpe = self.subs.recursive_prune(&param.tpe);
        }
        self.scope.pop(&binding.position)?;

        let arg_types: Vec<Type> = params.iter().map(|param| param.tpe.clone()).collect();
        let tpe = Type::function_n(arg_types, result);
        debug!("inferred {} : {}", binding.name.name, tpe);

        Ok(TypedLet {
            name: binding.name.name.clone(),
            params,
            body: Box::new(body),
            tpe,
            position: binding.position.clone(),
        })
    }

    fn unify(
        &mut self,
        t1: &Type,
        t2: &Type,
        position: &lachs::Span,
    ) -> Result<Type, TypeError> {
        let unified = unify::unify(&mut self.subs, t1, t2, position)?;
        self.subs.compress();
        Ok(unified)
    }

    /// Post-pass over a typed subtree: every node type and every symbol
    /// type is replaced with its fully pruned form. Structure and
    /// positions are untouched. `infer_module` runs this over every
    /// binding; callers typing a bare expression run it themselves once
    /// inference is done.
    pub fn prune_expr(&self, expr: &mut TypedExpr) {
        match expr {
            TypedExpr::Ident(ident) => self.prune_symbol(&mut ident.symbol),
            TypedExpr::Int(lit) => lit.tpe = self.subs.recursive_prune(&lit.tpe),
            TypedExpr::Bool(lit) => lit.tpe = self.subs.recursive_prune(&lit.tpe),
            TypedExpr::Str(lit) => lit.tpe = self.subs.recursive_prune(&lit.tpe),
            TypedExpr::Apply(apply) => {
                self.prune_symbol(&mut apply.target.symbol);
                for arg in &mut apply.args {
                    self.prune_expr(arg);
                }
                apply.tpe = self.subs.recursive_prune(&apply.tpe);
            }
            TypedExpr::Lambda(lambda) => {
                for param in &mut lambda.params {
                    self.prune_symbol(param);
                }
                self.prune_expr(&mut lambda.body);
                lambda.tpe = self.subs.recursive_prune(&lambda.tpe);
            }
            TypedExpr::Let(binding) => self.prune_let(binding),
            TypedExpr::Module(module) => {
                for def in &mut module.definitions {
                    self.prune_let(def);
                }
            }
        }
    }

    fn prune_let(&self, binding: &mut TypedLet) {
        for param in &mut binding.params {
            self.prune_symbol(param);
        }
        self.prune_expr(&mut binding.body);
        binding.tpe = self.subs.recursive_prune(&binding.tpe);
    }

    fn prune_symbol(&self, symbol: &mut Symbol) {
        symbol.tpe = self.subs.recursive_prune(&symbol.tpe);
        if let SymbolLocation::StaticMethod {
            arg_types,
            return_type,
            ..
        } = &mut symbol.location
        {
            for tpe in arg_types.iter_mut() {
                *tpe = self.subs.recursive_prune(tpe);
            }
            *return_type = self.subs.recursive_prune(return_type);
        }
    }
}

fn max_var_id(tpe: &Type) -> Option<u64> {
    match tpe {
        Type::Var(v) => Some(v.id),
        Type::Con { args, .. } => args.iter().filter_map(max_var_id).max(),
        Type::Qualified { ty, .. } => max_var_id(ty),
    }
}
