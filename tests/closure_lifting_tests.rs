//! Integration tests for closure lifting
//!
//! Modules are typed first and then lifted, and the tests check the
//! synthesised helper bindings, the rewritten bodies, and the pass's
//! post-conditions: no built-in is partially applied afterwards, no
//! application is more than one argument short, and no binding changes
//! its top-level type.

use lachs::Span;
use minml::ast;
use minml::lift::lift_module;
use minml::typed::{TypedExpr, TypedLet, TypedModule};
use minml::types::{Symbol, SymbolLocation, Type, Typer};

fn ident(name: &str) -> ast::Ident {
    ast::Ident {
        name: name.into(),
        position: Span::default(),
    }
}

fn ident_expr(name: &str) -> ast::Expr {
    ast::Expr::Ident(ident(name))
}

fn int_expr(value: i64) -> ast::Expr {
    ast::Expr::Int(ast::IntLit {
        value,
        position: Span::default(),
    })
}

fn apply(name: &str, args: Vec<ast::Expr>) -> ast::Expr {
    ast::Expr::Apply(ast::Apply {
        target: ident(name),
        args,
        position: Span::default(),
    })
}

fn let_(name: &str, params: &[&str], body: ast::Expr) -> ast::Let {
    ast::Let {
        name: ident(name),
        params: params.iter().map(|p| ident(p)).collect(),
        annotation: None,
        body: Box::new(body),
        position: Span::default(),
    }
}

fn annotated_let(name: &str, params: &[&str], annotation: Type, body: ast::Expr) -> ast::Let {
    ast::Let {
        name: ident(name),
        params: params.iter().map(|p| ident(p)).collect(),
        annotation: Some(annotation),
        body: Box::new(body),
        position: Span::default(),
    }
}

fn module(defs: Vec<ast::Let>) -> ast::Module {
    ast::Module {
        name: "Main".into(),
        definitions: defs,
        position: Span::default(),
    }
}

fn add_prelude() -> Vec<Symbol> {
    vec![Symbol::built_in(
        "add",
        Type::function_n(vec![Type::int(), Type::int()], Type::int()),
    )]
}

fn type_and_lift(prelude: Vec<Symbol>, input: ast::Module) -> TypedModule {
    let typed = Typer::new(prelude)
        .infer_module(&input)
        .expect("module types");
    lift_module(&typed)
}

fn arity(target: &minml::typed::TypedIdent) -> usize {
    match &target.symbol.location {
        SymbolLocation::StaticMethod { arg_types, .. } => arg_types.len(),
        _ => target.symbol.tpe.deconstruct_args().0.len(),
    }
}

/// Walk a lifted tree and fail on any leftover partial application of a
/// built-in, or any application more than one argument short.
fn assert_lifted(expr: &TypedExpr) {
    match expr {
        TypedExpr::Apply(apply) => {
            let k = arity(&apply.target);
            let supplied = apply.args.len();
            if matches!(apply.target.symbol.location, SymbolLocation::BuiltIn) {
                assert!(
                    supplied >= k,
                    "built-in {} is still partially applied",
                    apply.target.symbol.name
                );
            }
            assert!(
                supplied + 1 >= k,
                "application of {} is missing more than one argument",
                apply.target.symbol.name
            );
            for arg in &apply.args {
                assert_lifted(arg);
            }
        }
        TypedExpr::Lambda(lambda) => assert_lifted(&lambda.body),
        TypedExpr::Let(binding) => assert_lifted(&binding.body),
        TypedExpr::Module(module) => {
            for def in &module.definitions {
                assert_lifted(&def.body);
            }
        }
        _ => {}
    }
}

fn find_def<'a>(module: &'a TypedModule, name: &str) -> &'a TypedLet {
    module
        .definitions
        .iter()
        .find(|def| def.name == name)
        .unwrap_or_else(|| panic!("no definition named {}", name))
}

#[test]
fn test_binary_built_in_partial_is_lifted() {
    // let inc = add 1
    let lifted = type_and_lift(
        add_prelude(),
        module(vec![let_("inc", &[], apply("add", vec![int_expr(1)]))]),
    );

    assert_eq!(lifted.definitions.len(), 2);
    assert_eq!(lifted.definitions[0].name, "inc");
    assert_eq!(lifted.definitions[1].name, "inc$lambda$0");

    // inc$lambda$0 arg0 arg1 = add arg0 arg1
    let helper = find_def(&lifted, "inc$lambda$0");
    assert_eq!(helper.params.len(), 2);
    assert_eq!(helper.params[0].name, "arg0");
    assert_eq!(helper.params[0].tpe, Type::int());
    assert_eq!(helper.params[1].tpe, Type::int());
    match helper.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "add");
            assert_eq!(apply.args.len(), 2);
            assert_eq!(apply.tpe, Type::int());
        }
        other => panic!("expected a full application body, got {:?}", other),
    }

    // inc's body became inc$lambda$0 1.
    let inc = find_def(&lifted, "inc");
    match inc.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "inc$lambda$0");
            assert!(matches!(
                &apply.target.symbol.location,
                SymbolLocation::StaticMethod { module, .. } if module == "Main"
            ));
            assert_eq!(apply.args.len(), 1);
            assert_eq!(apply.tpe, Type::function(Type::int(), Type::int()));
        }
        other => panic!("expected a rewritten application, got {:?}", other),
    }
}

#[test]
fn test_ternary_application_one_arg_supplied_is_curried() {
    // let f (x : A) (y : B) (z : C) : A = x
    // let g x = f x
    let a = Type::con("A");
    let b = Type::con("B");
    let c = Type::con("C");
    let f_ty = Type::function_n(vec![a.clone(), b.clone(), c.clone()], a.clone());
    let lifted = type_and_lift(
        vec![],
        module(vec![
            annotated_let("f", &["x", "y", "z"], f_ty, ident_expr("x")),
            let_("g", &["x"], apply("f", vec![ident_expr("x")])),
        ]),
    );

    assert_eq!(lifted.definitions.len(), 3);
    assert_eq!(lifted.definitions[2].name, "g$curied$0");

    // g$curied$0 (arg0 : A) (arg1 : B) = f arg0 arg1
    let helper = find_def(&lifted, "g$curied$0");
    assert_eq!(helper.params.len(), 2);
    assert_eq!(helper.params[0].tpe, a);
    assert_eq!(helper.params[1].tpe, b);
    match helper.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "f");
            assert_eq!(apply.args.len(), 2);
            assert_eq!(apply.tpe, Type::function(c, a));
        }
        other => panic!("expected an application body, got {:?}", other),
    }

    // g's body became g$curied$0 x.
    let g = find_def(&lifted, "g");
    match g.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "g$curied$0");
            assert_eq!(apply.args.len(), 1);
        }
        other => panic!("expected a rewritten application, got {:?}", other),
    }
}

#[test]
fn test_built_in_partial_missing_two_arguments_cascades() {
    // let p = f3 1  with built-in f3 : Int -> Int -> Int -> Int
    let prelude = vec![Symbol::built_in(
        "f3",
        Type::function_n(vec![Type::int(), Type::int(), Type::int()], Type::int()),
    )];
    let lifted = type_and_lift(
        prelude,
        module(vec![let_("p", &[], apply("f3", vec![int_expr(1)]))]),
    );

    // The built-in rule synthesises p$lambda$0; its call site is still
    // two arguments short, so the currying rule wraps it once more.
    assert_eq!(lifted.definitions.len(), 3);
    assert_eq!(lifted.definitions[0].name, "p");
    assert_eq!(lifted.definitions[1].name, "p$curied$0");
    assert_eq!(lifted.definitions[2].name, "p$lambda$0");

    let lambda = find_def(&lifted, "p$lambda$0");
    assert_eq!(lambda.params.len(), 3);
    match lambda.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "f3");
            assert_eq!(apply.args.len(), 3);
        }
        other => panic!("expected a full application body, got {:?}", other),
    }

    let curied = find_def(&lifted, "p$curied$0");
    assert_eq!(curied.params.len(), 2);
    match curied.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "p$lambda$0");
            assert_eq!(apply.args.len(), 2);
        }
        other => panic!("expected an application body, got {:?}", other),
    }

    let p = find_def(&lifted, "p");
    match p.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "p$curied$0");
            assert_eq!(apply.args.len(), 1);
        }
        other => panic!("expected a rewritten application, got {:?}", other),
    }

    for def in &lifted.definitions {
        assert_lifted(&def.body);
    }
}

#[test]
fn test_partial_application_inside_argument_is_lifted() {
    // let t = twice (add 1) 2  with twice : (Int -> Int) -> Int -> Int
    let mut prelude = add_prelude();
    prelude.push(Symbol::built_in(
        "twice",
        Type::function_n(
            vec![Type::function(Type::int(), Type::int()), Type::int()],
            Type::int(),
        ),
    ));
    let lifted = type_and_lift(
        prelude,
        module(vec![let_(
            "t",
            &[],
            apply("twice", vec![apply("add", vec![int_expr(1)]), int_expr(2)]),
        )]),
    );

    assert_eq!(lifted.definitions.len(), 2);
    assert_eq!(lifted.definitions[1].name, "t$lambda$0");

    // twice stays fully applied; its first argument now calls the helper.
    let t = find_def(&lifted, "t");
    match t.body.as_ref() {
        TypedExpr::Apply(apply) => {
            assert_eq!(apply.target.symbol.name, "twice");
            match &apply.args[0] {
                TypedExpr::Apply(inner) => {
                    assert_eq!(inner.target.symbol.name, "t$lambda$0");
                    assert_eq!(inner.args.len(), 1);
                }
                other => panic!("expected a lifted argument, got {:?}", other),
            }
        }
        other => panic!("expected an application body, got {:?}", other),
    }

    for def in &lifted.definitions {
        assert_lifted(&def.body);
    }
}

#[test]
fn test_lifting_preserves_top_level_types() {
    let input = module(vec![
        let_("inc", &[], apply("add", vec![int_expr(1)])),
        let_("use", &["x"], apply("add", vec![ident_expr("x"), int_expr(2)])),
    ]);
    let typed = Typer::new(add_prelude())
        .infer_module(&input)
        .expect("module types");
    let lifted = lift_module(&typed);

    for original in &typed.definitions {
        let after = find_def(&lifted, &original.name);
        assert_eq!(original.tpe, after.tpe, "type of {} changed", original.name);
    }
}

#[test]
fn test_lifted_module_satisfies_post_conditions() {
    let prelude = vec![
        Symbol::built_in(
            "add",
            Type::function_n(vec![Type::int(), Type::int()], Type::int()),
        ),
        Symbol::built_in(
            "clamp",
            Type::function_n(vec![Type::int(), Type::int(), Type::int()], Type::int()),
        ),
    ];
    let input = module(vec![
        let_("inc", &[], apply("add", vec![int_expr(1)])),
        let_("low", &[], apply("clamp", vec![int_expr(0)])),
        let_("both", &["x"], apply("add", vec![ident_expr("x"), int_expr(1)])),
    ]);
    let lifted = type_and_lift(prelude, input);
    for def in &lifted.definitions {
        assert_lifted(&def.body);
    }
}

#[test]
fn test_lifting_is_idempotent_on_lifted_code() {
    let input = module(vec![
        let_("inc", &[], apply("add", vec![int_expr(1)])),
        let_("id", &["x"], ident_expr("x")),
    ]);
    let lifted = type_and_lift(add_prelude(), input);
    let again = lift_module(&lifted);
    assert_eq!(lifted, again);
}

#[test]
fn test_missing_one_argument_of_non_built_in_is_left_alone() {
    // let f x y = x
    // let g = f 1
    let input = module(vec![
        let_("f", &["x", "y"], ident_expr("x")),
        let_("g", &[], apply("f", vec![int_expr(1)])),
    ]);
    let lifted = type_and_lift(vec![], input);

    // No helper: f is not a built-in and only one argument is missing.
    assert_eq!(lifted.definitions.len(), 2);
    let g = find_def(&lifted, "g");
    match g.body.as_ref() {
        TypedExpr::Apply(apply) => assert_eq!(apply.target.symbol.name, "f"),
        other => panic!("expected the original application, got {:?}", other),
    }
}
