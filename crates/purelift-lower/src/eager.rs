//! The eager-wrap pass.
//!
//! Core's `if` builtin is lazy in its branches, but everything downstream
//! of this pipeline evaluates strictly. Translating a recursive function's
//! conditional directly would therefore diverge: both branches would be
//! evaluated before the test. This pass rewrites every saturated
//! `if p a b` into `(if p (λ(). a) (λ(). b)) ()`, so a strict evaluator
//! only ever forces the branch that was taken. The `if` builtin's type
//! argument becomes the thunk type `() -> t`, which keeps the program
//! well-typed.
//!
//! The rewrite is a bottom-up structural recursion; the orchestrator runs
//! the Core type checker on the result as a self-check.

use purelift_core::core::{Builtin, Expr, Lit, Program, Toplevel, Type};

/// Rewrites every conditional in the program into thunked form.
pub fn eager_wrap(program: &Program) -> Program {
    Program {
        toplevel: wrap_toplevel(&program.toplevel),
    }
}

fn wrap_toplevel(toplevel: &Toplevel) -> Toplevel {
    match toplevel {
        Toplevel::ResultExpr(e) => Toplevel::ResultExpr(wrap_expr(e)),
        Toplevel::Let(name, ty, value, rest) => Toplevel::Let(
            name.clone(),
            ty.clone(),
            wrap_expr(value),
            Box::new(wrap_toplevel(rest)),
        ),
        Toplevel::LetRec(name, params, ret, body, rest) => Toplevel::LetRec(
            name.clone(),
            params.clone(),
            ret.clone(),
            wrap_expr(body),
            Box::new(wrap_toplevel(rest)),
        ),
    }
}

fn wrap_expr(expr: &Expr) -> Expr {
    match expr {
        Expr::Var(_) | Expr::Lit(_) => expr.clone(),
        Expr::App(func, args) => {
            if args.len() == 3 {
                if let Expr::Lit(Lit::Builtin(Builtin::If(result_ty))) = func.as_ref() {
                    let cond = wrap_expr(&args[0]);
                    let then_e = wrap_expr(&args[1]);
                    let else_e = wrap_expr(&args[2]);
                    let thunk_ty = Type::fun(vec![], result_ty.clone());
                    return Expr::app(
                        Expr::app(
                            Expr::builtin(Builtin::If(thunk_ty)),
                            vec![cond, Expr::lam(vec![], then_e), Expr::lam(vec![], else_e)],
                        ),
                        vec![],
                    );
                }
            }
            Expr::app(wrap_expr(func), args.iter().map(wrap_expr).collect())
        }
        Expr::Lam(params, body) => Expr::Lam(params.clone(), Box::new(wrap_expr(body))),
        Expr::Let(name, ty, value, body) => Expr::let_(
            name.clone(),
            ty.clone(),
            wrap_expr(value),
            wrap_expr(body),
        ),
    }
}

/// True when every `if` in the program is in wrapped form: three arguments,
/// the second and third nullary lambdas, and an extra zero-argument call
/// around the whole application. Used by tests to state the pass invariant.
pub fn is_fully_wrapped(program: &Program) -> bool {
    toplevel_wrapped(&program.toplevel)
}

fn toplevel_wrapped(toplevel: &Toplevel) -> bool {
    match toplevel {
        Toplevel::ResultExpr(e) => expr_wrapped(e),
        Toplevel::Let(_, _, value, rest) => expr_wrapped(value) && toplevel_wrapped(rest),
        Toplevel::LetRec(_, _, _, body, rest) => expr_wrapped(body) && toplevel_wrapped(rest),
    }
}

fn expr_wrapped(expr: &Expr) -> bool {
    match expr {
        Expr::Var(_) => true,
        Expr::Lit(lit) => !matches!(lit, Lit::Builtin(Builtin::If(_))),
        Expr::App(func, args) => {
            if args.is_empty() {
                if let Expr::App(inner_func, inner_args) = func.as_ref() {
                    if matches!(inner_func.as_ref(), Expr::Lit(Lit::Builtin(Builtin::If(_)))) {
                        return inner_args.len() == 3
                            && expr_wrapped(&inner_args[0])
                            && nullary_lam_wrapped(&inner_args[1])
                            && nullary_lam_wrapped(&inner_args[2]);
                    }
                }
            }
            expr_wrapped(func) && args.iter().all(expr_wrapped)
        }
        Expr::Lam(_, body) => expr_wrapped(body),
        Expr::Let(_, _, value, body) => expr_wrapped(value) && expr_wrapped(body),
    }
}

fn nullary_lam_wrapped(expr: &Expr) -> bool {
    match expr {
        Expr::Lam(params, body) => params.is_empty() && expr_wrapped(body),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_if(result_ty: Type, cond: Expr, then_e: Expr, else_e: Expr) -> Expr {
        Expr::app(
            Expr::builtin(Builtin::If(result_ty)),
            vec![cond, then_e, else_e],
        )
    }

    #[test]
    fn wraps_a_simple_conditional() {
        let before = raw_if(Type::Int, Expr::bool_(true), Expr::int(1), Expr::int(2));
        let after = wrap_expr(&before);
        assert_eq!(
            after,
            Expr::app(
                Expr::app(
                    Expr::builtin(Builtin::If(Type::fun(vec![], Type::Int))),
                    vec![
                        Expr::bool_(true),
                        Expr::lam(vec![], Expr::int(1)),
                        Expr::lam(vec![], Expr::int(2)),
                    ],
                ),
                vec![],
            )
        );
    }

    #[test]
    fn wraps_nested_conditionals_in_branches() {
        let inner = raw_if(Type::Int, Expr::bool_(false), Expr::int(3), Expr::int(4));
        let outer = raw_if(Type::Int, Expr::bool_(true), inner, Expr::int(2));
        let program = Program {
            toplevel: Toplevel::ResultExpr(outer),
        };
        let wrapped = eager_wrap(&program);
        assert!(is_fully_wrapped(&wrapped));
    }

    #[test]
    fn wraps_under_binders() {
        let body = raw_if(Type::Int, Expr::var("p"), Expr::int(1), Expr::int(2));
        let program = Program {
            toplevel: Toplevel::ResultExpr(Expr::let_(
                "x",
                Type::Int,
                Expr::int(0),
                Expr::lam(
                    vec![(purelift_core::VarName::new("p"), Type::Bool)],
                    body,
                ),
            )),
        };
        let wrapped = eager_wrap(&program);
        assert!(is_fully_wrapped(&wrapped));
        // Idempotent detection: the original is not yet wrapped.
        assert!(!is_fully_wrapped(&program));
    }

    #[test]
    fn partial_if_applications_are_left_alone() {
        // `if` applied to fewer than three arguments is not a saturated
        // conditional; the invariant checker flags it, the rewriter keeps it.
        let partial = Expr::app(
            Expr::builtin(Builtin::If(Type::Int)),
            vec![Expr::bool_(true)],
        );
        assert_eq!(wrap_expr(&partial), partial);
        let program = Program {
            toplevel: Toplevel::ResultExpr(partial),
        };
        assert!(!is_fully_wrapped(&program));
    }
}
