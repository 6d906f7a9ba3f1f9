//! Static type checker for Core programs.
//!
//! The lowering pass emits fresh type holes instead of doing inference
//! itself; this checker walks the program once, unifying every hole, and
//! accepts iff a consistent assignment exists. Checking is pure: the
//! program is never annotated in place.
//!
//! The checker mints its own type variables in the `?n` namespace, disjoint
//! from the `$n` holes the lowering mints, so the two supplies cannot
//! collide.

pub mod diagnostics;
pub mod unify;

pub use diagnostics::TypeError;
pub use unify::Subst;

use std::collections::HashMap;

use purelift_core::core::{Builtin, Expr, Lit, Program, Toplevel, Type};
use purelift_core::name::{TypeName, VarName};

/// Checks a whole Core program.
pub fn typecheck_program(program: &Program) -> Result<(), TypeError> {
    let mut checker = Checker::default();
    let mut env = HashMap::new();
    checker.check_toplevel(&mut env, &program.toplevel)
}

/// Infers the type of a closed Core expression (mainly for tests).
pub fn typecheck_expr(expr: &Expr) -> Result<Type, TypeError> {
    let mut checker = Checker::default();
    let mut env = HashMap::new();
    let ty = checker.infer(&mut env, expr)?;
    Ok(checker.subst.resolve(&ty))
}

#[derive(Debug, Default)]
struct Checker {
    subst: Subst,
    counter: u64,
}

type Env = HashMap<VarName, Type>;

impl Checker {
    fn fresh(&mut self) -> Type {
        let n = self.counter;
        self.counter += 1;
        Type::Var(TypeName(format!("?{}", n)))
    }

    fn check_toplevel(&mut self, env: &mut Env, toplevel: &Toplevel) -> Result<(), TypeError> {
        match toplevel {
            Toplevel::ResultExpr(e) => {
                self.infer(env, e)?;
                Ok(())
            }
            Toplevel::Let(name, ty, value, rest) => {
                let tv = self.infer(env, value)?;
                self.subst.unify(ty, &tv)?;
                env.insert(name.clone(), ty.clone());
                self.check_toplevel(env, rest)
            }
            Toplevel::LetRec(name, params, ret, body, rest) => {
                let fn_ty = Type::fun(
                    params.iter().map(|(_, t)| t.clone()).collect(),
                    ret.clone(),
                );
                env.insert(name.clone(), fn_ty);
                let saved: Vec<(VarName, Option<Type>)> = params
                    .iter()
                    .map(|(p, t)| (p.clone(), env.insert(p.clone(), t.clone())))
                    .collect();
                let body_ty = self.infer(env, body)?;
                self.subst.unify(ret, &body_ty)?;
                restore(env, saved);
                self.check_toplevel(env, rest)
            }
        }
    }

    fn infer(&mut self, env: &mut Env, expr: &Expr) -> Result<Type, TypeError> {
        match expr {
            Expr::Var(name) => env.get(name).cloned().ok_or_else(|| TypeError::UnboundVariable {
                name: name.clone(),
            }),
            Expr::Lit(lit) => self.lit_type(lit),
            Expr::App(func, args) => {
                let fn_ty = self.infer(env, func)?;
                let mut arg_tys = Vec::with_capacity(args.len());
                for arg in args {
                    arg_tys.push(self.infer(env, arg)?);
                }
                self.apply(fn_ty, arg_tys)
            }
            Expr::Lam(params, body) => {
                let saved: Vec<(VarName, Option<Type>)> = params
                    .iter()
                    .map(|(p, t)| (p.clone(), env.insert(p.clone(), t.clone())))
                    .collect();
                let body_ty = self.infer(env, body);
                restore(env, saved);
                Ok(Type::fun(
                    params.iter().map(|(_, t)| t.clone()).collect(),
                    body_ty?,
                ))
            }
            Expr::Let(name, ty, value, body) => {
                let tv = self.infer(env, value)?;
                self.subst.unify(ty, &tv)?;
                let saved = env.insert(name.clone(), ty.clone());
                let result = self.infer(env, body);
                match saved {
                    Some(old) => {
                        env.insert(name.clone(), old);
                    }
                    None => {
                        env.remove(name);
                    }
                }
                result
            }
        }
    }

    fn lit_type(&mut self, lit: &Lit) -> Result<Type, TypeError> {
        match lit {
            Lit::Int(_) => Ok(Type::Int),
            Lit::Bool(_) => Ok(Type::Bool),
            Lit::Nil(elem) => Ok(Type::list(elem.clone())),
            Lit::Builtin(b) => {
                if let Builtin::Proj(elems, index) = b {
                    if *index >= elems.len() {
                        return Err(TypeError::InvalidProjection {
                            index: *index,
                            arity: elems.len(),
                        });
                    }
                }
                Ok(b.ty())
            }
        }
    }

    /// Types an application, allowing partial and zero-argument calls.
    fn apply(&mut self, fn_ty: Type, arg_tys: Vec<Type>) -> Result<Type, TypeError> {
        let resolved = self.subst.resolve(&fn_ty);
        if matches!(
            resolved,
            Type::Int | Type::Bool | Type::List(_) | Type::Tuple(_)
        ) {
            return Err(TypeError::NotAFunction { ty: resolved });
        }
        let ret = self.fresh();
        self.subst.unify(&fn_ty, &Type::fun(arg_tys, ret.clone()))?;
        Ok(ret)
    }
}

fn restore(env: &mut Env, saved: Vec<(VarName, Option<Type>)>) {
    for (name, old) in saved.into_iter().rev() {
        match old {
            Some(ty) => {
                env.insert(name, ty);
            }
            None => {
                env.remove(&name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purelift_core::core::Params;

    fn letrec_solve(params: Vec<(VarName, Type)>, ret: Type, body: Expr) -> Program {
        Program {
            toplevel: Toplevel::LetRec(
                VarName::new("solve"),
                Params::from(params),
                ret,
                body,
                Box::new(Toplevel::ResultExpr(Expr::var("solve"))),
            ),
        }
    }

    #[test]
    fn identity_function_checks() {
        let prog = letrec_solve(
            vec![(VarName::new("n"), Type::Int)],
            Type::Int,
            Expr::var("n"),
        );
        assert_eq!(typecheck_program(&prog), Ok(()));
    }

    #[test]
    fn holes_unify_through_builtins() {
        // solve xs = at xs 0, with the element type left as a hole.
        let prog = letrec_solve(
            vec![(VarName::new("xs"), Type::list(Type::Int))],
            Type::Int,
            Expr::app(
                Expr::builtin(Builtin::At(Type::var("$0"))),
                vec![Expr::var("xs"), Expr::int(0)],
            ),
        );
        assert_eq!(typecheck_program(&prog), Ok(()));
    }

    #[test]
    fn eager_wrapped_if_checks() {
        // (if p (fun () -> 1) (fun () -> 2)) ()
        let cond = Expr::app(
            Expr::builtin(Builtin::GreaterThan(Type::var("$1"))),
            vec![Expr::var("n"), Expr::int(0)],
        );
        let body = Expr::app(
            Expr::app(
                Expr::builtin(Builtin::If(Type::fun(vec![], Type::var("$0")))),
                vec![
                    cond,
                    Expr::lam(vec![], Expr::int(1)),
                    Expr::lam(vec![], Expr::int(2)),
                ],
            ),
            vec![],
        );
        let prog = letrec_solve(vec![(VarName::new("n"), Type::Int)], Type::Int, body);
        assert_eq!(typecheck_program(&prog), Ok(()));
    }

    #[test]
    fn recursion_sees_its_own_signature() {
        // solve n = solve (n - 1)  -- ill-founded but well-typed
        let body = Expr::app(
            Expr::var("solve"),
            vec![Expr::app(
                Expr::builtin(Builtin::Minus),
                vec![Expr::var("n"), Expr::int(1)],
            )],
        );
        let prog = letrec_solve(vec![(VarName::new("n"), Type::Int)], Type::Int, body);
        assert_eq!(typecheck_program(&prog), Ok(()));
    }

    #[test]
    fn partial_application_checks() {
        // solve n = (plus n) applied later: let f: ? = (+ n) in (f 1)
        let body = Expr::let_(
            "f",
            Type::var("$9"),
            Expr::app(Expr::builtin(Builtin::Plus), vec![Expr::var("n")]),
            Expr::app(Expr::var("f"), vec![Expr::int(1)]),
        );
        let prog = letrec_solve(vec![(VarName::new("n"), Type::Int)], Type::Int, body);
        assert_eq!(typecheck_program(&prog), Ok(()));
    }

    #[test]
    fn rejects_bool_plus_int() {
        let body = Expr::app(
            Expr::builtin(Builtin::Plus),
            vec![Expr::bool_(true), Expr::int(1)],
        );
        let prog = letrec_solve(vec![(VarName::new("n"), Type::Int)], Type::Int, body);
        assert!(matches!(
            typecheck_program(&prog),
            Err(TypeError::Mismatch { .. })
        ));
    }

    #[test]
    fn rejects_unbound_variable() {
        let prog = letrec_solve(
            vec![(VarName::new("n"), Type::Int)],
            Type::Int,
            Expr::var("ghost"),
        );
        assert_eq!(
            typecheck_program(&prog),
            Err(TypeError::UnboundVariable {
                name: VarName::new("ghost")
            })
        );
    }

    #[test]
    fn rejects_applying_an_int() {
        let expr = Expr::app(Expr::int(3), vec![Expr::int(4)]);
        assert!(matches!(
            typecheck_expr(&expr),
            Err(TypeError::NotAFunction { ty: Type::Int })
        ));
    }

    #[test]
    fn rejects_out_of_bounds_projection() {
        let expr = Expr::app(
            Expr::builtin(Builtin::Proj(vec![Type::Int], 3)),
            vec![Expr::unit()],
        );
        assert!(matches!(
            typecheck_expr(&expr),
            Err(TypeError::InvalidProjection { index: 3, arity: 1 })
        ));
    }
}
