//! Property tests for the lowering pipeline.
//!
//! - Determinism: a fixed input and counter produce identical output.
//! - Fresh-name uniqueness: no two minted binders share a name.
//! - Eager-wrap invariant: every accepted program is fully thunked.
//! - Semantics preservation on randomly generated arithmetic bodies and on
//!   the loop-carried accumulator pattern, checked against directly
//!   computed expected values.

use proptest::prelude::*;

use purelift_check::interpreter::{run_program, Value};
use purelift_core::core;
use purelift_core::name::{NameSupply, VarName};
use purelift_core::source::{self as src, Operator, Stmt, Target, ToplevelStmt};
use purelift_core::source::Expr as SE;
use purelift_core::source::Type as ST;
use purelift_lower::{is_fully_wrapped, run_with_supply};

// ---------------------------------------------------------------------------
// Random arithmetic bodies
// ---------------------------------------------------------------------------

/// A tiny arithmetic language over one variable `n`, mirrored directly so
/// the test can compute the expected value without the pipeline.
#[derive(Debug, Clone)]
enum Arith {
    Lit(i64),
    Var,
    Bin(Operator, Box<Arith>, Box<Arith>),
}

fn arb_arith() -> impl Strategy<Value = Arith> {
    let leaf = prop_oneof![(-20i64..=20).prop_map(Arith::Lit), Just(Arith::Var)];
    leaf.prop_recursive(3, 24, 2, |inner| {
        (
            prop_oneof![
                Just(Operator::Add),
                Just(Operator::Sub),
                Just(Operator::Mul),
                Just(Operator::Max),
                Just(Operator::Min),
            ],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, a, b)| Arith::Bin(op, Box::new(a), Box::new(b)))
    })
}

fn arith_to_source(a: &Arith) -> SE {
    match a {
        Arith::Lit(v) => SE::int(*v),
        Arith::Var => SE::name("n"),
        Arith::Bin(op, lhs, rhs) => {
            SE::bin(arith_to_source(lhs), *op, arith_to_source(rhs))
        }
    }
}

/// Evaluates with the same checked-i64 semantics as the Core interpreter:
/// `None` when any intermediate overflows, so the case can be discarded
/// rather than failing spuriously.
fn arith_eval(a: &Arith, n: i64) -> Option<i64> {
    match a {
        Arith::Lit(v) => Some(*v),
        Arith::Var => Some(n),
        Arith::Bin(op, lhs, rhs) => {
            let l = arith_eval(lhs, n)?;
            let r = arith_eval(rhs, n)?;
            match op {
                Operator::Add => l.checked_add(r),
                Operator::Sub => l.checked_sub(r),
                Operator::Mul => l.checked_mul(r),
                Operator::Max => Some(l.max(r)),
                Operator::Min => Some(l.min(r)),
                _ => unreachable!("generator only emits the five operators above"),
            }
        }
    }
}

fn arith_program(a: &Arith) -> src::Program {
    src::Program {
        stmts: vec![ToplevelStmt::FunctionDef {
            name: VarName::new("solve"),
            args: vec![(VarName::new("n"), ST::Int)],
            ret: ST::Int,
            body: vec![Stmt::Return(arith_to_source(a))],
        }],
    }
}

// ---------------------------------------------------------------------------
// Minted-binder collection
// ---------------------------------------------------------------------------

fn collect_binders(expr: &core::Expr, out: &mut Vec<VarName>) {
    match expr {
        core::Expr::Var(_) | core::Expr::Lit(_) => {}
        core::Expr::App(func, args) => {
            collect_binders(func, out);
            for arg in args {
                collect_binders(arg, out);
            }
        }
        core::Expr::Lam(params, body) => {
            out.extend(params.iter().map(|(name, _)| name.clone()));
            collect_binders(body, out);
        }
        core::Expr::Let(name, _, value, body) => {
            out.push(name.clone());
            collect_binders(value, out);
            collect_binders(body, out);
        }
    }
}

fn program_binders(program: &core::Program) -> Vec<VarName> {
    let mut out = Vec::new();
    let mut toplevel = &program.toplevel;
    loop {
        match toplevel {
            core::Toplevel::ResultExpr(e) => {
                collect_binders(e, &mut out);
                return out;
            }
            core::Toplevel::Let(name, _, value, rest) => {
                out.push(name.clone());
                collect_binders(value, &mut out);
                toplevel = rest;
            }
            core::Toplevel::LetRec(name, params, _, body, rest) => {
                out.push(name.clone());
                out.extend(params.iter().map(|(p, _)| p.clone()));
                collect_binders(body, &mut out);
                toplevel = rest;
            }
        }
    }
}

fn minted_binders_are_unique(program: &core::Program) -> bool {
    let minted: Vec<VarName> = program_binders(program)
        .into_iter()
        .filter(|name| name.is_minted())
        .collect();
    let unique: std::collections::HashSet<&VarName> = minted.iter().collect();
    unique.len() == minted.len()
}

// ---------------------------------------------------------------------------
// Shared fixture: the accumulator loop
// ---------------------------------------------------------------------------

fn accumulator_program(step: i64) -> src::Program {
    // a = 0
    // for i in range(n): a += i * step
    // return a
    src::Program {
        stmts: vec![ToplevelStmt::FunctionDef {
            name: VarName::new("solve"),
            args: vec![(VarName::new("n"), ST::Int)],
            ret: ST::Int,
            body: vec![
                Stmt::AnnAssign(Target::name("a"), ST::Int, SE::int(0)),
                Stmt::For(
                    Target::name("i"),
                    SE::call(SE::builtin(src::Builtin::Range1), vec![SE::name("n")]),
                    vec![Stmt::AugAssign(
                        Target::name("a"),
                        Operator::Add,
                        SE::bin(SE::name("i"), Operator::Mul, SE::int(step)),
                    )],
                ),
                Stmt::Return(SE::name("a")),
            ],
        }],
    }
}

proptest! {
    #[test]
    fn lowering_is_deterministic(a in arb_arith(), start in 0u64..500) {
        let program = arith_program(&a);
        let first = run_with_supply(&program, NameSupply::starting_at(start));
        let second = run_with_supply(&program, NameSupply::starting_at(start));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn accepted_programs_satisfy_the_invariants(a in arb_arith()) {
        let program = arith_program(&a);
        // Arithmetic-only bodies always lower; run() already type checks.
        let lowered = run_with_supply(&program, NameSupply::new()).unwrap();
        prop_assert!(is_fully_wrapped(&lowered));
        prop_assert!(minted_binders_are_unique(&lowered));
    }

    #[test]
    fn arithmetic_semantics_are_preserved(a in arb_arith(), n in -50i64..50) {
        let Some(expected) = arith_eval(&a, n) else {
            // Intermediate overflow: the interpreter would trap; skip.
            return Ok(());
        };
        let program = arith_program(&a);
        let lowered = run_with_supply(&program, NameSupply::new()).unwrap();
        let got = run_program(&lowered, vec![Value::Int(n)]);
        prop_assert_eq!(got, Ok(Value::Int(expected)));
    }

    #[test]
    fn loop_semantics_match_the_imperative_reading(n in 0i64..60, step in -5i64..5) {
        let program = accumulator_program(step);
        let lowered = run_with_supply(&program, NameSupply::new()).unwrap();
        let expected: i64 = (0..n).map(|i| i * step).sum();
        prop_assert_eq!(
            run_program(&lowered, vec![Value::Int(n)]),
            Ok(Value::Int(expected))
        );
        prop_assert!(minted_binders_are_unique(&lowered));
    }
}
