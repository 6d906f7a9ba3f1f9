//! Preconditions the lowering pass relies on.
//!
//! These checks run before lowering and reject programs whose loops cannot
//! be expressed as folds: loop counters must be plain (possibly tupled)
//! names, must not escape their loop, and must not be re-assigned; loop
//! bodies must not assign to what the iterator expression reads, must not
//! `return`, and may only do subscripted assignment through a plain name.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use purelift_core::loc::Loc;
use purelift_core::name::VarName;
use purelift_core::source::{Expr, ExprKind, Program, Stmt, Target, TargetKind, ToplevelStmt};

use crate::vars::{analyze_max, expr_reads};

/// A violated lowering precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LintError {
    #[error("loop counter must not be subscripted")]
    SubscriptedLoopCounter { loc: Option<Loc> },

    #[error("loop counter `{name}` is read after its loop ends")]
    LoopCounterLeak { name: VarName, loc: Option<Loc> },

    #[error("loop body must not assign to its loop counter `{name}`")]
    AssignmentToLoopCounter { name: VarName, loc: Option<Loc> },

    #[error("loop body must not assign to `{name}`, which the loop iterator reads")]
    AssignmentToLoopIterator { name: VarName, loc: Option<Loc> },

    #[error("`return` is not allowed inside a `for` body")]
    ReturnInsideLoop { loc: Option<Loc> },

    #[error("subscripted assignment in a `for` body must go through a plain name")]
    NontrivialSubscriptedAssignment { loc: Option<Loc> },
}

impl LintError {
    /// The source location closest to the violation, when one is known.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            LintError::SubscriptedLoopCounter { loc }
            | LintError::LoopCounterLeak { loc, .. }
            | LintError::AssignmentToLoopCounter { loc, .. }
            | LintError::AssignmentToLoopIterator { loc, .. }
            | LintError::ReturnInsideLoop { loc }
            | LintError::NontrivialSubscriptedAssignment { loc } => *loc,
        }
    }
}

/// Checks every function body in the program.
pub fn check_preconditions(program: &Program) -> Result<(), LintError> {
    for stmt in &program.stmts {
        if let ToplevelStmt::FunctionDef { body, .. } = stmt {
            check_block(body, &IndexSet::new(), false)?;
        }
    }
    Ok(())
}

fn check_block(
    stmts: &[Stmt],
    reads_after: &IndexSet<VarName>,
    in_loop: bool,
) -> Result<(), LintError> {
    for (i, stmt) in stmts.iter().enumerate() {
        match stmt {
            Stmt::For(target, iter, body) => {
                ensure_counter_unsubscripted(target)?;

                let mut after = analyze_max(&stmts[i + 1..]).reads;
                after.extend(reads_after.iter().cloned());
                for name in target.names() {
                    if after.contains(name) {
                        return Err(LintError::LoopCounterLeak {
                            name: name.clone(),
                            loc: target.loc,
                        });
                    }
                }

                let body_writes = analyze_max(body).writes;
                for name in target.names() {
                    if body_writes.contains(name) {
                        return Err(LintError::AssignmentToLoopCounter {
                            name: name.clone(),
                            loc: target.loc,
                        });
                    }
                }
                let iter_reads = expr_reads(iter);
                for name in &body_writes {
                    if iter_reads.contains(name) {
                        return Err(LintError::AssignmentToLoopIterator {
                            name: name.clone(),
                            loc: iter.loc,
                        });
                    }
                }

                check_block(body, &after, true)?;
            }
            Stmt::If(_, then_body, else_body) => {
                let mut after = analyze_max(&stmts[i + 1..]).reads;
                after.extend(reads_after.iter().cloned());
                check_block(then_body, &after, in_loop)?;
                check_block(else_body, &after, in_loop)?;
            }
            Stmt::Return(e) => {
                if in_loop {
                    return Err(LintError::ReturnInsideLoop { loc: e.loc });
                }
            }
            Stmt::AnnAssign(target, _, _) | Stmt::AugAssign(target, _, _) => {
                if in_loop {
                    ensure_trivial_subscripts(target)?;
                }
            }
            Stmt::Append(_, receiver, _) => {
                // An append assigns through its receiver, so it is held to
                // the same subscript discipline as any other assignment.
                if in_loop {
                    if let Some(target) = receiver_target(receiver) {
                        ensure_trivial_subscripts(&target)?;
                    }
                }
            }
            Stmt::Assert(_) | Stmt::Expr(_) => {}
        }
    }
    Ok(())
}

fn ensure_counter_unsubscripted(target: &Target) -> Result<(), LintError> {
    match &target.kind {
        TargetKind::Name(_) => Ok(()),
        TargetKind::Subscript(..) => Err(LintError::SubscriptedLoopCounter { loc: target.loc }),
        TargetKind::Tuple(elems) => {
            for t in elems {
                ensure_counter_unsubscripted(t)?;
            }
            Ok(())
        }
    }
}

/// The receiver of an `append` read back as an assignment target, when it
/// has that shape. Receivers with no target shape are rejected by the
/// lowering itself.
fn receiver_target(expr: &Expr) -> Option<Target> {
    let kind = match &expr.kind {
        ExprKind::Name(name) => TargetKind::Name(name.clone()),
        ExprKind::Subscript(base, index) => {
            TargetKind::Subscript(Box::new(receiver_target(base)?), index.clone())
        }
        ExprKind::Tuple(elems) => TargetKind::Tuple(
            elems
                .iter()
                .map(receiver_target)
                .collect::<Option<Vec<_>>>()?,
        ),
        _ => return None,
    };
    Some(Target {
        kind,
        loc: expr.loc,
    })
}

/// A subscript target is trivial when its base is a plain name.
fn ensure_trivial_subscripts(target: &Target) -> Result<(), LintError> {
    match &target.kind {
        TargetKind::Name(_) => Ok(()),
        TargetKind::Subscript(base, _) => match &base.kind {
            TargetKind::Name(_) => Ok(()),
            _ => Err(LintError::NontrivialSubscriptedAssignment { loc: target.loc }),
        },
        TargetKind::Tuple(elems) => {
            for t in elems {
                ensure_trivial_subscripts(t)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purelift_core::source::{Builtin, Expr, Type};

    fn solve_with(body: Vec<Stmt>) -> Program {
        Program {
            stmts: vec![ToplevelStmt::FunctionDef {
                name: VarName::new("solve"),
                args: vec![(VarName::new("n"), Type::Int)],
                ret: Type::Int,
                body,
            }],
        }
    }

    fn range_n() -> Expr {
        Expr::call(Expr::builtin(Builtin::Range1), vec![Expr::name("n")])
    }

    #[test]
    fn accepts_a_plain_counting_loop() {
        let prog = solve_with(vec![
            Stmt::AnnAssign(Target::name("a"), Type::Int, Expr::int(0)),
            Stmt::For(
                Target::name("i"),
                range_n(),
                vec![Stmt::AugAssign(
                    Target::name("a"),
                    purelift_core::source::Operator::Add,
                    Expr::name("i"),
                )],
            ),
            Stmt::Return(Expr::name("a")),
        ]);
        assert_eq!(check_preconditions(&prog), Ok(()));
    }

    #[test]
    fn rejects_subscripted_counter() {
        let prog = solve_with(vec![Stmt::For(
            Target::subscript(Target::name("xs"), Expr::int(0)),
            range_n(),
            vec![],
        )]);
        assert!(matches!(
            check_preconditions(&prog),
            Err(LintError::SubscriptedLoopCounter { .. })
        ));
    }

    #[test]
    fn rejects_counter_leak() {
        let prog = solve_with(vec![
            Stmt::For(Target::name("i"), range_n(), vec![]),
            Stmt::Return(Expr::name("i")),
        ]);
        assert!(matches!(
            check_preconditions(&prog),
            Err(LintError::LoopCounterLeak { name, .. }) if name == VarName::new("i")
        ));
    }

    #[test]
    fn rejects_assignment_to_counter() {
        let prog = solve_with(vec![
            Stmt::For(
                Target::name("i"),
                range_n(),
                vec![Stmt::AnnAssign(Target::name("i"), Type::Int, Expr::int(0))],
            ),
            Stmt::Return(Expr::int(0)),
        ]);
        assert!(matches!(
            check_preconditions(&prog),
            Err(LintError::AssignmentToLoopCounter { .. })
        ));
    }

    #[test]
    fn rejects_assignment_to_iterator() {
        let prog = solve_with(vec![
            Stmt::For(
                Target::name("i"),
                Expr::name("xs"),
                vec![Stmt::AnnAssign(
                    Target::name("xs"),
                    Type::List(Box::new(Type::Int)),
                    Expr::list(Type::Int, vec![]),
                )],
            ),
            Stmt::Return(Expr::int(0)),
        ]);
        assert!(matches!(
            check_preconditions(&prog),
            Err(LintError::AssignmentToLoopIterator { .. })
        ));
    }

    #[test]
    fn rejects_return_inside_loop_even_under_if() {
        let prog = solve_with(vec![
            Stmt::For(
                Target::name("i"),
                range_n(),
                vec![Stmt::If(
                    Expr::name("p"),
                    vec![Stmt::Return(Expr::int(1))],
                    vec![],
                )],
            ),
            Stmt::Return(Expr::int(0)),
        ]);
        assert!(matches!(
            check_preconditions(&prog),
            Err(LintError::ReturnInsideLoop { .. })
        ));
    }

    #[test]
    fn rejects_nested_subscript_assignment_in_loop() {
        let prog = solve_with(vec![
            Stmt::For(
                Target::name("i"),
                range_n(),
                vec![Stmt::AnnAssign(
                    Target::subscript(
                        Target::subscript(Target::name("grid"), Expr::name("i")),
                        Expr::int(0),
                    ),
                    Type::Int,
                    Expr::int(1),
                )],
            ),
            Stmt::Return(Expr::int(0)),
        ]);
        assert!(matches!(
            check_preconditions(&prog),
            Err(LintError::NontrivialSubscriptedAssignment { .. })
        ));
    }

    #[test]
    fn rejects_nested_subscript_append_in_loop() {
        let prog = solve_with(vec![
            Stmt::For(
                Target::name("i"),
                range_n(),
                vec![Stmt::Append(
                    Type::Int,
                    Expr::subscript(
                        Expr::subscript(Expr::name("grid"), Expr::name("i")),
                        Expr::int(0),
                    ),
                    Expr::int(1),
                )],
            ),
            Stmt::Return(Expr::int(0)),
        ]);
        assert!(matches!(
            check_preconditions(&prog),
            Err(LintError::NontrivialSubscriptedAssignment { .. })
        ));
    }

    #[test]
    fn append_through_a_plain_name_in_loop_is_fine() {
        let prog = solve_with(vec![
            Stmt::For(
                Target::name("i"),
                range_n(),
                vec![Stmt::Append(
                    Type::Int,
                    Expr::subscript(Expr::name("rows"), Expr::name("i")),
                    Expr::int(1),
                )],
            ),
            Stmt::Return(Expr::int(0)),
        ]);
        assert_eq!(check_preconditions(&prog), Ok(()));
    }

    #[test]
    fn single_level_subscript_assignment_in_loop_is_fine() {
        let prog = solve_with(vec![
            Stmt::For(
                Target::name("i"),
                range_n(),
                vec![Stmt::AnnAssign(
                    Target::subscript(Target::name("xs"), Expr::name("i")),
                    Type::Int,
                    Expr::int(1),
                )],
            ),
            Stmt::Return(Expr::int(0)),
        ]);
        assert_eq!(check_preconditions(&prog), Ok(()));
    }
}
