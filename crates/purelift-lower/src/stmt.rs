//! Lowering of statement lists into single Core expressions.
//!
//! Statements are consumed continuation-style: each head statement wraps
//! the lowering of its tail. The two interesting cases are loops and
//! branches, where imperative re-assignment has to become explicit data
//! flow:
//!
//! - A `for` becomes a `foldl` whose accumulator is the tuple of variables
//!   the body *might* write and that were live before the loop
//!   (may-analysis), with unpack/repack prologues on both sides.
//! - An `if` whose branches fall through becomes a tuple-valued conditional
//!   carrying the variables *certainly* written by a branch
//!   (must-analysis) and read afterwards; branches that always return stay
//!   tight and keep the continuation out of the join.
//!
//! `conts` carries the statement suffixes of every enclosing block, so the
//! read-after analysis can see past the end of the current block.

use indexmap::IndexSet;
use purelift_check::vars::{analyze_max, analyze_min, does_always_return};
use purelift_core::core::{self, Builtin};
use purelift_core::name::VarName;
use purelift_core::source::{self, Stmt, Target};

use crate::assign::{expr_to_target, target_to_expr, wrap_lets};
use crate::error::LowerError;
use crate::expr::lower_operator;
use crate::ty::lower_type;
use crate::Lowerer;

/// `let name_i = proj_i from in ...` for each carried name, outermost first.
fn unpack_tuple(
    names: &[VarName],
    tys: &[core::Type],
    from: &VarName,
    body: core::Expr,
) -> core::Expr {
    names
        .iter()
        .enumerate()
        .rev()
        .fold(body, |acc, (i, name)| {
            core::Expr::let_(
                name.clone(),
                tys[i].clone(),
                core::Expr::app(
                    core::Expr::builtin(Builtin::Proj(tys.to_vec(), i)),
                    vec![core::Expr::Var(from.clone())],
                ),
                acc,
            )
        })
}

/// The synthetic `return (names...)` appended to loop bodies and joined
/// branches.
fn synthetic_tuple_return(names: &[VarName]) -> Stmt {
    Stmt::Return(source::Expr::tuple(
        names.iter().map(|n| source::Expr::name(n.clone())).collect(),
    ))
}

impl Lowerer {
    pub(crate) fn lower_statements(
        &mut self,
        stmts: &[Stmt],
        conts: &[&[Stmt]],
    ) -> Result<core::Expr, LowerError> {
        let Some((head, tail)) = stmts.split_first() else {
            return Err(LowerError::semantic("function may not return", None));
        };
        match head {
            Stmt::Return(value) => self.lower_expr(value),
            Stmt::AnnAssign(target, ty, value) => {
                // The binding itself uses a fresh hole; translating the
                // annotation still rejects banned types wherever they occur.
                lower_type(ty, value.loc)?;
                let value = self.lower_expr(value)?;
                self.scoped(|s| {
                    let mut binds = Vec::new();
                    s.assign_bindings(target, value, &mut binds)?;
                    for name in target.names() {
                        s.env.define(name);
                    }
                    let rest = s.lower_statements(tail, conts)?;
                    Ok(wrap_lets(binds, rest))
                })
            }
            Stmt::AugAssign(target, op, value) => {
                let read = self.lower_expr(&target_to_expr(target))?;
                let func = lower_operator(*op, target.loc)?;
                let value = self.lower_expr(value)?;
                let combined = core::Expr::app(func, vec![read, value]);
                let mut binds = Vec::new();
                self.assign_bindings(target, combined, &mut binds)?;
                let rest = self.lower_statements(tail, conts)?;
                Ok(wrap_lets(binds, rest))
            }
            Stmt::For(target, iter, body) => self.lower_for(target, iter, body, tail, conts),
            Stmt::If(cond, then_body, else_body) => {
                self.lower_if(cond, then_body, else_body, tail, conts)
            }
            // TODO: keep asserts as optimization hints instead of dropping them.
            Stmt::Assert(_) => self.lower_statements(tail, conts),
            Stmt::Append(elem_ty, receiver, value) => {
                let elem_ty = lower_type(elem_ty, receiver.loc)?;
                let target = expr_to_target(receiver).ok_or_else(|| {
                    LowerError::semantic("invalid `append` target", receiver.loc)
                })?;
                let read = self.lower_expr(receiver)?;
                let value = self.lower_expr(value)?;
                let appended = core::Expr::app(
                    core::Expr::builtin(Builtin::Snoc(elem_ty)),
                    vec![read, value],
                );
                let mut binds = Vec::new();
                self.assign_bindings(&target, appended, &mut binds)?;
                let rest = self.lower_statements(tail, conts)?;
                Ok(wrap_lets(binds, rest))
            }
            Stmt::Expr(value) => Err(LowerError::semantic(
                "expression statements are not allowed",
                value.loc,
            )),
        }
    }

    /// The for-loop protocol: fold over the iterator, threading the tuple
    /// of live written variables.
    fn lower_for(
        &mut self,
        target: &Target,
        iter: &source::Expr,
        body: &[Stmt],
        tail: &[Stmt],
        conts: &[&[Stmt]],
    ) -> Result<core::Expr, LowerError> {
        let iter = self.lower_expr(iter)?;
        let elem_ty = self.supply.fresh_type();

        // Loop-carried variables: possibly written by the body, already live.
        let carried: Vec<VarName> = analyze_max(body)
            .writes
            .into_iter()
            .filter(|name| self.env.is_defined(name))
            .collect();
        let tys: Vec<core::Type> = carried.iter().map(|_| self.supply.fresh_type()).collect();
        let init = core::Expr::app(
            core::Expr::builtin(Builtin::Tuple(tys.clone())),
            carried.iter().map(|name| core::Expr::Var(name.clone())).collect(),
        );

        let acc = self.supply.fresh_var();
        let counter = self.supply.fresh_var();

        let mut loop_body = body.to_vec();
        loop_body.push(synthetic_tuple_return(&carried));
        let step_body = self.scoped(|s| {
            let mut binds = Vec::new();
            s.assign_bindings(target, core::Expr::Var(counter.clone()), &mut binds)?;
            for name in target.names() {
                s.env.define(name);
            }
            let lowered = s.lower_statements(&loop_body, &[])?;
            Ok(wrap_lets(binds, lowered))
        })?;
        let step = core::Expr::lam(
            vec![
                (acc.clone(), core::Type::Tuple(tys.clone())),
                (counter, elem_ty.clone()),
            ],
            unpack_tuple(&carried, &tys, &acc, step_body),
        );

        let fold = core::Expr::app(
            core::Expr::builtin(Builtin::Foldl(elem_ty, core::Type::Tuple(tys.clone()))),
            vec![step, init, iter],
        );
        let result = self.supply.fresh_var();
        let rest = self.lower_statements(tail, conts)?;
        Ok(core::Expr::let_(
            result.clone(),
            core::Type::Tuple(tys.clone()),
            fold,
            unpack_tuple(&carried, &tys, &result, rest),
        ))
    }

    /// The if-statement protocol: four cases by which branches always
    /// return.
    fn lower_if(
        &mut self,
        cond: &source::Expr,
        then_body: &[Stmt],
        else_body: &[Stmt],
        tail: &[Stmt],
        conts: &[&[Stmt]],
    ) -> Result<core::Expr, LowerError> {
        let cond = self.lower_expr(cond)?;

        // Names certainly written by a branch and read after the if.
        let then_writes = analyze_min(then_body).writes;
        let else_writes = analyze_min(else_body).writes;
        let mut read_after = analyze_max(tail).reads;
        for block in conts {
            read_after.extend(analyze_max(block).reads);
        }
        let mut joined: IndexSet<VarName> = IndexSet::new();
        for name in then_writes.iter().chain(else_writes.iter()) {
            if read_after.contains(name) {
                joined.insert(name.clone());
            }
        }
        let joined: Vec<VarName> = joined.into_iter().collect();

        let mut pending: Vec<&[Stmt]> = Vec::with_capacity(conts.len() + 1);
        pending.push(tail);
        pending.extend_from_slice(conts);

        match (does_always_return(then_body), does_always_return(else_body)) {
            // Both branches return: the continuation is dead.
            (true, true) => {
                let result_ty = self.supply.fresh_type();
                let then_e = self.scoped(|s| s.lower_statements(then_body, &pending))?;
                let else_e = self.scoped(|s| s.lower_statements(else_body, &pending))?;
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::If(result_ty)),
                    vec![cond, then_e, else_e],
                ))
            }
            // Only the then-branch returns: the else-branch absorbs the
            // continuation.
            (true, false) => {
                let result_ty = self.supply.fresh_type();
                let then_e = self.scoped(|s| s.lower_statements(then_body, &pending))?;
                let else_stmts: Vec<Stmt> =
                    else_body.iter().cloned().chain(tail.iter().cloned()).collect();
                let else_e = self.scoped(|s| s.lower_statements(&else_stmts, conts))?;
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::If(result_ty)),
                    vec![cond, then_e, else_e],
                ))
            }
            (false, true) => {
                let result_ty = self.supply.fresh_type();
                let then_stmts: Vec<Stmt> =
                    then_body.iter().cloned().chain(tail.iter().cloned()).collect();
                let then_e = self.scoped(|s| s.lower_statements(&then_stmts, conts))?;
                let else_e = self.scoped(|s| s.lower_statements(else_body, &pending))?;
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::If(result_ty)),
                    vec![cond, then_e, else_e],
                ))
            }
            // Neither returns: join through a tuple-valued conditional.
            (false, false) => {
                let tys: Vec<core::Type> =
                    joined.iter().map(|_| self.supply.fresh_type()).collect();
                let mut then_stmts = then_body.to_vec();
                then_stmts.push(synthetic_tuple_return(&joined));
                let mut else_stmts = else_body.to_vec();
                else_stmts.push(synthetic_tuple_return(&joined));
                let then_e = self.scoped(|s| s.lower_statements(&then_stmts, &pending))?;
                let else_e = self.scoped(|s| s.lower_statements(&else_stmts, &pending))?;
                let branch = core::Expr::app(
                    core::Expr::builtin(Builtin::If(core::Type::Tuple(tys.clone()))),
                    vec![cond, then_e, else_e],
                );
                let bound = self.supply.fresh_var();
                for name in &joined {
                    self.env.define(name);
                }
                let rest = self.lower_statements(tail, conts)?;
                Ok(core::Expr::let_(
                    bound.clone(),
                    core::Type::Tuple(tys.clone()),
                    branch,
                    unpack_tuple(&joined, &tys, &bound, rest),
                ))
            }
        }
    }
}
