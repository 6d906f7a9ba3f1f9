//! Read/write analysis over Source statement lists.
//!
//! Two flavors, used asymmetrically by the lowering:
//! - [`analyze_max`] is a may-analysis: every name possibly read / possibly
//!   written on some path. For-loops carry every variable that *might* be
//!   updated, so their protocol consults the max write set.
//! - [`analyze_min`] is a must-analysis: names certainly written on every
//!   path. An if-join only threads variables guaranteed to be defined on
//!   both sides, so its protocol consults the min write sets.
//!
//! Sets are insertion-ordered and duplicate-free ([`IndexSet`]), which pins
//! the iteration order the lowering needs for deterministic output. Reads
//! are collected syntactically; names bound by lambdas and comprehension
//! targets are included, which only ever over-approximates.

use indexmap::IndexSet;
use purelift_core::name::VarName;
use purelift_core::source::{Expr, ExprKind, Stmt, Target, TargetKind};

/// Read and write sets of a statement region, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub reads: IndexSet<VarName>,
    pub writes: IndexSet<VarName>,
}

/// May-analysis: all names possibly read / possibly written.
pub fn analyze_max(stmts: &[Stmt]) -> Analysis {
    let mut out = Analysis::default();
    for stmt in stmts {
        max_stmt(stmt, &mut out);
    }
    out
}

/// Must-analysis: names certainly read / certainly written on every path.
pub fn analyze_min(stmts: &[Stmt]) -> Analysis {
    let mut out = Analysis::default();
    for stmt in stmts {
        min_stmt(stmt, &mut out);
    }
    out
}

/// True when every path through `stmts` ends in a `return`.
pub fn does_always_return(stmts: &[Stmt]) -> bool {
    stmts.iter().any(stmt_always_returns)
}

fn stmt_always_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::If(_, then_body, else_body) => {
            does_always_return(then_body) && does_always_return(else_body)
        }
        _ => false,
    }
}

/// All names read by an expression, in first-occurrence order.
pub fn expr_reads(expr: &Expr) -> IndexSet<VarName> {
    let mut out = IndexSet::new();
    collect_expr_reads(expr, &mut out);
    out
}

fn collect_expr_reads(expr: &Expr, out: &mut IndexSet<VarName>) {
    match &expr.kind {
        ExprKind::Name(x) => {
            out.insert(x.clone());
        }
        ExprKind::Constant(_) => {}
        ExprKind::BoolOp(lhs, _, rhs)
        | ExprKind::BinOp(lhs, _, rhs)
        | ExprKind::Compare(lhs, _, rhs) => {
            collect_expr_reads(lhs, out);
            collect_expr_reads(rhs, out);
        }
        ExprKind::UnaryOp(_, operand) | ExprKind::Starred(operand) => {
            collect_expr_reads(operand, out);
        }
        ExprKind::Lambda(_, body) => collect_expr_reads(body, out),
        ExprKind::IfExp(cond, then_expr, else_expr) => {
            collect_expr_reads(cond, out);
            collect_expr_reads(then_expr, out);
            collect_expr_reads(else_expr, out);
        }
        ExprKind::ListComp(head, comp) => {
            collect_expr_reads(&comp.iter, out);
            collect_target_index_reads(&comp.target, out);
            if let Some(pred) = &comp.pred {
                collect_expr_reads(pred, out);
            }
            collect_expr_reads(head, out);
        }
        ExprKind::Call(func, args) => {
            collect_expr_reads(func, out);
            for arg in args {
                collect_expr_reads(arg, out);
            }
        }
        ExprKind::Attribute(value, _) => collect_expr_reads(value, out),
        ExprKind::Subscript(value, index) => {
            collect_expr_reads(value, out);
            collect_expr_reads(index, out);
        }
        ExprKind::SubscriptSlice(value, lo, hi, step) => {
            collect_expr_reads(value, out);
            for part in [lo, hi, step].into_iter().flatten() {
                collect_expr_reads(part, out);
            }
        }
        ExprKind::List(_, elems) | ExprKind::Tuple(elems) => {
            for elem in elems {
                collect_expr_reads(elem, out);
            }
        }
    }
}

/// Subscript indices inside a target are reads even though the target as a
/// whole is a write position.
fn collect_target_index_reads(target: &Target, out: &mut IndexSet<VarName>) {
    match &target.kind {
        TargetKind::Name(_) => {}
        TargetKind::Subscript(base, index) => {
            collect_target_index_reads(base, out);
            collect_expr_reads(index, out);
        }
        TargetKind::Tuple(elems) => {
            for t in elems {
                collect_target_index_reads(t, out);
            }
        }
    }
}

fn collect_target_writes(target: &Target, out: &mut IndexSet<VarName>) {
    for name in target.names() {
        out.insert(name.clone());
    }
}

/// The root name a `xs.append(e)` receiver assigns through, if any.
pub fn append_base(expr: &Expr) -> Option<&VarName> {
    match &expr.kind {
        ExprKind::Name(x) => Some(x),
        ExprKind::Subscript(base, _) => append_base(base),
        _ => None,
    }
}

fn max_stmt(stmt: &Stmt, out: &mut Analysis) {
    match stmt {
        Stmt::Return(e) | Stmt::Assert(e) | Stmt::Expr(e) => {
            collect_expr_reads(e, &mut out.reads);
        }
        Stmt::AnnAssign(target, _, value) => {
            collect_expr_reads(value, &mut out.reads);
            collect_target_index_reads(target, &mut out.reads);
            collect_target_writes(target, &mut out.writes);
        }
        Stmt::AugAssign(target, _, value) => {
            // The old value is read before the operator is applied.
            for name in target.names() {
                out.reads.insert(name.clone());
            }
            collect_target_index_reads(target, &mut out.reads);
            collect_expr_reads(value, &mut out.reads);
            collect_target_writes(target, &mut out.writes);
        }
        Stmt::For(target, iter, body) => {
            collect_expr_reads(iter, &mut out.reads);
            collect_target_index_reads(target, &mut out.reads);
            collect_target_writes(target, &mut out.writes);
            let inner = analyze_max(body);
            out.reads.extend(inner.reads);
            out.writes.extend(inner.writes);
        }
        Stmt::If(cond, then_body, else_body) => {
            collect_expr_reads(cond, &mut out.reads);
            let then_a = analyze_max(then_body);
            let else_a = analyze_max(else_body);
            out.reads.extend(then_a.reads);
            out.reads.extend(else_a.reads);
            out.writes.extend(then_a.writes);
            out.writes.extend(else_a.writes);
        }
        Stmt::Append(_, receiver, value) => {
            collect_expr_reads(receiver, &mut out.reads);
            collect_expr_reads(value, &mut out.reads);
            if let Some(name) = append_base(receiver) {
                out.writes.insert(name.clone());
            }
        }
    }
}

fn min_stmt(stmt: &Stmt, out: &mut Analysis) {
    match stmt {
        Stmt::Return(e) | Stmt::Assert(e) | Stmt::Expr(e) => {
            collect_expr_reads(e, &mut out.reads);
        }
        Stmt::AnnAssign(..) | Stmt::AugAssign(..) | Stmt::Append(..) => {
            // Unconditional statements write on every path; reuse the
            // may-analysis for their single behavior.
            max_stmt(stmt, out);
        }
        Stmt::For(_, iter, _) => {
            // The body may run zero times, so only the iterator is certain.
            collect_expr_reads(iter, &mut out.reads);
        }
        Stmt::If(cond, then_body, else_body) => {
            collect_expr_reads(cond, &mut out.reads);
            let then_a = analyze_min(then_body);
            let else_a = analyze_min(else_body);
            for name in &then_a.reads {
                if else_a.reads.contains(name) {
                    out.reads.insert(name.clone());
                }
            }
            for name in &then_a.writes {
                if else_a.writes.contains(name) {
                    out.writes.insert(name.clone());
                }
            }
        }
    }
}
