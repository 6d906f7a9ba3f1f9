//! Threading assignment targets into Core bindings.
//!
//! An imperative assignment flattens into a prefix of `let` bindings that
//! get wrapped around whatever continuation follows. Name targets bind
//! directly (at a fresh type hole), subscript targets become functional
//! updates threaded up to their base name, and tuple targets bind the value
//! once and project each component. The value expression always ends up in
//! exactly one binding, so it is evaluated at most once.

use purelift_core::core::{self, Builtin};
use purelift_core::name::VarName;
use purelift_core::source::{self, ExprKind, Target, TargetKind};

use crate::error::LowerError;
use crate::Lowerer;

/// One pending `let`: name, annotated type, bound value.
pub(crate) type Binding = (VarName, core::Type, core::Expr);

/// Wraps a binding prefix around a continuation, first binding outermost.
pub(crate) fn wrap_lets(bindings: Vec<Binding>, body: core::Expr) -> core::Expr {
    bindings
        .into_iter()
        .rev()
        .fold(body, |acc, (name, ty, value)| {
            core::Expr::let_(name, ty, value, acc)
        })
}

/// Reads a target back as a Source expression (the "old value" of an
/// augmented or subscripted assignment).
pub(crate) fn target_to_expr(target: &Target) -> source::Expr {
    let kind = match &target.kind {
        TargetKind::Name(name) => ExprKind::Name(name.clone()),
        TargetKind::Subscript(base, index) => {
            ExprKind::Subscript(Box::new(target_to_expr(base)), index.clone())
        }
        TargetKind::Tuple(elems) => {
            ExprKind::Tuple(elems.iter().map(target_to_expr).collect())
        }
    };
    source::Expr {
        kind,
        loc: target.loc,
    }
}

/// Interprets an expression as an assignment target, when it has that shape.
pub(crate) fn expr_to_target(expr: &source::Expr) -> Option<Target> {
    let kind = match &expr.kind {
        ExprKind::Name(name) => TargetKind::Name(name.clone()),
        ExprKind::Subscript(base, index) => {
            TargetKind::Subscript(Box::new(expr_to_target(base)?), index.clone())
        }
        ExprKind::Tuple(elems) => TargetKind::Tuple(
            elems
                .iter()
                .map(expr_to_target)
                .collect::<Option<Vec<_>>>()?,
        ),
        _ => return None,
    };
    Some(Target {
        kind,
        loc: expr.loc,
    })
}

impl Lowerer {
    /// Flattens `target = value` into a prefix of bindings, appended to
    /// `out` in the order they must be introduced.
    pub(crate) fn assign_bindings(
        &mut self,
        target: &Target,
        value: core::Expr,
        out: &mut Vec<Binding>,
    ) -> Result<(), LowerError> {
        match &target.kind {
            TargetKind::Name(name) => {
                let ty = self.supply.fresh_type();
                out.push((name.clone(), ty, value));
                Ok(())
            }
            TargetKind::Subscript(base, index) => {
                let index = self.lower_expr(index)?;
                let read = self.lower_expr(&target_to_expr(base))?;
                let elem_ty = self.supply.fresh_type();
                let updated = core::Expr::app(
                    core::Expr::builtin(Builtin::SetAt(elem_ty)),
                    vec![read, index, value],
                );
                self.assign_bindings(base, updated, out)
            }
            TargetKind::Tuple(elems) => {
                let bound = self.supply.fresh_var();
                let tys: Vec<core::Type> =
                    elems.iter().map(|_| self.supply.fresh_type()).collect();
                out.push((bound.clone(), core::Type::Tuple(tys.clone()), value));
                for (i, elem) in elems.iter().enumerate() {
                    let component = core::Expr::app(
                        core::Expr::builtin(Builtin::Proj(tys.clone(), i)),
                        vec![core::Expr::Var(bound.clone())],
                    );
                    self.assign_bindings(elem, component, out)?;
                }
                Ok(())
            }
        }
    }
}
