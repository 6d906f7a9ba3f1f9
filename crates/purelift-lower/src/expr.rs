//! Lowering of pure Source expressions into Core expressions.
//!
//! Every rule produces a self-contained Core expression; variadic and
//! multi-list builtins desugar into lambda trees so that a builtin constant
//! is a valid Core value even when it is passed around unapplied. Method
//! attributes are resolved at call heads only; a bare attribute is an
//! internal error because upstream name resolution guarantees it cannot
//! survive to this pass.

use purelift_core::core::{self, Builtin};
use purelift_core::loc::Loc;
use purelift_core::name::VarName;
use purelift_core::source::{
    self, Attribute, BoolOp, CmpOp, Comprehension, Constant, ExprKind, Operator, UnaryOp,
};

use crate::error::LowerError;
use crate::ty::lower_type;
use crate::Lowerer;

/// Translates a binary operator into its Core builtin, rejecting the two
/// operators the Core has no semantics for.
pub(crate) fn lower_operator(op: Operator, loc: Option<Loc>) -> Result<core::Expr, LowerError> {
    let builtin = match op {
        Operator::Add => Builtin::Plus,
        Operator::Sub => Builtin::Minus,
        Operator::Mul => Builtin::Mult,
        Operator::FloorDiv => Builtin::FloorDiv,
        Operator::FloorMod => Builtin::FloorMod,
        Operator::CeilDiv => Builtin::CeilDiv,
        Operator::CeilMod => Builtin::CeilMod,
        Operator::Pow => Builtin::Pow,
        Operator::BitAnd => Builtin::BitAnd,
        Operator::BitOr => Builtin::BitOr,
        Operator::BitXor => Builtin::BitXor,
        Operator::BitLeftShift => Builtin::BitLeftShift,
        Operator::BitRightShift => Builtin::BitRightShift,
        Operator::Max => Builtin::Max2(core::Type::Int),
        Operator::Min => Builtin::Min2(core::Type::Int),
        Operator::Div => {
            return Err(LowerError::semantic(
                "true division is not supported; use `//`",
                loc,
            ))
        }
        Operator::MatMul => {
            return Err(LowerError::semantic(
                "matrix multiplication is not supported",
                loc,
            ))
        }
    };
    Ok(core::Expr::builtin(builtin))
}

impl Lowerer {
    pub(crate) fn lower_expr(&mut self, expr: &source::Expr) -> Result<core::Expr, LowerError> {
        let loc = expr.loc;
        match &expr.kind {
            ExprKind::Name(name) => Ok(core::Expr::Var(name.clone())),
            ExprKind::Constant(constant) => self.lower_constant(constant, loc),
            ExprKind::BoolOp(lhs, op, rhs) => {
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                let builtin = match op {
                    BoolOp::And => Builtin::And,
                    BoolOp::Or => Builtin::Or,
                    BoolOp::Implies => Builtin::Implies,
                };
                Ok(core::Expr::app(core::Expr::builtin(builtin), vec![lhs, rhs]))
            }
            ExprKind::BinOp(lhs, op, rhs) => {
                let func = lower_operator(*op, loc)?;
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                Ok(core::Expr::app(func, vec![lhs, rhs]))
            }
            ExprKind::UnaryOp(op, operand) => {
                let operand = self.lower_expr(operand)?;
                Ok(match op {
                    UnaryOp::Invert => {
                        core::Expr::app(core::Expr::builtin(Builtin::BitNot), vec![operand])
                    }
                    UnaryOp::Not => {
                        core::Expr::app(core::Expr::builtin(Builtin::Not), vec![operand])
                    }
                    UnaryOp::Minus => {
                        core::Expr::app(core::Expr::builtin(Builtin::Negate), vec![operand])
                    }
                    // Unary plus becomes an applied identity so it still has
                    // a typing footprint.
                    UnaryOp::Plus => {
                        let x = self.supply.fresh_var();
                        core::Expr::app(
                            core::Expr::lam(
                                vec![(x.clone(), core::Type::Int)],
                                core::Expr::Var(x),
                            ),
                            vec![operand],
                        )
                    }
                })
            }
            ExprKind::Lambda(params, body) => {
                let mut lowered = Vec::with_capacity(params.len());
                for (name, ty) in params {
                    lowered.push((name.clone(), lower_type(ty, loc)?));
                }
                let body = self.scoped(|s| {
                    for (name, _) in params {
                        s.env.define(name);
                    }
                    s.lower_expr(body)
                })?;
                Ok(core::Expr::lam(lowered, body))
            }
            ExprKind::IfExp(cond, then_expr, else_expr) => {
                let result_ty = self.supply.fresh_type();
                let cond = self.lower_expr(cond)?;
                let then_expr = self.lower_expr(then_expr)?;
                let else_expr = self.lower_expr(else_expr)?;
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::If(result_ty)),
                    vec![cond, then_expr, else_expr],
                ))
            }
            ExprKind::ListComp(head, comp) => self.lower_list_comp(head, comp),
            ExprKind::Compare(lhs, op, rhs) => self.lower_compare(lhs, *op, rhs),
            ExprKind::Call(func, args) => {
                if let ExprKind::Attribute(receiver, attr) = &func.kind {
                    return self.lower_method_call(receiver, attr, args, func.loc.or(loc));
                }
                let func = self.lower_expr(func)?;
                let mut lowered = Vec::with_capacity(args.len());
                for arg in args {
                    lowered.push(self.lower_expr(arg)?);
                }
                Ok(core::Expr::app(func, lowered))
            }
            ExprKind::Attribute(_, _) => Err(LowerError::internal(
                "unresolved attribute outside a call position",
            )),
            ExprKind::Subscript(value, index) => {
                let elem_ty = self.supply.fresh_type();
                let value = self.lower_expr(value)?;
                let index = self.lower_expr(index)?;
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::At(elem_ty)),
                    vec![value, index],
                ))
            }
            ExprKind::SubscriptSlice(value, lo, hi, step) => {
                self.lower_slice(value, lo.as_deref(), hi.as_deref(), step.as_deref())
            }
            ExprKind::Starred(_) => Err(LowerError::semantic(
                "starred expression is not allowed here",
                loc,
            )),
            ExprKind::List(elem_ty, elems) => {
                let elem_ty = lower_type(elem_ty, loc)?;
                let lowered = elems
                    .iter()
                    .map(|e| self.lower_expr(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(lowered.into_iter().rev().fold(
                    core::Expr::nil(elem_ty.clone()),
                    |acc, elem| {
                        core::Expr::app(
                            core::Expr::builtin(Builtin::Cons(elem_ty.clone())),
                            vec![elem, acc],
                        )
                    },
                ))
            }
            ExprKind::Tuple(elems) => {
                let mut tys = Vec::with_capacity(elems.len());
                let mut lowered = Vec::with_capacity(elems.len());
                for elem in elems {
                    tys.push(self.supply.fresh_type());
                    lowered.push(self.lower_expr(elem)?);
                }
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::Tuple(tys)),
                    lowered,
                ))
            }
        }
    }

    fn lower_constant(
        &mut self,
        constant: &Constant,
        loc: Option<Loc>,
    ) -> Result<core::Expr, LowerError> {
        match constant {
            Constant::None => Ok(core::Expr::unit()),
            Constant::Int(n) => Ok(core::Expr::int(*n)),
            Constant::Bool(b) => Ok(core::Expr::bool_(*b)),
            Constant::Builtin(builtin) => self.lower_builtin(builtin, loc),
        }
    }

    fn lower_compare(
        &mut self,
        lhs: &source::Expr,
        op: CmpOp,
        rhs: &source::Expr,
    ) -> Result<core::Expr, LowerError> {
        let lhs = self.lower_expr(lhs)?;
        let rhs = self.lower_expr(rhs)?;
        let operand_ty = self.supply.fresh_type();
        let comparator = match op {
            CmpOp::Lt => Builtin::LessThan(operand_ty),
            CmpOp::Le => Builtin::LessEqual(operand_ty),
            CmpOp::Gt => Builtin::GreaterThan(operand_ty),
            CmpOp::Ge => Builtin::GreaterEqual(operand_ty),
            CmpOp::Eq | CmpOp::Is => Builtin::Equal(operand_ty),
            CmpOp::NotEq | CmpOp::IsNot => Builtin::NotEqual(operand_ty),
            CmpOp::In => Builtin::Elem(operand_ty),
            CmpOp::NotIn => {
                let x = self.supply.fresh_var();
                let xs = self.supply.fresh_var();
                let not_elem = core::Expr::lam(
                    vec![
                        (x.clone(), operand_ty.clone()),
                        (xs.clone(), core::Type::list(operand_ty.clone())),
                    ],
                    core::Expr::app(
                        core::Expr::builtin(Builtin::Not),
                        vec![core::Expr::app(
                            core::Expr::builtin(Builtin::Elem(operand_ty)),
                            vec![core::Expr::Var(x), core::Expr::Var(xs)],
                        )],
                    ),
                );
                return Ok(core::Expr::app(not_elem, vec![lhs, rhs]));
            }
        };
        Ok(core::Expr::app(
            core::Expr::builtin(comparator),
            vec![lhs, rhs],
        ))
    }

    /// `e[lo:hi:step]` materializes as a map over the matching range. The
    /// eight presence combinations are spelled out; a missing `lo` defaults
    /// to 0, a missing `hi` to `len e`, and without a step the narrower
    /// range builtin is used.
    fn lower_slice(
        &mut self,
        value: &source::Expr,
        lo: Option<&source::Expr>,
        hi: Option<&source::Expr>,
        step: Option<&source::Expr>,
    ) -> Result<core::Expr, LowerError> {
        let elem_ty = self.supply.fresh_type();
        let value = self.lower_expr(value)?;
        let len = core::Expr::app(
            core::Expr::builtin(Builtin::Len(elem_ty.clone())),
            vec![value.clone()],
        );
        let lo = lo.map(|e| self.lower_expr(e)).transpose()?;
        let hi = hi.map(|e| self.lower_expr(e)).transpose()?;
        let step = step.map(|e| self.lower_expr(e)).transpose()?;
        let indices = match (lo, hi, step) {
            (None, None, None) => {
                core::Expr::app(core::Expr::builtin(Builtin::Range1), vec![len])
            }
            (None, Some(hi), None) => {
                core::Expr::app(core::Expr::builtin(Builtin::Range1), vec![hi])
            }
            (Some(lo), None, None) => {
                core::Expr::app(core::Expr::builtin(Builtin::Range2), vec![lo, len])
            }
            (Some(lo), Some(hi), None) => {
                core::Expr::app(core::Expr::builtin(Builtin::Range2), vec![lo, hi])
            }
            (None, None, Some(step)) => core::Expr::app(
                core::Expr::builtin(Builtin::Range3),
                vec![core::Expr::int(0), len, step],
            ),
            (None, Some(hi), Some(step)) => core::Expr::app(
                core::Expr::builtin(Builtin::Range3),
                vec![core::Expr::int(0), hi, step],
            ),
            (Some(lo), None, Some(step)) => core::Expr::app(
                core::Expr::builtin(Builtin::Range3),
                vec![lo, len, step],
            ),
            (Some(lo), Some(hi), Some(step)) => core::Expr::app(
                core::Expr::builtin(Builtin::Range3),
                vec![lo, hi, step],
            ),
        };
        let index = self.supply.fresh_var();
        let pick = core::Expr::lam(
            vec![(index.clone(), core::Type::Int)],
            core::Expr::app(
                core::Expr::builtin(Builtin::At(elem_ty.clone())),
                vec![value, core::Expr::Var(index)],
            ),
        );
        Ok(core::Expr::app(
            core::Expr::builtin(Builtin::Map(core::Type::Int, elem_ty)),
            vec![pick, indices],
        ))
    }

    /// `[head for target in iter if pred]` becomes
    /// `map (λy. head[target:=y]) (filter (λy. pred[target:=y]) iter)`,
    /// with the filter layer omitted when there is no predicate.
    fn lower_list_comp(
        &mut self,
        head: &source::Expr,
        comp: &Comprehension,
    ) -> Result<core::Expr, LowerError> {
        let iter = self.lower_expr(&comp.iter)?;
        let elem_ty = self.supply.fresh_type();
        let y = self.supply.fresh_var();
        let source_iter = match &comp.pred {
            Some(pred) => {
                let pred_body = self.scoped(|s| {
                    let mut binds = Vec::new();
                    s.assign_bindings(&comp.target, core::Expr::Var(y.clone()), &mut binds)?;
                    for name in comp.target.names() {
                        s.env.define(name);
                    }
                    let lowered = s.lower_expr(pred)?;
                    Ok(crate::assign::wrap_lets(binds, lowered))
                })?;
                core::Expr::app(
                    core::Expr::builtin(Builtin::Filter(elem_ty.clone())),
                    vec![
                        core::Expr::lam(vec![(y.clone(), elem_ty.clone())], pred_body),
                        iter,
                    ],
                )
            }
            None => iter,
        };
        let result_ty = self.supply.fresh_type();
        let head_body = self.scoped(|s| {
            let mut binds = Vec::new();
            s.assign_bindings(&comp.target, core::Expr::Var(y.clone()), &mut binds)?;
            for name in comp.target.names() {
                s.env.define(name);
            }
            let lowered = s.lower_expr(head)?;
            Ok(crate::assign::wrap_lets(binds, lowered))
        })?;
        Ok(core::Expr::app(
            core::Expr::builtin(Builtin::Map(elem_ty.clone(), result_ty)),
            vec![
                core::Expr::lam(vec![(y, elem_ty)], head_body),
                source_iter,
            ],
        ))
    }

    fn lower_method_call(
        &mut self,
        receiver: &source::Expr,
        attr: &Attribute,
        args: &[source::Expr],
        loc: Option<Loc>,
    ) -> Result<core::Expr, LowerError> {
        match attr {
            Attribute::Count(elem_ty) => {
                let [needle] = args else {
                    return Err(LowerError::type_error(
                        "`count` takes exactly one argument",
                        loc,
                    ));
                };
                let elem_ty = lower_type(elem_ty, loc)?;
                let receiver = self.lower_expr(receiver)?;
                let needle = self.lower_expr(needle)?;
                let y = self.supply.fresh_var();
                let matches = core::Expr::lam(
                    vec![(y.clone(), elem_ty.clone())],
                    core::Expr::app(
                        core::Expr::builtin(Builtin::Equal(elem_ty.clone())),
                        vec![needle, core::Expr::Var(y)],
                    ),
                );
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::Len(elem_ty.clone())),
                    vec![core::Expr::app(
                        core::Expr::builtin(Builtin::Filter(elem_ty)),
                        vec![matches, receiver],
                    )],
                ))
            }
            Attribute::Index(elem_ty) => {
                let [needle] = args else {
                    return Err(LowerError::type_error(
                        "`index` takes exactly one argument",
                        loc,
                    ));
                };
                let elem_ty = lower_type(elem_ty, loc)?;
                let receiver = self.lower_expr(receiver)?;
                let needle = self.lower_expr(needle)?;
                let i = self.supply.fresh_var();
                let hits = core::Expr::app(
                    core::Expr::builtin(Builtin::Filter(core::Type::Int)),
                    vec![
                        core::Expr::lam(
                            vec![(i.clone(), core::Type::Int)],
                            core::Expr::app(
                                core::Expr::builtin(Builtin::Equal(elem_ty.clone())),
                                vec![
                                    core::Expr::app(
                                        core::Expr::builtin(Builtin::At(elem_ty.clone())),
                                        vec![receiver.clone(), core::Expr::Var(i)],
                                    ),
                                    needle,
                                ],
                            ),
                        ),
                        core::Expr::app(
                            core::Expr::builtin(Builtin::Range1),
                            vec![core::Expr::app(
                                core::Expr::builtin(Builtin::Len(elem_ty)),
                                vec![receiver],
                            )],
                        ),
                    ],
                );
                Ok(core::Expr::app(
                    core::Expr::builtin(Builtin::Min1(core::Type::Int)),
                    vec![hits],
                ))
            }
            Attribute::Copy(_) => {
                if !args.is_empty() {
                    return Err(LowerError::type_error("`copy` takes no arguments", loc));
                }
                // Values are immutable in Core, so a copy is the value itself.
                self.lower_expr(receiver)
            }
            Attribute::Append(_) => Err(LowerError::semantic(
                "`append` must be used as a statement",
                loc,
            )),
            Attribute::Split => Err(LowerError::semantic(
                "cannot use `split` outside main",
                loc,
            )),
        }
    }

    fn lower_builtin(
        &mut self,
        builtin: &source::Builtin,
        loc: Option<Loc>,
    ) -> Result<core::Expr, LowerError> {
        use source::Builtin as SB;
        let direct = |b: Builtin| Ok(core::Expr::builtin(b));
        match builtin {
            SB::Abs => direct(Builtin::Abs),
            SB::Pow => direct(Builtin::Pow),
            SB::ModPow => direct(Builtin::ModPow),
            SB::ModInv => direct(Builtin::ModInv),
            SB::Gcd => direct(Builtin::Gcd),
            SB::Lcm => direct(Builtin::Lcm),
            SB::Fact => direct(Builtin::Fact),
            SB::Choose => direct(Builtin::Choose),
            SB::Permute => direct(Builtin::Permute),
            SB::MultiChoose => direct(Builtin::MultiChoose),
            SB::All => direct(Builtin::All),
            SB::Any => direct(Builtin::Any),
            SB::Sum => direct(Builtin::Sum),
            SB::Product => direct(Builtin::Product),
            SB::Range1 => direct(Builtin::Range1),
            SB::Range2 => direct(Builtin::Range2),
            SB::Range3 => direct(Builtin::Range3),
            SB::Len(t) => direct(Builtin::Len(lower_type(t, loc)?)),
            SB::Filter(t) => direct(Builtin::Filter(lower_type(t, loc)?)),
            SB::Sorted(t) => direct(Builtin::Sorted(lower_type(t, loc)?)),
            SB::Reversed(t) => direct(Builtin::Reversed(lower_type(t, loc)?)),
            SB::ArgMax(t) => direct(Builtin::ArgMax(lower_type(t, loc)?)),
            SB::ArgMin(t) => direct(Builtin::ArgMin(lower_type(t, loc)?)),
            SB::DivMod => {
                let a = self.supply.fresh_var();
                let b = self.supply.fresh_var();
                let pair = vec![core::Type::Int, core::Type::Int];
                Ok(core::Expr::lam(
                    vec![
                        (a.clone(), core::Type::Int),
                        (b.clone(), core::Type::Int),
                    ],
                    core::Expr::app(
                        core::Expr::builtin(Builtin::Tuple(pair)),
                        vec![
                            core::Expr::app(
                                core::Expr::builtin(Builtin::FloorDiv),
                                vec![core::Expr::Var(a.clone()), core::Expr::Var(b.clone())],
                            ),
                            core::Expr::app(
                                core::Expr::builtin(Builtin::FloorMod),
                                vec![core::Expr::Var(a), core::Expr::Var(b)],
                            ),
                        ],
                    ),
                ))
            }
            SB::Int(t) => match t {
                source::Type::Int => Ok(self.identity_lam(core::Type::Int)),
                source::Type::Bool => {
                    let x = self.supply.fresh_var();
                    Ok(core::Expr::lam(
                        vec![(x.clone(), core::Type::Bool)],
                        core::Expr::app(
                            core::Expr::builtin(Builtin::If(core::Type::Int)),
                            vec![core::Expr::Var(x), core::Expr::int(1), core::Expr::int(0)],
                        ),
                    ))
                }
                _ => Err(LowerError::type_error(
                    "`int` expects an int or bool argument",
                    loc,
                )),
            },
            SB::Bool(t) => match t {
                source::Type::Bool => Ok(self.identity_lam(core::Type::Bool)),
                source::Type::Int => {
                    let x = self.supply.fresh_var();
                    Ok(core::Expr::lam(
                        vec![(x.clone(), core::Type::Int)],
                        core::Expr::app(
                            core::Expr::builtin(Builtin::NotEqual(core::Type::Int)),
                            vec![core::Expr::Var(x), core::Expr::int(0)],
                        ),
                    ))
                }
                source::Type::List(elem) => {
                    let elem = lower_type(elem, loc)?;
                    let xs = self.supply.fresh_var();
                    Ok(core::Expr::lam(
                        vec![(xs.clone(), core::Type::list(elem.clone()))],
                        core::Expr::app(
                            core::Expr::builtin(Builtin::NotEqual(core::Type::Int)),
                            vec![
                                core::Expr::app(
                                    core::Expr::builtin(Builtin::Len(elem)),
                                    vec![core::Expr::Var(xs)],
                                ),
                                core::Expr::int(0),
                            ],
                        ),
                    ))
                }
                _ => Err(LowerError::type_error(
                    "`bool` expects a bool, int, or list argument",
                    loc,
                )),
            },
            SB::List(t) => {
                let elem = lower_type(t, loc)?;
                Ok(self.identity_lam(core::Type::list(elem)))
            }
            SB::Tuple(ts) => {
                let tys = ts
                    .iter()
                    .map(|t| lower_type(t, loc))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.identity_lam(core::Type::Tuple(tys)))
            }
            SB::Map(arg_tys, result_ty) => {
                let tys = arg_tys
                    .iter()
                    .map(|t| lower_type(t, loc))
                    .collect::<Result<Vec<_>, _>>()?;
                let result_ty = lower_type(result_ty, loc)?;
                match tys.len() {
                    0 => Err(LowerError::type_error("`map` expects at least one list", loc)),
                    1 => direct(Builtin::Map(tys.into_iter().next().unwrap(), result_ty)),
                    _ => Ok(self.lower_multi_map(tys, result_ty)),
                }
            }
            SB::Zip(arg_tys) => {
                if arg_tys.len() < 2 {
                    return Err(LowerError::type_error(
                        "`zip` expects at least two lists",
                        loc,
                    ));
                }
                let tys = arg_tys
                    .iter()
                    .map(|t| lower_type(t, loc))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.lower_zip(tys))
            }
            SB::Enumerate(t) => {
                let elem = lower_type(t, loc)?;
                Ok(self.lower_enumerate(elem))
            }
            SB::Max(t, arity) => self.lower_variadic_extremum(t, *arity, loc, Extremum::Max),
            SB::Min(t, arity) => self.lower_variadic_extremum(t, *arity, loc, Extremum::Min),
            SB::Input => Err(LowerError::semantic("cannot use `input` outside main", loc)),
            SB::Print => Err(LowerError::semantic("cannot use `print` outside main", loc)),
        }
    }

    fn identity_lam(&mut self, ty: core::Type) -> core::Expr {
        let x = self.supply.fresh_var();
        core::Expr::lam(vec![(x.clone(), ty)], core::Expr::Var(x))
    }

    /// `map` over K >= 2 lists:
    /// `λf xs0 .. xsK-1. map (λi. f xs0[i] .. xsK-1[i]) (range1 (min lens))`.
    fn lower_multi_map(&mut self, elem_tys: Vec<core::Type>, result_ty: core::Type) -> core::Expr {
        let f = self.supply.fresh_var();
        let lists: Vec<VarName> = elem_tys.iter().map(|_| self.supply.fresh_var()).collect();
        let i = self.supply.fresh_var();
        let picks = elem_tys
            .iter()
            .zip(&lists)
            .map(|(t, xs)| {
                core::Expr::app(
                    core::Expr::builtin(Builtin::At(t.clone())),
                    vec![core::Expr::Var(xs.clone()), core::Expr::Var(i.clone())],
                )
            })
            .collect();
        let body = core::Expr::app(
            core::Expr::builtin(Builtin::Map(core::Type::Int, result_ty.clone())),
            vec![
                core::Expr::lam(
                    vec![(i.clone(), core::Type::Int)],
                    core::Expr::app(core::Expr::Var(f.clone()), picks),
                ),
                self.shortest_range(&elem_tys, &lists),
            ],
        );
        let mut params = vec![(f, core::Type::fun(elem_tys.clone(), result_ty))];
        for (t, xs) in elem_tys.iter().zip(lists) {
            params.push((xs, core::Type::list(t.clone())));
        }
        core::Expr::lam(params, body)
    }

    /// `zip` over K >= 2 lists:
    /// `λxs0 .. xsK-1. map (λi. (xs0[i], .., xsK-1[i])) (range1 (min lens))`.
    fn lower_zip(&mut self, elem_tys: Vec<core::Type>) -> core::Expr {
        let lists: Vec<VarName> = elem_tys.iter().map(|_| self.supply.fresh_var()).collect();
        let i = self.supply.fresh_var();
        let picks = elem_tys
            .iter()
            .zip(&lists)
            .map(|(t, xs)| {
                core::Expr::app(
                    core::Expr::builtin(Builtin::At(t.clone())),
                    vec![core::Expr::Var(xs.clone()), core::Expr::Var(i.clone())],
                )
            })
            .collect();
        let body = core::Expr::app(
            core::Expr::builtin(Builtin::Map(
                core::Type::Int,
                core::Type::Tuple(elem_tys.clone()),
            )),
            vec![
                core::Expr::lam(
                    vec![(i.clone(), core::Type::Int)],
                    core::Expr::app(
                        core::Expr::builtin(Builtin::Tuple(elem_tys.clone())),
                        picks,
                    ),
                ),
                self.shortest_range(&elem_tys, &lists),
            ],
        );
        let params = elem_tys
            .iter()
            .zip(lists)
            .map(|(t, xs)| (xs, core::Type::list(t.clone())))
            .collect();
        core::Expr::lam(params, body)
    }

    /// `enumerate`: `λxs. map (λi. (i, xs[i])) (range1 (len xs))`.
    fn lower_enumerate(&mut self, elem_ty: core::Type) -> core::Expr {
        let xs = self.supply.fresh_var();
        let i = self.supply.fresh_var();
        let pair = vec![core::Type::Int, elem_ty.clone()];
        core::Expr::lam(
            vec![(xs.clone(), core::Type::list(elem_ty.clone()))],
            core::Expr::app(
                core::Expr::builtin(Builtin::Map(
                    core::Type::Int,
                    core::Type::Tuple(pair.clone()),
                )),
                vec![
                    core::Expr::lam(
                        vec![(i.clone(), core::Type::Int)],
                        core::Expr::app(
                            core::Expr::builtin(Builtin::Tuple(pair)),
                            vec![
                                core::Expr::Var(i.clone()),
                                core::Expr::app(
                                    core::Expr::builtin(Builtin::At(elem_ty.clone())),
                                    vec![core::Expr::Var(xs.clone()), core::Expr::Var(i)],
                                ),
                            ],
                        ),
                    ),
                    core::Expr::app(
                        core::Expr::builtin(Builtin::Range1),
                        vec![core::Expr::app(
                            core::Expr::builtin(Builtin::Len(elem_ty)),
                            vec![core::Expr::Var(xs)],
                        )],
                    ),
                ],
            ),
        )
    }

    /// `range1 (min (len xs0) (min (len xs1) ..))` over the given lists.
    fn shortest_range(&mut self, elem_tys: &[core::Type], lists: &[VarName]) -> core::Expr {
        let lens: Vec<core::Expr> = elem_tys
            .iter()
            .zip(lists)
            .map(|(t, xs)| {
                core::Expr::app(
                    core::Expr::builtin(Builtin::Len(t.clone())),
                    vec![core::Expr::Var(xs.clone())],
                )
            })
            .collect();
        let mut lens = lens.into_iter().rev();
        let last = lens.next().expect("at least one list");
        let shortest = lens.fold(last, |acc, len| {
            core::Expr::app(
                core::Expr::builtin(Builtin::Min2(core::Type::Int)),
                vec![len, acc],
            )
        });
        core::Expr::app(core::Expr::builtin(Builtin::Range1), vec![shortest])
    }

    fn lower_variadic_extremum(
        &mut self,
        ty: &source::Type,
        arity: usize,
        loc: Option<Loc>,
        which: Extremum,
    ) -> Result<core::Expr, LowerError> {
        let name = match which {
            Extremum::Max => "max",
            Extremum::Min => "min",
        };
        match arity {
            0 => Err(LowerError::type_error(
                format!("`{}` expects at least one argument", name),
                loc,
            )),
            1 => {
                let ty = lower_type(ty, loc)?;
                match ty {
                    core::Type::List(elem) => Ok(core::Expr::builtin(match which {
                        Extremum::Max => Builtin::Max1(*elem),
                        Extremum::Min => Builtin::Min1(*elem),
                    })),
                    _ => Err(LowerError::type_error(
                        format!("`{}` of a single argument expects a list", name),
                        loc,
                    )),
                }
            }
            _ => {
                let ty = lower_type(ty, loc)?;
                let names: Vec<VarName> =
                    (0..arity).map(|_| self.supply.fresh_var()).collect();
                let two = |which: Extremum, ty: core::Type| match which {
                    Extremum::Max => Builtin::Max2(ty),
                    Extremum::Min => Builtin::Min2(ty),
                };
                let mut acc = core::Expr::Var(names[arity - 1].clone());
                for name in names[..arity - 1].iter().rev() {
                    acc = core::Expr::app(
                        core::Expr::builtin(two(which, ty.clone())),
                        vec![core::Expr::Var(name.clone()), acc],
                    );
                }
                Ok(core::Expr::lam(
                    names.into_iter().map(|n| (n, ty.clone())).collect(),
                    acc,
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Max,
    Min,
}

#[cfg(test)]
mod tests {
    use super::*;
    use purelift_core::core::Expr as CE;
    use purelift_core::name::NameSupply;
    use purelift_core::source::Expr as SE;

    use crate::env::ScopeEnv;

    fn lowerer() -> Lowerer {
        Lowerer {
            supply: NameSupply::new(),
            env: ScopeEnv::new(),
        }
    }

    #[test]
    fn variadic_max_desugars_to_a_lambda_tree() {
        let mut l = lowerer();
        let lowered = l
            .lower_expr(&SE::builtin(source::Builtin::Max(source::Type::Int, 3)))
            .unwrap();
        let CE::Lam(params, body) = lowered else {
            panic!("variadic max should lower to a lambda");
        };
        assert_eq!(params.len(), 3);
        // max2 $0 (max2 $1 $2)
        assert_eq!(
            *body,
            CE::app(
                CE::builtin(Builtin::Max2(core::Type::Int)),
                vec![
                    CE::var("$0"),
                    CE::app(
                        CE::builtin(Builtin::Max2(core::Type::Int)),
                        vec![CE::var("$1"), CE::var("$2")],
                    ),
                ],
            )
        );
    }

    #[test]
    fn unary_max_requires_a_list() {
        let mut l = lowerer();
        assert!(matches!(
            l.lower_expr(&SE::builtin(source::Builtin::Max(source::Type::Int, 1))),
            Err(LowerError::Type { .. })
        ));
        assert!(matches!(
            l.lower_expr(&SE::builtin(source::Builtin::Max(
                source::Type::List(Box::new(source::Type::Int)),
                1
            ))),
            Ok(CE::Lit(core::Lit::Builtin(Builtin::Max1(core::Type::Int))))
        ));
    }

    #[test]
    fn zero_arity_extremum_is_a_type_error() {
        let mut l = lowerer();
        assert!(matches!(
            l.lower_expr(&SE::builtin(source::Builtin::Min(source::Type::Int, 0))),
            Err(LowerError::Type { .. })
        ));
    }

    #[test]
    fn not_in_applies_a_negated_elem_lambda() {
        let mut l = lowerer();
        let lowered = l
            .lower_expr(&SE::compare(SE::name("x"), CmpOp::NotIn, SE::name("xs")))
            .unwrap();
        let CE::App(func, args) = lowered else {
            panic!("not-in should lower to an application");
        };
        assert_eq!(args, vec![CE::var("x"), CE::var("xs")]);
        assert!(matches!(*func, CE::Lam(ref params, _) if params.len() == 2));
    }

    #[test]
    fn slice_without_bounds_uses_range1_of_len() {
        let mut l = lowerer();
        let lowered = l
            .lower_expr(&SE::new(ExprKind::SubscriptSlice(
                Box::new(SE::name("xs")),
                None,
                None,
                None,
            )))
            .unwrap();
        // map (λi. at xs i) (range1 (len xs))
        let CE::App(_, args) = lowered else {
            panic!("slice should lower to a map application");
        };
        let CE::App(range_head, _) = &args[1] else {
            panic!("slice indices should be a range application");
        };
        assert_eq!(**range_head, CE::builtin(Builtin::Range1));
    }

    #[test]
    fn slice_with_step_uses_range3() {
        let mut l = lowerer();
        let lowered = l
            .lower_expr(&SE::new(ExprKind::SubscriptSlice(
                Box::new(SE::name("xs")),
                Some(Box::new(SE::int(1))),
                None,
                Some(Box::new(SE::int(2))),
            )))
            .unwrap();
        let CE::App(_, args) = lowered else {
            panic!("slice should lower to a map application");
        };
        let CE::App(range_head, range_args) = &args[1] else {
            panic!("slice indices should be a range application");
        };
        assert_eq!(**range_head, CE::builtin(Builtin::Range3));
        assert_eq!(range_args.len(), 3);
        assert_eq!(range_args[0], CE::int(1));
        assert_eq!(range_args[2], CE::int(2));
    }

    #[test]
    fn division_and_matmul_are_rejected() {
        let mut l = lowerer();
        assert!(matches!(
            l.lower_expr(&SE::bin(SE::int(1), Operator::Div, SE::int(2))),
            Err(LowerError::Semantic { .. })
        ));
        assert!(matches!(
            l.lower_expr(&SE::bin(SE::int(1), Operator::MatMul, SE::int(2))),
            Err(LowerError::Semantic { .. })
        ));
    }

    #[test]
    fn list_literal_folds_cons_over_nil() {
        let mut l = lowerer();
        let lowered = l
            .lower_expr(&SE::list(source::Type::Int, vec![SE::int(1), SE::int(2)]))
            .unwrap();
        assert_eq!(
            lowered,
            CE::app(
                CE::builtin(Builtin::Cons(core::Type::Int)),
                vec![
                    CE::int(1),
                    CE::app(
                        CE::builtin(Builtin::Cons(core::Type::Int)),
                        vec![CE::int(2), CE::nil(core::Type::Int)],
                    ),
                ],
            )
        );
    }

    #[test]
    fn bare_attribute_is_an_internal_error() {
        let mut l = lowerer();
        assert!(matches!(
            l.lower_expr(&SE::attribute(
                SE::name("xs"),
                Attribute::Count(source::Type::Int)
            )),
            Err(LowerError::Internal { .. })
        ));
    }
}
