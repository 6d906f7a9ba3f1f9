//! The Source AST: a restricted, typed, imperative scripting language.
//!
//! This is the input of the lowering pass. It is produced by an external
//! parser and type-inference front end, which is why builtin constants and
//! method attributes arrive already annotated with the argument types the
//! inference solved (e.g. [`Builtin::Len`] carries the element type of the
//! list it is applied to). Expressions and targets carry optional source
//! locations for error reporting.
//!
//! The shape is deliberately narrow: comparisons are binary (a chained
//! comparison is a tree of two-operand nodes), list comprehensions have a
//! single generator with at most one filter, and `xs.append(e)` is a
//! dedicated statement rather than an expression.

use serde::{Deserialize, Serialize};

use crate::loc::Loc;
use crate::name::{TypeName, VarName};

/// Source-level types, as written or inferred in the Source program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// An inference type variable (name preserved through lowering).
    Var(TypeName),
    Int,
    Bool,
    List(Box<Type>),
    Tuple(Vec<Type>),
    /// A function type: argument types and return type.
    Callable(Vec<Type>, Box<Type>),
    /// Strings exist in the Source language but only inside the entry-point
    /// I/O code, which this pass never sees. Rejected by the type translator.
    Str,
    /// The type of statements-used-as-expressions such as `xs.append(e)`.
    /// Rejected by the type translator everywhere except its dedicated
    /// statement form.
    SideEffect,
}

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
    Implies,
}

/// Binary arithmetic and bitwise operators.
///
/// `Div` (true division) and `MatMul` are part of the surface syntax but are
/// rejected by the lowering with a semantic error. `Max`/`Min` appear as
/// operators when the front end folds two-argument `max`/`min` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    FloorDiv,
    FloorMod,
    CeilDiv,
    CeilMod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    BitLeftShift,
    BitRightShift,
    Max,
    Min,
    Div,
    MatMul,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise complement (`~`).
    Invert,
    Not,
    /// Arithmetic negation (`-`).
    Minus,
    /// Unary plus (`+`); lowers to an applied identity so typing stays uniform.
    Plus,
}

/// Binary comparison operators. A chained comparison `a < b < c` arrives as
/// `(a < b) and (b < c)`, two operands per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    NotEq,
    Is,
    IsNot,
    In,
    NotIn,
}

/// Library builtins, annotated by upstream type inference with the concrete
/// argument types at each use site. The annotations are what let the lowering
/// desugar variadic `max`/`min`, K-list `map`/`zip`, `enumerate`, `int(·)`
/// and `bool(·)` without re-running inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Builtin {
    Abs,
    Pow,
    ModPow,
    ModInv,
    DivMod,
    Gcd,
    Lcm,
    Fact,
    Choose,
    Permute,
    MultiChoose,
    /// `int(x)` where `x` has the carried type (must be int or bool).
    Int(Type),
    /// `bool(x)` where `x` has the carried type (must be bool, int, or list).
    Bool(Type),
    /// `list(xs)` over a list with the carried element type (identity).
    List(Type),
    /// `tuple(x)` over a tuple with the carried element types (identity).
    Tuple(Vec<Type>),
    /// `len(xs)` with the carried element type.
    Len(Type),
    /// `map(f, xs0, ..)`: element types of the input lists, plus the result
    /// element type.
    Map(Vec<Type>, Type),
    Filter(Type),
    /// `zip(xs0, ..)`: element types of the input lists.
    Zip(Vec<Type>),
    Enumerate(Type),
    Sorted(Type),
    Reversed(Type),
    All,
    Any,
    Sum,
    Product,
    Range1,
    Range2,
    Range3,
    /// `max(..)` with the carried operand type and the call arity: arity 1
    /// reduces a list, arity >= 2 is the variadic form.
    Max(Type, usize),
    /// `min(..)`, same conventions as `Max`.
    Min(Type, usize),
    ArgMax(Type),
    ArgMin(Type),
    /// Only legal inside the entry point, which this pass never sees.
    Input,
    /// Only legal inside the entry point, which this pass never sees.
    Print,
}

/// Method-like attributes. Name resolution guarantees these only ever appear
/// as the head of a call; anywhere else is an internal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    /// `xs.count(x)`; carries the element type.
    Count(Type),
    /// `xs.index(x)`; carries the element type.
    Index(Type),
    /// `x.copy()`; carries the value type.
    Copy(Type),
    /// `xs.append(e)`; only legal as the dedicated append statement.
    Append(Type),
    /// `s.split()`; only legal inside the entry point.
    Split,
}

/// Constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constant {
    None,
    Int(i64),
    Bool(bool),
    Builtin(Builtin),
}

/// The single generator of a list comprehension, with an optional filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comprehension {
    pub target: Target,
    pub iter: Box<Expr>,
    pub pred: Option<Box<Expr>>,
}

/// A Source expression with its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Option<Loc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    Name(VarName),
    Constant(Constant),
    BoolOp(Box<Expr>, BoolOp, Box<Expr>),
    BinOp(Box<Expr>, Operator, Box<Expr>),
    UnaryOp(UnaryOp, Box<Expr>),
    Lambda(Vec<(VarName, Type)>, Box<Expr>),
    IfExp(Box<Expr>, Box<Expr>, Box<Expr>),
    ListComp(Box<Expr>, Comprehension),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Attribute(Box<Expr>, Attribute),
    Subscript(Box<Expr>, Box<Expr>),
    /// `e[lo:hi:step]` with any of the three positions absent.
    SubscriptSlice(
        Box<Expr>,
        Option<Box<Expr>>,
        Option<Box<Expr>>,
        Option<Box<Expr>>,
    ),
    Starred(Box<Expr>),
    /// List literal with the annotated element type.
    List(Type, Vec<Expr>),
    Tuple(Vec<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr { kind, loc: None }
    }

    pub fn with_loc(kind: ExprKind, loc: Loc) -> Self {
        Expr {
            kind,
            loc: Some(loc),
        }
    }

    pub fn name(name: impl Into<VarName>) -> Self {
        Expr::new(ExprKind::Name(name.into()))
    }

    pub fn int(n: i64) -> Self {
        Expr::new(ExprKind::Constant(Constant::Int(n)))
    }

    pub fn bool_(b: bool) -> Self {
        Expr::new(ExprKind::Constant(Constant::Bool(b)))
    }

    pub fn none() -> Self {
        Expr::new(ExprKind::Constant(Constant::None))
    }

    pub fn builtin(b: Builtin) -> Self {
        Expr::new(ExprKind::Constant(Constant::Builtin(b)))
    }

    pub fn bin(lhs: Expr, op: Operator, rhs: Expr) -> Self {
        Expr::new(ExprKind::BinOp(Box::new(lhs), op, Box::new(rhs)))
    }

    pub fn bool_op(lhs: Expr, op: BoolOp, rhs: Expr) -> Self {
        Expr::new(ExprKind::BoolOp(Box::new(lhs), op, Box::new(rhs)))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::new(ExprKind::UnaryOp(op, Box::new(operand)))
    }

    pub fn compare(lhs: Expr, op: CmpOp, rhs: Expr) -> Self {
        Expr::new(ExprKind::Compare(Box::new(lhs), op, Box::new(rhs)))
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Call(Box::new(func), args))
    }

    pub fn subscript(value: Expr, index: Expr) -> Self {
        Expr::new(ExprKind::Subscript(Box::new(value), Box::new(index)))
    }

    pub fn tuple(elems: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Tuple(elems))
    }

    pub fn list(elem_ty: Type, elems: Vec<Expr>) -> Self {
        Expr::new(ExprKind::List(elem_ty, elems))
    }

    pub fn attribute(value: Expr, attr: Attribute) -> Self {
        Expr::new(ExprKind::Attribute(Box::new(value), attr))
    }
}

/// An assignment target (l-value): a name, a subscripted target, or a tuple
/// pattern of targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub loc: Option<Loc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Name(VarName),
    Subscript(Box<Target>, Box<Expr>),
    Tuple(Vec<Target>),
}

impl Target {
    pub fn new(kind: TargetKind) -> Self {
        Target { kind, loc: None }
    }

    pub fn name(name: impl Into<VarName>) -> Self {
        Target::new(TargetKind::Name(name.into()))
    }

    pub fn subscript(base: Target, index: Expr) -> Self {
        Target::new(TargetKind::Subscript(Box::new(base), Box::new(index)))
    }

    pub fn tuple(elems: Vec<Target>) -> Self {
        Target::new(TargetKind::Tuple(elems))
    }

    /// The names this target binds, left to right.
    pub fn names(&self) -> Vec<&VarName> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a VarName>) {
        match &self.kind {
            TargetKind::Name(x) => out.push(x),
            TargetKind::Subscript(base, _) => base.collect_names(out),
            TargetKind::Tuple(elems) => {
                for t in elems {
                    t.collect_names(out);
                }
            }
        }
    }
}

/// Function-body statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    Return(Expr),
    /// `target: ty = e`.
    AnnAssign(Target, Type, Expr),
    /// `target op= e`.
    AugAssign(Target, Operator, Expr),
    /// `for target in iter: body`.
    For(Target, Expr, Vec<Stmt>),
    If(Expr, Vec<Stmt>, Vec<Stmt>),
    Assert(Expr),
    /// `e1.append(e2)`, with the annotated element type.
    Append(Type, Expr, Expr),
    /// A bare expression statement. Never legal in a lowered function body.
    Expr(Expr),
}

/// Toplevel declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToplevelStmt {
    /// `name: ty = e` at the toplevel.
    AnnAssign(VarName, Type, Expr),
    FunctionDef {
        name: VarName,
        args: Vec<(VarName, Type)>,
        ret: Type,
        body: Vec<Stmt>,
    },
    Assert(Expr),
}

/// A whole Source program: the toplevel declarations, in order. The entry
/// function is named `solve` by convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub stmts: Vec<ToplevelStmt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names_in_order() {
        let t = Target::tuple(vec![
            Target::name("a"),
            Target::subscript(Target::name("xs"), Expr::int(0)),
            Target::name("b"),
        ]);
        let names: Vec<&str> = t.names().iter().map(|n| n.0.as_str()).collect();
        assert_eq!(names, vec!["a", "xs", "b"]);
    }

    #[test]
    fn serde_roundtrip_expr() {
        let e = Expr::bin(Expr::name("x"), Operator::Add, Expr::int(1));
        let json = serde_json::to_string(&e).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }

    #[test]
    fn serde_roundtrip_stmt() {
        let s = Stmt::AnnAssign(Target::name("a"), Type::Int, Expr::int(0));
        let json = serde_json::to_string(&s).unwrap();
        let back: Stmt = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
