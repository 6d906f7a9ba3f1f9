//! The Core IR: a pure, typed lambda calculus with list and tuple primitives.
//!
//! Core is the output of the lowering pass. Programs are trees of immutable
//! values built bottom-up: expressions (`Var`, `Lit`, `App`, `Lam`, `Let`)
//! under a spine of toplevel bindings ending in a result expression.
//!
//! # Design: type arguments on builtins
//!
//! Polymorphic builtins carry their type instantiations inline (e.g.
//! [`Builtin::At`] holds the element type, [`Builtin::Foldl`] holds the
//! element and accumulator types). The lowering fills these with fresh type
//! holes and the type checker unifies them; nothing else in the tree carries
//! redundant types. Every builtin exposes its curried signature via
//! [`Builtin::ty`], which is the single source of truth the type checker and
//! the reference interpreter both consume.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::name::{TypeName, VarName};

/// Typed lambda parameters. Most lambdas in lowered code take one or two
/// parameters (a fold accumulator and a loop counter), hence the inline
/// capacity.
pub type Params = SmallVec<[(VarName, Type); 2]>;

/// Core types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// A type variable; holes minted during lowering unify later.
    Var(TypeName),
    Int,
    Bool,
    List(Box<Type>),
    Tuple(Vec<Type>),
    /// Curried function type: `Fun([a, b], r)` is `a -> b -> r`. The nullary
    /// form `Fun([], r)` is a thunk type, distinct from `r`.
    Fun(Vec<Type>, Box<Type>),
}

impl Type {
    pub fn var(name: impl Into<TypeName>) -> Self {
        Type::Var(name.into())
    }

    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    pub fn fun(params: Vec<Type>, ret: Type) -> Self {
        Type::Fun(params, Box::new(ret))
    }

    /// The empty tuple type.
    pub fn unit() -> Self {
        Type::Tuple(Vec::new())
    }
}

/// Core builtins with their type instantiations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Builtin {
    // -- Integer arithmetic --
    Negate,
    Plus,
    Minus,
    Mult,
    /// Floor division (rounds toward negative infinity).
    FloorDiv,
    /// Floor modulo (result has the divisor's sign).
    FloorMod,
    CeilDiv,
    CeilMod,
    Pow,
    Abs,
    Gcd,
    Lcm,
    Min2(Type),
    Max2(Type),
    // -- Modular arithmetic --
    ModPow,
    ModInv,
    // -- Boolean and bitwise --
    Not,
    And,
    Or,
    Implies,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    BitLeftShift,
    BitRightShift,
    // -- Branching --
    /// Lazy conditional at the carried result type. The eager-wrap pass
    /// rewrites every fully-applied `If` into thunked form.
    If(Type),
    // -- Comparison --
    Equal(Type),
    NotEqual(Type),
    LessThan(Type),
    LessEqual(Type),
    GreaterThan(Type),
    GreaterEqual(Type),
    // -- Lists --
    Cons(Type),
    /// Append a single element at the end of a list.
    Snoc(Type),
    /// `Foldl(elem, acc)`: left fold with a two-argument step function.
    Foldl(Type, Type),
    Len(Type),
    /// `Map(from, to)`.
    Map(Type, Type),
    Filter(Type),
    At(Type),
    /// Functional update: a copy of the list with one position replaced.
    SetAt(Type),
    Elem(Type),
    Sum,
    Product,
    Range1,
    Range2,
    Range3,
    All,
    Any,
    Sorted(Type),
    Reversed(Type),
    /// Minimum of a non-empty list.
    Min1(Type),
    /// Maximum of a non-empty list.
    Max1(Type),
    ArgMin(Type),
    ArgMax(Type),
    // -- Combinatorics --
    Fact,
    Choose,
    Permute,
    MultiChoose,
    // -- Tuples --
    /// Tuple constructor; `Tuple([])` applied to no arguments is unit.
    Tuple(Vec<Type>),
    /// `Proj(ts, i)`: the i-th component of a tuple of types `ts`. The index
    /// is in bounds by construction; the type checker re-validates it.
    Proj(Vec<Type>, usize),
}

impl Builtin {
    /// The curried signature of this builtin.
    pub fn ty(&self) -> Type {
        use Type::{Bool, Int};
        match self {
            Builtin::Negate | Builtin::BitNot | Builtin::Abs | Builtin::Fact => {
                Type::fun(vec![Int], Int)
            }
            Builtin::Plus
            | Builtin::Minus
            | Builtin::Mult
            | Builtin::FloorDiv
            | Builtin::FloorMod
            | Builtin::CeilDiv
            | Builtin::CeilMod
            | Builtin::Pow
            | Builtin::Gcd
            | Builtin::Lcm
            | Builtin::BitAnd
            | Builtin::BitOr
            | Builtin::BitXor
            | Builtin::BitLeftShift
            | Builtin::BitRightShift
            | Builtin::ModInv
            | Builtin::Choose
            | Builtin::Permute
            | Builtin::MultiChoose => Type::fun(vec![Int, Int], Int),
            Builtin::ModPow => Type::fun(vec![Int, Int, Int], Int),
            Builtin::Min2(t) | Builtin::Max2(t) => {
                Type::fun(vec![t.clone(), t.clone()], t.clone())
            }
            Builtin::Not => Type::fun(vec![Bool], Bool),
            Builtin::And | Builtin::Or | Builtin::Implies => Type::fun(vec![Bool, Bool], Bool),
            Builtin::If(t) => Type::fun(vec![Bool, t.clone(), t.clone()], t.clone()),
            Builtin::Equal(t)
            | Builtin::NotEqual(t)
            | Builtin::LessThan(t)
            | Builtin::LessEqual(t)
            | Builtin::GreaterThan(t)
            | Builtin::GreaterEqual(t) => Type::fun(vec![t.clone(), t.clone()], Bool),
            Builtin::Cons(t) => Type::fun(vec![t.clone(), Type::list(t.clone())], Type::list(t.clone())),
            Builtin::Snoc(t) => Type::fun(vec![Type::list(t.clone()), t.clone()], Type::list(t.clone())),
            Builtin::Foldl(elem, acc) => Type::fun(
                vec![
                    Type::fun(vec![acc.clone(), elem.clone()], acc.clone()),
                    acc.clone(),
                    Type::list(elem.clone()),
                ],
                acc.clone(),
            ),
            Builtin::Len(t) => Type::fun(vec![Type::list(t.clone())], Int),
            Builtin::Map(from, to) => Type::fun(
                vec![
                    Type::fun(vec![from.clone()], to.clone()),
                    Type::list(from.clone()),
                ],
                Type::list(to.clone()),
            ),
            Builtin::Filter(t) => Type::fun(
                vec![Type::fun(vec![t.clone()], Bool), Type::list(t.clone())],
                Type::list(t.clone()),
            ),
            Builtin::At(t) => Type::fun(vec![Type::list(t.clone()), Int], t.clone()),
            Builtin::SetAt(t) => Type::fun(
                vec![Type::list(t.clone()), Int, t.clone()],
                Type::list(t.clone()),
            ),
            Builtin::Elem(t) => Type::fun(vec![t.clone(), Type::list(t.clone())], Bool),
            Builtin::Sum | Builtin::Product => Type::fun(vec![Type::list(Int)], Int),
            Builtin::Range1 => Type::fun(vec![Int], Type::list(Int)),
            Builtin::Range2 => Type::fun(vec![Int, Int], Type::list(Int)),
            Builtin::Range3 => Type::fun(vec![Int, Int, Int], Type::list(Int)),
            Builtin::All | Builtin::Any => Type::fun(vec![Type::list(Bool)], Bool),
            Builtin::Sorted(t) | Builtin::Reversed(t) => {
                Type::fun(vec![Type::list(t.clone())], Type::list(t.clone()))
            }
            Builtin::Min1(t) | Builtin::Max1(t) => {
                Type::fun(vec![Type::list(t.clone())], t.clone())
            }
            Builtin::ArgMin(t) | Builtin::ArgMax(t) => {
                Type::fun(vec![Type::list(t.clone())], Int)
            }
            Builtin::Tuple(ts) => Type::fun(ts.clone(), Type::Tuple(ts.clone())),
            Builtin::Proj(ts, i) => Type::fun(vec![Type::Tuple(ts.clone())], ts[*i].clone()),
        }
    }

    /// Number of arguments a saturated application of this builtin takes.
    pub fn arity(&self) -> usize {
        match self.ty() {
            Type::Fun(params, _) => params.len(),
            _ => 0,
        }
    }
}

/// Literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lit {
    Int(i64),
    Bool(bool),
    /// The empty list at the carried element type.
    Nil(Type),
    Builtin(Builtin),
}

/// Core expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Var(VarName),
    Lit(Lit),
    /// Application of a function to zero or more arguments. Zero arguments
    /// is a real call (thunk forcing, unit construction), never a no-op.
    App(Box<Expr>, Vec<Expr>),
    Lam(Params, Box<Expr>),
    /// Monomorphic binding with an annotated type.
    Let(VarName, Type, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<VarName>) -> Self {
        Expr::Var(name.into())
    }

    pub fn int(n: i64) -> Self {
        Expr::Lit(Lit::Int(n))
    }

    pub fn bool_(b: bool) -> Self {
        Expr::Lit(Lit::Bool(b))
    }

    pub fn nil(elem: Type) -> Self {
        Expr::Lit(Lit::Nil(elem))
    }

    pub fn builtin(b: Builtin) -> Self {
        Expr::Lit(Lit::Builtin(b))
    }

    pub fn app(func: Expr, args: Vec<Expr>) -> Self {
        Expr::App(Box::new(func), args)
    }

    pub fn lam(params: Vec<(VarName, Type)>, body: Expr) -> Self {
        Expr::Lam(Params::from(params), Box::new(body))
    }

    pub fn let_(name: impl Into<VarName>, ty: Type, value: Expr, body: Expr) -> Self {
        Expr::Let(name.into(), ty, Box::new(value), Box::new(body))
    }

    /// The unit value: the nullary tuple constructor applied to no arguments.
    pub fn unit() -> Self {
        Expr::app(Expr::builtin(Builtin::Tuple(Vec::new())), Vec::new())
    }
}

/// The toplevel spine of a Core program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toplevel {
    /// The program's result expression; by convention the variable `solve`.
    ResultExpr(Expr),
    Let(VarName, Type, Expr, Box<Toplevel>),
    /// Recursive function binding: name, typed parameters, return type, body.
    LetRec(VarName, Params, Type, Expr, Box<Toplevel>),
}

/// A whole Core program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub toplevel: Toplevel,
}
