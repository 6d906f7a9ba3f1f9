//! Deterministic plain-text rendering of Core programs.
//!
//! The format is compact and stable: applications are parenthesized
//! prefix form, lambdas and lets spell out their annotations, and builtin
//! type arguments are left implicit (they are holes until the type checker
//! runs, so printing them would mostly print `$n`). Used by diagnostics and
//! by snapshot tests; nothing parses this output back.

use std::fmt;

use crate::core::{Builtin, Expr, Lit, Program, Toplevel, Type};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(name) => write!(f, "{}", name),
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
            Type::List(elem) => write!(f, "list({})", elem),
            Type::Tuple(elems) if elems.is_empty() => f.write_str("unit"),
            Type::Tuple(elems) => {
                f.write_str("tuple(")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                f.write_str(")")
            }
            Type::Fun(params, ret) => {
                f.write_str("(")?;
                for (i, t) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}

impl Builtin {
    /// The printed name of this builtin, without type arguments.
    pub fn name(&self) -> String {
        match self {
            Builtin::Negate => "negate".into(),
            Builtin::Plus => "+".into(),
            Builtin::Minus => "-".into(),
            Builtin::Mult => "*".into(),
            Builtin::FloorDiv => "//".into(),
            Builtin::FloorMod => "%".into(),
            Builtin::CeilDiv => "ceildiv".into(),
            Builtin::CeilMod => "ceilmod".into(),
            Builtin::Pow => "**".into(),
            Builtin::Abs => "abs".into(),
            Builtin::Gcd => "gcd".into(),
            Builtin::Lcm => "lcm".into(),
            Builtin::Min2(_) => "min2".into(),
            Builtin::Max2(_) => "max2".into(),
            Builtin::ModPow => "modpow".into(),
            Builtin::ModInv => "modinv".into(),
            Builtin::Not => "not".into(),
            Builtin::And => "and".into(),
            Builtin::Or => "or".into(),
            Builtin::Implies => "implies".into(),
            Builtin::BitNot => "~".into(),
            Builtin::BitAnd => "&".into(),
            Builtin::BitOr => "|".into(),
            Builtin::BitXor => "^".into(),
            Builtin::BitLeftShift => "<<".into(),
            Builtin::BitRightShift => ">>".into(),
            Builtin::If(_) => "if".into(),
            Builtin::Equal(_) => "==".into(),
            Builtin::NotEqual(_) => "!=".into(),
            Builtin::LessThan(_) => "<".into(),
            Builtin::LessEqual(_) => "<=".into(),
            Builtin::GreaterThan(_) => ">".into(),
            Builtin::GreaterEqual(_) => ">=".into(),
            Builtin::Cons(_) => "cons".into(),
            Builtin::Snoc(_) => "snoc".into(),
            Builtin::Foldl(_, _) => "foldl".into(),
            Builtin::Len(_) => "len".into(),
            Builtin::Map(_, _) => "map".into(),
            Builtin::Filter(_) => "filter".into(),
            Builtin::At(_) => "at".into(),
            Builtin::SetAt(_) => "set_at".into(),
            Builtin::Elem(_) => "elem".into(),
            Builtin::Sum => "sum".into(),
            Builtin::Product => "product".into(),
            Builtin::Range1 => "range1".into(),
            Builtin::Range2 => "range2".into(),
            Builtin::Range3 => "range3".into(),
            Builtin::All => "all".into(),
            Builtin::Any => "any".into(),
            Builtin::Sorted(_) => "sorted".into(),
            Builtin::Reversed(_) => "reversed".into(),
            Builtin::Min1(_) => "min1".into(),
            Builtin::Max1(_) => "max1".into(),
            Builtin::ArgMin(_) => "argmin".into(),
            Builtin::ArgMax(_) => "argmax".into(),
            Builtin::Fact => "fact".into(),
            Builtin::Choose => "choose".into(),
            Builtin::Permute => "permute".into(),
            Builtin::MultiChoose => "multichoose".into(),
            Builtin::Tuple(_) => "tuple".into(),
            Builtin::Proj(_, i) => format!("proj{}", i),
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Int(n) => write!(f, "{}", n),
            Lit::Bool(b) => write!(f, "{}", b),
            Lit::Nil(_) => f.write_str("nil"),
            Lit::Builtin(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Lit(lit) => write!(f, "{}", lit),
            Expr::App(func, args) => {
                write!(f, "({}", func)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Lam(params, body) => {
                f.write_str("(fun")?;
                if params.is_empty() {
                    f.write_str(" ()")?;
                } else {
                    for (name, ty) in params {
                        write!(f, " ({}: {})", name, ty)?;
                    }
                }
                write!(f, " -> {})", body)
            }
            Expr::Let(name, ty, value, body) => {
                write!(f, "(let {}: {} = {} in {})", name, ty, value, body)
            }
        }
    }
}

impl fmt::Display for Toplevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toplevel::ResultExpr(e) => write!(f, "{}", e),
            Toplevel::Let(name, ty, value, rest) => {
                writeln!(f, "let {}: {} = {}", name, ty, value)?;
                write!(f, "{}", rest)
            }
            Toplevel::LetRec(name, params, ret, body, rest) => {
                write!(f, "let rec {}", name)?;
                for (p, t) in params {
                    write!(f, " ({}: {})", p, t)?;
                }
                writeln!(f, ": {} = {}", ret, body)?;
                write!(f, "{}", rest)
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.toplevel)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Builtin, Expr, Params, Program, Toplevel, Type};
    use crate::name::VarName;

    #[test]
    fn application_renders_prefix() {
        let e = Expr::app(
            Expr::builtin(Builtin::Plus),
            vec![Expr::var("x"), Expr::int(1)],
        );
        insta::assert_snapshot!(e.to_string(), @"(+ x 1)");
    }

    #[test]
    fn let_renders_annotation() {
        let e = Expr::let_("x", Type::Int, Expr::int(1), Expr::var("x"));
        insta::assert_snapshot!(e.to_string(), @"(let x: int = 1 in x)");
    }

    #[test]
    fn lambda_renders_parameters() {
        let e = Expr::lam(
            vec![(VarName::new("n"), Type::Int)],
            Expr::var("n"),
        );
        insta::assert_snapshot!(e.to_string(), @"(fun (n: int) -> n)");
    }

    #[test]
    fn nullary_lambda_and_call() {
        let thunk = Expr::lam(vec![], Expr::int(1));
        insta::assert_snapshot!(thunk.to_string(), @"(fun () -> 1)");
        let forced = Expr::app(Expr::lam(vec![], Expr::int(1)), vec![]);
        insta::assert_snapshot!(forced.to_string(), @"((fun () -> 1))");
    }

    #[test]
    fn unit_value_and_type() {
        insta::assert_snapshot!(Expr::unit().to_string(), @"(tuple)");
        insta::assert_snapshot!(Type::unit().to_string(), @"unit");
    }

    #[test]
    fn function_type_renders_curried_spelling() {
        let t = Type::fun(vec![Type::Int, Type::list(Type::Int)], Type::Bool);
        insta::assert_snapshot!(t.to_string(), @"(int, list(int)) -> bool");
        let thunk = Type::fun(vec![], Type::Int);
        insta::assert_snapshot!(thunk.to_string(), @"() -> int");
    }

    #[test]
    fn program_renders_toplevel_spine() {
        let prog = Program {
            toplevel: Toplevel::LetRec(
                VarName::new("solve"),
                Params::from(vec![(VarName::new("n"), Type::Int)]),
                Type::Int,
                Expr::var("n"),
                Box::new(Toplevel::ResultExpr(Expr::var("solve"))),
            ),
        };
        assert_eq!(prog.to_string(), "let rec solve (n: int): int = n\nsolve");
    }
}
