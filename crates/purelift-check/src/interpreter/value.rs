//! Runtime values for the Core evaluator.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use purelift_core::core::{Builtin, Expr, Params};
use purelift_core::name::VarName;

use super::error::RuntimeError;

/// The evaluator's variable environment. Cloned at capture points; programs
/// produced by the lowering are small enough that sharing is not worth the
/// machinery.
pub type Env = HashMap<VarName, Value>;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Closure(Rc<Closure>),
    /// A builtin waiting for more arguments.
    Builtin { builtin: Builtin, args: Vec<Value> },
}

/// A lambda closed over its environment. `rec_name`, when present, is
/// re-bound to the closure itself on every call, which ties the knot for
/// recursive toplevel functions.
#[derive(Debug)]
pub struct Closure {
    pub rec_name: Option<VarName>,
    pub params: Params,
    pub body: Expr,
    pub env: Env,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Closure(_) => "function",
            Value::Builtin { .. } => "builtin",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (
                Value::Builtin { builtin: a, args: x },
                Value::Builtin { builtin: b, args: y },
            ) => a == b && x == y,
            // Functions compare unequal, including to themselves.
            _ => false,
        }
    }
}

/// Structural equality as the Core `==` builtin sees it. Functions trap.
pub fn value_eq(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    Ok(compare(a, b)? == Ordering::Equal)
}

/// Total order over first-order values: ints, bools (false < true), and
/// lists/tuples lexicographically. Functions trap.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, RuntimeError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::List(xs), Value::List(ys)) | (Value::Tuple(xs), Value::Tuple(ys)) => {
            for (x, y) in xs.iter().zip(ys.iter()) {
                match compare(x, y)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(xs.len().cmp(&ys.len()))
        }
        _ => Err(RuntimeError::NotComparable {
            got: a.type_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_list_order() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1), Value::Int(3)]);
        let c = Value::List(vec![Value::Int(1)]);
        assert_eq!(compare(&a, &b), Ok(Ordering::Less));
        assert_eq!(compare(&c, &a), Ok(Ordering::Less));
        assert_eq!(compare(&a, &a), Ok(Ordering::Equal));
    }

    #[test]
    fn false_sorts_before_true() {
        assert_eq!(compare(&Value::Bool(false), &Value::Bool(true)), Ok(Ordering::Less));
    }

    #[test]
    fn functions_are_not_comparable() {
        let f = Value::Builtin {
            builtin: Builtin::Plus,
            args: Vec::new(),
        };
        assert!(compare(&f, &f).is_err());
    }
}
