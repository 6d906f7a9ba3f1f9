//! Trap conditions raised while evaluating Core programs.

use serde::{Deserialize, Serialize};

use purelift_core::name::VarName;

/// A runtime trap. The evaluator is strict and aborts on the first trap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    IntegerOverflow,

    #[error("index {index} out of bounds for a list of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("reduction of an empty list")]
    EmptyList,

    #[error("negative exponent")]
    NegativeExponent,

    #[error("`{builtin}` of a negative operand")]
    NegativeOperand { builtin: String },

    #[error("no modular inverse")]
    NoModularInverse,

    #[error("range step must not be zero")]
    ZeroStep,

    #[error("shift amount out of range")]
    ShiftOutOfRange,

    #[error("unbound variable `{name}`")]
    UnboundVariable { name: VarName },

    #[error("value of type {got} is not callable")]
    NotCallable { got: String },

    #[error("`{builtin}` applied to a value of unexpected type {got}")]
    WrongOperand { builtin: String, got: String },

    #[error("values of type {got} are not comparable")]
    NotComparable { got: String },

    #[error("entry function expects {expected} arguments, got {actual}")]
    WrongArgumentCount { expected: usize, actual: usize },
}
