//! Type errors reported by the Core type checker.

use serde::{Deserialize, Serialize};

use purelift_core::core::Type;
use purelift_core::name::{TypeName, VarName};

/// A type error detected while checking a Core program.
///
/// Types in errors are reported after substitution, so they show what the
/// checker actually knew at the point of failure (possibly still containing
/// unsolved holes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TypeError {
    /// A variable was referenced without a dominating binder.
    #[error("unbound variable `{name}`")]
    UnboundVariable { name: VarName },

    /// Two types failed to unify.
    #[error("type mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: Type, actual: Type },

    /// A type variable would have to contain itself.
    #[error("occurs check failed: {var} appears inside {ty}")]
    Occurs { var: TypeName, ty: Type },

    /// Something that is not a function was applied to arguments.
    #[error("expected a function, got a value of type {ty}")]
    NotAFunction { ty: Type },

    /// A tuple projection indexes past the tuple's components.
    #[error("projection index {index} out of bounds for a tuple of {arity} components")]
    InvalidProjection { index: usize, arity: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_types() {
        let err = TypeError::Mismatch {
            expected: Type::Int,
            actual: Type::list(Type::Bool),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: expected int, got list(bool)"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let err = TypeError::Occurs {
            var: TypeName::new("$3"),
            ty: Type::list(Type::var("$3")),
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: TypeError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
