//! Errors surfaced by the lowering pass.
//!
//! Three kinds of failure originate here (semantic restrictions, builtin
//! typing restrictions, and broken internal invariants); precondition and
//! type-check failures from the check crate are wrapped so the pipeline
//! reports exactly one error value. The first error aborts the pass; no
//! partial IR is ever produced.

use serde::{Deserialize, Serialize};

use purelift_check::lint::LintError;
use purelift_check::typecheck::TypeError;
use purelift_core::loc::Loc;

fn loc_suffix(loc: &Option<Loc>) -> String {
    match loc {
        Some(loc) => format!(" at {}", loc),
        None => String::new(),
    }
}

/// An error raised while lowering Source to Core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum LowerError {
    /// The program uses a construct this pass rejects.
    #[error("semantic error: {message}{}", loc_suffix(.loc))]
    Semantic { message: String, loc: Option<Loc> },

    /// A builtin was used at a disallowed type or arity.
    #[error("type error: {message}{}", loc_suffix(.loc))]
    Type { message: String, loc: Option<Loc> },

    /// An invariant the front end guarantees was broken. Should not occur on
    /// input that passed the preconditions.
    #[error("internal error: {message}")]
    Internal { message: String },

    /// A lowering precondition was violated.
    #[error("precondition violated: {0}")]
    Lint(#[from] LintError),

    /// The lowered program failed the Core type checker.
    #[error("lowered program does not type check: {0}")]
    TypeCheck(#[from] TypeError),
}

impl LowerError {
    pub fn semantic(message: impl Into<String>, loc: Option<Loc>) -> Self {
        LowerError::Semantic {
            message: message.into(),
            loc,
        }
    }

    pub fn type_error(message: impl Into<String>, loc: Option<Loc>) -> Self {
        LowerError::Type {
            message: message.into(),
            loc,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        LowerError::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location_when_known() {
        let err = LowerError::semantic("starred expression is not allowed here", Some(Loc::new(2, 5)));
        assert_eq!(
            err.to_string(),
            "semantic error: starred expression is not allowed here at line 2, column 5"
        );
        let bare = LowerError::semantic("expression statements are not allowed", None);
        assert_eq!(
            bare.to_string(),
            "semantic error: expression statements are not allowed"
        );
    }
}
