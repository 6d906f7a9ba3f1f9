//! Source locations attached to expressions and targets.
//!
//! Locations come from the external parser and are carried through the
//! lowering pass so that every error can point at the nearest enclosing
//! piece of Source text. They never influence lowering decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in the Source text (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    pub line: u32,
    pub col: u32,
}

impl Loc {
    pub fn new(line: u32, col: u32) -> Self {
        Loc { line, col }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loc_display() {
        assert_eq!(format!("{}", Loc::new(3, 7)), "line 3, column 7");
    }

    #[test]
    fn serde_roundtrip() {
        let loc = Loc::new(12, 1);
        let json = serde_json::to_string(&loc).unwrap();
        let back: Loc = serde_json::from_str(&json).unwrap();
        assert_eq!(loc, back);
    }
}
