//! Lexical scope tracking during lowering.
//!
//! The lowering only needs to know which Source names are *currently
//! defined* — the for-loop protocol filters a body's write set down to the
//! names that were already live before the loop, and those become the
//! fold's carried state. A simple stack with snapshot/rollback is enough;
//! there is no shadowing to resolve because Source scoping is flat inside a
//! function.

use purelift_core::name::VarName;

/// Stack of currently-defined Source names.
#[derive(Debug, Default)]
pub struct ScopeEnv {
    defined: Vec<VarName>,
}

impl ScopeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &VarName) {
        self.defined.push(name.clone());
    }

    pub fn is_defined(&self, name: &VarName) -> bool {
        self.defined.iter().any(|n| n == name)
    }

    /// Current stack depth, for [`ScopeEnv::truncate`].
    pub fn depth(&self) -> usize {
        self.defined.len()
    }

    /// Rolls back every `define` made after the snapshot was taken.
    pub fn truncate(&mut self, depth: usize) {
        self.defined.truncate(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defines_roll_back_to_a_snapshot() {
        let mut env = ScopeEnv::new();
        env.define(&VarName::new("a"));
        let depth = env.depth();
        env.define(&VarName::new("b"));
        assert!(env.is_defined(&VarName::new("a")));
        assert!(env.is_defined(&VarName::new("b")));
        env.truncate(depth);
        assert!(env.is_defined(&VarName::new("a")));
        assert!(!env.is_defined(&VarName::new("b")));
    }
}
