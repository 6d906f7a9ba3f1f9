//! Analyses and validation for the Source→Core pipeline.
//!
//! Everything here is a pure function over the shared ASTs:
//! - [`vars`]: may/must read-write analysis and `does_always_return`,
//!   consumed by the lowering's loop and branch protocols.
//! - [`lint`]: the preconditions the lowering relies on (loop counter
//!   discipline, no returns in loops, trivial subscripted assignment).
//! - [`typecheck`]: unification-based checking of Core programs.
//! - [`interpreter`]: a strict reference evaluator for Core, for
//!   development-time execution and semantics tests.

pub mod interpreter;
pub mod lint;
pub mod typecheck;
pub mod vars;

pub use lint::{check_preconditions, LintError};
pub use typecheck::{typecheck_program, TypeError};
pub use vars::{analyze_max, analyze_min, does_always_return, Analysis};
