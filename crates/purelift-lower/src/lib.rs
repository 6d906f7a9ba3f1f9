//! The Source→Core lowering pass.
//!
//! Rewrites a restricted imperative Source program into a pure, typed
//! lambda-calculus Core program: assignments become `let` chains, `for`
//! loops become `foldl`s over tuples of live variables, fall-through `if`s
//! become tuple-valued conditionals, subscripted assignment becomes
//! functional update, and comprehensions become `map`/`filter` chains. A
//! final rewrite thunks every conditional so strict downstream evaluation
//! preserves the Source semantics, and the result is validated by the Core
//! type checker.
//!
//! The pipeline is [`run`] (or [`run_with_supply`] to pin the fresh-name
//! counter): preconditions → lowering → eager-wrap → type check. The first
//! error aborts; no partial IR is produced.

mod assign;
pub mod eager;
mod env;
pub mod error;
mod expr;
mod stmt;
mod ty;

pub use eager::{eager_wrap, is_fully_wrapped};
pub use error::LowerError;

use purelift_check::check_preconditions;
use purelift_check::typecheck_program;
use purelift_core::name::NameSupply;
use purelift_core::{core, source};

use crate::env::ScopeEnv;
use crate::ty::lower_type;

/// Shared state of one lowering run: the fresh-name supply and the stack of
/// currently-defined Source names. Owned for the duration of a single
/// [`run`] and discarded afterwards.
pub(crate) struct Lowerer {
    pub(crate) supply: NameSupply,
    pub(crate) env: ScopeEnv,
}

impl Lowerer {
    /// Runs `f` in a child scope; any `define` inside is rolled back.
    pub(crate) fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        let depth = self.env.depth();
        let result = f(self);
        self.env.truncate(depth);
        result
    }

    fn lower_toplevel(
        &mut self,
        stmts: &[source::ToplevelStmt],
    ) -> Result<core::Toplevel, LowerError> {
        let Some((head, rest)) = stmts.split_first() else {
            // The entry function is named `solve` by convention.
            return Ok(core::Toplevel::ResultExpr(core::Expr::var("solve")));
        };
        match head {
            source::ToplevelStmt::AnnAssign(name, ty, value) => {
                let ty = lower_type(ty, value.loc)?;
                let value = self.lower_expr(value)?;
                self.env.define(name);
                Ok(core::Toplevel::Let(
                    name.clone(),
                    ty,
                    value,
                    Box::new(self.lower_toplevel(rest)?),
                ))
            }
            source::ToplevelStmt::FunctionDef {
                name,
                args,
                ret,
                body,
            } => {
                let mut params = Vec::with_capacity(args.len());
                for (arg, ty) in args {
                    params.push((arg.clone(), lower_type(ty, None)?));
                }
                let ret = lower_type(ret, None)?;
                // Defined before the body so the function can recurse.
                self.env.define(name);
                let body = self.scoped(|s| {
                    for (arg, _) in args {
                        s.env.define(arg);
                    }
                    s.lower_statements(body, &[])
                })?;
                Ok(core::Toplevel::LetRec(
                    name.clone(),
                    core::Params::from(params),
                    ret,
                    body,
                    Box::new(self.lower_toplevel(rest)?),
                ))
            }
            // TODO: carry toplevel asserts into Core as optimization hints.
            source::ToplevelStmt::Assert(_) => self.lower_toplevel(rest),
        }
    }
}

/// Lowers a Source program with a fresh name supply.
pub fn run(program: &source::Program) -> Result<core::Program, LowerError> {
    run_with_supply(program, NameSupply::new())
}

/// Lowers a Source program with a caller-provided name supply. For a fixed
/// program and a fixed initial counter the output is byte-identical across
/// runs.
pub fn run_with_supply(
    program: &source::Program,
    supply: NameSupply,
) -> Result<core::Program, LowerError> {
    tracing::debug!("checking lowering preconditions");
    check_preconditions(program)?;

    tracing::debug!("lowering toplevel declarations");
    let mut lowerer = Lowerer {
        supply,
        env: ScopeEnv::new(),
    };
    let toplevel = lowerer.lower_toplevel(&program.stmts)?;
    let lowered = core::Program { toplevel };

    tracing::debug!("eager-wrapping conditionals");
    let wrapped = eager::eager_wrap(&lowered);

    tracing::debug!("type checking the lowered program");
    typecheck_program(&wrapped)?;
    Ok(wrapped)
}
