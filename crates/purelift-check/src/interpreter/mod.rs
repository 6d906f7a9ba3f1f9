//! Reference interpreter for Core programs.
//!
//! Development-time execution without any code generation: walks the
//! toplevel spine building an environment, evaluates the result expression,
//! and applies it to the provided arguments. Used by the semantics tests to
//! compare lowered programs against the behavior of the imperative
//! originals.
//!
//! Evaluation is strict, which is exactly why the lowering's eager-wrap
//! pass exists: by the time a program reaches this interpreter every
//! conditional's branches are thunks, so recursion through `if` terminates.

pub mod error;
pub mod eval;
pub mod value;

pub use error::RuntimeError;
pub use eval::{apply, eval};
pub use value::{Closure, Env, Value};

use std::rc::Rc;

use purelift_core::core::{Program, Toplevel};

/// Evaluates a program and applies its result (conventionally the `solve`
/// function) to `args`. Pass no arguments to get the result value itself.
pub fn run_program(program: &Program, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let mut env = Env::new();
    let mut toplevel = &program.toplevel;
    loop {
        match toplevel {
            Toplevel::Let(name, _ty, value, rest) => {
                let v = eval(&env, value)?;
                env.insert(name.clone(), v);
                toplevel = rest;
            }
            Toplevel::LetRec(name, params, _ret, body, rest) => {
                let closure = Closure {
                    rec_name: Some(name.clone()),
                    params: params.clone(),
                    body: body.clone(),
                    env: env.clone(),
                };
                env.insert(name.clone(), Value::Closure(Rc::new(closure)));
                toplevel = rest;
            }
            Toplevel::ResultExpr(result) => {
                let v = eval(&env, result)?;
                if args.is_empty() {
                    return Ok(v);
                }
                if let Value::Closure(closure) = &v {
                    if closure.params.len() != args.len() {
                        return Err(RuntimeError::WrongArgumentCount {
                            expected: closure.params.len(),
                            actual: args.len(),
                        });
                    }
                }
                return apply(v, args);
            }
        }
    }
}
