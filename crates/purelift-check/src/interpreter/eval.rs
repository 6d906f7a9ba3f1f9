//! Strict evaluation of Core expressions.
//!
//! The evaluator assumes the program passed the type checker and, in
//! particular, that every `if` has been eager-wrapped: branches arrive as
//! thunks, so evaluating all arguments of every application is safe.
//! Arithmetic is checked `i64` with trap semantics; division, modulo, and
//! the range builtins follow the Source language's (Python's) conventions.

use std::rc::Rc;

use purelift_core::core::{Builtin, Expr, Lit, Params};

use super::error::RuntimeError;
use super::value::{compare, value_eq, Closure, Env, Value};

/// Evaluates one expression under an environment.
pub fn eval(env: &Env, expr: &Expr) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Var(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnboundVariable { name: name.clone() }),
        Expr::Lit(lit) => Ok(match lit {
            Lit::Int(n) => Value::Int(*n),
            Lit::Bool(b) => Value::Bool(*b),
            Lit::Nil(_) => Value::List(Vec::new()),
            Lit::Builtin(b) => Value::Builtin {
                builtin: b.clone(),
                args: Vec::new(),
            },
        }),
        Expr::App(func, args) => {
            let func_v = eval(env, func)?;
            let mut arg_vs = Vec::with_capacity(args.len());
            for arg in args {
                arg_vs.push(eval(env, arg)?);
            }
            apply(func_v, arg_vs)
        }
        Expr::Lam(params, body) => Ok(Value::Closure(Rc::new(Closure {
            rec_name: None,
            params: params.clone(),
            body: (**body).clone(),
            env: env.clone(),
        }))),
        Expr::Let(name, _ty, value, body) => {
            let v = eval(env, value)?;
            let mut inner = env.clone();
            inner.insert(name.clone(), v);
            eval(&inner, body)
        }
    }
}

/// Applies a function value to already-evaluated arguments. Partial
/// application returns a new function value; over-application re-applies the
/// result; zero arguments forces a thunk.
pub fn apply(func: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match func {
        Value::Closure(closure) => {
            let mut call_env = closure.env.clone();
            if let Some(name) = &closure.rec_name {
                call_env.insert(name.clone(), Value::Closure(Rc::clone(&closure)));
            }
            if closure.params.is_empty() {
                let result = eval(&call_env, &closure.body)?;
                if args.is_empty() {
                    Ok(result)
                } else {
                    apply(result, args)
                }
            } else if args.is_empty() {
                Ok(Value::Closure(closure))
            } else if args.len() < closure.params.len() {
                for ((param, _), value) in closure.params.iter().zip(args.iter()) {
                    call_env.insert(param.clone(), value.clone());
                }
                let remaining: Params = closure.params[args.len()..].iter().cloned().collect();
                Ok(Value::Closure(Rc::new(Closure {
                    rec_name: None,
                    params: remaining,
                    body: closure.body.clone(),
                    env: call_env,
                })))
            } else {
                let n = closure.params.len();
                for ((param, _), value) in closure.params.iter().zip(args.iter()) {
                    call_env.insert(param.clone(), value.clone());
                }
                let result = eval(&call_env, &closure.body)?;
                let rest = args[n..].to_vec();
                if rest.is_empty() {
                    Ok(result)
                } else {
                    apply(result, rest)
                }
            }
        }
        Value::Builtin {
            builtin,
            args: mut have,
        } => {
            have.extend(args);
            let arity = builtin.arity();
            if have.len() < arity {
                return Ok(Value::Builtin {
                    builtin,
                    args: have,
                });
            }
            let rest: Vec<Value> = have.drain(arity..).collect();
            let result = eval_builtin(&builtin, &have)?;
            if rest.is_empty() {
                Ok(result)
            } else {
                apply(result, rest)
            }
        }
        other => Err(RuntimeError::NotCallable {
            got: other.type_name().to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Builtin evaluation
// ---------------------------------------------------------------------------

fn as_int(builtin: &Builtin, value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(wrong(builtin, other)),
    }
}

fn as_bool(builtin: &Builtin, value: &Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(wrong(builtin, other)),
    }
}

fn as_list<'a>(builtin: &Builtin, value: &'a Value) -> Result<&'a [Value], RuntimeError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(wrong(builtin, other)),
    }
}

fn wrong(builtin: &Builtin, value: &Value) -> RuntimeError {
    RuntimeError::WrongOperand {
        builtin: builtin.name(),
        got: value.type_name().to_string(),
    }
}

fn checked(result: Option<i64>) -> Result<i64, RuntimeError> {
    result.ok_or(RuntimeError::IntegerOverflow)
}

fn floor_div(a: i64, b: i64) -> Result<i64, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    if a == i64::MIN && b == -1 {
        return Err(RuntimeError::IntegerOverflow);
    }
    let q = a / b;
    let r = a % b;
    Ok(if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q })
}

fn floor_mod(a: i64, b: i64) -> Result<i64, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    let r = a % b;
    Ok(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
}

fn ceil_div(a: i64, b: i64) -> Result<i64, RuntimeError> {
    let q = floor_div(a, b)?;
    if floor_mod(a, b)? != 0 {
        checked(q.checked_add(1))
    } else {
        Ok(q)
    }
}

fn ceil_mod(a: i64, b: i64) -> Result<i64, RuntimeError> {
    let q = ceil_div(a, b)?;
    checked(q.checked_mul(b).and_then(|qb| a.checked_sub(qb)))
}

fn int_pow(base: i64, exp: i64) -> Result<i64, RuntimeError> {
    if exp < 0 {
        return Err(RuntimeError::NegativeExponent);
    }
    let mut result: i64 = 1;
    let mut base = base;
    let mut exp = exp as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = checked(result.checked_mul(base))?;
        }
        exp >>= 1;
        if exp > 0 {
            base = checked(base.checked_mul(base))?;
        }
    }
    Ok(result)
}

fn gcd(a: i64, b: i64) -> Result<i64, RuntimeError> {
    let mut x = a.unsigned_abs();
    let mut y = b.unsigned_abs();
    while y != 0 {
        let r = x % y;
        x = y;
        y = r;
    }
    i64::try_from(x).map_err(|_| RuntimeError::IntegerOverflow)
}

fn lcm(a: i64, b: i64) -> Result<i64, RuntimeError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    let g = gcd(a, b)? as i128;
    let l = ((a as i128) / g * (b as i128)).abs();
    i64::try_from(l).map_err(|_| RuntimeError::IntegerOverflow)
}

fn mod_pow(base: i64, exp: i64, modulus: i64) -> Result<i64, RuntimeError> {
    if modulus <= 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    if exp < 0 {
        let inv = mod_inv(base, modulus)?;
        let pos = exp.checked_neg().ok_or(RuntimeError::IntegerOverflow)?;
        return mod_pow(inv, pos, modulus);
    }
    let m = modulus as i128;
    let mut result: i128 = 1 % m;
    let mut base = (base as i128).rem_euclid(m);
    let mut exp = exp as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % m;
        }
        exp >>= 1;
        base = base * base % m;
    }
    Ok(result as i64)
}

fn mod_inv(a: i64, modulus: i64) -> Result<i64, RuntimeError> {
    if modulus <= 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    // Extended Euclid on (a mod m, m).
    let m = modulus as i128;
    let mut r0 = (a as i128).rem_euclid(m);
    let mut r1 = m;
    let (mut s0, mut s1) = (1i128, 0i128);
    while r1 != 0 {
        let q = r0 / r1;
        (r0, r1) = (r1, r0 - q * r1);
        (s0, s1) = (s1, s0 - q * s1);
    }
    if r0 != 1 {
        return Err(RuntimeError::NoModularInverse);
    }
    Ok(s0.rem_euclid(m) as i64)
}

fn fact(n: i64) -> Result<i64, RuntimeError> {
    if n < 0 {
        return Err(RuntimeError::NegativeOperand {
            builtin: "fact".into(),
        });
    }
    let mut result: i64 = 1;
    for i in 2..=n {
        result = checked(result.checked_mul(i))?;
    }
    Ok(result)
}

fn choose(n: i64, k: i64) -> Result<i64, RuntimeError> {
    if n < 0 {
        return Err(RuntimeError::NegativeOperand {
            builtin: "choose".into(),
        });
    }
    if k < 0 || k > n {
        return Ok(0);
    }
    let k = k.min(n - k);
    let mut result: i64 = 1;
    for i in 0..k {
        result = checked(result.checked_mul(n - i))?;
        result /= i + 1;
    }
    Ok(result)
}

fn permute(n: i64, k: i64) -> Result<i64, RuntimeError> {
    if n < 0 || k < 0 {
        return Err(RuntimeError::NegativeOperand {
            builtin: "permute".into(),
        });
    }
    if k > n {
        return Ok(0);
    }
    let mut result: i64 = 1;
    for i in 0..k {
        result = checked(result.checked_mul(n - i))?;
    }
    Ok(result)
}

fn multichoose(n: i64, k: i64) -> Result<i64, RuntimeError> {
    if n < 0 || k < 0 {
        return Err(RuntimeError::NegativeOperand {
            builtin: "multichoose".into(),
        });
    }
    if n == 0 {
        return Ok(if k == 0 { 1 } else { 0 });
    }
    choose(checked(n.checked_add(k - 1))?, k)
}

fn shift_amount(s: i64) -> Result<u32, RuntimeError> {
    if !(0..=63).contains(&s) {
        return Err(RuntimeError::ShiftOutOfRange);
    }
    Ok(s as u32)
}

fn index_list(items: &[Value], index: i64) -> Result<usize, RuntimeError> {
    if index < 0 || index as usize >= items.len() {
        return Err(RuntimeError::IndexOutOfBounds {
            index,
            len: items.len(),
        });
    }
    Ok(index as usize)
}

fn int_range(lo: i64, hi: i64, step: i64) -> Result<Vec<Value>, RuntimeError> {
    if step == 0 {
        return Err(RuntimeError::ZeroStep);
    }
    let mut out = Vec::new();
    let mut i = lo;
    if step > 0 {
        while i < hi {
            out.push(Value::Int(i));
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else {
        while i > hi {
            out.push(Value::Int(i));
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    Ok(out)
}

/// Runs one saturated builtin application. `args.len()` equals the builtin's
/// arity; extra arguments were peeled off by [`apply`].
pub(crate) fn eval_builtin(builtin: &Builtin, args: &[Value]) -> Result<Value, RuntimeError> {
    use std::cmp::Ordering;
    let int1 = |f: &dyn Fn(i64) -> Result<i64, RuntimeError>| -> Result<Value, RuntimeError> {
        Ok(Value::Int(f(as_int(builtin, &args[0])?)?))
    };
    let int2 = |f: &dyn Fn(i64, i64) -> Result<i64, RuntimeError>| -> Result<Value, RuntimeError> {
        Ok(Value::Int(f(
            as_int(builtin, &args[0])?,
            as_int(builtin, &args[1])?,
        )?))
    };
    match builtin {
        Builtin::Negate => int1(&|a| checked(a.checked_neg())),
        Builtin::Plus => int2(&|a, b| checked(a.checked_add(b))),
        Builtin::Minus => int2(&|a, b| checked(a.checked_sub(b))),
        Builtin::Mult => int2(&|a, b| checked(a.checked_mul(b))),
        Builtin::FloorDiv => int2(&floor_div),
        Builtin::FloorMod => int2(&floor_mod),
        Builtin::CeilDiv => int2(&ceil_div),
        Builtin::CeilMod => int2(&ceil_mod),
        Builtin::Pow => int2(&int_pow),
        Builtin::Abs => int1(&|a| checked(a.checked_abs())),
        Builtin::Gcd => int2(&gcd),
        Builtin::Lcm => int2(&lcm),
        Builtin::Min2(_) => Ok(match compare(&args[0], &args[1])? {
            Ordering::Greater => args[1].clone(),
            _ => args[0].clone(),
        }),
        Builtin::Max2(_) => Ok(match compare(&args[0], &args[1])? {
            Ordering::Less => args[1].clone(),
            _ => args[0].clone(),
        }),
        Builtin::ModPow => {
            let b = as_int(builtin, &args[0])?;
            let e = as_int(builtin, &args[1])?;
            let m = as_int(builtin, &args[2])?;
            Ok(Value::Int(mod_pow(b, e, m)?))
        }
        Builtin::ModInv => int2(&mod_inv),
        Builtin::Not => Ok(Value::Bool(!as_bool(builtin, &args[0])?)),
        Builtin::And => Ok(Value::Bool(
            as_bool(builtin, &args[0])? && as_bool(builtin, &args[1])?,
        )),
        Builtin::Or => Ok(Value::Bool(
            as_bool(builtin, &args[0])? || as_bool(builtin, &args[1])?,
        )),
        Builtin::Implies => Ok(Value::Bool(
            !as_bool(builtin, &args[0])? || as_bool(builtin, &args[1])?,
        )),
        Builtin::BitNot => int1(&|a| Ok(!a)),
        Builtin::BitAnd => int2(&|a, b| Ok(a & b)),
        Builtin::BitOr => int2(&|a, b| Ok(a | b)),
        Builtin::BitXor => int2(&|a, b| Ok(a ^ b)),
        Builtin::BitLeftShift => int2(&|a, s| {
            let s = shift_amount(s)?;
            i64::try_from((a as i128) << s).map_err(|_| RuntimeError::IntegerOverflow)
        }),
        Builtin::BitRightShift => int2(&|a, s| Ok(a >> shift_amount(s)?)),
        Builtin::If(_) => Ok(if as_bool(builtin, &args[0])? {
            args[1].clone()
        } else {
            args[2].clone()
        }),
        Builtin::Equal(_) => Ok(Value::Bool(value_eq(&args[0], &args[1])?)),
        Builtin::NotEqual(_) => Ok(Value::Bool(!value_eq(&args[0], &args[1])?)),
        Builtin::LessThan(_) => Ok(Value::Bool(compare(&args[0], &args[1])? == Ordering::Less)),
        Builtin::LessEqual(_) => Ok(Value::Bool(compare(&args[0], &args[1])? != Ordering::Greater)),
        Builtin::GreaterThan(_) => {
            Ok(Value::Bool(compare(&args[0], &args[1])? == Ordering::Greater))
        }
        Builtin::GreaterEqual(_) => {
            Ok(Value::Bool(compare(&args[0], &args[1])? != Ordering::Less))
        }
        Builtin::Cons(_) => {
            let mut out = vec![args[0].clone()];
            out.extend_from_slice(as_list(builtin, &args[1])?);
            Ok(Value::List(out))
        }
        Builtin::Snoc(_) => {
            let mut out = as_list(builtin, &args[0])?.to_vec();
            out.push(args[1].clone());
            Ok(Value::List(out))
        }
        Builtin::Foldl(_, _) => {
            let step = args[0].clone();
            let mut acc = args[1].clone();
            for item in as_list(builtin, &args[2])? {
                acc = apply(step.clone(), vec![acc, item.clone()])?;
            }
            Ok(acc)
        }
        Builtin::Len(_) => Ok(Value::Int(as_list(builtin, &args[0])?.len() as i64)),
        Builtin::Map(_, _) => {
            let f = args[0].clone();
            let mut out = Vec::new();
            for item in as_list(builtin, &args[1])? {
                out.push(apply(f.clone(), vec![item.clone()])?);
            }
            Ok(Value::List(out))
        }
        Builtin::Filter(_) => {
            let pred = args[0].clone();
            let mut out = Vec::new();
            for item in as_list(builtin, &args[1])? {
                match apply(pred.clone(), vec![item.clone()])? {
                    Value::Bool(true) => out.push(item.clone()),
                    Value::Bool(false) => {}
                    other => return Err(wrong(builtin, &other)),
                }
            }
            Ok(Value::List(out))
        }
        Builtin::At(_) => {
            let items = as_list(builtin, &args[0])?;
            let i = index_list(items, as_int(builtin, &args[1])?)?;
            Ok(items[i].clone())
        }
        Builtin::SetAt(_) => {
            let mut items = as_list(builtin, &args[0])?.to_vec();
            let i = index_list(&items, as_int(builtin, &args[1])?)?;
            items[i] = args[2].clone();
            Ok(Value::List(items))
        }
        Builtin::Elem(_) => {
            for item in as_list(builtin, &args[1])? {
                if value_eq(&args[0], item)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        Builtin::Sum => {
            let mut acc: i64 = 0;
            for item in as_list(builtin, &args[0])? {
                acc = checked(acc.checked_add(as_int(builtin, item)?))?;
            }
            Ok(Value::Int(acc))
        }
        Builtin::Product => {
            let mut acc: i64 = 1;
            for item in as_list(builtin, &args[0])? {
                acc = checked(acc.checked_mul(as_int(builtin, item)?))?;
            }
            Ok(Value::Int(acc))
        }
        Builtin::Range1 => Ok(Value::List(int_range(0, as_int(builtin, &args[0])?, 1)?)),
        Builtin::Range2 => Ok(Value::List(int_range(
            as_int(builtin, &args[0])?,
            as_int(builtin, &args[1])?,
            1,
        )?)),
        Builtin::Range3 => Ok(Value::List(int_range(
            as_int(builtin, &args[0])?,
            as_int(builtin, &args[1])?,
            as_int(builtin, &args[2])?,
        )?)),
        Builtin::All => {
            for item in as_list(builtin, &args[0])? {
                if !as_bool(builtin, item)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        Builtin::Any => {
            for item in as_list(builtin, &args[0])? {
                if as_bool(builtin, item)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        Builtin::Sorted(_) => {
            let mut items = as_list(builtin, &args[0])?.to_vec();
            let mut failure = None;
            items.sort_by(|a, b| match compare(a, b) {
                Ok(order) => order,
                Err(e) => {
                    failure.get_or_insert(e);
                    Ordering::Equal
                }
            });
            match failure {
                Some(e) => Err(e),
                None => Ok(Value::List(items)),
            }
        }
        Builtin::Reversed(_) => {
            let mut items = as_list(builtin, &args[0])?.to_vec();
            items.reverse();
            Ok(Value::List(items))
        }
        Builtin::Min1(_) | Builtin::Max1(_) => {
            let items = as_list(builtin, &args[0])?;
            let mut best = items.first().ok_or(RuntimeError::EmptyList)?;
            let keep = if matches!(builtin, Builtin::Min1(_)) {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            for item in &items[1..] {
                if compare(item, best)? == keep {
                    best = item;
                }
            }
            Ok(best.clone())
        }
        Builtin::ArgMin(_) | Builtin::ArgMax(_) => {
            let items = as_list(builtin, &args[0])?;
            let mut best = items.first().ok_or(RuntimeError::EmptyList)?;
            let mut best_index = 0usize;
            let keep = if matches!(builtin, Builtin::ArgMin(_)) {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            for (i, item) in items.iter().enumerate().skip(1) {
                if compare(item, best)? == keep {
                    best = item;
                    best_index = i;
                }
            }
            Ok(Value::Int(best_index as i64))
        }
        Builtin::Fact => int1(&fact),
        Builtin::Choose => int2(&choose),
        Builtin::Permute => int2(&permute),
        Builtin::MultiChoose => int2(&multichoose),
        Builtin::Tuple(_) => Ok(Value::Tuple(args.to_vec())),
        Builtin::Proj(_, i) => match &args[0] {
            Value::Tuple(items) => items.get(*i).cloned().ok_or(RuntimeError::IndexOutOfBounds {
                index: *i as i64,
                len: items.len(),
            }),
            other => Err(wrong(builtin, other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_division_follows_the_divisor_sign() {
        assert_eq!(floor_div(7, 2), Ok(3));
        assert_eq!(floor_div(-7, 2), Ok(-4));
        assert_eq!(floor_div(7, -2), Ok(-4));
        assert_eq!(floor_div(-7, -2), Ok(3));
        assert_eq!(floor_mod(-7, 2), Ok(1));
        assert_eq!(floor_mod(7, -2), Ok(-1));
    }

    #[test]
    fn ceil_division_is_the_mirror() {
        assert_eq!(ceil_div(7, 2), Ok(4));
        assert_eq!(ceil_div(-7, 2), Ok(-3));
        assert_eq!(ceil_div(6, 2), Ok(3));
        assert_eq!(ceil_mod(7, 2), Ok(-1));
    }

    #[test]
    fn division_by_zero_traps() {
        assert_eq!(floor_div(1, 0), Err(RuntimeError::DivisionByZero));
        assert_eq!(floor_mod(1, 0), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn pow_and_modpow() {
        assert_eq!(int_pow(2, 10), Ok(1024));
        assert_eq!(int_pow(0, 0), Ok(1));
        assert_eq!(int_pow(2, -1), Err(RuntimeError::NegativeExponent));
        assert_eq!(mod_pow(2, 10, 1000), Ok(24));
        assert_eq!(mod_pow(3, 0, 7), Ok(1));
        // Negative exponent goes through the inverse: 3 * 5 = 15 = 1 mod 7.
        assert_eq!(mod_pow(3, -1, 7), Ok(5));
    }

    #[test]
    fn modular_inverse() {
        assert_eq!(mod_inv(3, 7), Ok(5));
        assert_eq!(mod_inv(2, 4), Err(RuntimeError::NoModularInverse));
    }

    #[test]
    fn combinatorics() {
        assert_eq!(fact(0), Ok(1));
        assert_eq!(fact(5), Ok(120));
        assert_eq!(choose(5, 2), Ok(10));
        assert_eq!(choose(5, 7), Ok(0));
        assert_eq!(permute(5, 2), Ok(20));
        assert_eq!(multichoose(3, 2), Ok(6));
    }

    #[test]
    fn ranges_follow_python_conventions() {
        assert_eq!(
            int_range(0, 3, 1),
            Ok(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(int_range(3, 3, 1), Ok(vec![]));
        assert_eq!(int_range(5, 2, 1), Ok(vec![]));
        assert_eq!(
            int_range(5, 2, -1),
            Ok(vec![Value::Int(5), Value::Int(4), Value::Int(3)])
        );
        assert_eq!(
            int_range(1, 6, 2),
            Ok(vec![Value::Int(1), Value::Int(3), Value::Int(5)])
        );
        assert_eq!(int_range(0, 1, 0), Err(RuntimeError::ZeroStep));
    }

    #[test]
    fn overflow_traps() {
        assert_eq!(
            eval_builtin(&Builtin::Plus, &[Value::Int(i64::MAX), Value::Int(1)]),
            Err(RuntimeError::IntegerOverflow)
        );
    }

    #[test]
    fn partial_application_of_builtins() {
        let plus_one = apply(
            Value::Builtin {
                builtin: Builtin::Plus,
                args: Vec::new(),
            },
            vec![Value::Int(1)],
        )
        .unwrap();
        assert_eq!(apply(plus_one, vec![Value::Int(41)]), Ok(Value::Int(42)));
    }

    proptest::proptest! {
        /// `a == q*b + r`, with `r` in `[0, b)` or `(b, 0]` by the divisor's
        /// sign — the Source language's division contract.
        #[test]
        fn floor_division_identity(a in -10_000i64..10_000, b in -100i64..100) {
            proptest::prop_assume!(b != 0);
            let q = floor_div(a, b).unwrap();
            let r = floor_mod(a, b).unwrap();
            proptest::prop_assert_eq!(q * b + r, a);
            if b > 0 {
                proptest::prop_assert!((0..b).contains(&r));
            } else {
                proptest::prop_assert!((b + 1..=0).contains(&r));
            }
        }

        #[test]
        fn ceil_division_identity(a in -10_000i64..10_000, b in -100i64..100) {
            proptest::prop_assume!(b != 0);
            let q = ceil_div(a, b).unwrap();
            let r = ceil_mod(a, b).unwrap();
            proptest::prop_assert_eq!(q * b + r, a);
        }

        #[test]
        fn range_length_matches_python(lo in -50i64..50, hi in -50i64..50, step in 1i64..10) {
            let ascending = int_range(lo, hi, step).unwrap();
            let expected = if hi > lo { ((hi - lo) + step - 1) / step } else { 0 };
            proptest::prop_assert_eq!(ascending.len() as i64, expected);
        }
    }
}
