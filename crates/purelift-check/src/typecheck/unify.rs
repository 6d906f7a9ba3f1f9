//! First-order unification over Core types.
//!
//! The substitution is a plain map from type-variable names to types;
//! variables are chased shallowly at each unification step and resolved
//! deeply only when a final type is needed. Function types unify up to
//! currying: `(a, b) -> r` is the same function as `(a) -> ((b) -> r)`, so
//! mismatched parameter counts fold the remainder into the return side. The
//! nullary function (thunk) type `() -> r` is distinct from `r` and never
//! collapses — eager-wrapped conditionals depend on that distinction.

use std::collections::HashMap;

use purelift_core::core::Type;
use purelift_core::name::TypeName;

use super::diagnostics::TypeError;

/// A substitution from type variables to types.
#[derive(Debug, Clone, Default)]
pub struct Subst {
    map: HashMap<TypeName, Type>,
}

impl Subst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows variable bindings at the root only.
    fn shallow(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        while let Type::Var(name) = &current {
            match self.map.get(name) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        current
    }

    /// Applies the substitution throughout a type.
    pub fn resolve(&self, ty: &Type) -> Type {
        match self.shallow(ty) {
            Type::Var(name) => Type::Var(name),
            Type::Int => Type::Int,
            Type::Bool => Type::Bool,
            Type::List(elem) => Type::list(self.resolve(&elem)),
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|t| self.resolve(t)).collect()),
            Type::Fun(params, ret) => Type::fun(
                params.iter().map(|t| self.resolve(t)).collect(),
                self.resolve(&ret),
            ),
        }
    }

    fn occurs(&self, var: &TypeName, ty: &Type) -> bool {
        match self.shallow(ty) {
            Type::Var(name) => name == *var,
            Type::Int | Type::Bool => false,
            Type::List(elem) => self.occurs(var, &elem),
            Type::Tuple(elems) => elems.iter().any(|t| self.occurs(var, t)),
            Type::Fun(params, ret) => {
                params.iter().any(|t| self.occurs(var, t)) || self.occurs(var, &ret)
            }
        }
    }

    fn bind(&mut self, var: TypeName, ty: Type) -> Result<(), TypeError> {
        if let Type::Var(name) = &ty {
            if *name == var {
                return Ok(());
            }
        }
        if self.occurs(&var, &ty) {
            return Err(TypeError::Occurs {
                var,
                ty: self.resolve(&ty),
            });
        }
        self.map.insert(var, ty);
        Ok(())
    }

    /// Makes two types equal, extending the substitution.
    pub fn unify(&mut self, a: &Type, b: &Type) -> Result<(), TypeError> {
        let a = self.shallow(a);
        let b = self.shallow(b);
        match (a, b) {
            (Type::Var(x), ty) => self.bind(x, ty),
            (ty, Type::Var(y)) => self.bind(y, ty),
            (Type::Int, Type::Int) | (Type::Bool, Type::Bool) => Ok(()),
            (Type::List(x), Type::List(y)) => self.unify(&x, &y),
            (Type::Tuple(xs), Type::Tuple(ys)) => {
                if xs.len() != ys.len() {
                    return Err(self.mismatch(&Type::Tuple(xs), &Type::Tuple(ys)));
                }
                for (x, y) in xs.iter().zip(&ys) {
                    self.unify(x, y)?;
                }
                Ok(())
            }
            (Type::Fun(ps1, r1), Type::Fun(ps2, r2)) => self.unify_fun(ps1, *r1, ps2, *r2),
            (a, b) => Err(self.mismatch(&a, &b)),
        }
    }

    fn unify_fun(
        &mut self,
        ps1: Vec<Type>,
        r1: Type,
        ps2: Vec<Type>,
        r2: Type,
    ) -> Result<(), TypeError> {
        // Thunks only unify with thunks.
        if ps1.is_empty() != ps2.is_empty() {
            return Err(self.mismatch(
                &Type::fun(ps1, r1),
                &Type::fun(ps2, r2),
            ));
        }
        let n = ps1.len().min(ps2.len());
        for (x, y) in ps1[..n].iter().zip(&ps2[..n]) {
            self.unify(x, y)?;
        }
        match (ps1.len() > n, ps2.len() > n) {
            (false, false) => self.unify(&r1, &r2),
            (true, false) => self.unify(&Type::fun(ps1[n..].to_vec(), r1), &r2),
            (false, true) => self.unify(&r1, &Type::fun(ps2[n..].to_vec(), r2)),
            (true, true) => unreachable!("n is the minimum of both lengths"),
        }
    }

    fn mismatch(&self, expected: &Type, actual: &Type) -> TypeError {
        TypeError::Mismatch {
            expected: self.resolve(expected),
            actual: self.resolve(actual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Type {
        Type::var(name)
    }

    #[test]
    fn binds_a_variable() {
        let mut s = Subst::new();
        s.unify(&var("a"), &Type::Int).unwrap();
        assert_eq!(s.resolve(&var("a")), Type::Int);
    }

    #[test]
    fn unifies_through_structure() {
        let mut s = Subst::new();
        s.unify(
            &Type::list(var("a")),
            &Type::list(Type::Tuple(vec![Type::Int, var("b")])),
        )
        .unwrap();
        s.unify(&var("b"), &Type::Bool).unwrap();
        assert_eq!(
            s.resolve(&var("a")),
            Type::Tuple(vec![Type::Int, Type::Bool])
        );
    }

    #[test]
    fn curried_functions_fold_the_remainder() {
        let mut s = Subst::new();
        // (int, bool) -> int  ~  (int) -> ?r
        s.unify(
            &Type::fun(vec![Type::Int, Type::Bool], Type::Int),
            &Type::fun(vec![Type::Int], var("r")),
        )
        .unwrap();
        assert_eq!(
            s.resolve(&var("r")),
            Type::fun(vec![Type::Bool], Type::Int)
        );
    }

    #[test]
    fn thunk_type_does_not_collapse() {
        let mut s = Subst::new();
        let err = s.unify(&Type::fun(vec![], Type::Int), &Type::fun(vec![Type::Int], Type::Int));
        assert!(err.is_err());
    }

    #[test]
    fn occurs_check_fires() {
        let mut s = Subst::new();
        let err = s.unify(&var("a"), &Type::list(var("a")));
        assert!(matches!(err, Err(TypeError::Occurs { .. })));
    }

    #[test]
    fn mismatch_reports_resolved_types() {
        let mut s = Subst::new();
        s.unify(&var("a"), &Type::Int).unwrap();
        let err = s.unify(&var("a"), &Type::Bool).unwrap_err();
        assert_eq!(
            err,
            TypeError::Mismatch {
                expected: Type::Int,
                actual: Type::Bool
            }
        );
    }
}
