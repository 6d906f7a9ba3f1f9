//! Translation of Source types into Core types.
//!
//! Structure is preserved; the two Source-only types are rejected here,
//! which is what makes `str` and side-effect annotations unusable anywhere
//! the lowering looks at a type.

use purelift_core::loc::Loc;
use purelift_core::{core, source};

use crate::error::LowerError;

pub(crate) fn lower_type(ty: &source::Type, loc: Option<Loc>) -> Result<core::Type, LowerError> {
    match ty {
        source::Type::Var(name) => Ok(core::Type::Var(name.clone())),
        source::Type::Int => Ok(core::Type::Int),
        source::Type::Bool => Ok(core::Type::Bool),
        source::Type::List(elem) => Ok(core::Type::list(lower_type(elem, loc)?)),
        source::Type::Tuple(elems) => Ok(core::Type::Tuple(
            elems
                .iter()
                .map(|t| lower_type(t, loc))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        source::Type::Callable(params, ret) => Ok(core::Type::fun(
            params
                .iter()
                .map(|t| lower_type(t, loc))
                .collect::<Result<Vec<_>, _>>()?,
            lower_type(ret, loc)?,
        )),
        source::Type::Str => Err(LowerError::semantic(
            "cannot use `str` type outside main",
            loc,
        )),
        source::Type::SideEffect => Err(LowerError::semantic(
            "side-effect type must only be used as expression-statement",
            loc,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_is_preserved() {
        let ty = source::Type::Callable(
            vec![
                source::Type::Int,
                source::Type::List(Box::new(source::Type::Var("a".into()))),
            ],
            Box::new(source::Type::Tuple(vec![source::Type::Bool])),
        );
        assert_eq!(
            lower_type(&ty, None),
            Ok(core::Type::fun(
                vec![core::Type::Int, core::Type::list(core::Type::var("a"))],
                core::Type::Tuple(vec![core::Type::Bool]),
            ))
        );
    }

    #[test]
    fn str_is_rejected_even_when_nested() {
        let ty = source::Type::List(Box::new(source::Type::Str));
        assert!(matches!(
            lower_type(&ty, None),
            Err(LowerError::Semantic { .. })
        ));
    }

    #[test]
    fn side_effect_type_is_rejected() {
        assert!(matches!(
            lower_type(&source::Type::SideEffect, None),
            Err(LowerError::Semantic { .. })
        ));
    }
}
