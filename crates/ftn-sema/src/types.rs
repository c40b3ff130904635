//! Declared types: intrinsic type specs, derived type specs and their
//! type-parameter values.

use std::fmt;

use ftn_identity::{DerivedTypeSpecId, Name, ScopeId, SymbolId};

use crate::evaluate::{self, Expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Integer,
    Real,
    Complex,
    Character,
    Logical,
    Derived,
}

impl TypeCategory {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeCategory::Integer | TypeCategory::Real | TypeCategory::Complex
        )
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCategory::Integer => "INTEGER",
            TypeCategory::Real => "REAL",
            TypeCategory::Complex => "COMPLEX",
            TypeCategory::Character => "CHARACTER",
            TypeCategory::Logical => "LOGICAL",
            TypeCategory::Derived => "TYPE",
        };
        f.write_str(name)
    }
}

/// Whether `kind` names a representation this target supports.
pub fn is_valid_kind(category: TypeCategory, kind: i64) -> bool {
    match category {
        TypeCategory::Integer => matches!(kind, 1 | 2 | 4 | 8 | 16),
        TypeCategory::Real | TypeCategory::Complex => matches!(kind, 2 | 3 | 4 | 8 | 10 | 16),
        TypeCategory::Character => matches!(kind, 1 | 2 | 4),
        TypeCategory::Logical => matches!(kind, 1 | 2 | 4 | 8),
        TypeCategory::Derived => {
            panic!("kind validity queried for a derived type category")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeParamAttr {
    Kind,
    Len,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValueCategory {
    /// A value was written but did not analyze
    Unset,
    Explicit(Expr),
    /// `*`
    Assumed,
    /// `:`
    Deferred,
}

/// Actual value of one type parameter, tagged with the parameter's attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue {
    category: ParamValueCategory,
    attr: TypeParamAttr,
}

impl ParamValue {
    pub fn new(category: ParamValueCategory, attr: TypeParamAttr) -> Self {
        Self { category, attr }
    }

    pub fn explicit(expr: Expr, attr: TypeParamAttr) -> Self {
        Self::new(ParamValueCategory::Explicit(expr), attr)
    }

    pub fn category(&self) -> &ParamValueCategory {
        &self.category
    }

    pub fn attr(&self) -> TypeParamAttr {
        self.attr
    }

    pub fn set_attr(&mut self, attr: TypeParamAttr) {
        self.attr = attr;
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self.category, ParamValueCategory::Explicit(_))
    }

    pub fn explicit_expr(&self) -> Option<&Expr> {
        match &self.category {
            ParamValueCategory::Explicit(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn set_explicit(&mut self, expr: Expr) {
        self.category = ParamValueCategory::Explicit(expr);
    }

    /// Same value, ignoring the attribute tag.
    pub fn same_value(&self, other: &ParamValue) -> bool {
        self.category == other.category
    }
}

/// An intrinsic type whose kind may still be an unresolved expression
/// (inside a parameterized derived type definition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrinsicTypeSpec {
    pub category: TypeCategory,
    pub kind: Expr,
    /// CHARACTER only
    pub length: Option<ParamValue>,
}

impl IntrinsicTypeSpec {
    pub fn new(category: TypeCategory, kind: i64) -> Self {
        Self {
            category,
            kind: Expr::int(kind, 4),
            length: None,
        }
    }

    pub fn with_kind_expr(category: TypeCategory, kind: Expr) -> Self {
        Self {
            category,
            kind,
            length: None,
        }
    }

    pub fn character(kind: i64, length: ParamValue) -> Self {
        Self {
            category: TypeCategory::Character,
            kind: Expr::int(kind, 4),
            length: Some(length),
        }
    }

    pub fn kind_value(&self) -> Option<i64> {
        evaluate::to_int64(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclTypeSpec {
    Intrinsic(IntrinsicTypeSpec),
    TypeDerived(DerivedTypeSpecId),
    ClassDerived(DerivedTypeSpecId),
    /// TYPE(*)
    TypeStar,
    /// CLASS(*)
    ClassStar,
}

impl DeclTypeSpec {
    pub fn as_intrinsic(&self) -> Option<&IntrinsicTypeSpec> {
        match self {
            DeclTypeSpec::Intrinsic(intrinsic) => Some(intrinsic),
            _ => None,
        }
    }

    pub fn as_derived(&self) -> Option<DerivedTypeSpecId> {
        match self {
            DeclTypeSpec::TypeDerived(spec) | DeclTypeSpec::ClassDerived(spec) => Some(*spec),
            _ => None,
        }
    }

    pub fn category(&self) -> TypeCategory {
        match self {
            DeclTypeSpec::Intrinsic(intrinsic) => intrinsic.category,
            _ => TypeCategory::Derived,
        }
    }

    /// Same shape of declaration with a different derived spec.
    pub fn with_derived(&self, spec: DerivedTypeSpecId) -> DeclTypeSpec {
        match self {
            DeclTypeSpec::ClassDerived(_) => DeclTypeSpec::ClassDerived(spec),
            _ => DeclTypeSpec::TypeDerived(spec),
        }
    }
}

/// A derived type symbol plus actual type-parameter values.
///
/// Parameters are kept in the order they were added: explicit values in the
/// order written, then defaults in declaration order. Structural equality is
/// order-insensitive.
#[derive(Debug, Clone)]
pub struct DerivedTypeSpec {
    type_symbol: SymbolId,
    parameters: Vec<(Name, ParamValue)>,
    scope: Option<ScopeId>,
}

impl DerivedTypeSpec {
    pub fn new(type_symbol: SymbolId) -> Self {
        Self {
            type_symbol,
            parameters: Vec::new(),
            scope: None,
        }
    }

    pub fn type_symbol(&self) -> SymbolId {
        self.type_symbol
    }

    pub fn parameters(&self) -> &[(Name, ParamValue)] {
        &self.parameters
    }

    pub fn find_parameter(&self, name: Name) -> Option<&ParamValue> {
        self.parameters
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value)
    }

    pub fn find_parameter_mut(&mut self, name: Name) -> Option<&mut ParamValue> {
        self.parameters
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value)
    }

    /// Add a value unless the parameter already has one.
    pub fn add_param_value(&mut self, name: Name, value: ParamValue) {
        if self.find_parameter(name).is_none() {
            self.parameters.push((name, value));
        }
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub fn set_scope(&mut self, scope: ScopeId) {
        self.scope = Some(scope);
    }

    /// A copy that can be used as a fresh search key.
    pub fn unbound(&self) -> DerivedTypeSpec {
        DerivedTypeSpec {
            type_symbol: self.type_symbol,
            parameters: self.parameters.clone(),
            scope: None,
        }
    }

    pub fn structurally_equal(&self, other: &DerivedTypeSpec) -> bool {
        self.type_symbol == other.type_symbol
            && self.parameters.len() == other.parameters.len()
            && self.parameters.iter().all(|(name, value)| {
                other
                    .find_parameter(*name)
                    .is_some_and(|v| v.same_value(value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_ignores_parameter_order() {
        let k = Name::new_for_test(1);
        let n = Name::new_for_test(2);
        let t = SymbolId::new(7);

        let mut a = DerivedTypeSpec::new(t);
        a.add_param_value(k, ParamValue::explicit(Expr::int(4, 4), TypeParamAttr::Kind));
        a.add_param_value(n, ParamValue::explicit(Expr::int(10, 4), TypeParamAttr::Len));

        let mut b = DerivedTypeSpec::new(t);
        b.add_param_value(n, ParamValue::explicit(Expr::int(10, 4), TypeParamAttr::Len));
        b.add_param_value(k, ParamValue::explicit(Expr::int(4, 4), TypeParamAttr::Kind));

        assert!(a.structurally_equal(&b));

        let mut c = a.unbound();
        c.find_parameter_mut(k)
            .expect("k was added")
            .set_explicit(Expr::int(8, 4));
        assert!(!a.structurally_equal(&c));
    }

    #[test]
    fn add_param_value_keeps_the_first() {
        let k = Name::new_for_test(1);
        let mut spec = DerivedTypeSpec::new(SymbolId::new(0));
        spec.add_param_value(k, ParamValue::explicit(Expr::int(4, 4), TypeParamAttr::Kind));
        spec.add_param_value(k, ParamValue::explicit(Expr::int(8, 4), TypeParamAttr::Kind));
        assert_eq!(spec.parameters().len(), 1);
        assert_eq!(
            evaluate::to_int64(spec.find_parameter(k).and_then(|v| v.explicit_expr()).expect("explicit")),
            Some(4)
        );
    }

    #[test]
    fn kind_validity() {
        assert!(is_valid_kind(TypeCategory::Integer, 8));
        assert!(!is_valid_kind(TypeCategory::Integer, 3));
        assert!(is_valid_kind(TypeCategory::Real, 10));
        assert!(!is_valid_kind(TypeCategory::Logical, 16));
    }
}
