// evaluate/mod.rs
//! Analyzed expressions and compile-time folding.
//!
//! Folding is total: anything that cannot be evaluated is returned unfolded.

mod analyze;
mod fold;

pub use analyze::analyze_expr;
pub use fold::fold;

use ftn_frontend::{BinaryOp, UnaryOp};
use ftn_identity::SymbolId;

use crate::types::{DeclTypeSpec, TypeCategory};

/// A folded constant value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Integer { value: i64, kind: i64 },
    /// Kept as written; real arithmetic is never folded
    Real { text: String, kind: i64 },
    Logical { value: bool, kind: i64 },
    Character { value: String, kind: i64 },
}

impl Constant {
    pub fn category(&self) -> TypeCategory {
        match self {
            Constant::Integer { .. } => TypeCategory::Integer,
            Constant::Real { .. } => TypeCategory::Real,
            Constant::Logical { .. } => TypeCategory::Logical,
            Constant::Character { .. } => TypeCategory::Character,
        }
    }
}

/// A reference to a data object, with the static facts folding needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub symbol: SymbolId,
    pub rank: usize,
    pub category: Option<TypeCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Constant(Constant),
    /// Reference to a type parameter of the enclosing derived type
    TypeParam(SymbolId),
    NamedConstant(EntityRef),
    Variable(EntityRef),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    ArrayConstructor(Vec<Expr>),
    /// Conversion to INTEGER of the given kind
    Convert { kind: i64, operand: Box<Expr> },
}

impl Expr {
    pub fn int(value: i64, kind: i64) -> Self {
        Expr::Constant(Constant::Integer { value, kind })
    }

    pub fn rank(&self) -> usize {
        match self {
            Expr::Constant(_) | Expr::TypeParam(_) => 0,
            Expr::NamedConstant(entity) | Expr::Variable(entity) => entity.rank,
            Expr::Unary(_, operand) | Expr::Convert { operand, .. } => operand.rank(),
            Expr::Binary(_, lhs, rhs) => lhs.rank().max(rhs.rank()),
            Expr::ArrayConstructor(_) => 1,
        }
    }

    /// Dynamic type category, when it is known.
    pub fn category(&self) -> Option<TypeCategory> {
        match self {
            Expr::Constant(constant) => Some(constant.category()),
            Expr::TypeParam(_) | Expr::Convert { .. } => Some(TypeCategory::Integer),
            Expr::NamedConstant(entity) | Expr::Variable(entity) => entity.category,
            Expr::Unary(_, operand) => operand.category(),
            Expr::Binary(_, lhs, rhs) => match (lhs.category()?, rhs.category()?) {
                (l, r) if l == r => Some(l),
                (TypeCategory::Complex, r) | (r, TypeCategory::Complex) if r.is_numeric() => {
                    Some(TypeCategory::Complex)
                }
                (TypeCategory::Real, r) | (r, TypeCategory::Real) if r.is_numeric() => {
                    Some(TypeCategory::Real)
                }
                _ => None,
            },
            Expr::ArrayConstructor(elements) => elements.first().and_then(Expr::category),
        }
    }

    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Constant(_) => true,
            Expr::ArrayConstructor(elements) => elements.iter().all(Expr::is_constant),
            _ => false,
        }
    }

    /// Whether the expression mentions a type parameter anywhere.
    pub fn references_type_param(&self) -> bool {
        match self {
            Expr::TypeParam(_) => true,
            Expr::Constant(_) | Expr::NamedConstant(_) | Expr::Variable(_) => false,
            Expr::Unary(_, operand) | Expr::Convert { operand, .. } => {
                operand.references_type_param()
            }
            Expr::Binary(_, lhs, rhs) => {
                lhs.references_type_param() || rhs.references_type_param()
            }
            Expr::ArrayConstructor(elements) => elements.iter().any(Expr::references_type_param),
        }
    }
}

/// The value of a scalar INTEGER constant.
pub fn to_int64(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Constant(Constant::Integer { value, .. }) => Some(*value),
        _ => None,
    }
}

/// Wrap an integer-valued expression in a conversion to the given type.
/// Returns None when the value is not an INTEGER or the type is not one.
pub fn convert_to_type(ty: &DeclTypeSpec, expr: Expr) -> Option<Expr> {
    let intrinsic = ty.as_intrinsic()?;
    if intrinsic.category != TypeCategory::Integer {
        return None;
    }
    let kind = intrinsic.kind_value()?;
    convert_to_integer(kind, expr)
}

pub fn convert_to_integer(kind: i64, expr: Expr) -> Option<Expr> {
    if expr.category() != Some(TypeCategory::Integer) {
        return None;
    }
    Some(Expr::Convert {
        kind,
        operand: Box::new(expr),
    })
}
