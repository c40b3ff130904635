// evaluate/fold.rs
//
// Constant folding over analyzed expressions.

use ftn_frontend::{BinaryOp, UnaryOp};
use ftn_identity::{DerivedTypeSpecId, SymbolId};
use smallvec::SmallVec;

use super::{Constant, EntityRef, Expr};
use crate::context::SemanticsContext;
use crate::symbol::{Attr, Details};

/// Fold `expr` as far as possible.
///
/// Type parameter references are replaced by the values of the current PDT
/// instance, if one is installed on the context.
pub fn fold(ctx: &SemanticsContext, expr: Expr) -> Expr {
    let mut folder = Folder {
        ctx,
        instance: ctx.pdt_instance(),
        visiting: SmallVec::new(),
    };
    folder.fold(expr)
}

struct Folder<'a> {
    ctx: &'a SemanticsContext,
    instance: Option<DerivedTypeSpecId>,
    /// Named constants being expanded, to stop on self-reference
    visiting: SmallVec<[SymbolId; 4]>,
}

impl Folder<'_> {
    fn fold(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Constant(_) | Expr::Variable(_) => expr,
            Expr::TypeParam(symbol) => self
                .fold_type_param(symbol)
                .unwrap_or(Expr::TypeParam(symbol)),
            Expr::NamedConstant(entity) => self
                .fold_named_constant(&entity)
                .unwrap_or(Expr::NamedConstant(entity)),
            Expr::Unary(op, operand) => fold_unary(op, self.fold(*operand)),
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.fold(*lhs);
                let rhs = self.fold(*rhs);
                fold_binary(op, lhs, rhs)
            }
            Expr::ArrayConstructor(elements) => {
                Expr::ArrayConstructor(elements.into_iter().map(|e| self.fold(e)).collect())
            }
            Expr::Convert { kind, operand } => match self.fold(*operand) {
                Expr::Constant(Constant::Integer { value, .. }) if fits_kind(value, kind) => {
                    Expr::int(value, kind)
                }
                operand => Expr::Convert {
                    kind,
                    operand: Box::new(operand),
                },
            },
        }
    }

    fn fold_type_param(&mut self, symbol: SymbolId) -> Option<Expr> {
        let spec = self.ctx.spec(self.instance?);
        let name = self.ctx.symbol(symbol).name();
        let value = spec.find_parameter(name)?.explicit_expr()?.clone();
        // Values recorded on the instance were written in the enclosing
        // context and never see the instance's own parameters.
        let mut outer = Folder {
            ctx: self.ctx,
            instance: None,
            visiting: self.visiting.clone(),
        };
        let folded = outer.fold(value);
        (!folded.references_type_param()).then_some(folded)
    }

    fn fold_named_constant(&mut self, entity: &EntityRef) -> Option<Expr> {
        if self.visiting.contains(&entity.symbol) {
            return None;
        }
        let symbol = self.ctx.symbol(entity.symbol);
        if !symbol.attrs().contains(Attr::Parameter) {
            return None;
        }
        let Details::ObjectEntity(object) = symbol.details() else {
            return None;
        };
        let init = object.init.clone()?;
        self.visiting.push(entity.symbol);
        let folded = self.fold(init);
        self.visiting.pop();
        folded.is_constant().then_some(folded)
    }
}

fn fold_unary(op: UnaryOp, operand: Expr) -> Expr {
    match (op, operand) {
        (UnaryOp::Plus, operand @ Expr::Constant(_)) => operand,
        (UnaryOp::Neg, Expr::Constant(Constant::Integer { value, kind })) => {
            match value.checked_neg() {
                Some(negated) => Expr::int(negated, kind),
                None => Expr::Unary(op, Box::new(Expr::int(value, kind))),
            }
        }
        (UnaryOp::Neg, Expr::Constant(Constant::Real { text, kind })) => {
            let text = match text.strip_prefix('-') {
                Some(positive) => positive.to_string(),
                None => format!("-{}", text),
            };
            Expr::Constant(Constant::Real { text, kind })
        }
        (op, operand) => Expr::Unary(op, Box::new(operand)),
    }
}

fn fold_binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    if let (
        Expr::Constant(Constant::Integer { value: l, kind: lk }),
        Expr::Constant(Constant::Integer { value: r, kind: rk }),
    ) = (&lhs, &rhs)
    {
        let kind = (*lk).max(*rk);
        let value = match op {
            BinaryOp::Add => l.checked_add(*r),
            BinaryOp::Sub => l.checked_sub(*r),
            BinaryOp::Mul => l.checked_mul(*r),
            BinaryOp::Div => l.checked_div(*r),
            BinaryOp::Power => u32::try_from(*r).ok().and_then(|e| l.checked_pow(e)),
        };
        if let Some(value) = value.filter(|v| fits_kind(*v, kind)) {
            return Expr::int(value, kind);
        }
    }
    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
}

/// Whether `value` is representable in INTEGER(kind).
fn fits_kind(value: i64, kind: i64) -> bool {
    match kind {
        1 => i8::try_from(value).is_ok(),
        2 => i16::try_from(value).is_ok(),
        4 => i32::try_from(value).is_ok(),
        8 | 16 => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use crate::types::TypeCategory;

    fn int(v: i64) -> Expr {
        Expr::int(v, 4)
    }

    #[test]
    fn folds_integer_arithmetic() {
        let fx = Fixture::new();
        let expr = Expr::Binary(
            BinaryOp::Mul,
            Box::new(Expr::Binary(BinaryOp::Add, Box::new(int(2)), Box::new(int(3)))),
            Box::new(Expr::Unary(UnaryOp::Neg, Box::new(int(4)))),
        );
        assert_eq!(fold(&fx.ctx, expr), int(-20));
    }

    #[test]
    fn division_by_zero_and_overflow_stay_unfolded() {
        let fx = Fixture::new();
        let div = Expr::Binary(BinaryOp::Div, Box::new(int(1)), Box::new(int(0)));
        assert!(matches!(fold(&fx.ctx, div), Expr::Binary(BinaryOp::Div, ..)));

        let big = Expr::Binary(
            BinaryOp::Mul,
            Box::new(int(i32::MAX as i64)),
            Box::new(int(2)),
        );
        assert!(matches!(fold(&fx.ctx, big), Expr::Binary(BinaryOp::Mul, ..)));

        let negative_power = Expr::Binary(BinaryOp::Power, Box::new(int(2)), Box::new(int(-1)));
        assert!(matches!(
            fold(&fx.ctx, negative_power),
            Expr::Binary(BinaryOp::Power, ..)
        ));
    }

    #[test]
    fn conversion_changes_kind() {
        let fx = Fixture::new();
        let converted = Expr::Convert {
            kind: 8,
            operand: Box::new(Expr::Binary(BinaryOp::Add, Box::new(int(1)), Box::new(int(1)))),
        };
        assert_eq!(fold(&fx.ctx, converted), Expr::int(2, 8));

        let narrow = Expr::Convert {
            kind: 1,
            operand: Box::new(int(300)),
        };
        assert!(matches!(fold(&fx.ctx, narrow), Expr::Convert { kind: 1, .. }));
    }

    #[test]
    fn named_constants_substitute() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let n = fx.named_constant(unit, "n", Expr::int(10, 4));
        let expr = Expr::Binary(
            BinaryOp::Sub,
            Box::new(Expr::NamedConstant(EntityRef {
                symbol: n,
                rank: 0,
                category: Some(TypeCategory::Integer),
            })),
            Box::new(int(1)),
        );
        assert_eq!(fold(&fx.ctx, expr), int(9));
    }

    #[test]
    fn variables_do_not_fold() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let x = fx.integer_var(unit, "x");
        let expr = Expr::Variable(EntityRef {
            symbol: x,
            rank: 0,
            category: Some(TypeCategory::Integer),
        });
        assert_eq!(fold(&fx.ctx, expr.clone()), expr);
    }
}
