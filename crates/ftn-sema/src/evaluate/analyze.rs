// evaluate/analyze.rs
//
// Name resolution and typing of syntactic expressions.

use ftn_frontend::{self as syntax, ExprKind};
use ftn_identity::ScopeId;

use super::{Constant, EntityRef, Expr};
use crate::context::SemanticsContext;
use crate::errors::SemanticError;
use crate::symbol::{Attr, Details};
use crate::types::TypeCategory;

/// Analyze `expr` in `scope`. Undeclared names and references to things that
/// are not data objects are diagnosed and yield None.
pub fn analyze_expr(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    expr: &syntax::Expr,
) -> Option<Expr> {
    match &expr.kind {
        ExprKind::IntLiteral(value) => Some(Expr::int(
            *value,
            ctx.options().default_kind(TypeCategory::Integer),
        )),
        ExprKind::RealLiteral(text) => Some(Expr::Constant(Constant::Real {
            text: text.clone(),
            kind: ctx.options().default_kind(TypeCategory::Real),
        })),
        ExprKind::LogicalLiteral(value) => Some(Expr::Constant(Constant::Logical {
            value: *value,
            kind: ctx.options().default_kind(TypeCategory::Logical),
        })),
        ExprKind::CharLiteral(value) => Some(Expr::Constant(Constant::Character {
            value: value.clone(),
            kind: ctx.options().default_kind(TypeCategory::Character),
        })),
        ExprKind::Name(name) => {
            let Some(found) = ctx.find_symbol(scope, *name) else {
                let text = ctx.name_str(*name).to_string();
                ctx.diagnostics_mut().add_error(
                    SemanticError::UndefinedName {
                        name: text,
                        span: expr.span.into(),
                    },
                    expr.span,
                );
                return None;
            };
            let ultimate = ctx.get_ultimate(found);
            let symbol = ctx.symbol(ultimate);
            match symbol.details() {
                Details::TypeParam(_) => Some(Expr::TypeParam(ultimate)),
                Details::ObjectEntity(object) => {
                    let entity = EntityRef {
                        symbol: ultimate,
                        rank: object.shape.rank(),
                        category: object.ty.as_ref().map(|ty| ty.category()),
                    };
                    if symbol.attrs().contains(Attr::Parameter) {
                        Some(Expr::NamedConstant(entity))
                    } else {
                        Some(Expr::Variable(entity))
                    }
                }
                _ => {
                    let text = ctx.name_str(*name).to_string();
                    ctx.diagnostics_mut().add_error(
                        SemanticError::NotAnObject {
                            name: text,
                            span: expr.span.into(),
                        },
                        expr.span,
                    );
                    None
                }
            }
        }
        ExprKind::Unary(op, operand) => {
            let operand = analyze_expr(ctx, scope, operand)?;
            Some(Expr::Unary(*op, Box::new(operand)))
        }
        ExprKind::Binary(op, lhs, rhs) => {
            let lhs = analyze_expr(ctx, scope, lhs);
            let rhs = analyze_expr(ctx, scope, rhs);
            Some(Expr::Binary(*op, Box::new(lhs?), Box::new(rhs?)))
        }
        ExprKind::ArrayConstructor(elements) => {
            let analyzed: Vec<Option<Expr>> = elements
                .iter()
                .map(|element| analyze_expr(ctx, scope, element))
                .collect();
            analyzed
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .map(Expr::ArrayConstructor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SemanticError;
    use crate::evaluate::fold;
    use crate::fixtures::Fixture;
    use ftn_frontend::BinaryOp;

    #[test]
    fn undeclared_name_is_diagnosed() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let syntax = fx.name_expr("nope");
        assert!(analyze_expr(&mut fx.ctx, unit, &syntax).is_none());
        assert!(matches!(
            fx.ctx.diagnostics().errors()[0].error,
            SemanticError::UndefinedName { .. }
        ));
    }

    #[test]
    fn named_constant_analyzes_and_folds() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        fx.named_constant(unit, "n", Expr::int(6, 4));
        let syntax = syntax::Expr::binary(BinaryOp::Mul, fx.name_expr("n"), fx.int_expr(7));
        let analyzed = analyze_expr(&mut fx.ctx, unit, &syntax).expect("analyzes");
        assert!(matches!(analyzed, Expr::Binary(BinaryOp::Mul, ..)));
        assert_eq!(fold(&fx.ctx, analyzed), Expr::int(42, 4));
    }

    #[test]
    fn array_constructor_has_rank_one() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let syntax = syntax::Expr::new(
            ExprKind::ArrayConstructor(vec![fx.int_expr(1), fx.int_expr(2)]),
            Default::default(),
        );
        let analyzed = analyze_expr(&mut fx.ctx, unit, &syntax).expect("analyzes");
        assert_eq!(analyzed.rank(), 1);
        assert_eq!(analyzed.category(), Some(TypeCategory::Integer));
    }
}
