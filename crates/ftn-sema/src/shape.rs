//! Resolution of declared array and coarray shapes into dimension lists.

use ftn_frontend::{self as syntax, AstPrinter, ComponentArraySpec, CoarraySpec, ExplicitShapeSpec};
use ftn_identity::ScopeId;

use crate::array_spec::{ArraySpec, Bound, ShapeSpec};
use crate::context::SemanticsContext;
use crate::evaluate::{self, analyze_expr, fold};
use crate::types::TypeCategory;

/// Turns shape syntax into an `ArraySpec`, folding every bound in `scope`.
pub struct BoundResolver<'a> {
    ctx: &'a mut SemanticsContext,
    scope: ScopeId,
    dims: ArraySpec,
}

impl<'a> BoundResolver<'a> {
    pub fn new(ctx: &'a mut SemanticsContext, scope: ScopeId) -> Self {
        Self {
            ctx,
            scope,
            dims: ArraySpec::default(),
        }
    }

    pub fn resolve_array_spec(mut self, spec: &syntax::ArraySpec) -> ArraySpec {
        match spec {
            syntax::ArraySpec::Explicit(dims) => self.make_explicit_dims(dims),
            syntax::ArraySpec::AssumedShape(lowers) => {
                for lower in lowers {
                    let lbound = self.bound_or_one(lower.as_ref());
                    self.dims.push(ShapeSpec::assumed(lbound));
                }
            }
            syntax::ArraySpec::Deferred(n) => self.make_deferred(*n),
            syntax::ArraySpec::AssumedSize {
                explicit,
                implied_lower,
            } => {
                self.make_explicit_dims(explicit);
                self.make_implied(implied_lower.as_ref());
            }
            syntax::ArraySpec::ImpliedShape(lowers) => {
                for lower in lowers {
                    self.make_implied(lower.as_ref());
                }
            }
            syntax::ArraySpec::AssumedRank => self.dims.push(ShapeSpec::assumed_rank()),
        }
        self.finish()
    }

    pub fn resolve_component_array_spec(mut self, spec: &ComponentArraySpec) -> ArraySpec {
        match spec {
            ComponentArraySpec::Explicit(dims) => self.make_explicit_dims(dims),
            ComponentArraySpec::Deferred(n) => self.make_deferred(*n),
        }
        self.finish()
    }

    pub fn resolve_coarray_spec(mut self, spec: &CoarraySpec) -> ArraySpec {
        match spec {
            CoarraySpec::Deferred(n) => self.make_deferred(*n),
            CoarraySpec::Explicit {
                explicit,
                last_lower,
            } => {
                self.make_explicit_dims(explicit);
                self.make_implied(last_lower.as_ref());
            }
        }
        self.finish()
    }

    fn finish(self) -> ArraySpec {
        assert!(
            !self.dims.is_empty(),
            "shape declaration resolved to no dimensions"
        );
        tracing::trace!(rank = self.dims.iter().len(), "resolved shape");
        self.dims
    }

    fn make_explicit_dims(&mut self, dims: &[ExplicitShapeSpec]) {
        for dim in dims {
            let lbound = self.bound_or_one(dim.lower.as_ref());
            let ubound = self.bound(&dim.upper);
            self.dims.push(ShapeSpec::explicit(lbound, ubound));
        }
    }

    fn make_implied(&mut self, lower: Option<&syntax::Expr>) {
        let lbound = self.bound_or_one(lower);
        self.dims.push(ShapeSpec::implied(lbound));
    }

    fn make_deferred(&mut self, n: usize) {
        for _ in 0..n {
            self.dims.push(ShapeSpec::deferred());
        }
    }

    fn bound_or_one(&mut self, expr: Option<&syntax::Expr>) -> Bound {
        match expr {
            Some(expr) => self.bound(expr),
            None => Bound::constant(1),
        }
    }

    /// A scalar INTEGER bound folds in the subscript kind; anything else is
    /// left unresolved for later checks to report.
    fn bound(&mut self, expr: &syntax::Expr) -> Bound {
        let kind = self.ctx.options().subscript_integer_kind();
        let converted = analyze_expr(self.ctx, self.scope, expr)
            .filter(|e| e.rank() == 0 && e.category() == Some(TypeCategory::Integer))
            .and_then(|e| evaluate::convert_to_integer(kind, e));
        let resolved = converted.map(|e| fold(self.ctx, e));
        if resolved.is_none() {
            tracing::trace!(
                bound = %AstPrinter::new(self.ctx.interner()).print_expr(expr),
                "unresolved bound"
            );
        }
        Bound::Explicit(resolved)
    }
}

pub fn resolve_array_spec(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    spec: &syntax::ArraySpec,
) -> ArraySpec {
    BoundResolver::new(ctx, scope).resolve_array_spec(spec)
}

pub fn resolve_component_array_spec(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    spec: &ComponentArraySpec,
) -> ArraySpec {
    BoundResolver::new(ctx, scope).resolve_component_array_spec(spec)
}

pub fn resolve_coarray_spec(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    spec: &CoarraySpec,
) -> ArraySpec {
    BoundResolver::new(ctx, scope).resolve_coarray_spec(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::Expr;
    use crate::fixtures::Fixture;
    use ftn_frontend::BinaryOp;

    #[test]
    fn omitted_lower_bound_is_one() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let spec = syntax::ArraySpec::Explicit(vec![
            ExplicitShapeSpec::new(None, fx.int_expr(10)),
            ExplicitShapeSpec::new(Some(fx.int_expr(0)), fx.int_expr(4)),
        ]);
        let dims = resolve_array_spec(&mut fx.ctx, unit, &spec);
        assert_eq!(dims.rank(), 2);
        assert_eq!(dims[0].lbound.value(), Some(1));
        assert_eq!(dims[0].ubound.value(), Some(10));
        assert_eq!(dims[1].lbound.value(), Some(0));
        assert!(dims.is_explicit_shape());
    }

    #[test]
    fn bounds_fold_to_subscript_kind() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        fx.named_constant(unit, "n", Expr::int(5, 4));
        let upper = syntax::Expr::binary(BinaryOp::Mul, fx.name_expr("n"), fx.int_expr(2));
        let spec = syntax::ArraySpec::Explicit(vec![ExplicitShapeSpec::new(None, upper)]);
        let dims = resolve_array_spec(&mut fx.ctx, unit, &spec);
        assert_eq!(dims[0].ubound.explicit(), Some(&Expr::int(10, 8)));
    }

    #[test]
    fn deferred_coarray_spec_has_one_dimension_per_colon() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let dims = resolve_coarray_spec(&mut fx.ctx, unit, &CoarraySpec::Deferred(3));
        assert_eq!(dims.iter().len(), 3);
        assert!(dims.iter().all(|d| d.lbound.is_deferred() && d.ubound.is_deferred()));
    }

    #[test]
    fn explicit_coshape_ends_with_implied_codimension() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let spec = CoarraySpec::Explicit {
            explicit: vec![ExplicitShapeSpec::new(None, fx.int_expr(2))],
            last_lower: None,
        };
        let dims = resolve_coarray_spec(&mut fx.ctx, unit, &spec);
        assert_eq!(dims.iter().len(), 2);
        assert!(dims[1].ubound.is_assumed());
        assert_eq!(dims[1].lbound.value(), Some(1));
    }

    #[test]
    fn assumed_size_appends_implied_dimension() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let spec = syntax::ArraySpec::AssumedSize {
            explicit: vec![ExplicitShapeSpec::new(None, fx.int_expr(3))],
            implied_lower: Some(fx.int_expr(0)),
        };
        let dims = resolve_array_spec(&mut fx.ctx, unit, &spec);
        assert!(dims.is_assumed_size());
        assert_eq!(dims[1].lbound.value(), Some(0));
    }

    #[test]
    fn non_integer_bound_is_unresolved_not_an_error() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        let real = syntax::Expr::new(
            syntax::ExprKind::RealLiteral("2.5".into()),
            Default::default(),
        );
        let spec = syntax::ArraySpec::Explicit(vec![ExplicitShapeSpec::new(None, real)]);
        let dims = resolve_array_spec(&mut fx.ctx, unit, &spec);
        assert_eq!(dims[0].ubound, Bound::Explicit(None));
        assert!(!fx.ctx.diagnostics().has_errors());
    }

    #[test]
    fn variable_bound_stays_symbolic() {
        let mut fx = Fixture::new();
        let unit = fx.program("p");
        fx.integer_var(unit, "m");
        let spec = syntax::ArraySpec::Explicit(vec![ExplicitShapeSpec::new(
            None,
            fx.name_expr("m"),
        )]);
        let dims = resolve_array_spec(&mut fx.ctx, unit, &spec);
        let upper = dims[0].ubound.explicit().expect("symbolic bound kept");
        assert!(!upper.is_constant());
        assert!(!dims.is_constant());
    }
}
