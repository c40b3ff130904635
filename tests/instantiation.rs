// tests/instantiation.rs
//! Parameterized derived type instances requested through the public API.

mod common;

use ftn::frontend::{self as syntax, BinaryOp, TypeParamSpec, TypeParamValue};
use ftn::identity::{DerivedTypeSpecId, ScopeId, Span, SymbolId};
use ftn::sema::array_spec::{ArraySpec, Bound, ShapeSpec};
use ftn::sema::evaluate::Expr;
use ftn::sema::fixtures::Fixture;
use ftn::sema::{
    ComponentIterator, ComponentKind, DeclTypeSpec, TypeCategory, TypeParamAttr,
    bind_type_param_values, find_or_instantiate_derived_type,
};

fn by_name(fx: &mut Fixture, name: &str, value: syntax::Expr) -> TypeParamSpec {
    TypeParamSpec {
        keyword: Some(fx.ident(name)),
        value: TypeParamValue::Expr(value),
        span: Span::default(),
    }
}

fn request(
    fx: &mut Fixture,
    scope: ScopeId,
    ty: SymbolId,
    values: &[TypeParamSpec],
) -> DerivedTypeSpecId {
    let spec = bind_type_param_values(&mut fx.ctx, scope, ty, values, Span::default());
    find_or_instantiate_derived_type(&mut fx.ctx, scope, spec)
}

fn instance_scope(fx: &Fixture, spec: DerivedTypeSpecId) -> ScopeId {
    fx.ctx.spec(spec).scope().expect("instantiated spec has a scope")
}

fn member(fx: &mut Fixture, spec: DerivedTypeSpecId, name: &str) -> SymbolId {
    let name = fx.name(name);
    let scope = instance_scope(fx, spec);
    fx.ctx.scope(scope).find(name).expect("member is declared")
}

fn upper_bound(fx: &Fixture, symbol: SymbolId) -> Option<i64> {
    let object = fx.ctx.symbol(symbol).as_object()?;
    object.shape.iter().next()?.ubound.value()
}

/// `type vec(k)` holding `integer(kind=k) :: x`.
fn declare_vec(fx: &mut Fixture, scope: ScopeId) -> SymbolId {
    let ty = fx.derived_type(scope, "vec");
    let k = fx.type_param(ty, "k", TypeParamAttr::Kind, None);
    let x_ty = fx.kind_param_type(TypeCategory::Integer, k);
    fx.component(ty, "x", x_ty);
    ty
}

/// `type buf(k, n, m)` with `n = k + 1` and `m = n * k` as defaults,
/// holding `integer :: data(m)`.
fn declare_buf(fx: &mut Fixture, scope: ScopeId) -> SymbolId {
    let ty = fx.derived_type(scope, "buf");
    let k = fx.type_param(ty, "k", TypeParamAttr::Kind, None);
    let n_default = Expr::Binary(
        BinaryOp::Add,
        Box::new(Expr::TypeParam(k)),
        Box::new(Expr::int(1, 4)),
    );
    let n = fx.type_param(ty, "n", TypeParamAttr::Len, Some(n_default));
    let m_default = Expr::Binary(
        BinaryOp::Mul,
        Box::new(Expr::TypeParam(n)),
        Box::new(Expr::TypeParam(k)),
    );
    let m = fx.type_param(ty, "m", TypeParamAttr::Len, Some(m_default));
    let int = fx.default_type(TypeCategory::Integer);
    let data = fx.component(ty, "data", int);
    fx.set_shape_spec(
        data,
        ArraySpec::new(vec![ShapeSpec::explicit(
            Bound::constant(1),
            Bound::Explicit(Some(Expr::TypeParam(m))),
        )]),
    );
    ty
}

#[test]
fn structurally_equal_requests_share_a_scope() {
    common::init_tracing();
    let mut fx = Fixture::new();
    let unit = fx.module("m");
    let vec_ty = declare_vec(&mut fx, unit);
    let inner = fx.subprogram(unit, "s");

    let product = syntax::Expr::binary(BinaryOp::Mul, fx.int_expr(2), fx.int_expr(4));
    let value = by_name(&mut fx, "k", product);
    let folded_from_product = request(&mut fx, unit, vec_ty, &[value]);
    let eight = fx.int_expr(8);
    let value = by_name(&mut fx, "k", eight);
    let literal_from_inner = request(&mut fx, inner, vec_ty, &[value]);
    let four = fx.int_expr(4);
    let value = by_name(&mut fx, "k", four);
    let other_kind = request(&mut fx, unit, vec_ty, &[value]);

    assert_eq!(
        instance_scope(&fx, folded_from_product),
        instance_scope(&fx, literal_from_inner)
    );
    assert_ne!(
        instance_scope(&fx, folded_from_product),
        instance_scope(&fx, other_kind)
    );
    assert!(!fx.ctx.diagnostics().has_errors());
}

#[test]
fn defaults_observe_resolved_earlier_parameters() {
    common::init_tracing();
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let buf = declare_buf(&mut fx, unit);

    let three = fx.int_expr(3);
    let k = by_name(&mut fx, "k", three);
    let defaults_only = request(&mut fx, unit, buf, &[k]);
    let data = member(&mut fx, defaults_only, "data");
    assert_eq!(upper_bound(&fx, data), Some(12));

    let three = fx.int_expr(3);
    let k = by_name(&mut fx, "k", three);
    let ten = fx.int_expr(10);
    let n = by_name(&mut fx, "n", ten);
    let explicit_n = request(&mut fx, unit, buf, &[n, k]);
    let data = member(&mut fx, explicit_n, "data");
    assert_eq!(upper_bound(&fx, data), Some(30));

    assert!(fx.ctx.pdt_instance().is_none());
    assert!(!fx.ctx.diagnostics().has_errors());
}

#[test]
fn instance_components_traverse_like_the_generic_type() {
    common::init_tracing();
    let mut fx = Fixture::new();
    let unit = fx.module("m");
    let vec_ty = declare_vec(&mut fx, unit);
    let holder = fx.derived_type(unit, "holder");
    let k = fx.type_param(holder, "k", TypeParamAttr::Kind, None);
    let k_name = fx.ctx.symbol(k).name();
    let inner = {
        let mut spec = ftn::sema::DerivedTypeSpec::new(vec_ty);
        spec.add_param_value(
            k_name,
            ftn::sema::ParamValue::explicit(Expr::TypeParam(k), TypeParamAttr::Kind),
        );
        DeclTypeSpec::TypeDerived(fx.ctx.add_spec(spec))
    };
    fx.component(holder, "item", inner);

    let two = fx.int_expr(2);
    let value = by_name(&mut fx, "k", two);
    let spec = request(&mut fx, unit, holder, &[value]);

    let instance = instance_scope(&fx, spec);
    let mut iter = ComponentIterator::new(&fx.ctx, spec, ComponentKind::Ultimate);
    let first = iter.next().expect("one ultimate component");
    assert_eq!(fx.ctx.symbol_name(first), "x");
    assert_eq!(iter.designator_name(), "%item%x");
    assert!(iter.next().is_none());

    let x_kind = fx
        .ctx
        .symbol(first)
        .decl_type()
        .and_then(DeclTypeSpec::as_intrinsic)
        .and_then(|intrinsic| intrinsic.kind_value());
    assert_eq!(x_kind, Some(2));
    assert_ne!(fx.ctx.symbol(first).owner(), instance);
}
