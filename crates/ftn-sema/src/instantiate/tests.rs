// instantiate/tests.rs

use super::*;
use crate::array_spec::{Bound, ShapeSpec};
use crate::evaluate::Expr;
use crate::fixtures::Fixture;
use crate::symbol::{Attr, Attrs};
use crate::types::{ParamValue, TypeCategory};
use ftn_frontend::{self as syntax, BinaryOp, ExprKind, TypeParamSpec, TypeParamValue};
use miette::Diagnostic;

/// `type pdt(k, n)` with `integer, kind :: k = 4`, `integer, len :: n = k*2`,
/// holding `integer(kind=k) :: value` and `integer :: arr(n)`.
struct Pdt {
    ty: SymbolId,
    k: SymbolId,
    n: SymbolId,
}

fn declare_pdt(fx: &mut Fixture, scope: ScopeId) -> Pdt {
    let ty = fx.derived_type(scope, "pdt");
    let k = fx.type_param(ty, "k", TypeParamAttr::Kind, Some(Expr::int(4, 4)));
    let n_default = Expr::Binary(
        BinaryOp::Mul,
        Box::new(Expr::TypeParam(k)),
        Box::new(Expr::int(2, 4)),
    );
    let n = fx.type_param(ty, "n", TypeParamAttr::Len, Some(n_default));
    let value_ty = fx.kind_param_type(TypeCategory::Integer, k);
    fx.component(ty, "value", value_ty);
    let int = fx.default_type(TypeCategory::Integer);
    let arr = fx.component(ty, "arr", int);
    fx.set_shape_spec(
        arr,
        ArraySpec::new(vec![ShapeSpec::explicit(
            Bound::constant(1),
            Bound::Explicit(Some(Expr::TypeParam(n))),
        )]),
    );
    Pdt { ty, k, n }
}

fn positional(expr: syntax::Expr) -> TypeParamSpec {
    TypeParamSpec {
        keyword: None,
        value: TypeParamValue::Expr(expr),
        span: Span::default(),
    }
}

fn keyword(fx: &mut Fixture, name: &str, expr: syntax::Expr) -> TypeParamSpec {
    TypeParamSpec {
        keyword: Some(fx.ident(name)),
        value: TypeParamValue::Expr(expr),
        span: Span::default(),
    }
}

fn instantiate(
    fx: &mut Fixture,
    scope: ScopeId,
    ty: SymbolId,
    values: &[TypeParamSpec],
) -> DerivedTypeSpecId {
    let spec = bind_type_param_values(&mut fx.ctx, scope, ty, values, Span::default());
    find_or_instantiate_derived_type(&mut fx.ctx, scope, spec)
}

fn member(fx: &mut Fixture, spec: DerivedTypeSpecId, name: &str) -> SymbolId {
    let name = fx.name(name);
    let scope = fx.ctx.spec(spec).scope().expect("instance has a scope");
    fx.ctx.scope(scope).find(name).expect("member exists")
}

fn intrinsic_kind(fx: &Fixture, symbol: SymbolId) -> Option<i64> {
    fx.ctx
        .symbol(symbol)
        .decl_type()
        .and_then(DeclTypeSpec::as_intrinsic)
        .and_then(IntrinsicTypeSpec::kind_value)
}

fn codes(fx: &Fixture) -> Vec<String> {
    fx.ctx
        .diagnostics()
        .errors()
        .iter()
        .filter_map(|e| e.error.code().map(|code| code.to_string()))
        .collect()
}

fn param_value(fx: &mut Fixture, spec: DerivedTypeSpecId, name: &str) -> Option<Expr> {
    let name = fx.name(name);
    fx.ctx
        .spec(spec)
        .find_parameter(name)
        .and_then(ParamValue::explicit_expr)
        .cloned()
}

#[test]
fn equal_values_share_one_instance() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);

    let sum = syntax::Expr::binary(BinaryOp::Add, fx.int_expr(4), fx.int_expr(4));
    let first = instantiate(&mut fx, unit, pdt.ty, &[positional(sum)]);
    let eight = fx.int_expr(8);
    let by_keyword = keyword(&mut fx, "k", eight);
    let second = instantiate(&mut fx, unit, pdt.ty, &[by_keyword]);
    let four = fx.int_expr(4);
    let other = instantiate(&mut fx, unit, pdt.ty, &[positional(four)]);

    assert_eq!(first, second);
    assert_eq!(fx.ctx.spec(first).scope(), fx.ctx.spec(second).scope());
    assert_ne!(fx.ctx.spec(first).scope(), fx.ctx.spec(other).scope());
    let stats = fx.ctx.instantiation_stats();
    assert_eq!((stats.misses(), stats.hits()), (2, 1));
    assert!(!fx.ctx.diagnostics().has_errors());
}

#[test]
fn instances_are_found_from_nested_scopes() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);
    let inner = fx.subprogram(unit, "s");

    let outer_instance = instantiate(&mut fx, unit, pdt.ty, &[]);
    let inner_instance = instantiate(&mut fx, inner, pdt.ty, &[]);

    assert_eq!(outer_instance, inner_instance);
}

#[test]
fn defaults_see_earlier_resolved_parameters() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);

    let eight = fx.int_expr(8);
    let spec = instantiate(&mut fx, unit, pdt.ty, &[positional(eight)]);

    assert_eq!(param_value(&mut fx, spec, "k"), Some(Expr::int(8, 4)));
    assert_eq!(param_value(&mut fx, spec, "n"), Some(Expr::int(16, 4)));

    let value = member(&mut fx, spec, "value");
    assert_eq!(intrinsic_kind(&fx, value), Some(8));
    let arr = member(&mut fx, spec, "arr");
    let shape = &fx.ctx.symbol(arr).as_object().expect("object").shape;
    assert_eq!(shape.iter().next().and_then(|dim| dim.ubound.value()), Some(16));

    let n = member(&mut fx, spec, "n");
    assert_ne!(n, pdt.n);
    let init = fx.ctx.symbol(n).as_type_param().and_then(|d| d.init.clone());
    assert_eq!(init, Some(Expr::int(16, 4)));
    assert!(fx.ctx.pdt_instance().is_none());
}

#[test]
fn explicit_values_override_defaults() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);

    let three = fx.int_expr(3);
    let n = keyword(&mut fx, "n", three);
    let spec = instantiate(&mut fx, unit, pdt.ty, &[n]);

    assert_eq!(param_value(&mut fx, spec, "k"), Some(Expr::int(4, 4)));
    assert_eq!(param_value(&mut fx, spec, "n"), Some(Expr::int(3, 4)));
}

#[test]
fn non_constant_kind_value_is_diagnosed_with_its_declaration() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);
    fx.integer_var(unit, "v");

    let v = fx.name_expr("v");
    let spec = instantiate(&mut fx, unit, pdt.ty, &[positional(v)]);

    let errors = fx.ctx.diagnostics().errors();
    assert!(matches!(
        errors[0].error,
        SemanticError::KindParamNotConstant { ref name, .. } if name == "k"
    ));
    assert_eq!(errors[0].notes.len(), 1);
    assert_eq!(errors[0].notes[0].span, fx.ctx.symbol(pdt.k).span());
    assert!(matches!(errors[1].error, SemanticError::KindNotConstant { .. }));

    let value = member(&mut fx, spec, "value");
    assert_eq!(intrinsic_kind(&fx, value), Some(4));
}

#[test]
fn non_integer_value_is_not_convertible() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);

    let real = syntax::Expr::new(ExprKind::RealLiteral("1.5".into()), Span::default());
    instantiate(&mut fx, unit, pdt.ty, &[positional(real)]);

    let errors = fx.ctx.diagnostics().errors();
    assert!(matches!(
        errors[0].error,
        SemanticError::TypeParamNotConvertible { ref value, .. } if value == "1.5"
    ));
    assert_eq!(errors[0].notes[0].message, "declared here");
}

#[test]
fn unsupported_kind_falls_back_to_default() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let ty = fx.derived_type(unit, "wide");
    let k = fx.type_param(ty, "k", TypeParamAttr::Kind, None);
    let real_k = fx.kind_param_type(TypeCategory::Real, k);
    fx.component(ty, "x", real_k);

    let seven = fx.int_expr(7);
    let spec = instantiate(&mut fx, unit, ty, &[positional(seven)]);

    assert!(matches!(
        fx.ctx.diagnostics().errors()[..],
        [crate::diagnostics::TypeError {
            error: SemanticError::UnsupportedKind { kind: 7, .. },
            ..
        }]
    ));
    let x = member(&mut fx, spec, "x");
    assert_eq!(intrinsic_kind(&fx, x), Some(4));
}

#[test]
fn parent_component_receives_inherited_values() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let base = fx.derived_type(unit, "base");
    let k = fx.type_param(base, "k", TypeParamAttr::Kind, None);
    let int_k = fx.kind_param_type(TypeCategory::Integer, k);
    fx.component(base, "x", int_k.clone());
    let child = fx.derived_type(unit, "child");
    fx.extends(child, base);
    fx.component(child, "y", int_k);

    let eight = fx.int_expr(8);
    let spec = instantiate(&mut fx, unit, child, &[positional(eight)]);

    let y = member(&mut fx, spec, "y");
    assert_eq!(intrinsic_kind(&fx, y), Some(8));
    let parent = member(&mut fx, spec, "base");
    assert!(fx.ctx.symbol(parent).test(SymbolFlag::ParentComp));
    let parent_spec = fx
        .ctx
        .symbol(parent)
        .decl_type()
        .and_then(DeclTypeSpec::as_derived)
        .expect("parent component keeps a derived type");
    assert_ne!(fx.ctx.spec(parent_spec).scope(), fx.ctx.symbol(base).scope());
    let x = member(&mut fx, parent_spec, "x");
    assert_eq!(intrinsic_kind(&fx, x), Some(8));
    assert_eq!(fx.ctx.instantiation_stats().misses(), 2);
}

#[test]
fn self_referential_type_terminates() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let node = fx.derived_type(unit, "node");
    let k = fx.type_param(node, "k", TypeParamAttr::Kind, None);
    let k_name = fx.ctx.symbol(k).name();

    let same = {
        let mut spec = DerivedTypeSpec::new(node);
        spec.add_param_value(k_name, ParamValue::explicit(Expr::TypeParam(k), TypeParamAttr::Kind));
        DeclTypeSpec::TypeDerived(fx.ctx.add_spec(spec))
    };
    let bigger = {
        let mut spec = DerivedTypeSpec::new(node);
        let k_plus_one = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::TypeParam(k)),
            Box::new(Expr::int(1, 4)),
        );
        spec.add_param_value(k_name, ParamValue::explicit(k_plus_one, TypeParamAttr::Kind));
        DeclTypeSpec::TypeDerived(fx.ctx.add_spec(spec))
    };
    let pointer = Attrs::empty().with(Attr::Pointer);
    fx.component_with(node, "same", same, pointer);
    fx.component_with(node, "next", bigger, pointer);

    let four = fx.int_expr(4);
    let spec = instantiate(&mut fx, unit, node, &[positional(four)]);

    let same = member(&mut fx, spec, "same");
    let same_spec = fx.ctx.symbol(same).decl_type().and_then(DeclTypeSpec::as_derived);
    assert_eq!(same_spec, Some(spec));
    let next = member(&mut fx, spec, "next");
    let next_spec = fx
        .ctx
        .symbol(next)
        .decl_type()
        .and_then(DeclTypeSpec::as_derived)
        .expect("derived");
    assert_eq!(fx.ctx.spec(next_spec).scope(), fx.ctx.symbol(node).scope());

    let stats = fx.ctx.instantiation_stats();
    assert_eq!((stats.misses(), stats.hits(), stats.generic_bindings()), (1, 1, 1));
}

#[test]
fn plain_types_and_definitions_bind_to_the_generic_scope() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let plain = fx.derived_type(unit, "plain");
    let int = fx.default_type(TypeCategory::Integer);
    fx.component(plain, "n", int);
    let pdt = declare_pdt(&mut fx, unit);

    let plain_spec = instantiate(&mut fx, unit, plain, &[]);
    assert_eq!(fx.ctx.spec(plain_spec).scope(), fx.ctx.symbol(plain).scope());

    let definition = fx.type_scope(pdt.ty);
    let inside = instantiate(&mut fx, definition, pdt.ty, &[]);
    assert_eq!(fx.ctx.spec(inside).scope(), Some(definition));
    assert_eq!(fx.ctx.instantiation_stats().generic_bindings(), 2);
    assert_eq!(fx.ctx.instantiation_stats().misses(), 0);
}

#[test]
fn plain_type_definitions_still_instantiate_their_components() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);
    let holder = fx.derived_type(unit, "holder");
    let holder_scope = fx.type_scope(holder);

    let eight = fx.int_expr(8);
    let spec = instantiate(&mut fx, holder_scope, pdt.ty, &[positional(eight)]);

    assert_ne!(fx.ctx.spec(spec).scope(), fx.ctx.symbol(pdt.ty).scope());
    let value = member(&mut fx, spec, "value");
    assert_eq!(intrinsic_kind(&fx, value), Some(8));
    let stats = fx.ctx.instantiation_stats();
    assert_eq!((stats.misses(), stats.generic_bindings()), (1, 0));
}

#[test]
fn component_initializers_fold_in_the_instance() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);
    let int = fx.default_type(TypeCategory::Integer);
    let twice = fx.component(pdt.ty, "twice", int);
    fx.object_mut(twice).init = Some(Expr::Binary(
        BinaryOp::Mul,
        Box::new(Expr::TypeParam(pdt.k)),
        Box::new(Expr::int(2, 4)),
    ));

    let three = fx.int_expr(3);
    let spec = instantiate(&mut fx, unit, pdt.ty, &[positional(three)]);

    let twice = member(&mut fx, spec, "twice");
    let init = fx.ctx.symbol(twice).as_object().and_then(|o| o.init.as_ref());
    assert_eq!(init.and_then(evaluate::to_int64), Some(6));
}

#[test]
fn coshape_bounds_fold_in_the_instance() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);
    let int = fx.default_type(TypeCategory::Integer);
    let co = fx.component(pdt.ty, "co", int);
    fx.object_mut(co).coshape = ArraySpec::new(vec![
        ShapeSpec::explicit(Bound::constant(1), Bound::Explicit(Some(Expr::TypeParam(pdt.n)))),
        ShapeSpec::implied(Bound::constant(1)),
    ]);

    let two = fx.int_expr(2);
    let spec = instantiate(&mut fx, unit, pdt.ty, &[positional(two)]);

    let co = member(&mut fx, spec, "co");
    let coshape = &fx.ctx.symbol(co).as_object().expect("object").coshape;
    assert_eq!(coshape.rank(), 2);
    assert_eq!(coshape[0].ubound.value(), Some(4));
    assert!(coshape[1].ubound.is_assumed());
}

#[test]
fn character_length_folds_in_the_instance() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);
    let length = ParamValue::explicit(Expr::TypeParam(pdt.n), TypeParamAttr::Len);
    let text = DeclTypeSpec::Intrinsic(IntrinsicTypeSpec::character(1, length));
    fx.component(pdt.ty, "label", text);

    let five = fx.int_expr(5);
    let spec = instantiate(&mut fx, unit, pdt.ty, &[positional(five)]);

    let label = member(&mut fx, spec, "label");
    let length = fx
        .ctx
        .symbol(label)
        .decl_type()
        .and_then(DeclTypeSpec::as_intrinsic)
        .and_then(|intrinsic| intrinsic.length.as_ref())
        .and_then(ParamValue::explicit_expr)
        .and_then(evaluate::to_int64);
    assert_eq!(length, Some(10));
    assert!(!fx.ctx.diagnostics().has_errors());
}

#[test]
fn binding_diagnoses_malformed_value_lists() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let ty = fx.derived_type(unit, "strict");
    fx.type_param(ty, "k", TypeParamAttr::Kind, None);
    fx.type_param(ty, "n", TypeParamAttr::Len, None);

    let one = fx.int_expr(1);
    let unknown = keyword(&mut fx, "q", one);
    let one = fx.int_expr(1);
    let k = keyword(&mut fx, "k", one);
    let stray = positional(fx.int_expr(2));
    let one = fx.int_expr(1);
    let again = keyword(&mut fx, "k", one);
    bind_type_param_values(&mut fx.ctx, unit, ty, &[unknown, k, stray, again], Span::default());

    assert_eq!(codes(&fx), ["E2201", "E2202", "E2204", "E2205"]);
}

#[test]
fn too_many_positional_values() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let pdt = declare_pdt(&mut fx, unit);
    let values: Vec<_> = [1, 2, 3].map(|v| positional(fx.int_expr(v))).into();

    let spec = bind_type_param_values(&mut fx.ctx, unit, pdt.ty, &values, Span::default());

    assert!(matches!(
        fx.ctx.diagnostics().errors()[..],
        [crate::diagnostics::TypeError {
            error: SemanticError::TooManyTypeParams { .. },
            ..
        }]
    ));
    assert_eq!(spec.parameters().len(), 2);
}

#[test]
fn inherited_parameters_come_first() {
    let mut fx = Fixture::new();
    let unit = fx.program("p");
    let base = fx.derived_type(unit, "base");
    let k = fx.type_param(base, "k", TypeParamAttr::Kind, None);
    let child = fx.derived_type(unit, "child");
    fx.extends(child, base);
    let n = fx.type_param(child, "n", TypeParamAttr::Len, None);

    assert_eq!(order_parameter_declarations(&fx.ctx, child), [k, n]);
    let names: Vec<_> = order_parameter_names(&fx.ctx, child)
        .into_iter()
        .map(|name| fx.ctx.name_str(name).to_string())
        .collect();
    assert_eq!(names, ["k", "n"]);
}
