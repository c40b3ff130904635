// instantiate/params.rs
//
// Type parameter binding: from a written parameter list to a spec, and the
// fold-and-convert pass that resolves a spec's values.

use ftn_frontend::{TypeParamSpec, TypeParamValue};
use ftn_identity::{DerivedTypeSpecId, Name, ScopeId, Span, SymbolId};
use rustc_hash::FxHashSet;

use crate::context::SemanticsContext;
use crate::errors::SemanticError;
use crate::evaluate::{analyze_expr, convert_to_type, fold};
use crate::type_display::display_expr;
use crate::types::{
    DeclTypeSpec, DerivedTypeSpec, IntrinsicTypeSpec, ParamValue, ParamValueCategory,
    TypeCategory, TypeParamAttr,
};

/// The type and its ancestors, outermost ancestor first.
fn inheritance_chain(ctx: &SemanticsContext, type_symbol: SymbolId) -> Vec<SymbolId> {
    let mut chain = Vec::new();
    let mut seen = FxHashSet::default();
    let mut current = Some(type_symbol);
    while let Some(symbol) = current {
        if !seen.insert(symbol) {
            break;
        }
        chain.push(symbol);
        current = ctx
            .parent_type_spec(symbol)
            .map(|parent| ctx.spec(parent).type_symbol());
    }
    chain.reverse();
    chain
}

/// Parameter names of a type, inherited ones first.
pub fn order_parameter_names(ctx: &SemanticsContext, type_symbol: SymbolId) -> Vec<Name> {
    inheritance_chain(ctx, type_symbol)
        .into_iter()
        .flat_map(|symbol| ctx.symbol(symbol).derived_type_details().param_names.clone())
        .collect()
}

/// Parameter declarations of a type, inherited ones first.
pub fn order_parameter_declarations(ctx: &SemanticsContext, type_symbol: SymbolId) -> Vec<SymbolId> {
    inheritance_chain(ctx, type_symbol)
        .into_iter()
        .flat_map(|symbol| ctx.symbol(symbol).derived_type_details().param_decls.clone())
        .collect()
}

fn declared_param_type(ctx: &SemanticsContext, decl: SymbolId) -> DeclTypeSpec {
    ctx.symbol(decl)
        .as_type_param()
        .and_then(|details| details.ty.clone())
        .unwrap_or_else(|| {
            DeclTypeSpec::Intrinsic(IntrinsicTypeSpec::new(
                TypeCategory::Integer,
                ctx.options().default_kind(TypeCategory::Integer),
            ))
        })
}

fn declared_param_attr(ctx: &SemanticsContext, decl: SymbolId) -> TypeParamAttr {
    ctx.symbol(decl)
        .as_type_param()
        .map(|details| details.attr)
        .unwrap_or(TypeParamAttr::Kind)
}

/// Build a spec for `type_symbol` from a written parameter value list,
/// resolving value expressions in `scope`.
pub fn bind_type_param_values(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    type_symbol: SymbolId,
    values: &[TypeParamSpec],
    span: Span,
) -> DerivedTypeSpec {
    let names = order_parameter_names(ctx, type_symbol);
    let decls = order_parameter_declarations(ctx, type_symbol);
    let mut spec = DerivedTypeSpec::new(type_symbol);
    let mut next_positional = 0;
    let mut seen_keyword = false;
    let mut reported_too_many = false;

    for value in values {
        let name = match value.keyword {
            Some(keyword) => {
                seen_keyword = true;
                if !names.contains(&keyword.name) {
                    let name = ctx.name_str(keyword.name).to_string();
                    ctx.diagnostics_mut().add_error(
                        SemanticError::NotATypeParameter {
                            name,
                            span: keyword.span.into(),
                        },
                        keyword.span,
                    );
                    continue;
                }
                keyword.name
            }
            None if seen_keyword => {
                ctx.diagnostics_mut().add_error(
                    SemanticError::TypeParamNeedsName {
                        span: value.span.into(),
                    },
                    value.span,
                );
                continue;
            }
            None => {
                let Some(&name) = names.get(next_positional) else {
                    if !reported_too_many {
                        reported_too_many = true;
                        let type_name = ctx.symbol_name(type_symbol).to_string();
                        ctx.diagnostics_mut().add_error(
                            SemanticError::TooManyTypeParams {
                                type_name,
                                span: value.span.into(),
                            },
                            value.span,
                        );
                    }
                    continue;
                };
                next_positional += 1;
                name
            }
        };
        if spec.find_parameter(name).is_some() {
            let name = ctx.name_str(name).to_string();
            ctx.diagnostics_mut().add_error(
                SemanticError::DuplicateTypeParam {
                    name,
                    span: value.span.into(),
                },
                value.span,
            );
            continue;
        }
        let attr = decls
            .iter()
            .copied()
            .find(|decl| ctx.symbol(*decl).name() == name)
            .map(|decl| declared_param_attr(ctx, decl))
            .unwrap_or(TypeParamAttr::Kind);
        let category = match &value.value {
            TypeParamValue::Expr(expr) => match analyze_expr(ctx, scope, expr) {
                Some(expr) => ParamValueCategory::Explicit(expr),
                None => ParamValueCategory::Unset,
            },
            TypeParamValue::Assumed => ParamValueCategory::Assumed,
            TypeParamValue::Deferred => ParamValueCategory::Deferred,
        };
        spec.add_param_value(name, ParamValue::new(category, attr));
    }

    for decl in decls {
        let name = ctx.symbol(decl).name();
        let has_default = ctx
            .symbol(decl)
            .as_type_param()
            .is_some_and(|details| details.init.is_some());
        if spec.find_parameter(name).is_none() && !has_default {
            let name = ctx.name_str(name).to_string();
            ctx.diagnostics_mut().add_error(
                SemanticError::TypeParamMissing {
                    name,
                    span: span.into(),
                },
                span,
            );
        }
    }
    spec
}

/// Convert and fold the explicit values of `spec` in the current folding
/// context, then add folded defaults for the parameters left unset.
///
/// Defaults fold with `spec` itself installed as the current instance and
/// are added one at a time in declaration order, so a default may use the
/// value of any parameter before it.
pub fn process_parameter_expressions(ctx: &mut SemanticsContext, spec: DerivedTypeSpecId, span: Span) {
    let type_symbol = ctx.spec(spec).type_symbol();
    let decls = order_parameter_declarations(ctx, type_symbol);

    for &decl in &decls {
        let name = ctx.symbol(decl).name();
        let Some(value) = ctx.spec(spec).find_parameter(name).and_then(ParamValue::explicit_expr).cloned() else {
            continue;
        };
        let ty = declared_param_type(ctx, decl);
        match convert_to_type(&ty, value.clone()) {
            Some(converted) => {
                let folded = fold(ctx, converted);
                if let Some(param) = ctx.spec_mut(spec).find_parameter_mut(name) {
                    param.set_explicit(folded);
                }
            }
            None => {
                let error = SemanticError::TypeParamNotConvertible {
                    name: ctx.name_str(name).to_string(),
                    value: display_expr(ctx, &value),
                    span: span.into(),
                };
                let declared = ctx.symbol(decl).span();
                ctx.diagnostics_mut()
                    .add_error(error, span)
                    .attach_note(declared, "declared here");
            }
        }
    }

    let mut ctx = ctx.with_pdt_instance(spec);
    for decl in decls {
        let name = ctx.symbol(decl).name();
        if ctx.spec(spec).find_parameter(name).is_some() {
            continue;
        }
        let Some(init) = ctx.symbol(decl).as_type_param().and_then(|d| d.init.clone()) else {
            continue;
        };
        let ty = declared_param_type(&ctx, decl);
        let attr = declared_param_attr(&ctx, decl);
        if let Some(converted) = convert_to_type(&ty, init) {
            let folded = fold(&ctx, converted);
            tracing::trace!(param = ctx.name_str(name), "default type parameter folded");
            ctx.spec_mut(spec)
                .add_param_value(name, ParamValue::explicit(folded, attr));
        }
    }
}
