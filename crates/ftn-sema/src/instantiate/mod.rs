//! Parameterized derived type instantiation.
//!
//! An instance is a derived-type scope bound to a fully folded spec. The
//! scope holds the instance's type parameters (with their actual values as
//! initializers) and a clone of every other symbol of the generic type, with
//! parameter-dependent kinds, bounds and initializers folded.
//!
//! Nested instantiations run on an explicit frame stack. Each cloning step
//! installs its own frame's spec as the current PDT instance, so the guard is
//! never held across a nested request.

mod params;

pub use params::{
    bind_type_param_values, order_parameter_declarations, order_parameter_names,
    process_parameter_expressions,
};

use ftn_identity::{DerivedTypeSpecId, ScopeId, Span, SymbolId};

use crate::array_spec::ArraySpec;
use crate::context::SemanticsContext;
use crate::errors::SemanticError;
use crate::evaluate::{self, fold};
use crate::scope::ScopeKind;
use crate::symbol::{Details, SymbolFlag, TypeParamDetails};
use crate::type_display::display_expr;
use crate::types::{
    DeclTypeSpec, DerivedTypeSpec, IntrinsicTypeSpec, ParamValueCategory, TypeCategory,
    TypeParamAttr, is_valid_kind,
};

/// Counters for instantiation requests.
#[derive(Debug, Clone, Default)]
pub struct InstantiationStats {
    hits: usize,
    misses: usize,
    generic_bindings: usize,
}

impl InstantiationStats {
    /// Requests answered by an existing instance
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Requests that created a new instance scope
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Requests bound to the generic type's own scope
    pub fn generic_bindings(&self) -> usize {
        self.generic_bindings
    }
}

/// One instance whose symbols are still being cloned.
struct Frame {
    spec: DerivedTypeSpecId,
    instance_scope: ScopeId,
    /// Scope the instance was requested from; nested requests use it too
    requesting_scope: ScopeId,
    /// Generic symbols left to clone, last one first
    pending: Vec<SymbolId>,
    /// Component in the parent frame's instance whose type becomes this spec
    patch: Option<SymbolId>,
}

enum Request {
    Ready(DerivedTypeSpecId),
    Start(Frame),
}

/// Find the instance of `spec` visible from `scope`, or create it.
///
/// The returned spec is always bound to a scope: an instance scope for a
/// parameterized type, the generic scope otherwise. Problems with parameter
/// values are diagnosed and the instance is still produced.
#[tracing::instrument(skip(ctx, spec), fields(type_symbol = spec.type_symbol().index()))]
pub fn find_or_instantiate_derived_type(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    spec: DerivedTypeSpec,
) -> DerivedTypeSpecId {
    let span = ctx.symbol(spec.type_symbol()).span();
    let mut stack: Vec<Frame> = Vec::new();
    match request(ctx, scope, spec, span, None, &stack) {
        Request::Ready(id) => return id,
        Request::Start(frame) => stack.push(frame),
    }

    loop {
        let top = stack.last_mut().expect("instantiation stack must not be empty");
        match top.pending.pop() {
            Some(generic_symbol) => {
                let (spec, instance_scope, requesting_scope) =
                    (top.spec, top.instance_scope, top.requesting_scope);
                let nested = {
                    let mut ctx = ctx.with_pdt_instance(spec);
                    clone_symbol(&mut ctx, instance_scope, requesting_scope, generic_symbol, &stack)
                };
                if let Some(nested) = nested {
                    stack.push(nested);
                }
            }
            None => {
                let done = stack.pop().expect("instantiation stack must not be empty");
                tracing::debug!(
                    scope = done.instance_scope.index(),
                    depth = stack.len(),
                    "instance complete"
                );
                match (stack.is_empty(), done.patch) {
                    (true, _) => return done.spec,
                    (false, Some(component)) => rebind_component_type(ctx, component, done.spec),
                    (false, None) => {}
                }
            }
        }
    }
}

/// Instantiate `spec` and return its scope.
pub fn instantiate_derived_type(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    spec: DerivedTypeSpec,
) -> Option<ScopeId> {
    let id = find_or_instantiate_derived_type(ctx, scope, spec);
    ctx.spec(id).scope()
}

fn is_parameterized(ctx: &SemanticsContext, type_symbol: SymbolId) -> bool {
    !order_parameter_names(ctx, type_symbol).is_empty()
}

/// Whether `scope` is the definition of a parameterized derived type, where
/// references to its own parameters cannot be resolved yet.
fn in_generic_definition(ctx: &SemanticsContext, scope: ScopeId) -> bool {
    let s = ctx.scope(scope);
    s.is_derived_type()
        && s.derived_type_spec().is_none()
        && s.symbol().is_some_and(|symbol| is_parameterized(ctx, symbol))
}

/// An instance of `spec` declared in `scope` or one of its ancestors.
fn find_instance(ctx: &SemanticsContext, mut scope: ScopeId, spec: DerivedTypeSpecId) -> Option<DerivedTypeSpecId> {
    let wanted = ctx.spec(spec);
    loop {
        let s = ctx.scope(scope);
        let found = s.declared_types().iter().copied().find(|candidate| {
            let candidate = ctx.spec(*candidate);
            candidate.scope().is_some() && candidate.structurally_equal(wanted)
        });
        if found.is_some() {
            return found;
        }
        scope = s.parent()?;
    }
}

/// Resolve a request to an existing scope, or open a frame for a new
/// instance. Explicit values fold in whatever instance is current.
fn request(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    spec: DerivedTypeSpec,
    span: Span,
    patch: Option<SymbolId>,
    stack: &[Frame],
) -> Request {
    let type_symbol = spec.type_symbol();
    let generic_scope = ctx.symbol(type_symbol).scope();
    let id = ctx.add_spec(spec);
    let Some(generic_scope) = generic_scope else {
        return Request::Ready(id);
    };
    if !is_parameterized(ctx, type_symbol) || in_generic_definition(ctx, scope) {
        ctx.spec_mut(id).set_scope(generic_scope);
        ctx.instantiation_stats.generic_bindings += 1;
        return Request::Ready(id);
    }

    process_parameter_expressions(ctx, id, span);

    if let Some(existing) = find_instance(ctx, scope, id) {
        ctx.instantiation_stats.hits += 1;
        tracing::trace!(spec = existing.index(), "instance reused");
        return Request::Ready(existing);
    }
    if stack
        .iter()
        .any(|frame| ctx.spec(frame.spec).type_symbol() == type_symbol)
    {
        tracing::trace!(
            type_name = ctx.symbol_name(type_symbol),
            "recursive instantiation bound to generic type"
        );
        ctx.spec_mut(id).set_scope(generic_scope);
        ctx.instantiation_stats.generic_bindings += 1;
        return Request::Ready(id);
    }

    let instance_scope = ctx.make_scope(scope, ScopeKind::DerivedType, Some(type_symbol));
    ctx.scope_mut(instance_scope).set_derived_type_spec(id);
    ctx.spec_mut(id).set_scope(instance_scope);
    ctx.scope_mut(scope).add_declared_type(id);
    ctx.instantiation_stats.misses += 1;
    tracing::debug!(
        type_name = ctx.symbol_name(type_symbol),
        scope = instance_scope.index(),
        "instantiating derived type"
    );

    declare_instance_parameters(ctx, id, instance_scope, span);

    let mut pending = ctx.scope(generic_scope).symbols();
    pending.reverse();
    Request::Start(Frame {
        spec: id,
        instance_scope,
        requesting_scope: scope,
        pending,
        patch,
    })
}

/// Give the instance scope a type parameter symbol, initialized with its
/// actual value, for each of the type's own parameters that has a value.
fn declare_instance_parameters(
    ctx: &mut SemanticsContext,
    spec: DerivedTypeSpecId,
    instance_scope: ScopeId,
    span: Span,
) {
    let type_symbol = ctx.spec(spec).type_symbol();
    let decls = ctx.symbol(type_symbol).derived_type_details().param_decls.clone();
    for decl in decls {
        let name = ctx.symbol(decl).name();
        let Some(details) = ctx.symbol(decl).as_type_param().cloned() else {
            continue;
        };
        let Some(param) = ctx.spec_mut(spec).find_parameter_mut(name) else {
            continue;
        };
        param.set_attr(details.attr);
        let Some(value) = param.explicit_expr().cloned() else {
            continue;
        };
        if details.attr == TypeParamAttr::Kind
            && value.rank() == 0
            && value.category() == Some(TypeCategory::Integer)
            && evaluate::to_int64(&value).is_none()
        {
            let error = SemanticError::KindParamNotConstant {
                name: ctx.name_str(name).to_string(),
                value: display_expr(ctx, &value),
                span: span.into(),
            };
            let declared = ctx.symbol(decl).span();
            ctx.diagnostics_mut()
                .add_error(error, span)
                .attach_note(declared, "declared here");
        }
        let mut instance_details = TypeParamDetails::new(details.attr);
        instance_details.ty = details.ty;
        instance_details.init = Some(value);
        let attrs = ctx.symbol(decl).attrs();
        let decl_span = ctx.symbol(decl).span();
        ctx.try_emplace(
            instance_scope,
            name,
            attrs,
            Details::TypeParam(instance_details),
            decl_span,
        );
    }
}

/// Clone one symbol of the generic type into the instance. Runs with the
/// instance installed as the current PDT instance. Returns a frame when a
/// component's type needs a new nested instance.
fn clone_symbol(
    ctx: &mut SemanticsContext,
    instance_scope: ScopeId,
    requesting_scope: ScopeId,
    generic_symbol: SymbolId,
    stack: &[Frame],
) -> Option<Frame> {
    let old = ctx.symbol(generic_symbol);
    let (name, attrs, flags, span) = (old.name(), old.attrs(), old.flags(), old.span());
    let details = old.details().clone();
    let (new_symbol, inserted) = ctx.try_emplace(instance_scope, name, attrs, Details::Unknown, span);
    if !inserted {
        assert!(
            matches!(ctx.symbol(new_symbol).details(), Details::TypeParam(_)),
            "only type parameters are declared before cloning"
        );
        return None;
    }
    tracing::trace!(name = ctx.name_str(name), "cloning component");
    *ctx.symbol_mut(new_symbol).flags_mut() = flags;

    let Details::ObjectEntity(mut object) = details else {
        ctx.symbol_mut(new_symbol).set_details(details);
        return None;
    };
    object.init = object.init.map(|init| fold(ctx, init));
    fold_bounds(ctx, &mut object.shape);
    fold_bounds(ctx, &mut object.coshape);

    let mut nested = None;
    match object.ty.take() {
        Some(DeclTypeSpec::Intrinsic(intrinsic)) => {
            object.ty = Some(DeclTypeSpec::Intrinsic(instantiate_intrinsic_type(ctx, &intrinsic, span)));
        }
        Some(ty @ (DeclTypeSpec::TypeDerived(_) | DeclTypeSpec::ClassDerived(_))) => {
            let component_spec = ty.as_derived().expect("derived type spec must be present");
            let mut new_spec = ctx.spec(component_spec).unbound();
            if flags.contains(SymbolFlag::ParentComp) {
                let instance = ctx.pdt_instance().expect("cloning must run inside an instance");
                let forwarded: Vec<_> = ctx
                    .spec(instance)
                    .parameters()
                    .iter()
                    .filter(|(param, _)| !ctx.scope(instance_scope).contains(*param))
                    .cloned()
                    .collect();
                for (param, value) in forwarded {
                    new_spec.add_param_value(param, value);
                }
            }
            match request(ctx, requesting_scope, new_spec, span, Some(new_symbol), stack) {
                Request::Ready(id) => object.ty = Some(ty.with_derived(id)),
                Request::Start(frame) => {
                    object.ty = Some(ty);
                    nested = Some(frame);
                }
            }
        }
        other => object.ty = other,
    }
    ctx.symbol_mut(new_symbol)
        .set_details(Details::ObjectEntity(object));
    nested
}

fn fold_bounds(ctx: &SemanticsContext, shape: &mut ArraySpec) {
    for dim in shape.iter_mut() {
        for bound in [&mut dim.lbound, &mut dim.ubound] {
            if let Some(expr) = bound.explicit_mut() {
                *expr = fold(ctx, expr.clone());
            }
        }
    }
}

fn rebind_component_type(ctx: &mut SemanticsContext, component: SymbolId, spec: DerivedTypeSpecId) {
    if let Some(object) = ctx.symbol_mut(component).as_object_mut()
        && let Some(ty) = object.ty.as_mut()
    {
        *ty = ty.with_derived(spec);
    }
}

/// Resolve an intrinsic type's kind (and character length) in the current
/// instance. A kind that does not fold to a supported value is diagnosed and
/// replaced by the category's default kind.
pub fn instantiate_intrinsic_type(
    ctx: &mut SemanticsContext,
    intrinsic: &IntrinsicTypeSpec,
    span: Span,
) -> IntrinsicTypeSpec {
    let category = intrinsic.category;
    let kind = match evaluate::to_int64(&fold(ctx, intrinsic.kind.clone())) {
        Some(kind) if is_valid_kind(category, kind) => kind,
        Some(kind) => {
            ctx.diagnostics_mut().add_error(
                SemanticError::UnsupportedKind {
                    kind,
                    category: category.to_string(),
                    span: span.into(),
                },
                span,
            );
            ctx.options().default_kind(category)
        }
        None => {
            ctx.diagnostics_mut().add_error(
                SemanticError::KindNotConstant {
                    category: category.to_string(),
                    span: span.into(),
                },
                span,
            );
            ctx.options().default_kind(category)
        }
    };
    let mut resolved = IntrinsicTypeSpec::new(category, kind);
    resolved.length = intrinsic.length.clone().map(|mut length| {
        if let ParamValueCategory::Explicit(expr) = length.category() {
            let folded = fold(ctx, expr.clone());
            length.set_explicit(folded);
        }
        length
    });
    resolved
}

#[cfg(test)]
mod tests;
