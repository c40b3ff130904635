//! Storage association through EQUIVALENCE.
//!
//! Each statement group is checked object by object into a working set, then
//! merged into the program unit's partition. The partition is a list of sets
//! plus an object-to-set index; every merge re-points the index for the
//! objects it moves and empties the source set.

use std::collections::BTreeSet;
use std::fmt::Write;

use ftn_frontend::{AstPrinter, DataRef, Designator, DesignatorKind, EquivalenceStmt, Ident, Subscript};
use ftn_identity::{ScopeId, Span, SymbolId};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::array_spec::Bound;
use crate::components::find_ultimate_component;
use crate::context::SemanticsContext;
use crate::errors::{SemanticError, SemanticWarning};
use crate::evaluate::{self, analyze_expr, fold};
use crate::options::LanguageFeature;
use crate::symbol::{Attr, Details, SymbolFlag};
use crate::types::{DeclTypeSpec, IntrinsicTypeSpec, TypeCategory};

/// The storage unit an equivalence designator names: a symbol, optionally an
/// element of it, optionally a character offset into that element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquivalenceObject {
    pub symbol: SymbolId,
    pub subscripts: SmallVec<[i64; 4]>,
    pub substring_start: Option<i64>,
}

impl EquivalenceObject {
    pub fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            subscripts: SmallVec::new(),
            substring_start: None,
        }
    }

    /// Source form, e.g. `a(1,2)(3:)`.
    pub fn display(&self, ctx: &SemanticsContext) -> String {
        let mut out = ctx.symbol_name(self.symbol).to_string();
        if !self.subscripts.is_empty() {
            out.push('(');
            for (i, subscript) in self.subscripts.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}", subscript);
            }
            out.push(')');
        }
        if let Some(start) = self.substring_start {
            let _ = write!(out, "({}:)", start);
        }
        out
    }
}

/// One storage class.
pub type EquivalenceSet = Vec<EquivalenceObject>;

/// The object being built from the designator under inspection.
#[derive(Debug, Default)]
struct CurrentObject {
    symbol: Option<SymbolId>,
    subscripts: SmallVec<[i64; 4]>,
    substring_start: Option<i64>,
}

/// Partition state for one program unit.
#[derive(Debug)]
pub struct EquivalenceSetResolver {
    scope: ScopeId,
    sets: Vec<EquivalenceSet>,
    object_to_set: FxHashMap<EquivalenceObject, usize>,
    curr_set: EquivalenceSet,
    curr_object: CurrentObject,
}

impl EquivalenceSetResolver {
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            sets: Vec::new(),
            object_to_set: FxHashMap::default(),
            curr_set: Vec::new(),
            curr_object: CurrentObject::default(),
        }
    }

    pub fn sets(&self) -> &[EquivalenceSet] {
        &self.sets
    }

    /// Index of the set holding `object`, if any.
    pub fn set_index(&self, object: &EquivalenceObject) -> Option<usize> {
        self.object_to_set.get(object).copied()
    }

    /// Check one designator and, if legal, add it to the working set.
    pub fn add_to_set(&mut self, ctx: &mut SemanticsContext, designator: &Designator) {
        if self.check_designator(ctx, designator) {
            let symbol = self
                .curr_object
                .symbol
                .expect("checked designator must name a symbol");
            if let Some(first) = self.curr_set.first().map(|object| object.symbol) {
                // Only the diagnostics matter; the object joins the set either way.
                let _ = check_can_equivalence(ctx, designator.span, first, symbol)
                    && check_can_equivalence(ctx, designator.span, symbol, first);
            }
            let mut subscripts = std::mem::take(&mut self.curr_object.subscripts);
            if subscripts.is_empty()
                && let Some(lower) = whole_array_lower_bounds(ctx, symbol)
            {
                subscripts = lower;
            }
            self.curr_set.push(EquivalenceObject {
                symbol,
                subscripts,
                substring_start: self.curr_object.substring_start,
            });
            if ctx.symbol(symbol).attrs().contains(Attr::Save) {
                mark_saved(ctx, &self.curr_set);
            }
        }
        self.curr_object = CurrentObject::default();
    }

    /// Close the working set: merge it into every existing set it shares an
    /// object with, or start a new set.
    pub fn finish_set(&mut self, ctx: &mut SemanticsContext, span: Span) {
        let existing: BTreeSet<usize> = self
            .curr_set
            .iter()
            .filter_map(|object| self.object_to_set.get(object).copied())
            .collect();
        let curr = std::mem::take(&mut self.curr_set);
        let mut existing = existing.into_iter();
        match existing.next() {
            None => {
                self.sets.push(Vec::new());
                let dst = self.sets.len() - 1;
                self.merge_into(ctx, span, curr, dst);
            }
            Some(dst) => {
                self.merge_into(ctx, span, curr, dst);
                for other in existing {
                    let src = std::mem::take(&mut self.sets[other]);
                    self.merge_into(ctx, span, src, dst);
                }
            }
        }
        tracing::debug!(sets = self.sets.len(), "equivalence set closed");
    }

    /// Record the non-empty sets on the scope and return them.
    pub fn finish(self, ctx: &mut SemanticsContext) -> Vec<EquivalenceSet> {
        let sets: Vec<EquivalenceSet> = self.sets.into_iter().filter(|s| !s.is_empty()).collect();
        for set in &sets {
            ctx.scope_mut(self.scope).add_equivalence_set(set.clone());
        }
        sets
    }

    fn merge_into(
        &mut self,
        ctx: &mut SemanticsContext,
        span: Span,
        src: EquivalenceSet,
        dst_index: usize,
    ) {
        let saved = src
            .iter()
            .chain(self.sets[dst_index].iter())
            .any(|object| ctx.symbol(object.symbol).attrs().contains(Attr::Save));
        for object in src {
            let existing = self.sets[dst_index]
                .iter()
                .find(|o| o.symbol == object.symbol)
                .cloned();
            match existing {
                Some(existing) if existing == object => continue,
                Some(existing) => {
                    let first = existing.display(ctx);
                    let second = object.display(ctx);
                    ctx.diagnostics_mut().add_error(
                        SemanticError::EquivalenceSameStorageUnit {
                            first,
                            second,
                            span: span.into(),
                        },
                        span,
                    );
                }
                None => self.sets[dst_index].push(object.clone()),
            }
            self.object_to_set.insert(object, dst_index);
        }
        if saved {
            mark_saved(ctx, &self.sets[dst_index]);
        }
    }

    fn check_designator(&mut self, ctx: &mut SemanticsContext, designator: &Designator) -> bool {
        match &designator.kind {
            DesignatorKind::DataRef(data_ref) => self.check_data_ref(ctx, designator, data_ref),
            DesignatorKind::Substring { base, lower, upper } => {
                let mut ok = self.check_data_ref(ctx, designator, base);
                if let Some(lower) = lower {
                    ok &= self.check_substring_bound(ctx, lower, true);
                }
                if let Some(upper) = upper {
                    ok &= self.check_substring_bound(ctx, upper, false);
                }
                ok
            }
        }
    }

    fn check_data_ref(
        &mut self,
        ctx: &mut SemanticsContext,
        designator: &Designator,
        data_ref: &DataRef,
    ) -> bool {
        match data_ref {
            DataRef::Name(ident) => self.check_object(ctx, *ident),
            DataRef::Component { .. } => {
                let name = AstPrinter::new(ctx.interner()).print_designator(designator);
                ctx.diagnostics_mut().add_error(
                    SemanticError::EquivalenceComponent {
                        name,
                        span: designator.span.into(),
                    },
                    designator.span,
                );
                false
            }
            DataRef::ArrayElement { base, subscripts } => {
                let mut ok = self.check_data_ref(ctx, designator, base);
                for subscript in subscripts {
                    ok &= match subscript {
                        Subscript::Triplet(_) => {
                            let text = AstPrinter::new(ctx.interner()).print_designator(designator);
                            ctx.diagnostics_mut().add_error(
                                SemanticError::EquivalenceArraySection {
                                    designator: text,
                                    span: designator.span.into(),
                                },
                                designator.span,
                            );
                            false
                        }
                        Subscript::Expr(expr) => self.check_array_bound(ctx, expr),
                    };
                }
                ok
            }
            DataRef::Coindexed { .. } => {
                let text = AstPrinter::new(ctx.interner()).print_designator(designator);
                ctx.diagnostics_mut().add_error(
                    SemanticError::EquivalenceCoindexed {
                        designator: text,
                        span: designator.span.into(),
                    },
                    designator.span,
                );
                false
            }
        }
    }

    /// Whether the named entity may appear in an equivalence set at all.
    fn check_object(&mut self, ctx: &mut SemanticsContext, ident: Ident) -> bool {
        let Some(symbol) = ctx.find_symbol(self.scope, ident.name) else {
            let name = ctx.name_str(ident.name).to_string();
            ctx.diagnostics_mut().add_error(
                SemanticError::UndefinedName {
                    name,
                    span: ident.span.into(),
                },
                ident.span,
            );
            return false;
        };
        self.curr_object.symbol = Some(symbol);
        let Some(error) = object_error(ctx, symbol, ident.span) else {
            return true;
        };
        ctx.symbol_mut(symbol).flags_mut().insert(SymbolFlag::Error);
        ctx.diagnostics_mut().add_error(error, ident.span);
        false
    }

    fn check_array_bound(&mut self, ctx: &mut SemanticsContext, bound: &ftn_frontend::Expr) -> bool {
        let Some(expr) = analyze_expr(ctx, self.scope, bound) else {
            return false;
        };
        let expr = fold(ctx, expr);
        if expr.rank() > 0 {
            let subscript = AstPrinter::new(ctx.interner()).print_expr(bound);
            ctx.diagnostics_mut().add_error(
                SemanticError::EquivalenceVectorSubscript {
                    subscript,
                    span: bound.span.into(),
                },
                bound.span,
            );
            return false;
        }
        match evaluate::to_int64(&expr) {
            Some(value) => {
                self.curr_object.subscripts.push(value);
                true
            }
            None => {
                let subscript = AstPrinter::new(ctx.interner()).print_expr(bound);
                ctx.diagnostics_mut().add_error(
                    SemanticError::EquivalenceNonConstantSubscript {
                        subscript,
                        span: bound.span.into(),
                    },
                    bound.span,
                );
                false
            }
        }
    }

    fn check_substring_bound(
        &mut self,
        ctx: &mut SemanticsContext,
        bound: &ftn_frontend::Expr,
        is_start: bool,
    ) -> bool {
        let Some(expr) = analyze_expr(ctx, self.scope, bound) else {
            return false;
        };
        let Some(value) = evaluate::to_int64(&fold(ctx, expr)) else {
            let text = AstPrinter::new(ctx.interner()).print_expr(bound);
            ctx.diagnostics_mut().add_error(
                SemanticError::EquivalenceNonConstantSubstring {
                    bound: text,
                    span: bound.span.into(),
                },
                bound.span,
            );
            return false;
        };
        if !is_start {
            if value < self.curr_object.substring_start.unwrap_or(1) {
                ctx.diagnostics_mut().add_error(
                    SemanticError::EquivalenceZeroLengthSubstring {
                        span: bound.span.into(),
                    },
                    bound.span,
                );
                return false;
            }
        } else if value != 1 {
            self.curr_object.substring_start = Some(value);
        }
        true
    }
}

/// Resolve every group of every EQUIVALENCE statement in `scope`.
pub fn resolve_equivalence(
    ctx: &mut SemanticsContext,
    scope: ScopeId,
    stmts: &[EquivalenceStmt],
) -> Vec<EquivalenceSet> {
    let mut resolver = EquivalenceSetResolver::new(scope);
    for stmt in stmts {
        for group in &stmt.sets {
            let span = group
                .iter()
                .map(|d| d.span)
                .reduce(Span::merge)
                .unwrap_or(stmt.span);
            if group.len() <= 1 {
                ctx.diagnostics_mut().add_error(
                    SemanticError::EquivalenceSingleObject { span: span.into() },
                    span,
                );
            }
            for designator in group {
                resolver.add_to_set(ctx, designator);
            }
            resolver.finish_set(ctx, span);
        }
    }
    resolver.finish(ctx)
}

fn mark_saved(ctx: &mut SemanticsContext, set: &[EquivalenceObject]) {
    for object in set {
        ctx.symbol_mut(object.symbol).attrs_mut().insert(Attr::Save);
    }
}

/// Lower bound of every dimension of an array, when all are constant.
fn whole_array_lower_bounds(ctx: &SemanticsContext, symbol: SymbolId) -> Option<SmallVec<[i64; 4]>> {
    let object = ctx.symbol(ctx.get_ultimate(symbol)).as_object()?;
    if object.shape.is_empty() {
        return None;
    }
    object.shape.iter().map(|dim| dim.lbound.value()).collect()
}

/// The first reason `symbol` cannot be equivalenced, in checking order.
fn object_error(ctx: &SemanticsContext, symbol: SymbolId, span: Span) -> Option<SemanticError> {
    let sym = ctx.symbol(symbol);
    let name = ctx.symbol_name(symbol).to_string();
    let ultimate = ctx.symbol(ctx.get_ultimate(symbol));
    if !matches!(ultimate.details(), Details::ObjectEntity(_)) && !matches!(sym.details(), Details::Use(_)) {
        return Some(SemanticError::NotAnObject {
            name,
            span: span.into(),
        });
    }
    let span = span.into();
    let attrs = sym.attrs();
    if ctx.scope(sym.owner()).is_derived_type() {
        return Some(SemanticError::EquivalenceComponent { name, span });
    }
    if sym.is_dummy() {
        return Some(SemanticError::EquivalenceDummy { name, span });
    }
    if sym.is_func_result() {
        return Some(SemanticError::EquivalenceFunctionResult { name, span });
    }
    if ctx.is_pointer(symbol) {
        return Some(SemanticError::EquivalencePointer { name, span });
    }
    if ctx.is_allocatable(symbol) {
        return Some(SemanticError::EquivalenceAllocatable { name, span });
    }
    if ctx.corank(symbol) > 0 {
        return Some(SemanticError::EquivalenceCoarray { name, span });
    }
    if matches!(sym.details(), Details::Use(_)) {
        return Some(SemanticError::EquivalenceUseAssociated { name, span });
    }
    if attrs.contains(Attr::BindC) {
        return Some(SemanticError::EquivalenceBindC { name, span });
    }
    if attrs.contains(Attr::Target) {
        return Some(SemanticError::EquivalenceTarget { name, span });
    }
    if attrs.contains(Attr::Parameter) {
        return Some(SemanticError::EquivalenceNamedConstant { name, span });
    }
    if in_common_with_bind(ctx, symbol) {
        return Some(SemanticError::EquivalenceBindCommon { name, span });
    }
    match ctx.get_type(symbol) {
        Some(ty) if ty.as_derived().is_some() => {
            let spec = ty.as_derived()?;
            if let Some(component) =
                find_ultimate_component(ctx, spec, |c| c.is_allocatable_or_pointer())
            {
                let which = if ctx.symbol(component).is_pointer() {
                    "pointer"
                } else {
                    "allocatable"
                };
                return Some(SemanticError::EquivalenceIndirectComponent {
                    name,
                    which,
                    span,
                    component: ctx.symbol_name(component).to_string(),
                });
            }
            let type_symbol = ctx.spec(spec).type_symbol();
            if !ctx.symbol(type_symbol).derived_type_details().sequence {
                return Some(SemanticError::EquivalenceNonSequence { name, span });
            }
        }
        _ => {
            let automatic = ultimate.as_object().is_some_and(|object| {
                object.shape.iter().any(|dim| {
                    [&dim.lbound, &dim.ubound].into_iter().any(|bound| match bound {
                        Bound::Explicit(expr) => expr.as_ref().and_then(evaluate::to_int64).is_none(),
                        Bound::Assumed | Bound::Deferred => false,
                    })
                })
            });
            if automatic {
                return Some(SemanticError::EquivalenceAutomaticArray { name, span });
            }
        }
    }
    None
}

fn in_common_with_bind(ctx: &SemanticsContext, symbol: SymbolId) -> bool {
    ctx.symbol(symbol)
        .as_object()
        .and_then(|object| object.common_block)
        .is_some_and(|block| ctx.symbol(block).attrs().contains(Attr::BindC))
}

/// Pairwise legality of sharing storage. Reports and returns false on the
/// first problem.
fn check_can_equivalence(
    ctx: &mut SemanticsContext,
    span: Span,
    sym1: SymbolId,
    sym2: SymbolId,
) -> bool {
    let type1 = ctx.get_type(sym1).cloned();
    let type2 = ctx.get_type(sym2).cloned();
    let is_num1 = is_numeric_sequence_type(ctx, type1.as_ref());
    let is_num2 = is_numeric_sequence_type(ctx, type2.as_ref());
    let is_char1 = is_character_sequence_type(ctx, type1.as_ref());
    let is_char2 = is_character_sequence_type(ctx, type2.as_ref());
    let first = ctx.symbol_name(sym1).to_string();
    let second = ctx.symbol_name(sym2).to_string();
    let source = span.into();
    let warn = ctx
        .options()
        .should_warn(LanguageFeature::EquivalenceNumericWithCharacter);

    let error = if ctx.symbol(sym1).attrs().contains(Attr::Protected)
        && !ctx.symbol(sym2).attrs().contains(Attr::Protected)
    {
        Some(SemanticError::EquivalenceProtected {
            first,
            second,
            span: source,
        })
    } else if is_num1 {
        if is_char2 {
            if warn {
                ctx.diagnostics_mut().add_warning(
                    SemanticWarning::EquivalenceNumericWithCharacter {
                        first,
                        second,
                        span: source,
                    },
                    span,
                );
                return false;
            }
            None
        } else if !is_num2 {
            Some(SemanticError::EquivalenceNumericSequence {
                first,
                second,
                span: source,
            })
        } else {
            None
        }
    } else if is_char1 {
        if is_num2 {
            if warn {
                ctx.diagnostics_mut().add_warning(
                    SemanticWarning::EquivalenceCharacterWithNumeric {
                        first,
                        second,
                        span: source,
                    },
                    span,
                );
                return false;
            }
            None
        } else if !is_char2 {
            Some(SemanticError::EquivalenceCharacterSequence {
                first,
                second,
                span: source,
            })
        } else {
            None
        }
    } else if !is_num2 && !is_char2 && !same_optional_type(ctx, type1.as_ref(), type2.as_ref()) {
        Some(SemanticError::EquivalenceTypeMismatch {
            first,
            second,
            span: source,
        })
    } else {
        None
    };
    match error {
        Some(error) => {
            ctx.diagnostics_mut().add_error(error, span);
            false
        }
        None => true,
    }
}

fn same_optional_type(ctx: &SemanticsContext, a: Option<&DeclTypeSpec>, b: Option<&DeclTypeSpec>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => ctx.same_type(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Default-kind INTEGER or LOGICAL, default or double precision REAL or
/// COMPLEX, or a sequence type made only of those.
pub fn is_numeric_sequence_type(ctx: &SemanticsContext, ty: Option<&DeclTypeSpec>) -> bool {
    let options = ctx.options();
    is_sequence_type(ctx, ty, &|intrinsic| {
        let Some(kind) = intrinsic.kind_value() else {
            return false;
        };
        match intrinsic.category {
            TypeCategory::Integer | TypeCategory::Logical => {
                kind == options.default_kind(intrinsic.category)
            }
            TypeCategory::Real | TypeCategory::Complex => {
                kind == options.default_kind(intrinsic.category)
                    || kind == options.double_precision_kind()
            }
            TypeCategory::Character | TypeCategory::Derived => false,
        }
    })
}

/// Default-kind CHARACTER, or a sequence type made only of it.
pub fn is_character_sequence_type(ctx: &SemanticsContext, ty: Option<&DeclTypeSpec>) -> bool {
    let default = ctx.options().default_kind(TypeCategory::Character);
    is_sequence_type(ctx, ty, &|intrinsic| {
        intrinsic.category == TypeCategory::Character && intrinsic.kind_value() == Some(default)
    })
}

fn is_sequence_type(
    ctx: &SemanticsContext,
    ty: Option<&DeclTypeSpec>,
    predicate: &dyn Fn(&IntrinsicTypeSpec) -> bool,
) -> bool {
    let mut visited = FxHashSet::default();
    is_sequence_type_in(ctx, ty, predicate, &mut visited)
}

fn is_sequence_type_in(
    ctx: &SemanticsContext,
    ty: Option<&DeclTypeSpec>,
    predicate: &dyn Fn(&IntrinsicTypeSpec) -> bool,
    visited: &mut FxHashSet<SymbolId>,
) -> bool {
    match ty {
        None => false,
        Some(DeclTypeSpec::Intrinsic(intrinsic)) => predicate(intrinsic),
        Some(DeclTypeSpec::TypeDerived(spec)) | Some(DeclTypeSpec::ClassDerived(spec)) => {
            let type_symbol = ctx.spec(*spec).type_symbol();
            if !visited.insert(type_symbol) {
                return false;
            }
            let Some(scope) = ctx.component_scope(*spec) else {
                return false;
            };
            let scope = ctx.scope(scope);
            ctx.symbol(type_symbol)
                .derived_type_details()
                .component_names
                .iter()
                .filter_map(|name| scope.find(*name))
                .all(|component| {
                    let component = ctx.symbol(component);
                    !component.is_allocatable_or_pointer()
                        && is_sequence_type_in(ctx, component.decl_type(), predicate, visited)
                })
        }
        Some(DeclTypeSpec::TypeStar) | Some(DeclTypeSpec::ClassStar) => false,
    }
}
