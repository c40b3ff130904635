//! Policy-driven traversal of a derived type's component tree.
//!
//! The iterator keeps an explicit stack of path nodes. A nested type is never
//! entered while the same type symbol is already on the stack, so component
//! graphs that loop back through POINTER or ALLOCATABLE components terminate.

use ftn_identity::{DerivedTypeSpecId, Name, ScopeId, SymbolId};
use rustc_hash::FxHashSet;

use crate::context::SemanticsContext;
use crate::symbol::{Details, Symbol, SymbolFlag};
use crate::types::DeclTypeSpec;

/// Which components a traversal reports and which it descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Every component in declaration order; a parent component is reported
    /// after the components inherited through it
    Ordered,
    /// Top-level components that are neither POINTER nor ALLOCATABLE
    Direct,
    /// Components always present in memory, through non-indirect nesting
    Ultimate,
    /// Everything reachable without following a POINTER
    Potential,
}

impl ComponentKind {
    /// Report the component before trying to descend into it.
    fn stop_pre(self, component: &Symbol) -> bool {
        match self {
            ComponentKind::Ordered => !component.test(SymbolFlag::ParentComp),
            ComponentKind::Direct => !component.is_allocatable_or_pointer(),
            ComponentKind::Ultimate => {
                matches!(component.details(), Details::ProcEntity(_))
                    || component.is_allocatable_or_pointer()
                    || component
                        .as_object()
                        .and_then(|object| object.ty.as_ref())
                        .is_some_and(|ty| ty.as_intrinsic().is_some())
            }
            ComponentKind::Potential => !component.is_pointer(),
        }
    }

    /// Report the component once its subtree is exhausted.
    fn stop_post(self, component: &Symbol) -> bool {
        match self {
            ComponentKind::Ordered => component.test(SymbolFlag::ParentComp),
            ComponentKind::Direct | ComponentKind::Ultimate | ComponentKind::Potential => false,
        }
    }

    fn descends_into(self, component: &Symbol) -> bool {
        match self {
            ComponentKind::Ordered => component.test(SymbolFlag::ParentComp),
            ComponentKind::Direct => false,
            ComponentKind::Ultimate => !component.is_allocatable_or_pointer(),
            ComponentKind::Potential => !component.is_pointer(),
        }
    }
}

/// One level of the traversal.
#[derive(Debug, Clone)]
pub struct ComponentPathNode<'a> {
    spec: DerivedTypeSpecId,
    type_symbol: SymbolId,
    scope: Option<ScopeId>,
    names: &'a [Name],
    cursor: usize,
    component: Option<SymbolId>,
}

impl ComponentPathNode<'_> {
    pub fn spec(&self) -> DerivedTypeSpecId {
        self.spec
    }

    pub fn type_symbol(&self) -> SymbolId {
        self.type_symbol
    }

    /// The component being visited at this level, if resolved.
    pub fn component(&self) -> Option<SymbolId> {
        self.component
    }
}

#[derive(Debug, Clone, Copy)]
enum VisitState {
    /// Continue after the component last handed out
    Resume,
    /// Look at the component under the cursor for the first time
    Pre,
    /// Back from a nested level
    Post,
}

/// Lazy sequence of the components of a derived type under one policy.
pub struct ComponentIterator<'a> {
    ctx: &'a SemanticsContext,
    kind: ComponentKind,
    path: Vec<ComponentPathNode<'a>>,
    started: bool,
}

impl<'a> ComponentIterator<'a> {
    pub fn new(ctx: &'a SemanticsContext, spec: DerivedTypeSpecId, kind: ComponentKind) -> Self {
        let mut it = Self {
            ctx,
            kind,
            path: Vec::new(),
            started: false,
        };
        let type_symbol = ctx.spec(spec).type_symbol();
        let names = ctx.symbol(type_symbol).derived_type_details().component_names.as_slice();
        if !names.is_empty() {
            it.path.push(ComponentPathNode {
                spec,
                type_symbol,
                scope: ctx.component_scope(spec),
                names,
                cursor: 0,
                component: None,
            });
            it.increment();
        }
        it
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// The live stack; the current component is the last node's.
    pub fn path(&self) -> &[ComponentPathNode<'a>] {
        &self.path
    }

    /// `%a%b%c` for the current component.
    pub fn designator_name(&self) -> String {
        let mut designator = String::new();
        for node in &self.path {
            if let Some(component) = node.component {
                designator.push('%');
                designator.push_str(self.ctx.symbol_name(component));
            }
        }
        designator
    }

    fn current(&self) -> Option<SymbolId> {
        self.path.last().and_then(|node| node.component)
    }

    fn increment(&mut self) {
        let ctx = self.ctx;
        let mut state = if self.current().is_some() {
            VisitState::Resume
        } else {
            VisitState::Pre
        };
        while let Some(level) = self.path.len().checked_sub(1) {
            let mut descend = false;
            while !descend && self.path[level].cursor < self.path[level].names.len() {
                let component = self.path[level].component;
                match state {
                    VisitState::Resume => {
                        let component = component.expect("resumed level has a component");
                        if self.kind.stop_pre(ctx.symbol(component)) {
                            descend = self.plan_traversal(component);
                        }
                    }
                    VisitState::Pre => {
                        let node = &self.path[level];
                        let name = node.names[node.cursor];
                        let found = node.scope.and_then(|s| ctx.scope(s).find(name));
                        if let Some(found) = found {
                            self.path[level].component = Some(found);
                            let symbol = ctx.symbol(found);
                            if self.kind.stop_pre(symbol) {
                                return;
                            }
                            descend = self.plan_traversal(found);
                            if !descend && self.kind.stop_post(symbol) {
                                return;
                            }
                        }
                    }
                    VisitState::Post => {
                        let component = component.expect("returning level has a component");
                        if self.kind.stop_post(ctx.symbol(component)) {
                            return;
                        }
                    }
                }
                if !descend {
                    let node = &mut self.path[level];
                    node.component = None;
                    node.cursor += 1;
                }
                state = VisitState::Pre;
            }
            if !descend {
                self.path.pop();
                state = VisitState::Post;
            }
        }
    }

    /// Push a level for `component`'s type if the policy enters it and the
    /// type is not already on the path.
    fn plan_traversal(&mut self, component: SymbolId) -> bool {
        let ctx = self.ctx;
        let symbol = ctx.symbol(component);
        let Some(object) = symbol.as_object() else {
            return false;
        };
        // No type means an earlier error; just move on.
        let Some(spec) = object.ty.as_ref().and_then(DeclTypeSpec::as_derived) else {
            return false;
        };
        if !self.kind.descends_into(symbol) {
            return false;
        }
        let type_symbol = ctx.spec(spec).type_symbol();
        if self.path.iter().any(|node| node.type_symbol == type_symbol) {
            tracing::trace!(
                component = ctx.symbol_name(component),
                "type already on the component path, not descending"
            );
            return false;
        }
        let names = ctx
            .symbol(type_symbol)
            .derived_type_details()
            .component_names
            .as_slice();
        self.path.push(ComponentPathNode {
            spec,
            type_symbol,
            scope: ctx.component_scope(spec),
            names,
            cursor: 0,
            component: None,
        });
        true
    }
}

impl Iterator for ComponentIterator<'_> {
    type Item = SymbolId;

    fn next(&mut self) -> Option<SymbolId> {
        if self.started {
            self.increment();
        }
        self.started = true;
        self.current()
    }
}

pub fn find_ultimate_component(
    ctx: &SemanticsContext,
    spec: DerivedTypeSpecId,
    predicate: impl Fn(&Symbol) -> bool,
) -> Option<SymbolId> {
    ComponentIterator::new(ctx, spec, ComponentKind::Ultimate)
        .find(|component| predicate(ctx.symbol(*component)))
}

pub fn find_coarray_ultimate_component(
    ctx: &SemanticsContext,
    spec: DerivedTypeSpecId,
) -> Option<SymbolId> {
    find_ultimate_component(ctx, spec, |component| component.corank() > 0)
}

pub fn find_event_or_lock_potential_component(
    ctx: &SemanticsContext,
    spec: DerivedTypeSpecId,
) -> Option<SymbolId> {
    ComponentIterator::new(ctx, spec, ComponentKind::Potential).find(|component| {
        ctx.symbol(*component)
            .as_object()
            .and_then(|object| object.ty.as_ref())
            .and_then(DeclTypeSpec::as_derived)
            .is_some_and(|derived| is_event_type_or_lock_type(ctx, derived))
    })
}

/// Whether `spec` names the type `name` defined in module `module`.
pub fn is_derived_type_from_module(
    ctx: &SemanticsContext,
    spec: DerivedTypeSpecId,
    module: &str,
    name: &str,
) -> bool {
    let symbol = ctx.symbol(ctx.spec(spec).type_symbol());
    let owner = symbol.owner();
    ctx.name_str(symbol.name()) == name
        && ctx.scope(owner).is_module()
        && ctx
            .scope_name(owner)
            .is_some_and(|m| ctx.name_str(m) == module)
}

pub fn is_event_type_or_lock_type(ctx: &SemanticsContext, spec: DerivedTypeSpecId) -> bool {
    is_derived_type_from_module(ctx, spec, "iso_fortran_env", "event_type")
        || is_derived_type_from_module(ctx, spec, "iso_fortran_env", "lock_type")
}

pub fn is_or_contains_event_or_lock_component(ctx: &SemanticsContext, symbol: SymbolId) -> bool {
    let root = ctx.get_ultimate(symbol);
    match ctx
        .symbol(root)
        .as_object()
        .and_then(|object| object.ty.as_ref())
        .and_then(DeclTypeSpec::as_derived)
    {
        Some(spec) => {
            is_event_type_or_lock_type(ctx, spec)
                || find_event_or_lock_potential_component(ctx, spec).is_some()
        }
        None => false,
    }
}

/// First POINTER component at any depth, preferring the shallowest scope.
pub fn find_pointer_component(ctx: &SemanticsContext, spec: DerivedTypeSpecId) -> Option<SymbolId> {
    let scope = ctx.component_scope(spec)?;
    let mut visited = FxHashSet::default();
    find_pointer_component_in(ctx, scope, &mut visited)
}

fn find_pointer_component_in(
    ctx: &SemanticsContext,
    scope: ScopeId,
    visited: &mut FxHashSet<ScopeId>,
) -> Option<SymbolId> {
    if !ctx.scope(scope).is_derived_type() || !visited.insert(scope) {
        return None;
    }
    let symbols = ctx.scope(scope).symbols();
    if let Some(pointer) = symbols.iter().copied().find(|s| ctx.symbol(*s).is_pointer()) {
        return Some(pointer);
    }
    symbols.iter().find_map(|s| {
        let nested = ctx
            .symbol(*s)
            .as_object()
            .and_then(|object| object.ty.as_ref())
            .and_then(DeclTypeSpec::as_derived)
            .and_then(|derived| ctx.component_scope(derived))?;
        find_pointer_component_in(ctx, nested, visited)
    })
}

/// Whether the symbol's derived type has a FINAL procedure.
pub fn is_finalizable(ctx: &SemanticsContext, symbol: SymbolId) -> bool {
    let Some(spec) = ctx.get_type(symbol).and_then(DeclTypeSpec::as_derived) else {
        return false;
    };
    let Some(scope) = ctx.component_scope(spec) else {
        return false;
    };
    ctx.scope(scope)
        .symbols()
        .into_iter()
        .any(|s| matches!(ctx.symbol(s).details(), Details::FinalProc))
}
