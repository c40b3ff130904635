//! The semantics context: arenas for scopes, symbols and derived type specs,
//! plus the options, diagnostics sink and folding state shared by every
//! analysis.

use std::ops::{Deref, DerefMut};

use ftn_identity::{DerivedTypeSpecId, Interner, Name, ScopeId, Span, SymbolId};

use crate::diagnostics::Diagnostics;
use crate::instantiate::InstantiationStats;
use crate::options::SemanticsOptions;
use crate::scope::{Scope, ScopeKind};
use crate::symbol::{Attrs, Details, Symbol, SymbolFlag};
use crate::types::{DeclTypeSpec, DerivedTypeSpec};

/// Folding state. At most one PDT instance is current at a time.
#[derive(Debug, Default)]
struct FoldingContext {
    pdt_instance: Option<DerivedTypeSpecId>,
}

pub struct SemanticsContext {
    interner: Interner,
    options: SemanticsOptions,
    diagnostics: Diagnostics,
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    specs: Vec<DerivedTypeSpec>,
    folding: FoldingContext,
    pub(crate) instantiation_stats: InstantiationStats,
}

impl SemanticsContext {
    pub fn new(options: SemanticsOptions) -> Self {
        let mut interner = Interner::new();
        interner.seed_builtin_names();
        Self::with_interner(interner, options)
    }

    /// Use the interner the parser filled in.
    pub fn with_interner(interner: Interner, options: SemanticsOptions) -> Self {
        Self {
            interner,
            options,
            diagnostics: Diagnostics::new(),
            scopes: vec![Scope::new(ScopeKind::Global, None, None)],
            symbols: Vec::new(),
            specs: Vec::new(),
            folding: FoldingContext::default(),
            instantiation_stats: InstantiationStats::default(),
        }
    }

    // ========================================================================
    // Names, options, diagnostics
    // ========================================================================

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn intern(&mut self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn name_str(&self, name: Name) -> &str {
        self.interner.resolve(name)
    }

    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.name_str(self.symbol(symbol).name())
    }

    pub fn options(&self) -> &SemanticsOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn instantiation_stats(&self) -> &InstantiationStats {
        &self.instantiation_stats
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    pub fn global_scope(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index() as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index() as usize]
    }

    /// Create a child of `parent`. A defining symbol gets its scope link set.
    pub fn make_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        symbol: Option<SymbolId>,
    ) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, Some(parent), symbol));
        self.scope_mut(parent).add_child(id);
        if let Some(symbol) = symbol
            && self.symbol(symbol).scope().is_none()
        {
            self.symbol_mut(symbol).set_scope(id);
        }
        id
    }

    /// Name of the symbol that defines `scope`, if any.
    pub fn scope_name(&self, scope: ScopeId) -> Option<Name> {
        self.scope(scope).symbol().map(|s| self.symbol(s).name())
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Insert a new symbol unless `name` is already present in `scope`.
    /// Returns the symbol with that name and whether it was inserted.
    pub fn try_emplace(
        &mut self,
        scope: ScopeId,
        name: Name,
        attrs: Attrs,
        details: Details,
        span: Span,
    ) -> (SymbolId, bool) {
        if let Some(existing) = self.scope(scope).find(name) {
            return (existing, false);
        }
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(name, scope, attrs, details, span));
        self.scope_mut(scope).insert(name, id);
        (id, true)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index() as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index() as usize]
    }

    /// Look up `name` in `scope` and then its ancestors.
    pub fn find_symbol(&self, mut scope: ScopeId, name: Name) -> Option<SymbolId> {
        loop {
            let s = self.scope(scope);
            if let Some(found) = s.find(name) {
                return Some(found);
            }
            scope = s.parent()?;
        }
    }

    /// Follow use and host association to the original symbol.
    pub fn get_ultimate(&self, mut symbol: SymbolId) -> SymbolId {
        loop {
            match self.symbol(symbol).details() {
                Details::Use(details) => symbol = details.symbol,
                Details::HostAssoc(details) => symbol = details.symbol,
                _ => return symbol,
            }
        }
    }

    pub fn get_type(&self, symbol: SymbolId) -> Option<&DeclTypeSpec> {
        self.symbol(self.get_ultimate(symbol)).decl_type()
    }

    pub fn is_dummy(&self, symbol: SymbolId) -> bool {
        self.symbol(symbol).is_dummy()
    }

    pub fn is_func_result(&self, symbol: SymbolId) -> bool {
        self.symbol(symbol).is_func_result()
    }

    pub fn is_object_array(&self, symbol: SymbolId) -> bool {
        self.symbol(self.get_ultimate(symbol)).is_object_array()
    }

    pub fn is_pointer(&self, symbol: SymbolId) -> bool {
        self.symbol(self.get_ultimate(symbol)).is_pointer()
    }

    pub fn is_allocatable(&self, symbol: SymbolId) -> bool {
        self.symbol(self.get_ultimate(symbol)).is_allocatable()
    }

    pub fn rank(&self, symbol: SymbolId) -> usize {
        self.symbol(self.get_ultimate(symbol)).rank()
    }

    pub fn corank(&self, symbol: SymbolId) -> usize {
        self.symbol(self.get_ultimate(symbol)).corank()
    }

    // ========================================================================
    // Derived type specs
    // ========================================================================

    pub fn add_spec(&mut self, spec: DerivedTypeSpec) -> DerivedTypeSpecId {
        let id = DerivedTypeSpecId::new(self.specs.len() as u32);
        self.specs.push(spec);
        id
    }

    pub fn spec(&self, id: DerivedTypeSpecId) -> &DerivedTypeSpec {
        &self.specs[id.index() as usize]
    }

    pub fn spec_mut(&mut self, id: DerivedTypeSpecId) -> &mut DerivedTypeSpec {
        &mut self.specs[id.index() as usize]
    }

    /// Scope holding the components of `spec`: the instance scope once
    /// instantiated, otherwise the type's own definition scope.
    pub fn component_scope(&self, spec: DerivedTypeSpecId) -> Option<ScopeId> {
        let spec = self.spec(spec);
        spec.scope()
            .or_else(|| self.symbol(spec.type_symbol()).scope())
    }

    /// The spec of the parent component of an extended type.
    pub fn parent_type_spec(&self, type_symbol: SymbolId) -> Option<DerivedTypeSpecId> {
        let symbol = self.symbol(type_symbol);
        let scope = self.scope(symbol.scope()?);
        symbol
            .derived_type_details()
            .component_names
            .iter()
            .filter_map(|name| scope.find(*name))
            .map(|component| self.symbol(component))
            .find(|component| component.test(SymbolFlag::ParentComp))
            .and_then(|component| component.decl_type())
            .and_then(DeclTypeSpec::as_derived)
    }

    /// Structural type equality; derived specs compare by value.
    pub fn same_type(&self, a: &DeclTypeSpec, b: &DeclTypeSpec) -> bool {
        match (a, b) {
            (DeclTypeSpec::TypeDerived(x), DeclTypeSpec::TypeDerived(y))
            | (DeclTypeSpec::ClassDerived(x), DeclTypeSpec::ClassDerived(y)) => {
                x == y || self.spec(*x).structurally_equal(self.spec(*y))
            }
            _ => a == b,
        }
    }

    // ========================================================================
    // Folding state
    // ========================================================================

    pub fn pdt_instance(&self) -> Option<DerivedTypeSpecId> {
        self.folding.pdt_instance
    }

    /// Make `spec` the current PDT instance until the guard drops.
    pub fn with_pdt_instance(&mut self, spec: DerivedTypeSpecId) -> PdtInstanceGuard<'_> {
        let previous = self.folding.pdt_instance.replace(spec);
        PdtInstanceGuard {
            ctx: self,
            previous,
        }
    }
}

impl Default for SemanticsContext {
    fn default() -> Self {
        Self::new(SemanticsOptions::default())
    }
}

/// Restores the previous PDT instance when dropped.
pub struct PdtInstanceGuard<'a> {
    ctx: &'a mut SemanticsContext,
    previous: Option<DerivedTypeSpecId>,
}

impl Deref for PdtInstanceGuard<'_> {
    type Target = SemanticsContext;

    fn deref(&self) -> &SemanticsContext {
        self.ctx
    }
}

impl DerefMut for PdtInstanceGuard<'_> {
    fn deref_mut(&mut self) -> &mut SemanticsContext {
        self.ctx
    }
}

impl Drop for PdtInstanceGuard<'_> {
    fn drop(&mut self) {
        self.ctx.folding.pdt_instance = self.previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::ObjectEntityDetails;

    #[test]
    fn try_emplace_reports_existing() {
        let mut ctx = SemanticsContext::default();
        let global = ctx.global_scope();
        let x = ctx.intern("x");
        let (first, inserted) = ctx.try_emplace(
            global,
            x,
            Attrs::empty(),
            Details::ObjectEntity(ObjectEntityDetails::default()),
            Span::default(),
        );
        assert!(inserted);
        let (second, inserted) =
            ctx.try_emplace(global, x, Attrs::empty(), Details::Unknown, Span::default());
        assert!(!inserted);
        assert_eq!(first, second);
        assert!(matches!(
            ctx.symbol(first).details(),
            Details::ObjectEntity(_)
        ));
    }

    #[test]
    fn lookup_walks_to_ancestors() {
        let mut ctx = SemanticsContext::default();
        let global = ctx.global_scope();
        let x = ctx.intern("x");
        let (sym, _) = ctx.try_emplace(global, x, Attrs::empty(), Details::Unknown, Span::default());
        let inner = ctx.make_scope(global, ScopeKind::Block, None);
        assert_eq!(ctx.find_symbol(inner, x), Some(sym));
        assert_eq!(ctx.scope(inner).find(x), None);
        assert_eq!(ctx.scope(inner).parent(), Some(global));
    }

    #[test]
    fn pdt_instance_guard_restores_on_drop() {
        let mut ctx = SemanticsContext::default();
        let global = ctx.global_scope();
        let t = ctx.intern("t");
        let (ty, _) = ctx.try_emplace(global, t, Attrs::empty(), Details::Unknown, Span::default());
        let outer = ctx.add_spec(DerivedTypeSpec::new(ty));
        let inner = ctx.add_spec(DerivedTypeSpec::new(ty));
        {
            let mut guard = ctx.with_pdt_instance(outer);
            assert_eq!(guard.pdt_instance(), Some(outer));
            {
                let guard = guard.with_pdt_instance(inner);
                assert_eq!(guard.pdt_instance(), Some(inner));
            }
            assert_eq!(guard.pdt_instance(), Some(outer));
        }
        assert_eq!(ctx.pdt_instance(), None);
    }
}
