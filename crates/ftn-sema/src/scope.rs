//! Scopes: the lexical and type-definition tree that owns symbols.

use ftn_identity::{DerivedTypeSpecId, Name, ScopeId, SymbolId};
use rustc_hash::FxHashMap;

use crate::equivalence::EquivalenceSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Module,
    MainProgram,
    Subprogram,
    DerivedType,
    Block,
    Forall,
    ImpliedDos,
}

#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    /// The symbol that defines this scope, if any
    symbol: Option<SymbolId>,
    symbols: FxHashMap<Name, SymbolId>,
    children: Vec<ScopeId>,
    /// For a derived type instance, the spec it was instantiated for
    derived_type_spec: Option<DerivedTypeSpecId>,
    /// Derived type specs declared here, searched when memoizing instances
    declared_types: Vec<DerivedTypeSpecId>,
    equivalence_sets: Vec<EquivalenceSet>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind, parent: Option<ScopeId>, symbol: Option<SymbolId>) -> Self {
        Self {
            kind,
            parent,
            symbol,
            symbols: FxHashMap::default(),
            children: Vec::new(),
            derived_type_spec: None,
            declared_types: Vec::new(),
            equivalence_sets: Vec::new(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    pub fn is_global(&self) -> bool {
        self.kind == ScopeKind::Global
    }

    pub fn is_module(&self) -> bool {
        self.kind == ScopeKind::Module
    }

    pub fn is_derived_type(&self) -> bool {
        self.kind == ScopeKind::DerivedType
    }

    /// Local lookup only.
    pub fn find(&self, name: Name) -> Option<SymbolId> {
        self.symbols.get(&name).copied()
    }

    pub fn contains(&self, name: Name) -> bool {
        self.symbols.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in creation order.
    pub fn symbols(&self) -> Vec<SymbolId> {
        let mut ids: Vec<SymbolId> = self.symbols.values().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn derived_type_spec(&self) -> Option<DerivedTypeSpecId> {
        self.derived_type_spec
    }

    pub fn declared_types(&self) -> &[DerivedTypeSpecId] {
        &self.declared_types
    }

    pub fn equivalence_sets(&self) -> &[EquivalenceSet] {
        &self.equivalence_sets
    }

    pub(crate) fn insert(&mut self, name: Name, symbol: SymbolId) {
        self.symbols.insert(name, symbol);
    }

    pub(crate) fn add_child(&mut self, child: ScopeId) {
        self.children.push(child);
    }

    pub(crate) fn set_derived_type_spec(&mut self, spec: DerivedTypeSpecId) {
        self.derived_type_spec = Some(spec);
    }

    pub(crate) fn add_declared_type(&mut self, spec: DerivedTypeSpecId) {
        self.declared_types.push(spec);
    }

    pub(crate) fn add_equivalence_set(&mut self, set: EquivalenceSet) {
        self.equivalence_sets.push(set);
    }
}
