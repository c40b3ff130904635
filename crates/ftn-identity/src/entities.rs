//! Typed handles into the semantic arenas.
//!
//! Scopes, symbols, and derived type specs live in flat arenas owned by the
//! semantics context. These handles are the only way to refer to them, so a
//! parent link or a back-reference can never keep anything alive on its own.

/// Identity for a scope (global, module, subprogram, derived type, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The global scope is always the first one created.
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a symbol (always owned by exactly one scope)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a derived type spec: a type symbol plus actual parameter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DerivedTypeSpecId(u32);

impl DerivedTypeSpecId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}
