// intern.rs
//
// String interning for source names.
//
// Names are case-insensitive in the source language; the front end lowers
// them before interning, so the interner itself compares bytes exactly.

use rustc_hash::FxBuildHasher;

use crate::Name;

/// Interns strings to unique Name IDs
#[derive(Debug, Clone)]
pub struct Interner {
    map: hashbrown::HashMap<String, Name, FxBuildHasher>,
    strings: Vec<String>,
}

impl Default for Interner {
    fn default() -> Self {
        Self {
            map: hashbrown::HashMap::with_hasher(FxBuildHasher),
            strings: Vec::new(),
        }
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let name = Name::new(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), name);
        name
    }

    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.index() as usize]
    }

    /// Returns the number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if no strings have been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Pre-intern the intrinsic module and type names the semantic core
    /// compares against by identity.
    pub fn seed_builtin_names(&mut self) {
        for name in ["iso_fortran_env", "event_type", "lock_type", "kind", "len"] {
            let _ = self.intern(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_name() {
        let mut interner = Interner::new();
        let n1 = interner.intern("hello");
        let n2 = interner.intern("hello");
        let n3 = interner.intern("world");

        assert_eq!(n1, n2);
        assert_ne!(n1, n3);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn resolve_returns_original_string() {
        let mut interner = Interner::new();
        let name = interner.intern("test");
        assert_eq!(interner.resolve(name), "test");
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut interner = Interner::new();
        assert!(interner.lookup("x").is_none());
        let x = interner.intern("x");
        assert_eq!(interner.lookup("x"), Some(x));
        assert_eq!(interner.len(), 1);
    }
}
