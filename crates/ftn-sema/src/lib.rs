//! Fortran semantic core: symbol tables, array shapes, component traversal,
//! storage association, and parameterized derived type instantiation.

// Public modules
pub mod array_spec;
pub mod components;
pub mod context;
pub mod diagnostics;
pub mod equivalence;
pub mod errors;
pub mod evaluate;
pub mod instantiate;
pub mod operators;
pub mod options;
pub mod scope;
pub mod shape;
pub mod symbol;
pub mod types;

// Internal modules
pub(crate) mod type_display;

#[cfg(any(test, feature = "testing"))]
pub mod fixtures;

// Re-exports: public API surface
pub use array_spec::{ArraySpec, Bound, ShapeSpec};
pub use components::{ComponentIterator, ComponentKind, ComponentPathNode};
pub use context::{PdtInstanceGuard, SemanticsContext};
pub use diagnostics::{Diagnostics, Note, TypeError, TypeWarning};
pub use equivalence::{EquivalenceObject, EquivalenceSet, EquivalenceSetResolver, resolve_equivalence};
pub use errors::{SemanticError, SemanticWarning};
pub use instantiate::{
    InstantiationStats, bind_type_param_values, find_or_instantiate_derived_type,
    instantiate_derived_type,
};
pub use options::{LanguageFeature, SemanticsOptions, SemanticsOptionsBuilder};
pub use scope::{Scope, ScopeKind};
pub use shape::{BoundResolver, resolve_array_spec, resolve_component_array_spec, resolve_coarray_spec};
pub use symbol::{Attr, Attrs, Details, Flags, Symbol, SymbolFlag};
pub use types::{DeclTypeSpec, DerivedTypeSpec, IntrinsicTypeSpec, ParamValue, TypeCategory, TypeParamAttr};
