// src/lib.rs
//! Semantic core for a Fortran front end.
//!
//! The facade re-exports the workspace crates: `identity` for interned names,
//! spans and arena handles, `frontend` for the syntax the core consumes, and
//! `sema` for symbol tables, shapes, component traversal, storage association
//! and parameterized derived type instantiation.

pub use ftn_frontend as frontend;
pub use ftn_identity as identity;
pub use ftn_sema as sema;

pub use ftn_sema::{
    ComponentIterator, ComponentKind, SemanticError, SemanticWarning, SemanticsContext,
    SemanticsOptions, find_or_instantiate_derived_type, resolve_array_spec, resolve_coarray_spec,
    resolve_component_array_spec, resolve_equivalence,
};
