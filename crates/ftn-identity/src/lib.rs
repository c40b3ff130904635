// lib.rs
//
// Foundational identity primitives shared by every layer of the front end:
// interned source names, source spans, and typed arena handles.

mod entities;
mod intern;
mod name;
mod span;

pub use entities::{DerivedTypeSpecId, ScopeId, SymbolId};
pub use intern::Interner;
pub use name::Name;
pub use span::Span;
