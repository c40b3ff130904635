//! Syntax contract for the semantic core: the parsed forms of expressions,
//! shape declarations, storage-overlap designators and type-parameter lists.
//!
//! Lexing and parsing happen elsewhere; this crate only fixes the shapes the
//! parser hands over.

pub mod ast;
pub mod ast_display;

pub use ast::{
    ArraySpec, BinaryOp, CoarraySpec, ComponentArraySpec, DataRef, Designator, DesignatorKind,
    EquivalenceStmt, ExplicitShapeSpec, Expr, ExprKind, Ident, Subscript, Triplet,
    TypeParamSpec, TypeParamValue, UnaryOp,
};
pub use ast_display::AstPrinter;
pub use ftn_identity::{Interner, Name, Span};
