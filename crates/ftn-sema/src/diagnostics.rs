//! Recorded errors and warnings.
//!
//! Nothing in the semantic core returns an error value to its caller. User
//! mistakes are pushed here and analysis continues; callers inspect the sink
//! afterwards.

use ftn_identity::Span;

use crate::errors::{SemanticError, SemanticWarning};

/// Secondary message attached to a diagnostic, e.g. "declared here".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

/// A recorded semantic error.
#[derive(Debug, Clone)]
pub struct TypeError {
    pub error: SemanticError,
    pub span: Span,
    pub notes: Vec<Note>,
}

impl TypeError {
    /// Create a new type error
    pub fn new(error: SemanticError, span: Span) -> Self {
        Self {
            error,
            span,
            notes: Vec::new(),
        }
    }

    pub fn attach_note(&mut self, span: Span, message: impl Into<String>) -> &mut Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }
}

/// A recorded semantic warning.
#[derive(Debug, Clone)]
pub struct TypeWarning {
    pub warning: SemanticWarning,
    pub span: Span,
}

impl TypeWarning {
    /// Create a new type warning
    pub fn new(warning: SemanticWarning, span: Span) -> Self {
        Self { warning, span }
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<TypeError>,
    warnings: Vec<TypeWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. The returned handle takes secondary notes.
    pub fn add_error(&mut self, error: SemanticError, span: Span) -> &mut TypeError {
        tracing::trace!(%error, "semantic error");
        self.errors.push(TypeError::new(error, span));
        self.errors.last_mut().expect("error was just pushed")
    }

    pub fn add_warning(&mut self, warning: SemanticWarning, span: Span) {
        tracing::trace!(%warning, "semantic warning");
        self.warnings.push(TypeWarning::new(warning, span));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[TypeWarning] {
        &self.warnings
    }

    /// Drain everything recorded so far.
    pub fn take(&mut self) -> (Vec<TypeError>, Vec<TypeWarning>) {
        (
            std::mem::take(&mut self.errors),
            std::mem::take(&mut self.warnings),
        )
    }
}
