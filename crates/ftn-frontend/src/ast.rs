// ast.rs
//
// Parse-tree shapes consumed by semantic analysis.

use ftn_identity::{Name, Span};

/// A name as written, with where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    pub fn new(name: Name, span: Span) -> Self {
        Self { name, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLiteral(i64),
    /// Real literal, kept as written so folding never depends on host float formatting
    RealLiteral(String),
    LogicalLiteral(bool),
    CharLiteral(String),
    Name(Name),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// (/ a, b, c /)
    ArrayConstructor(Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Power,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Power => "**",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn int(value: i64, span: Span) -> Self {
        Self::new(ExprKind::IntLiteral(value), span)
    }

    pub fn name(name: Name, span: Span) -> Self {
        Self::new(ExprKind::Name(name), span)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.merge(rhs.span);
        Self::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), span)
    }

    pub fn negate(operand: Expr) -> Self {
        let span = operand.span;
        Self::new(ExprKind::Unary(UnaryOp::Neg, Box::new(operand)), span)
    }
}

/// `lower:upper` or just `upper` in an explicit-shape declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitShapeSpec {
    pub lower: Option<Expr>,
    pub upper: Expr,
}

impl ExplicitShapeSpec {
    pub fn new(lower: Option<Expr>, upper: Expr) -> Self {
        Self { lower, upper }
    }
}

/// Array shape as declared on an object.
#[derive(Debug, Clone, PartialEq)]
pub enum ArraySpec {
    /// `(l1:u1, u2, ...)`
    Explicit(Vec<ExplicitShapeSpec>),
    /// `(l1:, :, ...)`: one entry per dimension, `None` when the lower bound is omitted
    AssumedShape(Vec<Option<Expr>>),
    /// `(:, :, ...)` with the number of colons
    Deferred(usize),
    /// `(e1, ..., lb:*)`
    AssumedSize {
        explicit: Vec<ExplicitShapeSpec>,
        implied_lower: Option<Expr>,
    },
    /// `(lb:*, ...)` on a named constant
    ImpliedShape(Vec<Option<Expr>>),
    /// `(..)`
    AssumedRank,
}

/// Array shape as declared on a derived-type component.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentArraySpec {
    Explicit(Vec<ExplicitShapeSpec>),
    Deferred(usize),
}

/// Coarray shape as declared after `[`.
#[derive(Debug, Clone, PartialEq)]
pub enum CoarraySpec {
    /// `[:, :]` with the number of colons
    Deferred(usize),
    /// `[l1:u1, ..., lb:*]`
    Explicit {
        explicit: Vec<ExplicitShapeSpec>,
        last_lower: Option<Expr>,
    },
}

/// An object designator as it appears in an EQUIVALENCE list.
#[derive(Debug, Clone, PartialEq)]
pub struct Designator {
    pub kind: DesignatorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DesignatorKind {
    DataRef(DataRef),
    /// `base(lower:upper)`
    Substring {
        base: DataRef,
        lower: Option<Expr>,
        upper: Option<Expr>,
    },
}

impl Designator {
    pub fn new(kind: DesignatorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn data_ref(data_ref: DataRef, span: Span) -> Self {
        Self::new(DesignatorKind::DataRef(data_ref), span)
    }

    /// The data reference this designator is built on.
    pub fn base(&self) -> &DataRef {
        match &self.kind {
            DesignatorKind::DataRef(data_ref) => data_ref,
            DesignatorKind::Substring { base, .. } => base,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataRef {
    Name(Ident),
    /// `base%component`
    Component { base: Box<DataRef>, component: Ident },
    /// `base(s1, s2, ...)`
    ArrayElement {
        base: Box<DataRef>,
        subscripts: Vec<Subscript>,
    },
    /// `base[cosubscripts]`
    Coindexed {
        base: Box<DataRef>,
        cosubscripts: Vec<Expr>,
    },
}

impl DataRef {
    /// The leftmost name of the reference.
    pub fn first_name(&self) -> Ident {
        match self {
            DataRef::Name(ident) => *ident,
            DataRef::Component { base, .. }
            | DataRef::ArrayElement { base, .. }
            | DataRef::Coindexed { base, .. } => base.first_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Subscript {
    Expr(Expr),
    Triplet(Triplet),
}

/// `lower:upper:stride` with every part optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Triplet {
    pub lower: Option<Expr>,
    pub upper: Option<Expr>,
    pub stride: Option<Expr>,
}

/// `EQUIVALENCE (a, b), (c, d(2))`
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceStmt {
    pub sets: Vec<Vec<Designator>>,
    pub span: Span,
}

/// One actual type parameter, e.g. the `k=8` in `t(k=8)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamSpec {
    pub keyword: Option<Ident>,
    pub value: TypeParamValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeParamValue {
    Expr(Expr),
    /// `*`
    Assumed,
    /// `:`
    Deferred,
}
