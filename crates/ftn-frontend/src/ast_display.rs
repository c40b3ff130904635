// ast_display.rs
//! Source-form rendering for syntax nodes, resolving names via an Interner.

use std::fmt::Write;

use crate::{
    ArraySpec, DataRef, Designator, DesignatorKind, Expr, ExprKind, ExplicitShapeSpec, Interner,
    Subscript, TypeParamValue, UnaryOp,
};

/// Renders syntax back into source form for diagnostics.
pub struct AstPrinter<'a> {
    interner: &'a Interner,
}

impl<'a> AstPrinter<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self { interner }
    }

    pub fn print_expr(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, expr);
        out
    }

    pub fn print_designator(&self, designator: &Designator) -> String {
        let mut out = String::new();
        match &designator.kind {
            DesignatorKind::DataRef(data_ref) => self.write_data_ref(&mut out, data_ref),
            DesignatorKind::Substring { base, lower, upper } => {
                self.write_data_ref(&mut out, base);
                out.push('(');
                if let Some(lower) = lower {
                    self.write_expr(&mut out, lower);
                }
                out.push(':');
                if let Some(upper) = upper {
                    self.write_expr(&mut out, upper);
                }
                out.push(')');
            }
        }
        out
    }

    pub fn print_type_param_value(&self, value: &TypeParamValue) -> String {
        match value {
            TypeParamValue::Expr(expr) => self.print_expr(expr),
            TypeParamValue::Assumed => "*".to_string(),
            TypeParamValue::Deferred => ":".to_string(),
        }
    }

    pub fn print_array_spec(&self, spec: &ArraySpec) -> String {
        let mut out = String::from("(");
        match spec {
            ArraySpec::Explicit(dims) => self.write_explicit_dims(&mut out, dims),
            ArraySpec::AssumedShape(lowers) => {
                for (i, lower) in lowers.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if let Some(lower) = lower {
                        self.write_expr(&mut out, lower);
                    }
                    out.push(':');
                }
            }
            ArraySpec::Deferred(n) => out.push_str(&vec![":"; *n].join(",")),
            ArraySpec::AssumedSize {
                explicit,
                implied_lower,
            } => {
                self.write_explicit_dims(&mut out, explicit);
                if !explicit.is_empty() {
                    out.push(',');
                }
                if let Some(lower) = implied_lower {
                    self.write_expr(&mut out, lower);
                    out.push(':');
                }
                out.push('*');
            }
            ArraySpec::ImpliedShape(lowers) => {
                for (i, lower) in lowers.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if let Some(lower) = lower {
                        self.write_expr(&mut out, lower);
                        out.push(':');
                    }
                    out.push('*');
                }
            }
            ArraySpec::AssumedRank => out.push_str(".."),
        }
        out.push(')');
        out
    }

    fn write_explicit_dims(&self, out: &mut String, dims: &[ExplicitShapeSpec]) {
        for (i, dim) in dims.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if let Some(lower) = &dim.lower {
                self.write_expr(out, lower);
                out.push(':');
            }
            self.write_expr(out, &dim.upper);
        }
    }

    fn write_data_ref(&self, out: &mut String, data_ref: &DataRef) {
        match data_ref {
            DataRef::Name(ident) => out.push_str(self.interner.resolve(ident.name)),
            DataRef::Component { base, component } => {
                self.write_data_ref(out, base);
                out.push('%');
                out.push_str(self.interner.resolve(component.name));
            }
            DataRef::ArrayElement { base, subscripts } => {
                self.write_data_ref(out, base);
                out.push('(');
                for (i, subscript) in subscripts.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    match subscript {
                        Subscript::Expr(expr) => self.write_expr(out, expr),
                        Subscript::Triplet(triplet) => {
                            if let Some(lower) = &triplet.lower {
                                self.write_expr(out, lower);
                            }
                            out.push(':');
                            if let Some(upper) = &triplet.upper {
                                self.write_expr(out, upper);
                            }
                            if let Some(stride) = &triplet.stride {
                                out.push(':');
                                self.write_expr(out, stride);
                            }
                        }
                    }
                }
                out.push(')');
            }
            DataRef::Coindexed { base, cosubscripts } => {
                self.write_data_ref(out, base);
                out.push('[');
                for (i, cosubscript) in cosubscripts.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_expr(out, cosubscript);
                }
                out.push(']');
            }
        }
    }

    fn write_expr(&self, out: &mut String, expr: &Expr) {
        match &expr.kind {
            ExprKind::IntLiteral(value) => {
                let _ = write!(out, "{}", value);
            }
            ExprKind::RealLiteral(text) => out.push_str(text),
            ExprKind::LogicalLiteral(value) => {
                out.push_str(if *value { ".true." } else { ".false." })
            }
            ExprKind::CharLiteral(text) => {
                let _ = write!(out, "'{}'", text.replace('\'', "''"));
            }
            ExprKind::Name(name) => out.push_str(self.interner.resolve(*name)),
            ExprKind::Unary(op, operand) => {
                out.push(match op {
                    UnaryOp::Neg => '-',
                    UnaryOp::Plus => '+',
                });
                self.write_operand(out, operand);
            }
            ExprKind::Binary(op, lhs, rhs) => {
                self.write_operand(out, lhs);
                out.push_str(op.as_str());
                self.write_operand(out, rhs);
            }
            ExprKind::ArrayConstructor(elements) => {
                out.push_str("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_expr(out, element);
                }
                out.push(']');
            }
        }
    }

    fn write_operand(&self, out: &mut String, expr: &Expr) {
        if matches!(expr.kind, ExprKind::Binary(..)) {
            out.push('(');
            self.write_expr(out, expr);
            out.push(')');
        } else {
            self.write_expr(out, expr);
        }
    }
}
