// type_display.rs
//
// Source-form rendering of analyzed expressions and declared types, used in
// diagnostic messages.

use ftn_frontend::UnaryOp;

use crate::context::SemanticsContext;
use crate::evaluate::{Constant, Expr};
use crate::types::{DeclTypeSpec, ParamValueCategory};

pub fn display_expr(ctx: &SemanticsContext, expr: &Expr) -> String {
    match expr {
        Expr::Constant(constant) => display_constant(constant),
        Expr::TypeParam(symbol) => ctx.symbol_name(*symbol).to_string(),
        Expr::NamedConstant(entity) | Expr::Variable(entity) => {
            ctx.symbol_name(entity.symbol).to_string()
        }
        Expr::Unary(op, operand) => {
            let sign = match op {
                UnaryOp::Neg => "-",
                UnaryOp::Plus => "+",
            };
            format!("{}{}", sign, display_operand(ctx, operand))
        }
        Expr::Binary(op, lhs, rhs) => format!(
            "{}{}{}",
            display_operand(ctx, lhs),
            op.as_str(),
            display_operand(ctx, rhs)
        ),
        Expr::ArrayConstructor(elements) => {
            let elements: Vec<String> = elements.iter().map(|e| display_expr(ctx, e)).collect();
            format!("[{}]", elements.join(","))
        }
        Expr::Convert { kind, operand } => {
            format!("int({},kind={})", display_expr(ctx, operand), kind)
        }
    }
}

fn display_operand(ctx: &SemanticsContext, expr: &Expr) -> String {
    match expr {
        Expr::Binary(..) => format!("({})", display_expr(ctx, expr)),
        _ => display_expr(ctx, expr),
    }
}

fn display_constant(constant: &Constant) -> String {
    match constant {
        Constant::Integer { value, .. } => value.to_string(),
        Constant::Real { text, .. } => text.clone(),
        Constant::Logical { value: true, .. } => ".true.".to_string(),
        Constant::Logical { value: false, .. } => ".false.".to_string(),
        Constant::Character { value, .. } => format!("'{}'", value),
    }
}

pub fn display_decl_type(ctx: &SemanticsContext, ty: &DeclTypeSpec) -> String {
    match ty {
        DeclTypeSpec::Intrinsic(intrinsic) => {
            let mut out = format!("{}(kind={}", intrinsic.category, display_expr(ctx, &intrinsic.kind));
            if let Some(length) = &intrinsic.length {
                out.push_str(",len=");
                out.push_str(&match length.category() {
                    ParamValueCategory::Explicit(expr) => display_expr(ctx, expr),
                    ParamValueCategory::Assumed => "*".to_string(),
                    ParamValueCategory::Deferred => ":".to_string(),
                    ParamValueCategory::Unset => "?".to_string(),
                });
            }
            out.push(')');
            out
        }
        DeclTypeSpec::TypeDerived(spec) => format!("TYPE({})", display_derived(ctx, *spec)),
        DeclTypeSpec::ClassDerived(spec) => format!("CLASS({})", display_derived(ctx, *spec)),
        DeclTypeSpec::TypeStar => "TYPE(*)".to_string(),
        DeclTypeSpec::ClassStar => "CLASS(*)".to_string(),
    }
}

fn display_derived(ctx: &SemanticsContext, spec: ftn_identity::DerivedTypeSpecId) -> String {
    let spec = ctx.spec(spec);
    let mut out = ctx.symbol_name(spec.type_symbol()).to_string();
    let params: Vec<String> = spec
        .parameters()
        .iter()
        .map(|(name, value)| {
            let value = match value.category() {
                ParamValueCategory::Explicit(expr) => display_expr(ctx, expr),
                ParamValueCategory::Assumed => "*".to_string(),
                ParamValueCategory::Deferred => ":".to_string(),
                ParamValueCategory::Unset => "?".to_string(),
            };
            format!("{}={}", ctx.name_str(*name), value)
        })
        .collect();
    if !params.is_empty() {
        out.push('(');
        out.push_str(&params.join(","));
        out.push(')');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftn_frontend::BinaryOp;

    #[test]
    fn renders_nested_binary_with_parens() {
        let ctx = SemanticsContext::default();
        let expr = Expr::Binary(
            BinaryOp::Mul,
            Box::new(Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::int(1, 4)),
                Box::new(Expr::int(2, 4)),
            )),
            Box::new(Expr::int(3, 4)),
        );
        assert_eq!(display_expr(&ctx, &expr), "(1+2)*3");
    }

    #[test]
    fn renders_intrinsic_type_with_kind() {
        let ctx = SemanticsContext::default();
        let ty = DeclTypeSpec::Intrinsic(crate::types::IntrinsicTypeSpec::new(
            crate::types::TypeCategory::Real,
            8,
        ));
        assert_eq!(display_decl_type(&ctx, &ty), "REAL(kind=8)");
    }
}
