//! 4.2.1 Unary operators.

use std::rc::Rc;

use pvm_core::TypeDesc;

use crate::ast::{Expr, SourceLocation, UnaryOp};
use crate::error::TypeError;

use super::{check_expr_non_void, TypeChecker};

pub fn check_unary(
    tc: &mut TypeChecker,
    op: UnaryOp,
    operand: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let operand_ty = check_expr_non_void(tc, operand)?;

    // Only `!` requires an integral operand; `-`, `+`, and `~` pass any
    // operand type through unchanged (spec.md section 4.2.1).
    if op == UnaryOp::Not && !operand_ty.is_integral() {
        return Err(tc.report(TypeError::InvalidUnaryOperand {
            op: op_name(op),
            found: operand_ty.to_string(),
            loc,
        }));
    }

    Ok(match op {
        UnaryOp::Not => Rc::new(TypeDesc::bool_result()),
        UnaryOp::Neg | UnaryOp::Pos | UnaryOp::Bnot => operand_ty,
    })
}

fn op_name(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "!",
        UnaryOp::Neg => "-",
        UnaryOp::Pos => "+",
        UnaryOp::Bnot => "~",
    }
}
