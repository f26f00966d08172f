//! 4.2.2 Relational/boolean operators and 4.2.3 arithmetic/bitwise
//! operators, including the offset-arithmetic extensions.

use std::rc::Rc;

use pvm_core::TypeDesc;

use crate::ast::{BinaryOp, Expr, SourceLocation};
use crate::error::TypeError;

use super::{check_expr_non_void, TypeChecker};

/// Result width = max(widths); result unsigned iff either operand is
/// unsigned (spec.md section 4.2.3).
pub fn integral_promote(lhs: &TypeDesc, rhs: &TypeDesc) -> TypeDesc {
    let width = lhs.integral_width().unwrap().max(rhs.integral_width().unwrap());
    let signed = lhs.is_signed() && rhs.is_signed();
    TypeDesc::integral(signed, width)
}

fn top_level_kind(ty: &TypeDesc) -> Option<&'static str> {
    if ty.is_integral() {
        Some("integral")
    } else if ty.is_string() {
        Some("string")
    } else if ty.is_offset() {
        Some("offset")
    } else {
        None
    }
}

pub fn check_binary(
    tc: &mut TypeChecker,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let lhs_ty = check_expr_non_void(tc, lhs)?;
    let rhs_ty = check_expr_non_void(tc, rhs)?;

    use BinaryOp::*;
    match op {
        Eq | Ne | Lt | Gt | Le | Ge => {
            let lk = top_level_kind(&lhs_ty);
            let rk = top_level_kind(&rhs_ty);
            if lk.is_none() || lk != rk {
                return Err(tc.report(TypeError::InvalidOperands {
                    op: op_name(op),
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    loc,
                }));
            }
            Ok(Rc::new(TypeDesc::bool_result()))
        }

        And | Or => Ok(Rc::new(TypeDesc::bool_result())),

        Ior | Xor | Band => integral_binop(tc, op, &lhs_ty, &rhs_ty, loc),

        Add => {
            if lhs_ty.is_integral() && rhs_ty.is_integral() {
                Ok(Rc::new(integral_promote(&lhs_ty, &rhs_ty)))
            } else if lhs_ty.is_string() && rhs_ty.is_string() {
                Ok(Rc::new(TypeDesc::String))
            } else if lhs_ty.is_offset() && rhs_ty.is_offset() {
                Ok(offset_offset_result(&lhs_ty, &rhs_ty))
            } else {
                Err(tc.report(TypeError::InvalidOperands {
                    op: op_name(op),
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    loc,
                }))
            }
        }

        Sub => {
            if lhs_ty.is_integral() && rhs_ty.is_integral() {
                Ok(Rc::new(integral_promote(&lhs_ty, &rhs_ty)))
            } else if lhs_ty.is_offset() && rhs_ty.is_offset() {
                Ok(offset_offset_result(&lhs_ty, &rhs_ty))
            } else {
                Err(tc.report(TypeError::InvalidOperands {
                    op: op_name(op),
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    loc,
                }))
            }
        }

        Mul => {
            if lhs_ty.is_integral() && rhs_ty.is_integral() {
                Ok(Rc::new(integral_promote(&lhs_ty, &rhs_ty)))
            } else if lhs_ty.is_integral() && rhs_ty.is_offset() {
                Ok(Rc::new(int_times_offset(&lhs_ty, &rhs_ty)))
            } else if lhs_ty.is_offset() && rhs_ty.is_integral() {
                Ok(Rc::new(int_times_offset(&rhs_ty, &lhs_ty)))
            } else {
                Err(tc.report(TypeError::InvalidOperands {
                    op: op_name(op),
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    loc,
                }))
            }
        }

        Div => {
            if lhs_ty.is_integral() && rhs_ty.is_integral() {
                Ok(Rc::new(integral_promote(&lhs_ty, &rhs_ty)))
            } else if lhs_ty.is_offset() && rhs_ty.is_offset() {
                let (TypeDesc::Offset { base: lb, .. }, TypeDesc::Offset { base: rb, .. }) =
                    (lhs_ty.as_ref(), rhs_ty.as_ref())
                else {
                    unreachable!()
                };
                Ok(Rc::new(integral_promote(lb, rb)))
            } else {
                Err(tc.report(TypeError::InvalidOperands {
                    op: op_name(op),
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    loc,
                }))
            }
        }

        Mod => {
            if lhs_ty.is_integral() && rhs_ty.is_integral() {
                integral_binop(tc, op, &lhs_ty, &rhs_ty, loc)
            } else if lhs_ty.is_offset() && rhs_ty.is_offset() {
                let (TypeDesc::Offset { base, .. }, TypeDesc::Offset { unit, .. }) =
                    (lhs_ty.as_ref(), rhs_ty.as_ref())
                else {
                    unreachable!()
                };
                Ok(Rc::new(TypeDesc::Offset {
                    base: base.clone(),
                    unit: *unit,
                }))
            } else {
                Err(tc.report(TypeError::InvalidOperands {
                    op: op_name(op),
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    loc,
                }))
            }
        }

        Sl | Sr => Ok(lhs_ty),

        Bconc => {
            if !lhs_ty.is_integral() || !rhs_ty.is_integral() {
                return Err(tc.report(TypeError::InvalidOperands {
                    op: "::",
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    loc,
                }));
            }
            let width = lhs_ty.integral_width().unwrap() as u32 + rhs_ty.integral_width().unwrap() as u32;
            if width > 64 {
                return Err(tc.report(TypeError::WidthOverflow { width, loc }));
            }
            Ok(Rc::new(TypeDesc::integral(lhs_ty.is_signed(), width as u8)))
        }
    }
}

fn integral_binop(
    tc: &mut TypeChecker,
    op: BinaryOp,
    lhs_ty: &Rc<TypeDesc>,
    rhs_ty: &Rc<TypeDesc>,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    if !lhs_ty.is_integral() || !rhs_ty.is_integral() {
        return Err(tc.report(TypeError::InvalidOperands {
            op: op_name(op),
            lhs: lhs_ty.to_string(),
            rhs: rhs_ty.to_string(),
            loc,
        }));
    }
    Ok(Rc::new(integral_promote(lhs_ty, rhs_ty)))
}

/// offset+offset / offset-offset: magnitude promoted, unit currently
/// collapsed to the common denominator of 1 bit (spec.md section 4.2.3).
fn offset_offset_result(lhs_ty: &TypeDesc, rhs_ty: &TypeDesc) -> Rc<TypeDesc> {
    let (TypeDesc::Offset { base: lb, .. }, TypeDesc::Offset { base: rb, .. }) = (lhs_ty, rhs_ty) else {
        unreachable!()
    };
    Rc::new(TypeDesc::Offset {
        base: Rc::new(integral_promote(lb, rb)),
        unit: 1,
    })
}

/// integer * offset: magnitude-type promoted, unit taken from the offset
/// operand.
fn int_times_offset(int_ty: &TypeDesc, offset_ty: &TypeDesc) -> TypeDesc {
    let TypeDesc::Offset { base, unit } = offset_ty else {
        unreachable!()
    };
    TypeDesc::Offset {
        base: Rc::new(integral_promote(int_ty, base)),
        unit: *unit,
    }
}

fn op_name(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        And => "&&",
        Or => "||",
        Ior => "|",
        Xor => "^",
        Band => "&",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Sl => "<<",
        Sr => ">>",
        Bconc => "::",
    }
}
