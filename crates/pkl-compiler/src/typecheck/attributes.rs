//! 4.2.4 Attributes (`e'ATTR`).

use std::rc::Rc;

use pvm_core::TypeDesc;

use crate::ast::{Attribute, Expr, SourceLocation};
use crate::error::TypeError;

use super::{check_expr_non_void, TypeChecker};

pub fn check_attribute(
    tc: &mut TypeChecker,
    attr: Attribute,
    operand: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let operand_ty = check_expr_non_void(tc, operand)?;

    let in_domain = match attr {
        Attribute::Size => {
            operand_ty.is_integral()
                || operand_ty.is_string()
                || operand_ty.is_array()
                || operand_ty.is_struct()
                || operand_ty.is_offset()
        }
        Attribute::Signed => operand_ty.is_integral(),
        Attribute::Magnitude => operand_ty.is_offset(),
        Attribute::Unit => operand_ty.is_offset(),
        Attribute::Length => operand_ty.is_array() || operand_ty.is_struct() || operand_ty.is_string(),
        Attribute::Alignment => operand_ty.is_struct(),
        Attribute::Offset => operand_ty.is_array() || operand_ty.is_struct(),
        Attribute::Mapped => true,
    };

    if !in_domain {
        return Err(tc.report(TypeError::InvalidAttribute {
            attr,
            found: operand_ty.to_string(),
            loc,
        }));
    }

    Ok(match attr {
        Attribute::Size | Attribute::Offset => Rc::new(TypeDesc::offset_uint64(1)),
        Attribute::Signed | Attribute::Mapped => Rc::new(TypeDesc::bool_result()),
        Attribute::Magnitude | Attribute::Unit | Attribute::Length | Attribute::Alignment => {
            Rc::new(TypeDesc::uint64())
        }
    })
}
