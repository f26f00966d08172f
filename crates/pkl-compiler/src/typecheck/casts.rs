//! 4.2.5 Casts, `isa`, `sizeof`, and offset literals.

use std::rc::Rc;

use pvm_core::TypeDesc;

use crate::ast::{Expr, SourceLocation, TypeNode};
use crate::error::TypeError;

use super::types_pass::resolve_type_node;
use super::{check_expr_non_void, TypeChecker};

pub fn check_cast(
    tc: &mut TypeChecker,
    target: &TypeNode,
    operand: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let target_ty = resolve_type_node(tc, target)?;
    if target_ty.is_any() || target_ty.is_closure() {
        return Err(tc.report(TypeError::InvalidCastTarget { loc }));
    }

    let operand_ty = check_expr_non_void(tc, operand)?;
    if operand_ty.is_closure() {
        return Err(tc.report(TypeError::InvalidCastSource { loc }));
    }

    if target_ty.is_string() {
        let is_uint8 = matches!(operand_ty.as_ref(), TypeDesc::UInt { width: 8 });
        if !is_uint8 {
            return Err(tc.report(TypeError::InvalidStringCastSource {
                found: operand_ty.to_string(),
                loc,
            }));
        }
    }

    Ok(target_ty)
}

/// `isa(type, expr)`: always types as `int<32>`, but the original
/// constant-folds the node itself whenever the answer is determinable
/// without a run-time test (`pkl_typify1_ps_isa` in
/// `original_source/src/pkl-typify.c`): `isa(any, e)` is always true,
/// and `isa(T, e)` is decidable by structural equality whenever `e`'s own
/// type is not `any`. Only `isa(T, e: any)` must stay a run-time test.
/// This tree has no node-replacement path, so the fold is recorded on
/// `expr` itself via `folded_int` rather than rewriting `expr.kind`.
pub fn check_isa(
    tc: &mut TypeChecker,
    expr: &Expr,
    target: &TypeNode,
    operand: &Expr,
) -> Result<Rc<TypeDesc>, TypeError> {
    let target_ty = resolve_type_node(tc, target)?;
    let operand_ty = check_expr_non_void(tc, operand)?;

    if target_ty.is_any() {
        expr.set_folded_int(1);
    } else if !operand_ty.is_any() {
        expr.set_folded_int(target_ty.structurally_equal(&operand_ty) as i32);
    }
    // else: `operand_ty` is `any` and `target_ty` isn't — resolved at run time.

    Ok(Rc::new(TypeDesc::bool_result()))
}

pub fn check_sizeof_expr(tc: &mut TypeChecker, operand: &Expr) -> Result<Rc<TypeDesc>, TypeError> {
    let _operand_ty = check_expr_non_void(tc, operand)?;
    Ok(Rc::new(TypeDesc::offset_uint64(1)))
}

pub fn check_sizeof_type(tc: &mut TypeChecker, target: &TypeNode) -> Result<Rc<TypeDesc>, TypeError> {
    resolve_type_node(tc, target)?;
    Ok(Rc::new(TypeDesc::offset_uint64(1)))
}

/// Offset literal `m:U`: type is `offset<typeof(m), U>`.
pub fn check_offset_literal(
    tc: &mut TypeChecker,
    magnitude: &Expr,
    unit: u64,
) -> Result<Rc<TypeDesc>, TypeError> {
    let magnitude_ty = check_expr_non_void(tc, magnitude)?;
    Ok(Rc::new(TypeDesc::Offset {
        base: magnitude_ty,
        unit,
    }))
}
