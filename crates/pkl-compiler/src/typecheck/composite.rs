//! 4.2.6 Composite constructors and references, plus the ternary
//! expression (listed among the value-consuming contexts in 4.2.7 step 7
//! even though its own typing rule isn't spelled out elsewhere — it
//! follows the same compatibility rule as assignment/argument passing).

use std::rc::Rc;

use pvm_core::TypeDesc;

use crate::ast::{Expr, SourceLocation, TypeNode, TypeNodeKind};
use crate::error::TypeError;

use super::functions::is_assignment_compatible;
use super::types_pass::resolve_type_node;
use super::{check_expr_non_void, TypeChecker};

pub fn check_array_lit(
    tc: &mut TypeChecker,
    elems: &[Expr],
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let mut elem_ty: Option<Rc<TypeDesc>> = None;
    for e in elems {
        let ty = check_expr_non_void(tc, e)?;
        match &elem_ty {
            None => elem_ty = Some(ty),
            Some(first) => {
                if !first.structurally_equal(&ty) {
                    return Err(tc.report(TypeError::InconsistentArrayLiteral {
                        first: first.to_string(),
                        other: ty.to_string(),
                        loc: e.loc,
                    }));
                }
            }
        }
    }
    let elem_ty = elem_ty.unwrap_or_else(|| Rc::new(TypeDesc::Any));
    Ok(Rc::new(TypeDesc::Array {
        elem: elem_ty,
        bound: Some(pvm_core::ArrayBound::Count(elems.len() as u64)),
    }))
}

pub fn check_struct_lit(
    tc: &mut TypeChecker,
    fields: &[(String, Expr)],
    _loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let mut resolved = Vec::with_capacity(fields.len());
    for (name, e) in fields {
        let ty = check_expr_non_void(tc, e)?;
        resolved.push(pvm_core::FieldType {
            name: name.clone(),
            ty,
        });
    }
    Ok(Rc::new(TypeDesc::Struct {
        name: None,
        fields: resolved,
    }))
}

pub fn check_trimmer(
    tc: &mut TypeChecker,
    entity: &Expr,
    from: &Expr,
    to: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let entity_ty = check_expr_non_void(tc, entity)?;
    let from_ty = check_expr_non_void(tc, from)?;
    let to_ty = check_expr_non_void(tc, to)?;
    if !from_ty.is_integral() || !to_ty.is_integral() {
        return Err(tc.report(TypeError::InvalidOperands {
            op: "[..]",
            lhs: from_ty.to_string(),
            rhs: to_ty.to_string(),
            loc,
        }));
    }
    if !entity_ty.is_array() && !entity_ty.is_string() {
        return Err(tc.report(TypeError::InvalidIndexTarget {
            found: entity_ty.to_string(),
            loc,
        }));
    }
    Ok(entity_ty)
}

pub fn check_indexer(
    tc: &mut TypeChecker,
    entity: &Expr,
    index: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let entity_ty = check_expr_non_void(tc, entity)?;
    let index_ty = check_expr_non_void(tc, index)?;
    if !index_ty.is_integral() {
        return Err(tc.report(TypeError::InvalidOperands {
            op: "[]",
            lhs: entity_ty.to_string(),
            rhs: index_ty.to_string(),
            loc,
        }));
    }
    match entity_ty.as_ref() {
        TypeDesc::Array { elem, .. } => Ok(elem.clone()),
        TypeDesc::String => Ok(Rc::new(TypeDesc::UInt { width: 8 })),
        _ => Err(tc.report(TypeError::InvalidIndexTarget {
            found: entity_ty.to_string(),
            loc,
        })),
    }
}

pub fn check_field_ref(
    tc: &mut TypeChecker,
    entity: &Expr,
    field: &str,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let entity_ty = check_expr_non_void(tc, entity)?;
    match entity_ty.as_ref() {
        TypeDesc::Struct { fields, .. } => fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.ty.clone())
            .ok_or_else(|| {
                tc.report(TypeError::NoSuchField {
                    field: field.to_string(),
                    struct_ty: entity_ty.to_string(),
                    loc,
                })
            }),
        _ => Err(tc.report(TypeError::NoSuchField {
            field: field.to_string(),
            struct_ty: entity_ty.to_string(),
            loc,
        })),
    }
}

pub fn check_map(
    tc: &mut TypeChecker,
    target: &TypeNode,
    offset: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let target_ty = resolve_type_node(tc, target)?;
    let offset_ty = check_expr_non_void(tc, offset)?;
    if !offset_ty.is_offset() {
        return Err(tc.report(TypeError::InvalidMapOperand {
            found: offset_ty.to_string(),
            loc,
        }));
    }
    Ok(target_ty)
}

pub fn check_struct_ctor(
    tc: &mut TypeChecker,
    target: &TypeNode,
    fields: &[(String, Expr)],
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    if !matches!(target.kind, TypeNodeKind::Struct { .. }) {
        return Err(tc.report(TypeError::InvalidStructCtorTarget { loc }));
    }
    let target_ty = resolve_type_node(tc, target)?;
    for (_, e) in fields {
        check_expr_non_void(tc, e)?;
    }
    Ok(target_ty)
}

pub fn check_ternary(
    tc: &mut TypeChecker,
    cond: &Expr,
    then_branch: &Expr,
    else_branch: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let cond_ty = check_expr_non_void(tc, cond)?;
    if !cond_ty.is_integral() {
        return Err(tc.report(TypeError::InvalidLoopCondition {
            found: cond_ty.to_string(),
            loc,
        }));
    }
    let then_ty = check_expr_non_void(tc, then_branch)?;
    let else_ty = check_expr_non_void(tc, else_branch)?;
    if !is_assignment_compatible(&then_ty, &else_ty) {
        return Err(tc.report(TypeError::WrongArgType {
            expected: then_ty.to_string(),
            found: else_ty.to_string(),
            loc,
        }));
    }
    Ok(then_ty)
}
