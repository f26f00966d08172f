//! 4.2.10 Type-node validations, and resolution of a user-written
//! `TypeNode` into a reified `TypeDesc`.
//!
//! Resolution is folded into validation (rather than run as a separate
//! step) because every rule in 4.2.10 is itself a precondition for
//! producing a well-formed `TypeDesc`: an integral node with an
//! out-of-range width, or a struct field that is itself a function type,
//! has no sensible reified type to return.

use std::rc::Rc;

use pvm_core::{ArgType, FieldType, TypeDesc};

use crate::ast::{ArrayBoundNode, TypeNode, TypeNodeKind};
use crate::error::TypeError;

use super::{check_expr_non_void, TypeChecker};

pub fn resolve_type_node(tc: &mut TypeChecker, node: &TypeNode) -> Result<Rc<TypeDesc>, TypeError> {
    let resolved = match &node.kind {
        TypeNodeKind::Integral { signed, width } => {
            if !(1..=64).contains(width) {
                return Err(tc.report(TypeError::IntegralWidthOutOfRange {
                    width: *width as u32,
                    loc: node.loc,
                }));
            }
            Rc::new(TypeDesc::integral(*signed, *width))
        }
        TypeNodeKind::String => Rc::new(TypeDesc::String),
        TypeNodeKind::Array { elem, bound } => {
            let elem_ty = resolve_type_node(tc, elem)?;
            let bound = match bound {
                ArrayBoundNode::None => None,
                ArrayBoundNode::ConstCount(n) => Some(pvm_core::ArrayBound::Count(*n)),
                ArrayBoundNode::Dynamic(expr) => {
                    let bound_ty = check_expr_non_void(tc, expr)?;
                    if !bound_ty.is_integral() && !bound_ty.is_offset() {
                        return Err(tc.report(TypeError::InvalidArrayBound {
                            found: bound_ty.to_string(),
                            loc: node.loc,
                        }));
                    }
                    Some(pvm_core::ArrayBound::Dynamic)
                }
            };
            Rc::new(TypeDesc::Array { elem: elem_ty, bound })
        }
        TypeNodeKind::Struct { name, fields } => {
            let mut resolved_fields = Vec::with_capacity(fields.len());
            for f in fields {
                if matches!(f.ty.kind, TypeNodeKind::Closure { .. }) {
                    return Err(tc.report(TypeError::FunctionTypeAsStructField { loc: f.ty.loc }));
                }
                let field_ty = resolve_type_node(tc, &f.ty)?;
                resolved_fields.push(FieldType {
                    name: f.name.clone(),
                    ty: field_ty,
                });
            }
            Rc::new(TypeDesc::Struct {
                name: name.clone(),
                fields: resolved_fields,
            })
        }
        TypeNodeKind::Type => Rc::new(TypeDesc::Type),
        TypeNodeKind::Offset { base, unit } => {
            let base_ty = resolve_type_node(tc, base)?;
            Rc::new(TypeDesc::Offset { base: base_ty, unit: *unit })
        }
        TypeNodeKind::Closure { return_type, args } => {
            let ret = resolve_type_node(tc, return_type)?;
            let mut resolved_args = Vec::with_capacity(args.len());
            for a in args {
                resolved_args.push(ArgType {
                    name: a.name.clone(),
                    ty: resolve_type_node(tc, &a.ty)?,
                    optional: a.optional,
                    vararg: a.vararg,
                });
            }
            Rc::new(TypeDesc::Closure {
                return_type: ret,
                args: resolved_args,
            })
        }
        TypeNodeKind::Any => Rc::new(TypeDesc::Any),
        TypeNodeKind::Void => Rc::new(TypeDesc::Void),
    };
    Ok(resolved)
}
