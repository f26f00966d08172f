//! 4.2.7 Functions and calls, and 4.2.8 assignment.

use std::rc::Rc;

use pvm_core::TypeDesc;

use crate::ast::{Arg, Expr, ExprKind, FuncLit, SourceLocation};
use crate::error::TypeError;

use super::types_pass::resolve_type_node;
use super::{check_expr_non_void, statements, TypeChecker};

/// Structural equality, OR the formal is `any`, OR both sides are
/// integral, OR both sides are offset (4.2.7 step 6 / 4.2.8).
pub fn is_assignment_compatible(expected: &TypeDesc, found: &TypeDesc) -> bool {
    expected.structurally_equal(found)
        || expected.is_any()
        || (expected.is_integral() && found.is_integral())
        || (expected.is_offset() && found.is_offset())
}

/// Handled pre-order: the function's type is built and stamped onto
/// `expr` *before* the body is typed, so a variable reference to this
/// same literal (recursive self-reference) already has a type to read.
pub fn check_func_lit(tc: &mut TypeChecker, expr: &Expr, loc: SourceLocation) -> Result<Rc<TypeDesc>, TypeError> {
    let func = match &expr.kind {
        ExprKind::FuncLit(f) => f,
        _ => return Err(tc.ice("check_func_lit called on a non-FuncLit node", loc)),
    };

    let return_ty = resolve_type_node(tc, &func.return_type)?;
    let mut resolved_args = Vec::with_capacity(func.args.len());
    for a in &func.args {
        // Whether a sized array may appear here is a completeness-pass rule
        // (4.3), not a type-inference rule; only resolve the node here.
        resolved_args.push(pvm_core::ArgType {
            name: a.name.clone(),
            ty: resolve_type_node(tc, &a.ty)?,
            optional: a.optional,
            vararg: a.vararg,
        });
    }

    let own_ty = Rc::new(TypeDesc::Closure {
        return_type: return_ty.clone(),
        args: resolved_args,
    });

    *func.own_type.borrow_mut() = Some(own_ty.clone());
    expr.set_ty(own_ty.clone());

    tc.current_return_type.push(return_ty);
    let body_result = check_func_body(tc, func);
    tc.current_return_type.pop();
    body_result?;

    Ok(own_ty)
}

fn check_func_body(tc: &mut TypeChecker, func: &FuncLit) -> Result<(), TypeError> {
    for stmt in &func.body {
        statements::check_stmt(tc, stmt)?;
    }
    Ok(())
}

pub fn check_funcall(
    tc: &mut TypeChecker,
    callee: &Expr,
    args: &[Arg],
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let callee_ty = check_expr_non_void(tc, callee)?;
    let (return_type, formals) = match callee_ty.as_ref() {
        TypeDesc::Closure { return_type, args } => (return_type.clone(), args),
        _ => {
            return Err(tc.report(TypeError::NotCallable {
                found: callee_ty.to_string(),
                loc,
            }))
        }
    };

    let mandatory_count = formals.iter().take_while(|f| !f.optional && !f.vararg).count();
    let has_vararg = formals.iter().any(|f| f.vararg);

    if args.len() < mandatory_count {
        return Err(tc.report(TypeError::TooFewArgs {
            expected: mandatory_count,
            found: args.len(),
            loc,
        }));
    }
    if !has_vararg && args.len() > formals.len() {
        return Err(tc.report(TypeError::TooManyArgs {
            expected: formals.len(),
            found: args.len(),
            loc,
        }));
    }

    let named_mode = args.first().map(|a| a.name.is_some()).unwrap_or(false);

    if named_mode {
        let mut reordered: Vec<Option<&Expr>> = vec![None; formals.len()];
        for actual in args {
            let name = actual
                .name
                .as_ref()
                .ok_or_else(|| tc.ice("named-argument call mixed with an unnamed actual", loc))?;
            let idx = formals
                .iter()
                .position(|f| f.name.as_deref() == Some(name.as_str()))
                .ok_or_else(|| {
                    tc.report(TypeError::NoSuchArgument {
                        name: name.clone(),
                        loc,
                    })
                })?;
            reordered[idx] = Some(&actual.expr);
        }
        for (i, f) in formals.iter().enumerate() {
            if reordered[i].is_none() && !f.optional && !f.vararg {
                return Err(tc.report(TypeError::MissingRequiredArg {
                    name: f.name.clone().unwrap_or_default(),
                    loc,
                }));
            }
        }
        // Open question resolution (spec.md section 9): named-argument mode
        // always produces an empty vararg list, even if a vararg formal is
        // present; only the non-vararg formals are ever filled from
        // `reordered` above.
        for (i, f) in formals.iter().enumerate() {
            if let Some(actual_expr) = reordered[i] {
                let actual_ty = check_expr_non_void(tc, actual_expr)?;
                if !is_assignment_compatible(&f.ty, &actual_ty) {
                    return Err(tc.report(TypeError::WrongArgType {
                        expected: f.ty.to_string(),
                        found: actual_ty.to_string(),
                        loc,
                    }));
                }
            }
        }
    } else {
        for (i, actual) in args.iter().enumerate() {
            let formal = if i < formals.len() {
                &formals[i]
            } else {
                // already validated: has_vararg, so the last formal absorbs
                // the remaining positional actuals.
                formals.last().expect("has_vararg implies a last formal")
            };
            let actual_ty = check_expr_non_void(tc, &actual.expr)?;
            if !is_assignment_compatible(&formal.ty, &actual_ty) {
                return Err(tc.report(TypeError::WrongArgType {
                    expected: formal.ty.to_string(),
                    found: actual_ty.to_string(),
                    loc,
                }));
            }
        }
    }

    Ok(return_type)
}

pub fn check_assign(
    tc: &mut TypeChecker,
    lvalue: &Expr,
    rhs: &Expr,
    loc: SourceLocation,
) -> Result<Rc<TypeDesc>, TypeError> {
    let lvalue_ty = check_expr_non_void(tc, lvalue)?;
    let rhs_ty = check_expr_non_void(tc, rhs)?;

    if lvalue_ty.is_any() {
        return Ok(lvalue_ty);
    }
    if !is_assignment_compatible(&lvalue_ty, &rhs_ty) {
        return Err(tc.report(TypeError::AssignmentTypeMismatch {
            expected: lvalue_ty.to_string(),
            found: rhs_ty.to_string(),
            loc,
        }));
    }
    Ok(lvalue_ty)
}
