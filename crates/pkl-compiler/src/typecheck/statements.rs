//! Statement-level rules: 4.2.9 (loop, pre-order) and the remaining
//! statement forms (print, raise, try/catch, return, var decl).

use pvm_core::TypeDesc;

use crate::ast::{LoopStmt, Stmt};
use crate::error::TypeError;

use super::{check_expr, check_expr_non_void, TypeChecker};

pub fn check_stmt(tc: &mut TypeChecker, stmt: &Stmt) -> Result<(), TypeError> {
    match stmt {
        Stmt::Expr(e) => {
            check_expr(tc, e)?;
        }
        Stmt::VarDecl { init, .. } => {
            check_expr_non_void(tc, init)?;
        }
        Stmt::Loop(loop_stmt) => check_loop(tc, loop_stmt)?,
        Stmt::Print(e) => {
            let ty = check_expr_non_void(tc, e)?;
            if !ty.is_string() {
                return Err(tc.report(TypeError::PrintOperandNotString {
                    found: ty.to_string(),
                    loc: e.loc,
                }));
            }
        }
        Stmt::Raise(expr) => {
            if let Some(e) = expr {
                let ty = check_expr_non_void(tc, e)?;
                if !ty.is_integral() {
                    return Err(tc.report(TypeError::RaiseOperandNotIntegral {
                        found: ty.to_string(),
                        loc: e.loc,
                    }));
                }
            }
        }
        Stmt::TryCatch {
            try_body,
            catch_arg,
            catch_cond,
            catch_body,
        } => {
            for s in try_body {
                check_stmt(tc, s)?;
            }
            if let Some(arg) = catch_arg {
                let ty = check_expr_non_void(tc, arg)?;
                if !matches!(ty.as_ref(), TypeDesc::Int { width: 32 }) {
                    return Err(tc.report(TypeError::CatchArgNotInt32 {
                        found: ty.to_string(),
                        loc: arg.loc,
                    }));
                }
            }
            if let Some(cond) = catch_cond {
                let ty = check_expr_non_void(tc, cond)?;
                if !ty.is_integral() {
                    return Err(tc.report(TypeError::CatchConditionNotIntegral {
                        found: ty.to_string(),
                        loc: cond.loc,
                    }));
                }
            }
            for s in catch_body {
                check_stmt(tc, s)?;
            }
        }
        Stmt::Return(expr, loc) => check_return(tc, expr.as_ref(), *loc)?,
    }
    Ok(())
}

/// Pre-order and out-of-order by design (4.2.9): the container is typed
/// first so the iteration variable's type can be overwritten with the
/// element type before the condition and body are typed against it.
fn check_loop(tc: &mut TypeChecker, loop_stmt: &LoopStmt) -> Result<(), TypeError> {
    if let Some(container) = &loop_stmt.container {
        let container_ty = check_expr_non_void(tc, container)?;
        let elem_ty = match container_ty.as_ref() {
            TypeDesc::Array { elem, .. } => elem.clone(),
            TypeDesc::String => std::rc::Rc::new(TypeDesc::UInt { width: 8 }),
            _ => {
                return Err(tc.report(TypeError::InvalidLoopContainer {
                    found: container_ty.to_string(),
                    loc: container.loc,
                }))
            }
        };
        if let Some(iter_var) = &loop_stmt.iter_var {
            iter_var.set_ty(elem_ty);
        }
    }

    if let Some(cond) = &loop_stmt.condition {
        let cond_ty = check_expr_non_void(tc, cond)?;
        if !matches!(cond_ty.as_ref(), TypeDesc::Int { width: 32 }) {
            return Err(tc.report(TypeError::InvalidLoopCondition {
                found: cond_ty.to_string(),
                loc: cond.loc,
            }));
        }
    }

    for s in &loop_stmt.body {
        check_stmt(tc, s)?;
    }
    Ok(())
}

fn check_return(
    tc: &mut TypeChecker,
    expr: Option<&crate::ast::Expr>,
    loc: crate::ast::SourceLocation,
) -> Result<(), TypeError> {
    let declared = match tc.current_return_type.last() {
        Some(ty) => ty.clone(),
        // A `return` outside any function body: nothing to check against.
        None => {
            if let Some(e) = expr {
                check_expr_non_void(tc, e)?;
            }
            return Ok(());
        }
    };

    if declared.is_void() {
        if expr.is_some() {
            return Err(tc.report(TypeError::ReturnValueInVoidFunction { loc }));
        }
        return Ok(());
    }

    match expr {
        None => Err(tc.report(TypeError::ReturnTypeMismatch {
            expected: declared.to_string(),
            found: "void".to_string(),
            loc,
        })),
        Some(e) => {
            let found = check_expr_non_void(tc, e)?;
            if super::functions::is_assignment_compatible(&declared, &found) {
                Ok(())
            } else {
                Err(tc.report(TypeError::ReturnTypeMismatch {
                    expected: declared.to_string(),
                    found: found.to_string(),
                    loc,
                }))
            }
        }
    }
}
