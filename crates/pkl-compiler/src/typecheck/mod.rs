//! Type Inference Pass (phase 1), spec.md section 4.2.
//!
//! Dispatch is an exhaustive `match` on `Expr`/`Stmt` (the idiom the
//! teacher uses for its own AST walks, e.g. `TypeChecker::check_word` in
//! `crates/compiler/src/typechecker.rs`), not the original's integer-coded
//! dispatch table (`original_source/src/pkl-typify.c`). Every handler runs
//! post-order except the function-literal handler (4.2.7, pre-order) and
//! the loop-statement handler (4.2.9, which drives its own out-of-order
//! sub-typing and does not recurse generically afterward).
//!
//! Cooperative termination (spec.md section 5) is `?`-based early return;
//! `TypeChecker::errors` is the payload holding an error count the spec
//! calls for, incremented wherever a `Result::Err` is turned into a
//! diagnostic.

pub mod attributes;
pub mod binary;
pub mod casts;
pub mod composite;
pub mod functions;
pub mod statements;
pub mod types_pass;
pub mod unary;

use std::rc::Rc;

use pvm_core::TypeDesc;
use tracing::debug;

use crate::ast::{Expr, ExprKind, Program, SourceLocation};
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::error::TypeError;

/// Drives the type-inference pass over a program, tracking the error
/// count spec.md section 4.2 requires ("maintains a payload holding an
/// error count").
pub struct TypeChecker<'a> {
    pub(crate) sink: &'a mut dyn DiagnosticSink,
    errors: usize,
    /// Declared return type of the function currently being checked, for
    /// `Return` validation (4.2.9). `None` at the top level.
    pub(crate) current_return_type: Vec<Rc<TypeDesc>>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(sink: &'a mut dyn DiagnosticSink) -> Self {
        TypeChecker {
            sink,
            errors: 0,
            current_return_type: Vec::new(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Type-check an entire program. Returns `Ok(())` iff zero errors were
    /// raised; the completeness pass must not run otherwise (spec.md
    /// section 7).
    pub fn check_program(&mut self, program: &Program) -> Result<(), ()> {
        debug!(statements = program.statements.len(), "type inference pass starting");
        for stmt in &program.statements {
            if statements::check_stmt(self, stmt).is_err() {
                return Err(());
            }
        }
        if self.errors == 0 {
            Ok(())
        } else {
            Err(())
        }
    }

    /// Record a diagnostic and bump the error counter. The pass always
    /// halts on the first error (callers propagate `Err` via `?`), but the
    /// counter is kept as an independent, inspectable fact per spec.md.
    pub(crate) fn report(&mut self, err: TypeError) -> TypeError {
        self.errors += 1;
        let severity = if err.is_ice() {
            Severity::InternalCompilerError
        } else {
            Severity::Error
        };
        self.sink.report(severity, err.loc(), err.to_string());
        err
    }

    pub(crate) fn ice(&mut self, detail: impl Into<String>, loc: SourceLocation) -> TypeError {
        self.report(TypeError::InternalCompilerError {
            detail: detail.into(),
            loc,
        })
    }
}

/// Type-check `expr` and return its inferred type, post-order (children
/// typed first) for every node kind except `FuncLit`, which types itself
/// pre-order (4.2.7).
pub fn check_expr(tc: &mut TypeChecker, expr: &Expr) -> Result<Rc<TypeDesc>, TypeError> {
    let ty = match &expr.kind {
        ExprKind::IntLit(_, w) => Rc::new(TypeDesc::Int { width: *w }),
        ExprKind::UIntLit(_, w) => Rc::new(TypeDesc::UInt { width: *w }),
        ExprKind::LongLit(_, w) => Rc::new(TypeDesc::Long { width: *w }),
        ExprKind::ULongLit(_, w) => Rc::new(TypeDesc::ULong { width: *w }),
        ExprKind::StringLit(_) => Rc::new(TypeDesc::String),

        ExprKind::Unary(op, operand) => unary::check_unary(tc, *op, operand, expr.loc)?,
        ExprKind::Binary(op, lhs, rhs) => binary::check_binary(tc, *op, lhs, rhs, expr.loc)?,
        ExprKind::Attribute(attr, operand) => attributes::check_attribute(tc, *attr, operand, expr.loc)?,

        ExprKind::Cast(target, operand) => casts::check_cast(tc, target, operand, expr.loc)?,
        ExprKind::Isa(target, operand) => casts::check_isa(tc, expr, target, operand)?,
        ExprKind::SizeofExpr(operand) => casts::check_sizeof_expr(tc, operand)?,
        ExprKind::SizeofType(target) => casts::check_sizeof_type(tc, target)?,
        ExprKind::OffsetLit(magnitude, unit) => casts::check_offset_literal(tc, magnitude, *unit)?,

        ExprKind::ArrayLit(elems) => composite::check_array_lit(tc, elems, expr.loc)?,
        ExprKind::StructLit(fields) => composite::check_struct_lit(tc, fields, expr.loc)?,
        ExprKind::Trimmer(entity, from, to) => composite::check_trimmer(tc, entity, from, to, expr.loc)?,
        ExprKind::Indexer(entity, index) => composite::check_indexer(tc, entity, index, expr.loc)?,
        ExprKind::FieldRef(entity, field) => composite::check_field_ref(tc, entity, field, expr.loc)?,
        ExprKind::Map(target, offset) => composite::check_map(tc, target, offset, expr.loc)?,
        ExprKind::StructCtor(target, fields) => composite::check_struct_ctor(tc, target, fields, expr.loc)?,

        ExprKind::VarRef(decl) => {
            decl.ty().ok_or_else(|| {
                tc.ice(
                    "variable reference resolved before its declaration was typed",
                    expr.loc,
                )
            })?
        }

        ExprKind::Ternary(cond, then_branch, else_branch) => {
            composite::check_ternary(tc, cond, then_branch, else_branch, expr.loc)?
        }

        // Pre-order: `check_func_lit` stamps `expr`'s type itself before
        // descending into the body, so it takes `expr` rather than just the
        // inner `FuncLit`. The `expr.set_ty` below is an idempotent re-write.
        ExprKind::FuncLit(_) => functions::check_func_lit(tc, expr, expr.loc)?,
        ExprKind::Funcall(callee, args) => functions::check_funcall(tc, callee, args, expr.loc)?,
        ExprKind::Assign(lvalue, rhs) => functions::check_assign(tc, lvalue, rhs, expr.loc)?,
    };
    expr.set_ty(ty.clone());
    Ok(ty)
}

/// Helper shared by every "value-consuming context" call site (4.2.7 step
/// 7): type-check `expr` and reject it if its type is `void`.
pub(crate) fn check_expr_non_void(tc: &mut TypeChecker, expr: &Expr) -> Result<Rc<TypeDesc>, TypeError> {
    let ty = check_expr(tc, expr)?;
    if ty.is_void() {
        return Err(tc.report(TypeError::VoidInValueContext { loc: expr.loc }));
    }
    Ok(ty)
}
