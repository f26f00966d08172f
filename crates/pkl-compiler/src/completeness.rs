//! Completeness Pass (phase 2), spec.md section 4.3.
//!
//! A second, independent traversal over the same AST the type-inference
//! pass already annotated. It never re-derives a `TypeDesc`; it only
//! recomputes each `TypeNode`'s completeness flag (section 3.4) and
//! enforces the one rule that is phase-2's alone: a sized array type
//! must not be a function argument's declared type.
//!
//! Only ever run after `TypeChecker::check_program` returns `Ok(())` —
//! spec.md section 4.4: "the caller receives a nonzero error count and
//! should not invoke the completeness pass".

use crate::ast::{
    Arg, ArrayBoundNode, Expr, ExprKind, FuncLit, LoopStmt, Program, Stmt, TypeNode, TypeNodeKind,
};
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::error::TypeError;

pub struct CompletenessChecker<'a> {
    sink: &'a mut dyn DiagnosticSink,
    errors: usize,
}

impl<'a> CompletenessChecker<'a> {
    pub fn new(sink: &'a mut dyn DiagnosticSink) -> Self {
        CompletenessChecker { sink, errors: 0 }
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn check_program(&mut self, program: &Program) -> Result<(), ()> {
        for stmt in &program.statements {
            self.walk_stmt(stmt);
        }
        if self.errors == 0 {
            Ok(())
        } else {
            Err(())
        }
    }

    fn report(&mut self, err: TypeError) {
        self.errors += 1;
        self.sink.report(Severity::Error, err.loc(), err.to_string());
    }

    /// Recomputes and stores `node.complete`, recursing into any runtime
    /// expressions a dynamic array bound carries (they may themselves
    /// contain casts, sizeof-of-type, etc. that need their own nodes
    /// annotated).
    fn walk_type_node(&mut self, node: &TypeNode) -> bool {
        let complete = match &node.kind {
            TypeNodeKind::Integral { .. } | TypeNodeKind::String => true,
            TypeNodeKind::Array { elem, bound } => {
                let elem_complete = self.walk_type_node(elem);
                if let ArrayBoundNode::Dynamic(expr) = bound {
                    self.walk_expr(expr);
                }
                elem_complete && matches!(bound, ArrayBoundNode::ConstCount(_))
            }
            TypeNodeKind::Struct { fields, .. } => {
                let mut all_complete = true;
                for f in fields {
                    if !self.walk_type_node(&f.ty) {
                        all_complete = false;
                    }
                }
                all_complete
            }
            TypeNodeKind::Type => false,
            TypeNodeKind::Offset { base, .. } => self.walk_type_node(base),
            TypeNodeKind::Closure { return_type, args } => {
                self.walk_type_node(return_type);
                for a in args {
                    if self.walk_type_node(&a.ty) && matches!(a.ty.kind, TypeNodeKind::Array { bound: ArrayBoundNode::ConstCount(_), .. })
                    {
                        self.report(TypeError::SizedArrayInArgPosition { loc: a.ty.loc });
                    }
                }
                false
            }
            TypeNodeKind::Any => false,
            TypeNodeKind::Void => false,
        };
        node.complete.set(Some(complete));
        complete
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => self.walk_expr(e),
            Stmt::VarDecl { init, .. } => self.walk_expr(init),
            Stmt::Loop(loop_stmt) => self.walk_loop(loop_stmt),
            Stmt::Print(e) => self.walk_expr(e),
            Stmt::Raise(expr) => {
                if let Some(e) = expr {
                    self.walk_expr(e);
                }
            }
            Stmt::TryCatch {
                try_body,
                catch_arg,
                catch_cond,
                catch_body,
            } => {
                for s in try_body {
                    self.walk_stmt(s);
                }
                if let Some(e) = catch_arg {
                    self.walk_expr(e);
                }
                if let Some(e) = catch_cond {
                    self.walk_expr(e);
                }
                for s in catch_body {
                    self.walk_stmt(s);
                }
            }
            Stmt::Return(expr, _) => {
                if let Some(e) = expr {
                    self.walk_expr(e);
                }
            }
        }
    }

    fn walk_loop(&mut self, loop_stmt: &LoopStmt) {
        if let Some(c) = &loop_stmt.container {
            self.walk_expr(c);
        }
        if let Some(c) = &loop_stmt.condition {
            self.walk_expr(c);
        }
        for s in &loop_stmt.body {
            self.walk_stmt(s);
        }
    }

    fn walk_func_lit(&mut self, func: &FuncLit) {
        for a in &func.args {
            if self.walk_type_node(&a.ty)
                && matches!(a.ty.kind, TypeNodeKind::Array { bound: ArrayBoundNode::ConstCount(_), .. })
            {
                self.report(TypeError::SizedArrayInArgPosition { loc: a.ty.loc });
            }
        }
        self.walk_type_node(&func.return_type);
        for s in &func.body {
            self.walk_stmt(s);
        }
    }

    fn walk_args(&mut self, args: &[Arg]) {
        for a in args {
            self.walk_expr(&a.expr);
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::IntLit(..)
            | ExprKind::UIntLit(..)
            | ExprKind::LongLit(..)
            | ExprKind::ULongLit(..)
            | ExprKind::StringLit(_)
            | ExprKind::VarRef(_) => {}
            ExprKind::Unary(_, e) => self.walk_expr(e),
            ExprKind::Binary(_, l, r) => {
                self.walk_expr(l);
                self.walk_expr(r);
            }
            ExprKind::Attribute(_, e) => self.walk_expr(e),
            ExprKind::Cast(target, e) => {
                self.walk_type_node(target);
                self.walk_expr(e);
            }
            ExprKind::Isa(target, e) => {
                self.walk_type_node(target);
                self.walk_expr(e);
            }
            ExprKind::SizeofExpr(e) => self.walk_expr(e),
            // "The operand of a SIZEOF applied to a type is re-annotated for
            // completeness" -- this is exactly that re-annotation.
            ExprKind::SizeofType(target) => {
                self.walk_type_node(target);
            }
            ExprKind::OffsetLit(magnitude, _) => self.walk_expr(magnitude),
            ExprKind::ArrayLit(elems) => {
                for e in elems {
                    self.walk_expr(e);
                }
            }
            ExprKind::StructLit(fields) => {
                for (_, e) in fields {
                    self.walk_expr(e);
                }
            }
            ExprKind::Trimmer(entity, from, to) => {
                self.walk_expr(entity);
                self.walk_expr(from);
                self.walk_expr(to);
            }
            ExprKind::Indexer(entity, index) => {
                self.walk_expr(entity);
                self.walk_expr(index);
            }
            ExprKind::FieldRef(entity, _) => self.walk_expr(entity),
            ExprKind::Map(target, offset) => {
                self.walk_type_node(target);
                self.walk_expr(offset);
            }
            ExprKind::StructCtor(target, fields) => {
                self.walk_type_node(target);
                for (_, e) in fields {
                    self.walk_expr(e);
                }
            }
            ExprKind::Ternary(cond, then_branch, else_branch) => {
                self.walk_expr(cond);
                self.walk_expr(then_branch);
                self.walk_expr(else_branch);
            }
            ExprKind::FuncLit(func) => self.walk_func_lit(func),
            ExprKind::Funcall(callee, args) => {
                self.walk_expr(callee);
                self.walk_args(args);
            }
            ExprKind::Assign(lvalue, rhs) => {
                self.walk_expr(lvalue);
                self.walk_expr(rhs);
            }
        }
    }
}
