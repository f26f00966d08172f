//! End-to-end scenarios and universal invariants from spec.md section 8.

use std::rc::Rc;

use pkl_compiler::ast::{
    Arg, ArgTypeNode, BinaryOp, Expr, ExprKind, FuncLit, Program, SourceLocation, Stmt, TypeNode,
    TypeNodeKind,
};
use pkl_compiler::diagnostics::CollectingSink;
use pkl_compiler::error::TypeError;
use pkl_compiler::typecheck::{self, TypeChecker};
use pvm_core::TypeDesc;

fn loc() -> SourceLocation {
    SourceLocation::new(1, 1)
}

fn int_lit(v: i64, w: u8) -> Expr {
    Expr::new(ExprKind::IntLit(v, w), loc())
}

fn uint_lit(v: u64, w: u8) -> Expr {
    Expr::new(ExprKind::UIntLit(v, w), loc())
}

fn type_node(kind: TypeNodeKind) -> Rc<TypeNode> {
    TypeNode::new(kind, loc())
}

fn check_one(expr: &Expr) -> Result<Rc<TypeDesc>, TypeError> {
    let mut sink = CollectingSink::default();
    let mut tc = TypeChecker::new(&mut sink);
    typecheck::check_expr(&mut tc, expr)
}

#[test]
fn scenario_1_integral_promotion() {
    let expr = Expr::new(
        ExprKind::Binary(BinaryOp::Add, Box::new(uint_lit(3, 8)), Box::new(int_lit(-1, 16))),
        loc(),
    );
    let ty = check_one(&expr).expect("promotion never errors on two integrals");
    assert_eq!(ty.as_ref(), &TypeDesc::UInt { width: 16 });
}

#[test]
fn scenario_2_bconc_width_overflow() {
    let expr = Expr::new(
        ExprKind::Binary(BinaryOp::Bconc, Box::new(uint_lit(0, 40)), Box::new(uint_lit(0, 25))),
        loc(),
    );
    let err = check_one(&expr).expect_err("40 + 25 bits exceeds 64");
    assert!(matches!(err, TypeError::WidthOverflow { width: 65, .. }));
}

#[test]
fn scenario_3_offset_arithmetic() {
    let offset_lit = Expr::new(ExprKind::OffsetLit(Box::new(uint_lit(10, 64)), 8), loc());
    let expr = Expr::new(
        ExprKind::Binary(BinaryOp::Mul, Box::new(offset_lit), Box::new(int_lit(3, 32))),
        loc(),
    );
    let ty = check_one(&expr).expect("int * offset is well-typed");
    match ty.as_ref() {
        TypeDesc::Offset { base, unit } => {
            // int<32> * uint<64> promotes to width 64, unsigned: the 32/64
            // split puts 64-bit unsigned in the ULong arm, not UInt (see
            // `TypeDesc::integral`). Both print as `uint<64>`.
            assert_eq!(**base, TypeDesc::ULong { width: 64 });
            assert_eq!(*unit, 8);
        }
        other => panic!("expected an offset type, got {other}"),
    }
}

#[test]
fn scenario_4_named_arg_reorder_uses_defaults_for_omitted_optionals() {
    let func_lit_expr = Expr::new(
        ExprKind::FuncLit(FuncLit {
            args: vec![
                ArgTypeNode {
                    name: Some("a".into()),
                    ty: type_node(TypeNodeKind::Integral { signed: true, width: 32 }),
                    optional: true,
                    vararg: false,
                },
                ArgTypeNode {
                    name: Some("b".into()),
                    ty: type_node(TypeNodeKind::Integral { signed: true, width: 32 }),
                    optional: false,
                    vararg: false,
                },
                ArgTypeNode {
                    name: Some("c".into()),
                    ty: type_node(TypeNodeKind::Integral { signed: true, width: 32 }),
                    optional: true,
                    vararg: false,
                },
            ],
            return_type: type_node(TypeNodeKind::Void),
            body: vec![],
            own_type: std::cell::RefCell::new(None),
        }),
        loc(),
    );

    let mut sink = CollectingSink::default();
    let mut tc = TypeChecker::new(&mut sink);
    typecheck::check_expr(&mut tc, &func_lit_expr).expect("function literal always types");

    let func_rc = Rc::new(func_lit_expr);
    let callee = Expr::new(ExprKind::VarRef(func_rc), loc());

    let args = vec![
        Arg {
            name: Some("c".into()),
            expr: int_lit(3, 32),
        },
        Arg {
            name: Some("b".into()),
            expr: int_lit(7, 32),
        },
    ];

    let result = typecheck::functions::check_funcall(&mut tc, &callee, &args, loc());
    // `a` is optional and omitted: the call must type-check without it,
    // relying on the (unmodeled here) default value at codegen time.
    assert!(result.is_ok(), "omitting an optional named arg must not error: {result:?}");
}

#[test]
fn scenario_5_isa_always_types_as_int32() {
    // `isa(any, "x")`: always true, folds to `1` regardless of the operand.
    let target = type_node(TypeNodeKind::Any);
    let operand = Expr::new(ExprKind::StringLit("x".into()), loc());
    let expr = Expr::new(ExprKind::Isa(target, Box::new(operand)), loc());
    let ty = check_one(&expr).unwrap();
    assert_eq!(ty.as_ref(), &TypeDesc::Int { width: 32 });
    assert_eq!(expr.folded_int(), Some(1));

    // `isa(int<16>, uint<16>(0))`: decidable by structural equality, folds
    // to `0` since `uint<16>` isn't `int<16>`.
    let target2 = type_node(TypeNodeKind::Integral { signed: true, width: 16 });
    let operand2 = uint_lit(0, 16);
    let expr2 = Expr::new(ExprKind::Isa(target2, Box::new(operand2)), loc());
    let ty2 = check_one(&expr2).unwrap();
    assert_eq!(ty2.as_ref(), &TypeDesc::Int { width: 32 });
    assert_eq!(expr2.folded_int(), Some(0));

    // `isa(int<16>, x: any)`: the operand's own type is `any`, so the
    // answer can't be decided here and must defer to a run-time test. A
    // declaration already typed `any` (rather than a grammar production
    // that infers `any`) stands in for `x` here, since `VarRef` just reads
    // back whatever type its declaration carries.
    let target3 = type_node(TypeNodeKind::Integral { signed: true, width: 16 });
    let any_decl = Expr::new(ExprKind::StringLit("x".into()), loc());
    any_decl.set_ty(Rc::new(TypeDesc::Any));
    let operand3 = Expr::new(ExprKind::VarRef(Rc::new(any_decl)), loc());
    let expr3 = Expr::new(ExprKind::Isa(target3, Box::new(operand3)), loc());
    let ty3 = check_one(&expr3).unwrap();
    assert_eq!(ty3.as_ref(), &TypeDesc::Int { width: 32 });
    assert_eq!(expr3.folded_int(), None);
}

#[test]
fn scenario_6_void_in_array_literal_errors() {
    let void_call_callee = Expr::new(
        ExprKind::FuncLit(FuncLit {
            args: vec![],
            return_type: type_node(TypeNodeKind::Void),
            body: vec![],
            own_type: std::cell::RefCell::new(None),
        }),
        loc(),
    );
    let funcall = Expr::new(
        ExprKind::Funcall(Box::new(void_call_callee), vec![]),
        loc(),
    );
    let array_lit = Expr::new(ExprKind::ArrayLit(vec![funcall]), loc());

    let err = check_one(&array_lit).expect_err("void call inside an array literal must error");
    assert!(matches!(err, TypeError::VoidInValueContext { .. }));
}

#[test]
fn invariant_type_equality_is_reflexive_and_symmetric() {
    let t = TypeDesc::Int { width: 16 };
    let u = TypeDesc::UInt { width: 16 };
    assert!(t.structurally_equal(&t));
    assert_eq!(t.structurally_equal(&u), u.structurally_equal(&t));
}

#[test]
fn invariant_promotion_rule_matches_max_width_and_conjoined_signedness() {
    for (w1, s1, w2, s2) in [(8u8, true, 16u8, false), (32, true, 32, true), (8, false, 8, false)] {
        let lhs = if s1 {
            TypeDesc::Int { width: w1 }
        } else {
            TypeDesc::UInt { width: w1 }
        };
        let rhs = if s2 {
            TypeDesc::Int { width: w2 }
        } else {
            TypeDesc::UInt { width: w2 }
        };
        let result = pkl_compiler::typecheck::binary::integral_promote(&lhs, &rhs);
        assert_eq!(result.integral_width(), Some(w1.max(w2)));
        assert_eq!(result.is_signed(), s1 && s2);
    }
}

#[test]
fn invariant_completeness_is_monotone_over_constant_bound_arrays() {
    use pvm_core::ArrayBound;
    let elem = Rc::new(TypeDesc::Int { width: 8 });
    let arr = TypeDesc::Array {
        elem,
        bound: Some(ArrayBound::Count(4)),
    };
    assert!(arr.is_complete());
}

#[test]
fn program_level_check_runs_both_passes_and_reports_zero_errors_on_a_clean_program() {
    let program = Program {
        statements: vec![Stmt::VarDecl {
            name: "x".into(),
            init: int_lit(1, 32),
        }],
    };
    let mut sink = CollectingSink::default();
    let errors = pkl_compiler::check(&program, &mut sink);
    assert_eq!(errors, 0);
}
