//! `TypeError`: every user-facing rule named in spec.md sections 4.2/4.3,
//! plus the internal-compiler-error escape hatch (section 7).
//!
//! Each variant carries a `SourceLocation` and, where a rule calls for it,
//! pretty-printed expected/actual type strings (via `TypeDesc`'s `Display`
//! impl, never a debug dump of the type tree).

use thiserror::Error;

use crate::ast::{Attribute, SourceLocation};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("{loc}: operand of {op} must be integral, found {found}")]
    InvalidUnaryOperand {
        op: &'static str,
        found: String,
        loc: SourceLocation,
    },

    #[error("{loc}: operands of {op} must share the same kind (integral, string, or offset); found {lhs} and {rhs}")]
    InvalidOperands {
        op: &'static str,
        lhs: String,
        rhs: String,
        loc: SourceLocation,
    },

    #[error("{loc}: bit-concatenation width {width} exceeds 64")]
    WidthOverflow { width: u32, loc: SourceLocation },

    #[error("{loc}: attribute '{attr}' is not defined on {found}")]
    InvalidAttribute {
        attr: Attribute,
        found: String,
        loc: SourceLocation,
    },

    #[error("{loc}: cast target type must not be 'any' or a function type")]
    InvalidCastTarget { loc: SourceLocation },

    #[error("{loc}: cannot cast from a function type")]
    InvalidCastSource { loc: SourceLocation },

    #[error("{loc}: cast to 'string' requires a 'uint<8>' source, found {found}")]
    InvalidStringCastSource { found: String, loc: SourceLocation },

    #[error("{loc}: indexer target must be an array or string, found {found}")]
    InvalidIndexTarget { found: String, loc: SourceLocation },

    #[error("{loc}: no field named '{field}' in {struct_ty}")]
    NoSuchField {
        field: String,
        struct_ty: String,
        loc: SourceLocation,
    },

    #[error("{loc}: map target of '@' must be an offset, found {found}")]
    InvalidMapOperand { found: String, loc: SourceLocation },

    #[error("{loc}: struct constructor target must be a struct type")]
    InvalidStructCtorTarget { loc: SourceLocation },

    #[error("{loc}: array literal elements must share a common type; found {first} and {other}")]
    InconsistentArrayLiteral {
        first: String,
        other: String,
        loc: SourceLocation,
    },

    #[error("{loc}: callee is not callable, found {found}")]
    NotCallable { found: String, loc: SourceLocation },

    #[error("{loc}: too few arguments: expected at least {expected}, found {found}")]
    TooFewArgs {
        expected: usize,
        found: usize,
        loc: SourceLocation,
    },

    #[error("{loc}: too many arguments: expected at most {expected}, found {found}")]
    TooManyArgs {
        expected: usize,
        found: usize,
        loc: SourceLocation,
    },

    #[error("{loc}: no such named argument '{name}'")]
    NoSuchArgument { name: String, loc: SourceLocation },

    #[error("{loc}: missing required argument '{name}'")]
    MissingRequiredArg { name: String, loc: SourceLocation },

    #[error("{loc}: argument type mismatch: expected {expected}, found {found}")]
    WrongArgType {
        expected: String,
        found: String,
        loc: SourceLocation,
    },

    #[error("{loc}: void-returning call used in a value-consuming context")]
    VoidInValueContext { loc: SourceLocation },

    #[error("{loc}: cannot assign {found} to l-value of type {expected}")]
    AssignmentTypeMismatch {
        expected: String,
        found: String,
        loc: SourceLocation,
    },

    #[error("{loc}: loop container must be an array or string, found {found}")]
    InvalidLoopContainer { found: String, loc: SourceLocation },

    #[error("{loc}: loop condition must be int<32>, found {found}")]
    InvalidLoopCondition { found: String, loc: SourceLocation },

    #[error("{loc}: print operand must be a string, found {found}")]
    PrintOperandNotString { found: String, loc: SourceLocation },

    #[error("{loc}: raise expression must be integral, found {found}")]
    RaiseOperandNotIntegral { found: String, loc: SourceLocation },

    #[error("{loc}: catch argument must be int<32>, found {found}")]
    CatchArgNotInt32 { found: String, loc: SourceLocation },

    #[error("{loc}: catch condition must be integral, found {found}")]
    CatchConditionNotIntegral { found: String, loc: SourceLocation },

    #[error("{loc}: function returning void cannot return a value")]
    ReturnValueInVoidFunction { loc: SourceLocation },

    #[error("{loc}: return value type mismatch: expected {expected}, found {found}")]
    ReturnTypeMismatch {
        expected: String,
        found: String,
        loc: SourceLocation,
    },

    #[error("{loc}: integral type width must be in [1, 64], found {width}")]
    IntegralWidthOutOfRange { width: u32, loc: SourceLocation },

    #[error("{loc}: array bound must be integral or offset, found {found}")]
    InvalidArrayBound { found: String, loc: SourceLocation },

    #[error("{loc}: struct field type must not itself be a function type")]
    FunctionTypeAsStructField { loc: SourceLocation },

    #[error("{loc}: sized array type is not allowed in function-argument position")]
    SizedArrayInArgPosition { loc: SourceLocation },

    #[error("internal compiler error at {loc}: {detail}")]
    InternalCompilerError { detail: String, loc: SourceLocation },
}

impl TypeError {
    pub fn loc(&self) -> SourceLocation {
        use TypeError::*;
        match self {
            InvalidUnaryOperand { loc, .. }
            | InvalidOperands { loc, .. }
            | WidthOverflow { loc, .. }
            | InvalidAttribute { loc, .. }
            | InvalidCastTarget { loc }
            | InvalidCastSource { loc }
            | InvalidStringCastSource { loc, .. }
            | InvalidIndexTarget { loc, .. }
            | NoSuchField { loc, .. }
            | InvalidMapOperand { loc, .. }
            | InvalidStructCtorTarget { loc }
            | InconsistentArrayLiteral { loc, .. }
            | NotCallable { loc, .. }
            | TooFewArgs { loc, .. }
            | TooManyArgs { loc, .. }
            | NoSuchArgument { loc, .. }
            | MissingRequiredArg { loc, .. }
            | WrongArgType { loc, .. }
            | VoidInValueContext { loc }
            | AssignmentTypeMismatch { loc, .. }
            | InvalidLoopContainer { loc, .. }
            | InvalidLoopCondition { loc, .. }
            | PrintOperandNotString { loc, .. }
            | RaiseOperandNotIntegral { loc, .. }
            | CatchArgNotInt32 { loc, .. }
            | CatchConditionNotIntegral { loc, .. }
            | ReturnValueInVoidFunction { loc }
            | ReturnTypeMismatch { loc, .. }
            | IntegralWidthOutOfRange { loc, .. }
            | InvalidArrayBound { loc, .. }
            | FunctionTypeAsStructField { loc }
            | SizedArrayInArgPosition { loc }
            | InternalCompilerError { loc, .. } => *loc,
        }
    }

    pub fn is_ice(&self) -> bool {
        matches!(self, TypeError::InternalCompilerError { .. })
    }
}
