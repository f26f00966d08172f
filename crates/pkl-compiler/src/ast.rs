//! Semantic AST model the type-inference and completeness passes read and
//! annotate.
//!
//! This is deliberately not a syntax tree: no token spans, no concrete
//! grammar productions, just the shape the passes need (node kind, source
//! location, a mutable type-annotation slot). The lexer/parser that would
//! build this tree from source text is out of scope; a variable reference
//! holds a direct link (`Rc<Expr>`) to its declaration's initializer
//! rather than a (back, over) pair, since resolving that link is the
//! parser/resolver's job, not the type pass's.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pvm_core::TypeDesc;

/// A position in the (single, implicit) source being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Bnot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Ior,
    Xor,
    Band,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Sl,
    Sr,
    Bconc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Size,
    Signed,
    Magnitude,
    Unit,
    Length,
    Alignment,
    Offset,
    Mapped,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Attribute::Size => "size",
            Attribute::Signed => "signed",
            Attribute::Magnitude => "magnitude",
            Attribute::Unit => "unit",
            Attribute::Length => "length",
            Attribute::Alignment => "alignment",
            Attribute::Offset => "offset",
            Attribute::Mapped => "mapped",
        };
        write!(f, "{}", s)
    }
}

/// A user-written type expression. Distinct from `pvm_core::TypeDesc`
/// (the resolved, reified type) because an array bound here may still be
/// a runtime expression at parse time.
#[derive(Debug)]
pub struct TypeNode {
    pub kind: TypeNodeKind,
    pub loc: SourceLocation,
    /// Filled in by the completeness pass (`pkl_compiler::completeness`).
    pub complete: Cell<Option<bool>>,
}

impl TypeNode {
    pub fn new(kind: TypeNodeKind, loc: SourceLocation) -> Rc<TypeNode> {
        Rc::new(TypeNode {
            kind,
            loc,
            complete: Cell::new(None),
        })
    }
}

#[derive(Debug)]
pub enum ArrayBoundNode {
    /// No bound written; the array type is unsized.
    None,
    /// A compile-time-constant element count, already folded.
    ConstCount(u64),
    /// A runtime expression (integral or offset-typed) bounding the array.
    Dynamic(Box<Expr>),
}

#[derive(Debug)]
pub struct FieldTypeNode {
    pub name: String,
    pub ty: Rc<TypeNode>,
}

#[derive(Debug)]
pub struct ArgTypeNode {
    pub name: Option<String>,
    pub ty: Rc<TypeNode>,
    pub optional: bool,
    pub vararg: bool,
}

#[derive(Debug)]
pub enum TypeNodeKind {
    Integral { signed: bool, width: u8 },
    String,
    Array { elem: Rc<TypeNode>, bound: ArrayBoundNode },
    Struct { name: Option<String>, fields: Vec<FieldTypeNode> },
    Type,
    Offset { base: Rc<TypeNode>, unit: u64 },
    Closure { return_type: Rc<TypeNode>, args: Vec<ArgTypeNode> },
    Any,
    /// `void`: the absence of a return value. Not itself one of the value
    /// kinds in `pvm_core::TypeDesc`; only valid as a function return type.
    Void,
}

/// A single call-site actual argument.
#[derive(Debug)]
pub struct Arg {
    pub name: Option<String>,
    pub expr: Expr,
}

#[derive(Debug)]
pub struct FuncLit {
    pub args: Vec<ArgTypeNode>,
    pub return_type: Rc<TypeNode>,
    pub body: Vec<Stmt>,
    /// Set pre-order (4.2.7) so the body can refer to the function
    /// recursively through its own binding before the body is typed.
    pub own_type: RefCell<Option<Rc<TypeDesc>>>,
}

#[derive(Debug)]
pub enum ExprKind {
    IntLit(i64, u8),
    UIntLit(u64, u8),
    LongLit(i64, u8),
    ULongLit(u64, u8),
    StringLit(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Attribute(Attribute, Box<Expr>),
    Cast(Rc<TypeNode>, Box<Expr>),
    Isa(Rc<TypeNode>, Box<Expr>),
    SizeofExpr(Box<Expr>),
    SizeofType(Rc<TypeNode>),
    OffsetLit(Box<Expr>, u64),
    ArrayLit(Vec<Expr>),
    StructLit(Vec<(String, Expr)>),
    Trimmer(Box<Expr>, Box<Expr>, Box<Expr>),
    Indexer(Box<Expr>, Box<Expr>),
    FieldRef(Box<Expr>, String),
    Map(Rc<TypeNode>, Box<Expr>),
    StructCtor(Rc<TypeNode>, Vec<(String, Expr)>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Resolved reference to a declaration's initializer expression.
    VarRef(Rc<Expr>),
    FuncLit(FuncLit),
    Funcall(Box<Expr>, Vec<Arg>),
    Assign(Box<Expr>, Box<Expr>),
}

#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: SourceLocation,
    pub ty: RefCell<Option<Rc<TypeDesc>>>,
    /// Set when the type-inference pass determines this node's value at
    /// compile time (currently only `Isa`, section 4.2.5 — the original's
    /// `pkl_typify1_ps_isa` rewrites the node to an integer literal and
    /// restarts the pass; this tree has no node-replacement path, so the
    /// constant is recorded alongside instead and the bytecode emitter
    /// reads it in place of emitting a run-time `isa` test).
    pub folded_int: Cell<Option<i32>>,
}

impl Expr {
    pub fn new(kind: ExprKind, loc: SourceLocation) -> Expr {
        Expr {
            kind,
            loc,
            ty: RefCell::new(None),
            folded_int: Cell::new(None),
        }
    }

    pub fn ty(&self) -> Option<Rc<TypeDesc>> {
        self.ty.borrow().clone()
    }

    pub fn set_ty(&self, ty: Rc<TypeDesc>) {
        *self.ty.borrow_mut() = Some(ty);
    }

    pub fn folded_int(&self) -> Option<i32> {
        self.folded_int.get()
    }

    pub fn set_folded_int(&self, v: i32) {
        self.folded_int.set(Some(v));
    }
}

#[derive(Debug)]
pub struct LoopStmt {
    pub container: Option<Expr>,
    /// The loop-introduced iteration variable's initializer; its type is
    /// overwritten in place with the container's element type (4.2.9).
    pub iter_var: Option<Expr>,
    pub condition: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Expr(Expr),
    VarDecl { name: String, init: Expr },
    Loop(LoopStmt),
    Print(Expr),
    Raise(Option<Expr>),
    TryCatch {
        try_body: Vec<Stmt>,
        catch_arg: Option<Expr>,
        catch_cond: Option<Expr>,
        catch_body: Vec<Stmt>,
    },
    Return(Option<Expr>, SourceLocation),
}

/// A compilation unit: a sequence of top-level statements.
#[derive(Debug, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
