//! AST node types for the Quill snippet language.
//!
//! Every node carries a [`Span`] for diagnostics. Recursive variants are
//! boxed to keep enum sizes reasonable. Trees are immutable once built:
//! the trailing-expression rewrite produces a new `Program` rather than
//! mutating one in place.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete snippet: a sequence of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `x = expr`, `xs[i] = expr`, `m.field = expr`
    Assign(AssignStmt),
    /// `fn name(params) { body }`
    FnDecl(FnDecl),
    /// `if cond { ... } [else if ... | else { ... }]`
    If(IfStmt),
    /// `while cond { ... }`
    While(WhileStmt),
    /// `for item [, index] in expr { ... }`
    For(ForStmt),
    /// `return [expr]`
    Return(ReturnStmt),
    /// `break`
    Break(Span),
    /// `continue`
    Continue(Span),
    /// `assert expr [, "message"]`
    Assert(AssertStmt),
    /// A bare expression (value discarded).
    Expr(ExprStmt),
    /// Display the expression's value. Never produced by the parser; only
    /// the trailing-expression rewrite emits this.
    Show(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign(s) => s.span,
            Stmt::FnDecl(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
            Stmt::Assert(s) => s.span,
            Stmt::Expr(s) | Stmt::Show(s) => s.span,
        }
    }
}

/// `root[.field | [index]]* = value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// The variable being assigned (or whose interior is updated).
    pub root: Ident,
    /// Path from the root to the assigned place; empty for `x = v`.
    pub path: Vec<PathSeg>,
    pub value: Expr,
    pub span: Span,
}

/// One step into a list or map on the left side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSeg {
    /// `[index]`
    Index(Expr),
    /// `.field`
    Field(Ident),
}

/// `fn name(params) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
    pub span: Span,
}

/// `if cond { ... } [else if ... | else { ... }]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

/// The else branch of an if statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    ElseIf(Box<IfStmt>),
    Block(Block),
}

/// `while cond { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for item [, index] in iterable { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub item: Ident,
    pub index: Option<Ident>,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

/// `return [expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `assert expr [, "message"]`
#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmt {
    pub condition: Expr,
    pub message: Option<String>,
    pub span: Span,
}

/// A bare expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    /// `42`, `3.14`
    NumberLit(f64),
    /// `"hello"`
    StringLit(String),
    /// `true` / `false`
    BoolLit(bool),
    /// `nil`
    NilLit,
    /// `[expr, ...]`
    ListLit(Vec<Expr>),
    /// `{ key: expr, ... }`
    MapLit(Vec<MapEntry>),

    // ── Identifiers & postfix forms ──
    /// `count`, `my_var`
    Identifier(String),
    /// `callee(args...)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `expr[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `expr.field`
    FieldAccess {
        object: Box<Expr>,
        field: Ident,
    },

    // ── Operators ──
    /// `a + b`, `a == b`, `a and b`, etc.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `-x`, `not x`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    // ── Grouping ──
    /// `(expr)`
    Paren(Box<Expr>),
}

/// An entry in a map literal: `key: expr`. Keys are identifiers or string
/// literals; both are stored as the key text.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub key_span: Span,
    pub value: Expr,
}

/// Binary operators (lowest precedence first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// The operator symbol, for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `not x`
    Not,
}
