//! Python syntax tree
//!
//! Language-specific tree produced by the Python frontend and consumed by
//! the generic-AST normalizer. It stays close to the concrete syntax
//! (one variant per construct) so the normalizer can decide every mapping.

use crate::shared::models::{Bracket, Tok, Wrap};

pub type Name = Wrap<String>;
pub type DottedName = Vec<Name>;

/// Python type annotations are plain expressions
pub type Type = Expr;

/// Result of scope analysis for one identifier
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedName {
    LocalVar,
    Parameter,
    GlobalVar,
    ClassField,
    ImportedModule(DottedName),
    ImportedEntity(DottedName),
    NotResolved,
}

/// Module path of an import, with its leading relative dots
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleName {
    pub dotted: DottedName,
    /// One token per leading `.`; `None` for absolute imports
    pub dots: Option<Vec<Tok>>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(Wrap<Option<i64>>),
    Float(Wrap<Option<f64>>),
    Imag(Wrap<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Invert,
    Not,
    UAdd,
    USub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOpKind {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// Display body: either explicit elements or a comprehension
#[derive(Debug, Clone, PartialEq)]
pub enum ListOrComprehension<T> {
    CompList(Bracket<Vec<T>>),
    CompForIf(Bracket<Box<(T, Vec<ForIf>)>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForIf {
    /// `for target in iter`
    CompFor(Tok, Expr, Tok, Expr),
    CompIf(Tok, Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictOrSetElt {
    /// `k: v`
    KeyVal(Expr, Expr),
    /// `k` (set element, or `...` in a pattern)
    Key(Expr),
    /// `**d`
    PowInline(Tok, Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slice {
    Index(Expr),
    Range(Option<Expr>, Option<Expr>, Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Arg(Expr),
    ArgKwd(Name, Expr),
    /// `*args`
    ArgStar(Tok, Expr),
    /// `**kwargs`
    ArgPow(Tok, Expr),
    /// Unparenthesized generator as sole argument: `f(x for x in y)`
    ArgComp(Expr, Vec<ForIf>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(Number),
    Str(Wrap<String>),
    /// String with a prefix (`b"..."`, `r"..."`); carries the prefix
    EncodedStr(Wrap<String>, String),
    /// f-string: literal parts and `FormattedValue`s in order
    InterpolatedString(Tok, Vec<Expr>),
    /// Implicit concatenation of adjacent string literals
    ConcatenatedString(Vec<Expr>),
    /// `{value!conversion:format_spec}`
    FormattedValue(Box<Expr>, Option<Name>, Option<Box<Expr>>),
    Bool(Wrap<bool>),
    None_(Tok),
    Ellipsis(Tok),

    Name(Name, Option<ResolvedName>),

    Tuple(ListOrComprehension<Expr>),
    List(ListOrComprehension<Expr>),
    DictOrSet(ListOrComprehension<DictOrSetElt>),

    BoolOp(Wrap<BoolOpKind>, Vec<Expr>),
    BinOp(Box<Expr>, Wrap<OperatorKind>, Box<Expr>),
    UnaryOp(Wrap<UnaryOpKind>, Box<Expr>),
    Compare(Box<Expr>, Vec<Wrap<CmpOp>>, Vec<Expr>),

    Call(Box<Expr>, Bracket<Vec<Argument>>),
    Subscript(Box<Expr>, Bracket<Vec<Slice>>),
    Attribute(Box<Expr>, Tok, Name),

    Lambda(Tok, Vec<Parameter>, Box<Expr>),
    /// `body if test else orelse`: stored as (test, body, orelse)
    IfExp(Box<Expr>, Box<Expr>, Box<Expr>),
    Yield(Tok, Option<Box<Expr>>, bool),
    Await(Tok, Box<Expr>),
    /// `target := value`
    NamedExpr(Box<Expr>, Tok, Box<Expr>),
    /// `*e` in a display or assignment target
    Starred(Tok, Box<Expr>),
}

impl Expr {
    pub fn name(name: Name) -> Self {
        Expr::Name(name, None)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Python 2 tuple parameter `def f((a, b)): ...`
#[derive(Debug, Clone, PartialEq)]
pub enum ParamPattern {
    Name(Name),
    Tuple(Bracket<Vec<ParamPattern>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Classic(Name, Option<Type>),
    Default(Name, Option<Type>, Expr),
    Pattern(ParamPattern),
    /// `*args`
    Star(Tok, Name, Option<Type>),
    /// `**kwargs`
    Pow(Tok, Name, Option<Type>),
    /// `...` (patterns only)
    Ellipsis(Tok),
    /// Bare `*`
    SingleStar(Tok),
    /// Bare `/`
    Slash(Tok),
}

// ═══════════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub at: Tok,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub def_tok: Tok,
    pub name: Name,
    pub params: Vec<Parameter>,
    pub returns: Option<Type>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Decorator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub class_tok: Tok,
    pub name: Name,
    pub bases: Vec<Argument>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Decorator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub except_tok: Tok,
    pub typ: Option<Expr>,
    pub name: Option<Name>,
    pub body: Vec<Stmt>,
}

/// `name as alias` in `from m import ...`
pub type Alias = (Name, Option<Name>);

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    ExprStmt(Expr),

    /// `t1 = t2 = value`: one entry per target
    Assign(Vec<Expr>, Tok, Expr),
    AugAssign(Expr, Wrap<OperatorKind>, Expr),
    AnnAssign(Expr, Type, Option<Expr>),

    /// `for target in iter: body else: orelse`
    For(Tok, Expr, Tok, Expr, Vec<Stmt>, Vec<Stmt>),
    While(Tok, Expr, Vec<Stmt>, Vec<Stmt>),
    If(Tok, Expr, Vec<Stmt>, Option<Vec<Stmt>>),
    /// One context manager; `with a, b:` nests
    With(Tok, Expr, Option<Expr>, Vec<Stmt>),

    Return(Tok, Option<Expr>),
    Delete(Tok, Vec<Expr>),
    Pass(Tok),
    Break(Tok),
    Continue(Tok),
    /// `raise`, `raise e`, `raise e from cause`
    Raise(Tok, Option<(Expr, Option<Expr>)>),

    TryExcept(Tok, Vec<Stmt>, Vec<ExceptHandler>, Vec<Stmt>),
    TryFinally(Tok, Vec<Stmt>, Tok, Vec<Stmt>),
    Assert(Tok, Expr, Option<Expr>),

    ImportAs(Tok, ModuleName, Option<Name>),
    ImportAll(Tok, ModuleName, Tok),
    ImportFrom(Tok, ModuleName, Vec<Alias>),
    Global(Tok, Vec<Name>),
    NonLocal(Tok, Vec<Name>),

    /// Python 2 `print >>dest, values`
    Print(Tok, Option<Expr>, Vec<Expr>),
    /// Python 2 `exec code in globals, locals`
    Exec(Tok, Expr, Option<Expr>, Option<Expr>),

    /// `async` prefix of `def`, `for`, `with`
    Async(Tok, Box<Stmt>),

    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
}

/// A parsed file
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub file: String,
    pub body: Vec<Stmt>,
}

/// Pattern snippet: what a rule pattern parses to
#[derive(Debug, Clone, PartialEq)]
pub enum Any {
    Expr(Expr),
    Stmt(Stmt),
    Stmts(Vec<Stmt>),
}
