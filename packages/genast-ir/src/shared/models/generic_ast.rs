//! Generic AST - the language-agnostic tree every frontend normalizes into
//!
//! Design:
//! - One tagged union per syntactic category (expr, stmt, pattern, type, ...)
//! - Constructs without a native shape go through the `Other*` variants,
//!   which carry an explicit operator tag plus a list of `Any` payloads
//! - Tokens and name-resolution metadata never influence equality, so two
//!   trees with the same structure compare equal regardless of where they
//!   came from

use super::token::{Bracket, Tok, Wrap};

/// Identifier with its token
pub type Ident = Wrap<String>;

/// `a.b.c`
pub type DottedIdent = Vec<Ident>;

/// Whole file
pub type Program = Vec<Stmt>;

// ═══════════════════════════════════════════════════════════════════════════
// Names
// ═══════════════════════════════════════════════════════════════════════════

/// Name resolution computed by the frontend's scope analysis
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedNameKind {
    Local,
    Param,
    Global,
    ImportedEntity(DottedIdent),
    ImportedModule(ModuleName),
}

/// Optional enrichment attached to identifiers.
///
/// Equality ignores it: it is never required for structural matching.
#[derive(Debug, Clone, Default)]
pub struct IdInfo {
    pub resolved: Option<ResolvedNameKind>,
    pub id_type: Option<Box<Type>>,
}

impl IdInfo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn resolved(kind: Option<ResolvedNameKind>) -> Self {
        Self {
            resolved: kind,
            id_type: None,
        }
    }
}

impl PartialEq for IdInfo {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleName {
    DottedName(DottedIdent),
    /// Filesystem-style path, used for relative imports (`"../a/b"`)
    FileName(Wrap<String>),
}

// ═══════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(Wrap<bool>),
    /// `None` when the literal does not fit
    Int(Wrap<Option<i64>>),
    Float(Wrap<Option<f64>>),
    Imag(Wrap<String>),
    String(Wrap<String>),
    Null(Tok),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Pow,
    FloorDiv,
    MatMult,

    // Bitwise
    LSL,
    LSR,
    BitOr,
    BitXor,
    BitAnd,
    BitNot,

    // Logical
    And,
    Or,
    Not,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    NotIs,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcatStringKind {
    /// f-strings
    InterpolatedConcat,
    /// `"a" "b"`
    SequenceConcat,
}

/// Builtin markers used as call targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Special {
    This,
    Super,
    Op(Operator),
    /// Prefixed string literal; carries the prefix (`b`, `r`, `rb`, ...)
    EncodedString(String),
    ConcatString(ConcatStringKind),
    /// `{e!r:fmt}` inside an f-string
    InterpolatedElement,
    /// `*e`
    Spread,
    /// `**e`
    HashSplat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerOperator {
    Array,
    List,
    Set,
    Dict,
    /// Only used by `Comprehension` (generator expressions)
    Tuple,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    L(Literal),
    Container(ContainerOperator, Bracket<Vec<Expr>>),
    Tuple(Bracket<Vec<Expr>>),
    Comprehension(ContainerOperator, Bracket<Comprehension>),

    Id(Ident, IdInfo),
    IdSpecial(Wrap<Special>),

    Call(Box<Expr>, Arguments),
    Assign(Box<Expr>, Tok, Box<Expr>),
    AssignOp(Box<Expr>, Wrap<Operator>, Box<Expr>),
    LetPattern(Box<Pattern>, Box<Expr>),

    DotAccess(Box<Expr>, Tok, Ident),
    ArrayAccess(Box<Expr>, Bracket<Box<Expr>>),
    SliceAccess(Box<Expr>, Bracket<Slice>),

    Lambda(Box<FunctionDefinition>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `yield e` / `yield from e` (flag set for `from`)
    Yield(Tok, Option<Box<Expr>>, bool),
    Await(Tok, Box<Expr>),

    Ellipsis(Tok),

    OtherExpr(OtherExprOperator, Vec<Any>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub result: Box<Expr>,
    pub clauses: Vec<ForOrIf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForOrIf {
    /// `for pat in e`
    CompFor(Tok, Pattern, Tok, Expr),
    /// `if e`
    CompIf(Tok, Expr),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slice {
    pub start: Option<Box<Expr>>,
    pub stop: Option<Box<Expr>>,
    pub step: Option<Box<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherExprOperator {
    /// Chained comparison: operators first, then operands
    CmpOps,
    /// Subscript with more than one index element
    Slices,
    /// `a:b:c` inside a multi-slice
    SliceRange,
}

pub type Arguments = Bracket<Vec<Argument>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Arg(Expr),
    ArgKwd(Ident, Expr),
    ArgOther(OtherArgumentOperator, Vec<Any>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherArgumentOperator {
    /// `**kwargs`
    ArgPow,
}

// ═══════════════════════════════════════════════════════════════════════════
// Types and patterns
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    TyExpr(Expr),
    TyTuple(Bracket<Vec<Type>>),
    OtherType(OtherTypeOperator, Vec<Any>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherTypeOperator {
    /// Non-positional argument in a base-class list (`metaclass=M`)
    Arg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    PatId(Ident, IdInfo),
    PatLiteral(Literal),
    PatTuple(Bracket<Vec<Pattern>>),
    PatList(Bracket<Vec<Pattern>>),
    PatUnderscore(Tok),
    /// Matches any value of the given type
    PatType(Type),
    /// Value of a type, optionally bound to a name
    PatVar(Type, Option<(Ident, IdInfo)>),
    PatEllipsis(Tok),
    OtherPat(OtherPatternOperator, Vec<Any>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherPatternOperator {
    /// Expression with no pattern counterpart (`a.b`, `x[0]` as loop target)
    Expr,
}

// ═══════════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    ExprStmt(Expr, Tok),
    DefStmt(Box<Definition>),
    DirectiveStmt(Directive),
    Block(Bracket<Vec<Stmt>>),

    If(Tok, Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Tok, Expr, Box<Stmt>),
    For(Tok, ForHeader, Box<Stmt>),

    Return(Tok, Option<Expr>, Tok),
    Continue(Tok, Tok),
    Break(Tok, Tok),
    Throw(Tok, Expr, Tok),
    Try(Tok, Box<Stmt>, Vec<Catch>, Option<Finally>),
    Assert(Tok, Expr, Option<Expr>, Tok),

    OtherStmtWithStmt(OtherStmtWithStmtOperator, Option<Expr>, Box<Stmt>),
    OtherStmt(OtherStmtOperator, Vec<Any>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForHeader {
    /// `for pat in e`
    ForEach(Pattern, Tok, Expr),
}

/// `except <pattern>: body`
pub type Catch = (Tok, Pattern, Stmt);

/// `finally: body`
pub type Finally = (Tok, Box<Stmt>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherStmtWithStmtOperator {
    With,
    /// `async for` / `async with`
    Async,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherStmtOperator {
    /// `else:` of a `while` loop
    WhileOrElse,
    /// `else:` of a `for` loop
    ForOrElse,
    /// `else:` of a `try`
    TryOrElse,
    Pass,
    Global,
    NonLocal,
    Delete,
    /// Bare `raise`
    ThrowNothing,
    /// `raise e from cause`
    ThrowFrom,
    /// Python 2 `exec`
    Exec,
    /// Annotated assignment whose target is not a plain name
    AnnotatedAssign,
}

// ═══════════════════════════════════════════════════════════════════════════
// Definitions
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub entity: Entity,
    pub kind: DefinitionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: Ident,
    pub info: IdInfo,
    pub attrs: Vec<Attribute>,
}

impl Entity {
    pub fn basic(name: Ident, info: IdInfo) -> Self {
        Self {
            name,
            info,
            attrs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    FuncDef(FunctionDefinition),
    VarDef(VariableDefinition),
    FieldDef(VariableDefinition),
    ClassDef(ClassDefinition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub kind: Wrap<FunctionKind>,
    pub params: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    LambdaKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableDefinition {
    pub init: Option<Expr>,
    pub vtype: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    pub kind: Wrap<ClassKind>,
    pub extends: Vec<Type>,
    pub body: Bracket<Vec<Stmt>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Classic(ParameterClassic),
    Pattern(Pattern),
    /// `*args`
    Rest(Tok, ParameterClassic),
    /// `**kwargs`
    HashSplat(Tok, ParameterClassic),
    Ellipsis(Tok),
    OtherParam(OtherParameterOperator, Vec<Any>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterClassic {
    pub name: Ident,
    pub ptype: Option<Type>,
    pub default: Option<Expr>,
    pub info: IdInfo,
}

impl ParameterClassic {
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            ptype: None,
            default: None,
            info: IdInfo::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherParameterOperator {
    /// Bare `*` separating keyword-only parameters
    SingleStar,
    /// Bare `/` separating positional-only parameters
    Slash,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    KeywordAttr(Wrap<Keyword>),
    /// `@a.b(args)`
    NamedAttr(Tok, DottedIdent, Arguments),
    OtherAttribute(OtherAttributeOperator, Vec<Any>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Async,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherAttributeOperator {
    /// Decorator whose expression is not a (called) dotted name
    Decorator,
}

// ═══════════════════════════════════════════════════════════════════════════
// Directives
// ═══════════════════════════════════════════════════════════════════════════

/// Imported name with its optional alias
pub type ImportedName = (Ident, Option<(Ident, IdInfo)>);

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `from m import a, b as c`
    ImportFrom(Tok, ModuleName, Vec<ImportedName>),
    /// `import m` / `import m as n`
    ImportAs(Tok, ModuleName, Option<(Ident, IdInfo)>),
    /// `from m import *`
    ImportAll(Tok, ModuleName, Tok),
}

// ═══════════════════════════════════════════════════════════════════════════
// Any
// ═══════════════════════════════════════════════════════════════════════════

/// Payload of the `Other*` escape hatches, and of pattern snippets
#[derive(Debug, Clone, PartialEq)]
pub enum Any {
    E(Expr),
    S(Stmt),
    Ss(Vec<Stmt>),
    T(Type),
    P(Pattern),
    I(Ident),
    Tk(Tok),
    Ar(Argument),
    Pa(Parameter),
    Modn(ModuleName),
}

// ═══════════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════════

impl Expr {
    pub fn id(name: Ident) -> Self {
        Expr::Id(name, IdInfo::empty())
    }

    /// `f(args)` where every argument is positional
    pub fn call_positional(f: Expr, args: Vec<Expr>) -> Self {
        Expr::Call(
            Box::new(f),
            super::token::fake_bracket(args.into_iter().map(Argument::Arg).collect()),
        )
    }

    /// Call to a builtin marker
    pub fn special_call(special: Special, tok: Tok, args: Vec<Argument>) -> Self {
        Expr::Call(
            Box::new(Expr::IdSpecial((special, tok))),
            super::token::fake_bracket(args),
        )
    }
}

impl Stmt {
    /// Expression statement with a fake terminator
    pub fn expr(e: Expr) -> Self {
        Stmt::ExprStmt(e, Tok::fake(""))
    }

    /// Block made of fake braces
    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(super::token::fake_bracket(stmts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_info_ignored_by_equality() {
        let a = Expr::Id(
            ("x".to_string(), Tok::fake("x")),
            IdInfo::resolved(Some(ResolvedNameKind::Local)),
        );
        let b = Expr::Id(("x".to_string(), Tok::fake("x")), IdInfo::empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_structure_still_matters() {
        let a = Expr::id(("x".to_string(), Tok::fake("x")));
        let b = Expr::id(("y".to_string(), Tok::fake("y")));
        assert_ne!(a, b);
    }
}
