//! Python syntax tree → generic AST
//!
//! A pure tree-to-tree map. Expressions always have an image; statements
//! return `Err(NormalizeError)` only for inputs the Python grammar cannot
//! produce (an assignment without targets, a named handler without type).
//!
//! Shapes worth knowing when writing patterns:
//! - operators are calls to `IdSpecial(Op(..))`, chained comparisons are
//!   `OtherExpr(CmpOps, ops ++ operands)`
//! - prefixed strings are `Call(IdSpecial(EncodedString(prefix)), [lit])`
//! - `else:` of loops and `try` becomes a trailing `OtherStmt(*OrElse)` in
//!   a synthetic block, only when the else branch is non-empty
//! - a body made of a single metavariable statement is not wrapped in a block

use regex::Regex;

use crate::config::{ConfigError, ConfigResult, NormalizerConfig};
use crate::errors::NormalizeError;
use crate::features::normalization::ports::Normalizer;
use crate::features::parsing::domain::python_ast as py;
use crate::shared::models::generic_ast as g;
use crate::shared::models::{fake_bracket, Tok, Wrap};
use crate::shared::utils::generic_helpers::{
    expr_to_pattern, expr_to_type, metavariable_regex, DEFAULT_METAVARIABLE_PATTERN,
};

type NResult<T> = Result<T, NormalizeError>;

/// Python → generic normalizer
#[derive(Debug, Clone)]
pub struct PythonNormalizer {
    metavariable: Regex,
}

impl Default for PythonNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonNormalizer {
    pub fn new() -> Self {
        Self {
            metavariable: metavariable_regex().clone(),
        }
    }

    pub fn with_metavariable_regex(metavariable: Regex) -> Self {
        Self { metavariable }
    }

    pub fn from_config(config: &NormalizerConfig) -> ConfigResult<Self> {
        if config.metavariable_pattern == DEFAULT_METAVARIABLE_PATTERN {
            return Ok(Self::new());
        }
        let re = Regex::new(&config.metavariable_pattern).map_err(|e| {
            ConfigError::Validation(format!("normalizer.metavariable_pattern: {}", e))
        })?;
        Ok(Self::with_metavariable_regex(re))
    }

    fn is_metavar(&self, name: &str) -> bool {
        self.metavariable.is_match(name)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Names
    // ═══════════════════════════════════════════════════════════════════════

    fn resolved(r: Option<py::ResolvedName>) -> g::IdInfo {
        let kind = match r {
            Some(py::ResolvedName::LocalVar) => Some(g::ResolvedNameKind::Local),
            Some(py::ResolvedName::Parameter) => Some(g::ResolvedNameKind::Param),
            Some(py::ResolvedName::GlobalVar) => Some(g::ResolvedNameKind::Global),
            Some(py::ResolvedName::ImportedModule(d)) => Some(
                g::ResolvedNameKind::ImportedModule(g::ModuleName::DottedName(d)),
            ),
            Some(py::ResolvedName::ImportedEntity(d)) => {
                Some(g::ResolvedNameKind::ImportedEntity(d))
            }
            Some(py::ResolvedName::ClassField) | Some(py::ResolvedName::NotResolved) | None => {
                None
            }
        };
        g::IdInfo::resolved(kind)
    }

    /// `from ..a.b import x` → `"../a/b"`; one dot is the current directory
    fn module_name(m: py::ModuleName) -> g::ModuleName {
        let dots = match m.dots {
            Some(dots) if !dots.is_empty() => dots,
            _ => return g::ModuleName::DottedName(m.dotted),
        };
        let tok = match dots.first() {
            Some(t) => t.clone(),
            None => Tok::fake("."),
        };
        let mut segments: Vec<String> = if dots.len() == 1 {
            vec![".".to_string()]
        } else {
            vec!["..".to_string(); dots.len() - 1]
        };
        segments.extend(m.dotted.into_iter().map(|(name, _)| name));
        g::ModuleName::FileName((segments.join("/"), tok))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════════

    fn exprs(&self, es: Vec<py::Expr>) -> Vec<g::Expr> {
        es.into_iter().map(|e| self.expr(e)).collect()
    }

    fn boxed(&self, e: py::Expr) -> Box<g::Expr> {
        Box::new(self.expr(e))
    }

    fn args(&self, es: Vec<g::Expr>) -> Vec<g::Argument> {
        es.into_iter().map(g::Argument::Arg).collect()
    }

    fn op_call(&self, op: g::Operator, tok: Tok, operands: Vec<g::Expr>) -> g::Expr {
        g::Expr::special_call(g::Special::Op(op), tok, self.args(operands))
    }

    pub fn expr(&self, e: py::Expr) -> g::Expr {
        use py::Expr as E;
        match e {
            E::Num(py::Number::Int(v)) => g::Expr::L(g::Literal::Int(v)),
            E::Num(py::Number::Float(v)) => g::Expr::L(g::Literal::Float(v)),
            E::Num(py::Number::Imag(v)) => g::Expr::L(g::Literal::Imag(v)),
            E::Str(s) => g::Expr::L(g::Literal::String(s)),
            E::EncodedStr((s, tok), prefix) => {
                // The marker must not share the literal's token
                let marker = Tok::fake_at(&tok);
                g::Expr::special_call(
                    g::Special::EncodedString(prefix),
                    marker,
                    vec![g::Argument::Arg(g::Expr::L(g::Literal::String((s, tok))))],
                )
            }
            E::InterpolatedString(tok, parts) => g::Expr::special_call(
                g::Special::ConcatString(g::ConcatStringKind::InterpolatedConcat),
                tok,
                self.args(self.exprs(parts)),
            ),
            E::ConcatenatedString(parts) => {
                let tok = match parts.first().and_then(first_token) {
                    Some(t) => Tok::fake_at(&t),
                    None => Tok::fake(""),
                };
                g::Expr::special_call(
                    g::Special::ConcatString(g::ConcatStringKind::SequenceConcat),
                    tok,
                    self.args(self.exprs(parts)),
                )
            }
            E::FormattedValue(value, _conversion, spec) => {
                let mut args = vec![g::Argument::Arg(self.expr(*value))];
                if let Some(spec) = spec {
                    args.push(g::Argument::Arg(self.expr(*spec)));
                }
                g::Expr::special_call(g::Special::InterpolatedElement, Tok::fake(""), args)
            }
            E::Bool(b) => g::Expr::L(g::Literal::Bool(b)),
            E::None_(t) => g::Expr::L(g::Literal::Null(t)),
            E::Ellipsis(t) => g::Expr::Ellipsis(t),

            E::Name(name, resolved) => g::Expr::Id(name, Self::resolved(resolved)),

            E::Tuple(py::ListOrComprehension::CompList((l, xs, r))) => {
                g::Expr::Tuple((l, self.exprs(xs), r))
            }
            E::Tuple(py::ListOrComprehension::CompForIf((l, comp, r))) => {
                let (e, clauses) = *comp;
                self.comprehension(g::ContainerOperator::Tuple, l, e, clauses, r)
            }
            E::List(py::ListOrComprehension::CompList((l, xs, r))) => {
                g::Expr::Container(g::ContainerOperator::List, (l, self.exprs(xs), r))
            }
            E::List(py::ListOrComprehension::CompForIf((l, comp, r))) => {
                let (e, clauses) = *comp;
                self.comprehension(g::ContainerOperator::List, l, e, clauses, r)
            }
            E::DictOrSet(py::ListOrComprehension::CompList((l, elts, r))) => {
                let op = if is_dict_display(&elts) {
                    g::ContainerOperator::Dict
                } else {
                    g::ContainerOperator::Set
                };
                let elts = elts.into_iter().map(|x| self.dict_or_set_elt(x)).collect();
                g::Expr::Container(op, (l, elts, r))
            }
            E::DictOrSet(py::ListOrComprehension::CompForIf((l, comp, r))) => {
                let (elt, clauses) = *comp;
                let op = match elt {
                    py::DictOrSetElt::KeyVal(..) => g::ContainerOperator::Dict,
                    _ => g::ContainerOperator::Set,
                };
                let result = self.dict_or_set_elt(elt);
                g::Expr::Comprehension(
                    op,
                    (
                        l,
                        g::Comprehension {
                            result: Box::new(result),
                            clauses: self.for_ifs(clauses),
                        },
                        r,
                    ),
                )
            }

            E::BoolOp((op, tok), operands) => {
                let op = match op {
                    py::BoolOpKind::And => g::Operator::And,
                    py::BoolOpKind::Or => g::Operator::Or,
                };
                self.op_call(op, tok, self.exprs(operands))
            }
            E::BinOp(l, (op, tok), r) => {
                let operands = vec![self.expr(*l), self.expr(*r)];
                self.op_call(binary_operator(op), tok, operands)
            }
            E::UnaryOp((op, tok), e) => {
                let op = match op {
                    py::UnaryOpKind::Invert => g::Operator::BitNot,
                    py::UnaryOpKind::Not => g::Operator::Not,
                    py::UnaryOpKind::UAdd => g::Operator::Plus,
                    py::UnaryOpKind::USub => g::Operator::Minus,
                };
                self.op_call(op, tok, vec![self.expr(*e)])
            }
            E::Compare(left, ops, rest) => self.compare(*left, ops, rest),

            E::Call(f, (l, args, r)) => {
                let f = self.boxed(*f);
                let args = args.into_iter().map(|a| self.argument(a)).collect();
                g::Expr::Call(f, (l, args, r))
            }
            E::Subscript(value, (l, slices, r)) => self.subscript(*value, l, slices, r),
            E::Attribute(value, dot, name) => g::Expr::DotAccess(self.boxed(*value), dot, name),

            E::Lambda(tok, params, body) => {
                let def = g::FunctionDefinition {
                    kind: (g::FunctionKind::LambdaKind, tok),
                    params: self.parameters(params),
                    return_type: None,
                    body: Box::new(g::Stmt::expr(self.expr(*body))),
                };
                g::Expr::Lambda(Box::new(def))
            }
            E::IfExp(test, body, orelse) => {
                g::Expr::Conditional(self.boxed(*test), self.boxed(*body), self.boxed(*orelse))
            }
            E::Yield(tok, value, is_from) => {
                g::Expr::Yield(tok, value.map(|v| self.boxed(*v)), is_from)
            }
            E::Await(tok, e) => g::Expr::Await(tok, self.boxed(*e)),
            E::NamedExpr(target, tok, value) => {
                g::Expr::Assign(self.boxed(*target), tok, self.boxed(*value))
            }
            E::Starred(tok, e) => g::Expr::special_call(
                g::Special::Spread,
                tok,
                vec![g::Argument::Arg(self.expr(*e))],
            ),
        }
    }

    fn comprehension(
        &self,
        op: g::ContainerOperator,
        l: Tok,
        result: py::Expr,
        clauses: Vec<py::ForIf>,
        r: Tok,
    ) -> g::Expr {
        let comp = g::Comprehension {
            result: self.boxed(result),
            clauses: self.for_ifs(clauses),
        };
        g::Expr::Comprehension(op, (l, comp, r))
    }

    fn for_ifs(&self, clauses: Vec<py::ForIf>) -> Vec<g::ForOrIf> {
        clauses
            .into_iter()
            .map(|c| match c {
                py::ForIf::CompFor(t, target, tin, iter) => {
                    g::ForOrIf::CompFor(t, expr_to_pattern(self.expr(target)), tin, self.expr(iter))
                }
                py::ForIf::CompIf(t, cond) => g::ForOrIf::CompIf(t, self.expr(cond)),
            })
            .collect()
    }

    /// `k: v` is a pair tuple; `**d` is a hash splat
    fn dict_or_set_elt(&self, elt: py::DictOrSetElt) -> g::Expr {
        match elt {
            py::DictOrSetElt::KeyVal(k, v) => {
                g::Expr::Tuple(fake_bracket(vec![self.expr(k), self.expr(v)]))
            }
            py::DictOrSetElt::Key(k) => self.expr(k),
            py::DictOrSetElt::PowInline(tok, e) => g::Expr::special_call(
                g::Special::HashSplat,
                tok,
                vec![g::Argument::Arg(self.expr(e))],
            ),
        }
    }

    fn compare(
        &self,
        left: py::Expr,
        ops: Vec<Wrap<py::CmpOp>>,
        rest: Vec<py::Expr>,
    ) -> g::Expr {
        let mut ops = ops;
        let mut rest = rest;
        if ops.len() == 1 && rest.len() == 1 {
            if let (Some((op, tok)), Some(right)) = (ops.pop(), rest.pop()) {
                let operands = vec![self.expr(left), self.expr(right)];
                return self.op_call(comparison_operator(op), tok, operands);
            }
        }
        if ops.is_empty() {
            return self.expr(left);
        }
        let mut any: Vec<g::Any> = ops
            .into_iter()
            .map(|(op, tok)| {
                g::Any::E(g::Expr::IdSpecial((g::Special::Op(comparison_operator(op)), tok)))
            })
            .collect();
        any.push(g::Any::E(self.expr(left)));
        any.extend(rest.into_iter().map(|e| g::Any::E(self.expr(e))));
        g::Expr::OtherExpr(g::OtherExprOperator::CmpOps, any)
    }

    fn subscript(&self, value: py::Expr, l: Tok, slices: Vec<py::Slice>, r: Tok) -> g::Expr {
        let value = self.boxed(value);
        let mut slices = slices;
        if slices.len() == 1 {
            match slices.pop() {
                Some(py::Slice::Index(i)) => {
                    return g::Expr::ArrayAccess(value, (l, self.boxed(i), r));
                }
                Some(py::Slice::Range(start, stop, step)) => {
                    let slice = g::Slice {
                        start: start.map(|e| self.boxed(e)),
                        stop: stop.map(|e| self.boxed(e)),
                        step: step.map(|e| self.boxed(e)),
                    };
                    return g::Expr::SliceAccess(value, (l, slice, r));
                }
                None => {}
            }
        }

        let mut any = vec![g::Any::E(*value)];
        for s in slices {
            any.push(g::Any::E(match s {
                py::Slice::Index(i) => self.expr(i),
                py::Slice::Range(start, stop, step) => {
                    let mut parts = Vec::new();
                    parts.extend(start.map(|e| g::Any::E(self.expr(e))));
                    parts.push(g::Any::Tk(Tok::fake(":")));
                    parts.extend(stop.map(|e| g::Any::E(self.expr(e))));
                    if let Some(step) = step {
                        parts.push(g::Any::Tk(Tok::fake(":")));
                        parts.push(g::Any::E(self.expr(step)));
                    }
                    g::Expr::OtherExpr(g::OtherExprOperator::SliceRange, parts)
                }
            }));
        }
        g::Expr::OtherExpr(g::OtherExprOperator::Slices, any)
    }

    fn argument(&self, a: py::Argument) -> g::Argument {
        match a {
            py::Argument::Arg(e) => g::Argument::Arg(self.expr(e)),
            py::Argument::ArgKwd(name, e) => g::Argument::ArgKwd(name, self.expr(e)),
            py::Argument::ArgStar(tok, e) => g::Argument::Arg(g::Expr::special_call(
                g::Special::Spread,
                tok,
                vec![g::Argument::Arg(self.expr(e))],
            )),
            py::Argument::ArgPow(tok, e) => g::Argument::ArgOther(
                g::OtherArgumentOperator::ArgPow,
                vec![g::Any::Tk(tok), g::Any::E(self.expr(e))],
            ),
            py::Argument::ArgComp(e, clauses) => g::Argument::Arg(self.comprehension(
                g::ContainerOperator::Tuple,
                Tok::fake("("),
                e,
                clauses,
                Tok::fake(")"),
            )),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Parameters, types, decorators
    // ═══════════════════════════════════════════════════════════════════════

    fn ty(&self, t: py::Type) -> g::Type {
        expr_to_type(self.expr(t))
    }

    fn classic(&self, name: py::Name, ty: Option<py::Type>) -> g::ParameterClassic {
        let mut p = g::ParameterClassic::new(name);
        p.ptype = ty.map(|t| self.ty(t));
        p
    }

    fn parameters(&self, params: Vec<py::Parameter>) -> Vec<g::Parameter> {
        params.into_iter().map(|p| self.parameter(p)).collect()
    }

    fn parameter(&self, p: py::Parameter) -> g::Parameter {
        match p {
            py::Parameter::Classic(name, ty) => g::Parameter::Classic(self.classic(name, ty)),
            py::Parameter::Default(name, ty, default) => {
                let mut classic = self.classic(name, ty);
                classic.default = Some(self.expr(default));
                g::Parameter::Classic(classic)
            }
            py::Parameter::Pattern(pat) => g::Parameter::Pattern(param_pattern(pat)),
            py::Parameter::Star(tok, name, ty) => {
                g::Parameter::Rest(tok, self.classic(name, ty))
            }
            py::Parameter::Pow(tok, name, ty) => {
                g::Parameter::HashSplat(tok, self.classic(name, ty))
            }
            py::Parameter::Ellipsis(tok) => g::Parameter::Ellipsis(tok),
            py::Parameter::SingleStar(tok) => g::Parameter::OtherParam(
                g::OtherParameterOperator::SingleStar,
                vec![g::Any::Tk(tok)],
            ),
            py::Parameter::Slash(tok) => g::Parameter::OtherParam(
                g::OtherParameterOperator::Slash,
                vec![g::Any::Tk(tok)],
            ),
        }
    }

    /// `@a.b` and `@a.b(args)` are named attributes; anything else is opaque
    fn decorator(&self, d: py::Decorator) -> g::Attribute {
        match d.expr {
            py::Expr::Call(f, (l, args, r)) => match dotted_path(&f) {
                Some(path) => {
                    let args = args.into_iter().map(|a| self.argument(a)).collect();
                    g::Attribute::NamedAttr(d.at, path, (l, args, r))
                }
                None => g::Attribute::OtherAttribute(
                    g::OtherAttributeOperator::Decorator,
                    vec![g::Any::E(self.expr(py::Expr::Call(f, (l, args, r))))],
                ),
            },
            e => match dotted_path(&e) {
                Some(path) => g::Attribute::NamedAttr(d.at, path, fake_bracket(Vec::new())),
                None => g::Attribute::OtherAttribute(
                    g::OtherAttributeOperator::Decorator,
                    vec![g::Any::E(self.expr(e))],
                ),
            },
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════════

    fn stmts(&self, ss: Vec<py::Stmt>) -> NResult<Vec<g::Stmt>> {
        ss.into_iter().map(|s| self.stmt(s)).collect()
    }

    fn is_metavar_stmt(&self, s: &g::Stmt) -> bool {
        match s {
            g::Stmt::ExprStmt(g::Expr::Id((name, _), _), _) => self.is_metavar(name),
            _ => false,
        }
    }

    /// N statements → one Block of N, except a lone metavariable statement
    /// which stands for a whole statement sequence
    fn block_of(&self, mut ss: Vec<g::Stmt>) -> g::Stmt {
        if ss.len() == 1 && self.is_metavar_stmt(&ss[0]) {
            if let Some(s) = ss.pop() {
                return s;
            }
        }
        g::Stmt::block(ss)
    }

    fn body(&self, ss: Vec<py::Stmt>) -> NResult<g::Stmt> {
        Ok(self.block_of(self.stmts(ss)?))
    }

    fn with_or_else(
        primary: g::Stmt,
        op: g::OtherStmtOperator,
        orelse: Vec<g::Stmt>,
    ) -> g::Stmt {
        if orelse.is_empty() {
            return primary;
        }
        g::Stmt::block(vec![
            primary,
            g::Stmt::OtherStmt(op, vec![g::Any::Ss(orelse)]),
        ])
    }

    pub fn stmt(&self, s: py::Stmt) -> NResult<g::Stmt> {
        use py::Stmt as S;
        Ok(match s {
            S::ExprStmt(e) => g::Stmt::expr(self.expr(e)),

            S::Assign(targets, tok, value) => {
                let location = tok.describe();
                let mut targets = targets.into_iter().rev();
                let last = targets.next().ok_or_else(|| {
                    NormalizeError::impossible("assignment without target", location)
                })?;
                // `a = b = v` → `a = (b = v)`
                let mut assign =
                    g::Expr::Assign(self.boxed(last), tok.clone(), self.boxed(value));
                for target in targets {
                    assign = g::Expr::Assign(self.boxed(target), tok.clone(), Box::new(assign));
                }
                g::Stmt::expr(assign)
            }
            S::AugAssign(target, (op, tok), value) => g::Stmt::expr(g::Expr::AssignOp(
                self.boxed(target),
                (binary_operator(op), tok),
                self.boxed(value),
            )),
            S::AnnAssign(target, ty, value) => match target {
                py::Expr::Name(name, resolved) => {
                    let def = g::VariableDefinition {
                        init: value.map(|v| self.expr(v)),
                        vtype: Some(self.ty(ty)),
                    };
                    g::Stmt::DefStmt(Box::new(g::Definition {
                        entity: g::Entity::basic(name, Self::resolved(resolved)),
                        kind: g::DefinitionKind::VarDef(def),
                    }))
                }
                target => match value {
                    Some(v) => g::Stmt::expr(g::Expr::Assign(
                        self.boxed(target),
                        Tok::fake("="),
                        self.boxed(v),
                    )),
                    None => g::Stmt::OtherStmt(
                        g::OtherStmtOperator::AnnotatedAssign,
                        vec![g::Any::E(self.expr(target)), g::Any::T(self.ty(ty))],
                    ),
                },
            },

            S::For(tok, target, tin, iter, body, orelse) => {
                let header =
                    g::ForHeader::ForEach(expr_to_pattern(self.expr(target)), tin, self.expr(iter));
                let primary = g::Stmt::For(tok, header, Box::new(self.body(body)?));
                Self::with_or_else(primary, g::OtherStmtOperator::ForOrElse, self.stmts(orelse)?)
            }
            S::While(tok, cond, body, orelse) => {
                let primary = g::Stmt::While(tok, self.expr(cond), Box::new(self.body(body)?));
                Self::with_or_else(
                    primary,
                    g::OtherStmtOperator::WhileOrElse,
                    self.stmts(orelse)?,
                )
            }
            S::If(tok, cond, body, orelse) => {
                let orelse = match orelse {
                    Some(o) => Some(Box::new(self.body(o)?)),
                    None => None,
                };
                g::Stmt::If(tok, self.expr(cond), Box::new(self.body(body)?), orelse)
            }
            S::With(_, e, target, body) => {
                let e = match target {
                    None => self.expr(e),
                    Some(t) => g::Expr::LetPattern(
                        Box::new(expr_to_pattern(self.expr(t))),
                        self.boxed(e),
                    ),
                };
                g::Stmt::OtherStmtWithStmt(
                    g::OtherStmtWithStmtOperator::With,
                    Some(e),
                    Box::new(self.body(body)?),
                )
            }

            S::Return(tok, value) => g::Stmt::Return(tok, value.map(|v| self.expr(v)), Tok::fake("")),
            S::Delete(tok, targets) => {
                let mut any = vec![g::Any::Tk(tok)];
                any.extend(targets.into_iter().map(|t| g::Any::E(self.expr(t))));
                g::Stmt::OtherStmt(g::OtherStmtOperator::Delete, any)
            }
            S::Pass(tok) => g::Stmt::OtherStmt(g::OtherStmtOperator::Pass, vec![g::Any::Tk(tok)]),
            S::Break(tok) => g::Stmt::Break(tok, Tok::fake("")),
            S::Continue(tok) => g::Stmt::Continue(tok, Tok::fake("")),
            S::Raise(tok, None) => {
                g::Stmt::OtherStmt(g::OtherStmtOperator::ThrowNothing, vec![g::Any::Tk(tok)])
            }
            S::Raise(tok, Some((e, None))) => g::Stmt::Throw(tok, self.expr(e), Tok::fake("")),
            S::Raise(tok, Some((e, Some(cause)))) => {
                let throw = g::Stmt::Throw(tok, self.expr(e), Tok::fake(""));
                g::Stmt::OtherStmt(
                    g::OtherStmtOperator::ThrowFrom,
                    vec![g::Any::E(self.expr(cause)), g::Any::S(throw)],
                )
            }

            S::TryExcept(tok, body, handlers, orelse) => {
                let body = self.body(body)?;
                let catches = handlers
                    .into_iter()
                    .map(|h| self.handler(h))
                    .collect::<NResult<Vec<_>>>()?;
                let primary = g::Stmt::Try(tok, Box::new(body), catches, None);
                Self::with_or_else(primary, g::OtherStmtOperator::TryOrElse, self.stmts(orelse)?)
            }
            S::TryFinally(tok, body, fin_tok, fin) => {
                let mut body = self.stmts(body)?;
                let finally = (fin_tok, Box::new(self.body(fin)?));
                // try/except nested in try/finally folds into one Try
                if body.len() == 1 && matches!(body[0], g::Stmt::Try(_, _, _, None)) {
                    if let Some(g::Stmt::Try(inner_tok, inner_body, catches, _)) = body.pop() {
                        return Ok(g::Stmt::Try(inner_tok, inner_body, catches, Some(finally)));
                    }
                }
                g::Stmt::Try(tok, Box::new(self.block_of(body)), Vec::new(), Some(finally))
            }
            S::Assert(tok, test, msg) => {
                g::Stmt::Assert(tok, self.expr(test), msg.map(|m| self.expr(m)), Tok::fake(""))
            }

            S::ImportAs(tok, module, alias) => g::Stmt::DirectiveStmt(g::Directive::ImportAs(
                tok,
                Self::module_name(module),
                alias.map(|a| (a, g::IdInfo::empty())),
            )),
            S::ImportAll(tok, module, star) => {
                g::Stmt::DirectiveStmt(g::Directive::ImportAll(tok, Self::module_name(module), star))
            }
            S::ImportFrom(tok, module, names) => {
                let names = names
                    .into_iter()
                    .map(|(name, alias)| (name, alias.map(|a| (a, g::IdInfo::empty()))))
                    .collect();
                g::Stmt::DirectiveStmt(g::Directive::ImportFrom(
                    tok,
                    Self::module_name(module),
                    names,
                ))
            }
            S::Global(tok, names) => {
                let mut any = vec![g::Any::Tk(tok)];
                any.extend(names.into_iter().map(g::Any::I));
                g::Stmt::OtherStmt(g::OtherStmtOperator::Global, any)
            }
            S::NonLocal(tok, names) => {
                let mut any = vec![g::Any::Tk(tok)];
                any.extend(names.into_iter().map(g::Any::I));
                g::Stmt::OtherStmt(g::OtherStmtOperator::NonLocal, any)
            }

            S::Print(tok, dest, values) => {
                // Python 2 `print >>f, x` is `print(x, file=f)`
                let mut args = self.args(self.exprs(values));
                if let Some(dest) = dest {
                    args.push(g::Argument::ArgKwd(
                        ("file".to_string(), Tok::fake("file")),
                        self.expr(dest),
                    ));
                }
                let callee = g::Expr::id(("print".to_string(), tok));
                g::Stmt::expr(g::Expr::Call(Box::new(callee), fake_bracket(args)))
            }
            S::Exec(tok, code, globals, locals) => {
                let mut any = vec![g::Any::Tk(tok), g::Any::E(self.expr(code))];
                any.extend(globals.map(|e| g::Any::E(self.expr(e))));
                any.extend(locals.map(|e| g::Any::E(self.expr(e))));
                g::Stmt::OtherStmt(g::OtherStmtOperator::Exec, any)
            }

            S::Async(tok, inner) => match *inner {
                S::FunctionDef(def) => {
                    let async_attr = g::Attribute::KeywordAttr((g::Keyword::Async, tok));
                    self.function_def(def, Some(async_attr))?
                }
                other => g::Stmt::OtherStmtWithStmt(
                    g::OtherStmtWithStmtOperator::Async,
                    None,
                    Box::new(self.stmt(other)?),
                ),
            },
            S::FunctionDef(def) => self.function_def(def, None)?,
            S::ClassDef(def) => self.class_def(def)?,
        })
    }

    fn handler(&self, h: py::ExceptHandler) -> NResult<g::Catch> {
        let pattern = match (h.typ, h.name) {
            (None, None) => g::Pattern::PatUnderscore(Tok::fake_at(&h.except_tok)),
            (Some(typ), None) => match self.expr(typ) {
                tuple @ g::Expr::Tuple(_) => g::Pattern::PatType(g::Type::TyExpr(tuple)),
                e => g::Pattern::PatType(g::Type::TyTuple(fake_bracket(vec![g::Type::TyExpr(e)]))),
            },
            (Some(typ), Some(name)) => {
                g::Pattern::PatVar(g::Type::TyExpr(self.expr(typ)), Some((name, g::IdInfo::empty())))
            }
            (None, Some(_)) => {
                return Err(NormalizeError::impossible(
                    "except clause binds a name without a type",
                    h.except_tok.describe(),
                ))
            }
        };
        Ok((h.except_tok, pattern, self.body(h.body)?))
    }

    fn function_def(
        &self,
        def: py::FunctionDef,
        async_attr: Option<g::Attribute>,
    ) -> NResult<g::Stmt> {
        let mut attrs: Vec<g::Attribute> = async_attr.into_iter().collect();
        attrs.extend(def.decorators.into_iter().map(|d| self.decorator(d)));
        let func = g::FunctionDefinition {
            kind: (g::FunctionKind::Function, def.def_tok),
            params: self.parameters(def.params),
            return_type: def.returns.map(|t| self.ty(t)),
            body: Box::new(self.body(def.body)?),
        };
        Ok(g::Stmt::DefStmt(Box::new(g::Definition {
            entity: g::Entity {
                name: def.name,
                info: g::IdInfo::empty(),
                attrs,
            },
            kind: g::DefinitionKind::FuncDef(func),
        })))
    }

    fn class_def(&self, def: py::ClassDef) -> NResult<g::Stmt> {
        let attrs = def
            .decorators
            .into_iter()
            .map(|d| self.decorator(d))
            .collect();
        let extends = def
            .bases
            .into_iter()
            .map(|b| match b {
                py::Argument::Arg(e) => self.ty(e),
                other => g::Type::OtherType(
                    g::OtherTypeOperator::Arg,
                    vec![g::Any::Ar(self.argument(other))],
                ),
            })
            .collect();
        let body = def
            .body
            .into_iter()
            .map(|s| self.class_body_stmt(s))
            .collect::<NResult<Vec<_>>>()?;
        Ok(g::Stmt::DefStmt(Box::new(g::Definition {
            entity: g::Entity {
                name: def.name,
                info: g::IdInfo::empty(),
                attrs,
            },
            kind: g::DefinitionKind::ClassDef(g::ClassDefinition {
                kind: (g::ClassKind::Class, def.class_tok),
                extends,
                body: fake_bracket(body),
            }),
        })))
    }

    /// Class-level `x = v` and `x: T = v` are field definitions
    fn class_body_stmt(&self, s: py::Stmt) -> NResult<g::Stmt> {
        match s {
            py::Stmt::Assign(targets, tok, value) => match <[py::Expr; 1]>::try_from(targets) {
                Ok([py::Expr::Name(name, resolved)]) => Ok(field(
                    name,
                    Self::resolved(resolved),
                    g::VariableDefinition {
                        init: Some(self.expr(value)),
                        vtype: None,
                    },
                )),
                Ok([target]) => self.stmt(py::Stmt::Assign(vec![target], tok, value)),
                Err(targets) => self.stmt(py::Stmt::Assign(targets, tok, value)),
            },
            other => match self.stmt(other)? {
                g::Stmt::DefStmt(def) => match *def {
                    g::Definition {
                        entity,
                        kind: g::DefinitionKind::VarDef(var),
                    } => Ok(field(entity.name, entity.info, var)),
                    def => Ok(g::Stmt::DefStmt(Box::new(def))),
                },
                stmt => Ok(stmt),
            },
        }
    }
}

impl Normalizer for PythonNormalizer {
    fn normalize_program(&self, module: py::Module) -> Result<g::Program, NormalizeError> {
        self.stmts(module.body)
    }

    fn normalize_any(&self, any: py::Any) -> Result<g::Any, NormalizeError> {
        Ok(match any {
            py::Any::Expr(e) => g::Any::E(self.expr(e)),
            py::Any::Stmt(s) => g::Any::S(self.stmt(s)?),
            py::Any::Stmts(ss) => g::Any::Ss(self.stmts(ss)?),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn field(name: g::Ident, info: g::IdInfo, var: g::VariableDefinition) -> g::Stmt {
    g::Stmt::DefStmt(Box::new(g::Definition {
        entity: g::Entity::basic(name, info),
        kind: g::DefinitionKind::FieldDef(var),
    }))
}

/// A brace display is a dict when empty or made only of pairs, `**`
/// splats and `...` placeholders
fn is_dict_display(elts: &[py::DictOrSetElt]) -> bool {
    elts.iter().all(|e| {
        matches!(
            e,
            py::DictOrSetElt::KeyVal(..)
                | py::DictOrSetElt::PowInline(..)
                | py::DictOrSetElt::Key(py::Expr::Ellipsis(_))
        )
    })
}

/// `a.b.c` as a list of names
fn dotted_path(e: &py::Expr) -> Option<g::DottedIdent> {
    match e {
        py::Expr::Name(name, _) => Some(vec![name.clone()]),
        py::Expr::Attribute(value, _, name) => {
            let mut path = dotted_path(value)?;
            path.push(name.clone());
            Some(path)
        }
        _ => None,
    }
}

fn param_pattern(p: py::ParamPattern) -> g::Pattern {
    match p {
        py::ParamPattern::Name(name) => g::Pattern::PatId(name, g::IdInfo::empty()),
        py::ParamPattern::Tuple((l, xs, r)) => {
            g::Pattern::PatTuple((l, xs.into_iter().map(param_pattern).collect(), r))
        }
    }
}

fn first_token(e: &py::Expr) -> Option<Tok> {
    match e {
        py::Expr::Str((_, t)) | py::Expr::EncodedStr((_, t), _) => Some(t.clone()),
        py::Expr::InterpolatedString(t, _) => Some(t.clone()),
        _ => None,
    }
}

fn binary_operator(op: py::OperatorKind) -> g::Operator {
    use py::OperatorKind as O;
    match op {
        O::Add => g::Operator::Plus,
        O::Sub => g::Operator::Minus,
        O::Mult => g::Operator::Mult,
        O::MatMult => g::Operator::MatMult,
        O::Div => g::Operator::Div,
        O::FloorDiv => g::Operator::FloorDiv,
        O::Mod => g::Operator::Mod,
        O::Pow => g::Operator::Pow,
        O::LShift => g::Operator::LSL,
        O::RShift => g::Operator::LSR,
        O::BitOr => g::Operator::BitOr,
        O::BitXor => g::Operator::BitXor,
        O::BitAnd => g::Operator::BitAnd,
    }
}

fn comparison_operator(op: py::CmpOp) -> g::Operator {
    use py::CmpOp as C;
    match op {
        C::Eq => g::Operator::Eq,
        C::NotEq => g::Operator::NotEq,
        C::Lt => g::Operator::Lt,
        C::LtE => g::Operator::LtE,
        C::Gt => g::Operator::Gt,
        C::GtE => g::Operator::GtE,
        C::Is => g::Operator::Is,
        C::IsNot => g::Operator::NotIs,
        C::In => g::Operator::In,
        C::NotIn => g::Operator::NotIn,
    }
}
