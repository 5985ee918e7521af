//! Bottom-up rewriting of the generic AST
//!
//! Implementors override the `map_*` hooks they care about and call the
//! matching `walk_*` function to recurse into children. Each walk consumes
//! its input and rebuilds the node, so rewrites compose with arbitrarily
//! nested trees.

use crate::shared::models::generic_ast::*;

pub trait Mapper {
    fn map_expr(&mut self, e: Expr) -> Expr {
        walk_expr(self, e)
    }

    fn map_stmt(&mut self, s: Stmt) -> Stmt {
        walk_stmt(self, s)
    }

    fn map_pattern(&mut self, p: Pattern) -> Pattern {
        walk_pattern(self, p)
    }

    fn map_type(&mut self, t: Type) -> Type {
        walk_type(self, t)
    }
}

fn map_box<M: Mapper + ?Sized>(m: &mut M, e: Box<Expr>) -> Box<Expr> {
    Box::new(m.map_expr(*e))
}

fn map_opt<M: Mapper + ?Sized>(m: &mut M, e: Option<Box<Expr>>) -> Option<Box<Expr>> {
    e.map(|e| map_box(m, e))
}

fn map_exprs<M: Mapper + ?Sized>(m: &mut M, es: Vec<Expr>) -> Vec<Expr> {
    es.into_iter().map(|e| m.map_expr(e)).collect()
}

fn map_stmts<M: Mapper + ?Sized>(m: &mut M, ss: Vec<Stmt>) -> Vec<Stmt> {
    ss.into_iter().map(|s| m.map_stmt(s)).collect()
}

pub fn walk_expr<M: Mapper + ?Sized>(m: &mut M, e: Expr) -> Expr {
    match e {
        Expr::L(_) | Expr::Id(..) | Expr::IdSpecial(_) | Expr::Ellipsis(_) => e,
        Expr::Container(op, (l, xs, r)) => Expr::Container(op, (l, map_exprs(m, xs), r)),
        Expr::Tuple((l, xs, r)) => Expr::Tuple((l, map_exprs(m, xs), r)),
        Expr::Comprehension(op, (l, comp, r)) => {
            let result = map_box(m, comp.result);
            let clauses = comp
                .clauses
                .into_iter()
                .map(|c| match c {
                    ForOrIf::CompFor(t1, pat, t2, e) => {
                        ForOrIf::CompFor(t1, m.map_pattern(pat), t2, m.map_expr(e))
                    }
                    ForOrIf::CompIf(t, e) => ForOrIf::CompIf(t, m.map_expr(e)),
                })
                .collect();
            Expr::Comprehension(op, (l, Comprehension { result, clauses }, r))
        }
        Expr::Call(f, args) => {
            let f = map_box(m, f);
            Expr::Call(f, walk_arguments(m, args))
        }
        Expr::Assign(lhs, t, rhs) => Expr::Assign(map_box(m, lhs), t, map_box(m, rhs)),
        Expr::AssignOp(lhs, op, rhs) => Expr::AssignOp(map_box(m, lhs), op, map_box(m, rhs)),
        Expr::LetPattern(pat, e) => {
            Expr::LetPattern(Box::new(m.map_pattern(*pat)), map_box(m, e))
        }
        Expr::DotAccess(e, t, name) => Expr::DotAccess(map_box(m, e), t, name),
        Expr::ArrayAccess(e, (l, idx, r)) => {
            Expr::ArrayAccess(map_box(m, e), (l, map_box(m, idx), r))
        }
        Expr::SliceAccess(e, (l, slice, r)) => {
            let e = map_box(m, e);
            let slice = Slice {
                start: map_opt(m, slice.start),
                stop: map_opt(m, slice.stop),
                step: map_opt(m, slice.step),
            };
            Expr::SliceAccess(e, (l, slice, r))
        }
        Expr::Lambda(def) => Expr::Lambda(Box::new(walk_function_definition(m, *def))),
        Expr::Conditional(c, a, b) => {
            Expr::Conditional(map_box(m, c), map_box(m, a), map_box(m, b))
        }
        Expr::Yield(t, e, from) => Expr::Yield(t, map_opt(m, e), from),
        Expr::Await(t, e) => Expr::Await(t, map_box(m, e)),
        Expr::OtherExpr(op, anys) => Expr::OtherExpr(op, walk_anys(m, anys)),
    }
}

pub fn walk_arguments<M: Mapper + ?Sized>(m: &mut M, (l, args, r): Arguments) -> Arguments {
    let args = args.into_iter().map(|a| walk_argument(m, a)).collect();
    (l, args, r)
}

pub fn walk_argument<M: Mapper + ?Sized>(m: &mut M, a: Argument) -> Argument {
    match a {
        Argument::Arg(e) => Argument::Arg(m.map_expr(e)),
        Argument::ArgKwd(name, e) => Argument::ArgKwd(name, m.map_expr(e)),
        Argument::ArgOther(op, anys) => Argument::ArgOther(op, walk_anys(m, anys)),
    }
}

pub fn walk_stmt<M: Mapper + ?Sized>(m: &mut M, s: Stmt) -> Stmt {
    match s {
        Stmt::ExprStmt(e, t) => Stmt::ExprStmt(m.map_expr(e), t),
        Stmt::DefStmt(def) => Stmt::DefStmt(Box::new(walk_definition(m, *def))),
        Stmt::DirectiveStmt(_) | Stmt::Continue(..) | Stmt::Break(..) => s,
        Stmt::Block((l, ss, r)) => Stmt::Block((l, map_stmts(m, ss), r)),
        Stmt::If(t, c, then, els) => {
            let c = m.map_expr(c);
            let then = Box::new(m.map_stmt(*then));
            let els = els.map(|s| Box::new(m.map_stmt(*s)));
            Stmt::If(t, c, then, els)
        }
        Stmt::While(t, c, body) => {
            let c = m.map_expr(c);
            Stmt::While(t, c, Box::new(m.map_stmt(*body)))
        }
        Stmt::For(t, ForHeader::ForEach(pat, tin, e), body) => {
            let header = ForHeader::ForEach(m.map_pattern(pat), tin, m.map_expr(e));
            Stmt::For(t, header, Box::new(m.map_stmt(*body)))
        }
        Stmt::Return(t, e, sc) => Stmt::Return(t, e.map(|e| m.map_expr(e)), sc),
        Stmt::Throw(t, e, sc) => Stmt::Throw(t, m.map_expr(e), sc),
        Stmt::Try(t, body, catches, finally) => {
            let body = Box::new(m.map_stmt(*body));
            let catches = catches
                .into_iter()
                .map(|(t, pat, s)| (t, m.map_pattern(pat), m.map_stmt(s)))
                .collect();
            let finally = finally.map(|(t, s)| (t, Box::new(m.map_stmt(*s))));
            Stmt::Try(t, body, catches, finally)
        }
        Stmt::Assert(t, e, msg, sc) => {
            let e = m.map_expr(e);
            Stmt::Assert(t, e, msg.map(|e| m.map_expr(e)), sc)
        }
        Stmt::OtherStmtWithStmt(op, e, body) => {
            let e = e.map(|e| m.map_expr(e));
            Stmt::OtherStmtWithStmt(op, e, Box::new(m.map_stmt(*body)))
        }
        Stmt::OtherStmt(op, anys) => Stmt::OtherStmt(op, walk_anys(m, anys)),
    }
}

pub fn walk_definition<M: Mapper + ?Sized>(m: &mut M, def: Definition) -> Definition {
    let Definition { entity, kind } = def;
    let entity = Entity {
        attrs: entity
            .attrs
            .into_iter()
            .map(|a| walk_attribute(m, a))
            .collect(),
        ..entity
    };
    let kind = match kind {
        DefinitionKind::FuncDef(f) => DefinitionKind::FuncDef(walk_function_definition(m, f)),
        DefinitionKind::VarDef(v) => DefinitionKind::VarDef(walk_variable_definition(m, v)),
        DefinitionKind::FieldDef(v) => DefinitionKind::FieldDef(walk_variable_definition(m, v)),
        DefinitionKind::ClassDef(c) => {
            let extends = c.extends.into_iter().map(|t| m.map_type(t)).collect();
            let (l, body, r) = c.body;
            DefinitionKind::ClassDef(ClassDefinition {
                kind: c.kind,
                extends,
                body: (l, map_stmts(m, body), r),
            })
        }
    };
    Definition { entity, kind }
}

fn walk_variable_definition<M: Mapper + ?Sized>(
    m: &mut M,
    v: VariableDefinition,
) -> VariableDefinition {
    VariableDefinition {
        init: v.init.map(|e| m.map_expr(e)),
        vtype: v.vtype.map(|t| m.map_type(t)),
    }
}

pub fn walk_function_definition<M: Mapper + ?Sized>(
    m: &mut M,
    f: FunctionDefinition,
) -> FunctionDefinition {
    FunctionDefinition {
        kind: f.kind,
        params: f
            .params
            .into_iter()
            .map(|p| walk_parameter(m, p))
            .collect(),
        return_type: f.return_type.map(|t| m.map_type(t)),
        body: Box::new(m.map_stmt(*f.body)),
    }
}

fn walk_parameter_classic<M: Mapper + ?Sized>(
    m: &mut M,
    p: ParameterClassic,
) -> ParameterClassic {
    ParameterClassic {
        ptype: p.ptype.map(|t| m.map_type(t)),
        default: p.default.map(|e| m.map_expr(e)),
        ..p
    }
}

pub fn walk_parameter<M: Mapper + ?Sized>(m: &mut M, p: Parameter) -> Parameter {
    match p {
        Parameter::Classic(c) => Parameter::Classic(walk_parameter_classic(m, c)),
        Parameter::Pattern(pat) => Parameter::Pattern(m.map_pattern(pat)),
        Parameter::Rest(t, c) => Parameter::Rest(t, walk_parameter_classic(m, c)),
        Parameter::HashSplat(t, c) => Parameter::HashSplat(t, walk_parameter_classic(m, c)),
        Parameter::Ellipsis(_) => p,
        Parameter::OtherParam(op, anys) => Parameter::OtherParam(op, walk_anys(m, anys)),
    }
}

fn walk_attribute<M: Mapper + ?Sized>(m: &mut M, a: Attribute) -> Attribute {
    match a {
        Attribute::KeywordAttr(_) => a,
        Attribute::NamedAttr(t, name, args) => {
            Attribute::NamedAttr(t, name, walk_arguments(m, args))
        }
        Attribute::OtherAttribute(op, anys) => Attribute::OtherAttribute(op, walk_anys(m, anys)),
    }
}

pub fn walk_pattern<M: Mapper + ?Sized>(m: &mut M, p: Pattern) -> Pattern {
    match p {
        Pattern::PatId(..)
        | Pattern::PatLiteral(_)
        | Pattern::PatUnderscore(_)
        | Pattern::PatEllipsis(_) => p,
        Pattern::PatTuple((l, ps, r)) => {
            Pattern::PatTuple((l, ps.into_iter().map(|p| m.map_pattern(p)).collect(), r))
        }
        Pattern::PatList((l, ps, r)) => {
            Pattern::PatList((l, ps.into_iter().map(|p| m.map_pattern(p)).collect(), r))
        }
        Pattern::PatType(t) => Pattern::PatType(m.map_type(t)),
        Pattern::PatVar(t, name) => Pattern::PatVar(m.map_type(t), name),
        Pattern::OtherPat(op, anys) => Pattern::OtherPat(op, walk_anys(m, anys)),
    }
}

pub fn walk_type<M: Mapper + ?Sized>(m: &mut M, t: Type) -> Type {
    match t {
        Type::TyExpr(e) => Type::TyExpr(m.map_expr(e)),
        Type::TyTuple((l, ts, r)) => {
            Type::TyTuple((l, ts.into_iter().map(|t| m.map_type(t)).collect(), r))
        }
        Type::OtherType(op, anys) => Type::OtherType(op, walk_anys(m, anys)),
    }
}

pub fn walk_any<M: Mapper + ?Sized>(m: &mut M, a: Any) -> Any {
    match a {
        Any::E(e) => Any::E(m.map_expr(e)),
        Any::S(s) => Any::S(m.map_stmt(s)),
        Any::Ss(ss) => Any::Ss(map_stmts(m, ss)),
        Any::T(t) => Any::T(m.map_type(t)),
        Any::P(p) => Any::P(m.map_pattern(p)),
        Any::Ar(a) => Any::Ar(walk_argument(m, a)),
        Any::Pa(p) => Any::Pa(walk_parameter(m, p)),
        Any::I(_) | Any::Tk(_) | Any::Modn(_) => a,
    }
}

fn walk_anys<M: Mapper + ?Sized>(m: &mut M, anys: Vec<Any>) -> Vec<Any> {
    anys.into_iter().map(|a| walk_any(m, a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::token::{fake_bracket, Tok};

    struct Rename;

    impl Mapper for Rename {
        fn map_expr(&mut self, e: Expr) -> Expr {
            match e {
                Expr::Id((name, tok), info) if name == "a" => Expr::Id(("b".into(), tok), info),
                other => walk_expr(self, other),
            }
        }
    }

    fn id(s: &str) -> Expr {
        Expr::id((s.to_string(), Tok::fake(s)))
    }

    #[test]
    fn test_rewrites_nested_expressions() {
        let e = Expr::Conditional(
            Box::new(id("a")),
            Box::new(Expr::Tuple(fake_bracket(vec![id("a"), id("c")]))),
            Box::new(Expr::call_positional(id("f"), vec![id("a")])),
        );
        let expected = Expr::Conditional(
            Box::new(id("b")),
            Box::new(Expr::Tuple(fake_bracket(vec![id("b"), id("c")]))),
            Box::new(Expr::call_positional(id("f"), vec![id("b")])),
        );
        assert_eq!(Rename.map_expr(e), expected);
    }

    #[test]
    fn test_rewrites_through_statements() {
        let s = Stmt::If(
            Tok::fake("if"),
            id("a"),
            Box::new(Stmt::block(vec![Stmt::expr(id("a"))])),
            None,
        );
        match Rename.map_stmt(s) {
            Stmt::If(_, cond, then, None) => {
                assert_eq!(cond, id("b"));
                assert_eq!(*then, Stmt::block(vec![Stmt::expr(id("b"))]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
