//! Python scope resolution
//!
//! Annotates every `Expr::Name` with the binding it refers to, following
//! Python's LEGB rules closely enough for matching purposes:
//! - function scopes: parameters, then names bound anywhere in the body
//!   (unless declared `global`/`nonlocal`)
//! - class scopes are only visible from the class body itself
//! - comprehensions get their own scope for their loop targets
//! - module bindings are globals; imports resolve to the imported path

use std::collections::{HashMap, HashSet};

use crate::features::parsing::domain::python_ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Module,
    Function,
    Class,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    names: HashMap<String, ResolvedName>,
    globals: HashSet<String>,
    nonlocals: HashSet<String>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            names: HashMap::new(),
            globals: HashSet::new(),
            nonlocals: HashSet::new(),
        }
    }

    fn default_binding(&self) -> ResolvedName {
        match self.kind {
            ScopeKind::Module => ResolvedName::GlobalVar,
            ScopeKind::Function => ResolvedName::LocalVar,
            ScopeKind::Class => ResolvedName::ClassField,
        }
    }

    fn bind(&mut self, name: &str, resolved: ResolvedName) {
        if self.kind != ScopeKind::Module
            && (self.globals.contains(name) || self.nonlocals.contains(name))
        {
            return;
        }
        self.names.insert(name.to_string(), resolved);
    }

    fn bind_target(&mut self, target: &Expr) {
        match target {
            Expr::Name((name, _), _) => {
                let resolved = self.default_binding();
                self.bind(name, resolved);
            }
            Expr::Tuple(ListOrComprehension::CompList((_, elts, _)))
            | Expr::List(ListOrComprehension::CompList((_, elts, _))) => {
                for elt in elts {
                    self.bind_target(elt);
                }
            }
            Expr::Starred(_, inner) => self.bind_target(inner),
            _ => {}
        }
    }

    /// Record every binding made by `body`, without entering nested
    /// function or class bodies
    fn collect(&mut self, body: &[Stmt]) {
        // Declarations first: they apply to the whole block
        for stmt in body {
            match stmt {
                Stmt::Global(_, names) => {
                    self.globals.extend(names.iter().map(|(n, _)| n.clone()))
                }
                Stmt::NonLocal(_, names) => {
                    self.nonlocals.extend(names.iter().map(|(n, _)| n.clone()))
                }
                _ => {}
            }
        }
        for stmt in body {
            self.collect_stmt(stmt);
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(targets, _, _) => {
                for t in targets {
                    self.bind_target(t);
                }
            }
            Stmt::AugAssign(target, _, _) | Stmt::AnnAssign(target, _, _) => {
                self.bind_target(target)
            }
            Stmt::Delete(_, targets) => {
                for t in targets {
                    self.bind_target(t);
                }
            }
            Stmt::For(_, target, _, _, body, orelse) => {
                self.bind_target(target);
                self.collect_block(body);
                self.collect_block(orelse);
            }
            Stmt::While(_, _, body, orelse) => {
                self.collect_block(body);
                self.collect_block(orelse);
            }
            Stmt::If(_, _, body, orelse) => {
                self.collect_block(body);
                if let Some(orelse) = orelse {
                    self.collect_block(orelse);
                }
            }
            Stmt::With(_, _, target, body) => {
                if let Some(t) = target {
                    self.bind_target(t);
                }
                self.collect_block(body);
            }
            Stmt::TryExcept(_, body, handlers, orelse) => {
                self.collect_block(body);
                for h in handlers {
                    if let Some((name, _)) = &h.name {
                        let resolved = self.default_binding();
                        self.bind(name, resolved);
                    }
                    self.collect_block(&h.body);
                }
                self.collect_block(orelse);
            }
            Stmt::TryFinally(_, body, _, fin) => {
                self.collect_block(body);
                self.collect_block(fin);
            }
            Stmt::ImportAs(_, module, alias) => {
                let Some(first) = module.dotted.first() else {
                    return;
                };
                match alias {
                    Some((alias, _)) => {
                        self.bind(alias, ResolvedName::ImportedModule(module.dotted.clone()))
                    }
                    None => self.bind(
                        &first.0,
                        ResolvedName::ImportedModule(vec![first.clone()]),
                    ),
                }
            }
            Stmt::ImportFrom(_, module, names) => {
                for (name, alias) in names {
                    let mut path = module.dotted.clone();
                    path.push(name.clone());
                    let bound = alias.as_ref().unwrap_or(name);
                    self.bind(&bound.0, ResolvedName::ImportedEntity(path));
                }
            }
            Stmt::FunctionDef(def) => {
                let resolved = self.default_binding();
                self.bind(&def.name.0, resolved);
            }
            Stmt::ClassDef(def) => {
                let resolved = self.default_binding();
                self.bind(&def.name.0, resolved);
            }
            Stmt::Async(_, inner) => self.collect_stmt(inner),
            Stmt::ExprStmt(_)
            | Stmt::Return(..)
            | Stmt::Pass(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Raise(..)
            | Stmt::Assert(..)
            | Stmt::ImportAll(..)
            | Stmt::Global(..)
            | Stmt::NonLocal(..)
            | Stmt::Print(..)
            | Stmt::Exec(..) => {}
        }
    }

    fn collect_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.collect_stmt(stmt);
        }
    }
}

/// Annotate every name of `module` with its resolution
pub fn resolve_module(module: &mut Module) {
    let mut top = Scope::new(ScopeKind::Module);
    top.collect(&module.body);
    let mut resolver = Resolver { scopes: vec![top] };
    resolver.stmts(&mut module.body);
    tracing::trace!(file = %module.file, "resolved names");
}

struct Resolver {
    scopes: Vec<Scope>,
}

impl Resolver {
    fn lookup(&self, name: &str) -> ResolvedName {
        let innermost = self.scopes.len().saturating_sub(1);
        for (depth, scope) in self.scopes.iter().enumerate().rev() {
            // Enclosing class bodies are not visible from nested functions
            if scope.kind == ScopeKind::Class && depth != innermost {
                continue;
            }
            if scope.kind != ScopeKind::Module && scope.globals.contains(name) {
                return self
                    .scopes
                    .first()
                    .and_then(|m| m.names.get(name).cloned())
                    .unwrap_or(ResolvedName::GlobalVar);
            }
            if scope.nonlocals.contains(name) {
                continue;
            }
            if let Some(resolved) = scope.names.get(name) {
                return resolved.clone();
            }
        }
        ResolvedName::NotResolved
    }

    fn with_scope(&mut self, scope: Scope, f: impl FnOnce(&mut Self)) {
        self.scopes.push(scope);
        f(self);
        self.scopes.pop();
    }

    fn stmts(&mut self, body: &mut [Stmt]) {
        for stmt in body {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::ExprStmt(e) => self.expr(e),
            Stmt::Assign(targets, _, value) => {
                self.expr(value);
                for t in targets {
                    self.expr(t);
                }
            }
            Stmt::AugAssign(target, _, value) => {
                self.expr(target);
                self.expr(value);
            }
            Stmt::AnnAssign(target, ty, value) => {
                self.expr(target);
                self.expr(ty);
                if let Some(v) = value {
                    self.expr(v);
                }
            }
            Stmt::For(_, target, _, iter, body, orelse) => {
                self.expr(target);
                self.expr(iter);
                self.stmts(body);
                self.stmts(orelse);
            }
            Stmt::While(_, cond, body, orelse) => {
                self.expr(cond);
                self.stmts(body);
                self.stmts(orelse);
            }
            Stmt::If(_, cond, body, orelse) => {
                self.expr(cond);
                self.stmts(body);
                if let Some(orelse) = orelse {
                    self.stmts(orelse);
                }
            }
            Stmt::With(_, e, target, body) => {
                self.expr(e);
                if let Some(t) = target {
                    self.expr(t);
                }
                self.stmts(body);
            }
            Stmt::Return(_, value) => {
                if let Some(v) = value {
                    self.expr(v);
                }
            }
            Stmt::Delete(_, targets) => {
                for t in targets {
                    self.expr(t);
                }
            }
            Stmt::Raise(_, exc) => {
                if let Some((e, cause)) = exc {
                    self.expr(e);
                    if let Some(c) = cause {
                        self.expr(c);
                    }
                }
            }
            Stmt::TryExcept(_, body, handlers, orelse) => {
                self.stmts(body);
                for h in handlers {
                    if let Some(t) = &mut h.typ {
                        self.expr(t);
                    }
                    self.stmts(&mut h.body);
                }
                self.stmts(orelse);
            }
            Stmt::TryFinally(_, body, _, fin) => {
                self.stmts(body);
                self.stmts(fin);
            }
            Stmt::Assert(_, test, msg) => {
                self.expr(test);
                if let Some(m) = msg {
                    self.expr(m);
                }
            }
            Stmt::Print(_, dest, values) => {
                if let Some(d) = dest {
                    self.expr(d);
                }
                for v in values {
                    self.expr(v);
                }
            }
            Stmt::Exec(_, code, globals, locals) => {
                self.expr(code);
                for e in [globals, locals].into_iter().flatten() {
                    self.expr(e);
                }
            }
            Stmt::Async(_, inner) => self.stmt(inner),
            Stmt::FunctionDef(def) => self.function_def(def),
            Stmt::ClassDef(def) => self.class_def(def),
            Stmt::Pass(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::ImportAs(..)
            | Stmt::ImportAll(..)
            | Stmt::ImportFrom(..)
            | Stmt::Global(..)
            | Stmt::NonLocal(..) => {}
        }
    }

    /// Defaults and annotations, evaluated in the enclosing scope
    fn param_exprs(&mut self, params: &mut [Parameter]) {
        for p in params {
            match p {
                Parameter::Classic(_, ty) | Parameter::Star(_, _, ty) | Parameter::Pow(_, _, ty) => {
                    if let Some(t) = ty {
                        self.expr(t);
                    }
                }
                Parameter::Default(_, ty, default) => {
                    if let Some(t) = ty {
                        self.expr(t);
                    }
                    self.expr(default);
                }
                Parameter::Pattern(_)
                | Parameter::Ellipsis(_)
                | Parameter::SingleStar(_)
                | Parameter::Slash(_) => {}
            }
        }
    }

    fn param_scope(params: &[Parameter]) -> Scope {
        fn bind_pattern(scope: &mut Scope, pat: &ParamPattern) {
            match pat {
                ParamPattern::Name((n, _)) => {
                    scope.names.insert(n.clone(), ResolvedName::Parameter);
                }
                ParamPattern::Tuple((_, elts, _)) => {
                    for e in elts {
                        bind_pattern(scope, e);
                    }
                }
            }
        }

        let mut scope = Scope::new(ScopeKind::Function);
        for p in params {
            match p {
                Parameter::Classic((n, _), _)
                | Parameter::Default((n, _), _, _)
                | Parameter::Star(_, (n, _), _)
                | Parameter::Pow(_, (n, _), _) => {
                    scope.names.insert(n.clone(), ResolvedName::Parameter);
                }
                Parameter::Pattern(pat) => bind_pattern(&mut scope, pat),
                Parameter::Ellipsis(_) | Parameter::SingleStar(_) | Parameter::Slash(_) => {}
            }
        }
        scope
    }

    fn function_def(&mut self, def: &mut FunctionDef) {
        for d in &mut def.decorators {
            self.expr(&mut d.expr);
        }
        self.param_exprs(&mut def.params);
        if let Some(r) = &mut def.returns {
            self.expr(r);
        }

        let mut scope = Self::param_scope(&def.params);
        // Locals shadow nothing that is a parameter
        let params: Vec<(String, ResolvedName)> = scope.names.drain().collect();
        scope.collect(&def.body);
        scope.names.extend(params);
        self.with_scope(scope, |r| r.stmts(&mut def.body));
    }

    fn class_def(&mut self, def: &mut ClassDef) {
        for d in &mut def.decorators {
            self.expr(&mut d.expr);
        }
        for base in &mut def.bases {
            self.argument(base);
        }
        let mut scope = Scope::new(ScopeKind::Class);
        scope.collect(&def.body);
        self.with_scope(scope, |r| r.stmts(&mut def.body));
    }

    fn argument(&mut self, arg: &mut Argument) {
        match arg {
            Argument::Arg(e)
            | Argument::ArgKwd(_, e)
            | Argument::ArgStar(_, e)
            | Argument::ArgPow(_, e) => self.expr(e),
            Argument::ArgComp(elt, clauses) => self.comprehension(clauses, |r| r.expr(elt)),
        }
    }

    /// The first iterable is evaluated outside the comprehension scope;
    /// everything else inside it
    fn comprehension(&mut self, clauses: &mut [ForIf], body: impl FnOnce(&mut Self)) {
        let mut scope = Scope::new(ScopeKind::Function);
        for clause in clauses.iter() {
            if let ForIf::CompFor(_, target, _, _) = clause {
                scope.bind_target(target);
            }
        }

        let mut clauses = clauses.iter_mut();
        let mut first = clauses.next();
        if let Some(ForIf::CompFor(_, _, _, iter)) = &mut first {
            self.expr(iter);
        }
        self.scopes.push(scope);
        match first {
            Some(ForIf::CompFor(_, target, _, _)) => self.expr(target),
            Some(ForIf::CompIf(_, cond)) => self.expr(cond),
            None => {}
        }
        for clause in clauses {
            match clause {
                ForIf::CompFor(_, target, _, iter) => {
                    self.expr(iter);
                    self.expr(target);
                }
                ForIf::CompIf(_, cond) => self.expr(cond),
            }
        }
        body(self);
        self.scopes.pop();
    }

    fn dict_elt(&mut self, elt: &mut DictOrSetElt) {
        match elt {
            DictOrSetElt::KeyVal(k, v) => {
                self.expr(k);
                self.expr(v);
            }
            DictOrSetElt::Key(k) | DictOrSetElt::PowInline(_, k) => self.expr(k),
        }
    }

    fn expr(&mut self, e: &mut Expr) {
        match e {
            Expr::Name((name, _), resolved) => *resolved = Some(self.lookup(name)),
            Expr::Num(_)
            | Expr::Str(_)
            | Expr::EncodedStr(..)
            | Expr::Bool(_)
            | Expr::None_(_)
            | Expr::Ellipsis(_) => {}
            Expr::InterpolatedString(_, parts) | Expr::ConcatenatedString(parts) => {
                for p in parts {
                    self.expr(p);
                }
            }
            Expr::FormattedValue(value, _, spec) => {
                self.expr(value);
                if let Some(s) = spec {
                    self.expr(s);
                }
            }
            Expr::Tuple(c) | Expr::List(c) => match c {
                ListOrComprehension::CompList((_, elts, _)) => {
                    for x in elts {
                        self.expr(x);
                    }
                }
                ListOrComprehension::CompForIf((_, comp, _)) => {
                    let (elt, clauses) = &mut **comp;
                    self.comprehension(clauses, |r| r.expr(elt))
                }
            },
            Expr::DictOrSet(c) => match c {
                ListOrComprehension::CompList((_, elts, _)) => {
                    for x in elts {
                        self.dict_elt(x);
                    }
                }
                ListOrComprehension::CompForIf((_, comp, _)) => {
                    let (elt, clauses) = &mut **comp;
                    self.comprehension(clauses, |r| r.dict_elt(elt))
                }
            },
            Expr::BoolOp(_, operands) => {
                for x in operands {
                    self.expr(x);
                }
            }
            Expr::BinOp(l, _, r) => {
                self.expr(l);
                self.expr(r);
            }
            Expr::UnaryOp(_, x) | Expr::Await(_, x) | Expr::Starred(_, x) => self.expr(x),
            Expr::Compare(l, _, rest) => {
                self.expr(l);
                for x in rest {
                    self.expr(x);
                }
            }
            Expr::Call(f, (_, args, _)) => {
                self.expr(f);
                for a in args {
                    self.argument(a);
                }
            }
            Expr::Subscript(value, (_, slices, _)) => {
                self.expr(value);
                for s in slices {
                    match s {
                        Slice::Index(i) => self.expr(i),
                        Slice::Range(a, b, c) => {
                            for x in [a, b, c].into_iter().flatten() {
                                self.expr(x);
                            }
                        }
                    }
                }
            }
            Expr::Attribute(value, _, _) => self.expr(value),
            Expr::Lambda(_, params, body) => {
                self.param_exprs(params);
                let scope = Self::param_scope(params);
                self.with_scope(scope, |r| r.expr(body));
            }
            Expr::IfExp(test, body, orelse) => {
                self.expr(test);
                self.expr(body);
                self.expr(orelse);
            }
            Expr::Yield(_, value, _) => {
                if let Some(v) = value {
                    self.expr(v);
                }
            }
            Expr::NamedExpr(target, _, value) => {
                self.expr(value);
                self.expr(target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::infrastructure::PythonParser;
    use crate::features::parsing::ports::Parser;

    fn resolved(src: &str) -> Module {
        let mut module = PythonParser::new().parse(src, "t.py").unwrap();
        resolve_module(&mut module);
        module
    }

    /// Resolutions of every occurrence of `name`, in source order
    fn resolutions_of(module: &Module, name: &str) -> Vec<Option<ResolvedName>> {
        fn walk(e: &Expr, name: &str, out: &mut Vec<Option<ResolvedName>>) {
            match e {
                Expr::Name((n, _), r) if n == name => out.push(r.clone()),
                Expr::Call(f, (_, args, _)) => {
                    walk(f, name, out);
                    for a in args {
                        if let Argument::Arg(x) = a {
                            walk(x, name, out);
                        }
                    }
                }
                Expr::Attribute(v, _, _) => walk(v, name, out),
                Expr::BinOp(l, _, r) => {
                    walk(l, name, out);
                    walk(r, name, out);
                }
                Expr::List(ListOrComprehension::CompForIf((_, comp, _))) => {
                    let (elt, clauses) = &**comp;
                    for c in clauses {
                        if let ForIf::CompFor(_, t, _, it) = c {
                            walk(it, name, out);
                            walk(t, name, out);
                        }
                    }
                    walk(elt, name, out);
                }
                _ => {}
            }
        }
        fn walk_stmts(stmts: &[Stmt], name: &str, out: &mut Vec<Option<ResolvedName>>) {
            for s in stmts {
                match s {
                    Stmt::ExprStmt(e) | Stmt::Return(_, Some(e)) => walk(e, name, out),
                    Stmt::Assign(ts, _, v) => {
                        walk(v, name, out);
                        for t in ts {
                            walk(t, name, out);
                        }
                    }
                    Stmt::FunctionDef(f) => walk_stmts(&f.body, name, out),
                    Stmt::ClassDef(c) => walk_stmts(&c.body, name, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk_stmts(&module.body, name, &mut out);
        out
    }

    #[test]
    fn test_params_locals_and_globals() {
        let m = resolved("g = 1\ndef f(p):\n    l = p\n    return g + l\n");
        assert_eq!(
            resolutions_of(&m, "p"),
            vec![Some(ResolvedName::Parameter)]
        );
        assert_eq!(
            resolutions_of(&m, "l"),
            vec![Some(ResolvedName::LocalVar), Some(ResolvedName::LocalVar)]
        );
        assert_eq!(
            resolutions_of(&m, "g"),
            vec![Some(ResolvedName::GlobalVar), Some(ResolvedName::GlobalVar)]
        );
    }

    #[test]
    fn test_global_declaration_overrides_local_binding() {
        let m = resolved("def f():\n    global x\n    x = 1\n");
        assert_eq!(
            resolutions_of(&m, "x"),
            vec![Some(ResolvedName::GlobalVar)]
        );
    }

    #[test]
    fn test_imports() {
        let m = resolved("import os.path\nfrom a.b import c as d\nos.getcwd()\nd()\n");
        match resolutions_of(&m, "os").pop() {
            Some(Some(ResolvedName::ImportedModule(path))) => assert_eq!(path.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        match resolutions_of(&m, "d").pop() {
            Some(Some(ResolvedName::ImportedEntity(path))) => {
                let names: Vec<&str> = path.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_class_fields_invisible_in_methods() {
        let m = resolved("class C:\n    x = 1\n    def m(self):\n        return x\n");
        assert_eq!(
            resolutions_of(&m, "x"),
            vec![
                Some(ResolvedName::ClassField),
                Some(ResolvedName::NotResolved)
            ]
        );
    }

    #[test]
    fn test_comprehension_targets_are_local() {
        let m = resolved("ys = [y for y in ys]\n");
        assert_eq!(
            resolutions_of(&m, "y"),
            vec![Some(ResolvedName::LocalVar), Some(ResolvedName::LocalVar)]
        );
    }
}
