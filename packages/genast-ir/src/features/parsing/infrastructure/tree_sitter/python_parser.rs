//! tree-sitter-python → Python syntax tree
//!
//! Recursive descent over the concrete tree produced by
//! `tree-sitter-python`. Every node kind reachable from a valid parse has
//! a mapping; trees containing ERROR/MISSING nodes are rejected up front.

use std::sync::Arc;

use tree_sitter::{Node, Parser as TSParser};

use crate::errors::ParseError;
use crate::features::parsing::domain::python_ast::*;
use crate::features::parsing::ports::Parser;
use crate::shared::models::{Location, Tok, Wrap};

type PResult<T> = Result<T, ParseError>;

/// Python front end backed by tree-sitter
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(source: &str, file: &str) -> PResult<tree_sitter::Tree> {
        let mut parser = TSParser::new();
        parser
            .set_language(&tree_sitter_python::language())
            .map_err(|e| ParseError::Init(format!("Failed to set Python language: {}", e)))?;
        parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            file: file.to_string(),
        })
    }

    /// `parsed_text` is what tree-sitter sees; tokens are read from
    /// `source`, which must have the same byte layout
    fn convert(source: &str, parsed_text: &str, file: &str) -> PResult<Vec<Stmt>> {
        let tree = Self::parse_tree(parsed_text, file)?;
        let root = tree.root_node();
        let cx = Converter {
            src: source,
            file: Arc::from(file),
        };
        if root.has_error() {
            return Err(cx.syntax_error(root));
        }
        cx.stmts(root)
    }

    /// Parse a pattern snippet.
    ///
    /// Metavariables (`$X`, `$obj`) are not Python; each `$` that starts
    /// an identifier is parsed as `_`. Identifiers are read back from the original text, so
    /// they keep their `$`.
    pub fn parse_pattern(&self, source: &str) -> PResult<Any> {
        let mut parsed = String::with_capacity(source.len());
        let mut prev: Option<char> = None;
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            let starts_metavar = c == '$'
                && !prev.map_or(false, |p| p.is_alphanumeric() || p == '_')
                && chars
                    .peek()
                    .map_or(false, |n| n.is_ascii_alphabetic() || *n == '_');
            if starts_metavar {
                parsed.push('_');
            } else {
                parsed.push(c);
            }
            prev = Some(c);
        }

        let mut stmts = Self::convert(source, &parsed, "<pattern>")?;
        Ok(match stmts.len() {
            1 => match stmts.pop() {
                Some(Stmt::ExprStmt(e)) => Any::Expr(e),
                Some(s) => Any::Stmt(s),
                None => Any::Stmts(Vec::new()),
            },
            _ => Any::Stmts(stmts),
        })
    }
}

impl Parser for PythonParser {
    fn parse(&self, source: &str, file_path: &str) -> PResult<Module> {
        let body = Self::convert(source, source, file_path)?;
        Ok(Module {
            file: file_path.to_string(),
            body,
        })
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.trim_start_matches('.'), "py" | "pyi")
    }

    fn language_name(&self) -> &'static str {
        "python"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Converter
// ═══════════════════════════════════════════════════════════════════════════

struct Converter<'s> {
    /// Text the tokens are read from
    src: &'s str,
    file: Arc<str>,
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}

fn all_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).filter(|c| !c.is_extra()).collect()
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .filter(|c| c.is_named() && !c.is_extra())
        .collect()
}

fn starts_with_async(node: Node<'_>) -> bool {
    node.child(0).map_or(false, |c| c.kind() == "async")
}

impl<'s> Converter<'s> {
    // ───────────────────────────────────────────────────────────────────────
    // Tokens
    // ───────────────────────────────────────────────────────────────────────

    fn text(&self, node: Node<'_>) -> &'s str {
        self.src.get(node.byte_range()).unwrap_or("")
    }

    fn loc(&self, node: Node<'_>) -> Location {
        let p = node.start_position();
        Location::new(
            self.file.clone(),
            p.row as u32 + 1,
            p.column as u32,
            node.start_byte(),
        )
    }

    fn tok(&self, node: Node<'_>) -> Tok {
        Tok::origin(self.text(node), self.loc(node))
    }

    /// Token of the first anonymous child of `kind`, or a token with that
    /// text at the start of `node`
    fn kw(&self, node: Node<'_>, kind: &str) -> Tok {
        all_children(node)
            .into_iter()
            .find(|c| !c.is_named() && c.kind() == kind)
            .map(|c| self.tok(c))
            .unwrap_or_else(|| Tok::origin(kind, self.loc(node)))
    }

    fn location_string(&self, node: Node<'_>) -> String {
        self.loc(node).to_string()
    }

    fn unsupported(&self, node: Node<'_>) -> ParseError {
        ParseError::Unsupported {
            kind: node.kind().to_string(),
            location: self.location_string(node),
        }
    }

    fn syntax_error(&self, root: Node<'_>) -> ParseError {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                let snippet: String = self.text(node).chars().take(40).collect();
                return ParseError::Syntax {
                    location: self.location_string(node),
                    snippet,
                };
            }
            let mut children = all_children(node);
            children.reverse();
            stack.extend(children);
        }
        ParseError::Syntax {
            location: self.location_string(root),
            snippet: String::new(),
        }
    }

    fn required<'t>(&self, node: Node<'t>, field: &str) -> PResult<Node<'t>> {
        node.child_by_field_name(field)
            .ok_or_else(|| self.unsupported(node))
    }

    fn name(&self, node: Node<'_>) -> PResult<Name> {
        match node.kind() {
            "identifier" | "keyword_identifier" => {
                let text = self.text(node);
                Ok((text.to_string(), Tok::origin(text, self.loc(node))))
            }
            _ => Err(self.unsupported(node)),
        }
    }

    fn dotted_name(&self, node: Node<'_>) -> PResult<DottedName> {
        match node.kind() {
            "dotted_name" => named_children(node)
                .into_iter()
                .map(|c| self.name(c))
                .collect(),
            _ => Ok(vec![self.name(node)?]),
        }
    }

    // ───────────────────────────────────────────────────────────────────────
    // Statements
    // ───────────────────────────────────────────────────────────────────────

    /// Statements of a `module` or `block`
    fn stmts(&self, node: Node<'_>) -> PResult<Vec<Stmt>> {
        let mut out = Vec::new();
        for child in named_children(node) {
            self.push_stmt(child, &mut out)?;
        }
        Ok(out)
    }

    fn body(&self, node: Node<'_>, field: &str) -> PResult<Vec<Stmt>> {
        match node.child_by_field_name(field) {
            Some(block) => self.stmts(block),
            None => Ok(Vec::new()),
        }
    }

    fn push_stmt(&self, node: Node<'_>, out: &mut Vec<Stmt>) -> PResult<()> {
        match node.kind() {
            "import_statement" => {
                let import = self.kw(node, "import");
                for item in field_children(node, "name") {
                    let (module, alias) = self.import_item(item)?;
                    out.push(Stmt::ImportAs(
                        import.clone(),
                        ModuleName {
                            dotted: module,
                            dots: None,
                        },
                        alias,
                    ));
                }
            }
            _ => out.push(self.stmt(node)?),
        }
        Ok(())
    }

    fn stmt(&self, node: Node<'_>) -> PResult<Stmt> {
        match node.kind() {
            "expression_statement" => self.expression_statement(node),
            "pass_statement" => Ok(Stmt::Pass(self.tok(node))),
            "break_statement" => Ok(Stmt::Break(self.tok(node))),
            "continue_statement" => Ok(Stmt::Continue(self.tok(node))),
            "return_statement" => {
                let value = match named_children(node).first() {
                    Some(e) => Some(self.expr(*e)?),
                    None => None,
                };
                Ok(Stmt::Return(self.kw(node, "return"), value))
            }
            "delete_statement" => {
                let targets = match named_children(node).first() {
                    Some(e) if e.kind() == "expression_list" => self.exprs(named_children(*e))?,
                    Some(e) => vec![self.expr(*e)?],
                    None => Vec::new(),
                };
                Ok(Stmt::Delete(self.kw(node, "del"), targets))
            }
            "raise_statement" => self.raise(node),
            "global_statement" | "nonlocal_statement" => {
                let names = named_children(node)
                    .into_iter()
                    .map(|c| self.name(c))
                    .collect::<PResult<Vec<_>>>()?;
                Ok(if node.kind() == "global_statement" {
                    Stmt::Global(self.kw(node, "global"), names)
                } else {
                    Stmt::NonLocal(self.kw(node, "nonlocal"), names)
                })
            }
            "assert_statement" => {
                let mut parts = self.exprs(named_children(node))?.into_iter();
                let test = parts.next().ok_or_else(|| self.unsupported(node))?;
                Ok(Stmt::Assert(self.kw(node, "assert"), test, parts.next()))
            }
            "import_from_statement" => self.import_from(node),
            "future_import_statement" => {
                let from = self.kw(node, "from");
                let module = ModuleName {
                    dotted: vec![("__future__".to_string(), self.kw(node, "__future__"))],
                    dots: None,
                };
                let names = field_children(node, "name")
                    .into_iter()
                    .map(|c| self.alias(c))
                    .collect::<PResult<Vec<_>>>()?;
                Ok(Stmt::ImportFrom(from, module, names))
            }
            "print_statement" => {
                let dest = match named_children(node).into_iter().find(|c| c.kind() == "chevron") {
                    Some(chevron) => match named_children(chevron).first() {
                        Some(e) => Some(self.expr(*e)?),
                        None => None,
                    },
                    None => None,
                };
                let values = self.exprs(field_children(node, "argument"))?;
                Ok(Stmt::Print(self.kw(node, "print"), dest, values))
            }
            "exec_statement" => {
                let code = self.required(node, "code")?;
                let rest: Vec<Node<'_>> = named_children(node)
                    .into_iter()
                    .filter(|c| c.id() != code.id())
                    .collect();
                let mut rest = self.exprs(rest)?.into_iter();
                Ok(Stmt::Exec(
                    self.kw(node, "exec"),
                    self.expr(code)?,
                    rest.next(),
                    rest.next(),
                ))
            }
            "if_statement" => self.if_statement(node),
            "for_statement" => self.for_statement(node),
            "while_statement" => {
                let orelse = match node.child_by_field_name("alternative") {
                    Some(alt) => self.body(alt, "body")?,
                    None => Vec::new(),
                };
                Ok(Stmt::While(
                    self.kw(node, "while"),
                    self.expr(self.required(node, "condition")?)?,
                    self.body(node, "body")?,
                    orelse,
                ))
            }
            "try_statement" => self.try_statement(node),
            "with_statement" => self.with_statement(node),
            "function_definition" => self.function_definition(node, Vec::new()),
            "class_definition" => self.class_definition(node, Vec::new()),
            "decorated_definition" => {
                let decorators = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "decorator")
                    .map(|d| {
                        let expr = named_children(d)
                            .into_iter()
                            .next()
                            .ok_or_else(|| self.unsupported(d))?;
                        Ok(Decorator {
                            at: self.kw(d, "@"),
                            expr: self.expr(expr)?,
                        })
                    })
                    .collect::<PResult<Vec<_>>>()?;
                let def = self.required(node, "definition")?;
                match def.kind() {
                    "function_definition" => self.function_definition(def, decorators),
                    "class_definition" => self.class_definition(def, decorators),
                    _ => Err(self.unsupported(def)),
                }
            }
            _ => Err(self.unsupported(node)),
        }
    }

    fn expression_statement(&self, node: Node<'_>) -> PResult<Stmt> {
        let children = named_children(node);
        match children.as_slice() {
            [single] => match single.kind() {
                "assignment" => self.assignment(*single),
                "augmented_assignment" => {
                    let op_node = self.required(*single, "operator")?;
                    let op_text = self.text(op_node);
                    let op = binop_kind(op_text.trim_end_matches('='))
                        .ok_or_else(|| self.unsupported(op_node))?;
                    Ok(Stmt::AugAssign(
                        self.expr(self.required(*single, "left")?)?,
                        (op, self.tok(op_node)),
                        self.expr(self.required(*single, "right")?)?,
                    ))
                }
                _ => Ok(Stmt::ExprStmt(self.expr(*single)?)),
            },
            // `a, b` as a statement
            _ => Ok(Stmt::ExprStmt(Expr::Tuple(ListOrComprehension::CompList((
                Tok::fake("("),
                self.exprs(children.clone())?,
                Tok::fake(")"),
            ))))),
        }
    }

    fn assignment(&self, node: Node<'_>) -> PResult<Stmt> {
        let left = self.expr(self.required(node, "left")?)?;
        if let Some(ty) = node.child_by_field_name("type") {
            let value = match node.child_by_field_name("right") {
                Some(r) => Some(self.expr(r)?),
                None => None,
            };
            return Ok(Stmt::AnnAssign(left, self.type_expr(ty)?, value));
        }

        let eq = self.kw(node, "=");
        let mut targets = vec![left];
        let mut current = self.required(node, "right")?;
        // `a = b = c` nests as assignment(a, assignment(b, c))
        while current.kind() == "assignment" && current.child_by_field_name("type").is_none() {
            targets.push(self.expr(self.required(current, "left")?)?);
            current = self.required(current, "right")?;
        }
        Ok(Stmt::Assign(targets, eq, self.expr(current)?))
    }

    fn raise(&self, node: Node<'_>) -> PResult<Stmt> {
        let raise = self.kw(node, "raise");
        let cause = node.child_by_field_name("cause");
        let exc = named_children(node)
            .into_iter()
            .find(|c| cause.map_or(true, |k| k.id() != c.id()));
        match exc {
            None => Ok(Stmt::Raise(raise, None)),
            Some(e) => {
                let cause = match cause {
                    Some(c) => Some(self.expr(c)?),
                    None => None,
                };
                Ok(Stmt::Raise(raise, Some((self.expr(e)?, cause))))
            }
        }
    }

    fn import_item(&self, node: Node<'_>) -> PResult<(DottedName, Option<Name>)> {
        match node.kind() {
            "aliased_import" => Ok((
                self.dotted_name(self.required(node, "name")?)?,
                Some(self.name(self.required(node, "alias")?)?),
            )),
            _ => Ok((self.dotted_name(node)?, None)),
        }
    }

    fn alias(&self, node: Node<'_>) -> PResult<Alias> {
        let (dotted, alias) = self.import_item(node)?;
        // `from m import a.b` is not valid Python; keep the last segment
        let name = dotted
            .into_iter()
            .last()
            .ok_or_else(|| self.unsupported(node))?;
        Ok((name, alias))
    }

    fn import_from(&self, node: Node<'_>) -> PResult<Stmt> {
        let from = self.kw(node, "from");
        let module_node = self.required(node, "module_name")?;
        let module = match module_node.kind() {
            "relative_import" => {
                let mut dots = Vec::new();
                let mut dotted = Vec::new();
                for child in named_children(module_node) {
                    match child.kind() {
                        "import_prefix" => {
                            for dot in all_children(child) {
                                dots.push(self.tok(dot));
                            }
                            if dots.is_empty() {
                                // Some grammar versions expose the prefix as one token
                                for _ in self.text(child).chars().filter(|c| *c == '.') {
                                    dots.push(Tok::origin(".", self.loc(child)));
                                }
                            }
                        }
                        _ => dotted = self.dotted_name(child)?,
                    }
                }
                ModuleName {
                    dotted,
                    dots: Some(dots),
                }
            }
            _ => ModuleName {
                dotted: self.dotted_name(module_node)?,
                dots: None,
            },
        };

        if let Some(star) = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "wildcard_import")
        {
            return Ok(Stmt::ImportAll(from, module, self.tok(star)));
        }

        let names = field_children(node, "name")
            .into_iter()
            .map(|c| self.alias(c))
            .collect::<PResult<Vec<_>>>()?;
        Ok(Stmt::ImportFrom(from, module, names))
    }

    fn if_statement(&self, node: Node<'_>) -> PResult<Stmt> {
        let mut orelse: Option<Vec<Stmt>> = None;
        for alt in field_children(node, "alternative").into_iter().rev() {
            match alt.kind() {
                "else_clause" => orelse = Some(self.body(alt, "body")?),
                "elif_clause" => {
                    let elif = Stmt::If(
                        self.kw(alt, "elif"),
                        self.expr(self.required(alt, "condition")?)?,
                        self.body(alt, "consequence")?,
                        orelse.take(),
                    );
                    orelse = Some(vec![elif]);
                }
                _ => return Err(self.unsupported(alt)),
            }
        }
        Ok(Stmt::If(
            self.kw(node, "if"),
            self.expr(self.required(node, "condition")?)?,
            self.body(node, "consequence")?,
            orelse,
        ))
    }

    fn for_statement(&self, node: Node<'_>) -> PResult<Stmt> {
        let orelse = match node.child_by_field_name("alternative") {
            Some(alt) => self.body(alt, "body")?,
            None => Vec::new(),
        };
        let stmt = Stmt::For(
            self.kw(node, "for"),
            self.expr(self.required(node, "left")?)?,
            self.kw(node, "in"),
            self.expr(self.required(node, "right")?)?,
            self.body(node, "body")?,
            orelse,
        );
        Ok(self.wrap_async(node, stmt))
    }

    fn wrap_async(&self, node: Node<'_>, stmt: Stmt) -> Stmt {
        if starts_with_async(node) {
            Stmt::Async(self.kw(node, "async"), Box::new(stmt))
        } else {
            stmt
        }
    }

    fn try_statement(&self, node: Node<'_>) -> PResult<Stmt> {
        let try_tok = self.kw(node, "try");
        let body = self.body(node, "body")?;
        let mut handlers = Vec::new();
        let mut orelse = Vec::new();
        let mut finally = None;

        for child in named_children(node) {
            match child.kind() {
                "except_clause" | "except_group_clause" => handlers.push(self.except_clause(child)?),
                "else_clause" => orelse = self.body(child, "body")?,
                "finally_clause" => {
                    let block = named_children(child)
                        .into_iter()
                        .find(|c| c.kind() == "block")
                        .ok_or_else(|| self.unsupported(child))?;
                    finally = Some((self.kw(child, "finally"), self.stmts(block)?));
                }
                _ => {}
            }
        }

        match (handlers.is_empty(), finally) {
            (true, Some((fin_tok, fin_body))) => {
                Ok(Stmt::TryFinally(try_tok, body, fin_tok, fin_body))
            }
            (_, None) => Ok(Stmt::TryExcept(try_tok, body, handlers, orelse)),
            (false, Some((fin_tok, fin_body))) => {
                let inner = Stmt::TryExcept(try_tok.clone(), body, handlers, orelse);
                Ok(Stmt::TryFinally(try_tok, vec![inner], fin_tok, fin_body))
            }
        }
    }

    fn except_clause(&self, node: Node<'_>) -> PResult<ExceptHandler> {
        let except_tok = self.kw(node, "except");
        let mut exprs = Vec::new();
        let mut body = Vec::new();
        for child in named_children(node) {
            if child.kind() == "block" {
                body = self.stmts(child)?;
            } else {
                exprs.push(child);
            }
        }

        let (typ, name) = match exprs.as_slice() {
            [] => (None, None),
            [single] if single.kind() == "as_pattern" => {
                let (value, target) = self.as_pattern(*single)?;
                (Some(value), Some(self.name(target)?))
            }
            [single] => (Some(self.expr(*single)?), None),
            [value, alias, ..] => (Some(self.expr(*value)?), Some(self.name(self.unwrap_target(*alias))?)),
        };
        Ok(ExceptHandler {
            except_tok,
            typ,
            name,
            body,
        })
    }

    /// `value as target`
    fn as_pattern<'t>(&self, node: Node<'t>) -> PResult<(Expr, Node<'t>)> {
        let children = named_children(node);
        let value = children.first().ok_or_else(|| self.unsupported(node))?;
        let target = node
            .child_by_field_name("alias")
            .or_else(|| children.get(1).copied())
            .ok_or_else(|| self.unsupported(node))?;
        Ok((self.expr(*value)?, self.unwrap_target(target)))
    }

    fn unwrap_target<'t>(&self, node: Node<'t>) -> Node<'t> {
        if node.kind() == "as_pattern_target" {
            named_children(node).into_iter().next().unwrap_or(node)
        } else {
            node
        }
    }

    fn with_statement(&self, node: Node<'_>) -> PResult<Stmt> {
        let with_tok = self.kw(node, "with");
        let mut items = Vec::new();
        for clause in named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "with_clause")
        {
            for item in named_children(clause) {
                let value = match item.kind() {
                    "with_item" => self.required(item, "value")?,
                    _ => item,
                };
                items.push(if value.kind() == "as_pattern" {
                    let (e, target) = self.as_pattern(value)?;
                    (e, Some(self.expr(target)?))
                } else {
                    (self.expr(value)?, None)
                });
            }
        }

        // `with a, b: body` is `with a: with b: body`
        let mut body = self.body(node, "body")?;
        let mut items = items.into_iter().rev().peekable();
        let mut stmt = None;
        while let Some((e, target)) = items.next() {
            let with = Stmt::With(with_tok.clone(), e, target, body);
            if items.peek().is_none() {
                stmt = Some(with);
                break;
            }
            body = vec![with];
        }
        let stmt = stmt.ok_or_else(|| self.unsupported(node))?;
        Ok(self.wrap_async(node, stmt))
    }

    fn function_definition(&self, node: Node<'_>, decorators: Vec<Decorator>) -> PResult<Stmt> {
        let params = match node.child_by_field_name("parameters") {
            Some(p) => self.parameters(p)?,
            None => Vec::new(),
        };
        let returns = match node.child_by_field_name("return_type") {
            Some(t) => Some(self.type_expr(t)?),
            None => None,
        };
        let def = Stmt::FunctionDef(FunctionDef {
            def_tok: self.kw(node, "def"),
            name: self.name(self.required(node, "name")?)?,
            params,
            returns,
            body: self.body(node, "body")?,
            decorators,
        });
        Ok(self.wrap_async(node, def))
    }

    fn class_definition(&self, node: Node<'_>, decorators: Vec<Decorator>) -> PResult<Stmt> {
        let bases = match node.child_by_field_name("superclasses") {
            Some(list) => self.arguments(list)?.1,
            None => Vec::new(),
        };
        Ok(Stmt::ClassDef(ClassDef {
            class_tok: self.kw(node, "class"),
            name: self.name(self.required(node, "name")?)?,
            bases,
            body: self.body(node, "body")?,
            decorators,
        }))
    }

    // ───────────────────────────────────────────────────────────────────────
    // Parameters
    // ───────────────────────────────────────────────────────────────────────

    fn parameters(&self, node: Node<'_>) -> PResult<Vec<Parameter>> {
        named_children(node)
            .into_iter()
            .map(|p| self.parameter(p))
            .collect()
    }

    fn parameter(&self, node: Node<'_>) -> PResult<Parameter> {
        match node.kind() {
            "identifier" => Ok(Parameter::Classic(self.name(node)?, None)),
            "typed_parameter" => {
                let ty = Some(self.type_expr(self.required(node, "type")?)?);
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| self.unsupported(node))?;
                match inner.kind() {
                    "list_splat_pattern" => {
                        let (star, name) = self.splat_name(inner)?;
                        Ok(Parameter::Star(star, name, ty))
                    }
                    "dictionary_splat_pattern" => {
                        let (pow, name) = self.splat_name(inner)?;
                        Ok(Parameter::Pow(pow, name, ty))
                    }
                    _ => Ok(Parameter::Classic(self.name(inner)?, ty)),
                }
            }
            "default_parameter" => Ok(Parameter::Default(
                self.name(self.required(node, "name")?)?,
                None,
                self.expr(self.required(node, "value")?)?,
            )),
            "typed_default_parameter" => Ok(Parameter::Default(
                self.name(self.required(node, "name")?)?,
                Some(self.type_expr(self.required(node, "type")?)?),
                self.expr(self.required(node, "value")?)?,
            )),
            "list_splat_pattern" => {
                let (star, name) = self.splat_name(node)?;
                Ok(Parameter::Star(star, name, None))
            }
            "dictionary_splat_pattern" => {
                let (pow, name) = self.splat_name(node)?;
                Ok(Parameter::Pow(pow, name, None))
            }
            "keyword_separator" => Ok(Parameter::SingleStar(self.tok(node))),
            "positional_separator" => Ok(Parameter::Slash(self.tok(node))),
            "tuple_pattern" => Ok(Parameter::Pattern(self.param_pattern(node)?)),
            "ellipsis" => Ok(Parameter::Ellipsis(self.tok(node))),
            _ => Err(self.unsupported(node)),
        }
    }

    fn splat_name(&self, node: Node<'_>) -> PResult<(Tok, Name)> {
        let star = all_children(node)
            .into_iter()
            .find(|c| !c.is_named())
            .map(|c| self.tok(c))
            .unwrap_or_else(|| Tok::origin("*", self.loc(node)));
        let name = named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.unsupported(node))?;
        Ok((star, self.name(name)?))
    }

    fn param_pattern(&self, node: Node<'_>) -> PResult<ParamPattern> {
        match node.kind() {
            "tuple_pattern" => {
                let (l, r) = self.brackets(node, "(", ")");
                let elts = named_children(node)
                    .into_iter()
                    .map(|c| self.param_pattern(c))
                    .collect::<PResult<Vec<_>>>()?;
                Ok(ParamPattern::Tuple((l, elts, r)))
            }
            _ => Ok(ParamPattern::Name(self.name(node)?)),
        }
    }

    // ───────────────────────────────────────────────────────────────────────
    // Expressions
    // ───────────────────────────────────────────────────────────────────────

    fn exprs(&self, nodes: Vec<Node<'_>>) -> PResult<Vec<Expr>> {
        nodes.into_iter().map(|n| self.expr(n)).collect()
    }

    fn type_expr(&self, node: Node<'_>) -> PResult<Type> {
        match node.kind() {
            "type" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| self.unsupported(node))?;
                self.expr(inner)
            }
            _ => self.expr(node),
        }
    }

    fn brackets(&self, node: Node<'_>, open: &str, close: &str) -> (Tok, Tok) {
        let children = all_children(node);
        let l = children
            .iter()
            .find(|c| !c.is_named() && c.kind() == open)
            .map(|c| self.tok(*c))
            .unwrap_or_else(|| Tok::fake(open));
        let r = children
            .iter()
            .rev()
            .find(|c| !c.is_named() && c.kind() == close)
            .map(|c| self.tok(*c))
            .unwrap_or_else(|| Tok::fake(close));
        (l, r)
    }

    fn expr(&self, node: Node<'_>) -> PResult<Expr> {
        match node.kind() {
            "identifier" | "keyword_identifier" => Ok(Expr::name(self.name(node)?)),
            "integer" => Ok(Expr::Num(self.integer(node))),
            "float" => Ok(Expr::Num(self.float(node))),
            "string" => self.string(node),
            "concatenated_string" => Ok(Expr::ConcatenatedString(
                self.exprs(named_children(node))?,
            )),
            "true" => Ok(Expr::Bool((true, self.tok(node)))),
            "false" => Ok(Expr::Bool((false, self.tok(node)))),
            "none" => Ok(Expr::None_(self.tok(node))),
            "ellipsis" => Ok(Expr::Ellipsis(self.tok(node))),

            "parenthesized_expression" | "type" | "parenthesized_list_splat" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| self.unsupported(node))?;
                self.expr(inner)
            }

            "tuple" | "tuple_pattern" => {
                let (l, r) = self.brackets(node, "(", ")");
                Ok(Expr::Tuple(ListOrComprehension::CompList((
                    l,
                    self.exprs(named_children(node))?,
                    r,
                ))))
            }
            "expression_list" | "pattern_list" => {
                Ok(Expr::Tuple(ListOrComprehension::CompList((
                    Tok::fake("("),
                    self.exprs(named_children(node))?,
                    Tok::fake(")"),
                ))))
            }
            "list" | "list_pattern" => {
                let (l, r) = self.brackets(node, "[", "]");
                Ok(Expr::List(ListOrComprehension::CompList((
                    l,
                    self.exprs(named_children(node))?,
                    r,
                ))))
            }
            "set" => {
                let (l, r) = self.brackets(node, "{", "}");
                let elts = named_children(node)
                    .into_iter()
                    .map(|c| self.dict_elt(c))
                    .collect::<PResult<Vec<_>>>()?;
                Ok(Expr::DictOrSet(ListOrComprehension::CompList((l, elts, r))))
            }
            "dictionary" => {
                let (l, r) = self.brackets(node, "{", "}");
                let elts = named_children(node)
                    .into_iter()
                    .map(|c| self.dict_elt(c))
                    .collect::<PResult<Vec<_>>>()?;
                Ok(Expr::DictOrSet(ListOrComprehension::CompList((l, elts, r))))
            }
            "list_comprehension" => {
                let (l, r) = self.brackets(node, "[", "]");
                let (body, clauses) = self.comprehension(node)?;
                Ok(Expr::List(ListOrComprehension::CompForIf((
                    l,
                    Box::new((self.expr(body)?, clauses)),
                    r,
                ))))
            }
            "generator_expression" => {
                let (l, r) = self.brackets(node, "(", ")");
                let (body, clauses) = self.comprehension(node)?;
                Ok(Expr::Tuple(ListOrComprehension::CompForIf((
                    l,
                    Box::new((self.expr(body)?, clauses)),
                    r,
                ))))
            }
            "set_comprehension" | "dictionary_comprehension" => {
                let (l, r) = self.brackets(node, "{", "}");
                let (body, clauses) = self.comprehension(node)?;
                Ok(Expr::DictOrSet(ListOrComprehension::CompForIf((
                    l,
                    Box::new((self.dict_elt(body)?, clauses)),
                    r,
                ))))
            }

            "binary_operator" => {
                let op_node = self.required(node, "operator")?;
                let op = binop_kind(self.text(op_node)).ok_or_else(|| self.unsupported(op_node))?;
                Ok(Expr::BinOp(
                    Box::new(self.expr(self.required(node, "left")?)?),
                    (op, self.tok(op_node)),
                    Box::new(self.expr(self.required(node, "right")?)?),
                ))
            }
            "unary_operator" => {
                let op_node = self.required(node, "operator")?;
                let op = match self.text(op_node) {
                    "~" => UnaryOpKind::Invert,
                    "-" => UnaryOpKind::USub,
                    "+" => UnaryOpKind::UAdd,
                    _ => return Err(self.unsupported(op_node)),
                };
                Ok(Expr::UnaryOp(
                    (op, self.tok(op_node)),
                    Box::new(self.expr(self.required(node, "argument")?)?),
                ))
            }
            "not_operator" => Ok(Expr::UnaryOp(
                (UnaryOpKind::Not, self.kw(node, "not")),
                Box::new(self.expr(self.required(node, "argument")?)?),
            )),
            "boolean_operator" => self.boolean_operator(node),
            "comparison_operator" => self.comparison(node),

            "call" => {
                let func = self.expr(self.required(node, "function")?)?;
                let args_node = self.required(node, "arguments")?;
                let args = if args_node.kind() == "generator_expression" {
                    let (l, r) = self.brackets(args_node, "(", ")");
                    let (body, clauses) = self.comprehension(args_node)?;
                    (l, vec![Argument::ArgComp(self.expr(body)?, clauses)], r)
                } else {
                    self.arguments(args_node)?
                };
                Ok(Expr::Call(Box::new(func), args))
            }
            "subscript" => {
                let value = self.expr(self.required(node, "value")?)?;
                let (l, r) = self.brackets(node, "[", "]");
                let slices = field_children(node, "subscript")
                    .into_iter()
                    .map(|s| self.slice(s))
                    .collect::<PResult<Vec<_>>>()?;
                Ok(Expr::Subscript(Box::new(value), (l, slices, r)))
            }
            "attribute" => Ok(Expr::Attribute(
                Box::new(self.expr(self.required(node, "object")?)?),
                self.kw(node, "."),
                self.name(self.required(node, "attribute")?)?,
            )),

            "lambda" => {
                let params = match node.child_by_field_name("parameters") {
                    Some(p) => self.parameters(p)?,
                    None => Vec::new(),
                };
                Ok(Expr::Lambda(
                    self.kw(node, "lambda"),
                    params,
                    Box::new(self.expr(self.required(node, "body")?)?),
                ))
            }
            "conditional_expression" => {
                let parts = named_children(node);
                match parts.as_slice() {
                    [body, test, orelse] => Ok(Expr::IfExp(
                        Box::new(self.expr(*test)?),
                        Box::new(self.expr(*body)?),
                        Box::new(self.expr(*orelse)?),
                    )),
                    _ => Err(self.unsupported(node)),
                }
            }
            "named_expression" => Ok(Expr::NamedExpr(
                Box::new(self.expr(self.required(node, "name")?)?),
                self.kw(node, ":="),
                Box::new(self.expr(self.required(node, "value")?)?),
            )),
            "await" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| self.unsupported(node))?;
                Ok(Expr::Await(self.kw(node, "await"), Box::new(self.expr(inner)?)))
            }
            "yield" => {
                let is_from = all_children(node)
                    .iter()
                    .any(|c| !c.is_named() && c.kind() == "from");
                let value = match named_children(node).into_iter().next() {
                    Some(v) => Some(Box::new(self.expr(v)?)),
                    None => None,
                };
                Ok(Expr::Yield(self.kw(node, "yield"), value, is_from))
            }
            "list_splat" | "list_splat_pattern" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| self.unsupported(node))?;
                Ok(Expr::Starred(self.kw(node, "*"), Box::new(self.expr(inner)?)))
            }
            _ => Err(self.unsupported(node)),
        }
    }

    fn integer(&self, node: Node<'_>) -> Number {
        let text = self.text(node);
        let tok = self.tok(node);
        if text.ends_with('j') || text.ends_with('J') {
            return Number::Imag((text.to_string(), tok));
        }
        Number::Int((parse_int(text), tok))
    }

    fn float(&self, node: Node<'_>) -> Number {
        let text = self.text(node);
        let tok = self.tok(node);
        if text.ends_with('j') || text.ends_with('J') {
            return Number::Imag((text.to_string(), tok));
        }
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        Number::Float((cleaned.parse::<f64>().ok(), tok))
    }

    fn string(&self, node: Node<'_>) -> PResult<Expr> {
        let text = self.text(node);
        let prefix_len = text.find(|c: char| c == '"' || c == '\'').unwrap_or(0);
        let prefix = &text[..prefix_len];
        let quoted = &text[prefix_len..];

        if prefix.contains(|c: char| c == 'f' || c == 'F') {
            return self.fstring(node);
        }

        let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
            3
        } else {
            1
        };
        let content = if quoted.len() >= 2 * quote_len {
            &quoted[quote_len..quoted.len() - quote_len]
        } else {
            ""
        };
        let value = (content.to_string(), self.tok(node));

        if prefix.is_empty() || prefix.eq_ignore_ascii_case("u") {
            Ok(Expr::Str(value))
        } else {
            Ok(Expr::EncodedStr(value, prefix.to_string()))
        }
    }

    /// f-string: literal runs between `interpolation` children become
    /// `Str`, interpolations become `FormattedValue`
    fn fstring(&self, node: Node<'_>) -> PResult<Expr> {
        let children = all_children(node);
        let start = children
            .first()
            .filter(|c| c.kind() == "string_start")
            .copied();
        let end = children
            .last()
            .filter(|c| c.kind() == "string_end")
            .copied();
        let open = start.map(|s| self.tok(s)).unwrap_or_else(|| self.tok(node));
        let mut cursor = start.map_or(node.start_byte(), |s| s.end_byte());
        let stop = end.map_or(node.end_byte(), |e| e.start_byte());

        let mut parts = Vec::new();
        for child in children.iter().filter(|c| c.kind() == "interpolation") {
            self.push_literal_part(&mut parts, cursor, child.start_byte(), *child);
            parts.push(self.interpolation(*child)?);
            cursor = child.end_byte();
        }
        self.push_literal_part(&mut parts, cursor, stop, node);
        Ok(Expr::InterpolatedString(open, parts))
    }

    fn push_literal_part(&self, parts: &mut Vec<Expr>, from: usize, to: usize, anchor: Node<'_>) {
        if let Some(lit) = self.src.get(from..to).filter(|s| !s.is_empty()) {
            parts.push(Expr::Str((
                lit.to_string(),
                Tok::origin(lit, self.loc(anchor)),
            )));
        }
    }

    fn interpolation(&self, node: Node<'_>) -> PResult<Expr> {
        let children = named_children(node);
        let value = node
            .child_by_field_name("expression")
            .or_else(|| {
                children
                    .iter()
                    .find(|c| !matches!(c.kind(), "type_conversion" | "format_specifier"))
                    .copied()
            })
            .ok_or_else(|| self.unsupported(node))?;
        let conversion = children
            .iter()
            .find(|c| c.kind() == "type_conversion")
            .map(|c| {
                let text = self.text(*c).trim_start_matches('!');
                (text.to_string(), self.tok(*c))
            });
        let spec = children
            .iter()
            .find(|c| c.kind() == "format_specifier")
            .map(|c| {
                let text = self.text(*c).trim_start_matches(':');
                Box::new(Expr::Str((text.to_string(), self.tok(*c))))
            });
        Ok(Expr::FormattedValue(
            Box::new(self.expr(value)?),
            conversion,
            spec,
        ))
    }

    fn dict_elt(&self, node: Node<'_>) -> PResult<DictOrSetElt> {
        match node.kind() {
            "pair" => Ok(DictOrSetElt::KeyVal(
                self.expr(self.required(node, "key")?)?,
                self.expr(self.required(node, "value")?)?,
            )),
            "dictionary_splat" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| self.unsupported(node))?;
                Ok(DictOrSetElt::PowInline(self.kw(node, "**"), self.expr(inner)?))
            }
            _ => Ok(DictOrSetElt::Key(self.expr(node)?)),
        }
    }

    /// Body node plus ordered for/if clauses
    fn comprehension<'t>(&self, node: Node<'t>) -> PResult<(Node<'t>, Vec<ForIf>)> {
        let body = self.required(node, "body")?;
        let mut clauses = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "for_in_clause" => {
                    let rights = field_children(child, "right");
                    let iter = match rights.as_slice() {
                        [single] => self.expr(*single)?,
                        _ => Expr::Tuple(ListOrComprehension::CompList((
                            Tok::fake("("),
                            self.exprs(rights)?,
                            Tok::fake(")"),
                        ))),
                    };
                    clauses.push(ForIf::CompFor(
                        self.kw(child, "for"),
                        self.expr(self.required(child, "left")?)?,
                        self.kw(child, "in"),
                        iter,
                    ));
                }
                "if_clause" => {
                    let cond = named_children(child)
                        .into_iter()
                        .next()
                        .ok_or_else(|| self.unsupported(child))?;
                    clauses.push(ForIf::CompIf(self.kw(child, "if"), self.expr(cond)?));
                }
                _ => {}
            }
        }
        Ok((body, clauses))
    }

    fn arguments(&self, node: Node<'_>) -> PResult<(Tok, Vec<Argument>, Tok)> {
        let (l, r) = self.brackets(node, "(", ")");
        let args = named_children(node)
            .into_iter()
            .map(|a| match a.kind() {
                "keyword_argument" => Ok(Argument::ArgKwd(
                    self.name(self.required(a, "name")?)?,
                    self.expr(self.required(a, "value")?)?,
                )),
                "list_splat" => {
                    let inner = named_children(a)
                        .into_iter()
                        .next()
                        .ok_or_else(|| self.unsupported(a))?;
                    Ok(Argument::ArgStar(self.kw(a, "*"), self.expr(inner)?))
                }
                "dictionary_splat" => {
                    let inner = named_children(a)
                        .into_iter()
                        .next()
                        .ok_or_else(|| self.unsupported(a))?;
                    Ok(Argument::ArgPow(self.kw(a, "**"), self.expr(inner)?))
                }
                _ => Ok(Argument::Arg(self.expr(a)?)),
            })
            .collect::<PResult<Vec<_>>>()?;
        Ok((l, args, r))
    }

    fn slice(&self, node: Node<'_>) -> PResult<Slice> {
        if node.kind() != "slice" {
            return Ok(Slice::Index(self.expr(node)?));
        }
        let mut parts: [Option<Expr>; 3] = [None, None, None];
        let mut idx = 0;
        for child in all_children(node) {
            if !child.is_named() && child.kind() == ":" {
                idx += 1;
            } else if child.is_named() && idx < 3 {
                parts[idx] = Some(self.expr(child)?);
            }
        }
        let [lower, upper, step] = parts;
        Ok(Slice::Range(lower, upper, step))
    }

    fn boolean_operator(&self, node: Node<'_>) -> PResult<Expr> {
        let op_node = self.required(node, "operator")?;
        let op_text = self.text(op_node);
        let op = match op_text {
            "and" => BoolOpKind::And,
            "or" => BoolOpKind::Or,
            _ => return Err(self.unsupported(op_node)),
        };

        // `a and b and c` is left-nested; flatten into one operand list
        let mut operands = vec![self.expr(self.required(node, "right")?)?];
        let mut left = self.required(node, "left")?;
        loop {
            let same_op = left.kind() == "boolean_operator"
                && left
                    .child_by_field_name("operator")
                    .map_or(false, |o| self.text(o) == op_text);
            if !same_op {
                operands.push(self.expr(left)?);
                break;
            }
            operands.push(self.expr(self.required(left, "right")?)?);
            left = self.required(left, "left")?;
        }
        operands.reverse();
        Ok(Expr::BoolOp((op, self.tok(op_node)), operands))
    }

    /// `is not` and `not in` come out as two anonymous children; all the
    /// keywords between two operands form one operator
    fn comparison(&self, node: Node<'_>) -> PResult<Expr> {
        let mut operands = Vec::new();
        let mut ops = Vec::new();
        let mut pending: Vec<Node<'_>> = Vec::new();
        for child in all_children(node) {
            if child.is_named() {
                if !pending.is_empty() {
                    ops.push(self.comparison_operator(node, &pending)?);
                    pending.clear();
                }
                operands.push(self.expr(child)?);
            } else {
                pending.push(child);
            }
        }
        if operands.is_empty() || !pending.is_empty() {
            return Err(self.unsupported(node));
        }
        let left = operands.remove(0);
        Ok(Expr::Compare(Box::new(left), ops, operands))
    }

    fn comparison_operator(&self, node: Node<'_>, parts: &[Node<'_>]) -> PResult<Wrap<CmpOp>> {
        let (first, last) = match parts {
            [first, .., last] => (*first, *last),
            [only] => (*only, *only),
            [] => return Err(self.unsupported(node)),
        };
        let text = parts
            .iter()
            .flat_map(|p| self.text(*p).split_whitespace())
            .collect::<Vec<_>>()
            .join(" ");
        let op = cmp_op(&text).ok_or_else(|| self.unsupported(first))?;
        let span = self
            .src
            .get(first.start_byte()..last.end_byte())
            .unwrap_or(text.as_str());
        Ok((op, Tok::origin(span, self.loc(first))))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Token tables
// ═══════════════════════════════════════════════════════════════════════════

fn binop_kind(text: &str) -> Option<OperatorKind> {
    Some(match text {
        "+" => OperatorKind::Add,
        "-" => OperatorKind::Sub,
        "*" => OperatorKind::Mult,
        "@" => OperatorKind::MatMult,
        "/" => OperatorKind::Div,
        "//" => OperatorKind::FloorDiv,
        "%" => OperatorKind::Mod,
        "**" => OperatorKind::Pow,
        "<<" => OperatorKind::LShift,
        ">>" => OperatorKind::RShift,
        "|" => OperatorKind::BitOr,
        "^" => OperatorKind::BitXor,
        "&" => OperatorKind::BitAnd,
        _ => return None,
    })
}

fn cmp_op(kind: &str) -> Option<CmpOp> {
    Some(match kind {
        "==" => CmpOp::Eq,
        "!=" | "<>" => CmpOp::NotEq,
        "<" => CmpOp::Lt,
        "<=" => CmpOp::LtE,
        ">" => CmpOp::Gt,
        ">=" => CmpOp::GtE,
        "is" => CmpOp::Is,
        "is not" => CmpOp::IsNot,
        "in" => CmpOp::In,
        "not in" => CmpOp::NotIn,
        _ => return None,
    })
}

/// Python integer literal; `None` when it does not fit in an i64
fn parse_int(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    // Python 2 long suffix
    let t = cleaned.trim_end_matches(|c: char| c == 'l' || c == 'L');
    let lower = t.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest.to_string(), 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest.to_string(), 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest.to_string(), 2)
    } else if lower.len() > 1 && lower.starts_with('0') && lower.chars().all(|c| c.is_ascii_digit()) {
        // Python 2 octal `0755`
        (lower[1..].to_string(), 8)
    } else {
        (lower, 10)
    };
    i64::from_str_radix(&digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Vec<Stmt> {
        PythonParser::new().parse(src, "test.py").unwrap().body
    }

    fn only_expr(src: &str) -> Expr {
        match parse(src).pop() {
            Some(Stmt::ExprStmt(e)) => e,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn name(s: &str) -> Expr {
        Expr::name((s.to_string(), Tok::fake(s)))
    }

    #[test]
    fn test_parse_int_radixes() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0xff"), Some(255));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("0755"), Some(493));
        assert_eq!(parse_int("10L"), Some(10));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("99999999999999999999999"), None);
    }

    #[test]
    fn test_chained_assignment_collects_targets() {
        match parse("a = b = 1").pop() {
            Some(Stmt::Assign(targets, _, value)) => {
                assert_eq!(targets, vec![name("a"), name("b")]);
                assert!(matches!(value, Expr::Num(Number::Int((Some(1), _)))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_annotated_assignment() {
        match parse("x: int = 3").pop() {
            Some(Stmt::AnnAssign(target, ty, Some(_))) => {
                assert_eq!(target, name("x"));
                assert_eq!(ty, name("int"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_string_prefixes() {
        assert!(matches!(only_expr("'abc'"), Expr::Str((ref s, _)) if s == "abc"));
        assert!(matches!(
            only_expr("rb'abc'"),
            Expr::EncodedStr((ref s, _), ref p) if s == "abc" && p == "rb"
        ));
        assert!(matches!(only_expr("'''x'''"), Expr::Str((ref s, _)) if s == "x"));
    }

    #[test]
    fn test_fstring_parts() {
        match only_expr("f'a{x!r}b'") {
            Expr::InterpolatedString(_, parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(&parts[0], Expr::Str((s, _)) if s == "a"));
                assert!(matches!(
                    &parts[1],
                    Expr::FormattedValue(_, Some((conv, _)), None) if conv == "r"
                ));
                assert!(matches!(&parts[2], Expr::Str((s, _)) if s == "b"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_chained_comparison() {
        match only_expr("a < b <= c") {
            Expr::Compare(_, ops, rest) => {
                let kinds: Vec<CmpOp> = ops.into_iter().map(|(op, _)| op).collect();
                assert_eq!(kinds, vec![CmpOp::Lt, CmpOp::LtE]);
                assert_eq!(rest.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_negated_comparison_is_one_operator() {
        let ops_of = |src: &str| match only_expr(src) {
            Expr::Compare(_, ops, rest) => {
                assert_eq!(ops.len(), rest.len());
                ops.into_iter()
                    .map(|(op, tok)| (op, tok.text().to_string()))
                    .collect::<Vec<_>>()
            }
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(ops_of("a is not b"), vec![(CmpOp::IsNot, "is not".to_string())]);
        assert_eq!(ops_of("a not in b"), vec![(CmpOp::NotIn, "not in".to_string())]);
        assert_eq!(
            ops_of("a not in b is c"),
            vec![
                (CmpOp::NotIn, "not in".to_string()),
                (CmpOp::Is, "is".to_string())
            ]
        );
    }

    #[test]
    fn test_boolean_chain_is_flattened() {
        match only_expr("a and b and c") {
            Expr::BoolOp((BoolOpKind::And, _), operands) => {
                assert_eq!(operands, vec![name("a"), name("b"), name("c")]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_relative_import_dots() {
        match parse("from ..a.b import c as d").pop() {
            Some(Stmt::ImportFrom(_, module, names)) => {
                assert_eq!(module.dots.map(|d| d.len()), Some(2));
                assert_eq!(module.dotted.len(), 2);
                assert_eq!(names.len(), 1);
                assert!(names[0].1.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_import_with_several_modules_splits() {
        let stmts = parse("import os, sys as s");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[1], Stmt::ImportAs(_, _, Some((alias, _))) if alias == "s"));
    }

    #[test]
    fn test_try_except_finally_nests() {
        let src = "try:\n    a()\nexcept E as e:\n    b()\nelse:\n    c()\nfinally:\n    d()\n";
        match parse(src).pop() {
            Some(Stmt::TryFinally(_, body, _, fin)) => {
                assert_eq!(fin.len(), 1);
                match body.as_slice() {
                    [Stmt::TryExcept(_, _, handlers, orelse)] => {
                        assert_eq!(handlers.len(), 1);
                        assert!(handlers[0].typ.is_some());
                        assert!(matches!(&handlers[0].name, Some((n, _)) if n == "e"));
                        assert_eq!(orelse.len(), 1);
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_with_multiple_items_nests() {
        match parse("with a as x, b:\n    pass\n").pop() {
            Some(Stmt::With(_, outer, Some(target), body)) => {
                assert_eq!(outer, name("a"));
                assert_eq!(target, name("x"));
                assert!(matches!(body.as_slice(), [Stmt::With(_, _, None, _)]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_async_def_and_decorators() {
        match parse("@app.route('/')\nasync def f(a, *b, c=1, **d):\n    pass\n").pop() {
            Some(Stmt::Async(_, def)) => match *def {
                Stmt::FunctionDef(f) => {
                    assert_eq!(f.decorators.len(), 1);
                    assert_eq!(f.params.len(), 4);
                    assert!(matches!(f.params[1], Parameter::Star(..)));
                    assert!(matches!(f.params[2], Parameter::Default(..)));
                    assert!(matches!(f.params[3], Parameter::Pow(..)));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_rejected() {
        let err = PythonParser::new().parse("def (:\n", "bad.py").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert!(err.to_string().contains("bad.py"));
    }

    #[test]
    fn test_tokens_carry_positions() {
        match parse("\n\nx = foo").pop() {
            Some(Stmt::Assign(_, _, Expr::Name((_, tok), _))) => {
                let loc = tok.location().unwrap();
                assert_eq!(loc.line, 3);
                assert_eq!(loc.column, 4);
                assert!(!tok.is_fake());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_pattern_restores_metavariables() {
        match PythonParser::new().parse_pattern("foo($X, ...)").unwrap() {
            Any::Expr(Expr::Call(_, (_, args, _))) => {
                assert!(matches!(
                    &args[0],
                    Argument::Arg(Expr::Name((n, _), _)) if n == "$X"
                ));
                assert!(matches!(&args[1], Argument::Arg(Expr::Ellipsis(_))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_pattern_lowercase_metavariable() {
        match PythonParser::new().parse_pattern("$obj.run($arg)").unwrap() {
            Any::Expr(Expr::Call(f, (_, args, _))) => {
                assert!(matches!(
                    *f,
                    Expr::Attribute(ref base, _, _)
                        if matches!(**base, Expr::Name((ref n, _), _) if n == "$obj")
                ));
                assert!(matches!(
                    &args[0],
                    Argument::Arg(Expr::Name((n, _), _)) if n == "$arg"
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_pattern_statement_list() {
        assert!(matches!(
            PythonParser::new().parse_pattern("a = 1\nb = 2").unwrap(),
            Any::Stmts(ref s) if s.len() == 2
        ));
    }
}
