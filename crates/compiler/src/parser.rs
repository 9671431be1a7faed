//! Recursive-descent parser over the token stream produced by
//! [`crate::lexer`]. Blocks are indentation-delimited, one statement
//! per physical line, mirroring the shape the reference implementation
//! got for free from Python's own grammar.

use crate::ast::*;
use crate::error::CompileError;
use crate::lexer::{self, TokKind, Token};
use compy_core::Span;

const RESERVED: &[&str] = &[
    "val", "var", "print", "input", "add1", "sub1", "_", "type", "let", "int", "NoneType", "bool",
    "str", "if", "else", "while", "with", "pass", "and", "or", "not", "is", "True", "False",
    "None",
];

pub struct ParseError {
    pub msg: String,
    pub span: Span,
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::syntax(e.msg, e.span)
    }
}

type PResult<T> = Result<T, ParseError>;

struct Line {
    indent: u32,
    tokens: Vec<Token>,
}

/// Parses a full source file into the top-level scope.
pub fn parse(source: &str) -> Result<Scope, CompileError> {
    let tokens = lexer::lex(source).map_err(|e| CompileError::syntax(e.msg, e.span))?;
    let lines = group_lines(tokens);
    let mut p = Parser { lines, pos: 0 };
    let scope = p.parse_suite(0).map_err(CompileError::from)?;
    if p.pos < p.lines.len() {
        let tok = &p.lines[p.pos].tokens[0];
        return Err(CompileError::syntax(
            format!("unexpected indentation before '{}'", tok.text),
            tok.span,
        ));
    }
    Ok(scope)
}

fn group_lines(tokens: Vec<Token>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    for tok in tokens {
        match tok.kind {
            TokKind::Newline => {
                if !current.is_empty() {
                    let indent = current[0].span.start_col;
                    lines.push(Line { indent, tokens: std::mem::take(&mut current) });
                }
            }
            TokKind::Eof => {
                if !current.is_empty() {
                    let indent = current[0].span.start_col;
                    lines.push(Line { indent, tokens: std::mem::take(&mut current) });
                }
            }
            _ => current.push(tok),
        }
    }
    lines
}

struct Parser {
    lines: Vec<Line>,
    pos: usize,
}

impl Parser {
    fn peek_line_indent(&self) -> Option<u32> {
        self.lines.get(self.pos).map(|l| l.indent)
    }

    /// Parses every consecutive line at exactly `indent` as a statement,
    /// stopping at the first dedent (or EOF).
    fn parse_suite(&mut self, indent: u32) -> PResult<Scope> {
        let mut statements = Vec::new();
        loop {
            match self.peek_line_indent() {
                Some(i) if i == indent => {
                    statements.push(self.parse_statement_line(indent)?);
                }
                _ => break,
            }
        }
        Ok(Scope::new(statements))
    }

    /// Parses the indented block following a `:`-terminated header line.
    fn parse_nested_suite(&mut self, header_indent: u32, header_span: Span) -> PResult<Scope> {
        match self.peek_line_indent() {
            Some(i) if i > header_indent => self.parse_suite(i),
            _ => Err(ParseError { msg: "expected an indented block".to_string(), span: header_span }),
        }
    }

    fn parse_statement_line(&mut self, indent: u32) -> PResult<Stmt> {
        let line = &self.lines[self.pos];
        let toks = line.tokens.clone();
        let span = line_span(&toks);
        self.pos += 1;

        let mut lp = LineParser { toks, pos: 0 };

        if lp.at_kw("pass") {
            lp.pos += 1;
            lp.expect_end()?;
            return Ok(Stmt::NoOp { span });
        }

        if lp.at_kw("if") {
            lp.pos += 1;
            let test = lp.parse_expr()?;
            lp.expect_punct(":")?;
            lp.expect_end()?;
            let body = self.parse_nested_suite(indent, span)?;
            let orelse = if self.peek_line_is_kw(indent, "else") {
                self.pos += 1;
                let else_toks = &self.lines[self.pos - 1].tokens;
                let mut elp = LineParser { toks: else_toks.clone(), pos: 1 };
                elp.expect_punct(":")?;
                self.parse_nested_suite(indent, span)?
            } else {
                Scope::new(vec![])
            };
            return Ok(Stmt::IfStmt { test, body: Box::new(body), orelse: Box::new(orelse), span });
        }

        if lp.at_kw("while") {
            lp.pos += 1;
            let test = lp.parse_expr()?;
            lp.expect_punct(":")?;
            lp.expect_end()?;
            let body = self.parse_nested_suite(indent, span)?;
            return Ok(Stmt::While { test, body: Box::new(body), span });
        }

        if lp.at_kw("with") {
            lp.pos += 1;
            if !lp.at_kw("_") {
                return Err(ParseError { msg: "expected '_' after 'with'".to_string(), span });
            }
            lp.pos += 1;
            lp.expect_punct(":")?;
            lp.expect_end()?;
            let body = self.parse_nested_suite(indent, span)?;
            return Ok(Stmt::NewScope { body: Box::new(body), span });
        }

        if lp.at_kw("val") || lp.at_kw("var") {
            let mutable = lp.at_kw("var");
            lp.pos += 1;
            lp.expect_punct("(")?;
            let name_tok = lp.advance_ident()?;
            if is_reserved(&name_tok.text) {
                return Err(ParseError {
                    msg: format!("'{}' is a reserved keyword and cannot be bound", name_tok.text),
                    span: name_tok.span,
                });
            }
            if !(lp.consume_punct("=") || lp.consume_punct(":=")) {
                return Err(ParseError { msg: "expected '=' or ':=' in binding".to_string(), span });
            }
            let init = lp.parse_expr()?;
            lp.expect_punct(")")?;
            lp.expect_end()?;
            return Ok(Stmt::Binding { mutable, name: name_tok.text, init, span, info: None });
        }

        // Bare assignment: `name = expr`. Distinguished from an
        // expression statement by a top-level unparenthesized `=`.
        if lp.toks.len() > 1 && lp.toks[0].kind == TokKind::Ident && lp.toks[1].is("=") {
            let name_tok = lp.toks[0].clone();
            if is_reserved(&name_tok.text) {
                return Err(ParseError {
                    msg: format!("'{}' is a reserved keyword", name_tok.text),
                    span: name_tok.span,
                });
            }
            lp.pos = 2;
            let src = lp.parse_expr()?;
            lp.expect_end()?;
            return Ok(Stmt::Assignment {
                name: name_tok.text,
                src,
                target_span: name_tok.span,
                span,
                info: None,
            });
        }

        let expr = lp.parse_expr()?;
        lp.expect_end()?;
        Ok(Stmt::EvalExpr { expr, span })
    }

    fn peek_line_is_kw(&self, indent: u32, kw: &str) -> bool {
        match self.lines.get(self.pos) {
            Some(l) if l.indent == indent => l.tokens.first().is_some_and(|t| t.is(kw)),
            _ => false,
        }
    }
}

fn line_span(toks: &[Token]) -> Span {
    match (toks.first(), toks.last()) {
        (Some(f), Some(l)) => Span::new(f.span.start_line, f.span.start_col, l.span.end_line, l.span.end_col),
        _ => Span::at(0, 0),
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Expression-level parser over one statement line's tokens.
struct LineParser {
    toks: Vec<Token>,
    pos: usize,
}

impl LineParser {
    fn cur(&self) -> &Token {
        &self.toks[self.pos.min(self.toks.len() - 1)]
    }

    fn at_kw(&self, kw: &str) -> bool {
        self.pos < self.toks.len() && self.toks[self.pos].is(kw)
    }

    fn consume_punct(&mut self, p: &str) -> bool {
        if self.pos < self.toks.len() && self.toks[self.pos].is(p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> PResult<()> {
        if self.consume_punct(p) {
            Ok(())
        } else {
            Err(ParseError { msg: format!("expected '{p}'"), span: self.cur().span })
        }
    }

    fn expect_end(&self) -> PResult<()> {
        if self.pos == self.toks.len() {
            Ok(())
        } else {
            Err(ParseError {
                msg: format!("unexpected trailing token '{}'", self.toks[self.pos].text),
                span: self.toks[self.pos].span,
            })
        }
    }

    fn advance_ident(&mut self) -> PResult<Token> {
        if self.pos < self.toks.len() && self.toks[self.pos].kind == TokKind::Ident {
            let t = self.toks[self.pos].clone();
            self.pos += 1;
            Ok(t)
        } else {
            Err(ParseError { msg: "expected an identifier".to_string(), span: self.cur().span })
        }
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_conditional()
    }

    /// `body if test else orelse`
    fn parse_conditional(&mut self) -> PResult<Expr> {
        let body = self.parse_or()?;
        if self.at_kw("if") {
            self.pos += 1;
            let test = self.parse_or()?;
            if !self.at_kw("else") {
                return Err(ParseError { msg: "expected 'else' in conditional expression".to_string(), span: self.cur().span });
            }
            self.pos += 1;
            let orelse = self.parse_conditional()?;
            let span = body.span();
            return Ok(Expr::IfExpr { test: Box::new(test), body: Box::new(body), orelse: Box::new(orelse), span });
        }
        Ok(body)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.at_kw("or") {
            self.pos += 1;
            let right = self.parse_and()?;
            let span = left.span();
            left = Expr::IfExpr {
                test: Box::new(left),
                body: Box::new(Expr::Boolean { value: true, span }),
                orelse: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_not()?;
        while self.at_kw("and") {
            self.pos += 1;
            let right = self.parse_not()?;
            let span = left.span();
            left = Expr::IfExpr {
                test: Box::new(left),
                body: Box::new(right),
                orelse: Box::new(Expr::Boolean { value: false, span }),
                span,
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> PResult<Expr> {
        if self.at_kw("not") {
            let span = self.cur().span;
            self.pos += 1;
            let ex1 = self.parse_not()?;
            return Ok(Expr::Prim1 { op: UnaryOp::Not, ex1: Box::new(ex1), span });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let left = self.parse_additive()?;
        let Some(op) = self.peek_compare_op() else {
            return Ok(left);
        };
        self.consume_compare_op();
        let right = self.parse_additive()?;
        let span = left.span();
        if self.peek_compare_op().is_some() {
            return Err(ParseError { msg: "chained comparisons are not supported".to_string(), span: self.cur().span });
        }
        Ok(Expr::Prim2 { op, left: Box::new(left), right: Box::new(right), span })
    }

    fn peek_compare_op(&self) -> Option<BinOp> {
        if self.pos >= self.toks.len() {
            return None;
        }
        let t = &self.toks[self.pos];
        match t.text.as_str() {
            "==" => Some(BinOp::Eq),
            "!=" => Some(BinOp::Ne),
            "<" => Some(BinOp::Lt),
            "<=" => Some(BinOp::Le),
            ">" => Some(BinOp::Gt),
            ">=" => Some(BinOp::Ge),
            "is" => {
                if self.toks.get(self.pos + 1).is_some_and(|n| n.is("not")) {
                    Some(BinOp::IsNot)
                } else {
                    Some(BinOp::Is)
                }
            }
            "is-not" => Some(BinOp::IsNot),
            _ => None,
        }
    }

    fn consume_compare_op(&mut self) {
        if self.toks[self.pos].is("is") && self.toks.get(self.pos + 1).is_some_and(|n| n.is("not")) {
            self.pos += 2;
        } else {
            self.pos += 1;
        }
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.toks.get(self.pos).map(|t| t.text.as_str()) {
                Some("+") => BinOp::Add,
                Some("-") => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_term()?;
            let span = left.span();
            left = Expr::Prim2 { op, left: Box::new(left), right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.toks.get(self.pos).map(|t| t.text.as_str()) {
                Some("*") => BinOp::Mul,
                Some("/") => BinOp::Div,
                Some("%") => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            let span = left.span();
            left = Expr::Prim2 { op, left: Box::new(left), right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.pos < self.toks.len() && self.toks[self.pos].is("-") {
            let span = self.toks[self.pos].span;
            // Unary minus directly on an integer literal collapses into a
            // negative literal, so the most-negative i64 parses cleanly.
            if self.toks.get(self.pos + 1).is_some_and(|t| t.kind == TokKind::Int) {
                let digits = &self.toks[self.pos + 1].text;
                self.pos += 2;
                let text = format!("-{digits}");
                return Ok(parse_int_literal(&text, span));
            }
            self.pos += 1;
            let ex1 = self.parse_unary()?;
            return Ok(Expr::Prim1 { op: UnaryOp::Negate, ex1: Box::new(ex1), span });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self.toks.get(self.pos).cloned().ok_or(ParseError {
            msg: "unexpected end of expression".to_string(),
            span: self.cur().span,
        })?;

        match tok.kind {
            TokKind::Int => {
                self.pos += 1;
                Ok(parse_int_literal(&tok.text, tok.span))
            }
            TokKind::Str => {
                self.pos += 1;
                Ok(Expr::StringLiteral { value: tok.text, span: tok.span, data_label: None })
            }
            TokKind::Punct if tok.is("(") => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            TokKind::Ident => self.parse_ident_primary(tok),
            _ => Err(ParseError { msg: format!("unexpected token '{}'", tok.text), span: tok.span }),
        }
    }

    fn parse_ident_primary(&mut self, tok: Token) -> PResult<Expr> {
        match tok.text.as_str() {
            "True" => {
                self.pos += 1;
                Ok(Expr::Boolean { value: true, span: tok.span })
            }
            "False" => {
                self.pos += 1;
                Ok(Expr::Boolean { value: false, span: tok.span })
            }
            "None" => {
                self.pos += 1;
                Ok(Expr::Unit { span: tok.span })
            }
            "type" => {
                self.pos += 1;
                self.expect_punct("(")?;
                let ex = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(Expr::GetType { ex: Box::new(ex), span: tok.span })
            }
            "print" => {
                self.pos += 1;
                let args = self.parse_call_args()?;
                Ok(Expr::Print { args, span: tok.span })
            }
            "input" => {
                self.pos += 1;
                let args = self.parse_call_args()?;
                Ok(Expr::Input { args, span: tok.span })
            }
            "add1" | "sub1" => {
                let op = if tok.text == "add1" { UnaryOp::Add1 } else { UnaryOp::Sub1 };
                self.pos += 1;
                self.expect_punct("(")?;
                let ex1 = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(Expr::Prim1 { op, ex1: Box::new(ex1), span: tok.span })
            }
            "let" => {
                self.pos += 1;
                self.expect_punct("(")?;
                let mut stmts = Vec::new();
                loop {
                    // A binding clause looks ahead for `name := expr,`;
                    // anything else at this position is the trailing body.
                    if self.toks.get(self.pos).is_some_and(|t| t.kind == TokKind::Ident)
                        && self.toks.get(self.pos + 1).is_some_and(|t| t.is(":="))
                    {
                        let name_tok = self.advance_ident()?;
                        if is_reserved(&name_tok.text) {
                            return Err(ParseError {
                                msg: format!("'{}' is a reserved keyword", name_tok.text),
                                span: name_tok.span,
                            });
                        }
                        self.pos += 1; // ':='
                        let init = self.parse_expr()?;
                        stmts.push(Stmt::Binding {
                            mutable: false,
                            name: name_tok.text,
                            init,
                            span: name_tok.span,
                            info: None,
                        });
                        self.expect_punct(",")?;
                    } else {
                        let body = self.parse_expr()?;
                        self.expect_punct(")")?;
                        return Ok(mk_expr_scope(stmts, body, tok.span));
                    }
                }
            }
            name if RuntimeFn::by_name(name).is_some() => {
                let rf = RuntimeFn::by_name(name).unwrap();
                self.pos += 1;
                let args = self.parse_call_args()?;
                // Arity is re-validated by the checker, not rejected here.
                Ok(Expr::RuntimeCall { func: rf, args, span: tok.span })
            }
            name if PrimType::by_name(name).is_some() => {
                self.pos += 1;
                Ok(Expr::TypeLiteral { ty: PrimType::by_name(name).unwrap(), span: tok.span })
            }
            name if is_reserved(name) => {
                Err(ParseError { msg: format!("'{name}' is a reserved keyword"), span: tok.span })
            }
            _ => {
                self.pos += 1;
                Ok(Expr::Name(NameRef { name: tok.text, span: tok.span, info: None }))
            }
        }
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.consume_punct(")") {
            loop {
                args.push(self.parse_expr()?);
                if self.consume_punct(")") {
                    break;
                }
                self.expect_punct(",")?;
            }
        }
        Ok(args)
    }
}

fn parse_int_literal(text: &str, span: Span) -> Expr {
    match text.parse::<i64>() {
        Ok(v) => Expr::Integer { value: v, oob: false, span },
        Err(_) => Expr::Integer { value: 0, oob: true, span },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Scope {
        parse(src).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    #[test]
    fn parses_print_int() {
        let scope = parse_ok("print(42)");
        assert_eq!(scope.statements.len(), 1);
        match &scope.statements[0] {
            Stmt::EvalExpr { expr: Expr::Print { args, .. }, .. } => {
                assert_eq!(args.len(), 1);
                assert!(matches!(args[0], Expr::Integer { value: 42, .. }));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_chained_additive_left_assoc() {
        let scope = parse_ok("print(1 + 2 + 3)");
        match &scope.statements[0] {
            Stmt::EvalExpr { expr: Expr::Print { args, .. }, .. } => {
                assert!(matches!(&args[0], Expr::Prim2 { op: BinOp::Add, .. }));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_val_binding_and_reference() {
        let scope = parse_ok("val(x := 2)\nval(y := x + x)\nprint(y * y)");
        assert_eq!(scope.statements.len(), 3);
        assert!(matches!(scope.statements[0], Stmt::Binding { mutable: false, .. }));
    }

    #[test]
    fn rejects_reserved_keyword_as_binding_target() {
        assert!(parse("val := 3").is_err());
    }

    #[test]
    fn rejects_chained_comparison() {
        assert!(parse("print(1 < 2 < 3)").is_err());
    }

    #[test]
    fn collapses_unary_minus_on_int_most_negative() {
        let scope = parse_ok("print(-9223372036854775808)");
        match &scope.statements[0] {
            Stmt::EvalExpr { expr: Expr::Print { args, .. }, .. } => {
                assert!(matches!(&args[0], Expr::Integer { value: i64::MIN, oob: false, .. }));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_if_while_blocks() {
        let src = "while x < y:\n    x = x + 1\nprint(x)";
        let scope = parse_ok(src);
        assert_eq!(scope.statements.len(), 2);
        assert!(matches!(scope.statements[0], Stmt::While { .. }));
    }

    #[test]
    fn parses_let_expression() {
        let scope = parse_ok("print(let(a := 1, b := 2, a + b))");
        match &scope.statements[0] {
            Stmt::EvalExpr { expr: Expr::Print { args, .. }, .. } => {
                assert!(matches!(&args[0], Expr::ExprScope { .. }));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn bare_assignment_statement() {
        let scope = parse_ok("x = 2");
        assert!(matches!(scope.statements[0], Stmt::Assignment { .. }));
    }
}
