//! Recursive-descent parser for the template language.
//!
//! ```text
//! template  := NEWLINE* "def" IDENT "(" [IDENT ("," IDENT)* [","]] ")" ":" block EOF
//! block     := NEWLINE INDENT stmt+ DEDENT | simple
//! stmt      := "if" expr ":" block ["else" ":" block] | simple
//! simple    := ("return" [expr] | "yield" [expr] | "pass" | expr ["=" expr]) NEWLINE
//! expr      := postfix [("==" | "is") postfix]
//! postfix   := atom ("." IDENT | "(" [expr ("," expr)* [","]] ")")*
//! atom      := IDENT | INT | STRING | FSTRING | "None" | "True" | "False" | "(" tuple-or-group ")"
//! ```

use super::ast::{CmpOp, Expr, ExprKind, FStringSegment, MethodDef, Span, Spanned, Stmt};
use super::diagnostics::TemplateError;
use super::lexer::{FStringPart, Lexer, Token, TokenKind};

type PResult<T> = Result<T, TemplateError>;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn peek(&self) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> PResult<&'a Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            Err(TemplateError::syntax(
                format!("expected {}, found {}", what, describe(&found.kind)),
                found.span,
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<Spanned<String>> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Spanned::new(name.clone(), token.span))
            }
            other => Err(TemplateError::syntax(
                format!("expected {}, found {}", what, describe(other)),
                token.span,
            )),
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    // ========================================================================
    // Definitions and statements
    // ========================================================================

    pub fn parse_method(&mut self) -> PResult<MethodDef> {
        self.skip_newlines();
        self.expect(&TokenKind::Def, "'def'")?;
        let name = self.expect_ident("method name")?;
        self.expect(&TokenKind::LParen, "'('")?;

        let mut params: Vec<Spanned<String>> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let param = self.expect_ident("parameter name")?;
            if params.iter().any(|p| p.node == param.node) {
                return Err(TemplateError::syntax(
                    format!("duplicate parameter '{}'", param.node),
                    param.span,
                ));
            }
            params.push(param);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect(&TokenKind::Colon, "':'")?;

        let body = self.parse_block()?;

        self.skip_newlines();
        let trailing = self.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(TemplateError::syntax("a template holds exactly one method definition", trailing.span)
                .with_hint("split additional methods into their own templates"));
        }

        Ok(MethodDef { name, params, body })
    }

    fn parse_block(&mut self) -> PResult<Vec<Spanned<Stmt>>> {
        if !self.eat(&TokenKind::Newline) {
            return Ok(vec![self.parse_simple()?]);
        }
        self.skip_newlines();
        self.expect(&TokenKind::Indent, "an indented block")?;

        let mut body = Vec::new();
        while !self.check(&TokenKind::Dedent) && !self.check(&TokenKind::Eof) {
            body.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        self.eat(&TokenKind::Dedent);
        Ok(body)
    }

    fn parse_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        if self.check(&TokenKind::If) {
            let start = self.advance().span;
            let cond = self.parse_expr()?;
            self.expect(&TokenKind::Colon, "':'")?;
            let then_body = self.parse_block()?;
            let else_body = if self.eat(&TokenKind::Else) {
                self.expect(&TokenKind::Colon, "':'")?;
                self.parse_block()?
            } else {
                Vec::new()
            };
            let end = else_body
                .last()
                .or(then_body.last())
                .map(|s| s.span)
                .unwrap_or(cond.span);
            return Ok(Spanned::new(
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                },
                start.to(end),
            ));
        }
        self.parse_simple()
    }

    fn parse_simple(&mut self) -> PResult<Spanned<Stmt>> {
        let start = self.peek().span;
        let stmt = match &self.peek().kind {
            TokenKind::Return => {
                self.advance();
                Stmt::Return(self.parse_optional_expr()?)
            }
            TokenKind::Yield => {
                self.advance();
                Stmt::Yield(self.parse_optional_expr()?)
            }
            TokenKind::Pass => {
                self.advance();
                Stmt::Pass
            }
            _ => {
                let expr = self.parse_expr()?;
                if self.eat(&TokenKind::Eq) {
                    let value = self.parse_expr()?;
                    assignment(expr, value)?
                } else {
                    Stmt::Expr(expr)
                }
            }
        };
        let end = self.tokens[self.pos.saturating_sub(1)].span;
        self.end_of_statement()?;
        Ok(Spanned::new(stmt, start.to(end)))
    }

    fn parse_optional_expr(&mut self) -> PResult<Option<Expr>> {
        if matches!(self.peek().kind, TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof) {
            Ok(None)
        } else {
            self.parse_expr().map(Some)
        }
    }

    fn end_of_statement(&mut self) -> PResult<()> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Dedent | TokenKind::Eof => Ok(()),
            ref other => Err(TemplateError::syntax(
                format!("expected end of statement, found {}", describe(other)),
                self.peek().span,
            )),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn parse_expr(&mut self) -> PResult<Expr> {
        let lhs = self.parse_postfix()?;
        let op = match self.peek().kind {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::Is => CmpOp::Is,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_postfix()?;
        let span = lhs.span.to(rhs.span);
        Ok(Expr::new(ExprKind::Compare(Box::new(lhs), op, Box::new(rhs)), span))
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_atom()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let attr = self.expect_ident("attribute name")?;
                let span = expr.span.to(attr.span);
                expr = Expr::new(ExprKind::Attr(Box::new(expr), attr), span);
            } else if self.check(&TokenKind::LParen) {
                self.advance();
                let (args, _) = self.parse_sequence()?;
                let close = self.expect(&TokenKind::RParen, "')'")?;
                let span = expr.span.to(close.span);
                expr = Expr::new(ExprKind::Call(Box::new(expr), args), span);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma-separated expressions up to (not including) `)`; reports a trailing comma.
    fn parse_sequence(&mut self) -> PResult<(Vec<Expr>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        while !self.check(&TokenKind::RParen) {
            items.push(self.parse_expr()?);
            trailing_comma = self.eat(&TokenKind::Comma);
            if !trailing_comma {
                break;
            }
        }
        Ok((items, trailing_comma))
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let token = self.advance();
        let span = token.span;
        let kind = match &token.kind {
            TokenKind::Ident(name) => ExprKind::Name(name.clone()),
            TokenKind::Int(v) => ExprKind::Int(*v),
            TokenKind::String(s) => ExprKind::Str(s.clone()),
            TokenKind::None => ExprKind::None,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::FString(parts) => ExprKind::FString(parse_fstring(parts)?),
            TokenKind::LParen => {
                let (mut items, trailing_comma) = self.parse_sequence()?;
                let close = self.expect(&TokenKind::RParen, "')'")?;
                let span = span.to(close.span);
                if items.len() == 1 && !trailing_comma {
                    let mut inner = items.remove(0);
                    inner.span = span;
                    return Ok(inner);
                }
                return Ok(Expr::new(ExprKind::Tuple(items), span));
            }
            other => {
                return Err(TemplateError::syntax(
                    format!("expected an expression, found {}", describe(other)),
                    span,
                ));
            }
        };
        Ok(Expr::new(kind, span))
    }
}

fn assignment(target: Expr, value: Expr) -> PResult<Stmt> {
    match target.kind {
        ExprKind::Name(name) => Ok(Stmt::Assign {
            name: Spanned::new(name, target.span),
            value,
        }),
        ExprKind::Attr(obj, attr) => Ok(Stmt::AssignAttr {
            target: *obj,
            attr,
            value,
        }),
        _ => Err(TemplateError::syntax("cannot assign to this expression", target.span)
            .with_hint("only names and attributes can be assigned")),
    }
}

fn parse_fstring(parts: &[FStringPart]) -> PResult<Vec<FStringSegment>> {
    parts
        .iter()
        .map(|part| match part {
            FStringPart::Literal(text) => Ok(FStringSegment::Literal(text.clone())),
            FStringPart::Expr {
                source,
                offset,
                labelled,
                conversion,
            } => {
                let tokens = Lexer::expression(source, *offset)
                    .tokenize()
                    .map_err(|mut errors| errors.remove(0))?;
                let mut parser = Parser::new(&tokens);
                let expr = parser.parse_expr()?;
                let rest = parser.peek();
                if rest.kind != TokenKind::Eof {
                    return Err(TemplateError::syntax(
                        format!("unexpected {} in f-string field", describe(&rest.kind)),
                        rest.span,
                    ));
                }
                if *labelled && !matches!(expr.kind, ExprKind::Attr(..)) {
                    return Err(
                        TemplateError::syntax("a labelled f-string field must be an attribute access", expr.span)
                            .with_hint("write `{obj.attr=}`"),
                    );
                }
                Ok(FStringSegment::Field {
                    expr,
                    labelled: *labelled,
                    conversion: *conversion,
                })
            }
        })
        .collect()
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(name) => format!("identifier '{}'", name),
        TokenKind::Int(v) => format!("integer {}", v),
        TokenKind::String(_) => "string literal".to_string(),
        TokenKind::FString(_) => "f-string".to_string(),
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Indent => "indent".to_string(),
        TokenKind::Dedent => "dedent".to_string(),
        TokenKind::Eof => "end of template".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

/// Parse a token stream into a method definition.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Result<MethodDef, TemplateError> {
    if tokens.is_empty() {
        return Err(TemplateError::syntax("empty template", Span::default()));
    }
    Parser::new(tokens).parse_method()
}
