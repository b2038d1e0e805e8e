//! Lexer for the template language
//!
//! Handles tokenization including:
//! - Keywords (`def`, `return`, `yield`, `if`, `else`, `pass`, `is`, literals)
//! - Identifiers, decimal integers, strings, and f-strings
//! - Python-style indentation (INDENT/DEDENT tokens)
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, FStringPart)
//! - `strings` - String/f-string scanning
//! - `indent` - INDENT/DEDENT handling

mod indent;
mod strings;
pub mod tokens;

pub use tokens::{FStringPart, Token, TokenKind};

use crate::template::ast::Span;
use crate::template::diagnostics::TemplateError;
use tokens::KEYWORDS;

/// Lexer for template source.
///
/// Spans are reported relative to `base`, so f-string fields lexed on their own still point
/// into the enclosing template source.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    base: usize,
    current_pos: usize,
    indent_stack: Vec<usize>,
    pending_dedents: usize,
    at_line_start: bool,
    /// Expression mode: no NEWLINE/INDENT/DEDENT tokens (f-string fields).
    expression: bool,
    /// Bracket depth for implicit line continuation
    bracket_depth: usize,
    tokens: Vec<Token>,
    errors: Vec<TemplateError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for a whole template.
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            base: 0,
            current_pos: 0,
            indent_stack: vec![0],
            pending_dedents: 0,
            at_line_start: true,
            expression: false,
            bracket_depth: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Create a lexer for a single expression found at byte `base` of the enclosing source.
    pub fn expression(source: &'a str, base: usize) -> Self {
        Self {
            base,
            at_line_start: false,
            expression: true,
            ..Self::new(source)
        }
    }

    /// Tokenize the entire source.
    ///
    /// The token stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<TemplateError>> {
        while !self.is_at_end() || self.pending_dedents > 0 {
            self.scan_token();
        }

        if !self.expression {
            if !self.at_line_start && !matches!(self.tokens.last().map(|t| &t.kind), Some(TokenKind::Newline) | None) {
                let at = self.span(self.current_pos, self.current_pos);
                self.tokens.push(Token::new(TokenKind::Newline, at));
            }
            while self.indent_stack.len() > 1 {
                self.indent_stack.pop();
                let at = self.span(self.current_pos, self.current_pos);
                self.tokens.push(Token::new(TokenKind::Dedent, at));
            }
        }

        let at = self.span(self.current_pos, self.current_pos);
        self.tokens.push(Token::new(TokenKind::Eof, at));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    /// Span in the coordinates of the enclosing source.
    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.base + start, self.base + end)
    }

    fn error(&mut self, message: impl Into<String>, start: usize) {
        let at = self.span(start, self.current_pos);
        self.errors.push(TemplateError::lexical(message, at));
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            let at = self.span(self.current_pos, self.current_pos);
            self.tokens.push(Token::new(TokenKind::Dedent, at));
            return;
        }

        if self.at_line_start {
            self.handle_indentation();
            return;
        }

        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }

        let start = self.current_pos;

        let Some(c) = self.advance() else {
            return;
        };

        match c {
            '#' => {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            }

            '\n' => {
                if self.bracket_depth > 0 || self.expression {
                    return;
                }
                self.add_token(TokenKind::Newline, start);
                self.at_line_start = true;
            }

            ',' => self.add_token(TokenKind::Comma, start),
            '.' => self.add_token(TokenKind::Dot, start),
            ':' => self.add_token(TokenKind::Colon, start),
            '(' => {
                self.bracket_depth += 1;
                self.add_token(TokenKind::LParen, start);
            }
            ')' => {
                if self.bracket_depth == 0 {
                    self.error("Unmatched closing bracket", start);
                } else {
                    self.bracket_depth -= 1;
                }
                self.add_token(TokenKind::RParen, start);
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.add_token(TokenKind::EqEq, start);
                } else {
                    self.add_token(TokenKind::Eq, start);
                }
            }

            '"' => self.scan_string(start, '"'),
            '\'' => self.scan_string(start, '\''),

            'f' if matches!(self.peek(), Some('"' | '\'')) => {
                if let Some(quote) = self.advance() {
                    self.scan_fstring(start, quote);
                }
            }

            '0'..='9' => self.scan_number(start, c),

            _ if is_ident_start(c) => self.scan_identifier(start, c),

            _ => self.error(format!("Unexpected character '{}'", c), start),
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        let at = self.span(start, self.current_pos);
        self.tokens.push(Token::new(kind, at));
    }

    fn scan_number(&mut self, start: usize, first: char) {
        let mut digits = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                if c != '_' {
                    digits.push(c);
                }
                self.advance();
            } else {
                break;
            }
        }
        match digits.parse::<i64>() {
            Ok(value) => self.add_token(TokenKind::Int(value), start),
            Err(_) => self.error(format!("Integer literal out of range: {}", digits), start),
        }
    }

    fn scan_identifier(&mut self, start: usize, first: char) {
        let mut name = String::from(first);

        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = KEYWORDS.get(name.as_str()).cloned().unwrap_or(TokenKind::Ident(name));
        self.add_token(kind, start);
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier (ASCII-only).
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check whether `name` is a valid template identifier that is not a reserved word.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_continue) && !KEYWORDS.contains_key(name),
        _ => false,
    }
}

/// Convenience function to lex a whole template.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<TemplateError>> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================
