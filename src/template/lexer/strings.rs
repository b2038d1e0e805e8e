//! String scanning for the template lexer
//!
//! Handles plain strings and f-strings. F-string fields are captured as raw text plus their
//! byte offset; the parser lexes them again in expression mode.

use super::Lexer;
use super::tokens::{FStringPart, Token, TokenKind};
use crate::template::ast::Conversion;

/// Result of processing an escape sequence
enum EscapeResult {
    Char(char),
    /// Unknown escape - preserve as-is (backslash + char)
    Unknown(char),
    Eof,
}

impl<'a> Lexer<'a> {
    /// Called after consuming the backslash.
    fn scan_text_escape(&mut self, quote: char) -> EscapeResult {
        match self.advance() {
            Some('n') => EscapeResult::Char('\n'),
            Some('t') => EscapeResult::Char('\t'),
            Some('r') => EscapeResult::Char('\r'),
            Some('\\') => EscapeResult::Char('\\'),
            Some(q) if q == quote => EscapeResult::Char(q),
            Some(c) => EscapeResult::Unknown(c),
            None => EscapeResult::Eof,
        }
    }

    /// Push the escaped character into `value`; returns false at end of input.
    fn push_escape(&mut self, quote: char, value: &mut String, start: usize) -> bool {
        match self.scan_text_escape(quote) {
            EscapeResult::Char(c) => value.push(c),
            EscapeResult::Unknown(c) => {
                value.push('\\');
                value.push(c);
            }
            EscapeResult::Eof => {
                self.error("Unterminated escape sequence", start);
                return false;
            }
        }
        true
    }

    pub(super) fn scan_string(&mut self, start: usize, quote: char) {
        let mut value = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("Unterminated string", start);
                    break;
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if !self.push_escape(quote, &mut value, start) {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        let at = self.span(start, self.current_pos);
        self.tokens.push(Token::new(TokenKind::String(value), at));
    }

    pub(super) fn scan_fstring(&mut self, start: usize, quote: char) {
        let mut parts = Vec::new();
        let mut literal = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("Unterminated f-string", start);
                    break;
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('{') => {
                    self.advance();
                    if self.peek() == Some('{') {
                        self.advance();
                        literal.push('{');
                        continue;
                    }
                    if !literal.is_empty() {
                        parts.push(FStringPart::Literal(std::mem::take(&mut literal)));
                    }
                    match self.scan_fstring_field(quote) {
                        Some(part) => parts.push(part),
                        None => break,
                    }
                }
                Some('}') => {
                    let brace = self.current_pos;
                    self.advance();
                    if self.peek() == Some('}') {
                        self.advance();
                        literal.push('}');
                    } else {
                        self.error("Single '}' is not allowed in an f-string", brace);
                    }
                }
                Some('\\') => {
                    self.advance();
                    if !self.push_escape(quote, &mut literal, start) {
                        break;
                    }
                }
                Some(c) => {
                    literal.push(c);
                    self.advance();
                }
            }
        }

        if !literal.is_empty() {
            parts.push(FStringPart::Literal(literal));
        }

        let at = self.span(start, self.current_pos);
        self.tokens.push(Token::new(TokenKind::FString(parts), at));
    }

    /// Scan `expr[=][!r|!s]}` after an opening brace.
    fn scan_fstring_field(&mut self, quote: char) -> Option<FStringPart> {
        let field_start = self.current_pos;
        let mut text = String::new();
        let mut depth = 0usize;

        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("Unterminated f-string field", field_start);
                    return None;
                }
                Some(c) if c == quote => {
                    self.error("Unterminated f-string field", field_start);
                    return None;
                }
                Some('}') if depth == 0 => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    match c {
                        '(' => depth += 1,
                        ')' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    text.push(c);
                    self.advance();
                }
            }
        }

        let (body, explicit) = if let Some(rest) = text.strip_suffix("!r") {
            (rest, Some(Conversion::Repr))
        } else if let Some(rest) = text.strip_suffix("!s") {
            (rest, Some(Conversion::Str))
        } else {
            (text.as_str(), None)
        };

        let trimmed = body.trim_end();
        let labelled = trimmed.ends_with('=') && !trimmed.ends_with("==");
        let expr = if labelled { &trimmed[..trimmed.len() - 1] } else { body };

        if expr.trim().is_empty() {
            self.error("Empty expression in f-string field", field_start);
            return None;
        }

        // Labelled fields default to repr, like `f"{x=}"`.
        let conversion = explicit.unwrap_or(if labelled { Conversion::Repr } else { Conversion::Str });

        Some(FStringPart::Expr {
            source: expr.to_string(),
            offset: self.base + field_start,
            labelled,
            conversion,
        })
    }
}
