//! Indentation handling for the template lexer
//!
//! Implements Python-style INDENT/DEDENT tokens.

use super::Lexer;
use super::tokens::{Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(super) fn handle_indentation(&mut self) {
        let start = self.current_pos;
        let mut indent = 0;

        while let Some(c) = self.peek() {
            match c {
                ' ' => {
                    indent += 1;
                    self.advance();
                }
                '\t' => {
                    indent += 4;
                    self.advance();
                }
                '#' => {
                    // Comment line - skip to end
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    return;
                }
                '\n' => {
                    // Blank line
                    self.advance();
                    return;
                }
                '\r' => {
                    self.advance();
                }
                _ => break,
            }
        }

        if self.is_at_end() {
            self.at_line_start = false;
            return;
        }

        let current_indent = *self.indent_stack.last().unwrap_or(&0);

        if indent > current_indent {
            self.indent_stack.push(indent);
            let at = self.span(start, self.current_pos);
            self.tokens.push(Token::new(TokenKind::Indent, at));
        } else if indent < current_indent {
            let mut count = 0;
            while let Some(&top) = self.indent_stack.last() {
                if indent >= top {
                    break;
                }
                self.indent_stack.pop();
                count += 1;
            }
            if self.indent_stack.is_empty() {
                self.indent_stack.push(0);
            }

            let final_indent = *self.indent_stack.last().unwrap_or(&0);
            if indent != final_indent {
                self.error(
                    format!("Inconsistent indentation: expected {} spaces, got {}", final_indent, indent),
                    start,
                );
            }

            if count > 0 {
                let at = self.span(start, self.current_pos);
                self.tokens.push(Token::new(TokenKind::Dedent, at));
                self.pending_dedents = count - 1;
            }
        }

        self.at_line_start = false;
    }
}
