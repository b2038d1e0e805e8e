//! Token types for the template lexer

use phf::phf_map;

use crate::template::ast::{Conversion, Span};

/// Token types for the template language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keywords ==========
    Def,
    Return,
    Yield,
    If,
    Else,
    Pass,
    Is,
    None,
    True,
    False,

    // ========== Identifiers and Literals ==========
    Ident(String),
    Int(i64),
    String(String),
    FString(Vec<FStringPart>),

    // ========== Operators / punctuation ==========
    Eq,     // =
    EqEq,   // ==
    Dot,    // .
    Comma,  // ,
    Colon,  // :
    LParen, // (
    RParen, // )

    // ========== Indentation ==========
    Newline,
    Indent,
    Dedent,

    Eof,
}

/// Part of an f-string
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    Literal(String),
    /// Raw field expression text; the parser lexes it again starting at `offset`.
    Expr {
        source: String,
        offset: usize,
        labelled: bool,
        conversion: Conversion,
    },
}

/// Keyword lookup table (perfect hash, built at compile time).
///
/// Spellings mirror `dataklass_core::lang::keywords`; a unit test keeps the two in sync.
pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "def" => TokenKind::Def,
    "return" => TokenKind::Return,
    "yield" => TokenKind::Yield,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "pass" => TokenKind::Pass,
    "is" => TokenKind::Is,
    "None" => TokenKind::None,
    "True" => TokenKind::True,
    "False" => TokenKind::False,
};

/// A token with its kind and span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
