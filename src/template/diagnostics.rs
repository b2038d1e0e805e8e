//! Diagnostics for the template language.
//!
//! [`TemplateError`] is the plain error value passed around by the lexer, parser, and compiler.
//! [`TemplateReport`] attaches the offending source so `miette` can render a labelled snippet.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use super::ast::Span;

/// A template lexing, parsing, or compiling error with location information.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct TemplateError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub hints: Vec<String>,
}

impl TemplateError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            hints: Vec::new(),
        }
    }

    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Lexical, message, span)
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, span)
    }

    pub fn compile(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Compile, message, span)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Attach the source text for rendering.
    pub fn to_report(&self, name: &str, source: &str) -> TemplateReport {
        let len = self.span.end.saturating_sub(self.span.start);
        TemplateReport {
            message: self.to_string(),
            src: NamedSource::new(name, source.to_string()),
            at: (self.span.start, len).into(),
            help: (!self.hints.is_empty()).then(|| self.hints.join("\n")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Compile,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lexical error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Compile => write!(f, "compile error"),
        }
    }
}

/// A [`TemplateError`] bundled with its source, renderable through `miette`.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(dataklass::template))]
pub struct TemplateReport {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    at: SourceSpan,
    #[help]
    help: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        let err = TemplateError::syntax("expected ':'", Span::new(3, 4));
        assert_eq!(err.to_string(), "syntax error: expected ':'");
    }

    #[test]
    fn report_carries_hints_as_help() {
        let err = TemplateError::compile("unknown name 'z'", Span::new(0, 1)).with_hint("declare it as a parameter");
        let report = err.to_report("<template>", "z");
        assert_eq!(report.help.as_deref(), Some("declare it as a parameter"));
        assert_eq!(report.at.offset(), 0);
        assert_eq!(report.at.len(), 1);
    }
}
