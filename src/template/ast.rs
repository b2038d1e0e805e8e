//! Syntax tree of the template language.
//!
//! A template is exactly one method definition. The tree is deliberately small: the
//! generators only need attribute stores, returns, yields, one `if`/`else`, tuples, calls,
//! comparisons, and f-strings.

/// Byte range into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A node paired with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A parsed `def name(params): body`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Vec<Spanned<Stmt>>,
}

impl MethodDef {
    /// True if any statement (at any depth) is a `yield`.
    pub fn is_generator(&self) -> bool {
        fn any_yield(body: &[Spanned<Stmt>]) -> bool {
            body.iter().any(|s| match &s.node {
                Stmt::Yield(_) => true,
                Stmt::If { then_body, else_body, .. } => any_yield(then_body) || any_yield(else_body),
                _ => false,
            })
        }
        any_yield(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Return(Option<Expr>),
    Yield(Option<Expr>),
    /// `name = value`
    Assign { name: Spanned<String>, value: Expr },
    /// `target.attr = value`
    AssignAttr { target: Expr, attr: Spanned<String>, value: Expr },
    If {
        cond: Expr,
        then_body: Vec<Spanned<Stmt>>,
        else_body: Vec<Spanned<Stmt>>,
    },
    Pass,
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Name(String),
    Attr(Box<Expr>, Spanned<String>),
    Call(Box<Expr>, Vec<Expr>),
    Tuple(Vec<Expr>),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    FString(Vec<FStringSegment>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Is,
}

/// How an f-string field renders its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// `!s`, the default for unlabelled fields.
    Str,
    /// `!r`, the default for labelled fields.
    Repr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FStringSegment {
    Literal(String),
    /// `{expr}`; `labelled` is the `{obj.attr=}` form, which prefixes the attribute name.
    Field {
        expr: Expr,
        labelled: bool,
        conversion: Conversion,
    },
}
