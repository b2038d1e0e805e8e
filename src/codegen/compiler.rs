//! Template compiler: [`MethodDef`] to [`CodeObject`].
//!
//! Single pass over the tree with a pre-scan for locals. Name resolution:
//!
//! 1. parameters and assigned names are locals (`varnames`, `LOAD_FAST`);
//! 2. otherwise a name must be a registered builtin (`names`, `LOAD_GLOBAL`);
//! 3. anything else is a compile error.
//!
//! Attribute names share the `names` table with globals. Constants are de-duplicated in order of
//! first use. Every body ends with an implicit `return None`.

use std::sync::Arc;

use indexmap::IndexSet;

use dataklass_core::lang::builtins;

use super::code::{CodeObject, Const, Instr, Symbol};
use crate::template::ast::{CmpOp, Expr, ExprKind, FStringSegment, MethodDef, Spanned, Stmt};
use crate::template::diagnostics::TemplateError;
use crate::template::parse_source;

type CResult<T> = Result<T, TemplateError>;

struct Compiler {
    instructions: Vec<Instr>,
    consts: Vec<Const>,
    names: IndexSet<Symbol>,
    varnames: IndexSet<Symbol>,
}

impl Compiler {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            consts: Vec::new(),
            names: IndexSet::new(),
            varnames: IndexSet::new(),
        }
    }

    fn emit(&mut self, instr: Instr) -> usize {
        self.instructions.push(instr);
        self.instructions.len() - 1
    }

    fn patch_jump(&mut self, at: usize) {
        let target = self.instructions.len();
        match &mut self.instructions[at] {
            Instr::PopJumpIfFalse(t) | Instr::Jump(t) => *t = target,
            other => unreachable!("INVARIANT: patching non-jump instruction {:?}", other),
        }
    }

    fn const_index(&mut self, value: Const) -> usize {
        if let Some(idx) = self.consts.iter().position(|c| *c == value) {
            return idx;
        }
        self.consts.push(value);
        self.consts.len() - 1
    }

    fn name_index(&mut self, name: &str) -> usize {
        self.names.insert_full(Symbol::from(name)).0
    }

    fn load_const(&mut self, value: Const) {
        let idx = self.const_index(value);
        self.emit(Instr::LoadConst(idx));
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn block(&mut self, body: &[Spanned<Stmt>]) -> CResult<()> {
        for stmt in body {
            self.stmt(&stmt.node)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> CResult<()> {
        match stmt {
            Stmt::Return(value) => {
                self.optional_expr(value.as_ref())?;
                self.emit(Instr::ReturnValue);
            }
            Stmt::Yield(value) => {
                self.optional_expr(value.as_ref())?;
                self.emit(Instr::YieldValue);
            }
            Stmt::Assign { name, value } => {
                self.expr(value)?;
                let idx = self
                    .varnames
                    .get_index_of(name.node.as_str())
                    .expect("INVARIANT: assigned names are collected before compiling");
                self.emit(Instr::StoreFast(idx));
            }
            Stmt::AssignAttr { target, attr, value } => {
                self.expr(value)?;
                self.expr(target)?;
                let idx = self.name_index(&attr.node);
                self.emit(Instr::StoreAttr(idx));
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.expr(cond)?;
                let to_else = self.emit(Instr::PopJumpIfFalse(0));
                self.block(then_body)?;
                if else_body.is_empty() {
                    self.patch_jump(to_else);
                } else {
                    let to_end = self.emit(Instr::Jump(0));
                    self.patch_jump(to_else);
                    self.block(else_body)?;
                    self.patch_jump(to_end);
                }
            }
            Stmt::Pass => {}
            Stmt::Expr(expr) => {
                self.expr(expr)?;
                self.emit(Instr::Pop);
            }
        }
        Ok(())
    }

    fn optional_expr(&mut self, value: Option<&Expr>) -> CResult<()> {
        match value {
            Some(expr) => self.expr(expr),
            None => {
                self.load_const(Const::None);
                Ok(())
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Expr) -> CResult<()> {
        match &expr.kind {
            ExprKind::Name(name) => self.load_name(name, expr)?,
            ExprKind::Attr(obj, attr) => {
                self.expr(obj)?;
                let idx = self.name_index(&attr.node);
                self.emit(Instr::LoadAttr(idx));
            }
            ExprKind::Call(callee, args) => {
                self.expr(callee)?;
                for arg in args {
                    self.expr(arg)?;
                }
                self.emit(Instr::Call(args.len()));
            }
            ExprKind::Tuple(items) => {
                for item in items {
                    self.expr(item)?;
                }
                self.emit(Instr::BuildTuple(items.len()));
            }
            ExprKind::Compare(lhs, op, rhs) => {
                self.expr(lhs)?;
                self.expr(rhs)?;
                self.emit(match op {
                    CmpOp::Eq => Instr::CompareEq,
                    CmpOp::Is => Instr::CompareIs,
                });
            }
            ExprKind::Str(s) => self.load_const(Const::Str(Symbol::from(s.as_str()))),
            ExprKind::Int(v) => self.load_const(Const::Int(*v)),
            ExprKind::Bool(b) => self.load_const(Const::Bool(*b)),
            ExprKind::None => self.load_const(Const::None),
            ExprKind::FString(segments) => self.fstring(segments)?,
        }
        Ok(())
    }

    fn load_name(&mut self, name: &str, expr: &Expr) -> CResult<()> {
        if let Some(idx) = self.varnames.get_index_of(name) {
            self.emit(Instr::LoadFast(idx));
            return Ok(());
        }
        if builtins::from_str(name).is_some() {
            let idx = self.name_index(name);
            self.emit(Instr::LoadGlobal(idx));
            return Ok(());
        }
        let known: Vec<&str> = builtins::BUILTINS.iter().map(|b| b.canonical).collect();
        Err(TemplateError::compile(format!("unknown name '{}'", name), expr.span)
            .with_hint(format!("declare it as a parameter or use one of: {}", known.join(", "))))
    }

    fn fstring(&mut self, segments: &[FStringSegment]) -> CResult<()> {
        let mut pieces = 0;
        for segment in segments {
            match segment {
                FStringSegment::Literal(text) => {
                    self.load_const(Const::Str(Symbol::from(text.as_str())));
                }
                FStringSegment::Field {
                    expr,
                    labelled,
                    conversion,
                } => {
                    if *labelled {
                        let ExprKind::Attr(_, attr) = &expr.kind else {
                            return Err(TemplateError::compile(
                                "a labelled f-string field must be an attribute access",
                                expr.span,
                            ));
                        };
                        let idx = self.name_index(&attr.node);
                        self.emit(Instr::LabelAttr(idx));
                        pieces += 1;
                    }
                    self.expr(expr)?;
                    self.emit(Instr::FormatValue(*conversion));
                }
            }
            pieces += 1;
        }
        self.emit(Instr::BuildString(pieces));
        Ok(())
    }
}

/// Collect names bound by `name = value` in source order.
fn assigned_names<'a>(body: &'a [Spanned<Stmt>], out: &mut Vec<&'a str>) {
    for stmt in body {
        match &stmt.node {
            Stmt::Assign { name, .. } => out.push(&name.node),
            Stmt::If {
                then_body, else_body, ..
            } => {
                assigned_names(then_body, out);
                assigned_names(else_body, out);
            }
            _ => {}
        }
    }
}

/// Compile a parsed method definition.
pub fn compile_def(def: &MethodDef) -> Result<CodeObject, TemplateError> {
    let mut compiler = Compiler::new();
    for param in &def.params {
        compiler.varnames.insert(Symbol::from(param.node.as_str()));
    }
    let mut locals = Vec::new();
    assigned_names(&def.body, &mut locals);
    for local in locals {
        compiler.varnames.insert(Symbol::from(local));
    }

    compiler.block(&def.body)?;
    compiler.load_const(Const::None);
    compiler.emit(Instr::ReturnValue);

    Ok(CodeObject {
        name: Symbol::from(def.name.node.as_str()),
        argcount: def.params.len(),
        is_generator: def.is_generator(),
        instructions: Arc::from(compiler.instructions),
        consts: Arc::from(compiler.consts),
        names: compiler.names.into_iter().collect(),
        varnames: compiler.varnames.into_iter().collect(),
    })
}

/// Lex, parse, and compile template source.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn compile(source: &str) -> Result<CodeObject, TemplateError> {
    let def = parse_source(source)?;
    let code = compile_def(&def)?;
    tracing::trace!(
        name = %code.name,
        instructions = code.instructions.len(),
        names = code.names.len(),
        "compiled template"
    );
    Ok(code)
}
