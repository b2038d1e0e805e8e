//! Compiled code objects.
//!
//! A [`CodeObject`] is the output of compiling one template: a flat instruction stream, a
//! constant pool, and two name tables. Instructions refer to names only by index, which is what
//! makes specialization possible: swapping the tables renames every attribute and parameter
//! without touching the instructions.
//!
//! ## Name tables
//!
//! - `names`: attribute names and builtin globals, in order of first appearance.
//! - `varnames`: parameters (in declaration order), then locals.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use crate::template::ast::Conversion;

/// Interned identifier shared between code objects.
pub type Symbol = Arc<str>;

/// Constant pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Const {
    None,
    Bool(bool),
    Int(i64),
    Str(Symbol),
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::None => f.write_str("None"),
            Const::Bool(true) => f.write_str("True"),
            Const::Bool(false) => f.write_str("False"),
            Const::Int(v) => write!(f, "{}", v),
            Const::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        }
    }
}

/// One VM instruction.
///
/// Jump targets are absolute instruction indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instr {
    /// Push `varnames[i]`.
    LoadFast(usize),
    /// Pop into `varnames[i]`.
    StoreFast(usize),
    LoadConst(usize),
    /// Push the builtin named `names[i]`.
    LoadGlobal(usize),
    /// Replace TOS with `TOS.<names[i]>`.
    LoadAttr(usize),
    /// Pop the object, then the value; store `obj.<names[i]> = value`.
    StoreAttr(usize),
    /// Push the string `"<names[i]>="`, the label of an `{obj.attr=}` f-string field.
    LabelAttr(usize),
    /// Pop `n` arguments and the callee; push the result.
    Call(usize),
    BuildTuple(usize),
    /// Pop `n` strings and push their concatenation.
    BuildString(usize),
    FormatValue(Conversion),
    CompareEq,
    CompareIs,
    PopJumpIfFalse(usize),
    Jump(usize),
    Pop,
    ReturnValue,
    /// Pop TOS and suspend the generator frame with it.
    YieldValue,
}

impl Instr {
    /// Upper-case mnemonic used by [`CodeObject::disassemble`].
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::LoadFast(_) => "LOAD_FAST",
            Instr::StoreFast(_) => "STORE_FAST",
            Instr::LoadConst(_) => "LOAD_CONST",
            Instr::LoadGlobal(_) => "LOAD_GLOBAL",
            Instr::LoadAttr(_) => "LOAD_ATTR",
            Instr::StoreAttr(_) => "STORE_ATTR",
            Instr::LabelAttr(_) => "LABEL_ATTR",
            Instr::Call(_) => "CALL",
            Instr::BuildTuple(_) => "BUILD_TUPLE",
            Instr::BuildString(_) => "BUILD_STRING",
            Instr::FormatValue(_) => "FORMAT_VALUE",
            Instr::CompareEq => "COMPARE_EQ",
            Instr::CompareIs => "COMPARE_IS",
            Instr::PopJumpIfFalse(_) => "POP_JUMP_IF_FALSE",
            Instr::Jump(_) => "JUMP",
            Instr::Pop => "POP_TOP",
            Instr::ReturnValue => "RETURN_VALUE",
            Instr::YieldValue => "YIELD_VALUE",
        }
    }
}

/// A compiled method body.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeObject {
    pub name: Symbol,
    /// Number of leading `varnames` entries that are parameters (including `self`).
    pub argcount: usize,
    pub is_generator: bool,
    pub instructions: Arc<[Instr]>,
    pub consts: Arc<[Const]>,
    pub names: Arc<[Symbol]>,
    pub varnames: Arc<[Symbol]>,
}

impl CodeObject {
    /// Parameter names, `self` first.
    pub fn params(&self) -> &[Symbol] {
        &self.varnames[..self.argcount]
    }

    /// Number of local slots a frame needs.
    pub fn nlocals(&self) -> usize {
        self.varnames.len()
    }

    /// Copy of this code object with new name tables.
    ///
    /// The instruction stream and constant pool are shared with `self`, not cloned.
    ///
    /// ## Panics
    ///
    /// - If a table changes length (`INVARIANT:`); instructions index into them.
    pub fn replace_names(&self, names: Arc<[Symbol]>, varnames: Arc<[Symbol]>) -> CodeObject {
        assert_eq!(
            names.len(),
            self.names.len(),
            "INVARIANT: replacement names table must keep its length"
        );
        assert_eq!(
            varnames.len(),
            self.varnames.len(),
            "INVARIANT: replacement varnames table must keep its length"
        );
        CodeObject {
            name: Arc::clone(&self.name),
            argcount: self.argcount,
            is_generator: self.is_generator,
            instructions: Arc::clone(&self.instructions),
            consts: Arc::clone(&self.consts),
            names,
            varnames,
        }
    }

    /// True if both code objects use the very same instruction and constant allocations.
    pub fn shares_code_with(&self, other: &CodeObject) -> bool {
        Arc::ptr_eq(&self.instructions, &other.instructions) && Arc::ptr_eq(&self.consts, &other.consts)
    }

    /// Human-readable listing, one instruction per line, followed by the tables.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} (argcount={}{})", self.name, self.argcount, if self.is_generator { ", generator" } else { "" });
        for (idx, instr) in self.instructions.iter().enumerate() {
            let op = instr.mnemonic();
            let _ = match self.operand(instr) {
                Some((arg, Some(detail))) => writeln!(out, "{idx:>4} {op:<17} {arg} ({detail})"),
                Some((arg, None)) => writeln!(out, "{idx:>4} {op:<17} {arg}"),
                None => writeln!(out, "{idx:>4} {op}"),
            };
        }
        let _ = writeln!(out, "consts: {}", join(self.consts.iter()));
        let _ = writeln!(out, "names: {}", join(self.names.iter()));
        let _ = write!(out, "varnames: {}", join(self.varnames.iter()));
        out
    }

    fn operand(&self, instr: &Instr) -> Option<(String, Option<String>)> {
        let name_at = |table: &[Symbol], i: usize| table.get(i).map(|s| s.to_string());
        match *instr {
            Instr::LoadFast(i) | Instr::StoreFast(i) => Some((i.to_string(), name_at(&self.varnames, i))),
            Instr::LoadConst(i) => Some((i.to_string(), self.consts.get(i).map(|c| c.to_string()))),
            Instr::LoadGlobal(i) | Instr::LoadAttr(i) | Instr::StoreAttr(i) | Instr::LabelAttr(i) => {
                Some((i.to_string(), name_at(&self.names, i)))
            }
            Instr::Call(n) | Instr::BuildTuple(n) | Instr::BuildString(n) => Some((n.to_string(), None)),
            Instr::PopJumpIfFalse(t) | Instr::Jump(t) => Some((t.to_string(), None)),
            Instr::FormatValue(Conversion::Repr) => Some(("!r".to_string(), None)),
            Instr::FormatValue(Conversion::Str) => Some(("!s".to_string(), None)),
            Instr::CompareEq | Instr::CompareIs | Instr::Pop | Instr::ReturnValue | Instr::YieldValue => None,
        }
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CodeObject {
        CodeObject {
            name: "__init__".into(),
            argcount: 2,
            is_generator: false,
            instructions: vec![
                Instr::LoadFast(1),
                Instr::LoadFast(0),
                Instr::StoreAttr(0),
                Instr::LoadConst(0),
                Instr::ReturnValue,
            ]
            .into(),
            consts: vec![Const::None].into(),
            names: vec![Symbol::from("_0")].into(),
            varnames: vec![Symbol::from("self"), Symbol::from("_0")].into(),
        }
    }

    #[test]
    fn replace_names_shares_code() {
        let code = sample();
        let renamed = code.replace_names(vec![Symbol::from("x")].into(), vec![Symbol::from("self"), Symbol::from("x")].into());
        assert!(renamed.shares_code_with(&code));
        assert_eq!(&*renamed.names[0], "x");
        assert_eq!(&*code.names[0], "_0");
    }

    #[test]
    #[should_panic(expected = "INVARIANT")]
    fn replace_names_rejects_resized_tables() {
        let code = sample();
        code.replace_names(vec![].into(), code.varnames.clone());
    }

    #[test]
    fn params_are_leading_varnames() {
        let code = sample();
        let params: Vec<&str> = code.params().iter().map(|s| &**s).collect();
        assert_eq!(params, vec!["self", "_0"]);
    }

    #[test]
    fn const_display_is_python_like() {
        assert_eq!(Const::Str("it's".into()).to_string(), "'it\\'s'");
        assert_eq!(Const::Bool(false).to_string(), "False");
        assert_eq!(Const::None.to_string(), "None");
    }

    #[test]
    fn disassembly_lists_tables() {
        let text = sample().disassemble();
        assert!(text.starts_with("__init__ (argcount=2)\n"));
        assert!(text.contains("   2 STORE_ATTR        0 (_0)\n"));
        assert!(text.contains("   4 RETURN_VALUE\n"));
        assert!(text.ends_with("varnames: self, _0"));
    }
}
