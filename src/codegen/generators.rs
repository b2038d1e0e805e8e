//! Template source generators, one per method family.
//!
//! Every generator takes only an arity and emits template-language source that refers to fields
//! through the placeholders `_0 .. _{N-1}`. Field names never reach this module; they are put
//! in place later by rewriting the compiled name tables.

use std::fmt::Write as _;

use dataklass_core::MethodFamily;
use dataklass_core::lang::builtins::{self, BuiltinId};
use dataklass_core::lang::keywords::{self, KeywordId};
use dataklass_core::lang::magic_methods::{self, MagicMethodId};

const INDENT: &str = "    ";

/// Placeholder spelling for field `i`.
pub fn placeholder(i: usize) -> String {
    format!("_{}", i)
}

/// Parse a placeholder back into its field index.
///
/// Only canonical spellings are accepted: `_0`, `_1`, ... (no leading zeros, no sign).
pub fn placeholder_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// Generate template source for `family` at `arity`.
pub fn generate(family: MethodFamily, arity: usize) -> String {
    match family {
        MethodFamily::Init => init_source(arity),
        MethodFamily::Repr => repr_source(arity),
        MethodFamily::Eq => eq_source(arity),
        MethodFamily::Iter => iter_source(arity),
        MethodFamily::Hash => hash_source(arity),
    }
}

fn kw(id: KeywordId) -> &'static str {
    keywords::as_str(id)
}

fn header(family: MethodFamily, params: &[&str]) -> String {
    format!("{} {}({}):\n", kw(KeywordId::Def), family.dunder(), params.join(", "))
}

/// `self._0, self._1,` (trailing comma always present so one field still forms a tuple).
fn attr_tuple(obj: &str, arity: usize) -> String {
    if arity == 0 {
        return "()".to_string();
    }
    let items: String = (0..arity).map(|i| format!("{}.{}, ", obj, placeholder(i))).collect();
    format!("({},)", items.trim_end_matches(", "))
}

fn init_source(arity: usize) -> String {
    let fields: Vec<String> = (0..arity).map(placeholder).collect();
    let mut params = vec!["self"];
    params.extend(fields.iter().map(String::as_str));

    let mut src = header(MethodFamily::Init, &params);
    if arity == 0 {
        let _ = writeln!(src, "{INDENT}{}", kw(KeywordId::Pass));
    }
    for field in &fields {
        let _ = writeln!(src, "{INDENT}self.{field} = {field}");
    }
    src
}

fn repr_source(arity: usize) -> String {
    let fields: Vec<String> = (0..arity).map(|i| format!("{{self.{}=!r}}", placeholder(i))).collect();
    let mut src = header(MethodFamily::Repr, &["self"]);
    let _ = writeln!(
        src,
        "{INDENT}{} f\"{{{}(self).{}}}({})\"",
        kw(KeywordId::Return),
        builtins::as_str(BuiltinId::Type),
        magic_methods::as_str(MagicMethodId::Name),
        fields.join(", ")
    );
    src
}

fn eq_source(arity: usize) -> String {
    let class = magic_methods::as_str(MagicMethodId::Class);
    let mut src = header(MethodFamily::Eq, &["self", "other"]);
    let _ = writeln!(
        src,
        "{INDENT}{} self.{class} {} other.{class}:",
        kw(KeywordId::If),
        kw(KeywordId::Is)
    );
    let _ = writeln!(
        src,
        "{INDENT}{INDENT}{} {} == {}",
        kw(KeywordId::Return),
        attr_tuple("self", arity),
        attr_tuple("other", arity)
    );
    let _ = writeln!(src, "{INDENT}{}:", kw(KeywordId::Else));
    let _ = writeln!(
        src,
        "{INDENT}{INDENT}{} {}",
        kw(KeywordId::Return),
        builtins::as_str(BuiltinId::NotImplemented)
    );
    src
}

fn iter_source(arity: usize) -> String {
    let mut src = header(MethodFamily::Iter, &["self"]);
    if arity == 0 {
        // A bare yield after the return keeps the body a generator.
        let _ = writeln!(src, "{INDENT}{}", kw(KeywordId::Return));
        let _ = writeln!(src, "{INDENT}{}", kw(KeywordId::Yield));
    }
    for i in 0..arity {
        let _ = writeln!(src, "{INDENT}{} self.{}", kw(KeywordId::Yield), placeholder(i));
    }
    src
}

fn hash_source(arity: usize) -> String {
    let mut src = header(MethodFamily::Hash, &["self"]);
    let _ = writeln!(
        src,
        "{INDENT}{} {}({})",
        kw(KeywordId::Return),
        builtins::as_str(BuiltinId::Hash),
        attr_tuple("self", arity)
    );
    src
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_round_trip() {
        assert_eq!(placeholder(12), "_12");
        assert_eq!(placeholder_index("_12"), Some(12));
        assert_eq!(placeholder_index("_0"), Some(0));
    }

    #[test]
    fn placeholder_index_is_strict() {
        for name in ["_", "_01", "__0", "_0a", "x_0", "0", "_-1", "self"] {
            assert_eq!(placeholder_index(name), None, "{name}");
        }
    }

    #[test]
    fn init_binds_each_placeholder() {
        assert_eq!(
            generate(MethodFamily::Init, 2),
            "def __init__(self, _0, _1):\n    self._0 = _0\n    self._1 = _1\n"
        );
        assert_eq!(generate(MethodFamily::Init, 0), "def __init__(self):\n    pass\n");
    }

    #[test]
    fn repr_labels_fields() {
        assert_eq!(
            generate(MethodFamily::Repr, 2),
            "def __repr__(self):\n    return f\"{type(self).__name__}({self._0=!r}, {self._1=!r})\"\n"
        );
        assert_eq!(
            generate(MethodFamily::Repr, 0),
            "def __repr__(self):\n    return f\"{type(self).__name__}()\"\n"
        );
    }

    #[test]
    fn eq_tuples_keep_trailing_comma() {
        let src = generate(MethodFamily::Eq, 1);
        assert!(src.contains("return (self._0,) == (other._0,)\n"), "{src}");
        let src = generate(MethodFamily::Eq, 2);
        assert!(src.contains("return (self._0, self._1,) == (other._0, other._1,)\n"), "{src}");
        let src = generate(MethodFamily::Eq, 0);
        assert!(src.contains("return () == ()\n"), "{src}");
        assert!(src.ends_with("    else:\n        return NotImplemented\n"));
    }

    #[test]
    fn empty_iter_is_still_a_generator() {
        assert_eq!(generate(MethodFamily::Iter, 0), "def __iter__(self):\n    return\n    yield\n");
        assert_eq!(
            generate(MethodFamily::Iter, 2),
            "def __iter__(self):\n    yield self._0\n    yield self._1\n"
        );
    }

    #[test]
    fn hash_wraps_a_tuple() {
        assert_eq!(generate(MethodFamily::Hash, 0), "def __hash__(self):\n    return hash(())\n");
        assert_eq!(
            generate(MethodFamily::Hash, 3),
            "def __hash__(self):\n    return hash((self._0, self._1, self._2,))\n"
        );
    }
}
