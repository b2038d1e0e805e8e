//! Property-based tests for the synthesis engine
//!
//! These tests use proptest to verify invariants across many randomly
//! generated field lists and values, catching edge cases that hand-written tests might miss.

use std::collections::BTreeSet;

use dataklass::MethodFamily;
use dataklass::codegen::compile;
use dataklass::runtime::protocol;
use dataklass::runtime::{ClassBuilder, Value};
use dataklass::synth::{FieldList, SynthConfig, TemplateRegistry, dataklass, specialize};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Field names that never collide with the vocabulary the templates themselves use.
fn field_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}".prop_filter("Not reserved", |s| {
        !matches!(
            s.as_str(),
            "def" | "return" | "yield" | "if" | "else" | "pass" | "is" | "self" | "other" | "type" | "hash" | "repr"
        )
    })
}

fn fields_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(field_strategy(), 0..max).prop_map(|set: BTreeSet<String>| set.into_iter().collect())
}

// =============================================================================
// Hand-written equivalents
// =============================================================================

fn tuple_of(obj: &str, fields: &[String]) -> String {
    if fields.is_empty() {
        return "()".to_string();
    }
    let items: Vec<String> = fields.iter().map(|f| format!("{}.{}", obj, f)).collect();
    format!("({},)", items.join(", "))
}

fn hand_written(family: MethodFamily, fields: &[String]) -> String {
    match family {
        MethodFamily::Init => {
            let mut src = format!("def __init__(self{}):\n", fields.iter().map(|f| format!(", {}", f)).collect::<String>());
            if fields.is_empty() {
                src.push_str("    pass\n");
            }
            for f in fields {
                src.push_str(&format!("    self.{f} = {f}\n"));
            }
            src
        }
        MethodFamily::Repr => {
            let labelled: Vec<String> = fields.iter().map(|f| format!("{{self.{}=!r}}", f)).collect();
            format!(
                "def __repr__(self):\n    return f\"{{type(self).__name__}}({})\"\n",
                labelled.join(", ")
            )
        }
        MethodFamily::Eq => format!(
            "def __eq__(self, other):\n    if self.__class__ is other.__class__:\n        return {} == {}\n    else:\n        return NotImplemented\n",
            tuple_of("self", fields),
            tuple_of("other", fields)
        ),
        MethodFamily::Iter => {
            let mut src = "def __iter__(self):\n".to_string();
            if fields.is_empty() {
                src.push_str("    return\n    yield\n");
            }
            for f in fields {
                src.push_str(&format!("    yield self.{f}\n"));
            }
            src
        }
        MethodFamily::Hash => format!("def __hash__(self):\n    return hash({})\n", tuple_of("self", fields)),
    }
}

fn record(fields: &[String], registry: &TemplateRegistry) -> std::rc::Rc<dataklass::runtime::Class> {
    let class = fields
        .iter()
        .fold(ClassBuilder::new("Rec"), |b, f| b.field(f.as_str(), "int"))
        .build()
        .expect("class failed to build");
    dataklass(&class, registry, &SynthConfig::default().with_iter().with_hash()).expect("decoration failed");
    class
}

// =============================================================================
// Specialization Properties
// =============================================================================

proptest! {
    /// Property: specializing a template equals compiling the hand-written method
    #[test]
    fn specialization_matches_hand_written_code(fields in fields_strategy(7)) {
        let registry = TemplateRegistry::new();
        let list = FieldList::try_from_names(&fields).expect("valid fields");
        for family in dataklass_core::FAMILIES {
            let template = registry.get_or_compile(family, list.arity()).expect("template compiles");
            let specialized = specialize(&template, &list);
            let expected = compile(&hand_written(family, &fields)).expect("hand-written source compiles");
            prop_assert_eq!(&specialized.code, &expected, "family {}", family);
            prop_assert!(specialized.code.shares_code_with(template.code()));
        }
    }

    /// Property: every (family, arity) compiles once, however many classes use it
    #[test]
    fn one_compile_per_family_and_arity(lists in prop::collection::vec(fields_strategy(5), 1..8)) {
        let registry = TemplateRegistry::new();
        for fields in &lists {
            record(fields, &registry);
        }
        let arities: BTreeSet<usize> = lists.iter().map(Vec::len).collect();
        prop_assert_eq!(registry.compile_count(), arities.len() * 5);
        prop_assert_eq!(registry.compile_count() + registry.hit_count(), lists.len() * 5);
    }
}

// =============================================================================
// Behavior Properties
// =============================================================================

proptest! {
    /// Property: the representation lists every field with its value, in order
    #[test]
    fn repr_lists_fields_in_order(
        (fields, values) in fields_strategy(6).prop_flat_map(|f| {
            let n = f.len();
            (Just(f), prop::collection::vec(any::<i64>(), n))
        })
    ) {
        let registry = TemplateRegistry::new();
        let class = record(&fields, &registry);
        let obj = class.call(values.iter().map(|v| Value::Int(*v)).collect()).expect("construction");

        let parts: Vec<String> = fields.iter().zip(&values).map(|(f, v)| format!("{}={}", f, v)).collect();
        prop_assert_eq!(protocol::repr(&obj).expect("repr"), format!("Rec({})", parts.join(", ")));
    }

    /// Property: equal field values give equal records, equal hashes, and the same iteration
    #[test]
    fn equal_values_are_equal_records(
        (fields, values) in fields_strategy(6).prop_flat_map(|f| {
            let n = f.len();
            (Just(f), prop::collection::vec(-1000i64..1000, n))
        })
    ) {
        let registry = TemplateRegistry::new();
        let class = record(&fields, &registry);
        let args = || values.iter().map(|v| Value::Int(*v)).collect::<Vec<_>>();
        let a = class.call(args()).expect("construction");
        let b = class.call(args()).expect("construction");

        prop_assert!(protocol::equals(&a, &b).expect("eq"));
        prop_assert_eq!(protocol::hash(&a).expect("hash"), protocol::hash(&b).expect("hash"));

        let items: Vec<i64> = protocol::collect(&a)
            .expect("iteration")
            .iter()
            .map(|v| v.as_int().expect("int field"))
            .collect();
        prop_assert_eq!(items, values.clone());
    }

    /// Property: changing any one field breaks equality
    #[test]
    fn any_field_difference_breaks_equality(
        (fields, values, which) in fields_strategy(6)
            .prop_filter("needs a field", |f| !f.is_empty())
            .prop_flat_map(|f| {
                let n = f.len();
                (Just(f), prop::collection::vec(-1000i64..1000, n), 0..n)
            })
    ) {
        let registry = TemplateRegistry::new();
        let class = record(&fields, &registry);
        let a = class.call(values.iter().map(|v| Value::Int(*v)).collect()).expect("construction");
        let mut changed = values.clone();
        changed[which] += 1;
        let b = class.call(changed.iter().map(|v| Value::Int(*v)).collect()).expect("construction");

        prop_assert!(!protocol::equals(&a, &b).expect("eq"));
    }
}
