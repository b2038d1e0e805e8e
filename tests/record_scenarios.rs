//! End-to-end behavior of decorated record classes.
//!
//! Each test declares classes with `ClassBuilder`, decorates them, and observes the synthesized
//! methods only through the runtime protocols (`repr`, `equals`, `hash`, `iterate`, ...).

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use dataklass::MethodFamily;
use dataklass::runtime::protocol::{self, EqOutcome};
use dataklass::runtime::{Class, ClassAttr, ClassBuilder, RuntimeError, Value};
use dataklass::synth::{SynthConfig, SynthError, Synthesizer, TemplateKey, TemplateRegistry, dataklass};

fn record(name: &str, fields: &[&str]) -> Rc<Class> {
    fields
        .iter()
        .fold(ClassBuilder::new(name), |b, f| b.field(*f, "int"))
        .build()
        .unwrap()
}

fn decorated(name: &str, fields: &[&str], registry: &TemplateRegistry) -> Rc<Class> {
    let class = record(name, fields);
    dataklass(&class, registry, &SynthConfig::default()).unwrap();
    class
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Int(*v)).collect()
}

fn show(value: &Value) -> String {
    protocol::repr(value).unwrap()
}

// ============================================================================
// Construction (P1)
// ============================================================================

#[test]
fn construction_binds_fields_positionally() {
    let registry = TemplateRegistry::new();
    let class = decorated("Triple", &["a", "b", "c"], &registry);
    let obj = class.call(ints(&[10, 20, 30])).unwrap();

    for (name, expected) in [("a", 10), ("b", 20), ("c", 30)] {
        let value = protocol::get_attr(&obj, name).unwrap();
        assert_eq!(value.as_int(), Some(expected), "{name}");
    }
}

#[test]
fn construction_binds_keywords_by_field_name() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);

    let obj = class
        .call_with_keywords(Vec::new(), &[("y", Value::Int(3)), ("x", Value::Int(2))])
        .unwrap();
    assert_eq!(show(&obj), "Coordinates(x=2, y=3)");

    let err = class
        .call_with_keywords(Vec::new(), &[("_0", Value::Int(2)), ("_1", Value::Int(3))])
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Type("__init__() got an unexpected keyword argument '_0'".to_string())
    );
}

#[test]
fn construction_checks_argument_count() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);

    let err = class.call(ints(&[1])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "TypeError: __init__() missing 1 required positional argument: 'y'"
    );
    assert!(class.call(ints(&[1, 2, 3])).is_err());
}

// ============================================================================
// Representation (P2)
// ============================================================================

#[test]
fn coordinates_scenario() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);
    let a = class.call(ints(&[2, 3])).unwrap();
    let b = class.call(ints(&[2, 3])).unwrap();

    assert!(protocol::equals(&a, &b).unwrap());
    assert_eq!(show(&a), "Coordinates(x=2, y=3)");

    let plain = Value::tuple(ints(&[2, 3]));
    assert!(!protocol::equals(&a, &plain).unwrap());
    assert!(!protocol::equals(&plain, &a).unwrap());
}

#[test]
fn empty_scenario() {
    let registry = TemplateRegistry::new();
    let class = decorated("Empty", &[], &registry);
    let a = class.call(Vec::new()).unwrap();
    let b = class.call(Vec::new()).unwrap();

    assert_eq!(show(&a), "Empty()");
    assert!(protocol::equals(&a, &b).unwrap());
    assert!(class.call(ints(&[1])).is_err());
}

#[test]
fn representation_nests_field_reprs() {
    let registry = TemplateRegistry::new();
    let inner = decorated("Inner", &["v"], &registry);
    let outer = ClassBuilder::new("Outer")
        .field("label", "str")
        .field("inner", "Inner")
        .field("pair", "tuple")
        .build()
        .unwrap();
    dataklass(&outer, &registry, &SynthConfig::default()).unwrap();

    let obj = outer
        .call(vec![
            Value::str("it's"),
            inner.call(vec![Value::None]).unwrap(),
            Value::tuple([Value::Bool(true), Value::Float(1.5)]),
        ])
        .unwrap();
    assert_eq!(show(&obj), "Outer(label=\"it's\", inner=Inner(v=None), pair=(True, 1.5))");
}

// ============================================================================
// Equality (P3, P4)
// ============================================================================

#[test]
fn equality_declines_across_classes_with_same_fields() {
    let registry = TemplateRegistry::new();
    let point = decorated("Point", &["x", "y"], &registry);
    let vector = decorated("Vector", &["x", "y"], &registry);
    let p = point.call(ints(&[1, 2])).unwrap();
    let v = vector.call(ints(&[1, 2])).unwrap();

    assert_eq!(protocol::rich_eq(&p, &v).unwrap(), EqOutcome::NotComparable);
    assert!(!protocol::equals(&p, &v).unwrap());
}

#[test]
fn equality_compares_every_field() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);
    let a = class.call(ints(&[2, 3])).unwrap();
    let swapped = class.call(ints(&[3, 2])).unwrap();
    let numeric = class.call(vec![Value::Float(2.0), Value::Int(3)]).unwrap();

    assert_eq!(protocol::rich_eq(&a, &swapped).unwrap(), EqOutcome::NotEqual);
    assert!(protocol::equals(&a, &numeric).unwrap());
}

#[test]
fn equality_does_not_mutate_operands() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);
    let a = class.call(ints(&[2, 3])).unwrap();
    let b = class.call(ints(&[2, 4])).unwrap();
    let snapshot = |v: &Value| {
        let inst = v.as_instance().unwrap();
        inst.attrs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, show(v)))
            .collect::<Vec<_>>()
    };
    let (before_a, before_b) = (snapshot(&a), snapshot(&b));

    assert!(!protocol::equals(&a, &b).unwrap());
    assert!(!protocol::equals(&b, &a).unwrap());

    assert_eq!(snapshot(&a), before_a);
    assert_eq!(snapshot(&b), before_b);
}

// ============================================================================
// Cache sharing (P5)
// ============================================================================

#[test]
fn same_arity_classes_share_templates() {
    let compiled: Arc<Mutex<Vec<TemplateKey>>> = Arc::default();
    let sink = Arc::clone(&compiled);
    let registry = TemplateRegistry::with_compile_hook(move |key| sink.lock().unwrap().push(key));

    decorated("Point", &["x", "y"], &registry);
    decorated("Range", &["start", "stop"], &registry);
    decorated("Single", &["value"], &registry);

    let mut keys = compiled.lock().unwrap().clone();
    keys.sort();
    let expected: Vec<TemplateKey> = [(MethodFamily::Init, 1), (MethodFamily::Init, 2)]
        .into_iter()
        .chain([(MethodFamily::Repr, 1), (MethodFamily::Repr, 2)])
        .chain([(MethodFamily::Eq, 1), (MethodFamily::Eq, 2)])
        .map(|(family, arity)| TemplateKey { family, arity })
        .collect();
    assert_eq!(keys, expected);
    assert_eq!(registry.compile_count(), 6);
    assert_eq!(registry.hit_count(), 3);
}

#[test]
fn specialized_methods_share_code_with_template() {
    let registry = TemplateRegistry::new();
    let point = decorated("Point", &["x", "y"], &registry);
    let range = decorated("Range", &["start", "stop"], &registry);
    let template = registry.get(MethodFamily::Eq, 2).unwrap();

    let code_of = |class: &Rc<Class>| match class.own(MethodFamily::Eq.dunder()) {
        Some(ClassAttr::Method(method)) => Rc::clone(method.function().unwrap()),
        _ => panic!("missing __eq__ on {}", class.name()),
    };
    let (p, r) = (code_of(&point), code_of(&range));

    assert!(p.code.shares_code_with(template.code()));
    assert!(r.code.shares_code_with(&p.code));
    assert_ne!(p.code.names, r.code.names);
}

// ============================================================================
// Overrides and idempotence (P6, P7)
// ============================================================================

#[test]
fn own_repr_is_kept_and_other_families_synthesize() {
    let registry = TemplateRegistry::new();
    let class = ClassBuilder::new("Money")
        .field("amount", "int")
        .field("currency", "str")
        .method_source(
            "__repr__",
            "def __repr__(self):\n    return f\"{self.amount} {self.currency!s}\"\n",
        )
        .build()
        .unwrap();
    let before = match class.own("__repr__") {
        Some(ClassAttr::Method(m)) => m,
        _ => panic!("missing own __repr__"),
    };

    dataklass(&class, &registry, &SynthConfig::default()).unwrap();

    let after = match class.own("__repr__") {
        Some(ClassAttr::Method(m)) => m,
        _ => panic!("missing own __repr__"),
    };
    assert!(before.ptr_eq(&after));

    let a = class.call(vec![Value::Int(5), Value::str("EUR")]).unwrap();
    let b = class
        .call_with_keywords(vec![Value::Int(5)], &[("currency", Value::str("EUR"))])
        .unwrap();
    assert_eq!(show(&a), "5 EUR");
    assert!(protocol::equals(&a, &b).unwrap());
}

#[test]
fn decorating_twice_is_idempotent() {
    let registry = TemplateRegistry::new();
    let class = record("Coordinates", &["x", "y"]);
    let synth = Synthesizer::new(&registry).with_config(SynthConfig::default().with_iter().with_hash());

    synth.decorate(&class).unwrap();
    let a = class.call(ints(&[2, 3])).unwrap();
    let first = (show(&a), protocol::hash(&a).unwrap(), protocol::collect(&a).unwrap().len());
    let compiles = registry.compile_count();

    synth.decorate(&class).unwrap();
    let b = class.call(ints(&[2, 3])).unwrap();
    let second = (show(&b), protocol::hash(&b).unwrap(), protocol::collect(&b).unwrap().len());

    assert_eq!(first, second);
    assert_eq!(registry.compile_count(), compiles);
    assert!(protocol::equals(&a, &b).unwrap());
}

// ============================================================================
// Iteration and hashing
// ============================================================================

#[test]
fn iteration_yields_fields_in_order_and_restarts() {
    let registry = TemplateRegistry::new();
    let class = record("Coordinates", &["x", "y"]);
    dataklass(&class, &registry, &SynthConfig::default().with_iter()).unwrap();
    let obj = class.call(ints(&[2, 3])).unwrap();

    for _ in 0..2 {
        let items: Vec<i64> = protocol::iterate(&obj)
            .unwrap()
            .map(|v| v.unwrap().as_int().unwrap())
            .collect();
        assert_eq!(items, vec![2, 3]);
    }
}

#[test]
fn iteration_of_empty_record_is_empty() {
    let registry = TemplateRegistry::new();
    let class = record("Empty", &[]);
    dataklass(&class, &registry, &SynthConfig::default().with_iter()).unwrap();
    let obj = class.call(Vec::new()).unwrap();
    assert!(protocol::collect(&obj).unwrap().is_empty());
}

#[test]
fn iteration_is_opt_in() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);
    let obj = class.call(ints(&[2, 3])).unwrap();
    let err = protocol::iterate(&obj).err().unwrap();
    assert_eq!(err.to_string(), "TypeError: 'Coordinates' object is not iterable");
}

#[test]
fn equal_records_hash_equal() {
    let registry = TemplateRegistry::new();
    let class = record("Coordinates", &["x", "y"]);
    dataklass(&class, &registry, &SynthConfig::default().with_hash()).unwrap();

    let a = class.call(ints(&[2, 3])).unwrap();
    let b = class.call(vec![Value::Float(2.0), Value::Int(3)]).unwrap();
    assert!(protocol::equals(&a, &b).unwrap());
    assert_eq!(protocol::hash(&a).unwrap(), protocol::hash(&b).unwrap());
    assert_eq!(
        protocol::hash(&a).unwrap(),
        protocol::hash(&Value::tuple(ints(&[2, 3]))).unwrap()
    );
}

#[test]
fn synthesized_eq_without_hash_is_unhashable() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);
    let obj = class.call(ints(&[2, 3])).unwrap();
    assert_eq!(
        protocol::hash(&obj).unwrap_err(),
        RuntimeError::Unhashable("Coordinates".to_string())
    );
}

#[test]
fn unhashable_field_fails_hashing() {
    let registry = TemplateRegistry::new();
    let inner = decorated("Inner", &["v"], &registry);
    let outer = record("Outer", &["inner"]);
    dataklass(&outer, &registry, &SynthConfig::default().with_hash()).unwrap();

    let obj = outer.call(vec![inner.call(ints(&[1])).unwrap()]).unwrap();
    assert!(matches!(protocol::hash(&obj), Err(RuntimeError::Unhashable(name)) if name == "Inner"));
}

#[test]
fn hash_follows_exact_numeric_equality() {
    let registry = TemplateRegistry::new();
    let class = record("Amount", &["cents"]);
    dataklass(&class, &registry, &SynthConfig::default().with_hash()).unwrap();

    let big = class.call(ints(&[9_007_199_254_740_993])).unwrap();
    let rounded = class.call(vec![Value::Float(9_007_199_254_740_992.0)]).unwrap();
    assert!(!protocol::equals(&big, &rounded).unwrap());

    let exact = class.call(ints(&[9_007_199_254_740_992])).unwrap();
    assert!(protocol::equals(&exact, &rounded).unwrap());
    assert_eq!(protocol::hash(&exact).unwrap(), protocol::hash(&rounded).unwrap());
}

// ============================================================================
// Self-referencing records
// ============================================================================

fn self_linked(class: &Rc<Class>, label: i64) -> Value {
    let node = class.call(vec![Value::Int(label), Value::None]).unwrap();
    protocol::set_attr(&node, "next", node.clone()).unwrap();
    node
}

#[test]
fn self_referencing_record_reprs_with_ellipsis() {
    let registry = TemplateRegistry::new();
    let class = decorated("Node", &["label", "next"], &registry);
    let node = self_linked(&class, 1);

    assert_eq!(show(&node), "Node(label=1, next=...)");
    assert_eq!(show(&Value::tuple([node.clone(), node.clone()])), "(Node(label=1, next=...), Node(label=1, next=...))");

    let outer = class.call(vec![Value::Int(0), node]).unwrap();
    assert_eq!(show(&outer), "Node(label=0, next=Node(label=1, next=...))");
}

#[test]
fn cyclic_records_fail_equality_and_hashing_with_recursion_error() {
    let registry = TemplateRegistry::new();
    let class = record("Node", &["label", "next"]);
    dataklass(&class, &registry, &SynthConfig::default().with_hash()).unwrap();
    let a = self_linked(&class, 1);
    let b = self_linked(&class, 1);

    assert_eq!(protocol::equals(&a, &b).unwrap_err(), RuntimeError::Recursion);
    assert_eq!(protocol::hash(&a).unwrap_err(), RuntimeError::Recursion);
    assert!(protocol::equals(&a, &a).unwrap());

    let plain = class.call(vec![Value::Int(2), Value::None]).unwrap();
    assert_eq!(show(&plain), "Node(label=2, next=None)");
    assert!(protocol::hash(&plain).is_ok());
}

// ============================================================================
// Inheritance and pattern matching
// ============================================================================

#[test]
fn derived_fields_follow_base_fields() {
    let registry = TemplateRegistry::new();
    let base = decorated("Point", &["x", "y"], &registry);
    let derived = ClassBuilder::new("Point3")
        .base(&base)
        .field("z", "int")
        .build()
        .unwrap();
    dataklass(&derived, &registry, &SynthConfig::default()).unwrap();

    let p = derived.call(ints(&[1, 2, 3])).unwrap();
    assert_eq!(show(&p), "Point3(x=1, y=2, z=3)");
    assert!(protocol::is_instance(&p, &base));

    let flat = base.call(ints(&[1, 2])).unwrap();
    assert!(!protocol::equals(&p, &flat).unwrap());
}

#[test]
fn positional_patterns_use_match_args() {
    let registry = TemplateRegistry::new();
    let class = decorated("Coordinates", &["x", "y"], &registry);
    let other = decorated("Other", &["x", "y"], &registry);
    let obj = class.call(ints(&[2, 3])).unwrap();

    let matched = protocol::match_positional(&obj, &class, 2).unwrap().unwrap();
    assert_eq!(matched.iter().map(show).collect::<Vec<_>>(), vec!["2", "3"]);
    assert!(protocol::match_positional(&obj, &other, 2).unwrap().is_none());

    let err = protocol::match_positional(&obj, &class, 3).unwrap_err();
    assert_eq!(
        err.to_string(),
        "TypeError: Coordinates() accepts 2 positional sub-patterns (3 given)"
    );
}

#[test]
fn malformed_fields_reject_decoration() {
    let registry = TemplateRegistry::new();
    for bad in ["self", "__slots__", "not-an-identifier", "if"] {
        let class = ClassBuilder::new("Bad").field(bad, "int").build().unwrap();
        let err = dataklass(&class, &registry, &SynthConfig::default()).unwrap_err();
        assert!(matches!(err, SynthError::MalformedField { ref field, .. } if field == bad), "{bad}");
    }
    assert_eq!(registry.compile_count(), 0);
}
