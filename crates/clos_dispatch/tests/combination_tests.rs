//! End-to-end method combination behavior.
//!
//! Covers wildcard fallback, class-over-interface precedence, policy
//! tie-breaks, before/after/around ordering, short-circuiting, around
//! stacking and unresolved dispatch, plus the two reference scenarios.
//!
//! Run with `RUST_LOG=clos_dispatch=trace` to see each matched signature.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::sync::Arc;

use clos_dispatch::{
    ClassDef, ClassHierarchy, DispatchError, DispatchErrorKind, DispatchPolicy, Dispatcher,
    Method, Role, Value,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

type Log = Arc<Mutex<Vec<String>>>;

fn zoo() -> ClassHierarchy {
    ClassHierarchy::new()
        .with(ClassDef::class("Animal"))
        .with(ClassDef::class("Dog").extends("Animal").implements("IPet"))
        .with(ClassDef::class("Cat").extends("Animal"))
        .with(ClassDef::class("T").implements("IA").implements("IB"))
        .with(ClassDef::class("Amphibian").extends("Land").extends("Water"))
}

fn dispatcher(policy: DispatchPolicy) -> Dispatcher {
    clos_dispatch::init_tracing();
    Dispatcher::builder()
        .name("test")
        .policy(policy)
        .introspector(zoo())
        .build()
}

fn text(s: &str) -> Method {
    Method::constant(Value::string(s))
}

fn record(log: &Log, label: &'static str) -> Method {
    let log = Arc::clone(log);
    Method::new(move |_, _| {
        log.lock().push(label.to_string());
        Ok(Value::string(label))
    })
}

fn taken(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

// Reference scenarios

#[test]
fn animals_collide() {
    let d = dispatcher(DispatchPolicy::FirstWins);
    d.register(["Dog", "Dog"], Role::Primary, text("Dog vs Dog"))
        .unwrap();
    d.register(["Animal", "Animal"], Role::Primary, text("Animal fight"))
        .unwrap();

    let dog = || Value::instance("Dog");
    let cat = || Value::instance("Cat");
    assert_eq!(d.dispatch(&[dog(), dog()]).unwrap(), Value::string("Dog vs Dog"));
    assert_eq!(d.dispatch(&[cat(), dog()]).unwrap(), Value::string("Animal fight"));
}

#[test]
fn primitives_format_their_arguments() {
    let d = Dispatcher::new();
    d.register(
        ["int", "string"],
        Role::Primary,
        Method::new(|_, args| Ok(Value::string(format!("{} and {}", args[0], args[1])))),
    )
    .unwrap();

    assert_eq!(
        d.dispatch(&[Value::Int(1), Value::string("test")]).unwrap(),
        Value::string("1 and test")
    );
}

// Wildcard fallback

#[test]
fn wildcard_catches_everything_of_its_arity() {
    let d = dispatcher(DispatchPolicy::FirstWins);
    d.register(["*", "*"], Role::Primary, text("fallback")).unwrap();
    d.register(["int", "int"], Role::Primary, text("ints")).unwrap();

    let cases = [
        vec![Value::string("a"), Value::Int(1)],
        vec![Value::instance("Cat"), Value::Bool(true)],
        vec![Value::foreign(3u8), Value::list(vec![])],
        vec![Value::Int(1), Value::Float(1.0)],
    ];
    for args in cases {
        assert_eq!(d.dispatch(&args).unwrap(), Value::string("fallback"), "{args:?}");
    }
    assert_eq!(
        d.dispatch(&[Value::Int(1), Value::Int(2)]).unwrap(),
        Value::string("ints")
    );
}

#[test]
fn wildcard_does_not_cross_arity() {
    let d = Dispatcher::new();
    d.register(["*"], Role::Primary, text("one")).unwrap();
    let err = d.dispatch(&[Value::Int(1), Value::Int(2)]).unwrap_err();
    assert!(err.is_unresolved());
}

// Class versus interface

#[test]
fn class_beats_interface_under_either_policy() {
    for policy in [DispatchPolicy::FirstWins, DispatchPolicy::LastWins] {
        let d = dispatcher(policy);
        d.register(["Dog"], Role::Primary, text("class")).unwrap();
        d.register(["IPet"], Role::Primary, text("interface")).unwrap();
        assert_eq!(
            d.dispatch(&[Value::instance("Dog")]).unwrap(),
            Value::string("class"),
            "{policy}"
        );
    }
}

#[test]
fn ancestor_beats_interface_under_either_policy() {
    for policy in [DispatchPolicy::FirstWins, DispatchPolicy::LastWins] {
        let d = dispatcher(policy);
        d.register(["IPet"], Role::Primary, text("interface")).unwrap();
        d.register(["Animal"], Role::Primary, text("ancestor")).unwrap();
        assert_eq!(
            d.dispatch(&[Value::instance("Dog")]).unwrap(),
            Value::string("ancestor"),
            "{policy}"
        );
    }
}

#[test]
fn tied_interfaces_follow_policy() {
    let register = |d: &Dispatcher| {
        d.register(["IA"], Role::Primary, text("A")).unwrap();
        d.register(["IB"], Role::Primary, text("B")).unwrap();
    };

    let first = dispatcher(DispatchPolicy::FirstWins);
    register(&first);
    assert_eq!(first.dispatch(&[Value::instance("T")]).unwrap(), Value::string("A"));

    let last = dispatcher(DispatchPolicy::LastWins);
    register(&last);
    assert_eq!(last.dispatch(&[Value::instance("T")]).unwrap(), Value::string("B"));

    // Switching policy on a live dispatcher affects the next call.
    first.set_policy(DispatchPolicy::LastWins);
    assert_eq!(first.dispatch(&[Value::instance("T")]).unwrap(), Value::string("B"));
}

#[test]
fn tied_parents_follow_policy() {
    let first = dispatcher(DispatchPolicy::FirstWins);
    let last = dispatcher(DispatchPolicy::LastWins);
    for d in [&first, &last] {
        d.register(["Land"], Role::Primary, text("walks")).unwrap();
        d.register(["Water"], Role::Primary, text("swims")).unwrap();
    }

    let frog = [Value::instance("Amphibian")];
    assert_eq!(first.dispatch(&frog).unwrap(), Value::string("walks"));
    assert_eq!(last.dispatch(&frog).unwrap(), Value::string("swims"));
}

#[test]
fn tracing_setup_is_idempotent() {
    clos_dispatch::init_tracing();
    clos_dispatch::init_tracing();
    let d = dispatcher(DispatchPolicy::FirstWins);
    d.register(["*"], Role::Primary, text("ok")).unwrap();
    assert_eq!(d.dispatch(&[Value::Void]).unwrap(), Value::string("ok"));
}

// Ordering

#[test]
fn all_roles_on_one_signature() {
    let log = Log::default();
    let d = Dispatcher::new();
    d.register(["int"], Role::Primary, record(&log, "primary")).unwrap();
    d.register(["int"], Role::Before, record(&log, "before")).unwrap();
    d.register(["int"], Role::After, record(&log, "after")).unwrap();
    let around_log = Arc::clone(&log);
    d.register(
        ["int"],
        Role::Around,
        Method::around(move |next, args| {
            around_log.lock().push("around-enter".to_string());
            let inner = next.call(args)?;
            around_log.lock().push("around-exit".to_string());
            Ok(Value::string(format!("<{inner}>")))
        }),
    )
    .unwrap();

    let result = d.dispatch(&[Value::Int(7)]).unwrap();
    assert_eq!(result, Value::string("<primary>"));
    assert_eq!(
        taken(&log),
        vec!["around-enter", "before", "primary", "after", "around-exit"]
    );
}

#[test]
fn befores_least_specific_first_afters_most_specific_first() {
    let log = Log::default();
    let d = dispatcher(DispatchPolicy::FirstWins);
    d.register(["*"], Role::Primary, record(&log, "primary")).unwrap();
    d.register(["Dog"], Role::Before, record(&log, "before Dog")).unwrap();
    d.register(["Animal"], Role::Before, record(&log, "before Animal"))
        .unwrap();
    d.register(["*"], Role::Before, record(&log, "before *")).unwrap();
    d.register(["Dog"], Role::After, record(&log, "after Dog")).unwrap();
    d.register(["*"], Role::After, record(&log, "after *")).unwrap();
    d.register(["IPet"], Role::After, record(&log, "after IPet")).unwrap();

    d.dispatch(&[Value::instance("Dog")]).unwrap();
    assert_eq!(
        taken(&log),
        vec![
            "before *",
            "before Animal",
            "before Dog",
            "primary",
            "after Dog",
            "after IPet",
            "after *",
        ]
    );
}

#[test]
fn around_short_circuits_everything_below() {
    let log = Log::default();
    let d = Dispatcher::new();
    d.register(["string"], Role::Primary, record(&log, "primary")).unwrap();
    d.register(["string"], Role::Before, record(&log, "before")).unwrap();
    d.register(["string"], Role::After, record(&log, "after")).unwrap();
    d.register(
        ["string"],
        Role::Around,
        Method::around(|_, _| Ok(Value::string("cached"))),
    )
    .unwrap();

    assert_eq!(
        d.dispatch(&[Value::string("key")]).unwrap(),
        Value::string("cached")
    );
    assert!(taken(&log).is_empty());
}

fn tracing_around(log: &Log, label: &'static str) -> Method {
    let log = Arc::clone(log);
    Method::around(move |next, args| {
        log.lock().push(format!("{label} in"));
        let result = next.call(args);
        log.lock().push(format!("{label} out"));
        result
    })
}

#[test]
fn less_specific_around_wraps_outermost() {
    let log = Log::default();
    let d = dispatcher(DispatchPolicy::FirstWins);
    d.register(["Dog"], Role::Primary, record(&log, "primary")).unwrap();
    d.register(["Dog"], Role::Around, tracing_around(&log, "Dog")).unwrap();
    d.register(["Animal"], Role::Around, tracing_around(&log, "Animal"))
        .unwrap();

    d.dispatch(&[Value::instance("Dog")]).unwrap();
    assert_eq!(
        taken(&log),
        vec!["Animal in", "Dog in", "primary", "Dog out", "Animal out"]
    );
}

#[test]
fn same_signature_arounds_stack_in_registration_order() {
    for policy in [DispatchPolicy::FirstWins, DispatchPolicy::LastWins] {
        let log = Log::default();
        let d = dispatcher(policy);
        d.register(["int"], Role::Primary, record(&log, "primary")).unwrap();
        d.register(["int"], Role::Around, tracing_around(&log, "first"))
            .unwrap();
        d.register(["int"], Role::Around, tracing_around(&log, "second"))
            .unwrap();

        d.dispatch(&[Value::Int(0)]).unwrap();
        assert_eq!(
            taken(&log),
            vec!["first in", "second in", "primary", "second out", "first out"],
            "{policy}"
        );
    }
}

// Failures

#[test]
fn no_primary_is_unresolved() {
    let d = dispatcher(DispatchPolicy::FirstWins);
    d.register(["Dog"], Role::Primary, text("dog")).unwrap();
    d.register(["*"], Role::Before, text("before")).unwrap();
    d.register(["*"], Role::Around, text("around")).unwrap();

    let err = d.dispatch(&[Value::instance("Cat")]).unwrap_err();
    assert_eq!(
        err.kind,
        DispatchErrorKind::UnresolvedDispatch {
            function: Some("test".to_string()),
            arg_types: vec!["Cat".to_string()],
        }
    );
}

#[test]
fn handler_errors_propagate_unchanged() {
    let d = Dispatcher::new();
    let condition = Value::object("ParseError", [("line", Value::Int(3))]);
    let raised = condition.clone();
    d.register(
        ["string"],
        Role::Primary,
        Method::new(move |_, _| Err(DispatchError::raise_with(raised.clone(), "bad input"))),
    )
    .unwrap();
    d.register(
        ["*"],
        Role::Around,
        Method::around(|next, args| next.call(args)),
    )
    .unwrap();

    let err = d.dispatch(&[Value::string("x")]).unwrap_err();
    assert_eq!(err, DispatchError::raise_with(condition, "bad input"));
}

#[test]
fn after_error_discards_primary_result() {
    let d = Dispatcher::new();
    d.register(["int"], Role::Primary, Method::constant(Value::Int(1)))
        .unwrap();
    d.register(
        ["int"],
        Role::After,
        Method::new(|_, _| Err(DispatchError::raise("audit failed"))),
    )
    .unwrap();

    let err = d.dispatch(&[Value::Int(1)]).unwrap_err();
    assert!(err.is_raised());
    assert_eq!(err.to_string(), "audit failed");
}

#[test]
fn unregister_removes_every_role() {
    let log = Log::default();
    let d = Dispatcher::new();
    d.register(["*"], Role::Primary, record(&log, "fallback")).unwrap();
    d.register(["int"], Role::Primary, record(&log, "int")).unwrap();
    d.register(["int"], Role::Before, record(&log, "before int")).unwrap();

    assert!(d.unregister(["int"]));
    assert_eq!(d.dispatch(&[Value::Int(1)]).unwrap(), Value::string("fallback"));
    assert_eq!(taken(&log), vec!["fallback"]);
}
