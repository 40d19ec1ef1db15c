//! Nested, recursive and concurrent dispatch.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::sync::Arc;
use std::thread;

use clos_dispatch::{
    DispatchError, DispatchErrorKind, Dispatcher, GenericTable, Method, Role, Value,
};
use pretty_assertions::assert_eq;

fn int_arg(args: &[Value]) -> Result<i64, DispatchError> {
    args.first()
        .and_then(Value::as_int)
        .ok_or_else(|| DispatchError::raise("expected an int"))
}

fn fib() -> Dispatcher {
    let d = Dispatcher::builder().name("fib").build();
    d.register(
        ["int"],
        Role::Primary,
        Method::new(|ctx, args| {
            let n = int_arg(args)?;
            if n < 2 {
                return Ok(Value::Int(n));
            }
            let a = int_arg(&[ctx.dispatch(&[Value::Int(n - 1)])?])?;
            let b = int_arg(&[ctx.dispatch(&[Value::Int(n - 2)])?])?;
            Ok(Value::Int(a + b))
        }),
    )
    .unwrap();
    d
}

#[test]
fn recursive_dispatch_through_context() {
    assert_eq!(fib().dispatch(&[Value::Int(15)]).unwrap(), Value::Int(610));
}

#[test]
fn nested_calls_keep_their_own_chains() {
    // The around re-enters the dispatcher; the inner call must build its own
    // chain and not disturb the outer continuation.
    let d = Dispatcher::new();
    d.register(
        ["int"],
        Role::Primary,
        Method::new(|_, args| Ok(Value::Int(int_arg(args)? + 1))),
    )
    .unwrap();
    d.register(
        ["int"],
        Role::Around,
        Method::around(|next, args| {
            let n = int_arg(args)?;
            if n == 0 {
                return next.call(args);
            }
            let inner = next.context().dispatch(&[Value::Int(n - 1)])?;
            let outer = next.call(args)?;
            Ok(Value::list(vec![inner, outer]))
        }),
    )
    .unwrap();

    let result = d.dispatch(&[Value::Int(1)]).unwrap();
    assert_eq!(result, Value::list(vec![Value::Int(1), Value::Int(2)]));
}

#[test]
fn deep_recursion_grows_the_stack() {
    let d = Dispatcher::new();
    d.register(
        ["int"],
        Role::Primary,
        Method::new(|ctx, args| {
            let n = int_arg(args)?;
            if n == 0 {
                Ok(Value::Int(0))
            } else {
                ctx.dispatch(&[Value::Int(n - 1)])
            }
        }),
    )
    .unwrap();

    assert_eq!(d.dispatch(&[Value::Int(20_000)]).unwrap(), Value::Int(0));
}

#[test]
fn depth_limit_is_reported() {
    let d = Dispatcher::builder().max_depth(10).build();
    d.register(["*"], Role::Primary, Method::new(|ctx, args| ctx.dispatch(args)))
        .unwrap();
    let err = d.dispatch(&[Value::Void]).unwrap_err();
    assert_eq!(err.kind, DispatchErrorKind::DepthExceeded { limit: 10 });
}

#[test]
fn handlers_dispatch_on_other_generics() {
    let mut generics = GenericTable::new();
    let area = generics.define("area");
    let describe = generics.define("describe");

    area.register(
        ["Square"],
        Role::Primary,
        Method::new(|_, args| {
            let side = args[0]
                .as_instance()
                .and_then(|sq| sq.field("side"))
                .and_then(Value::as_int)
                .unwrap_or(0);
            Ok(Value::Int(side * side))
        }),
    )
    .unwrap();

    let area_fn = Arc::clone(&area);
    describe
        .register(
            ["*"],
            Role::Primary,
            Method::new(move |ctx, args| {
                let area = ctx.dispatch_on(&area_fn, args)?;
                Ok(Value::string(format!("area {area}")))
            }),
        )
        .unwrap();

    let square = Value::object("Square", [("side", Value::Int(3))]);
    assert_eq!(
        generics.call("describe", &[square]).unwrap(),
        Value::string("area 9")
    );
}

#[test]
fn handlers_may_register_during_dispatch() {
    let d = Arc::new(Dispatcher::new());
    let target = Arc::clone(&d);
    d.register(
        ["int"],
        Role::Primary,
        Method::new(move |_, _| {
            target.register(["string"], Role::Primary, Method::constant(Value::Bool(true)))?;
            Ok(Value::Void)
        }),
    )
    .unwrap();

    assert!(!d.exists(["string"]));
    d.dispatch(&[Value::Int(1)]).unwrap();
    assert!(d.exists(["string"]));
    assert_eq!(d.dispatch(&[Value::string("s")]).unwrap(), Value::Bool(true));
}

#[test]
fn dispatch_from_many_threads() {
    let d = Arc::new(fib());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let d = Arc::clone(&d);
            thread::spawn(move || d.dispatch(&[Value::Int(10 + i % 3)]))
        })
        .collect();

    let results: Vec<i64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap().as_int().unwrap())
        .collect();
    for (i, value) in results.into_iter().enumerate() {
        let expected = [55, 89, 144][i % 3];
        assert_eq!(value, expected);
    }
}

#[test]
fn registration_races_with_dispatch() {
    let d = Arc::new(Dispatcher::new());
    d.register(["*"], Role::Primary, Method::constant(Value::string("any")))
        .unwrap();

    let writer = {
        let d = Arc::clone(&d);
        thread::spawn(move || {
            for _ in 0..200 {
                d.register(["int"], Role::Before, Method::constant(Value::Void))
                    .unwrap();
                d.unregister(["int"]);
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let d = Arc::clone(&d);
            thread::spawn(move || {
                (0..200).all(|n| d.dispatch(&[Value::Int(n)]) == Ok(Value::string("any")))
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        assert!(reader.join().unwrap());
    }
}
