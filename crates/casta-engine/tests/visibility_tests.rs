//! Integration tests for member visibility enforcement
//!
//! Tests cover:
//! - Public access from outside the class
//! - Protected and private members rejected at external access sites
//! - Private members re-scoped away from subclasses
//! - Protected members shared down the hierarchy
//! - Static member visibility
//! - Receiver-less access from static methods

use casta_engine::{
    define_class, CallContext, RuntimeError, TypeSpec, Value, Visibility,
};

#[test]
fn test_external_access_reaches_public_members_only() {
    let account = define_class(
        TypeSpec::new("Account")
            .field("owner", Value::str("ada"))
            .field("_balance", Value::int(100))
            .field("__pin", Value::int(1234)),
    )
    .unwrap();
    let acc = account.instantiate(&[]).unwrap();

    assert_eq!(acc.get("owner").unwrap(), Value::str("ada"));

    match acc.get("_balance") {
        Err(RuntimeError::AccessViolation {
            member, visibility, ..
        }) => {
            assert_eq!(member, "_balance");
            assert_eq!(visibility, Visibility::Protected);
        }
        other => panic!("expected access violation, got {:?}", other),
    }

    match acc.get("__pin") {
        Err(RuntimeError::AccessViolation {
            member, visibility, ..
        }) => {
            assert_eq!(member, "__pin");
            assert_eq!(visibility, Visibility::Private);
        }
        other => panic!("expected access violation, got {:?}", other),
    }
}

#[test]
fn test_methods_reach_their_own_protected_and_private_members() {
    let account = define_class(
        TypeSpec::new("Account")
            .field("_balance", Value::int(100))
            .field("__pin", Value::int(1234))
            .method("balance", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.get("_balance")
            })
            .method("check_pin", |ctx: &mut CallContext<'_>, args: &[Value]| {
                Ok(Value::bool(ctx.get("__pin")? == args[0]))
            }),
    )
    .unwrap();
    let mut acc = account.instantiate(&[]).unwrap();

    assert_eq!(acc.call("balance", &[]).unwrap(), Value::int(100));
    assert_eq!(
        acc.call("check_pin", &[Value::int(1234)]).unwrap(),
        Value::bool(true)
    );
}

#[test]
fn test_protected_members_are_shared_down_the_hierarchy() {
    let counter = define_class(
        TypeSpec::new("Counter")
            .field("_count", Value::int(0))
            .method("value", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.get("_count")
            }),
    )
    .unwrap();
    let stepper = define_class(TypeSpec::new("Stepper").extends(&counter).method(
        "step",
        |ctx: &mut CallContext<'_>, _args: &[Value]| {
            let count = ctx.get("_count")?.as_int().unwrap_or(0);
            ctx.set("_count", Value::int(count + 1))?;
            Ok(Value::Null)
        },
    ))
    .unwrap();

    let mut s = stepper.instantiate(&[]).unwrap();
    s.call("step", &[]).unwrap();
    s.call("step", &[]).unwrap();
    // The subclass's writes land in the slot the parent's getter reads.
    assert_eq!(s.call("value", &[]).unwrap(), Value::int(2));
}

#[test]
fn test_protected_methods_are_not_callable_externally() {
    let worker = define_class(
        TypeSpec::new("Worker")
            .method("_work", |_ctx: &mut CallContext<'_>, _args: &[Value]| {
                Ok(Value::str("done"))
            })
            .method("run", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.call("_work", &[])
            }),
    )
    .unwrap();
    let mut w = worker.instantiate(&[]).unwrap();

    assert_eq!(w.call("run", &[]).unwrap(), Value::str("done"));
    assert!(matches!(
        w.call("_work", &[]),
        Err(RuntimeError::AccessViolation { .. })
    ));
}

#[test]
fn test_grandchild_redeclares_a_grandparent_private_member() {
    let vault = define_class(
        TypeSpec::new("Vault")
            .field("__secret", Value::str("grandparent"))
            .method("reveal", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.get("__secret")
            }),
    )
    .unwrap();
    let middle = define_class(TypeSpec::new("Middle").extends(&vault)).unwrap();

    // Redeclaring the bare name is a fresh member, not an override.
    let leaf = define_class(
        TypeSpec::new("Leaf")
            .extends(&middle)
            .field("__secret", Value::str("grandchild"))
            .method("peek", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.get("__secret")
            }),
    )
    .unwrap();

    let mut l = leaf.instantiate(&[]).unwrap();

    // Grandparent-scoped code still reads the grandparent's own value.
    assert_eq!(l.call("reveal", &[]).unwrap(), Value::str("grandparent"));
    assert_eq!(l.call("peek", &[]).unwrap(), Value::str("grandchild"));
}

#[test]
fn test_parent_private_methods_stay_bound_to_parent_code() {
    let base = define_class(
        TypeSpec::new("Base")
            .method("__mix", |_ctx: &mut CallContext<'_>, _args: &[Value]| {
                Ok(Value::str("base-mix"))
            })
            .method("blend", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.call("__mix", &[])
            }),
    )
    .unwrap();
    let sub = define_class(TypeSpec::new("Sub").extends(&base).method(
        "__mix",
        |_ctx: &mut CallContext<'_>, _args: &[Value]| Ok(Value::str("sub-mix")),
    ))
    .unwrap();

    let mut s = sub.instantiate(&[]).unwrap();
    // `blend` runs in Base's scope, so it binds Base's private method,
    // not the subclass's redeclaration.
    assert_eq!(s.call("blend", &[]).unwrap(), Value::str("base-mix"));
}

#[test]
fn test_private_members_are_invisible_to_subclass_code() {
    let base = define_class(TypeSpec::new("Base").field("__hidden", Value::int(1))).unwrap();
    let sub = define_class(TypeSpec::new("Sub").extends(&base).method(
        "probe",
        |ctx: &mut CallContext<'_>, _args: &[Value]| ctx.get("__hidden"),
    ))
    .unwrap();

    let mut s = sub.instantiate(&[]).unwrap();
    assert!(matches!(
        s.call("probe", &[]),
        Err(RuntimeError::UnknownMember { .. })
    ));
}

#[test]
fn test_static_member_visibility() {
    let registry = define_class(
        TypeSpec::new("Registry")
            .static_field("size", Value::int(0))
            .static_field("_seed", Value::int(42))
            .static_method("seed", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.static_get("_seed")
            }),
    )
    .unwrap();

    assert_eq!(registry.static_get("size").unwrap(), Value::int(0));
    registry.static_set("size", Value::int(3)).unwrap();
    assert_eq!(registry.static_get("size").unwrap(), Value::int(3));

    assert!(matches!(
        registry.static_get("_seed"),
        Err(RuntimeError::AccessViolation { .. })
    ));
    assert_eq!(registry.static_call("seed", &[]).unwrap(), Value::int(42));
}

#[test]
fn test_static_methods_have_no_receiver() {
    let util = define_class(
        TypeSpec::new("Util")
            .field("x", Value::int(0))
            .static_method("poke", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                ctx.get("x")
            }),
    )
    .unwrap();

    assert_eq!(
        util.static_call("poke", &[]).unwrap_err(),
        RuntimeError::MissingReceiver {
            member: "x".to_string()
        }
    );
}

#[test]
fn test_instance_methods_reach_statics_of_their_class() {
    let counter = define_class(
        TypeSpec::new("Counter")
            .static_field("created", Value::int(0))
            .method("initialize", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                let created = ctx.static_get("created")?.as_int().unwrap_or(0);
                ctx.static_set("created", Value::int(created + 1))?;
                Ok(Value::Null)
            }),
    )
    .unwrap();

    counter.instantiate(&[]).unwrap();
    counter.instantiate(&[]).unwrap();
    assert_eq!(counter.static_get("created").unwrap(), Value::int(2));
}
