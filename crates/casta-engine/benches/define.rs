use criterion::{black_box, criterion_group, criterion_main, Criterion};

use casta_engine::{define_class, is_instance_of, CallContext, TypeSpec, Value};

fn bench_define_flat(c: &mut Criterion) {
    c.bench_function("define_flat_class", |b| {
        b.iter(|| {
            define_class(
                TypeSpec::new(black_box("Point"))
                    .field("x", Value::int(0))
                    .field("y", Value::int(0))
                    .method("sum", |ctx: &mut CallContext<'_>, _args: &[Value]| {
                        let x = ctx.get("x")?.as_int().unwrap_or(0);
                        let y = ctx.get("y")?.as_int().unwrap_or(0);
                        Ok(Value::int(x + y))
                    }),
            )
            .unwrap()
        });
    });
}

fn bench_define_hierarchy(c: &mut Criterion) {
    c.bench_function("define_hierarchy_depth_8", |b| {
        b.iter(|| {
            let mut parent = define_class(TypeSpec::new("L0").field("f0", Value::int(0))).unwrap();
            for depth in 1..8 {
                parent = define_class(
                    TypeSpec::new(format!("L{}", depth))
                        .extends(&parent)
                        .field(format!("f{}", depth), Value::int(0)),
                )
                .unwrap();
            }
            parent
        });
    });
}

fn bench_instantiate_and_dispatch(c: &mut Criterion) {
    let animal = define_class(
        TypeSpec::new("Animal")
            .field("name", Value::str(""))
            .method("speak", |_ctx: &mut CallContext<'_>, _args: &[Value]| {
                Ok(Value::str("..."))
            }),
    )
    .unwrap();
    let dog = define_class(TypeSpec::new("Dog").extends(&animal).method(
        "speak",
        |_ctx: &mut CallContext<'_>, _args: &[Value]| Ok(Value::str("woof")),
    ))
    .unwrap();

    c.bench_function("instantiate", |b| {
        b.iter(|| dog.instantiate(black_box(&[])).unwrap());
    });

    c.bench_function("dispatch_and_query", |b| {
        let mut d = dog.instantiate(&[]).unwrap();
        b.iter(|| {
            let sound = d.call("speak", black_box(&[])).unwrap();
            assert!(is_instance_of(&d, &animal));
            sound
        });
    });
}

criterion_group!(
    benches,
    bench_define_flat,
    bench_define_hierarchy,
    bench_instantiate_and_dispatch
);
criterion_main!(benches);
