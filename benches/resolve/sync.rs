#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::{convert::Infallible, sync::Arc};
use tessera::{Container, Inject, Lifetime, Tags};

struct A(Arc<B>, Arc<C>);
struct B(i32);
struct C(Arc<CA>);
struct CA(Arc<CAA>);
struct CAA(Arc<CAAA>);
struct CAAA;

#[inline]
fn container_with_chain(lifetime: Lifetime) -> Container {
    let container = Container::new();
    container.provide(lifetime, |_| Ok::<_, Infallible>(CAAA));
    container.autowire((), lifetime, |Inject(caaa): Inject<CAAA>| Ok::<_, Infallible>(CAA(caaa)));
    container.autowire((), lifetime, |Inject(caa): Inject<CAA>| Ok::<_, Infallible>(CA(caa)));
    container.autowire((), lifetime, |Inject(ca): Inject<CA>| Ok::<_, Infallible>(C(ca)));
    container.provide(lifetime, |_| Ok::<_, Infallible>(B(2)));
    container.autowire((), lifetime, |(Inject(b), Inject(c)): (Inject<B>, Inject<C>)| Ok::<_, Infallible>(A(b, c)));
    container
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("resolve_singleton_single", |b| {
        let container = Container::new();
        container.provide(Lifetime::Singleton, |_| Ok::<_, Infallible>(CAAA));
        b.iter(|| container.resolve::<CAAA>().unwrap());
    })
    .bench_function("resolve_singleton_many", |b| {
        let container = container_with_chain(Lifetime::Singleton);
        b.iter(|| container.resolve::<A>().unwrap());
    })
    .bench_function("resolve_transient_single", |b| {
        let container = Container::new();
        container.provide(Lifetime::Transient, |_| Ok::<_, Infallible>(CAAA));
        b.iter(|| container.resolve::<CAAA>().unwrap());
    })
    .bench_function("resolve_transient_many", |b| {
        let container = container_with_chain(Lifetime::Transient);
        b.iter(|| container.resolve::<A>().unwrap());
    })
    .bench_function("resolve_transient_many_from_child", |b| {
        let container = container_with_chain(Lifetime::Transient).child().child();
        b.iter(|| container.resolve::<A>().unwrap());
    })
    .bench_function("resolve_all_tagged", |b| {
        let container = Container::new();
        for index in 0..16 {
            let tags = Tags::from("handler").with(index).with(if index % 2 == 0 { "http" } else { "grpc" });
            container.register(tags, Lifetime::Singleton, move |_: &Container, (): ()| Ok::<_, Infallible>(B(index)));
        }
        b.iter(|| container.resolve_all::<B>("http").unwrap());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
