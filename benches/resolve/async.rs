#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::{convert::Infallible, sync::Arc};
use tessera::{Container, Inject, Lifetime};
use tokio::runtime::Builder;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("async_resolve_singleton_single", |b| {
        struct A;

        let container = Container::new();
        container.provide_async(Lifetime::Singleton, |_| async { Ok::<_, Infallible>(A) });
        b.to_async(Builder::new_current_thread().build().unwrap()).iter(|| {
            let container = container.clone();
            async move { container.resolve_async::<A>().await.unwrap() }
        });
    })
    .bench_function("async_resolve_singleton_many", |b| {
        struct A(Arc<B>, Arc<C>);
        struct B(i32);
        struct C(Arc<CA>);
        struct CA(Arc<CAA>);
        struct CAA;

        let container = Container::new();
        container.provide_async(Lifetime::Singleton, |_| async { Ok::<_, Infallible>(CAA) });
        container.autowire_async((), Lifetime::Singleton, |Inject(caa): Inject<CAA>| async move { Ok::<_, Infallible>(CA(caa)) });
        container.autowire_async((), Lifetime::Singleton, |Inject(ca): Inject<CA>| async move { Ok::<_, Infallible>(C(ca)) });
        container.provide(Lifetime::Singleton, |_| Ok::<_, Infallible>(B(2)));
        container.autowire_async((), Lifetime::Singleton, |(Inject(b), Inject(c)): (Inject<B>, Inject<C>)| async move {
            Ok::<_, Infallible>(A(b, c))
        });
        b.to_async(Builder::new_current_thread().build().unwrap()).iter(|| {
            let container = container.clone();
            async move { container.resolve_async::<A>().await.unwrap() }
        });
    })
    .bench_function("async_resolve_transient_single", |b| {
        struct A;

        let container = Container::new();
        container.provide_async(Lifetime::Transient, |_| async { Ok::<_, Infallible>(A) });
        b.to_async(Builder::new_current_thread().build().unwrap()).iter(|| {
            let container = container.clone();
            async move { container.resolve_async::<A>().await.unwrap() }
        });
    })
    .bench_function("async_resolve_sync_transient_single", |b| {
        struct A;

        let container = Container::new();
        container.provide(Lifetime::Transient, |_| Ok::<_, Infallible>(A));
        b.to_async(Builder::new_current_thread().build().unwrap()).iter(|| {
            let container = container.clone();
            async move { container.resolve_async::<A>().await.unwrap() }
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
