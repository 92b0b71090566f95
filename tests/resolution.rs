use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tessera::{
    Assembler, Assembly, Config, Container, Criteria, Inject, InjectLazy, Key, Lifetime, ResolveError, ResolveErrorKind, TagMatch,
};

struct Settings {
    url: &'static str,
}

struct Pool {
    url: &'static str,
}

struct Repository {
    pool: Arc<Pool>,
}

struct Handler {
    repository: InjectLazy<Repository>,
}

struct StorageAssembly;

impl Assembly for StorageAssembly {
    fn register(&self, container: &Container) {
        container.instance(Arc::new(Settings { url: "postgres://db" }));
        container.autowire_async((), Lifetime::Singleton, |Inject(settings): Inject<Arc<Settings>>| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, Infallible>(Pool { url: settings.url })
        });
        container.autowire((), Lifetime::Transient, |Inject(pool): Inject<Pool>| Ok::<_, Infallible>(Repository { pool }));
    }
}

struct HttpAssembly;

impl Assembly for HttpAssembly {
    fn register(&self, container: &Container) {
        container.autowire((), Lifetime::Singleton, |repository: InjectLazy<Repository>| Ok::<_, Infallible>(Handler { repository }));
    }

    fn dependencies(&self) -> Vec<Arc<dyn Assembly>> {
        vec![Arc::new(StorageAssembly)]
    }
}

#[tokio::test]
async fn test_assembled_application() {
    let container = Assembler::new(Container::with_config(Config::default()))
        .with(HttpAssembly)
        .assemble()
        .await
        .unwrap();

    let handler = container.resolve::<Handler>().unwrap();
    let err = handler.repository.0.get().err().unwrap();
    assert!(matches!(err.kind, ResolveErrorKind::Factory(_)));
    assert_eq!(
        err.key_chain(),
        vec![&Key::of::<Repository>(), &Key::of::<Pool>()]
    );
    assert!(matches!(err.root_cause().kind, ResolveErrorKind::RequiresAsync));

    // A sync factory resolves its dependencies synchronously, warm the async one first.
    let pool = container.resolve_async::<Pool>().await.unwrap();
    assert_eq!(pool.url, "postgres://db");

    let repository = handler.repository.0.get().unwrap();
    assert!(Arc::ptr_eq(&repository.pool, &pool));
    assert!(handler.repository.0.get_async().await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_singleton_unique_across_sync_and_async_callers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::with_config(Config::default().with_blocking_async(true));
    container.provide_async(Lifetime::Singleton, {
        let calls = calls.clone();
        move |_| {
            let calls = calls.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Pool { url: "shared" })
            }
        }
    });

    let mut handles = Vec::new();
    for index in 0..32 {
        let container = container.clone();
        if index % 4 == 0 {
            handles.push(tokio::task::spawn_blocking(move || container.resolve::<Pool>().unwrap()));
        } else {
            handles.push(tokio::spawn(async move { container.resolve_async::<Pool>().await.unwrap() }));
        }
    }

    let mut pools = Vec::new();
    for handle in handles {
        pools.push(handle.await.unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(pools.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_transient_instances_are_distinct() {
    let container = Container::new();
    container.provide(Lifetime::Transient, |_| Ok::<_, Infallible>(Pool { url: "fresh" }));

    let first = container.resolve::<Pool>().unwrap();
    let second = container.resolve::<Pool>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_child_override_is_invisible_to_parent() {
    let parent = Container::new();
    parent.instance(Arc::new(Settings { url: "parent" }));
    let child = parent.child();
    child.instance(Arc::new(Settings { url: "child" }));

    assert_eq!(child.resolve::<Arc<Settings>>().unwrap().url, "child");
    assert_eq!(parent.resolve::<Arc<Settings>>().unwrap().url, "parent");

    assert_eq!(child.unregister([Key::of::<Arc<Settings>>()]), 1);
    assert_eq!(child.resolve::<Arc<Settings>>().unwrap().url, "parent");
}

#[test]
fn test_find_with_subset_criteria() {
    let container = Container::new();
    container.register(["db", "primary"], Lifetime::Singleton, |_: &Container, (): ()| {
        Ok::<_, Infallible>(Pool { url: "primary" })
    });
    container.register(["db", "replica"], Lifetime::Transient, |_: &Container, (): ()| {
        Ok::<_, Infallible>(Pool { url: "replica" })
    });

    let criteria = Criteria::of::<Pool>().with_tags("db").matching(TagMatch::Subset);
    assert_eq!(container.find(&criteria).len(), 2);
    assert_eq!(container.find(&criteria.clone().with_lifetime(Lifetime::Transient)).len(), 1);
    assert!(container.find(&Criteria::of::<Pool>().with_tags("db")).is_empty());

    let urls = container.resolve_all::<Pool>("db").unwrap().iter().map(|pool| pool.url).collect::<Vec<_>>();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&"primary") && urls.contains(&"replica"));
}

#[test]
fn test_factory_error_is_attributed() {
    let container = Container::new();
    container.provide(Lifetime::Singleton, |container| {
        let settings = container.resolve::<Arc<Settings>>()?;
        Ok::<_, ResolveError>(Pool { url: settings.url })
    });

    let err = container.resolve::<Pool>().err().unwrap();

    assert_eq!(err.key, Key::of::<Pool>());
    assert!(err.root_cause().is_not_found_for(&Key::of::<Arc<Settings>>()));
    assert!(err.to_string().contains("Pool"));
}
