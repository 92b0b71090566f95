use parking_lot::RwLock;
use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Debug, Formatter},
    future::Future,
    sync::{Arc, Weak},
};
use tracing::{debug, error, info_span, Instrument as _};

use crate::{
    any::TypeInfo,
    config::Config,
    criteria::Criteria,
    dependency_resolver::DependencyResolver,
    entry::Entry,
    errors::{ResolveError, ResolveErrorKind},
    factory::{boxed_async_factory, boxed_factory, BoxedInstance, Factory},
    key::{Key, Tags},
    lifetime::Lifetime,
};

/// Registry of factories keyed by [`Key`], with an optional parent to fall back to.
///
/// Cloning is cheap and every clone refers to the same registrations.
/// A child sees every registration of its ancestors and may override any of them
/// without affecting the parent.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    entries: RwLock<BTreeMap<Key, Arc<Entry>>>,
    parent: Option<Container>,
    config: Option<Config>,
}

/// Non-owning handle to a [`Container`].
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<ContainerInner>,
}

impl WeakContainer {
    /// Returns the container if it's still alive
    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("keys", &self.inner.entries.read().keys().collect::<Vec<_>>())
            .field("parent", &self.inner.parent)
            .field("config", &self.config())
            .finish()
    }
}

impl Container {
    /// Creates a root container following the process-wide [`Config::global`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(None, None)
    }

    /// Creates a root container with its own config, ignoring [`Config::global`]
    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::from_parts(None, Some(config))
    }

    /// Creates a child container.
    /// The child inherits the config override of this container, if any.
    #[inline]
    #[must_use]
    pub fn child(&self) -> Self {
        Self::from_parts(Some(self.clone()), self.inner.config)
    }

    #[inline]
    #[must_use]
    pub fn child_with_config(&self, config: Config) -> Self {
        Self::from_parts(Some(self.clone()), Some(config))
    }

    fn from_parts(parent: Option<Container>, config: Option<Config>) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                entries: RwLock::new(BTreeMap::new()),
                parent,
                config,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    /// Config in effect for this container.
    /// Without an override it's read from [`Config::global`] on every call.
    #[inline]
    #[must_use]
    pub fn config(&self) -> Config {
        self.inner.config.unwrap_or_else(Config::global)
    }

    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Container {
    /// Registers a factory for `T` under `tags`, taking arguments of type `A`.
    ///
    /// The factory receives the container that owns the registration.
    /// A registration for the same key in this container is replaced.
    /// Returns the key of the registration.
    pub fn register<T, A, E, F>(&self, tags: impl Into<Tags>, lifetime: Lifetime, factory: F) -> Key
    where
        F: Fn(&Container, A) -> Result<T, E> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
        A: Send + 'static,
        E: Into<anyhow::Error>,
    {
        let key = Key::new::<T>(tags).with_args::<A>();
        self.insert(key, lifetime, Factory::Sync(boxed_factory(factory)))
    }

    /// Registers an async factory for `T` under `tags`, taking arguments of type `A`.
    ///
    /// # Warning
    /// Synchronous resolution of this registration fails with [`ResolveErrorKind::RequiresAsync`]
    /// unless [`Config::allow_blocking_async`] is enabled.
    pub fn register_async<T, A, E, F, Fut>(&self, tags: impl Into<Tags>, lifetime: Lifetime, factory: F) -> Key
    where
        F: Fn(Container, A) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + Sync + 'static,
        A: Send + 'static,
        E: Into<anyhow::Error>,
    {
        let key = Key::new::<T>(tags).with_args::<A>();
        self.insert(key, lifetime, Factory::Async(boxed_async_factory(factory)))
    }

    /// Registers an untagged factory for `T` without arguments
    #[inline]
    pub fn provide<T, E, F>(&self, lifetime: Lifetime, factory: F) -> Key
    where
        F: Fn(&Container) -> Result<T, E> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
        E: Into<anyhow::Error>,
    {
        self.register((), lifetime, move |container: &Container, (): ()| factory(container))
    }

    /// Registers an untagged async factory for `T` without arguments
    #[inline]
    pub fn provide_async<T, E, F, Fut>(&self, lifetime: Lifetime, factory: F) -> Key
    where
        F: Fn(Container) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + Sync + 'static,
        E: Into<anyhow::Error>,
    {
        self.register_async((), lifetime, move |container: Container, (): ()| factory(container))
    }

    /// Registers an already built value as an untagged singleton
    #[inline]
    pub fn instance<T>(&self, value: T) -> Key
    where
        T: Clone + Send + Sync + 'static,
    {
        self.register((), Lifetime::Singleton, move |_: &Container, (): ()| {
            Ok::<_, std::convert::Infallible>(value.clone())
        })
    }

    /// Registers a factory whose dependencies are resolved from the container by [`DependencyResolver`]
    pub fn autowire<T, Deps, E, F>(&self, tags: impl Into<Tags>, lifetime: Lifetime, factory: F) -> Key
    where
        F: Fn(Deps) -> Result<T, E> + Clone + Send + Sync + 'static,
        Deps: DependencyResolver,
        T: Send + Sync + 'static,
        E: Into<anyhow::Error>,
    {
        self.register(tags, lifetime, move |container: &Container, (): ()| -> Result<T, anyhow::Error> {
            let dependencies = Deps::resolve(container)?;
            factory(dependencies).map_err(Into::into)
        })
    }

    /// Async version of [`Container::autowire`]
    pub fn autowire_async<T, Deps, E, F, Fut>(&self, tags: impl Into<Tags>, lifetime: Lifetime, factory: F) -> Key
    where
        F: Fn(Deps) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        Deps: DependencyResolver + Send + 'static,
        T: Send + Sync + 'static,
        E: Into<anyhow::Error>,
    {
        self.register_async(tags, lifetime, move |container: Container, (): ()| {
            let factory = factory.clone();
            async move {
                let dependencies = Deps::resolve_async(&container).await?;
                let instance = factory(dependencies).await.map_err(Into::<anyhow::Error>::into)?;
                Ok::<_, anyhow::Error>(instance)
            }
        })
    }

    fn insert(&self, key: Key, lifetime: Lifetime, factory: Factory) -> Key {
        let entry = Arc::new(Entry::new(key.clone(), lifetime, factory));
        let replaced = self.inner.entries.write().insert(key.clone(), entry).is_some();

        if replaced {
            debug!(%key, %lifetime, "Registration replaced");
        } else {
            debug!(%key, %lifetime, "Registered");
        }

        key
    }

    /// Removes registrations of this container.
    /// Ancestors are not affected and unknown keys are ignored.
    /// Returns the number of removed registrations.
    pub fn unregister<K, I>(&self, keys: I) -> usize
    where
        K: Borrow<Key>,
        I: IntoIterator<Item = K>,
    {
        let mut entries = self.inner.entries.write();
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(key.borrow()) {
                debug!(key = %entry.key(), "Unregistered");
                removed += 1;
            }
        }
        removed
    }

    /// Removes registrations of this container matching `criteria`.
    /// Returns the number of removed registrations.
    pub fn unregister_matching(&self, criteria: &Criteria) -> usize {
        let mut entries = self.inner.entries.write();
        let before = entries.len();
        entries.retain(|key, entry| !criteria.matches_entry(key, entry.lifetime()));
        let removed = before - entries.len();
        debug!(removed, "Unregistered matching");
        removed
    }
}

impl Container {
    /// Returns `true` if `key` is registered in this container or any of its ancestors
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.lookup(key).is_some()
    }

    /// Keys visible from this container that match `criteria`.
    ///
    /// A key registered at several levels is judged by its nearest registration,
    /// so an override with another lifetime hides the ancestor's one.
    #[must_use]
    pub fn find(&self, criteria: &Criteria) -> BTreeSet<Key> {
        let mut seen = BTreeSet::new();
        let mut found = BTreeSet::new();

        let mut current = Some(self);
        while let Some(container) = current {
            for (key, entry) in container.inner.entries.read().iter() {
                if seen.insert(key.clone()) && criteria.matches_entry(key, entry.lifetime()) {
                    found.insert(key.clone());
                }
            }
            current = container.parent();
        }

        found
    }

    /// Nearest registration of `key` and the container that owns it
    pub(crate) fn lookup(&self, key: &Key) -> Option<(Arc<Entry>, Container)> {
        let mut current = Some(self);
        while let Some(container) = current {
            let entry = container.inner.entries.read().get(key).cloned();
            if let Some(entry) = entry {
                return Some((entry, container.clone()));
            }
            current = container.parent();
        }
        None
    }

    /// Resolves the untagged `T` registered without arguments.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotFound`] if there is no such registration in this container or its ancestors
    /// - Returns [`ResolveErrorKind::RequiresAsync`] if the registration is backed by an async factory
    ///   and blocking is not allowed
    /// - Returns [`ResolveErrorKind::Factory`] if the factory or one of its dependencies failed
    #[inline]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        self.resolve_key(&Key::of::<T>(), ())
    }

    #[inline]
    pub fn resolve_tagged<T: Send + Sync + 'static>(&self, tags: impl Into<Tags>) -> Result<Arc<T>, ResolveError> {
        self.resolve_key(&Key::new::<T>(tags), ())
    }

    #[inline]
    pub fn resolve_with<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        self.resolve_key(&Key::new::<T>(tags).with_args::<A>(), args)
    }

    /// Resolves the registration of exactly `key`, passing `args` to its factory.
    ///
    /// # Errors
    /// Besides the errors of [`Container::resolve`]:
    /// - Returns [`ResolveErrorKind::InvalidArgsType`] if `A` isn't the arguments type of the registration
    /// - Returns [`ResolveErrorKind::InvalidInstanceType`] if `T` isn't the type the registration provides
    pub fn resolve_key<T, A>(&self, key: &Key, args: A) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        let span = info_span!("resolve", %key);
        let _guard = span.enter();

        let (entry, owner) = self.lookup_or_not_found(key)?;
        let instance = entry.resolve(&owner, Box::new(args))?;
        downcast_instance(key, instance)
    }

    #[inline]
    pub async fn resolve_async<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        self.resolve_key_async(&Key::of::<T>(), ()).await
    }

    #[inline]
    pub async fn resolve_tagged_async<T: Send + Sync + 'static>(&self, tags: impl Into<Tags>) -> Result<Arc<T>, ResolveError> {
        self.resolve_key_async(&Key::new::<T>(tags), ()).await
    }

    #[inline]
    pub async fn resolve_with_async<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        self.resolve_key_async(&Key::new::<T>(tags).with_args::<A>(), args).await
    }

    /// Async version of [`Container::resolve_key`].
    /// Sync factories run inline, async ones are awaited.
    pub async fn resolve_key_async<T, A>(&self, key: &Key, args: A) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        let span = info_span!("resolve_async", %key);

        async move {
            let (entry, owner) = self.lookup_or_not_found(key)?;
            let instance = entry.resolve_async(&owner, Box::new(args)).await?;
            downcast_instance(key, instance)
        }
        .instrument(span)
        .await
    }

    fn lookup_or_not_found(&self, key: &Key) -> Result<(Arc<Entry>, Container), ResolveError> {
        self.lookup(key).ok_or_else(|| {
            let err = ResolveError::not_found(key.clone());
            debug!("{}", err);
            err
        })
    }
}

pub(crate) fn downcast_instance<T: Send + Sync + 'static>(key: &Key, instance: BoxedInstance) -> Result<Arc<T>, ResolveError> {
    instance.downcast::<T>().map_err(|instance| {
        let err = ResolveError::new(
            key.clone(),
            ResolveErrorKind::InvalidInstanceType {
                expected: TypeInfo::of::<T>(),
                actual: (*instance).type_id(),
            },
        );
        error!("{}", err);
        err
    })
}
