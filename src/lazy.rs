use std::{
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    sync::Arc,
};
use tracing::error;

use crate::{
    container::{Container, WeakContainer},
    errors::{ResolveError, ResolveErrorKind},
    key::{Key, Tags},
};

/// Deferred resolution of `T` taking arguments of type `A`.
///
/// The handle doesn't keep the container alive,
/// so an instance may hold a `Lazy` to its own container without creating a reference cycle.
/// Every call resolves anew: singletons come from the cache, transients are built again.
pub struct Lazy<T, A = ()> {
    container: WeakContainer,
    key: Key,
    _marker: PhantomData<fn(A) -> T>,
}

impl<T, A> Clone for Lazy<T, A> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, A> Debug for Lazy<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy").field("key", &self.key).finish_non_exhaustive()
    }
}

impl<T, A> Lazy<T, A>
where
    T: Send + Sync + 'static,
    A: Send + 'static,
{
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    /// # Errors
    /// - Returns [`ResolveErrorKind::NoResolver`] if the container was dropped
    /// - Returns errors of [`Container::resolve_key`]
    pub fn resolve(&self, args: A) -> Result<Arc<T>, ResolveError> {
        self.container()?.resolve_key(&self.key, args)
    }

    pub async fn resolve_async(&self, args: A) -> Result<Arc<T>, ResolveError> {
        self.container()?.resolve_key_async(&self.key, args).await
    }

    fn container(&self) -> Result<Container, ResolveError> {
        self.container.upgrade().ok_or_else(|| {
            let err = ResolveError::new(self.key.clone(), ResolveErrorKind::NoResolver);
            error!("{}", err);
            err
        })
    }
}

impl<T: Send + Sync + 'static> Lazy<T> {
    #[inline]
    pub fn get(&self) -> Result<Arc<T>, ResolveError> {
        self.resolve(())
    }

    #[inline]
    pub async fn get_async(&self) -> Result<Arc<T>, ResolveError> {
        self.resolve_async(()).await
    }
}

impl Container {
    /// Creates a handle resolving `T` under `tags` on demand
    #[inline]
    #[must_use]
    pub fn lazy<T: Send + Sync + 'static>(&self, tags: impl Into<Tags>) -> Lazy<T> {
        self.lazy_with(tags)
    }

    #[must_use]
    pub fn lazy_with<T, A>(&self, tags: impl Into<Tags>) -> Lazy<T, A>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        Lazy {
            container: self.downgrade(),
            key: Key::new::<T>(tags).with_args::<A>(),
            _marker: PhantomData,
        }
    }
}
