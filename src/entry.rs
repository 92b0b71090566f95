use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, warn};

use crate::{
    async_impl::{bridge, service::Service as _},
    container::Container,
    errors::{FactoryErrorKind, ResolveError, ResolveErrorKind},
    factory::{BoxedArgs, BoxedAsyncFactory, BoxedInstance, BoxedSyncFactory, Factory},
    key::Key,
    lifetime::Lifetime,
    service::Service as _,
};

/// Registered factory of one key together with its resolution state.
///
/// A singleton entry caches the first successfully constructed instance.
/// Concurrent resolutions are serialized by a lock that is only taken when the cache is empty,
/// so at most one construction is in flight and every caller observes the same instance.
/// A failed construction caches nothing.
pub(crate) struct Entry {
    key: Key,
    lifetime: Lifetime,
    factory: Factory,
    resolution: RwLock<Option<BoxedInstance>>,
    sync_lock: Mutex<()>,
    async_lock: AsyncMutex<()>,
}

impl Entry {
    #[must_use]
    pub(crate) fn new(key: Key, lifetime: Lifetime, factory: Factory) -> Self {
        Self {
            key,
            lifetime,
            factory,
            resolution: RwLock::new(None),
            sync_lock: Mutex::new(()),
            async_lock: AsyncMutex::new(()),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) const fn key(&self) -> &Key {
        &self.key
    }

    #[inline]
    #[must_use]
    pub(crate) const fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    fn cached(&self) -> Option<BoxedInstance> {
        self.resolution.read().clone()
    }

    #[inline]
    fn cache(&self, instance: &BoxedInstance) {
        *self.resolution.write() = Some(instance.clone());
        debug!("Cached");
    }

    /// Resolves on the calling thread.
    /// An async factory is only run when `container` allows blocking on it.
    pub(crate) fn resolve(self: &Arc<Self>, container: &Container, args: BoxedArgs) -> Result<BoxedInstance, ResolveError> {
        match &self.factory {
            Factory::Sync(factory) => self.resolve_sync(factory, container, args),
            Factory::Async(_) => {
                if let Some(instance) = self.cached() {
                    debug!("Found in cache");
                    return Ok(instance);
                }
                if !container.config().allow_blocking_async {
                    let err = ResolveError::new(self.key.clone(), ResolveErrorKind::RequiresAsync);
                    error!("{}", err);
                    return Err(err);
                }

                warn!("Blocking on async factory");

                let entry = self.clone();
                let container = container.clone();
                match bridge::block_on(async move { entry.resolve_async(&container, args).await }) {
                    Ok(result) => result,
                    Err(err) => {
                        let err = ResolveError::new(self.key.clone(), ResolveErrorKind::Factory(err));
                        error!("{}", err);
                        Err(err)
                    }
                }
            }
        }
    }

    pub(crate) async fn resolve_async(&self, container: &Container, args: BoxedArgs) -> Result<BoxedInstance, ResolveError> {
        let factory = match &self.factory {
            Factory::Sync(factory) => return self.resolve_sync(factory, container, args),
            Factory::Async(factory) => factory,
        };

        if self.lifetime == Lifetime::Transient {
            return self.construct_async(factory, container, args).await;
        }

        if let Some(instance) = self.cached() {
            debug!("Found in cache");
            return Ok(instance);
        }

        let _guard = self.async_lock.lock().await;
        if let Some(instance) = self.cached() {
            debug!("Found in cache after waiting");
            return Ok(instance);
        }

        let instance = self.construct_async(factory, container, args).await?;
        self.cache(&instance);
        Ok(instance)
    }

    fn resolve_sync(&self, factory: &BoxedSyncFactory, container: &Container, args: BoxedArgs) -> Result<BoxedInstance, ResolveError> {
        if self.lifetime == Lifetime::Transient {
            return self.construct(factory, container, args);
        }

        if let Some(instance) = self.cached() {
            debug!("Found in cache");
            return Ok(instance);
        }

        let _guard = self.sync_lock.lock();
        if let Some(instance) = self.cached() {
            debug!("Found in cache after waiting");
            return Ok(instance);
        }

        let instance = self.construct(factory, container, args)?;
        self.cache(&instance);
        Ok(instance)
    }

    fn construct(&self, factory: &BoxedSyncFactory, container: &Container, args: BoxedArgs) -> Result<BoxedInstance, ResolveError> {
        factory
            .clone()
            .call((container.clone(), args))
            .map_err(|err| self.factory_error(err))
    }

    async fn construct_async(
        &self,
        factory: &BoxedAsyncFactory,
        container: &Container,
        args: BoxedArgs,
    ) -> Result<BoxedInstance, ResolveError> {
        let constructing = factory.clone().call((container.clone(), args));
        constructing.await.map_err(|err| self.factory_error(err))
    }

    fn factory_error(&self, err: FactoryErrorKind) -> ResolveError {
        let err = ResolveError::from_factory(&self.key, err);
        error!("{}", err);
        err
    }
}
