use std::{any::Any, future::Future, sync::Arc};
use tracing::debug;

use crate::{
    any::TypeInfo,
    async_impl::service::{service_fn as async_service_fn, BoxCloneService as AsyncBoxCloneService},
    container::Container,
    errors::FactoryErrorKind,
    service::{service_fn, BoxCloneService},
    utils::future::BoxFuture,
};

pub(crate) type BoxedInstance = Arc<dyn Any + Send + Sync>;
pub(crate) type BoxedArgs = Box<dyn Any + Send>;

pub(crate) type BoxedSyncFactory = BoxCloneService<(Container, BoxedArgs), BoxedInstance, FactoryErrorKind>;
pub(crate) type BoxedAsyncFactory = AsyncBoxCloneService<(Container, BoxedArgs), BoxedInstance, FactoryErrorKind>;

/// Type-erased factory of a registration.
/// The container passed in is the one that owns the registration.
pub(crate) enum Factory {
    Sync(BoxedSyncFactory),
    Async(BoxedAsyncFactory),
}

#[must_use]
pub(crate) fn boxed_factory<T, A, E, F>(factory: F) -> BoxedSyncFactory
where
    F: Fn(&Container, A) -> Result<T, E> + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
    A: Send + 'static,
    E: Into<anyhow::Error>,
{
    BoxCloneService::new(service_fn(move |(container, args): (Container, BoxedArgs)| -> Result<BoxedInstance, FactoryErrorKind> {
        let args = downcast_args::<A>(args)?;
        let instance = factory(&container, args).map_err(|err| FactoryErrorKind::Failed(err.into()))?;

        debug!("Constructed");

        Ok(Arc::new(instance) as BoxedInstance)
    }))
}

#[must_use]
pub(crate) fn boxed_async_factory<T, A, E, F, Fut>(factory: F) -> BoxedAsyncFactory
where
    F: Fn(Container, A) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + Sync + 'static,
    A: Send + 'static,
    E: Into<anyhow::Error>,
{
    AsyncBoxCloneService::new(async_service_fn(move |(container, args): (Container, BoxedArgs)| {
        let constructing = downcast_args::<A>(args).map(|args| factory(container, args));

        Box::pin(async move {
            let instance = constructing?.await.map_err(|err| FactoryErrorKind::Failed(err.into()))?;

            debug!("Constructed");

            Ok::<_, FactoryErrorKind>(Arc::new(instance) as BoxedInstance)
        }) as BoxFuture<'static, Result<BoxedInstance, FactoryErrorKind>>
    }))
}

fn downcast_args<A: 'static>(args: BoxedArgs) -> Result<A, FactoryErrorKind> {
    args.downcast::<A>().map(|args| *args).map_err(|_| FactoryErrorKind::InvalidArgsType {
        expected: TypeInfo::of::<A>(),
    })
}
