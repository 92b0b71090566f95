use std::sync::Arc;

use crate::{container::Container, dependency_resolver::DependencyResolver, errors::ResolveError, lazy::Lazy};

/// Untagged `Dep` registered without arguments
pub struct Inject<Dep>(pub Arc<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    fn resolve(container: &Container) -> Result<Self, ResolveError> {
        container.resolve().map(Self)
    }

    async fn resolve_async(container: &Container) -> Result<Self, ResolveError> {
        container.resolve_async().await.map(Self)
    }
}

/// Untagged `Dep`, or `None` if it isn't registered
pub struct InjectOptional<Dep>(pub Option<Arc<Dep>>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectOptional<Dep> {
    fn resolve(container: &Container) -> Result<Self, ResolveError> {
        container.resolve_optional(()).map(Self)
    }

    async fn resolve_async(container: &Container) -> Result<Self, ResolveError> {
        container.resolve_optional_async(()).await.map(Self)
    }
}

/// Every registration of `Dep` without arguments, whatever its tags
pub struct InjectAll<Dep>(pub Vec<Arc<Dep>>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectAll<Dep> {
    fn resolve(container: &Container) -> Result<Self, ResolveError> {
        container.resolve_all(()).map(Self)
    }

    async fn resolve_async(container: &Container) -> Result<Self, ResolveError> {
        container.resolve_all_async(()).await.map(Self)
    }
}

/// Deferred untagged `Dep`
pub struct InjectLazy<Dep>(pub Lazy<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectLazy<Dep> {
    fn resolve(container: &Container) -> Result<Self, ResolveError> {
        Ok(Self(container.lazy(())))
    }

    async fn resolve_async(container: &Container) -> Result<Self, ResolveError> {
        Ok(Self(container.lazy(())))
    }
}
