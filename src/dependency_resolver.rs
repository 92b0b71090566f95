use std::future::Future;

use crate::{container::Container, errors::ResolveError};

/// Resolves a value out of a container.
///
/// Used by [`Container::autowire`] to build the arguments of a factory,
/// and implemented for tuples of resolvers, so a factory may take several dependencies at once.
pub trait DependencyResolver: Sized {
    fn resolve(container: &Container) -> Result<Self, ResolveError>;

    fn resolve_async(container: &Container) -> impl Future<Output = Result<Self, ResolveError>> + Send;
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver + Send, )*
        {
            #[inline]
            #[allow(unused_variables)]
            fn resolve(container: &Container) -> Result<Self, ResolveError> {
                Ok(($($ty::resolve(container)?,)*))
            }

            #[inline]
            #[allow(unused_variables)]
            async fn resolve_async(container: &Container) -> Result<Self, ResolveError> {
                Ok(($($ty::resolve_async(container).await?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
