use super::base::Service;
use crate::utils::future::BoxFuture;

type BoxedCall<Response, Error> = BoxFuture<'static, Result<Response, Error>>;

/// Type-erased clonable service.
/// Its futures are boxed by the wrapped service, so services built from different closures share one type.
pub(crate) struct BoxCloneService<Request, Response, Error>(
    Box<dyn CloneService<Request, Response = Response, Error = Error, Future = BoxedCall<Response, Error>> + Send + Sync>,
);

impl<Request, Response, Error> BoxCloneService<Request, Response, Error> {
    #[must_use]
    pub(crate) fn new<S>(inner: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Error, Future = BoxedCall<Response, Error>> + Clone + Send + Sync + 'static,
    {
        Self(Box::new(inner))
    }
}

trait CloneService<Request>: Service<Request> {
    fn clone_box(
        &self,
    ) -> Box<dyn CloneService<Request, Response = Self::Response, Error = Self::Error, Future = Self::Future> + Send + Sync>;
}

impl<Request, T> CloneService<Request> for T
where
    T: Service<Request> + Clone + Send + Sync + 'static,
{
    #[inline]
    fn clone_box(&self) -> Box<dyn CloneService<Request, Response = T::Response, Error = T::Error, Future = T::Future> + Send + Sync> {
        Box::new(self.clone())
    }
}

impl<Request, Response, Error> Clone for BoxCloneService<Request, Response, Error> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl<Request, Response, Error> Service<Request> for BoxCloneService<Request, Response, Error> {
    type Response = Response;
    type Error = Error;
    type Future = BoxedCall<Response, Error>;

    #[inline]
    fn call(&mut self, request: Request) -> Self::Future {
        self.0.call(request)
    }
}
