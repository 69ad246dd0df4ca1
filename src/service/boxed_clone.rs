use alloc::boxed::Box;

use super::base::Service;

/// Type-erased service that can be cloned and shared between threads.
///
/// Factories are stored this way so descriptors, final sets and locator entries stay `Clone + Send + Sync`.
pub(crate) struct BoxCloneService<Request, Response, Error>(
    pub(crate) Box<dyn CloneService<Request, Response = Response, Error = Error> + Send + Sync>,
);

impl<Request, Response, Error> BoxCloneService<Request, Response, Error>
where
    Request: 'static,
    Response: 'static,
    Error: 'static,
{
    /// Boxes a closure taking the request, e.g. a resolver for factories or a value for finalizers
    #[inline]
    #[must_use]
    pub(crate) fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(Request) -> Result<Response, Error> + Clone + Send + Sync + 'static,
    {
        Self(Box::new(FnService(f)))
    }
}

#[derive(Clone)]
struct FnService<F>(F);

impl<F, Request, Response, Error> Service<Request> for FnService<F>
where
    F: FnMut(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&mut self, request: Request) -> Result<Self::Response, Self::Error> {
        (self.0)(request)
    }
}

pub(crate) trait CloneService<Request>: Service<Request> {
    #[must_use]
    fn clone_box(&self) -> Box<dyn CloneService<Request, Response = Self::Response, Error = Self::Error> + Send + Sync>;
}

impl<Request, T> CloneService<Request> for T
where
    T: Service<Request> + Clone + Send + Sync + 'static,
{
    #[inline]
    fn clone_box(&self) -> Box<dyn CloneService<Request, Response = T::Response, Error = T::Error> + Send + Sync> {
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

    #[inline]
    fn call(&mut self, request: Request) -> Result<Self::Response, Self::Error> {
        self.0.call(request)
    }
}
