use alloc::{
    boxed::Box,
    string::{String, ToString},
};
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use core::{
    future::Future,
    task::{Context, Poll},
};
use futures_core::future::BoxFuture;
use tower_layer::Layer;
use tower_service::Service;
use tracing::error;

use crate::{Inject, InjectWith, Locator, Qualify, ResolveErrorKind};

#[derive(Clone)]
struct LocatorLayer {
    locator: Locator,
}

impl<S> Layer<S> for LocatorLayer {
    type Service = AddLocator<S>;

    fn layer(&self, service: S) -> Self::Service {
        AddLocator {
            service,
            locator: self.locator.clone(),
        }
    }
}

#[derive(Clone)]
struct AddLocator<S> {
    service: S,
    locator: Locator,
}

impl<ResBody, S> Service<Request<ResBody>> for AddLocator<S>
where
    S: Service<Request<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ResBody>) -> Self::Future {
        request.extensions_mut().insert(self.locator.clone());

        let future = self.service.call(request);
        Box::pin(async move {
            let response = future.await?;
            Ok(response)
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InjectErrorKind {
    #[error("Locator not found in extensions")]
    LocatorNotFound,
    #[error(transparent)]
    Resolve(ResolveErrorKind),
}

impl InjectErrorKind {
    #[inline]
    #[allow(clippy::unused_self)]
    const fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    #[inline]
    fn body(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for InjectErrorKind {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();

        (status, body).into_response()
    }
}

fn locator(parts: &Parts) -> Result<&Locator, InjectErrorKind> {
    parts.extensions.get::<Locator>().ok_or_else(|| {
        let err = InjectErrorKind::LocatorNotFound;
        error!("{}", err);
        err
    })
}

#[allow(clippy::manual_async_fn)]
impl<S, Dep> FromRequestParts<S> for Inject<Dep>
where
    Dep: Send + Sync + 'static,
{
    type Rejection = InjectErrorKind;

    fn from_request_parts(parts: &mut Parts, _state: &S) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            match locator(parts)?.get() {
                Ok(dep) => Ok(Self(dep)),
                Err(err) => Err(Self::Rejection::Resolve(err)),
            }
        }
    }
}

#[allow(clippy::manual_async_fn)]
impl<S, Dep, Q> FromRequestParts<S> for InjectWith<Dep, Q>
where
    Dep: Send + Sync + 'static,
    Q: Qualify,
{
    type Rejection = InjectErrorKind;

    fn from_request_parts(parts: &mut Parts, _state: &S) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            match locator(parts)?.get_qualified::<Dep, Q>() {
                Ok(dep) => Ok(Self::new(dep)),
                Err(err) => Err(Self::Rejection::Resolve(err)),
            }
        }
    }
}

/// Adds the locator to the extensions of every request handled by the router,
/// so handlers can take [`Inject`] and [`InjectWith`] parameters.
#[inline]
pub fn setup<S>(router: Router<S>, locator: Locator) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(LocatorLayer { locator })
}
