use alloc::{boxed::Box, sync::Arc};
use core::fmt::{self, Debug, Formatter};
use tracing::debug;

use super::{
    any::{BoxAny, RcAny},
    dependency_resolver::{DependencyResolver, Resolver},
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    service::{BoxCloneService, Service as _},
};

/// Factory of a provider or class binding.
///
/// Implemented for closures and functions whose parameters are [`DependencyResolver`]s,
/// so the parameter list is the declared dependency list.
pub trait Instantiator<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    /// # Errors
    /// Returns the factory error
    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

/// Config for a class binding
/// ## Fields
/// - `cache_provides`:
///   If `true`, the object constructed by the locator is cached and reused for next lookups.
///   If `false`, a new object is constructed on every lookup.
///
///   This does **not** affect the dependencies of the object, they follow their own bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub cache_provides: bool,
}

pub(crate) type BoxedCloneInstantiator =
    BoxCloneService<Arc<dyn Resolver>, BoxAny, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>;

/// Type-erased factory stored in a descriptor
#[derive(Clone)]
pub struct Factory(pub(crate) BoxedCloneInstantiator);

impl Factory {
    /// Resolves the factory parameters with `resolver` and calls the factory
    pub(crate) fn call(&self, resolver: Arc<dyn Resolver>) -> Result<RcAny, ResolveErrorKind> {
        match self.0.clone().call(resolver) {
            Ok(value) => Ok(RcAny::from(value)),
            Err(InstantiatorErrorKind::Deps(err)) => Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(err)))),
            Err(InstantiatorErrorKind::Factory(err)) => Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err))),
        }
    }
}

impl Debug for Factory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Factory")
    }
}

#[must_use]
pub(crate) fn boxed_instantiator<Inst, Deps>(instantiator: Inst) -> BoxedCloneInstantiator
where
    Inst: Instantiator<Deps> + Send + Sync,
    Inst::Provides: Send + Sync,
    Deps: DependencyResolver,
{
    BoxCloneService::from_fn({
        move |resolver: Arc<dyn Resolver>| {
            let dependencies = match Deps::resolve(&*resolver) {
                Ok(dependencies) => dependencies,
                Err(err) => return Err(InstantiatorErrorKind::Deps(err)),
            };
            let dependency = match instantiator.clone().instantiate(dependencies) {
                Ok(dependency) => dependency,
                Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
            };

            debug!("Instantiated");

            Ok(Box::new(dependency) as BoxAny)
        }
    })
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

/// Creates a `Box<dyn Trait>` from a value, optionally including supertraits.
///
/// # Syntax
/// ```text
/// boxed!(value; Trait [+ SuperTrait1 [+ SuperTrait2 ...]])
/// ```
///
/// # Examples
/// ```rust
/// use junction::boxed;
///
/// trait HelloService {}
///
/// struct HelloServiceImpl;
///
/// impl HelloService for HelloServiceImpl {}
///
/// let service: Box<dyn HelloService + Send + Sync> = boxed!(HelloServiceImpl; HelloService + Send + Sync);
/// ```
#[macro_export]
macro_rules! boxed {
    ($val:expr ; $trait:tt $($super_traits:tt)*) => {{
        Box::new($val) as Box<dyn $r#trait $($super_traits)*>
    }};
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{boxed_instantiator, DependencyResolver, InstantiateErrorKind, Instantiator};
    use crate::{
        any::RcAny,
        dependency_resolver::Resolver,
        errors::{InstantiatorErrorKind, ResolveErrorKind},
        inject::Inject,
        service::Service as _,
        slot::Slot,
    };

    use alloc::{
        collections::BTreeMap,
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing::debug;
    use tracing_test::traced_test;

    struct Request(bool);
    struct Response(bool);

    struct MapResolver(BTreeMap<Slot, RcAny>);

    impl Resolver for MapResolver {
        fn resolve_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind> {
            self.0.get(slot).cloned().ok_or_else(|| ResolveErrorKind::NotFound { slot: slot.clone() })
        }
    }

    #[test]
    #[allow(dead_code)]
    fn test_factory_helper() {
        fn resolver<Deps: DependencyResolver, F: Instantiator<Deps>>(_f: F) {}
        fn resolver_with_dep<Deps: DependencyResolver>() {
            resolver(|| Ok::<_, InstantiateErrorKind>(()));
            resolver(|Inject(_): Inject<u8>| Ok::<_, InstantiateErrorKind>(()));
        }
    }

    #[test]
    #[traced_test]
    fn test_boxed_instantiator() {
        let call_count = Arc::new(AtomicU8::new(0));

        let mut instantiator = boxed_instantiator({
            let call_count = call_count.clone();
            move |Inject(request): Inject<Request>| {
                call_count.fetch_add(1, Ordering::SeqCst);

                debug!("Call instantiator response");
                Ok::<_, InstantiateErrorKind>(Response(request.0))
            }
        });

        let mut values: BTreeMap<Slot, RcAny> = BTreeMap::new();
        values.insert(Slot::of::<Request>(), Arc::new(Request(true)));
        let resolver: Arc<dyn Resolver> = Arc::new(MapResolver(values));

        let response_1 = instantiator.call(resolver.clone()).unwrap();
        let response_2 = instantiator.clone().call(resolver).unwrap();

        assert!(response_1.downcast::<Response>().unwrap().0);
        assert!(response_2.downcast::<Response>().unwrap().0);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert!(logs_contain("Instantiated"));
    }

    #[test]
    #[traced_test]
    fn test_boxed_instantiator_errors() {
        let mut missing = boxed_instantiator(|Inject(request): Inject<Request>| Ok::<_, InstantiateErrorKind>(Response(request.0)));
        let mut failing = boxed_instantiator(|| Err::<Response, _>(InstantiateErrorKind::from(anyhow::anyhow!("boom"))));

        let resolver: Arc<dyn Resolver> = Arc::new(MapResolver(BTreeMap::new()));

        assert!(matches!(
            missing.call(resolver.clone()),
            Err(InstantiatorErrorKind::Deps(ResolveErrorKind::NotFound { .. }))
        ));
        match failing.call(resolver) {
            Err(InstantiatorErrorKind::Factory(err)) => assert_eq!(err.to_string(), "boom"),
            _ => panic!("factory error expected"),
        }
    }
}
