use alloc::sync::Arc;
use tracing::error;

use crate::{
    any::{RcAny, TypeInfo},
    service::BoxCloneService,
};

/// Teardown callback of a singleton binding, called on bridge reset.
pub trait Finalizer<Dep>: Clone + 'static {
    fn finalize(&mut self, dependency: Arc<Dep>);
}

impl<F, Dep> Finalizer<Dep> for F
where
    F: FnMut(Arc<Dep>) + Clone + 'static,
{
    #[inline]
    fn finalize(&mut self, dependency: Arc<Dep>) {
        self(dependency);
    }
}

pub(crate) type BoxedCloneFinalizer = BoxCloneService<RcAny, (), ()>;

#[must_use]
pub(crate) fn boxed_finalizer<Dep, Fin>(mut finalizer: Fin) -> BoxedCloneFinalizer
where
    Dep: Send + Sync + 'static,
    Fin: Finalizer<Dep> + Send + Sync,
{
    BoxCloneService::from_fn(move |dependency: RcAny| match dependency.downcast::<Dep>() {
        Ok(dependency) => {
            finalizer.finalize(dependency);
            Ok(())
        }
        Err(_) => {
            error!(expected = TypeInfo::of::<Dep>().name, "Finalizer got a value of another type");
            Err(())
        }
    })
}
