use alloc::{sync::Arc, vec::Vec};
use core::{marker::PhantomData, ops::Deref};

use crate::{
    dependency_resolver::{downcast, DependencyResolver, Resolver},
    errors::ResolveErrorKind,
    qualifier::Qualify,
    slot::Slot,
};

/// Unqualified dependency
pub struct Inject<Dep>(pub Arc<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    #[inline]
    fn slots(slots: &mut Vec<Slot>) {
        slots.push(Slot::of::<Dep>());
    }

    fn resolve(resolver: &dyn Resolver) -> Result<Self, ResolveErrorKind> {
        let slot = Slot::of::<Dep>();
        let value = resolver.resolve_slot(&slot)?;
        downcast(&slot, value).map(Self)
    }
}

impl<Dep> Deref for Inject<Dep> {
    type Target = Dep;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Dependency qualified by the type-level qualifier `Q`.
///
/// ```rust
/// use junction::{named, marker, Inject, InjectWith};
///
/// named!(Simple = "simple");
/// marker!(Other);
///
/// struct Greeter;
///
/// fn factory(default: Inject<Greeter>, simple: InjectWith<Greeter, Simple>, other: InjectWith<Greeter, Other>) {}
/// ```
pub struct InjectWith<Dep, Q>(pub Arc<Dep>, PhantomData<fn() -> Q>);

impl<Dep, Q> InjectWith<Dep, Q> {
    #[inline]
    #[must_use]
    pub fn new(dependency: Arc<Dep>) -> Self {
        Self(dependency, PhantomData)
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Arc<Dep> {
        self.0
    }
}

impl<Dep: Send + Sync + 'static, Q: Qualify> DependencyResolver for InjectWith<Dep, Q> {
    #[inline]
    fn slots(slots: &mut Vec<Slot>) {
        slots.push(Slot::qualified_by::<Dep, Q>());
    }

    fn resolve(resolver: &dyn Resolver) -> Result<Self, ResolveErrorKind> {
        let slot = Slot::qualified_by::<Dep, Q>();
        let value = resolver.resolve_slot(&slot)?;
        downcast(&slot, value).map(Self::new)
    }
}

impl<Dep, Q> Deref for InjectWith<Dep, Q> {
    type Target = Dep;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
