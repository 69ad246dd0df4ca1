use alloc::{sync::Arc, vec::Vec};
use tracing::error;

use crate::{any::RcAny, errors::ResolveErrorKind, slot::Slot};

/// Source of already bound values, as seen by factories.
///
/// Implemented by the evaluation pass (providers are evaluated against the final descriptor set)
/// and by the installed locator (class bindings are constructed on lookup).
pub trait Resolver: Send + Sync {
    /// # Errors
    /// Returns [`ResolveErrorKind::NotFound`] if nothing is bound to the slot,
    /// or the error of the factory that had to be called to get the value.
    fn resolve_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind>;
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    #[inline]
    fn resolve_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind> {
        (**self).resolve_slot(slot)
    }
}

pub(crate) fn downcast<T: Send + Sync + 'static>(slot: &Slot, value: RcAny) -> Result<Arc<T>, ResolveErrorKind> {
    let actual = (*value).type_id();
    value.downcast::<T>().map_err(|_| {
        let err = ResolveErrorKind::IncorrectType { slot: slot.clone(), actual };
        error!("{}", err);
        err
    })
}

/// Factory parameter that knows which slot it needs and how to get it.
pub trait DependencyResolver: Sized {
    /// Pushes the slots this parameter depends on
    fn slots(slots: &mut Vec<Slot>);

    /// # Errors
    /// Returns the error of the underlying [`Resolver`]
    fn resolve(resolver: &dyn Resolver) -> Result<Self, ResolveErrorKind>;

    #[inline]
    #[must_use]
    fn dependencies() -> Vec<Slot> {
        let mut slots = Vec::new();
        Self::slots(&mut slots);
        slots
    }
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            #[allow(unused_variables)]
            fn slots(slots: &mut Vec<Slot>) {
                $( $ty::slots(slots); )*
            }

            #[inline]
            #[allow(unused_variables)]
            fn resolve(resolver: &dyn Resolver) -> Result<Self, ResolveErrorKind> {
                Ok(($($ty::resolve(resolver)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);

#[cfg(test)]
mod tests {
    use super::{downcast, DependencyResolver, Resolver};
    use crate::{
        any::RcAny,
        errors::ResolveErrorKind,
        inject::{Inject, InjectWith},
        slot::Slot,
    };

    use alloc::{collections::BTreeMap, sync::Arc, vec};

    crate::named!(Simple = "simple");

    struct MapResolver(BTreeMap<Slot, RcAny>);

    impl Resolver for MapResolver {
        fn resolve_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind> {
            self.0.get(slot).cloned().ok_or_else(|| ResolveErrorKind::NotFound { slot: slot.clone() })
        }
    }

    #[test]
    #[allow(dead_code)]
    fn test_dependency_resolver_impls() {
        fn resolver<T: DependencyResolver>() {}
        fn resolver_with_dep<Dep: Send + Sync + 'static>() {
            resolver::<Inject<Dep>>();
            resolver::<InjectWith<Dep, Simple>>();
            resolver::<(Inject<Dep>, InjectWith<Dep, Simple>)>();
        }
    }

    #[test]
    fn test_tuple_slots_in_parameter_order() {
        let slots = <(Inject<u8>, InjectWith<u16, Simple>, Inject<u32>)>::dependencies();

        assert_eq!(
            slots,
            vec![Slot::of::<u8>(), Slot::qualified_by::<u16, Simple>(), Slot::of::<u32>()]
        );
        assert!(<()>::dependencies().is_empty());
    }

    #[test]
    fn test_tuple_resolve() {
        let mut values: BTreeMap<Slot, RcAny> = BTreeMap::new();
        values.insert(Slot::of::<u8>(), Arc::new(1u8));
        values.insert(Slot::qualified_by::<u8, Simple>(), Arc::new(2u8));
        let resolver = MapResolver(values);

        let (Inject(default), named) = <(Inject<u8>, InjectWith<u8, Simple>)>::resolve(&resolver).unwrap();

        assert_eq!(*default, 1);
        assert_eq!(*named, 2);
        assert!(matches!(
            <Inject<u16>>::resolve(&resolver),
            Err(ResolveErrorKind::NotFound { .. })
        ));
    }

    #[test]
    fn test_downcast_incorrect_type() {
        let slot = Slot::of::<u8>();
        let value: RcAny = Arc::new(1u16);

        assert!(matches!(
            downcast::<u8>(&slot, value),
            Err(ResolveErrorKind::IncorrectType { .. })
        ));
    }
}
