use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use core::fmt::{self, Debug, Formatter};

use crate::{
    any::RcAny,
    dependency_resolver::DependencyResolver,
    errors::InstantiateErrorKind,
    finalizer::{boxed_finalizer, BoxedCloneFinalizer, Finalizer},
    instantiator::{boxed_instantiator, Factory, Instantiator},
    qualifier::Qualifier,
    slot::Slot,
    Config,
};

/// How a slot gets its value
#[derive(Clone)]
pub enum Strategy {
    /// Ready value shared by all lookups
    Instance(RcAny),
    /// Factory evaluated once per installation from its dependencies
    Provider {
        dependencies: Vec<Slot>,
        factory: Factory,
    },
    /// Constructed by the locator when a consumer looks it up
    Class {
        dependencies: Vec<Slot>,
        factory: Factory,
        config: Config,
    },
}

impl Strategy {
    #[inline]
    #[must_use]
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Instance(Arc::new(value))
    }

    /// Provider strategy, dependencies are taken from the factory parameters
    #[must_use]
    pub fn provider<Inst, Deps>(instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        Self::Provider {
            dependencies: Deps::dependencies(),
            factory: Factory(boxed_instantiator(instantiator)),
        }
    }

    /// Class strategy, dependencies are taken from the constructor parameters
    #[must_use]
    pub fn class<Inst, Deps>(constructor: Inst, config: Config) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        Self::Class {
            dependencies: Deps::dependencies(),
            factory: Factory(boxed_instantiator(constructor)),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &[Slot] {
        match self {
            Strategy::Instance(_) => &[],
            Strategy::Provider { dependencies, .. } | Strategy::Class { dependencies, .. } => dependencies,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Instance(_) => "instance",
            Strategy::Provider { .. } => "provider",
            Strategy::Class { .. } => "class",
        }
    }
}

impl Debug for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Instance(_) => f.write_str("Instance"),
            Strategy::Provider { dependencies, .. } => f.debug_struct("Provider").field("dependencies", dependencies).finish(),
            Strategy::Class {
                dependencies, config, ..
            } => f
                .debug_struct("Class")
                .field("dependencies", dependencies)
                .field("config", config)
                .finish(),
        }
    }
}

/// Immutable description of one resolvable unit
#[derive(Clone)]
pub struct BindingDescriptor {
    pub(crate) slot: Slot,
    pub(crate) strategy: Strategy,
    pub(crate) declared_by: String,
    pub(crate) finalizer: Option<BoxedCloneFinalizer>,
}

impl BindingDescriptor {
    #[inline]
    #[must_use]
    pub fn new(slot: Slot, strategy: Strategy, declared_by: impl Into<String>) -> Self {
        Self {
            slot,
            strategy,
            declared_by: declared_by.into(),
            finalizer: None,
        }
    }

    /// Attaches a finalizer called on bridge reset.
    /// `Dep` should be the slot target type, otherwise the finalizer is skipped with an error log.
    #[inline]
    #[must_use]
    pub fn with_finalizer<Dep, Fin>(mut self, finalizer: Fin) -> Self
    where
        Dep: Send + Sync + 'static,
        Fin: Finalizer<Dep> + Send + Sync,
    {
        self.finalizer = Some(boxed_finalizer(finalizer));
        self
    }

    #[inline]
    #[must_use]
    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    #[inline]
    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Name of the module that declared the binding
    #[inline]
    #[must_use]
    pub fn declared_by(&self) -> &str {
        &self.declared_by
    }

    #[inline]
    #[must_use]
    pub fn has_finalizer(&self) -> bool {
        self.finalizer.is_some()
    }
}

impl Debug for BindingDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingDescriptor")
            .field("slot", &self.slot)
            .field("strategy", &self.strategy)
            .field("declared_by", &self.declared_by)
            .field("finalizer", &self.finalizer.is_some())
            .finish()
    }
}

/// Replacement of an existing slot's binding.
///
/// The target slot is the replacement's own slot, so a directive can't point somewhere else.
#[derive(Clone, Debug)]
pub struct OverrideDirective {
    replacement: BindingDescriptor,
}

impl OverrideDirective {
    #[inline]
    #[must_use]
    pub fn new(replacement: BindingDescriptor) -> Self {
        Self { replacement }
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &Slot {
        &self.replacement.slot
    }

    #[inline]
    #[must_use]
    pub fn replacement(&self) -> &BindingDescriptor {
        &self.replacement
    }

    #[inline]
    #[must_use]
    pub fn into_replacement(self) -> BindingDescriptor {
        self.replacement
    }
}

/// One descriptor per slot, built once per installation
#[derive(Clone, Default)]
pub struct FinalDescriptorSet {
    pub(crate) descriptors: BTreeMap<Slot, BindingDescriptor>,
}

impl FinalDescriptorSet {
    #[inline]
    #[must_use]
    pub fn get(&self, slot: &Slot) -> Option<&BindingDescriptor> {
        self.descriptors.get(slot)
    }

    /// Value of an instance binding of `T` for the qualifier, which is normalized first.
    /// Evaluated providers are instance bindings too.
    #[must_use]
    pub fn instance<T: Send + Sync + 'static>(&self, qualifier: &Qualifier) -> Option<Arc<T>> {
        match self.descriptors.get(&Slot::qualified::<T>(qualifier)).map(|descriptor| &descriptor.strategy) {
            Some(Strategy::Instance(value)) => value.clone().downcast().ok(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, slot: &Slot) -> bool {
        self.descriptors.contains_key(slot)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[inline]
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.descriptors.keys()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.descriptors.values()
    }
}

impl Debug for FinalDescriptorSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.descriptors.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{BindingDescriptor, OverrideDirective, Strategy};
    use crate::{inject::Inject, slot::Slot, Config};

    use alloc::{format, sync::Arc};

    #[test]
    fn test_strategy_dependencies() {
        let instance = Strategy::instance(1u8);
        let provider = Strategy::provider(|Inject(value): Inject<u8>| Ok(u16::from(*value)));
        let class = Strategy::class(|Inject(_): Inject<u8>, Inject(_): Inject<u16>| Ok(()), Config { cache_provides: true });

        assert!(instance.dependencies().is_empty());
        assert_eq!(provider.dependencies(), [Slot::of::<u8>()]);
        assert_eq!(class.dependencies(), [Slot::of::<u8>(), Slot::of::<u16>()]);
        assert_eq!((instance.kind(), provider.kind(), class.kind()), ("instance", "provider", "class"));
        assert_eq!(format!("{class:?}"), format!("Class {{ dependencies: {:?}, config: Config {{ cache_provides: true }} }}", class.dependencies()));
    }

    #[test]
    fn test_override_target_is_replacement_slot() {
        let replacement = BindingDescriptor::new(Slot::named::<u8>("simple"), Strategy::instance(1u8), "Replacement")
            .with_finalizer(|_: Arc<u8>| {});
        let directive = OverrideDirective::new(replacement);

        assert_eq!(directive.target(), &Slot::named::<u8>("simple"));
        assert_eq!(directive.replacement().declared_by(), "Replacement");
        assert!(directive.into_replacement().has_finalizer());
    }
}
