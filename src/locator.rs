use alloc::{borrow::Cow, collections::BTreeMap, sync::Arc, vec::Vec};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info_span};

use crate::{
    any::{RcAny, TypeInfo},
    dependency_resolver::{downcast, Resolver},
    descriptor::{FinalDescriptorSet, Strategy},
    errors::{InstallErrorKind, ResolveErrorKind},
    installer::InstallationId,
    instantiator::Factory,
    qualifier::{normalize, Qualifier, Qualify},
    slot::Slot,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Origin {
    Native,
    Bridge(InstallationId),
}

enum Entry {
    Instance(RcAny),
    Class {
        factory: Factory,
        /// Set for cached entries. Locked while the value is constructed, so it's constructed once
        cache: Option<Arc<Mutex<Option<RcAny>>>>,
        descriptors: Arc<FinalDescriptorSet>,
    },
}

struct Registration {
    origin: Origin,
    entry: Entry,
}

#[derive(Default)]
struct Registry {
    entries: BTreeMap<Slot, Registration>,
    active: Option<InstallationId>,
}

/// Service locator consumed by the request-dispatch layer.
///
/// Holds native entries, provided by the host directly, and the entries of at most one bridge installation.
/// Cloning is cheap, all clones share one registry.
#[derive(Clone, Default)]
pub struct Locator {
    inner: Arc<RwLock<Registry>>,
}

impl Locator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a native unqualified instance
    ///
    /// # Errors
    /// Returns [`InstallErrorKind::SlotOccupied`] if the slot already has an entry
    #[inline]
    pub fn provide_instance<T: Send + Sync + 'static>(&self, value: T) -> Result<(), InstallErrorKind> {
        self.provide_qualified_instance(&Qualifier::None, value)
    }

    /// Registers a native instance for the qualified slot.
    /// Native entries aren't removed by a bridge reset.
    ///
    /// # Errors
    /// Returns [`InstallErrorKind::SlotOccupied`] if the slot already has an entry
    pub fn provide_qualified_instance<T: Send + Sync + 'static>(&self, qualifier: &Qualifier, value: T) -> Result<(), InstallErrorKind> {
        let slot = Slot::qualified::<T>(qualifier);
        let mut registry = self.inner.write();

        if registry.entries.contains_key(&slot) {
            let err = InstallErrorKind::SlotOccupied { slot };
            error!("{}", err);
            return Err(err);
        }

        debug!(%slot, "Native instance provided");
        registry.entries.insert(
            slot,
            Registration {
                origin: Origin::Native,
                entry: Entry::Instance(Arc::new(value)),
            },
        );
        Ok(())
    }

    /// Gets the unqualified value of `T`
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotFound`] if nothing is bound to the slot
    /// - Returns [`ResolveErrorKind::Instantiator`] if the class constructor fails
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.lookup::<T>(&Qualifier::None)
    }

    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_named<T: Send + Sync + 'static>(&self, name: impl Into<Cow<'static, str>>) -> Result<Arc<T>, ResolveErrorKind> {
        self.lookup::<T>(&Qualifier::named(name))
    }

    /// Gets the value of `T` qualified by the type-level qualifier `Q`
    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn get_qualified<T: Send + Sync + 'static, Q: Qualify>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.lookup::<T>(&Q::qualifier())
    }

    /// Gets the value of `T` for the qualifier, which is normalized first
    #[allow(clippy::missing_errors_doc)]
    pub fn lookup<T: Send + Sync + 'static>(&self, qualifier: &Qualifier) -> Result<Arc<T>, ResolveErrorKind> {
        let slot = Slot::new(TypeInfo::of::<T>(), normalize(qualifier));
        let value = self.lookup_slot(&slot)?;
        downcast(&slot, value)
    }

    /// Type-erased lookup.
    /// Class entries are constructed here, and cached if their config says so.
    #[allow(clippy::missing_errors_doc)]
    pub fn lookup_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind> {
        let span = info_span!("lookup", %slot);
        let _guard = span.enter();

        let (factory, cache, descriptors) = {
            let registry = self.inner.read();
            match registry.entries.get(slot) {
                None => {
                    let err = ResolveErrorKind::NotFound { slot: slot.clone() };
                    error!("{}", err);
                    return Err(err);
                }
                Some(Registration {
                    entry: Entry::Instance(value),
                    ..
                }) => {
                    debug!("Found instance");
                    return Ok(value.clone());
                }
                Some(Registration {
                    entry: Entry::Class { factory, cache, descriptors },
                    ..
                }) => (factory.clone(), cache.clone(), descriptors.clone()),
            }
        };

        let resolver = ClassResolver {
            locator: self.clone(),
            descriptors,
        };

        let Some(cache) = cache else {
            return construct(&factory, resolver);
        };

        let mut cached = cache.lock();
        if let Some(value) = cached.as_ref() {
            debug!("Found in cache");
            return Ok(value.clone());
        }

        let value = construct(&factory, resolver)?;
        *cached = Some(value.clone());
        debug!("Cached");

        Ok(value)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, slot: &Slot) -> bool {
        self.inner.read().entries.contains_key(slot)
    }

    /// Count of entries, native and installed
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Id of the installation whose entries are registered
    #[inline]
    #[must_use]
    pub fn active_installation(&self) -> Option<InstallationId> {
        self.inner.read().active
    }

    /// Registers every slot of the set under one write lock.
    /// Nothing is registered if any check fails.
    pub(crate) fn register(&self, id: InstallationId, descriptors: &Arc<FinalDescriptorSet>) -> Result<(), InstallErrorKind> {
        let mut registry = self.inner.write();

        if let Some(active) = registry.active {
            let err = InstallErrorKind::AlreadyInstalled { active };
            error!("{}", err);
            return Err(err);
        }
        if let Some(slot) = descriptors.slots().find(|slot| registry.entries.contains_key(*slot)) {
            let err = InstallErrorKind::SlotOccupied { slot: slot.clone() };
            error!("{}", err);
            return Err(err);
        }

        for descriptor in descriptors.iter() {
            let entry = match &descriptor.strategy {
                Strategy::Instance(value) => Entry::Instance(value.clone()),
                // `install` evaluates providers, one left here is evaluated on first lookup
                Strategy::Provider { factory, .. } => Entry::Class {
                    factory: factory.clone(),
                    cache: Some(Arc::default()),
                    descriptors: descriptors.clone(),
                },
                Strategy::Class { factory, config, .. } => Entry::Class {
                    factory: factory.clone(),
                    cache: config.cache_provides.then(Arc::default),
                    descriptors: descriptors.clone(),
                },
            };

            debug!(slot = %descriptor.slot, kind = descriptor.strategy.kind(), "Registered");
            registry.entries.insert(
                descriptor.slot.clone(),
                Registration {
                    origin: Origin::Bridge(id),
                    entry,
                },
            );
        }
        registry.active = Some(id);

        Ok(())
    }

    /// Removes the entries of the installation, native entries are kept.
    /// Returns count of removed entries.
    pub(crate) fn unregister(&self, id: InstallationId) -> usize {
        let mut registry = self.inner.write();

        let before = registry.entries.len();
        registry.entries.retain(|_, registration| registration.origin != Origin::Bridge(id));
        if registry.active == Some(id) {
            registry.active = None;
        }

        before - registry.entries.len()
    }

    /// Slots of every entry, in slot order
    #[must_use]
    pub fn slots(&self) -> Vec<Slot> {
        self.inner.read().entries.keys().cloned().collect()
    }
}

fn construct(factory: &Factory, resolver: ClassResolver) -> Result<RcAny, ResolveErrorKind> {
    match factory.call(Arc::new(resolver)) {
        Ok(value) => {
            debug!("Constructed");
            Ok(value)
        }
        Err(err) => {
            error!("{}", err);
            Err(err)
        }
    }
}

impl Resolver for Locator {
    #[inline]
    fn resolve_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind> {
        self.lookup_slot(slot)
    }
}

/// Resolves constructor dependencies of a class entry.
/// Slots unknown to the locator are taken from the final descriptor set the entry was installed with.
#[derive(Clone)]
struct ClassResolver {
    locator: Locator,
    descriptors: Arc<FinalDescriptorSet>,
}

impl Resolver for ClassResolver {
    fn resolve_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind> {
        if self.locator.contains(slot) {
            return self.locator.lookup_slot(slot);
        }

        debug!(%slot, "Not found in locator, fall back to descriptors");
        match self.descriptors.get(slot).map(|descriptor| &descriptor.strategy) {
            Some(Strategy::Instance(value)) => Ok(value.clone()),
            Some(Strategy::Provider { factory, .. } | Strategy::Class { factory, .. }) => factory.call(Arc::new(self.clone())),
            None => Err(ResolveErrorKind::NotFound { slot: slot.clone() }),
        }
    }
}
