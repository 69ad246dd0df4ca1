use alloc::{
    borrow::Cow,
    string::{String, ToString as _},
    vec::Vec,
};
use core::{marker::PhantomData, mem};
use tracing::{debug, warn};

use crate::{
    any::TypeInfo,
    dependency_resolver::DependencyResolver,
    descriptor::{BindingDescriptor, OverrideDirective, Strategy},
    errors::InstantiateErrorKind,
    finalizer::{boxed_finalizer, BoxedCloneFinalizer, Finalizer},
    instantiator::{Config, Instantiator},
    module::Module,
    qualifier::{normalize, Qualifier, Qualify},
    slot::Slot,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    Base,
    Override,
}

/// Collects the bindings declared by modules.
///
/// Bindings declared while an [`crate::Overrides`] block configures its replacement modules
/// become override directives, every other binding is a base descriptor.
pub struct Binder {
    descriptors: Vec<BindingDescriptor>,
    overrides: Vec<OverrideDirective>,
    mode: Mode,
    module: String,
}

impl Binder {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            overrides: Vec::new(),
            mode: Mode::Base,
            module: String::new(),
        }
    }

    /// Starts a binding for the target type `T`
    #[inline]
    #[must_use]
    pub fn bind<T: Send + Sync + 'static>(&mut self) -> BindingBuilder<'_, T> {
        BindingBuilder {
            binder: self,
            qualifier: Qualifier::None,
            finalizer: None,
            _provides: PhantomData,
        }
    }

    /// Adds an already built descriptor.
    /// The descriptor keeps its own `declared_by`.
    pub fn add(&mut self, descriptor: BindingDescriptor) {
        match self.mode {
            Mode::Base => {
                debug!(slot = %descriptor.slot, kind = descriptor.strategy.kind(), module = %descriptor.declared_by, "Binding declared");
                self.descriptors.push(descriptor);
            }
            Mode::Override => {
                debug!(slot = %descriptor.slot, kind = descriptor.strategy.kind(), module = %descriptor.declared_by, "Override declared");
                self.overrides.push(OverrideDirective::new(descriptor));
            }
        }
    }

    /// Installs a nested module, its bindings are declared in the current mode
    pub fn install<M: Module + ?Sized>(&mut self, module: &M) {
        let previous = mem::replace(&mut self.module, module.name().to_string());
        module.configure(self);
        self.module = previous;
    }

    pub(crate) fn install_overriding<M: Module + ?Sized>(&mut self, module: &M) {
        let previous = mem::replace(&mut self.mode, Mode::Override);
        self.install(module);
        self.mode = previous;
    }

    /// Name of the module being configured
    #[inline]
    #[must_use]
    pub fn current_module(&self) -> &str {
        &self.module
    }

    #[inline]
    #[must_use]
    pub(crate) fn into_parts(self) -> (Vec<BindingDescriptor>, Vec<OverrideDirective>) {
        (self.descriptors, self.overrides)
    }
}

/// Binding of the target type `T` in progress
#[must_use = "binding isn't declared until one of the `to_*` methods is called"]
pub struct BindingBuilder<'a, T> {
    binder: &'a mut Binder,
    qualifier: Qualifier,
    finalizer: Option<BoxedCloneFinalizer>,
    _provides: PhantomData<fn() -> T>,
}

impl<T> BindingBuilder<'_, T>
where
    T: Send + Sync + 'static,
{
    #[inline]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.qualifier = Qualifier::named(name);
        self
    }

    /// Qualifies the binding with the marker type `M`
    #[inline]
    pub fn marked<M: ?Sized + 'static>(mut self) -> Self {
        self.qualifier = Qualifier::marker::<M>();
        self
    }

    /// Qualifies the binding with the type-level qualifier `Q`
    #[inline]
    pub fn annotated<Q: Qualify>(mut self) -> Self {
        self.qualifier = Q::qualifier();
        self
    }

    #[inline]
    pub fn qualified_with(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Attaches a finalizer, called once on bridge reset.
    ///
    /// # Warning
    /// Only instance and provider bindings are finalized, because class binding objects aren't owned by the bridge.
    #[inline]
    pub fn finalizer(mut self, finalizer: impl Finalizer<T> + Send + Sync) -> Self {
        self.finalizer = Some(boxed_finalizer(finalizer));
        self
    }

    /// Binds a ready value, shared by all lookups
    pub fn to_instance(self, value: T) {
        self.declare(Strategy::instance(value));
    }

    /// Binds a factory evaluated once at install time.
    /// Its parameters are the dependencies of the binding.
    pub fn to_provider<Inst, Deps>(self, instantiator: Inst)
    where
        Inst: Instantiator<Deps, Provides = T, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver,
    {
        self.declare(Strategy::provider(instantiator));
    }

    /// Binds a constructor called by the locator on every lookup
    pub fn to_class<Inst, Deps>(self, constructor: Inst)
    where
        Inst: Instantiator<Deps, Provides = T, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver,
    {
        self.to_class_with_config(constructor, Config::default());
    }

    pub fn to_class_with_config<Inst, Deps>(mut self, constructor: Inst, config: Config)
    where
        Inst: Instantiator<Deps, Provides = T, Error = InstantiateErrorKind> + Send + Sync,
        Deps: DependencyResolver,
    {
        if self.finalizer.take().is_some() {
            warn!(target_type = TypeInfo::of::<T>().name, "Finalizer of a class binding is ignored");
        }
        self.declare(Strategy::class(constructor, config));
    }

    fn declare(self, strategy: Strategy) {
        let Self {
            binder,
            qualifier,
            finalizer,
            ..
        } = self;

        let slot = Slot::new(TypeInfo::of::<T>(), normalize(&qualifier));
        let mut descriptor = BindingDescriptor::new(slot, strategy, binder.module.clone());
        descriptor.finalizer = finalizer;
        binder.add(descriptor);
    }
}
