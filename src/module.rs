use alloc::{boxed::Box, vec::Vec};
use core::any::type_name;

use crate::binder::Binder;

/// Source of bindings.
///
/// Implemented for any `Fn(&mut Binder)`, so a closure is the simplest module.
pub trait Module {
    fn configure(&self, binder: &mut Binder);

    /// Name used in diagnostics
    #[must_use]
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

impl<F> Module for F
where
    F: Fn(&mut Binder),
{
    #[inline]
    fn configure(&self, binder: &mut Binder) {
        self(binder);
    }
}

/// Module list where the bindings of the replacement modules override the bindings of the base modules.
///
/// Each binding declared by a replacement module becomes an override directive,
/// so it has to target a slot that's already bound by a base module.
///
/// ```rust
/// use junction::{modules, Binder, Overrides};
///
/// let overridden = Overrides::new(modules![|binder: &mut Binder| {
///     binder.bind::<&'static str>().named("greeting").to_instance("Hello");
/// }])
/// .with(modules![|binder: &mut Binder| {
///     binder.bind::<&'static str>().named("greeting").to_instance("Hello overridden");
/// }]);
/// ```
pub struct Overrides {
    base: Vec<Box<dyn Module>>,
    replacements: Vec<Box<dyn Module>>,
}

impl Overrides {
    #[inline]
    #[must_use]
    pub fn new(base: Vec<Box<dyn Module>>) -> Self {
        Self {
            base,
            replacements: Vec::new(),
        }
    }

    /// Appends replacement modules, applied in order after the already added ones
    #[inline]
    #[must_use]
    pub fn with(mut self, replacements: Vec<Box<dyn Module>>) -> Self {
        self.replacements.extend(replacements);
        self
    }
}

impl Module for Overrides {
    fn configure(&self, binder: &mut Binder) {
        for module in &self.base {
            binder.install(&**module);
        }
        for module in &self.replacements {
            binder.install_overriding(&**module);
        }
    }

    fn name(&self) -> &str {
        "Overrides"
    }
}

/// Builds a `Vec<Box<dyn Module>>` from modules of different types.
#[macro_export]
macro_rules! modules {
    ($($module:expr),* $(,)?) => {
        $crate::__private::vec![$( $crate::__private::Box::new($module) as $crate::__private::Box<dyn $crate::Module> ),*]
    };
}
