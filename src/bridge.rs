use alloc::boxed::Box;
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    collector::collect,
    errors::{BridgeErrorKind, InstallErrorKind},
    evaluator::evaluate,
    installer::{install, uninstall, Installation},
    locator::Locator,
    module::Module,
    override_resolver::resolve,
};

/// Owner of the active installation of one locator.
///
/// Install and reset are mutually exclusive, so concurrent misuse gets [`InstallErrorKind::AlreadyInstalled`]
/// instead of a half-built registry.
///
/// # Warning
/// The lock is held while factories run, so a factory must not call back into its bridge.
/// Dropping the bridge doesn't reset it, call [`Bridge::reset`] explicitly.
pub struct Bridge {
    locator: Locator,
    active: Mutex<Option<Installation>>,
}

impl Bridge {
    #[inline]
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            active: Mutex::new(None),
        }
    }

    /// Collects the modules, applies overrides, evaluates providers and installs the result in the locator.
    ///
    /// # Errors
    /// - [`BridgeErrorKind::Collect`] if two base bindings share a slot
    /// - [`BridgeErrorKind::Override`] if an override targets a missing slot
    /// - [`BridgeErrorKind::Evaluate`] if a dependency is missing, dependencies are cyclic or a provider fails
    /// - [`BridgeErrorKind::Install`] if the bridge is already installed or a slot is taken by a native entry
    ///
    /// On error the locator is left as it was.
    pub fn build_and_install(&self, modules: &[Box<dyn Module>]) -> Result<Installation, BridgeErrorKind> {
        let span = info_span!("build_and_install", modules = modules.len());
        let _guard = span.enter();

        let mut active = self.active.lock();
        if let Some(installation) = active.as_ref() {
            let err = InstallErrorKind::AlreadyInstalled {
                active: installation.id(),
            };
            error!("{}", err);
            return Err(err.into());
        }

        let collected = collect(modules)?;
        let set = resolve(collected.descriptors, collected.overrides)?;
        let set = evaluate(set)?;
        let installation = install(&self.locator, set)?;

        debug!(installation = %installation.id(), slots = installation.slots().len(), "Bridge installed");

        *active = Some(installation.clone());
        Ok(installation)
    }

    /// Removes the installed entries from the locator and calls their finalizers.
    /// Does nothing if nothing is installed.
    pub fn reset(&self) {
        let span = info_span!("reset");
        let _guard = span.enter();

        let Some(installation) = self.active.lock().take() else {
            debug!("Nothing to reset");
            return;
        };

        uninstall(&self.locator, &installation);

        debug!(installation = %installation.id(), "Bridge reset");
    }

    /// Active installation, if any
    #[inline]
    #[must_use]
    pub fn installation(&self) -> Option<Installation> {
        self.active.lock().clone()
    }

    #[inline]
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.active.lock().is_some()
    }

    #[inline]
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}
