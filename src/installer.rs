use alloc::{sync::Arc, vec::Vec};
use core::{
    fmt::{self, Debug, Display, Formatter},
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::{debug, error, info_span, warn};

use crate::{
    descriptor::{FinalDescriptorSet, Strategy},
    errors::InstallErrorKind,
    evaluator::evaluate,
    locator::Locator,
    service::Service as _,
    slot::Slot,
};

static NEXT_INSTALLATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of an installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstallationId(u64);

impl InstallationId {
    #[inline]
    #[must_use]
    pub(crate) fn next() -> Self {
        Self(NEXT_INSTALLATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for InstallationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct InstallationInner {
    id: InstallationId,
    descriptors: Arc<FinalDescriptorSet>,
    order: Vec<Slot>,
}

/// Record of the slots one install registered in a locator
#[derive(Clone)]
pub struct Installation {
    inner: Arc<InstallationInner>,
}

impl Installation {
    #[inline]
    #[must_use]
    pub fn id(&self) -> InstallationId {
        self.inner.id
    }

    /// Installed slots in installation order
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.inner.order
    }

    /// Final descriptor set the locator entries were made from
    #[inline]
    #[must_use]
    pub fn descriptors(&self) -> &FinalDescriptorSet {
        &self.inner.descriptors
    }
}

impl Debug for Installation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installation")
            .field("id", &self.inner.id)
            .field("slots", &self.inner.order)
            .finish()
    }
}

/// Registers every slot of the set in the locator.
///
/// The set is checked and its providers are evaluated first, so a set made by [`crate::resolve`]
/// and one already passed through [`crate::evaluate`] are both accepted.
/// Either every slot is registered or none is.
///
/// # Errors
/// - [`InstallErrorKind::AlreadyInstalled`] if the locator has an active installation
/// - [`InstallErrorKind::Evaluate`] if a dependency is missing, dependencies are cyclic or a provider fails
/// - [`InstallErrorKind::SlotOccupied`] if a slot collides with a native locator entry
pub fn install(locator: &Locator, descriptors: FinalDescriptorSet) -> Result<Installation, InstallErrorKind> {
    let id = InstallationId::next();

    let span = info_span!("install", installation = %id, slots = descriptors.len());
    let _guard = span.enter();

    // Checked again by `register` under the write lock
    if let Some(active) = locator.active_installation() {
        let err = InstallErrorKind::AlreadyInstalled { active };
        error!("{}", err);
        return Err(err);
    }

    let descriptors = evaluate(descriptors)?;
    let order: Vec<Slot> = descriptors.slots().cloned().collect();
    let descriptors = Arc::new(descriptors);

    locator.register(id, &descriptors)?;

    debug!("Installed");

    Ok(Installation {
        inner: Arc::new(InstallationInner { id, descriptors, order }),
    })
}

/// Removes the installation's entries from the locator, then calls the finalizers in reverse installation order.
/// Native entries are kept.
pub fn uninstall(locator: &Locator, installation: &Installation) {
    let span = info_span!("uninstall", installation = %installation.id());
    let _guard = span.enter();

    let removed = locator.unregister(installation.id());
    debug!(removed, "Entries removed");

    for slot in installation.slots().iter().rev() {
        let Some(descriptor) = installation.descriptors().get(slot) else {
            continue;
        };
        let Some(finalizer) = &descriptor.finalizer else {
            continue;
        };

        match &descriptor.strategy {
            Strategy::Instance(value) => {
                if finalizer.clone().call(value.clone()).is_ok() {
                    debug!(%slot, "Finalized");
                } else {
                    error!(%slot, "Finalizer failed");
                }
            }
            Strategy::Provider { .. } | Strategy::Class { .. } => {
                warn!(%slot, "Finalizer skipped, value isn't owned by the installation");
            }
        }
    }
}
