use alloc::{boxed::Box, collections::BTreeMap, string::ToString as _, vec::Vec};
use tracing::{debug, error, info_span};

use crate::{
    binder::Binder,
    descriptor::{BindingDescriptor, OverrideDirective},
    errors::CollectErrorKind,
    module::Module,
    slot::Slot,
};

/// Output of [`collect`]: base descriptors in declaration order and override directives in application order
#[derive(Debug, Default)]
pub struct Collected {
    pub descriptors: Vec<BindingDescriptor>,
    pub overrides: Vec<OverrideDirective>,
}

/// Runs every module against a fresh [`Binder`].
///
/// # Errors
/// - [`CollectErrorKind::DuplicateSlot`] if two base bindings share a slot.
///   Repeated overrides of one slot aren't an error here, the last one wins later.
pub fn collect(modules: &[Box<dyn Module>]) -> Result<Collected, CollectErrorKind> {
    let span = info_span!("collect", modules = modules.len());
    let _guard = span.enter();

    let mut binder = Binder::new();
    for module in modules {
        binder.install(&**module);
    }
    let (descriptors, overrides) = binder.into_parts();

    let mut declared: BTreeMap<&Slot, &str> = BTreeMap::new();
    for descriptor in &descriptors {
        if let Some(first) = declared.insert(&descriptor.slot, &descriptor.declared_by) {
            let err = CollectErrorKind::DuplicateSlot {
                slot: descriptor.slot.clone(),
                first: first.to_string(),
                second: descriptor.declared_by.clone(),
            };
            error!("{}", err);
            return Err(err);
        }
    }

    debug!(descriptors = descriptors.len(), overrides = overrides.len(), "Collected");

    Ok(Collected { descriptors, overrides })
}
