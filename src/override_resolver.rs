use alloc::{collections::BTreeMap, vec::Vec};
use tracing::{debug, error, info_span};

use crate::{
    descriptor::{BindingDescriptor, FinalDescriptorSet, OverrideDirective},
    errors::OverrideErrorKind,
};

/// Applies override directives to the base descriptors.
///
/// Directives are applied in order, so when several target one slot the last one wins.
/// A directive replaces the whole descriptor, including its strategy and finalizer.
///
/// # Errors
/// - [`OverrideErrorKind::DuplicateSlot`] if two base descriptors share a slot
/// - [`OverrideErrorKind::TargetMissing`] if a directive targets a slot without a base descriptor
pub fn resolve(base: Vec<BindingDescriptor>, overrides: Vec<OverrideDirective>) -> Result<FinalDescriptorSet, OverrideErrorKind> {
    let span = info_span!("resolve_overrides", base = base.len(), overrides = overrides.len());
    let _guard = span.enter();

    let mut descriptors = BTreeMap::new();
    for descriptor in base {
        if descriptors.contains_key(&descriptor.slot) {
            let err = OverrideErrorKind::DuplicateSlot { slot: descriptor.slot };
            error!("{}", err);
            return Err(err);
        }
        descriptors.insert(descriptor.slot.clone(), descriptor);
    }

    for directive in overrides {
        let replacement = directive.into_replacement();
        match descriptors.get_mut(&replacement.slot) {
            Some(current) => {
                debug!(
                    slot = %replacement.slot,
                    replaced = %current.declared_by,
                    by = %replacement.declared_by,
                    "Binding overridden"
                );
                *current = replacement;
            }
            None => {
                let err = OverrideErrorKind::TargetMissing { slot: replacement.slot };
                error!("{}", err);
                return Err(err);
            }
        }
    }

    Ok(FinalDescriptorSet { descriptors })
}
