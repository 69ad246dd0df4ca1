use alloc::boxed::Box;
use core::any::TypeId;

use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};
use crate::slot::Slot;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding found for {slot}")]
    NotFound { slot: Slot },
    #[error("Incorrect value type for {slot}. Actual: {actual:?}, expected: {:?}", slot.type_info.id)]
    IncorrectType { slot: Slot, actual: TypeId },
    #[error(transparent)]
    Instantiator(InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
}
