use super::evaluate::EvaluateErrorKind;
use crate::{installer::InstallationId, slot::Slot};

#[derive(thiserror::Error, Debug)]
pub enum InstallErrorKind {
    #[error("Bridge is already installed (installation {active}). Reset it before installing again")]
    AlreadyInstalled { active: InstallationId },
    #[error("Locator already has a native entry for {slot}")]
    SlotOccupied { slot: Slot },
    #[error(transparent)]
    Evaluate(#[from] EvaluateErrorKind),
}
