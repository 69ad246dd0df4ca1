use crate::slot::Slot;

#[derive(thiserror::Error, Debug)]
pub enum OverrideErrorKind {
    #[error("Duplicate base binding for {slot}")]
    DuplicateSlot { slot: Slot },
    #[error("Override targets {slot}, but no base binding exists for it. Overrides can only replace existing bindings")]
    TargetMissing { slot: Slot },
}
