use alloc::string::String;

use crate::slot::Slot;

#[derive(thiserror::Error, Debug)]
pub enum CollectErrorKind {
    #[error(
        "Duplicate binding for {slot}: declared by `{first}` and again by `{second}`. \
        Use an override module to replace an existing binding"
    )]
    DuplicateSlot { slot: Slot, first: String, second: String },
}
