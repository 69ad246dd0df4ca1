use alloc::boxed::Box;
use core::fmt::{self, Display, Formatter};

use super::resolve::ResolveErrorKind;
use crate::slot::Slot;

#[derive(thiserror::Error, Debug)]
pub enum EvaluateErrorKind {
    #[error("{}", CyclePath(cycle))]
    ProviderCycle { cycle: Box<[Slot]> },
    #[error("Binding for {dependent} depends on {missing}, but no binding exists for it")]
    UnsatisfiedDependency { dependent: Slot, missing: Slot },
    #[error("Provider for {slot} failed: {source}")]
    Provider {
        slot: Slot,
        #[source]
        source: ResolveErrorKind,
    },
}

struct CyclePath<'a>(&'a [Slot]);

impl Display for CyclePath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclic dependency detected: ")?;
        let mut slots = self.0.iter();
        if let Some(first) = slots.next() {
            write!(f, "{first}")?;
            for slot in slots {
                write!(f, " -> {slot}")?;
            }
            write!(f, " -> {first}")?;
        }
        Ok(())
    }
}
