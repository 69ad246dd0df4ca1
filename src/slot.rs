use alloc::borrow::Cow;
use core::fmt::{self, Display, Formatter};

use crate::{
    any::TypeInfo,
    qualifier::{normalize, Qualifier, QualifierKey, Qualify},
};

/// Resolvable unit: target type plus normalized qualifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub type_info: TypeInfo,
    pub qualifier: QualifierKey,
}

impl Slot {
    #[inline]
    #[must_use]
    pub const fn new(type_info: TypeInfo, qualifier: QualifierKey) -> Self {
        Self { type_info, qualifier }
    }

    /// Unqualified slot of `T`
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), QualifierKey::Default)
    }

    #[inline]
    #[must_use]
    pub fn qualified<T: ?Sized + 'static>(qualifier: &Qualifier) -> Self {
        Self::new(TypeInfo::of::<T>(), normalize(qualifier))
    }

    #[inline]
    #[must_use]
    pub fn named<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::qualified::<T>(&Qualifier::named(name))
    }

    #[inline]
    #[must_use]
    pub fn qualified_by<T: ?Sized + 'static, Q: Qualify>() -> Self {
        Self::qualified::<T>(&Q::qualifier())
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            QualifierKey::Default => write!(f, "`{}`", self.type_info),
            qualifier => write!(f, "`{}` {}", self.type_info, qualifier),
        }
    }
}
