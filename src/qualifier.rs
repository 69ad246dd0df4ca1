use alloc::{borrow::Cow, boxed::Box};
use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// Qualifier as it's written in a binding or an injection point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    None,
    Named(Cow<'static, str>),
    Marker(TypeInfo),
}

impl Qualifier {
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }

    #[inline]
    #[must_use]
    pub fn marker<M: ?Sized + 'static>() -> Self {
        Self::Marker(TypeInfo::of::<M>())
    }

    /// Marker qualifier taken from a marker value.
    /// Only the type of the value matters, its fields are ignored.
    #[inline]
    #[must_use]
    pub fn marker_of_val<M: 'static>(marker: &M) -> Self {
        Self::Marker(TypeInfo::of_val(marker))
    }
}

impl Default for Qualifier {
    fn default() -> Self {
        Self::None
    }
}

/// Normalized qualifier identity.
///
/// Two slots with the same target type are the same slot iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualifierKey {
    Default,
    Named(Box<str>),
    Marker(TypeInfo),
}

impl Display for QualifierKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QualifierKey::Default => f.write_str("<unqualified>"),
            QualifierKey::Named(name) => write!(f, "@Named({name:?})"),
            QualifierKey::Marker(type_info) => write!(f, "@{}", type_info.short_name()),
        }
    }
}

/// Maps a qualifier to its key.
///
/// Named qualifiers compare by exact (case-sensitive) string, markers by type identity only.
#[must_use]
pub fn normalize(qualifier: &Qualifier) -> QualifierKey {
    match qualifier {
        Qualifier::None => QualifierKey::Default,
        Qualifier::Named(name) => QualifierKey::Named(Box::from(name.as_ref())),
        Qualifier::Marker(type_info) => QualifierKey::Marker(*type_info),
    }
}

impl From<&Qualifier> for QualifierKey {
    #[inline]
    fn from(qualifier: &Qualifier) -> Self {
        normalize(qualifier)
    }
}

impl From<Qualifier> for QualifierKey {
    #[inline]
    fn from(qualifier: Qualifier) -> Self {
        normalize(&qualifier)
    }
}

/// Type-level qualifier, used by [`crate::InjectWith`] and [`crate::BindingBuilder::annotated`].
///
/// Usually declared with [`crate::named!`] or [`crate::marker!`].
pub trait Qualify: 'static {
    #[must_use]
    fn qualifier() -> Qualifier;
}

/// Type-level "no qualifier"
pub struct Unqualified;

impl Qualify for Unqualified {
    #[inline]
    fn qualifier() -> Qualifier {
        Qualifier::None
    }
}

/// Declares a type usable as a named qualifier.
///
/// ```rust
/// junction::named!(pub Simple = "simple");
///
/// use junction::{Qualifier, Qualify as _};
///
/// assert_eq!(Simple::qualifier(), Qualifier::named("simple"));
/// ```
#[macro_export]
macro_rules! named {
    ($vis:vis $ident:ident = $name:literal) => {
        $vis struct $ident;

        impl $crate::Qualify for $ident {
            #[inline]
            fn qualifier() -> $crate::Qualifier {
                $crate::Qualifier::named($name)
            }
        }
    };
}

/// Declares a marker qualifier type, identified by the type itself.
///
/// ```rust
/// junction::marker!(pub Other);
///
/// use junction::{Qualifier, Qualify as _};
///
/// assert_eq!(Other::qualifier(), Qualifier::marker::<Other>());
/// ```
#[macro_export]
macro_rules! marker {
    ($vis:vis $ident:ident) => {
        $vis struct $ident;

        impl $crate::Qualify for $ident {
            #[inline]
            fn qualifier() -> $crate::Qualifier {
                $crate::Qualifier::marker::<$ident>()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::{normalize, Qualifier, QualifierKey, Qualify as _};

    use alloc::{borrow::Cow, string::String};

    crate::named!(Simple = "simple");
    crate::marker!(Other);

    #[allow(dead_code)]
    struct Tagged(&'static str);
    #[allow(dead_code)]
    struct AnotherTagged(&'static str);

    #[test]
    fn test_unqualified_is_sentinel() {
        assert_eq!(normalize(&Qualifier::None), QualifierKey::Default);
        assert_eq!(normalize(&Qualifier::default()), QualifierKey::Default);
    }

    #[test]
    fn test_named_by_exact_string() {
        let borrowed = normalize(&Qualifier::named("simple"));
        let owned = normalize(&Qualifier::Named(Cow::Owned(String::from("simple"))));

        assert_eq!(borrowed, owned);
        assert_ne!(borrowed, normalize(&Qualifier::named("Simple")));
        assert_ne!(borrowed, normalize(&Qualifier::named("simple ")));
    }

    #[test]
    fn test_marker_by_type_identity() {
        let first = normalize(&Qualifier::marker_of_val(&Tagged("a")));
        let second = normalize(&Qualifier::marker_of_val(&Tagged("b")));
        let other = normalize(&Qualifier::marker_of_val(&AnotherTagged("a")));

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first, normalize(&Qualifier::marker::<Tagged>()));
    }

    #[test]
    fn test_kinds_never_collide() {
        let named = normalize(&Qualifier::named("Other"));
        let marker = normalize(&Other::qualifier());

        assert_ne!(named, marker);
        assert_ne!(named, QualifierKey::Default);
        assert_ne!(marker, QualifierKey::Default);
    }

    #[test]
    fn test_type_level_qualifiers() {
        assert_eq!(normalize(&Simple::qualifier()), normalize(&Qualifier::named("simple")));
        assert_eq!(normalize(&Other::qualifier()), normalize(&Qualifier::marker::<Other>()));
        assert_eq!(normalize(&super::Unqualified::qualifier()), QualifierKey::Default);
    }

    #[test]
    fn test_display() {
        use alloc::string::ToString as _;

        assert_eq!(QualifierKey::Default.to_string(), "<unqualified>");
        assert_eq!(normalize(&Qualifier::named("simple")).to_string(), "@Named(\"simple\")");
        assert_eq!(normalize(&Other::qualifier()).to_string(), "@Other");
    }
}
