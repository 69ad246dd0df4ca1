use alloc::sync::Arc;
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

pub(crate) type RcAny = Arc<dyn Any + Send + Sync>;
pub(crate) type BoxAny = alloc::boxed::Box<dyn Any + Send + Sync>;

/// Identity of a Rust type used as a binding target or a marker qualifier.
///
/// Equality and ordering only look at the [`TypeId`], the name is kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn of_val<T>(_val: &T) -> Self
    where
        T: ?Sized + 'static,
    {
        Self::of::<T>()
    }

    /// Last path segment of the type name, e.g. `Other` for `my_crate::qualifiers::Other`.
    /// Generic arguments are kept as is.
    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let path = self.name.split('<').next().unwrap_or(self.name);
        match path.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TypeInfo;

    use alloc::{boxed::Box, collections::BTreeSet, vec::Vec};

    mod nested {
        pub(crate) struct Other;
    }

    trait Service {}

    #[test]
    fn test_equality_by_type_id() {
        let first = TypeInfo::of::<u8>();
        let second = TypeInfo { name: "renamed", ..first };

        assert_eq!(first, second);
        assert_ne!(first, TypeInfo::of::<u16>());
    }

    #[test]
    fn test_of_val() {
        assert_eq!(TypeInfo::of_val(&1u32), TypeInfo::of::<u32>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<nested::Other>().short_name(), "Other");
        assert_eq!(TypeInfo::of::<u8>().short_name(), "u8");
        assert!(TypeInfo::of::<Box<dyn Service>>().short_name().starts_with("Box<"));
    }

    #[test]
    fn test_ordering_is_total() {
        let infos: BTreeSet<_> = [TypeInfo::of::<u8>(), TypeInfo::of::<u16>(), TypeInfo::of::<u8>()]
            .into_iter()
            .collect();
        assert_eq!(infos.into_iter().collect::<Vec<_>>().len(), 2);
    }
}
