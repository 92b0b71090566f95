use std::{
    borrow::Cow,
    collections::{btree_set, BTreeSet},
    fmt::{self, Display, Formatter},
};

use crate::any::TypeInfo;

/// A single registration tag.
///
/// Tags disambiguate several registrations of the same type, e.g. a `"primary"`
/// and a `"replica"` database pool.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Name(Cow<'static, str>),
    Index(i64),
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Name(name) => write!(f, "{name:?}"),
            Tag::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&'static str> for Tag {
    #[inline]
    fn from(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }
}

impl From<String> for Tag {
    #[inline]
    fn from(name: String) -> Self {
        Self::Name(Cow::Owned(name))
    }
}

macro_rules! impl_tag_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Tag {
                #[inline]
                fn from(index: $ty) -> Self {
                    Self::Index(i64::from(index))
                }
            }
        )*
    };
}

impl_tag_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// Unordered set of tags. Two sets are equal regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tags(BTreeSet<Tag>);

impl Tags {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, tag: impl Into<Tag>) -> Self {
        self.0.insert(tag.into());
        self
    }

    #[inline]
    pub fn insert(&mut self, tag: impl Into<Tag>) -> bool {
        self.0.insert(tag.into())
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_subset(&self, other: &Tags) -> bool {
        self.0.is_subset(&other.0)
    }

    #[inline]
    pub fn iter(&self) -> btree_set::Iter<'_, Tag> {
        self.0.iter()
    }
}

impl From<()> for Tags {
    #[inline]
    fn from((): ()) -> Self {
        Self::new()
    }
}

impl From<Tag> for Tags {
    #[inline]
    fn from(tag: Tag) -> Self {
        Self::new().with(tag)
    }
}

impl From<&'static str> for Tags {
    #[inline]
    fn from(name: &'static str) -> Self {
        Self::new().with(name)
    }
}

impl From<i32> for Tags {
    #[inline]
    fn from(index: i32) -> Self {
        Self::new().with(index)
    }
}

impl<T: Into<Tag>, const N: usize> From<[T; N]> for Tags {
    #[inline]
    fn from(tags: [T; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl<T: Into<Tag>> FromIterator<T> for Tags {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = btree_set::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for Tags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, tag) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str("]")
    }
}

/// Identity of a registration: the provided type, its tags and the shape of the
/// arguments its factory expects.
///
/// Keys are plain values, cheap to clone and safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub type_info: TypeInfo,
    pub tags: Tags,
    pub args: Option<TypeInfo>,
}

impl Key {
    /// Key of an untagged registration of `T` whose factory takes no arguments.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            tags: Tags::new(),
            args: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn new<T: ?Sized + 'static>(tags: impl Into<Tags>) -> Self {
        Self::of::<T>().with_tags(tags)
    }

    #[inline]
    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<Tags>) -> Self {
        self.tags = tags.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<Tag>) -> Self {
        self.tags.insert(tag);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_args<A: 'static>(mut self) -> Self {
        self.args = TypeInfo::of_args::<A>();
        self
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_info)?;
        if !self.tags.is_empty() {
            write!(f, "{}", self.tags)?;
        }
        if let Some(args) = &self.args {
            write!(f, "({args})")?;
        }
        Ok(())
    }
}
