use crate::{
    any::TypeInfo,
    key::{Key, Tags},
    lifetime::Lifetime,
};

/// How the tags of a [`Criteria`] are compared with the tags of a [`Key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagMatch {
    /// Tag sets must be identical.
    #[default]
    Equal,
    /// Every criteria tag must be present on the key. No criteria tags match every key.
    Subset,
}

/// Query over registrations, broader than a single exact [`Key`].
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    type_info: Option<TypeInfo>,
    tags: Tags,
    tag_match: TagMatch,
    args: Option<Option<TypeInfo>>,
    lifetime: Option<Lifetime>,
}

impl Criteria {
    /// Matches registrations of any type with no tags.
    /// Combine with [`TagMatch::Subset`] to match every registration.
    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_info: Some(TypeInfo::of::<T>()),
            ..Self::default()
        }
    }

    /// Criteria matching exactly `key`.
    #[must_use]
    pub fn exact(key: &Key) -> Self {
        Self {
            type_info: Some(key.type_info),
            tags: key.tags.clone(),
            tag_match: TagMatch::Equal,
            args: Some(key.args),
            lifetime: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<Tags>) -> Self {
        self.tags = tags.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn matching(mut self, tag_match: TagMatch) -> Self {
        self.tag_match = tag_match;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_args<A: 'static>(mut self) -> Self {
        self.args = Some(TypeInfo::of_args::<A>());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    #[inline]
    #[must_use]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    #[must_use]
    pub fn matches(&self, key: &Key) -> bool {
        if let Some(type_info) = &self.type_info {
            if *type_info != key.type_info {
                return false;
            }
        }
        if let Some(args) = &self.args {
            if *args != key.args {
                return false;
            }
        }
        match self.tag_match {
            TagMatch::Equal => self.tags == key.tags,
            TagMatch::Subset => self.tags.is_empty() || self.tags.is_subset(&key.tags),
        }
    }

    #[must_use]
    pub fn matches_entry(&self, key: &Key, lifetime: Lifetime) -> bool {
        self.lifetime.map_or(true, |expected| expected == lifetime) && self.matches(key)
    }
}
