use std::any::TypeId;

use super::FactoryErrorKind;
use crate::{any::TypeInfo, key::Key};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Registration not found")]
    NotFound,
    #[error("Incorrect arguments type, expected: {expected}")]
    InvalidArgsType { expected: TypeInfo },
    #[error("Incorrect instance type. Actual: {actual:?}, expected: {expected}")]
    InvalidInstanceType { expected: TypeInfo, actual: TypeId },
    #[error(
        "\
        Registration is backed by an async factory. \
        Resolve it asynchronously or enable `Config::allow_blocking_async`\
        "
    )]
    RequiresAsync,
    #[error("Container was dropped before the lazy handle was resolved")]
    NoResolver,
    #[error("Factory failed: {0:#}")]
    Factory(anyhow::Error),
}

/// Error of a resolution, annotated with the key that was being resolved.
///
/// When a factory fails because one of its own dependencies failed, the dependency's error
/// is kept inside [`ResolveErrorKind::Factory`], so every key of the chain stays available
/// through [`ResolveError::key_chain`].
#[derive(thiserror::Error, Debug)]
#[error("Failed to resolve {key}: {kind}")]
pub struct ResolveError {
    pub key: Key,
    pub kind: ResolveErrorKind,
}

impl ResolveError {
    #[inline]
    #[must_use]
    pub const fn new(key: Key, kind: ResolveErrorKind) -> Self {
        Self { key, kind }
    }

    #[inline]
    #[must_use]
    pub const fn not_found(key: Key) -> Self {
        Self::new(key, ResolveErrorKind::NotFound)
    }

    /// Returns `true` if the registration for exactly `key` is missing,
    /// as opposed to one of its dependencies.
    #[inline]
    #[must_use]
    pub fn is_not_found_for(&self, key: &Key) -> bool {
        matches!(self.kind, ResolveErrorKind::NotFound) && self.key == *key
    }

    /// Error of the dependency whose failure made this resolution fail, if any.
    #[must_use]
    pub fn nested(&self) -> Option<&ResolveError> {
        match &self.kind {
            ResolveErrorKind::Factory(err) => err.downcast_ref::<ResolveError>(),
            _ => None,
        }
    }

    /// Keys from this resolution down to the innermost failed one.
    #[must_use]
    pub fn key_chain(&self) -> Vec<&Key> {
        let mut chain = vec![&self.key];
        let mut current = self;
        while let Some(nested) = current.nested() {
            chain.push(&nested.key);
            current = nested;
        }
        chain
    }

    /// The innermost resolution error of the chain.
    #[must_use]
    pub fn root_cause(&self) -> &ResolveError {
        let mut current = self;
        while let Some(nested) = current.nested() {
            current = nested;
        }
        current
    }

    /// Annotates a factory failure with `key`.
    ///
    /// Any failure of the factory, including a [`ResolveError`] for the same key, is nested,
    /// so a failed factory is never mistaken for a missing registration.
    pub(crate) fn from_factory(key: &Key, err: FactoryErrorKind) -> Self {
        match err {
            FactoryErrorKind::InvalidArgsType { expected } => Self::new(key.clone(), ResolveErrorKind::InvalidArgsType { expected }),
            FactoryErrorKind::Failed(err) => Self::new(key.clone(), ResolveErrorKind::Factory(err)),
        }
    }
}
