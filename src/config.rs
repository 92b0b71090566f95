use std::sync::atomic::{AtomicBool, Ordering};

static ALLOW_BLOCKING_ASYNC: AtomicBool = AtomicBool::new(false);
static STRICT_NOT_FOUND: AtomicBool = AtomicBool::new(false);

/// Config for a container
/// ## Fields
/// - `allow_blocking_async`:
///   If `true`, a synchronous resolution of a registration backed by an async factory
///   runs the factory to completion on a background task and blocks the calling thread until it finishes.
///   If `false` (default), such resolutions fail with [`crate::ResolveErrorKind::RequiresAsync`].
///
///   # Warning
///   Blocking can deadlock when the calling thread belongs to the runtime that has to drive the factory,
///   e.g. a current-thread runtime, or a multi-thread runtime whose workers are all blocked the same way.
///
/// - `strict_not_found`:
///   If `true`, optional and collection resolutions report a missing registration as
///   [`crate::ResolveErrorKind::NotFound`] instead of returning `None` or an empty collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub allow_blocking_async: bool,
    pub strict_not_found: bool,
}

impl Config {
    /// Process-wide config of every container created without its own config.
    #[must_use]
    pub fn global() -> Self {
        Self {
            allow_blocking_async: ALLOW_BLOCKING_ASYNC.load(Ordering::Acquire),
            strict_not_found: STRICT_NOT_FOUND.load(Ordering::Acquire),
        }
    }

    /// Replaces the process-wide config.
    /// Takes effect for existing containers too, starting with their next resolution.
    pub fn set_global(config: Self) {
        ALLOW_BLOCKING_ASYNC.store(config.allow_blocking_async, Ordering::Release);
        STRICT_NOT_FOUND.store(config.strict_not_found, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub const fn with_blocking_async(mut self, allow: bool) -> Self {
        self.allow_blocking_async = allow;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_strict_not_found(mut self, strict: bool) -> Self {
        self.strict_not_found = strict;
        self
    }
}
