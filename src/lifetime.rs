use std::fmt::{self, Display, Formatter};

/// How long a resolved instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifetime {
    /// A fresh instance is built on every resolution.
    Transient,
    /// The first successful resolution is cached and shared for the lifetime of the registration.
    Singleton,
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifetime::Transient => "transient",
            Lifetime::Singleton => "singleton",
        })
    }
}
