#[macro_use]
pub(crate) mod macros;

pub(crate) mod adapters;
pub(crate) mod any;
pub(crate) mod assembly;
pub(crate) mod async_impl;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod criteria;
pub(crate) mod dependency_resolver;
pub(crate) mod entry;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod inject;
pub(crate) mod key;
pub(crate) mod lazy;
pub(crate) mod lifetime;
pub(crate) mod service;

pub mod utils;

pub use any::TypeInfo;
pub use assembly::{Assembler, Assembly};
pub use config::Config;
pub use container::{Container, WeakContainer};
pub use criteria::{Criteria, TagMatch};
pub use dependency_resolver::DependencyResolver;
pub use errors::{AssemblyErrorKind, ResolveError, ResolveErrorKind};
pub use inject::{Inject, InjectAll, InjectLazy, InjectOptional};
pub use key::{Key, Tag, Tags};
pub use lazy::Lazy;
pub use lifetime::Lifetime;
