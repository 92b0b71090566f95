mod assembly;
mod factory;
mod resolve;

pub use assembly::AssemblyErrorKind;
pub(crate) use factory::FactoryErrorKind;
pub use resolve::{ResolveError, ResolveErrorKind};
