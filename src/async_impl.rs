pub(crate) mod bridge;
pub(crate) mod service;
