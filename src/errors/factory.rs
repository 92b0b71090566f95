use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub(crate) enum FactoryErrorKind {
    #[error("Incorrect arguments type, expected: {expected}")]
    InvalidArgsType { expected: TypeInfo },
    #[error("{0:#}")]
    Failed(anyhow::Error),
}
